use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::network::{Street, StreetNetwork};
use crate::schedule::{GreenWindow, Schedule};
use crate::{Error, Time};

/// How the green time of an intersection is split between its incoming streets
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Policy {
    /// Durations proportional to the observed transit, normalized so the least
    /// used street gets one second
    #[default]
    Proportional,
    /// Only the first incoming street is ever green
    FirstIncoming,
    /// One second for every incoming street
    EqualOne,
    /// The same number of seconds for every incoming street
    EqualSeconds(Time),
}

impl Policy {
    pub const NAMES: [&'static str; 4] =
        ["proportional", "first-incoming", "equal-one", "equal-seconds"];

    /// Look up a policy by its command line name. `seconds` is only used by
    /// `equal-seconds`.
    pub fn from_name(name: &str, seconds: Time) -> Result<Self, Error> {
        match name {
            "proportional" => Ok(Policy::Proportional),
            "first-incoming" => Ok(Policy::FirstIncoming),
            "equal-one" => Ok(Policy::EqualOne),
            "equal-seconds" => Ok(Policy::EqualSeconds(seconds)),
            other => Err(Error::InvalidPolicy(other.to_string())),
        }
    }
}

/// Build the light cycle of every intersection that has incoming streets.
/// Only reads the network, so building twice gives the same schedule.
pub fn build_schedule(network: &StreetNetwork, horizon: Time, policy: Policy) -> Schedule {
    debug!("Building schedule with {:?}, horizon {}", policy, horizon);

    let mut schedule = Schedule::new();
    for intersection in network.intersections() {
        let incoming: Vec<&Street> = network.incoming_streets(intersection.id).collect();
        if incoming.is_empty() {
            continue;
        }

        let windows: Vec<GreenWindow> = match policy {
            Policy::Proportional => {
                let transits: Vec<u64> = incoming.iter().map(|street| street.transit).collect();
                let durations = proportional_durations(&transits, horizon);
                incoming
                    .iter()
                    .zip(durations)
                    .map(|(street, duration)| GreenWindow::new(street.name.as_str(), duration))
                    .collect()
            }
            Policy::FirstIncoming => vec![GreenWindow::new(incoming[0].name.as_str(), 1)],
            Policy::EqualOne => equal_windows(&incoming, 1, horizon),
            Policy::EqualSeconds(seconds) => equal_windows(&incoming, seconds, horizon),
        };
        trace!("Intersection {}: {:?}", intersection.id, windows);
        schedule.insert(intersection.id, windows);
    }

    debug!(
        "Scheduled {} of {} intersections",
        schedule.scheduled_intersection_count(),
        network.intersection_count()
    );
    schedule
}

fn equal_windows(incoming: &[&Street], seconds: Time, horizon: Time) -> Vec<GreenWindow> {
    let duration = clamp_duration(seconds, horizon);
    incoming
        .iter()
        .map(|street| GreenWindow::new(street.name.as_str(), duration))
        .collect()
}

/// A duration that is zero or does not fit into the horizon collapses to 1
fn clamp_duration(duration: Time, horizon: Time) -> Time {
    if duration < 1 || duration >= horizon {
        1
    } else {
        duration
    }
}

/// Split the horizon between streets in proportion to their transit counts,
/// then divide every share by the smallest one.
///
/// Shares are computed in integer arithmetic, `floor(horizon * transit / total)`,
/// so scaling all transit counts by the same factor gives the same durations.
/// Without any transit every street gets one second.
fn proportional_durations(transits: &[u64], horizon: Time) -> Vec<Time> {
    let total: u128 = transits.iter().map(|t| *t as u128).sum();
    if total == 0 {
        return vec![1; transits.len()];
    }

    let shares: Vec<Time> = transits
        .iter()
        .map(|transit| {
            let share = (horizon as u128 * *transit as u128 / total) as Time;
            // Shares below one second are raised to one
            clamp_duration(share.max(1), horizon)
        })
        .collect();

    let min_share = match shares.iter().min() {
        Some(min_share) => *min_share,
        None => return Vec::new(),
    };

    shares
        .into_iter()
        .map(|share| clamp_duration((share / min_share).max(1), horizon))
        .collect()
}
