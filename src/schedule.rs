use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

use crate::{IntersectionId, Time};

/// Right of way for one street for `duration` seconds of the cycle
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreenWindow {
    pub street: String,
    pub duration: Time,
}

impl GreenWindow {
    pub fn new(street: impl Into<String>, duration: Time) -> Self {
        GreenWindow {
            street: street.into(),
            duration,
        }
    }
}

/// The light cycles of all scheduled intersections.
/// Intersections without green windows are never stored, so the number of
/// scheduled intersections is the length of the map.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    intersections: BTreeMap<IntersectionId, Vec<GreenWindow>>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cycle of an intersection. An empty cycle leaves the intersection
    /// unscheduled. Returns the previous cycle, if any.
    pub fn insert(
        &mut self,
        intersection: IntersectionId,
        windows: Vec<GreenWindow>,
    ) -> Option<Vec<GreenWindow>> {
        if windows.is_empty() {
            return self.intersections.remove(&intersection);
        }
        self.intersections.insert(intersection, windows)
    }

    pub fn scheduled_intersection_count(&self) -> usize {
        self.intersections.len()
    }

    pub fn total_windows(&self) -> usize {
        self.intersections.values().map(Vec::len).sum()
    }

    pub fn get(&self, intersection: IntersectionId) -> Option<&[GreenWindow]> {
        self.intersections.get(&intersection).map(Vec::as_slice)
    }

    /// Scheduled intersections in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (IntersectionId, &[GreenWindow])> + '_ {
        self.intersections
            .iter()
            .map(|(id, windows)| (*id, windows.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.intersections.is_empty()
    }

    /// Write the submission format: the number of scheduled intersections, then
    /// per intersection its id, the number of windows and one
    /// `<street> <duration>` line per window
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        write!(writer, "{}", self)
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.scheduled_intersection_count())?;
        for (id, windows) in self.iter() {
            writeln!(f, "{}", id)?;
            writeln!(f, "{}", windows.len())?;
            for window in windows {
                writeln!(f, "{} {}", window.street, window.duration)?;
            }
        }
        Ok(())
    }
}
