pub mod config;
pub mod demand;
mod error;
pub mod network;
pub mod problem;
pub mod runner;
pub mod schedule;
pub mod scheduler;

pub use error::Error;
pub use network::{StreetId, StreetNetwork};
pub use problem::{read_problem_from_file, Car, Problem};
pub use schedule::{GreenWindow, Schedule};
pub use scheduler::{build_schedule, Policy};

pub type IntersectionId = usize;
pub type Time = u64;

/// Solve a problem instance given as text and return the schedule as text
/// This is the entry point for callers that do not need the intermediate structures
pub fn solve(input: &str, policy: Policy) -> Result<String, Error> {
    let mut problem: Problem = input.parse()?;
    let schedule = schedule_problem(&mut problem, policy)?;

    Ok(schedule.to_string())
}

/// Count the demand of every street, then build the light cycles from it.
/// The transit counters of the problem's network are updated in place.
pub fn schedule_problem(problem: &mut Problem, policy: Policy) -> Result<Schedule, Error> {
    demand::aggregate_demand(&mut problem.network, &problem.cars)?;
    Ok(build_schedule(&problem.network, problem.duration, policy))
}
