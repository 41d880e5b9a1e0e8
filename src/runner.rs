use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::HashSet;
use std::ffi::OsString;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::SolverConfig;
use crate::problem::{read_problem_from_file, Problem};
use crate::schedule::Schedule;
use crate::{schedule_problem, Error};

/// Summary of one solved instance, or the sum over several
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub file: String,
    pub cars: usize,
    pub streets: usize,
    pub scheduled_intersections: usize,
    pub green_windows: usize,
    /// Cars that cannot arrive before the horizon even without red lights
    pub late_cars: usize,
    /// Score if every car that can arrive in time never waited at a light
    pub max_score: u64,
    pub duration: Duration,
    is_aggregation: bool,
}

impl RunStats {
    pub fn new(file: impl Into<String>, problem: &Problem, schedule: &Schedule) -> Self {
        let mut late_cars = 0;
        let mut max_score = 0;
        for car in &problem.cars {
            let travel_time = car.travel_time(&problem.network);
            if travel_time > problem.duration {
                late_cars += 1;
            } else {
                max_score += problem.bonus + (problem.duration - travel_time);
            }
        }

        RunStats {
            file: file.into(),
            cars: problem.cars.len(),
            streets: problem.network.street_count(),
            scheduled_intersections: schedule.scheduled_intersection_count(),
            green_windows: schedule.total_windows(),
            late_cars,
            max_score,
            duration: Duration::ZERO,
            is_aggregation: false,
        }
    }

    pub fn add(&mut self, other: &RunStats) {
        self.is_aggregation = true;
        self.cars += other.cars;
        self.streets += other.streets;
        self.scheduled_intersections += other.scheduled_intersections;
        self.green_windows += other.green_windows;
        self.late_cars += other.late_cars;
        self.max_score += other.max_score;
        self.duration += other.duration;
    }

    /// Sum of all given stats
    pub fn total<'a>(stats: impl IntoIterator<Item = &'a RunStats>) -> RunStats {
        let mut total = RunStats {
            is_aggregation: true,
            ..Default::default()
        };
        for s in stats {
            total.add(s);
        }
        total
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = if self.is_aggregation {
            "aggregated"
        } else {
            self.file.as_str()
        };
        write!(
            f,
            "file: {:>40} | cars: {:>8} | streets: {:>8} | scheduled: {:>8} | windows: {:>8} | late cars: {:>8} | max score: {:>12} | duration: {:>15}",
            file,
            self.cars,
            self.streets,
            self.scheduled_intersections,
            self.green_windows,
            self.late_cars,
            self.max_score,
            format!("{:?}", self.duration),
        )
    }
}

/// `<input>.<extension>`, either next to the input or inside `output_dir`
fn output_path(input: &Path, output_dir: Option<&Path>, extension: &str) -> PathBuf {
    let mut file_name: OsString = input
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("schedule"));
    file_name.push(".");
    file_name.push(extension);

    match output_dir {
        Some(dir) => dir.join(file_name),
        None => input.with_file_name(file_name),
    }
}

fn write_schedule(input: &Path, config: &SolverConfig, schedule: &Schedule) -> Result<(), Error> {
    let output_dir = config.output_dir.as_deref();

    let path = output_path(input, output_dir, "out");
    let mut writer = BufWriter::new(File::create(&path)?);
    schedule.write_to(&mut writer)?;
    writer.flush()?;
    debug!("Wrote {}", path.display());

    if config.write_json {
        let path = output_path(input, output_dir, "json");
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, schedule)?;
        writer.flush()?;
        debug!("Wrote {}", path.display());
    }

    Ok(())
}

/// Read, schedule and write one instance.
/// Nothing is written when the input is malformed.
pub fn solve_file(input: &Path, config: &SolverConfig) -> Result<RunStats, Error> {
    let t0 = Instant::now();

    let mut problem = read_problem_from_file(input)?;
    let schedule = schedule_problem(&mut problem, config.policy)?;
    write_schedule(input, config, &schedule)?;

    let mut stats = RunStats::new(input.display().to_string(), &problem, &schedule);
    stats.duration = t0.elapsed();
    info!("Solved {} in {:?}", stats.file, stats.duration);

    Ok(stats)
}

/// For every input, the output path it would share with an earlier input.
/// Only the first input claiming a path gets to write it.
fn output_conflicts(inputs: &[PathBuf], config: &SolverConfig) -> Vec<Option<PathBuf>> {
    let mut claimed: HashSet<PathBuf> = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let path = output_path(input, config.output_dir.as_deref(), "out");
            if claimed.insert(path.clone()) {
                None
            } else {
                Some(path)
            }
        })
        .collect()
}

fn solve_unless_conflicting(
    input: &Path,
    conflict: &Option<PathBuf>,
    config: &SolverConfig,
) -> Result<RunStats, Error> {
    match conflict {
        Some(path) => Err(Error::DuplicateOutput(path.clone())),
        None => solve_file(input, config),
    }
}

/// Solve every instance on its own. The results are in the order of `inputs`.
/// An input whose output file would overwrite that of an earlier input fails
/// without being solved.
pub fn solve_files(inputs: &[PathBuf], config: &SolverConfig) -> Vec<Result<RunStats, Error>> {
    let conflicts = output_conflicts(inputs, config);
    if config.parallel {
        debug!("Solving {} instances in parallel", inputs.len());
        inputs
            .par_iter()
            .zip(conflicts.par_iter())
            .map(|(input, conflict)| solve_unless_conflicting(input, conflict, config))
            .collect()
    } else {
        warn!("Not using parallel processing!");
        inputs
            .iter()
            .zip(conflicts.iter())
            .map(|(input, conflict)| solve_unless_conflicting(input, conflict, config))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Policy;

    const EXAMPLE_PATH: &str = "test/a_example.in";
    const EXPECTED_OUTPUT_PATH: &str = "test/a_example.out.expected";

    /// A fresh, empty directory for the output of one test
    fn output_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("traffic-schedule-{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn config_with_output(name: &str) -> SolverConfig {
        SolverConfig {
            output_dir: Some(output_dir(name)),
            ..Default::default()
        }
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("data/b.in"), None, "out"),
            PathBuf::from("data/b.in.out")
        );
        assert_eq!(
            output_path(Path::new("data/b.in"), Some(Path::new("results")), "json"),
            PathBuf::from("results/b.in.json")
        );
    }

    #[test]
    fn test_solve_file_writes_expected_output() {
        let config = config_with_output("example");
        let stats = solve_file(Path::new(EXAMPLE_PATH), &config).unwrap();

        let output_dir = config.output_dir.unwrap();
        let written = std::fs::read_to_string(output_dir.join("a_example.in.out")).unwrap();
        let expected = std::fs::read_to_string(EXPECTED_OUTPUT_PATH).unwrap();
        assert_eq!(written, expected);
        assert!(!output_dir.join("a_example.in.json").exists());

        assert_eq!(stats.cars, 2);
        assert_eq!(stats.streets, 5);
        assert_eq!(stats.scheduled_intersections, 4);
        assert_eq!(stats.green_windows, 5);
        assert_eq!(stats.late_cars, 0);
        // Travel times 6 and 4 with a horizon of 6 and a bonus of 1000
        assert_eq!(stats.max_score, 2002);
    }

    #[test]
    fn test_solve_file_writes_json() {
        let config = SolverConfig {
            write_json: true,
            ..config_with_output("json")
        };
        solve_file(Path::new(EXAMPLE_PATH), &config).unwrap();

        let path = config.output_dir.unwrap().join("a_example.in.json");
        let json = std::fs::read_to_string(path).unwrap();
        let schedule: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(schedule.scheduled_intersection_count(), 4);
    }

    #[test]
    fn test_malformed_input_writes_nothing() {
        let dir = output_dir("malformed");
        let input = dir.join("broken.in");
        std::fs::write(&input, "6 2 1 1 10\n0 1 a 2\n1 b\n").unwrap();

        let config = SolverConfig::default();
        let result = solve_file(&input, &config);
        assert!(matches!(result, Err(Error::Parse { line: 3, .. })));
        assert!(!dir.join("broken.in.out").exists());
    }

    #[test]
    fn test_solve_files_keeps_input_order() {
        let dir = output_dir("many");
        let copy = dir.join("copy.in");
        std::fs::copy(EXAMPLE_PATH, &copy).unwrap();
        let inputs = vec![PathBuf::from(EXAMPLE_PATH), dir.join("missing.in"), copy];

        for parallel in [true, false] {
            let config = SolverConfig {
                parallel,
                policy: Policy::EqualOne,
                output_dir: Some(output_dir(&format!("many-out-{}", parallel))),
                ..Default::default()
            };
            let results = solve_files(&inputs, &config);
            assert_eq!(results.len(), 3);
            assert!(results[0].is_ok());
            assert!(matches!(results[1], Err(Error::Io(_))));
            assert!(results[2].is_ok());
        }
    }

    #[test]
    fn test_same_file_name_in_different_directories() {
        let dir = output_dir("same-name");
        let first = dir.join("a").join("x.in");
        let second = dir.join("b").join("x.in");
        std::fs::create_dir_all(first.parent().unwrap()).unwrap();
        std::fs::create_dir_all(second.parent().unwrap()).unwrap();
        std::fs::write(&first, "6 2 1 1 10\n0 1 a 2\n1 a\n").unwrap();
        std::fs::write(&second, "6 2 1 1 10\n0 1 b 2\n1 b\n").unwrap();
        let inputs = vec![first, second];

        for parallel in [true, false] {
            let output = output_dir(&format!("same-name-out-{}", parallel));
            let config = SolverConfig {
                parallel,
                output_dir: Some(output.clone()),
                ..Default::default()
            };
            let results = solve_files(&inputs, &config);
            assert!(results[0].is_ok());
            assert!(
                matches!(&results[1], Err(Error::DuplicateOutput(path)) if *path == output.join("x.in.out"))
            );

            // The first input owns the file
            let written = std::fs::read_to_string(output.join("x.in.out")).unwrap();
            assert_eq!(written, "1\n1\n1\na 1\n");
        }
    }

    #[test]
    fn test_same_input_twice() {
        let dir = output_dir("twice");
        let config = SolverConfig {
            output_dir: Some(dir),
            ..Default::default()
        };
        let inputs = vec![PathBuf::from(EXAMPLE_PATH), PathBuf::from(EXAMPLE_PATH)];
        let results = solve_files(&inputs, &config);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::DuplicateOutput(_))));
    }

    #[test]
    fn test_aggregation() {
        let problem: Problem = "10 2 1 2 5\n0 1 a 4\n2 a a\n1 a\n".parse().unwrap();
        let schedule = Schedule::new();
        let stats = RunStats::new("x.in", &problem, &schedule);
        // Travel times 4 and 0
        assert_eq!(stats.max_score, (5 + 6) + (5 + 10));
        assert_eq!(stats.late_cars, 0);

        let total = RunStats::total([&stats, &stats]);
        assert_eq!(total.cars, 4);
        assert_eq!(total.streets, 2);
        assert_eq!(total.max_score, 2 * stats.max_score);
        assert!(total.to_string().contains(" aggregated | cars:        4 |"));
        assert!(stats.to_string().contains("x.in"));
    }

    #[test]
    fn test_late_cars() {
        let problem: Problem = "3 3 2 1 5\n0 1 a 4\n1 2 b 4\n2 a b\n".parse().unwrap();
        let stats = RunStats::new("late.in", &problem, &Schedule::new());
        assert_eq!(stats.late_cars, 1);
        assert_eq!(stats.max_score, 0);
    }
}
