use anyhow::{anyhow, Result};
use clap::{arg, value_parser, ArgMatches, Command};
use log::{error, info, warn};
use std::path::PathBuf;
use std::time::Instant;
use traffic_schedule_rust::config::{load_config, SolverConfig};
use traffic_schedule_rust::runner::{solve_files, RunStats};
use traffic_schedule_rust::{Policy, Time};

const DEFAULT_SECONDS: Time = 1;

fn cli() -> Command {
    Command::new("traffic-schedule-rust")
        .about("Derives traffic light schedules from the routes of the cars")
        .arg_required_else_help(true)
        .arg(
            arg!(<INPUT> ... "Problem instance files")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(--config <CONFIG> "Config json string or path to json file")
                .required(false)
                .value_parser(value_parser!(String)),
        )
        .arg(
            arg!(--policy <POLICY> "How green time is split between incoming streets")
                .required(false)
                .value_parser(Policy::NAMES),
        )
        .arg(
            arg!(--seconds <SECONDS> "Green time per street for the equal-seconds policy [default: 1]")
                .required(false)
                .value_parser(value_parser!(Time)),
        )
        .arg(
            arg!(--"output-dir" <DIR> "Directory for the output files, defaults to next to the input")
                .required(false)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(arg!(--json "Also write every schedule as JSON"))
        .arg(arg!(--sequential "Solve the instances one after another"))
}

/// Defaults, then the config, then the command line flags
fn solver_config(matches: &ArgMatches) -> Result<SolverConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(source) => load_config(source)?,
        None => SolverConfig::default(),
    };

    let seconds = matches.get_one::<Time>("seconds").copied();
    match (matches.get_one::<String>("policy"), seconds) {
        (Some(name), seconds) => {
            config.policy = Policy::from_name(name, seconds.unwrap_or(DEFAULT_SECONDS))?;
        }
        (None, Some(seconds)) => match config.policy {
            Policy::EqualSeconds(_) => config.policy = Policy::EqualSeconds(seconds),
            policy => warn!("--seconds has no effect with the {:?} policy", policy),
        },
        (None, None) => {}
    }
    if let Some(dir) = matches.get_one::<PathBuf>("output-dir") {
        config.output_dir = Some(dir.clone());
    }
    if matches.get_flag("json") {
        config.write_json = true;
    }
    if matches.get_flag("sequential") {
        config.parallel = false;
    }

    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();
    let t0 = Instant::now();

    let matches = cli().get_matches();
    let config = solver_config(&matches)?;
    let inputs: Vec<PathBuf> = matches
        .get_many::<PathBuf>("INPUT")
        .ok_or_else(|| anyhow!("No input files given"))?
        .cloned()
        .collect();
    info!("Solving {} instances with {:?}", inputs.len(), config);

    let results = solve_files(&inputs, &config);

    let mut solved: Vec<RunStats> = Vec::new();
    let mut failed = 0;
    for (input, result) in inputs.iter().zip(results) {
        match result {
            Ok(stats) => {
                println!("{}", stats);
                solved.push(stats);
            }
            Err(e) => {
                error!("{}: {}", input.display(), e);
                failed += 1;
            }
        }
    }

    println!("\n{}\n", "-".repeat(120));
    println!("{}", RunStats::total(&solved));
    info!("done in {:?}", t0.elapsed());

    if failed > 0 {
        return Err(anyhow!("{} of {} instances failed", failed, inputs.len()));
    }
    Ok(())
}
