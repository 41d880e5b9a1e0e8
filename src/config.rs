use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::scheduler::Policy;
use crate::Error;

/// Settings shared by every instance of a run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub policy: Policy,
    /// Solve the instances on the rayon thread pool
    pub parallel: bool,
    /// Where to put the output files. Next to the input when unset.
    pub output_dir: Option<PathBuf>,
    /// Also dump every schedule as JSON
    pub write_json: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            policy: Policy::default(),
            parallel: true,
            output_dir: None,
            write_json: false,
        }
    }
}

/// Load the config from either a path to a JSON file or a JSON string
pub fn load_config(source: &str) -> Result<SolverConfig, Error> {
    let path = Path::new(source);
    let json = if path.is_file() {
        std::fs::read_to_string(path)?
    } else {
        source.to_string()
    };

    Ok(serde_json::from_str(&json)?)
}
