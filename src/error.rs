use thiserror::Error;

use crate::{IntersectionId, Time};

#[derive(Error, Debug)]
pub enum Error {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Unknown street: {0}")]
    UnknownStreet(String),
    #[error("Duplicate street: {0}")]
    DuplicateStreet(String),
    #[error("Intersection {id} out of range (network has {count} intersections)")]
    IntersectionOutOfRange { id: IntersectionId, count: usize },
    #[error("Street {name} has invalid length {length}")]
    InvalidStreetLength { name: String, length: Time },
    #[error("Street index {0} is not part of the network")]
    StreetOutOfRange(usize),
    #[error("Output {} is already written by another input", .0.display())]
    DuplicateOutput(std::path::PathBuf),
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}
