use std::path::PathBuf;
use thiserror::Error;

/// Every way building, loading or running a circuit can fail.
///
/// None of these are recoverable for the current run, the caller is expected to abort.
#[derive(Debug, Error)]
pub enum SimError {
    /// A part type tag that is not in the catalog.
    #[error("unknown part type: {0}")]
    UnknownPartType(String),
    /// A part was added without a connector for one of its pins.
    #[error("part {part} is missing pin \"{pin}\"")]
    MissingPin { part: String, pin: String },
    /// A catalog entry without any pins.
    #[error("part {0} has no pins")]
    InvalidPartDefinition(String),
    /// A circuit description without parts.
    #[error("no parts found in circuit description {}", .0.display())]
    EmptyCircuit(PathBuf),
    /// A read of a connector name that was never registered.
    #[error("unknown connector: {0}")]
    UnknownConnector(String),
    /// Required outputs still unset after the fixed point pass.
    #[error("evaluation did not reach connectors: {}", .0.join(", "))]
    IncompleteEvaluation(Vec<String>),
    #[error("failed to read file {}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed description in {}", path.display())]
    MalformedDescription {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A value that can't be read as a 17 bit base 2 numeral.
    #[error("invalid binary literal: {0}")]
    InvalidBinaryLiteral(String),
}

pub type Result<T> = std::result::Result<T, SimError>;
