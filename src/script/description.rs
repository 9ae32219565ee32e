use crate::error::{Result, SimError};
use crate::graph::{CircuitBuilder, Value};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

/// A circuit as written in a description file.
///
/// ```json
/// {
///   "Name": "HalfAdder",
///   "In": ["a", "b"],
///   "Out": ["sum", "carry"],
///   "Parts": [
///     { "Name": "Xor", "Con": { "a": "a", "b": "b", "out": "sum" } },
///     { "Name": "And", "Con": { "a": "a", "b": "b", "out": "carry" } }
///   ]
/// }
/// ```
///
/// `In` and `Out` only document the circuit, nothing checks them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CircuitDescription {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "In")]
    pub inputs: Vec<String>,
    #[serde(default, rename = "Out")]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub parts: Vec<PartDescription>,
}

/// One part of a [CircuitDescription]: its type tag and pin to connector map.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PartDescription {
    pub name: String,
    #[serde(default)]
    pub con: IndexMap<String, String>,
}

/// How `Eval` values of a [SequenceScript] are written.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Deserialize)]
pub enum Unit {
    /// Values are used as they are.
    #[default]
    #[serde(rename = "")]
    Decimal,
    /// The decimal digits of every value are read as a base 2 numeral.
    #[serde(rename = "bin")]
    Binary,
}

/// A test sequence: which circuit to load, the inputs of every cycle and the connectors to report.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SequenceScript {
    /// Circuit description path relative to the script, "." if the script itself is the description.
    pub load: String,
    #[serde(default)]
    pub output: Vec<String>,
    #[serde(default)]
    pub eval: Vec<IndexMap<String, Value>>,
    #[serde(default)]
    pub unit: Unit,
    /// Base 2 words preloaded into the first RAM16 of the circuit.
    #[serde(default)]
    pub memory: Vec<String>,
}

/// Reads and deserializes the JSON file at `path`.
///
/// # Errors
///
/// [SimError::FileNotFound] if the file can't be read, [SimError::MalformedDescription] if it
/// doesn't deserialize into `T`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).map_err(|source| SimError::FileNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| SimError::MalformedDescription {
        path: path.to_path_buf(),
        source,
    })
}

impl CircuitDescription {
    /// Reads a [CircuitDescription] from the JSON file at `path`.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        read_json(path.as_ref())
    }

    /// Returns a [CircuitBuilder] with every part of the description added in order.
    ///
    /// `source` is only used to report an empty description.
    ///
    /// # Errors
    ///
    /// [SimError::EmptyCircuit] if there are no parts, plus the errors of [CircuitBuilder::add_part].
    pub fn build(&self, source: &Path) -> Result<CircuitBuilder> {
        if self.parts.is_empty() {
            return Err(SimError::EmptyCircuit(source.to_path_buf()));
        }
        let mut g = CircuitBuilder::new();
        for part in &self.parts {
            g.add_part(
                &part.name,
                part.con.iter().map(|(pin, con)| (pin.as_str(), con.as_str())),
            )?;
        }
        clilog::debug!(
            "built circuit {:?}, parts:{}, connectors:{}",
            self.name,
            g.len(),
            g.connector_count()
        );
        Ok(g)
    }
}
