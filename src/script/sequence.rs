use super::description::{read_json, CircuitDescription, SequenceScript, Unit};
use super::literal::{parse_binary, reinterpret_binary};
use super::report::Report;
use crate::error::{Result, SimError};
use crate::graph::{Circuit, PartType, Value};

use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// A loaded test sequence: a circuit plus the inputs of every clock cycle and the connectors to report.
#[derive(Debug, Clone)]
pub struct Sequence {
    circuit: Circuit,
    outputs: Vec<String>,
    cycles: Vec<IndexMap<String, Value>>,
}

/// Returns the path of the circuit description named by `load`, relative to the script at `script`.
fn circuit_path(script: &Path, load: &str) -> PathBuf {
    if load == "." {
        return script.to_path_buf();
    }
    script
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(load)
}

impl Sequence {
    /// Returns a new [Sequence] that runs `cycles` on `circuit` and reports `outputs` after each one.
    pub fn new(circuit: Circuit, outputs: Vec<String>, cycles: Vec<IndexMap<String, Value>>) -> Self {
        Self {
            circuit,
            outputs,
            cycles,
        }
    }

    /// Loads the sequence script at `path` and the circuit it names.
    ///
    /// With `"Unit": "bin"` every `Eval` value is rewritten by [reinterpret_binary].
    /// `Memory` words are parsed with [parse_binary] and written to the first RAM16 of the circuit.
    ///
    /// # Errors
    ///
    /// Anything reading either file or building the circuit can return, plus
    /// [SimError::InvalidBinaryLiteral] for bad `Eval` values in binary mode or bad `Memory` words.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        clilog::info!("read file: {}", path.display());
        let script: SequenceScript = read_json(path)?;

        let cycles = match script.unit {
            Unit::Decimal => script.eval,
            Unit::Binary => script
                .eval
                .into_iter()
                .map(|cycle| {
                    cycle
                        .into_iter()
                        .map(|(name, value)| reinterpret_binary(value).map(|value| (name, value)))
                        .collect::<Result<IndexMap<_, _>>>()
                })
                .collect::<Result<Vec<_>>>()?,
        };

        let source = circuit_path(path, &script.load);
        if source != path {
            clilog::info!("read file: {}", source.display());
        }
        let mut circuit = CircuitDescription::read(&source)?.build(&source)?.init();

        if !script.memory.is_empty() {
            let words = script
                .memory
                .iter()
                .map(|word| parse_binary(word))
                .collect::<Result<Vec<_>>>()?;
            match circuit.find_first_part_mut(PartType::Ram16) {
                Some(ram) => {
                    let written = ram.load_memory(&words);
                    clilog::debug!("preloaded {} words into RAM16", written);
                }
                None => clilog::warn!(
                    "{} memory words given but the circuit has no RAM16, ignoring them",
                    words.len()
                ),
            }
        }

        Ok(Self::new(circuit, script.output, cycles))
    }

    /// Returns the circuit under test.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Returns the connectors reported after each cycle.
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// Runs every cycle in order and collects the reported connectors.
    ///
    /// # Errors
    ///
    /// The first [SimError::IncompleteEvaluation] of any cycle, the cycles after it are not run.
    pub fn run(&mut self, verbosity: u8) -> Result<Report> {
        let mut report = Report::new(self.outputs.clone());
        for (i, inputs) in self.cycles.iter().enumerate() {
            clilog::debug!("cycle {}: {:?}", i, inputs);
            self.circuit
                .run(inputs.iter().map(|(k, v)| (k, *v)), &self.outputs, verbosity)?;

            let row = self
                .outputs
                .iter()
                .map(|name| {
                    self.circuit.con_value(name).and_then(|value| {
                        value.ok_or_else(|| SimError::IncompleteEvaluation(vec![name.clone()]))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            report.push(row);
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_circuit_path() {
        let script = Path::new("tests/data/seq.json");
        assert_eq!(circuit_path(script, "."), script);
        assert_eq!(
            circuit_path(script, "alu.json"),
            Path::new("tests/data/alu.json")
        );
        assert_eq!(
            circuit_path(Path::new("seq.json"), "alu.json"),
            Path::new("alu.json")
        );
    }

    #[test]
    fn test_separate_circuit_file() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "not.json",
            r#"{"Name": "Inverter", "Parts": [{"Name": "Not16", "Con": {"in": "x", "out": "y"}}]}"#,
        );
        let script = write(
            dir.path(),
            "seq.json",
            r#"{"Load": "not.json", "Output": ["x", "y"], "Eval": [{"x": 0}, {"x": 65535}]}"#,
        );

        let mut sequence = Sequence::load(&script).unwrap();
        assert_eq!(sequence.outputs(), ["x", "y"]);
        let report = sequence.run(0).unwrap();
        assert_eq!(report.rows(), [vec![0, 0xFFFF], vec![0xFFFF, 0]]);
        assert_eq!(
            report.lines().collect::<Vec<_>>(),
            ["| 0 | -1 | ", "| -1 | 0 | "]
        );
    }

    #[test]
    fn test_memory_preload() {
        let dir = tempfile::tempdir().unwrap();
        let script = write(
            dir.path(),
            "ram.json",
            r#"{
                "Load": ".",
                "Parts": [{"Name": "RAM16", "Con": {"load": "l", "in": "d", "address": "a", "out": "o"}}],
                "Output": ["o"],
                "Eval": [{"l": 0, "d": 0, "a": 0}, {"l": 0, "d": 0, "a": 1}],
                "Memory": ["101", "1111111111111111"]
            }"#,
        );

        let mut sequence = Sequence::load(&script).unwrap();
        let ram = sequence.circuit().find_first_part(PartType::Ram16).unwrap();
        assert_eq!(&ram.memory()[..3], [5, 0xFFFF, 0]);

        let report = sequence.run(0).unwrap();
        assert_eq!(report.rows(), [vec![5], vec![0xFFFF]]);
    }

    #[test]
    fn test_binary_unit() {
        let dir = tempfile::tempdir().unwrap();
        let script = write(
            dir.path(),
            "adder.json",
            r#"{
                "Load": ".",
                "Parts": [{"Name": "Adder16", "Con": {"a": "a", "b": "b", "out": "sum"}}],
                "Output": ["sum"],
                "Eval": [{"a": 1010, "b": 11}],
                "Unit": "bin"
            }"#,
        );

        let report = Sequence::load(&script).unwrap().run(0).unwrap();
        assert_eq!(report.rows(), [vec![13]]);
    }

    #[test]
    fn test_negative_binary_input() {
        let dir = tempfile::tempdir().unwrap();
        let script = write(
            dir.path(),
            "not.json",
            r#"{
                "Load": ".",
                "Parts": [{"Name": "Not16", "Con": {"in": "x", "out": "y"}}],
                "Output": ["x", "y"],
                "Eval": [{"x": -1}, {"x": -11}],
                "Unit": "bin"
            }"#,
        );

        let report = Sequence::load(&script).unwrap().run(0).unwrap();
        assert_eq!(report.rows(), [vec![-1, 0], vec![-3, 2]]);
        assert_eq!(
            report.lines().collect::<Vec<_>>(),
            ["| -1 | 0 | ", "| -3 | 2 | "]
        );
    }

    #[test]
    fn test_binary_unit_rejects_decimal_digits() {
        let dir = tempfile::tempdir().unwrap();
        let script = write(
            dir.path(),
            "adder.json",
            r#"{
                "Load": ".",
                "Parts": [{"Name": "Not", "Con": {"in": "x", "out": "y"}}],
                "Eval": [{"x": 2}],
                "Unit": "bin"
            }"#,
        );

        let err = Sequence::load(&script).unwrap_err();
        assert!(matches!(err, SimError::InvalidBinaryLiteral(text) if text == "2"));
    }

    #[test]
    fn test_incomplete_cycle_stops_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let script = write(
            dir.path(),
            "and.json",
            r#"{
                "Load": ".",
                "Parts": [{"Name": "And", "Con": {"a": "a", "b": "b", "out": "out"}}],
                "Output": ["out"],
                "Eval": [{"a": 1, "b": 1}, {"a": 1}]
            }"#,
        );

        let err = Sequence::load(&script).unwrap().run(0).unwrap_err();
        assert!(matches!(err, SimError::IncompleteEvaluation(names) if names == ["out"]));
    }

    #[test]
    fn test_missing_circuit_file() {
        let dir = tempfile::tempdir().unwrap();
        let script = write(dir.path(), "seq.json", r#"{"Load": "nope.json"}"#);

        let err = Sequence::load(&script).unwrap_err();
        assert!(
            matches!(err, SimError::FileNotFound { path, .. } if path == dir.path().join("nope.json"))
        );
    }

    #[test]
    fn test_script_without_parts() {
        let dir = tempfile::tempdir().unwrap();
        let script = write(dir.path(), "seq.json", r#"{"Load": ".", "Output": []}"#);

        let err = Sequence::load(&script).unwrap_err();
        assert!(matches!(err, SimError::EmptyCircuit(_)));
    }

    #[test]
    fn test_memory_without_ram() {
        let dir = tempfile::tempdir().unwrap();
        let script = write(
            dir.path(),
            "seq.json",
            r#"{
                "Load": ".",
                "Parts": [{"Name": "One", "Con": {"out": "o"}}],
                "Output": ["o"],
                "Eval": [{}],
                "Memory": ["1"]
            }"#,
        );

        let report = Sequence::load(&script).unwrap().run(0).unwrap();
        assert_eq!(report.rows(), [vec![1]]);
    }
}
