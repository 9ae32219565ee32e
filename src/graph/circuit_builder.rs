use super::circuit::Circuit;
use super::connector::*;
use super::handles::*;
use super::part::*;
use crate::data_structures::State;
use crate::error::{Result, SimError};

use indexmap::{IndexMap, IndexSet};
use petgraph::graph::{Graph, NodeIndex};
use petgraph::Direction::{Incoming, Outgoing};
use smallvec::SmallVec;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::path::Path;

/// Data structure that represents a flat circuit of [Parts](Part) wired together by named connectors.
/// It can be [initialized](CircuitBuilder::init) to simulate the circuit.
///
/// Parts are added with [CircuitBuilder::add_part], every pin of the part's [PinLayout] must be
/// mapped to a connector name. Parts that use the same connector name are wired together.
///
/// Once the circuit is initialized, it transforms into a [Circuit] which can't get new parts
/// but can be [run](Circuit::run) once per simulated clock cycle.
///
/// # Examples
/// A half adder.
/// ```
/// # use partsim::CircuitBuilder;
/// let mut g = CircuitBuilder::new();
///
/// g.add_part("Xor", vec![("a", "x"), ("b", "y"), ("out", "sum")]).unwrap();
/// g.add_part("And", vec![("a", "x"), ("b", "y"), ("out", "carry")]).unwrap();
///
/// let c = &mut g.init();
///
/// c.run(vec![("x", 1), ("y", 1)], &["sum", "carry"], 0).unwrap();
/// assert_eq!(c.con_value("sum").unwrap(), Some(0));
/// assert_eq!(c.con_value("carry").unwrap(), Some(1));
/// ```
///
/// A register, its output lags one cycle behind what gets loaded.
/// ```
/// # use partsim::CircuitBuilder;
/// # let mut g = CircuitBuilder::new();
/// g.add_part("Register16", vec![("load", "l"), ("in", "d"), ("out", "o")]).unwrap();
/// let c = &mut g.init();
///
/// c.run(vec![("l", 1), ("d", 5)], &["o"], 0).unwrap();
/// assert_eq!(c.con_value("o").unwrap(), Some(0));
///
/// c.run(vec![("l", 0), ("d", 99)], &["o"], 0).unwrap();
/// assert_eq!(c.con_value("o").unwrap(), Some(5));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CircuitBuilder {
    pub(super) parts: Vec<Part>,
    pub(super) connectors: IndexSet<String>,
}

impl CircuitBuilder {
    /// Returns a new empty [CircuitBuilder].
    pub fn new() -> CircuitBuilder {
        Default::default()
    }

    /// Returns the [ConnectorIndex] of `name`, registering it if it is new.
    fn connector(&mut self, name: &str) -> ConnectorIndex {
        if let Some(idx) = self.connectors.get_index_of(name) {
            return ci!(idx);
        }
        let (idx, _) = self.connectors.insert_full(name.to_owned());
        ci!(idx)
    }

    /// Parses the type tag `ty` and adds a part of that type, see [CircuitBuilder::add].
    ///
    /// # Errors
    ///
    /// [SimError::UnknownPartType] if `ty` is not in the catalog, plus the errors of [CircuitBuilder::add].
    pub fn add_part<'a, I>(&mut self, ty: &str, connections: I) -> Result<PartHandle>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let ty: PartType = ty
            .parse()
            .map_err(|_| SimError::UnknownPartType(ty.to_owned()))?;
        self.add(ty, connections)
    }

    /// Adds a part of type `ty` with its pins connected to the connectors named in `connections`,
    /// a list of (pin, connector) pairs. New connectors are registered unset.
    ///
    /// Pins that the type doesn't have are ignored.
    ///
    /// # Errors
    ///
    /// [SimError::MissingPin] if a pin of the type has no connector, nothing is registered in that case.
    ///
    /// [SimError::InvalidPartDefinition] if the type has no pins at all.
    pub fn add<'a, I>(&mut self, ty: PartType, connections: I) -> Result<PartHandle>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let layout = ty.layout();
        if layout.pin_count() == 0 {
            return Err(SimError::InvalidPartDefinition(ty.to_string()));
        }
        let connections: IndexMap<&str, &str> = connections.into_iter().collect();

        let resolve = |pins: &[&str]| -> Result<SmallVec<[&'a str; 4]>> {
            pins.iter()
                .map(|pin| {
                    connections
                        .get(*pin)
                        .copied()
                        .ok_or_else(|| SimError::MissingPin {
                            part: ty.to_string(),
                            pin: (*pin).to_owned(),
                        })
                })
                .collect()
        };
        let inputs = resolve(layout.inputs)?;
        let outputs = resolve(layout.outputs)?;
        let mids = resolve(layout.mids)?;

        for pin in connections.keys() {
            if !layout.pins().any(|p| p == *pin) {
                clilog::warn!("{} has no pin \"{}\", ignoring it", ty, pin);
            }
        }

        let part = Part::new(
            ty,
            inputs.iter().map(|name| self.connector(name)).collect(),
            outputs.iter().map(|name| self.connector(name)).collect(),
            mids.iter().map(|name| self.connector(name)).collect(),
        );
        self.parts.push(part);
        Ok(PartHandle(self.parts.len() - 1))
    }

    /// Returns the [ConnectorIndex] of `name` if it has been registered.
    pub fn connector_index(&self, name: &str) -> Option<ConnectorIndex> {
        self.connectors.get_index_of(name).map(|idx| ci!(idx))
    }

    /// Returns the name of the connector at `idx`.
    pub fn connector_name(&self, idx: ConnectorIndex) -> Option<&str> {
        self.connectors.get_index(idx.idx).map(String::as_str)
    }

    /// Returns an immutable reference to the [Part] of `handle`.
    pub fn part(&self, handle: PartHandle) -> &Part {
        &self.parts[handle.0]
    }

    /// Returns the number of parts in the circuit.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns true if no part has been added.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Returns the number of registered connectors.
    pub fn connector_count(&self) -> usize {
        self.connectors.len()
    }

    /// Returns the order in which [Circuit::run] scans the parts.
    ///
    /// Parts come after every part that drives one of their inputs, ties are broken by insertion order.
    /// Parts that sit on or behind a combinational loop can't be ordered, they go last in insertion order.
    pub fn schedule(&self) -> Vec<PartHandle> {
        let graph = dependency_graph(&self.parts);
        let mut in_degree: Vec<usize> = graph
            .node_indices()
            .map(|n| graph.neighbors_directed(n, Incoming).count())
            .collect();

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(self.parts.len());
        let mut scheduled = vec![false; self.parts.len()];
        while let Some(Reverse(i)) = ready.pop() {
            order.push(PartHandle(i));
            scheduled[i] = true;
            for dependent in graph.neighbors_directed(NodeIndex::new(i), Outgoing) {
                let degree = &mut in_degree[dependent.index()];
                *degree -= 1;
                if *degree == 0 {
                    ready.push(Reverse(dependent.index()));
                }
            }
        }

        let looped = scheduled.iter().filter(|s| !**s).count();
        if looped > 0 {
            clilog::debug!("{} parts are on or behind a combinational loop", looped);
        }
        order.extend((0..self.parts.len()).filter(|i| !scheduled[*i]).map(PartHandle));
        order
    }

    /// Returns a new [Circuit] created from `self` with every connector unset.
    pub fn init(self) -> Circuit {
        let schedule = self.schedule();
        let CircuitBuilder { parts, connectors } = self;
        clilog::debug!(
            "initialized circuit, parts:{}, connectors:{}",
            parts.len(),
            connectors.len()
        );
        Circuit {
            state: State::new(connectors.len()),
            schedule: schedule.into(),
            parts,
            connectors,
        }
    }

    /// Dumps the part dependency graph in [dot](https://en.wikipedia.org/wiki/DOT_(graph_description_language)) format
    /// to path `filename`.
    pub fn dump_dot<P: AsRef<Path>>(&self, filename: P) -> std::io::Result<()> {
        write_dot(&self.parts, &self.connectors, filename.as_ref())
    }
}

/// Returns a graph with a node per part, in insertion order, and an edge from every part that drives a connector
/// to every part that reads it during the combinational pass.
pub(super) fn dependency_graph(parts: &[Part]) -> Graph<PartHandle, ConnectorIndex> {
    let mut graph = Graph::with_capacity(parts.len(), parts.len());
    for i in 0..parts.len() {
        graph.add_node(PartHandle(i));
    }

    let mut drivers = HashMap::<ConnectorIndex, SmallVec<[usize; 1]>>::new();
    for (i, part) in parts.iter().enumerate() {
        for output in &part.outputs {
            drivers.entry(*output).or_default().push(i);
        }
    }
    for (i, part) in parts.iter().enumerate() {
        for input in &part.inputs {
            for driver in drivers.get(input).into_iter().flatten() {
                graph.add_edge(NodeIndex::new(*driver), NodeIndex::new(i), *input);
            }
        }
    }
    graph
}

/// Writes the dependency graph of `parts` to `filename`, nodes are labeled with the part type and
/// edges with the connector name.
pub(super) fn write_dot(
    parts: &[Part],
    connectors: &IndexSet<String>,
    filename: &Path,
) -> std::io::Result<()> {
    use petgraph::dot::Dot;
    use std::io::Write;

    let graph = dependency_graph(parts).map(
        |_, handle| format!("{}{}", parts[handle.0].ty(), handle),
        |_, connector| connectors[connector.idx].clone(),
    );
    let mut f = std::fs::File::create(filename)?;
    write!(f, "{}", Dot::new(&graph))
}
