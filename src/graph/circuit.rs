use super::circuit_builder::write_dot;
use super::connector::*;
use super::handles::*;
use super::part::*;
use crate::data_structures::{Immutable, State};
use crate::error::{Result, SimError};

use indexmap::IndexSet;
use std::fmt::{self, Display, Formatter};
use std::path::Path;

/// Initialized version of [`CircuitBuilder`]. See [`CircuitBuilder`] for documentation.
///
/// Every call to [Circuit::run] simulates one clock cycle: connectors are reset, inputs are driven,
/// parts are evaluated until nothing else can be evaluated and finally clocked parts commit their memory.
///
/// [`CircuitBuilder`]: super::CircuitBuilder
#[derive(Debug, Clone)]
pub struct Circuit {
    pub(super) parts: Vec<Part>,
    pub(super) schedule: Immutable<Vec<PartHandle>>,
    pub(super) connectors: IndexSet<String>,
    pub(super) state: State,
}

#[allow(clippy::len_without_is_empty)]
impl Circuit {
    /// Returns the index of connector `name`, registering it if needed.
    fn connector_or_register(&mut self, name: &str) -> usize {
        if let Some(idx) = self.connectors.get_index_of(name) {
            return idx;
        }
        clilog::warn!("input connector {} is not used by any part", name);
        let (idx, _) = self.connectors.insert_full(name.to_owned());
        let state_idx = self.state.push();
        debug_assert_eq!(idx, state_idx);
        idx
    }

    /// Runs a full combinational pass: scans the schedule over and over, simulating every part that is
    /// ready, until a scan doesn't simulate anything.
    ///
    /// Returns the number of scans.
    fn settle(&mut self, verbosity: u8) -> usize {
        let mut scans = 0;
        let mut fired_total = 0;
        loop {
            let mut fired = 0;
            for handle in self.schedule.iter() {
                let part = &self.parts[handle.0];
                if part.is_ready(&self.state) {
                    part.simulate(&mut self.state);
                    fired += 1;
                }
            }
            scans += 1;
            fired_total += fired;
            if verbosity > 0 {
                clilog::info!("scan {}, fired {}: {}", scans, fired, self);
            }
            if fired == 0 {
                break;
            }
        }
        clilog::debug!(
            "fixed point reached after {} scans, {} parts simulated",
            scans,
            fired_total
        );
        scans
    }

    /// Simulates one clock cycle.
    ///
    /// 1. Every connector is unset.
    /// 2. Each (connector, value) pair in `inputs` is driven. Names no part uses are registered with a warning.
    /// 3. Parts whose inputs are all set and whose outputs are all unset are simulated until none is left.
    /// 4. Every part commits, in insertion order, so clocked parts latch what was staged this cycle.
    /// 5. Every connector in `required` must hold a value.
    ///
    /// With `verbosity` > 0 every connector is logged after each scan of step 3.
    ///
    /// # Errors
    ///
    /// [SimError::IncompleteEvaluation] naming every connector in `required` that is still unset, either
    /// because nothing drives it or because it depends on a combinational loop. Memory has already been
    /// committed when this is returned.
    ///
    /// # Example
    /// ```
    /// # use partsim::{CircuitBuilder, SimError};
    /// let mut g = CircuitBuilder::new();
    /// g.add_part("Not", vec![("in", "x"), ("out", "y")]).unwrap();
    /// let c = &mut g.init();
    ///
    /// c.run(vec![("x", 1)], &["y"], 0).unwrap();
    /// assert_eq!(c.con_value("y").unwrap(), Some(0));
    ///
    /// // Nothing drives x.
    /// let err = c.run(Vec::<(&str, i64)>::new(), &["y"], 0).unwrap_err();
    /// assert!(matches!(err, SimError::IncompleteEvaluation(_)));
    /// ```
    pub fn run<I, K, R>(&mut self, inputs: I, required: R, verbosity: u8) -> Result<()>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        self.state.reset();
        for (name, value) in inputs {
            let idx = self.connector_or_register(name.as_ref());
            self.state.set(idx, value);
        }

        self.settle(verbosity);

        for part in &mut self.parts {
            part.commit(&self.state);
        }

        let missing: Vec<String> = required
            .into_iter()
            .filter(|name| self.value(name.as_ref()).is_none())
            .map(|name| name.as_ref().to_owned())
            .collect();
        if !missing.is_empty() {
            return Err(SimError::IncompleteEvaluation(missing));
        }
        Ok(())
    }

    /// Returns the value of connector `name`, None if it is unset or unknown.
    fn value(&self, name: &str) -> Option<Value> {
        let idx = self.connectors.get_index_of(name)?;
        self.state.get(idx)
    }

    /// Returns the current value of connector `name`, None if it was not evaluated in the last cycle.
    ///
    /// # Errors
    ///
    /// [SimError::UnknownConnector] if no part uses `name` and it was never driven as an input.
    pub fn con_value(&self, name: &str) -> Result<Option<Value>> {
        let idx = self
            .connectors
            .get_index_of(name)
            .ok_or_else(|| SimError::UnknownConnector(name.to_owned()))?;
        Ok(self.state.get(idx))
    }

    /// Returns an iterator over every connector name and its current value, in registration order.
    pub fn connectors(&self) -> impl Iterator<Item = (&str, Option<Value>)> + '_ {
        self.connectors
            .iter()
            .enumerate()
            .map(move |(i, name)| (name.as_str(), self.state.get(i)))
    }

    /// Returns the first part of type `ty` in insertion order.
    pub fn find_first_part(&self, ty: PartType) -> Option<&Part> {
        self.parts.iter().find(|part| part.ty() == ty)
    }

    /// Returns the first part of type `ty` in insertion order, mutably so its memory can be preloaded.
    pub fn find_first_part_mut(&mut self, ty: PartType) -> Option<&mut Part> {
        self.parts.iter_mut().find(|part| part.ty() == ty)
    }

    /// Returns an immutable reference to the [Part] of `handle`.
    pub fn part(&self, handle: PartHandle) -> &Part {
        &self.parts[handle.0]
    }

    /// Returns a mutable reference to the [Part] of `handle`.
    pub fn part_mut(&mut self, handle: PartHandle) -> &mut Part {
        &mut self.parts[handle.0]
    }

    /// Returns the parts in insertion order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Returns the order in which parts are scanned, see [CircuitBuilder::schedule](super::CircuitBuilder::schedule).
    pub fn schedule(&self) -> &[PartHandle] {
        &self.schedule
    }

    /// Returns the number of parts in the circuit.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Dumps the part dependency graph in [dot](https://en.wikipedia.org/wiki/DOT_(graph_description_language)) format
    /// to path `filename`.
    pub fn dump_dot<P: AsRef<Path>>(&self, filename: P) -> std::io::Result<()> {
        write_dot(&self.parts, &self.connectors, filename.as_ref())
    }
}

/// Formats every connector as `{name: value, ...}`, unset connectors show as `-`.
impl Display for Circuit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.connectors().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match value {
                Some(v) => write!(f, "{}: {}", name, v)?,
                None => write!(f, "{}: -", name)?,
            }
        }
        write!(f, "}}")
    }
}
