use crate::graph::Value;
use unwrap::unwrap;

/// Data structure that holds the value of every connector in a circuit for the current cycle.
///
/// A connector is either set to a [Value] or unset, meaning nothing has driven it since the
/// last call to [State::reset].
/// # Example
/// ```
/// # use partsim::data_structures::State;
/// let mut s = State::new(2);
///
/// assert_eq!(s.get(1), None);
///
/// s.set(1, 7);
/// assert_eq!(s.get(1), Some(7));
/// assert_eq!(s.is_set(1), true);
///
/// s.reset();
/// assert_eq!(s.get(1), None);
/// ```
///
/// # Panics
///
/// Panics if you try to read or write to an index >= [State::len()]
///
/// ```should_panic
/// # use partsim::data_structures::State;
/// let mut s = State::new(2);
///
/// s.get(2);
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Hash, Default)]
pub struct State {
    values: Vec<Option<Value>>,
}
impl State {
    /// Returns a new [State] with `n` connectors, all of them unset.
    pub fn new(n: usize) -> State {
        State {
            values: vec![None; n],
        }
    }

    #[inline(always)]
    fn slot(&self, index: usize) -> &Option<Value> {
        unwrap!(
            self.values.get(index),
            "Tried to access index out of bounds:{}, size:{}",
            index,
            self.values.len(),
        )
    }

    /// Returns the value at `index` or None if it is unset.
    ///
    /// # Panics
    ///
    /// Panics if `index` >= [State::len()]
    pub fn get(&self, index: usize) -> Option<Value> {
        *self.slot(index)
    }

    /// Returns the value at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` >= [State::len()] or if the connector is unset.
    pub fn value(&self, index: usize) -> Value {
        unwrap!(*self.slot(index), "Tried to read unset connector:{}", index)
    }

    /// Returns true if the connector at `index` holds a value.
    ///
    /// # Panics
    ///
    /// Panics if `index` >= [State::len()]
    pub fn is_set(&self, index: usize) -> bool {
        self.slot(index).is_some()
    }

    /// Sets the connector at `index` to `value`.
    ///
    /// # Panics
    ///
    /// Panics if `index` >= [State::len()]
    pub fn set(&mut self, index: usize, value: Value) {
        let len = self.values.len();
        let slot = unwrap!(
            self.values.get_mut(index),
            "Tried to write to index:{} >= State::len():{}",
            index,
            len
        );
        *slot = Some(value);
    }

    /// Appends a new unset connector and returns its index.
    pub fn push(&mut self) -> usize {
        self.values.push(None);
        self.values.len() - 1
    }

    /// Unsets every connector.
    pub fn reset(&mut self) {
        for value in &mut self.values {
            *value = None
        }
    }

    /// Returns the number of connectors in the [State].
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the [State] has no connectors.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
