use std::fmt::{self, Display, Formatter};

/// Value carried by a connector.
///
/// Parts only ever produce values inside their lane width, but inputs driven from outside
/// the circuit are taken as they come and masked by whatever reads them.
pub type Value = i64;

/// Mask of a 1 bit lane.
pub const MASK_1: Value = 0x1;
/// Mask of a 16 bit lane.
pub const MASK_16: Value = 0xFFFF;

/// Represents the index of a connector in a [super::CircuitBuilder] or [super::Circuit].
#[repr(transparent)]
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct ConnectorIndex {
    pub(super) idx: usize,
}

/// Returns a new ConnectorIndex from a provided usize.
macro_rules! ci {
    ( $x:expr ) => {{
        ConnectorIndex::new($x)
    }};
}

impl ConnectorIndex {
    /// Returns a new ConnectorIndex from a provided usize.
    pub(super) const fn new(idx: usize) -> ConnectorIndex {
        ConnectorIndex { idx }
    }

    /// Returns the position of the connector in the circuit's connector arena.
    pub fn idx(&self) -> usize {
        self.idx
    }
}

impl Display for ConnectorIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.idx)
    }
}
