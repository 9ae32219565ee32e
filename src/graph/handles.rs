use std::fmt::{self, Display, Formatter};

/// Handle to a part in a [super::CircuitBuilder] or [super::Circuit], its position in insertion order.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PartHandle(pub(super) usize);

impl PartHandle {
    /// Returns the insertion position of the part.
    pub fn position(&self) -> usize {
        self.0
    }
}

impl Display for PartHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
