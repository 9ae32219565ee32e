use std::ops::Deref;

/// Wrapper for fields that are fixed once a circuit is initialized.
#[repr(transparent)]
#[derive(Debug, Clone)]
pub struct Immutable<T>(T);
impl<T> Immutable<T> {
    pub fn new(i: T) -> Self {
        Self(i)
    }
    #[inline(always)]
    pub fn get(&self) -> &T {
        &self.0
    }
}

impl<T> Deref for Immutable<T> {
    type Target = T;
    #[inline(always)]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> From<T> for Immutable<T> {
    fn from(i: T) -> Self {
        Self(i)
    }
}
