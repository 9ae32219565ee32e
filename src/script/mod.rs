//! Loading circuits and test sequences from JSON files, and reporting their results.
mod description;
mod literal;
mod report;
mod sequence;
pub use description::*;
pub use literal::*;
pub use report::*;
pub use sequence::*;
