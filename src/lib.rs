pub mod data_structures;
pub mod error;
pub mod graph;
pub mod script;
pub use error::*;
pub use graph::*;
pub use script::*;
