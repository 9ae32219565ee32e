#[macro_use]
mod connector;
mod circuit;
mod circuit_builder;
mod handles;
mod part;
pub use circuit::*;
pub use circuit_builder::*;
pub use connector::*;
pub use handles::*;
pub use part::*;
