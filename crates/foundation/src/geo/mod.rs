pub mod coordinate;

pub use coordinate::*;
