pub mod geo;
pub mod math;
pub mod time;

// Foundation crate: small, well-tested primitives only.
pub use geo::*;
pub use math::*;
pub use time::*;
