pub mod crossing;
pub mod milestone;
pub mod pose;
pub mod sampler;
pub mod scripted;

pub use crossing::*;
pub use milestone::*;
pub use pose::*;
pub use sampler::*;
pub use scripted::*;
