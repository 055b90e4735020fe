pub mod load_state;
pub mod presenter;
pub mod request;

pub use load_state::*;
pub use presenter::*;
pub use request::*;
