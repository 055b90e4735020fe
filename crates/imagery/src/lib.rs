pub mod compositor;
pub mod fetcher;
pub mod layout;
pub mod pipeline;
pub mod placeholder;
pub mod provider;
pub mod texture;

pub use compositor::*;
pub use fetcher::*;
pub use layout::*;
pub use pipeline::*;
pub use placeholder::*;
pub use provider::*;
pub use texture::*;
