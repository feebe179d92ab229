pub mod content_store;
pub mod project;

pub use content_store::*;
pub use project::*;
