pub mod paging;
pub mod selection;
pub mod trigger;

pub use paging::*;
pub use selection::*;
pub use trigger::*;
