pub mod masonry;

pub use masonry::*;
