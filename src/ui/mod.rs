pub mod grid_view;
pub mod lightbox;
pub mod tile_widget;
pub mod window;

pub use window::MainWindow;
