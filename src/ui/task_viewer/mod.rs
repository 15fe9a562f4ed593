pub mod app;
pub mod model;
pub mod view;

pub use app::{run, ViewerOptions};
