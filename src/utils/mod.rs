//! Utility Module
//!
//! - [`FpsCounter`]: frame rate measurement for the title bar and the log

pub mod fps_counter;

pub use fps_counter::{FpsCounter, FpsReport};
