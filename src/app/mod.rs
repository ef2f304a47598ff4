//! Application Layer
//!
//! - [`winit`]: window, event loop and frame loop ([`App`])
//! - [`controls`]: input bindings ([`Controls`], [`Command`])

pub mod controls;
pub mod winit;

pub use controls::{Command, Controls};
pub use self::winit::App;
