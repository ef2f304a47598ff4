#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! # Shadow Lab
//!
//! Renders a small scene with a single shadow-casting light and lets the
//! operator switch between four shadow algorithms at runtime:
//!
//! | Key | Algorithm | Light-space products                    |
//! |-----|-----------|-----------------------------------------|
//! | `1` | PCF       | depth map                               |
//! | `2` | VSM       | (depth, depth²) moments                 |
//! | `3` | PSVSM     | one moments layer per cascade           |
//! | `4` | SATVSM    | moments + summed-area table             |
//!
//! The algorithmic core lives in [`shadow`] and has no GPU dependency; the
//! [`renderer`] executes the per-frame [`shadow::FramePlan`] with wgpu.

pub mod app;
pub mod errors;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod shadow;
pub mod utils;

pub use app::{App, Command, Controls};
pub use errors::{Result, ShadowLabError};
pub use renderer::settings::RenderSettings;
pub use renderer::Renderer;
pub use scene::{Camera, Light, LightSet, Scene};
pub use shadow::{
    CascadeSplits, CropSolver, FramePlan, ShadowAlgorithm, ShadowStateMachine, ShadowStrategy,
};
