//! Render Passes
//!
//! The nodes a frame runs through, in order:
//!
//! ```text
//! LightSpacePass → (SatPass) → ScenePass → Surface
//! ```
//!
//! Every node follows the same two-phase protocol: `prepare` uploads
//! uniforms and (re)creates resources, `run` only records commands.

pub mod light_space;
pub mod sat;
pub mod scene;

pub use light_space::LightSpacePass;
pub use sat::SatPass;
pub use scene::ScenePass;

use crate::renderer::core::{GpuMesh, WgpuContext};
use crate::renderer::settings::RenderSettings;
use crate::renderer::targets::PreparedTargets;
use crate::scene::Scene;
use crate::shadow::FramePlan;

/// Read-only state shared by every node for one frame.
pub struct FrameContext<'a> {
    pub wgpu: &'a WgpuContext,
    pub settings: &'a RenderSettings,
    pub scene: &'a Scene,
    /// Uploaded meshes, parallel to `scene.meshes`.
    pub meshes: &'a [GpuMesh],
    pub plan: &'a FramePlan,
    pub targets: PreparedTargets<'a>,
    pub surface_view: &'a wgpu::TextureView,
}

pub trait RenderNode {
    fn name(&self) -> &'static str;

    /// Uploads per-frame data and builds bind groups.
    fn prepare(&mut self, _ctx: &FrameContext<'_>) {}

    /// Records GPU commands.
    fn run(&self, ctx: &FrameContext<'_>, encoder: &mut wgpu::CommandEncoder);
}
