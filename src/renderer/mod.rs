//! Rendering System
//!
//! [`Renderer`] owns the GPU context, the uploaded scene geometry, the
//! light-space targets and the render nodes. Once per frame it asks the
//! [`ShadowStateMachine`] for a [`FramePlan`](crate::shadow::FramePlan),
//! makes sure the plan's targets exist, and runs the nodes:
//!
//! ```text
//! begin_frame → prepare targets → LightSpacePass → SatPass → ScenePass → present
//! ```
//!
//! The renderer never branches on the algorithm itself; everything it does
//! follows from the plan.

pub mod core;
pub mod passes;
pub mod settings;
pub mod targets;

use glam::UVec2;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use self::core::{GpuMesh, WgpuContext};
use self::passes::{FrameContext, LightSpacePass, RenderNode, SatPass, ScenePass};
use self::settings::RenderSettings;
use self::targets::LightTargets;
use crate::errors::Result;
use crate::scene::Scene;
use crate::shadow::{FrameInputs, MAX_CASCADES, ShadowAlgorithm, ShadowStateMachine};

pub struct Renderer {
    settings: RenderSettings,
    context: WgpuContext,
    meshes: Vec<GpuMesh>,
    targets: LightTargets,

    // === Render Nodes ===
    light_pass: LightSpacePass,
    sat_pass: SatPass,
    scene_pass: ScenePass,

    state: ShadowStateMachine,
    cascade_count: usize,
}

impl Renderer {
    /// Creates the GPU context for `window` and uploads `scene`'s meshes.
    ///
    /// Fails on invalid settings or when no adapter/device/surface can be
    /// created.
    pub async fn new<W>(
        window: W,
        settings: RenderSettings,
        scene: &Scene,
        algorithm: ShadowAlgorithm,
    ) -> Result<Self>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        settings.validate()?;

        let context =
            WgpuContext::new(window, &settings, settings.frame_width, settings.frame_height)
                .await?;
        let device = &context.device;

        let meshes = scene
            .meshes
            .iter()
            .enumerate()
            .map(|(index, mesh)| GpuMesh::upload(device, &format!("Mesh {index}"), mesh))
            .collect();

        let targets = LightTargets::new(device);
        let light_pass = LightSpacePass::new(device);
        let sat_pass = SatPass::new(device, settings.sat_base);
        let scene_pass = ScenePass::new(device, context.color_format(), context.depth_format);

        log::info!(">> {} Selected", algorithm.label());

        Ok(Self {
            cascade_count: settings.cascade_count,
            settings,
            context,
            meshes,
            targets,
            light_pass,
            sat_pass,
            scene_pass,
            state: ShadowStateMachine::new(algorithm),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
    }

    /// Requests a switch to `algorithm`, applied at the next frame.
    pub fn select_algorithm(&mut self, algorithm: ShadowAlgorithm) -> bool {
        self.state.select(algorithm)
    }

    #[must_use]
    pub fn algorithm(&self) -> ShadowAlgorithm {
        self.state.active()
    }

    #[must_use]
    pub fn cascade_count(&self) -> usize {
        self.cascade_count
    }

    /// Sets the cascade count, clamped to `[1, MAX_CASCADES]`, and returns
    /// the value in effect.
    pub fn set_cascade_count(&mut self, count: usize) -> usize {
        self.cascade_count = count.clamp(1, MAX_CASCADES);
        self.cascade_count
    }

    #[must_use]
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    #[must_use]
    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.context.adapter_info
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.context.size()
    }

    /// Renders one frame of `scene` and presents it.
    pub fn render(&mut self, scene: &Scene) {
        let (width, height) = self.context.size();
        let inputs = FrameInputs {
            camera: &scene.camera,
            light_camera: &scene.light_camera,
            cascade_count: self.cascade_count,
            split_weight: self.settings.split_weight,
            padding_grid: UVec2::new(width, height),
        };
        let plan = self.state.begin_frame(&inputs);

        let Some(output) = self.context.acquire_frame() else {
            return;
        };
        let surface_view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let targets = self
            .targets
            .prepare(&self.context.device, plan.target, self.settings.shadow_map_size);

        let ctx = FrameContext {
            wgpu: &self.context,
            settings: &self.settings,
            scene,
            meshes: &self.meshes,
            plan: &plan,
            targets,
            surface_view: &surface_view,
        };

        let mut nodes: [&mut dyn RenderNode; 3] =
            [&mut self.light_pass, &mut self.sat_pass, &mut self.scene_pass];
        for node in &mut nodes {
            node.prepare(&ctx);
        }

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        for node in &nodes {
            encoder.push_debug_group(node.name());
            node.run(&ctx, &mut encoder);
            encoder.pop_debug_group();
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}
