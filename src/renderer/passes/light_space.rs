//! Light-Space Pass
//!
//! Renders every drawable once per [`LightPass`](crate::shadow::LightPass)
//! of the frame plan. Depth-only targets get the depth pipeline; moments
//! targets additionally write (depth, depth²) into the pass's layer.
//! Each pass clears its attachments first: depth to 1.0, moments to (1, 1).

use glam::Mat4;

use super::{FrameContext, RenderNode};
use crate::renderer::core::{DynamicUniforms, create_shader};
use crate::renderer::targets::{LIGHT_DEPTH_FORMAT, MOMENTS_FORMAT};
use crate::resources::Vertex;

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct LightDraw {
    world: Mat4,
    view_projection: Mat4,
}

pub struct LightSpacePass {
    depth_pipeline: wgpu::RenderPipeline,
    moments_pipeline: wgpu::RenderPipeline,
    draw_layout: wgpu::BindGroupLayout,
    draws: DynamicUniforms<LightDraw>,
}

impl LightSpacePass {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Light Draw BindGroup Layout"),
            entries: &[DynamicUniforms::<LightDraw>::layout_entry(wgpu::ShaderStages::VERTEX)],
        });
        let draws = DynamicUniforms::new(device, &draw_layout, "Light Draw Uniforms");

        let module = create_shader(
            device,
            "Light Space Shader",
            include_str!("../shaders/light_space.wgsl"),
        );
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Light Space Pipeline Layout"),
            bind_group_layouts: &[Some(&draw_layout)],
            immediate_size: 0,
        });

        let depth_pipeline = Self::create_pipeline(device, &module, &pipeline_layout, false);
        let moments_pipeline = Self::create_pipeline(device, &module, &pipeline_layout, true);

        Self {
            depth_pipeline,
            moments_pipeline,
            draw_layout,
            draws,
        }
    }

    fn create_pipeline(
        device: &wgpu::Device,
        module: &wgpu::ShaderModule,
        layout: &wgpu::PipelineLayout,
        with_moments: bool,
    ) -> wgpu::RenderPipeline {
        let moments_targets = [Some(wgpu::ColorTargetState {
            format: MOMENTS_FORMAT,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL,
        })];

        // Slope bias only matters for the hardware depth comparison
        let bias = if with_moments {
            wgpu::DepthBiasState::default()
        } else {
            wgpu::DepthBiasState {
                constant: 2,
                slope_scale: 2.0,
                clamp: 0.0,
            }
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(if with_moments {
                "Light Moments Pipeline"
            } else {
                "Light Depth Pipeline"
            }),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: with_moments.then(|| wgpu::FragmentState {
                module,
                entry_point: Some("fs_moments"),
                targets: &moments_targets,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: LIGHT_DEPTH_FORMAT,
                depth_write_enabled: Some(true),
                depth_compare: Some(wgpu::CompareFunction::Less),
                stencil: wgpu::StencilState::default(),
                bias,
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }
}

impl RenderNode for LightSpacePass {
    fn name(&self) -> &'static str {
        "Light Space Pass"
    }

    fn prepare(&mut self, ctx: &FrameContext<'_>) {
        if !ctx.targets.complete || ctx.plan.light_passes.is_empty() {
            return;
        }

        let drawables = &ctx.scene.drawables;
        let items: Vec<LightDraw> = ctx
            .plan
            .light_passes
            .iter()
            .flat_map(|pass| {
                drawables.iter().map(move |drawable| LightDraw {
                    world: drawable.world,
                    view_projection: pass.view_projection,
                })
            })
            .collect();

        self.draws
            .upload(&ctx.wgpu.device, &ctx.wgpu.queue, &self.draw_layout, &items);
    }

    fn run(&self, ctx: &FrameContext<'_>, encoder: &mut wgpu::CommandEncoder) {
        // Attachments of a fallback target don't match in size
        if !ctx.targets.complete {
            return;
        }

        let with_moments = ctx.plan.target.has_moments();
        let pipeline = if with_moments {
            &self.moments_pipeline
        } else {
            &self.depth_pipeline
        };
        let drawables = &ctx.scene.drawables;

        for (pass_index, light_pass) in ctx.plan.light_passes.iter().enumerate() {
            let color_view = if with_moments {
                let layer = light_pass.layer as usize;
                let Some(view) = ctx.targets.moments.layer_views.get(layer) else {
                    log::warn!("No moments layer {} for light pass", light_pass.layer);
                    continue;
                };
                Some(view)
            } else {
                None
            };

            let color_attachments = [color_view.map(|view| wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: 1.0,
                        g: 1.0,
                        b: 0.0,
                        a: 0.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })];

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Light Space Pass"),
                color_attachments: if with_moments { &color_attachments } else { &[] },
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &ctx.targets.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_pipeline(pipeline);
            for (draw_index, drawable) in drawables.iter().enumerate() {
                let Some(mesh) = ctx.meshes.get(drawable.mesh.0) else {
                    continue;
                };
                let offset = self.draws.offset(pass_index * drawables.len() + draw_index);
                pass.set_bind_group(0, self.draws.bind_group(), &[offset]);
                mesh.draw(&mut pass);
            }
        }
    }
}
