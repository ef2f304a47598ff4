//! Scene Pass
//!
//! Draws the scene from the viewer camera onto the surface. One pipeline per
//! [`Evaluation`]; the frame plan picks which one runs and which light-space
//! resources it samples.
//!
//! Bind groups:
//! - group 0: [`FrameUniforms`] (cameras, light, cascades, filter params)
//! - group 1: per-drawable world transform and color (dynamic offset)
//! - group 2: shadow resources, depth + comparison sampler or moments array

use glam::{Mat4, UVec4, Vec3, Vec4};

use super::{FrameContext, RenderNode};
use crate::renderer::core::{DynamicUniforms, create_shader};
use crate::resources::Vertex;
use crate::scene::Light;
use crate::shadow::{Evaluation, FramePlan, MAX_CASCADES};

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct FrameUniforms {
    view_projection: Mat4,
    view: Mat4,
    light_view_projection: Mat4,
    cascade_view_projections: [Mat4; MAX_CASCADES],
    cascade_far: Vec4,
    camera_position: Vec4,
    light_position: Vec4,
    light_direction: Vec4,
    light_ambient: Vec4,
    light_diffuse: Vec4,
    light_specular: Vec4,
    vsm_params: Vec4,
    shadow_params: UVec4,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct SceneDraw {
    world: Mat4,
    diffuse: Vec4,
}

const FRAGMENT_ENTRY_POINTS: [&str; Evaluation::COUNT] =
    ["fs_pcf", "fs_vsm", "fs_psvsm", "fs_satvsm"];

pub struct ScenePass {
    pipelines: Vec<wgpu::RenderPipeline>,

    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    draw_layout: wgpu::BindGroupLayout,
    draws: DynamicUniforms<SceneDraw>,

    depth_shadow_layout: wgpu::BindGroupLayout,
    moments_shadow_layout: wgpu::BindGroupLayout,
    comparison_sampler: wgpu::Sampler,

    /// Rebuilt each frame; targets may change between frames.
    shadow_bind_group: Option<wgpu::BindGroup>,
}

impl ScenePass {
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Frame Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<FrameUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });
        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Frame Uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Frame BindGroup"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Draw Layout"),
            entries: &[DynamicUniforms::<SceneDraw>::layout_entry(
                wgpu::ShaderStages::VERTEX_FRAGMENT,
            )],
        });
        let draws = DynamicUniforms::new(device, &draw_layout, "Scene Draw Uniforms");

        let depth_shadow_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Depth Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });
        let moments_shadow_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Shadow Moments Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2Array,
                        multisampled: false,
                    },
                    count: None,
                }],
            });

        let comparison_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Comparison Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let module = create_shader(device, "Scene Shader", include_str!("../shaders/scene.wgsl"));
        let pipelines = FRAGMENT_ENTRY_POINTS
            .into_iter()
            .enumerate()
            .map(|(index, entry_point)| {
                let shadow_layout = if index == Evaluation::DepthCompare.index() {
                    &depth_shadow_layout
                } else {
                    &moments_shadow_layout
                };
                let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("Scene Pipeline Layout"),
                    bind_group_layouts: &[Some(&frame_layout), Some(&draw_layout), Some(shadow_layout)],
                    immediate_size: 0,
                });

                device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(entry_point),
                    layout: Some(&layout),
                    vertex: wgpu::VertexState {
                        module: &module,
                        entry_point: Some("vs_main"),
                        buffers: &[Vertex::layout()],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &module,
                        entry_point: Some(entry_point),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: color_format,
                            blend: Some(wgpu::BlendState::REPLACE),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        cull_mode: None,
                        ..Default::default()
                    },
                    depth_stencil: Some(wgpu::DepthStencilState {
                        format: depth_format,
                        depth_write_enabled: Some(true),
                        depth_compare: Some(wgpu::CompareFunction::Less),
                        stencil: wgpu::StencilState::default(),
                        bias: wgpu::DepthBiasState::default(),
                    }),
                    multisample: wgpu::MultisampleState::default(),
                    multiview_mask: None,
                    cache: None,
                })
            })
            .collect();

        Self {
            pipelines,
            frame_buffer,
            frame_bind_group,
            draw_layout,
            draws,
            depth_shadow_layout,
            moments_shadow_layout,
            comparison_sampler,
            shadow_bind_group: None,
        }
    }

    fn frame_uniforms(ctx: &FrameContext<'_>) -> FrameUniforms {
        let scene = ctx.scene;
        let settings = ctx.settings;
        let plan: &FramePlan = ctx.plan;

        let mut cascade_view_projections = [plan.light_view_projection; MAX_CASCADES];
        for (slot, crop) in cascade_view_projections.iter_mut().zip(&plan.cascades) {
            *slot = crop.view_projection;
        }
        let cascade_far = plan
            .splits
            .as_ref()
            .map_or(Vec4::splat(scene.camera.far()), |splits| {
                Vec4::from_array(splits.far_planes())
            });

        let lights = &scene.lights;
        // Without lights only the clear color and black geometry remain
        let light = lights
            .active()
            .copied()
            .unwrap_or_else(|| Light::new(Vec4::ZERO, Vec3::NEG_Y));

        FrameUniforms {
            view_projection: scene.camera.view_projection_matrix(),
            view: scene.camera.view_matrix(),
            light_view_projection: plan.light_view_projection,
            cascade_view_projections,
            cascade_far,
            camera_position: scene.camera.position().extend(1.0),
            light_position: light.position,
            light_direction: light.direction.extend(0.0),
            light_ambient: light.ambient,
            light_diffuse: light.diffuse,
            light_specular: light.specular,
            vsm_params: Vec4::new(
                settings.vsm_min_variance,
                settings.vsm_light_bleed_reduction,
                light.shininess,
                if lights.is_on() && !lights.is_empty() { 1.0 } else { 0.0 },
            ),
            shadow_params: UVec4::new(
                settings.pcf_radius,
                plan.cascades.len() as u32,
                settings.sat_filter_radius,
                0,
            ),
        }
    }
}

impl RenderNode for ScenePass {
    fn name(&self) -> &'static str {
        "Scene Pass"
    }

    fn prepare(&mut self, ctx: &FrameContext<'_>) {
        let device = &ctx.wgpu.device;
        let queue = &ctx.wgpu.queue;

        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&Self::frame_uniforms(ctx)));

        let draws: Vec<SceneDraw> = ctx
            .scene
            .drawables
            .iter()
            .map(|drawable| SceneDraw {
                world: drawable.world,
                diffuse: drawable.diffuse,
            })
            .collect();
        self.draws.upload(device, queue, &self.draw_layout, &draws);

        self.shadow_bind_group = Some(if ctx.plan.evaluation == Evaluation::DepthCompare {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Shadow Depth BindGroup"),
                layout: &self.depth_shadow_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&ctx.targets.depth.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.comparison_sampler),
                    },
                ],
            })
        } else {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Shadow Moments BindGroup"),
                layout: &self.moments_shadow_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&ctx.targets.moments.array_view),
                }],
            })
        });
    }

    fn run(&self, ctx: &FrameContext<'_>, encoder: &mut wgpu::CommandEncoder) {
        let (Some(pipeline), Some(shadow_bind_group)) =
            (self.pipelines.get(ctx.plan.evaluation.index()), &self.shadow_bind_group)
        else {
            return;
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: ctx.surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(ctx.settings.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &ctx.wgpu.depth_texture_view,
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
        pass.set_bind_group(0, &self.frame_bind_group, &[]);
        pass.set_bind_group(2, shadow_bind_group, &[]);

        for (index, drawable) in ctx.scene.drawables.iter().enumerate() {
            let Some(mesh) = ctx.meshes.get(drawable.mesh.0) else {
                continue;
            };
            pass.set_bind_group(1, self.draws.bind_group(), &[self.draws.offset(index)]);
            mesh.draw(&mut pass);
        }
    }
}
