//! SAT Compute Pass
//!
//! Turns the moments target into its summed-area table in place, using a
//! scratch texture of the same size as the second ping-pong buffer. Each
//! [`SatStep`](crate::shadow::sat::SatStep) of the schedule is one dispatch
//! reading one buffer and writing the other.
//!
//! If the schedule leaves the result in the scratch texture, it is copied
//! back so the scene pass always samples the moments target.

use super::{FrameContext, RenderNode};
use crate::renderer::core::{DynamicUniforms, create_shader};
use crate::renderer::targets::{MOMENTS_FORMAT, MomentsTarget};
use crate::shadow::sat::{PingPong, SatAxis, SatSchedule};

const WORKGROUP_SIZE: u32 = 16;

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct SatParams {
    offset: u32,
    axis: u32,
    base: u32,
    _pad: u32,
}

pub struct SatPass {
    pipeline: wgpu::ComputePipeline,
    textures_layout: wgpu::BindGroupLayout,
    params_layout: wgpu::BindGroupLayout,
    params: DynamicUniforms<SatParams>,
    base: u32,

    // === Per-size state ===
    scratch: Option<MomentsTarget>,
    schedule: Option<SatSchedule>,
    /// `[front → scratch, scratch → front]`
    bind_groups: Option<[wgpu::BindGroup; 2]>,
}

impl SatPass {
    #[must_use]
    pub fn new(device: &wgpu::Device, base: u32) -> Self {
        let textures_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("SAT Textures Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: MOMENTS_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
        });

        let params_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("SAT Params Layout"),
            entries: &[DynamicUniforms::<SatParams>::layout_entry(wgpu::ShaderStages::COMPUTE)],
        });
        let params = DynamicUniforms::new(device, &params_layout, "SAT Params");

        let module = create_shader(device, "SAT Shader", include_str!("../shaders/sat.wgsl"));
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("SAT Pipeline Layout"),
            bind_group_layouts: &[Some(&textures_layout), Some(&params_layout)],
            immediate_size: 0,
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("SAT Pipeline"),
            layout: Some(&layout),
            module: &module,
            entry_point: Some("main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        Self {
            pipeline,
            textures_layout,
            params_layout,
            params,
            base,
            scratch: None,
            schedule: None,
            bind_groups: None,
        }
    }

    fn ensure_scratch(&mut self, device: &wgpu::Device, size: u32) {
        if self.scratch.as_ref().is_some_and(|scratch| scratch.size == size) {
            return;
        }
        log::info!("Creating SAT scratch target ({size}x{size})");
        self.scratch = Some(MomentsTarget::new(device, "SAT Scratch Target", size, 1));
        self.schedule = Some(SatSchedule::new(size, size, self.base));
    }

    fn create_bind_group(
        &self,
        device: &wgpu::Device,
        src: &wgpu::TextureView,
        dst: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("SAT Textures BindGroup"),
            layout: &self.textures_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(src),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(dst),
                },
            ],
        })
    }
}

impl RenderNode for SatPass {
    fn name(&self) -> &'static str {
        "SAT Pass"
    }

    fn prepare(&mut self, ctx: &FrameContext<'_>) {
        if !ctx.plan.build_sat || !ctx.targets.complete {
            self.bind_groups = None;
            return;
        }
        let device = &ctx.wgpu.device;
        let moments = ctx.targets.moments;
        let Some(front) = moments.layer_views.first() else {
            self.bind_groups = None;
            return;
        };

        self.ensure_scratch(device, moments.size);
        let (Some(scratch), Some(schedule)) = (&self.scratch, &self.schedule) else {
            return;
        };

        let params: Vec<SatParams> = schedule
            .steps()
            .iter()
            .map(|step| SatParams {
                offset: step.offset,
                axis: match step.axis {
                    SatAxis::Horizontal => 0,
                    SatAxis::Vertical => 1,
                },
                base: schedule.base(),
                _pad: 0,
            })
            .collect();

        // The moments target may have been re-created; rebuild every frame.
        let back = &scratch.layer_views[0];
        let bind_groups = [
            self.create_bind_group(device, front, back),
            self.create_bind_group(device, back, front),
        ];
        self.bind_groups = Some(bind_groups);

        self.params
            .upload(device, &ctx.wgpu.queue, &self.params_layout, &params);
    }

    fn run(&self, ctx: &FrameContext<'_>, encoder: &mut wgpu::CommandEncoder) {
        let (Some(bind_groups), Some(scratch), Some(schedule)) =
            (&self.bind_groups, &self.scratch, &self.schedule)
        else {
            return;
        };

        let size = scratch.size;
        let groups = size.div_ceil(WORKGROUP_SIZE);
        let mut buffers = PingPong::new(&ctx.targets.moments.texture, &scratch.texture);

        for (index, _step) in schedule.steps().iter().enumerate() {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("SAT Step"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_groups[buffers.current_index()], &[]);
            pass.set_bind_group(1, self.params.bind_group(), &[self.params.offset(index)]);
            pass.dispatch_workgroups(groups, groups, 1);
            drop(pass);

            buffers.swap();
        }

        if let Err(err) = buffers.check_parity() {
            log::warn!("{err}; copying result to the moments target");
            buffers.realign(|src, dst| {
                encoder.copy_texture_to_texture(
                    src.as_image_copy(),
                    dst.as_image_copy(),
                    wgpu::Extent3d {
                        width: size,
                        height: size,
                        depth_or_array_layers: 1,
                    },
                );
            });
        }
    }
}
