//! wgpu Core
//!
//! - [`WgpuContext`]: device, queue, surface and config; resize and frame
//!   acquisition
//! - [`GpuMesh`]: vertex/index buffers of an uploaded [`MeshData`](crate::resources::MeshData)
//! - [`DynamicUniforms`]: one uniform buffer addressed with dynamic offsets

pub mod context;
pub mod mesh;
pub mod uniforms;

pub use context::WgpuContext;
pub use mesh::GpuMesh;
pub use uniforms::{DynamicUniforms, align_to};

/// Compiles a WGSL module, prepending the shared declarations.
#[must_use]
pub fn create_shader(device: &wgpu::Device, label: &str, source: &str) -> wgpu::ShaderModule {
    let source = format!("{}\n{source}", include_str!("../shaders/common.wgsl"));
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    })
}
