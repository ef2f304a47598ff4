use std::f32::consts::PI;

use crate::resources::geometry::{MeshData, Vertex};

pub struct SphereOptions {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Default for SphereOptions {
    fn default() -> Self {
        Self {
            radius: 1.0,
            width_segments: 32,
            height_segments: 16,
        }
    }
}

/// UV sphere centered at the origin.
#[must_use]
pub fn create_sphere(options: &SphereOptions) -> MeshData {
    let radius = options.radius;
    let width_segments = options.width_segments.max(3);
    let height_segments = options.height_segments.max(2);

    let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
    let mut indices = Vec::with_capacity((width_segments * height_segments * 6) as usize);

    for y in 0..=height_segments {
        // Latitude from the south pole (0) to the north pole (PI)
        let theta = y as f32 / height_segments as f32 * PI;
        let py = -radius * theta.cos();
        let ring_radius = radius * theta.sin();

        for x in 0..=width_segments {
            let phi = x as f32 / width_segments as f32 * 2.0 * PI;
            let px = -ring_radius * phi.cos();
            let pz = ring_radius * phi.sin();

            vertices.push(Vertex::new(
                [px, py, pz],
                [px / radius, py / radius, pz / radius],
            ));
        }
    }

    // Two triangles per cell; the pole cells degenerate and are skipped by
    // the rasterizer.
    let stride = width_segments + 1;
    for y in 0..height_segments {
        for x in 0..width_segments {
            let v0 = y * stride + x;
            let v1 = v0 + 1;
            let v2 = (y + 1) * stride + x;
            let v3 = v2 + 1;

            indices.extend_from_slice(&[v0, v1, v2, v1, v3, v2]);
        }
    }

    MeshData::new(vertices, indices)
}
