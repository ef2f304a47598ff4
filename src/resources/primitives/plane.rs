use crate::resources::geometry::{MeshData, Vertex};

pub struct PlaneOptions {
    /// Extent along X.
    pub width: f32,
    /// Extent along Z.
    pub depth: f32,
    pub width_segments: u32,
    pub depth_segments: u32,
}

impl Default for PlaneOptions {
    fn default() -> Self {
        Self {
            width: 1.0,
            depth: 1.0,
            width_segments: 1,
            depth_segments: 1,
        }
    }
}

/// Plane in the XZ plane, centered at the origin, facing +Y.
#[must_use]
pub fn create_plane(options: &PlaneOptions) -> MeshData {
    let width_half = options.width / 2.0;
    let depth_half = options.depth / 2.0;

    let grid_x = options.width_segments.max(1);
    let grid_z = options.depth_segments.max(1);
    let grid_x1 = grid_x + 1;

    let segment_width = options.width / grid_x as f32;
    let segment_depth = options.depth / grid_z as f32;

    let mut vertices = Vec::with_capacity((grid_x1 * (grid_z + 1)) as usize);
    let mut indices = Vec::with_capacity((grid_x * grid_z * 6) as usize);

    for iz in 0..=grid_z {
        let z = iz as f32 * segment_depth - depth_half;
        for ix in 0..=grid_x {
            let x = ix as f32 * segment_width - width_half;
            vertices.push(Vertex::new([x, 0.0, z], [0.0, 1.0, 0.0]));
        }
    }

    for iz in 0..grid_z {
        for ix in 0..grid_x {
            let a = ix + grid_x1 * iz;
            let b = ix + grid_x1 * (iz + 1);
            let c = (ix + 1) + grid_x1 * (iz + 1);
            let d = (ix + 1) + grid_x1 * iz;

            // Counter-clockwise seen from +Y
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    MeshData::new(vertices, indices)
}
