//! Cascade Crop Solver
//!
//! For each cascade slice, computes a crop transform that rescales the
//! light-space bounding box of the slice's view frustum onto the full shadow
//! map. Rendering the scene through `crop × light_view_projection` then spends
//! every shadow texel on the part of the scene the slice can see.
//!
//! All bounds are expressed in wgpu NDC: x/y in `[-1, 1]`, z in `[0, 1]`.

use glam::{Mat4, UVec2, Vec2, Vec3, Vec4};

use super::splits::CascadeSplits;

/// Smallest extent a crop bound may have on any axis.
///
/// Degenerate slices (camera at the light, zero-size frustum) would otherwise
/// produce an infinite scale.
pub const MIN_CROP_EXTENT: f32 = 1e-4;

const NDC_MIN: Vec3 = Vec3::new(-1.0, -1.0, 0.0);
const NDC_MAX: Vec3 = Vec3::new(1.0, 1.0, 1.0);

/// Axis-aligned bounds in light NDC space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightNdcBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl LightNdcBounds {
    /// Tight bounds of a point set.
    #[must_use]
    pub fn from_points(points: &[Vec3]) -> Self {
        let init = Self {
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(f32::MIN),
        };
        points.iter().fold(init, |b, p| Self {
            min: b.min.min(*p),
            max: b.max.max(*p),
        })
    }

    /// Per-axis extent, clamped to [`MIN_CROP_EXTENT`].
    #[inline]
    #[must_use]
    pub fn safe_extent(&self) -> Vec3 {
        (self.max - self.min).max(Vec3::splat(MIN_CROP_EXTENT))
    }

    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    #[must_use]
    pub fn is_within_ndc(&self) -> bool {
        self.min.cmpge(NDC_MIN).all() && self.max.cmple(NDC_MAX).all()
    }

    /// Matrix mapping these bounds onto the full NDC volume.
    ///
    /// x/y: `scale = 2 / (max - min)`, `offset = -(max + min) / 2 * scale`.
    /// z:   `scale = 1 / (max - min)`, `offset = -min * scale`.
    #[must_use]
    pub fn crop_matrix(&self) -> Mat4 {
        let extent = self.safe_extent();
        let scale = Vec3::new(2.0 / extent.x, 2.0 / extent.y, 1.0 / extent.z);
        let offset = Vec3::new(
            -0.5 * (self.max.x + self.min.x) * scale.x,
            -0.5 * (self.max.y + self.min.y) * scale.y,
            -self.min.z * scale.z,
        );

        Mat4::from_cols(
            Vec4::new(scale.x, 0.0, 0.0, 0.0),
            Vec4::new(0.0, scale.y, 0.0, 0.0),
            Vec4::new(0.0, 0.0, scale.z, 0.0),
            offset.extend(1.0),
        )
    }
}

/// The solved light-space transform of one cascade slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeCrop {
    /// View-space distance where the slice begins.
    pub near: f32,
    /// View-space distance where the slice ends.
    pub far: f32,
    /// Padded and clamped light-NDC bounds of the slice.
    pub bounds: LightNdcBounds,
    /// `crop × light_view_projection`.
    pub view_projection: Mat4,
}

/// Solves crop transforms for slices of the main camera's frustum.
///
/// Built once per frame from the current camera and light matrices.
#[derive(Debug, Clone, Copy)]
pub struct CropSolver {
    camera_projection: Mat4,
    camera_to_light_clip: Mat4,
    light_view_projection: Mat4,
    half_texel: Vec2,
}

impl CropSolver {
    /// # Arguments
    ///
    /// - `camera_view`, `camera_projection`: the main (perspective) camera
    /// - `light_view`, `light_projection`: the light's orthographic camera
    /// - `padding_grid`: pixel grid whose half texel pads the x/y bounds
    #[must_use]
    pub fn new(
        camera_view: Mat4,
        camera_projection: Mat4,
        light_view: Mat4,
        light_projection: Mat4,
        padding_grid: UVec2,
    ) -> Self {
        let light_view_projection = light_projection * light_view;
        let grid = padding_grid.max(UVec2::ONE).as_vec2();
        Self {
            camera_projection,
            camera_to_light_clip: light_view_projection * camera_view.inverse(),
            light_view_projection,
            half_texel: Vec2::ONE / grid,
        }
    }

    #[inline]
    #[must_use]
    pub fn light_view_projection(&self) -> Mat4 {
        self.light_view_projection
    }

    /// The 8 corners of the `[near, far]` view-frustum slice in camera space.
    ///
    /// Half-extents come from the inverse of the projection's x/y scale terms;
    /// the camera looks down −Z. Near face first, counter-clockwise from the
    /// bottom-left.
    #[must_use]
    pub fn slice_corners(&self, near: f32, far: f32) -> [Vec3; 8] {
        let tan_x = 1.0 / self.camera_projection.x_axis.x;
        let tan_y = 1.0 / self.camera_projection.y_axis.y;

        let face = |d: f32| {
            let (w, h) = (tan_x * d, tan_y * d);
            [
                Vec3::new(-w, -h, -d),
                Vec3::new(w, -h, -d),
                Vec3::new(w, h, -d),
                Vec3::new(-w, h, -d),
            ]
        };
        let [n0, n1, n2, n3] = face(near);
        let [f0, f1, f2, f3] = face(far);
        [n0, n1, n2, n3, f0, f1, f2, f3]
    }

    /// Light-NDC bounds of a slice after near-plane extension, half-texel
    /// padding and clamping.
    #[must_use]
    pub fn slice_bounds(&self, near: f32, far: f32) -> LightNdcBounds {
        let corners = self
            .slice_corners(near, far)
            .map(|c| self.camera_to_light_clip.project_point3(c));
        let raw = LightNdcBounds::from_points(&corners);

        // Casters between the light and the slice must still land in the map.
        let texel = self.half_texel;
        let min = Vec3::new(raw.min.x - texel.x, raw.min.y - texel.y, NDC_MIN.z);
        let max = Vec3::new(raw.max.x + texel.x, raw.max.y + texel.y, raw.max.z);

        LightNdcBounds {
            min: min.clamp(NDC_MIN, NDC_MAX),
            max: max.clamp(NDC_MIN, NDC_MAX),
        }
    }

    /// Solves the crop transform for one slice.
    #[must_use]
    pub fn solve(&self, near: f32, far: f32) -> CascadeCrop {
        let bounds = self.slice_bounds(near, far);
        CascadeCrop {
            near,
            far,
            bounds,
            view_projection: bounds.crop_matrix() * self.light_view_projection,
        }
    }

    /// Solves every slice of `splits`, in order.
    #[must_use]
    pub fn solve_all(&self, splits: &CascadeSplits) -> Vec<CascadeCrop> {
        splits.slices().map(|(near, far)| self.solve(near, far)).collect()
    }
}
