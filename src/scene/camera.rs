use glam::{Mat3, Mat4, Quat, Vec3};

/// Translation per pixel of vertical mouse drag.
pub const MOVE_SENSITIVITY: f32 = 1.0;
/// Rotation per pixel of mouse drag, in radians.
pub const ROTATION_SENSITIVITY: f32 = 0.1_f32 * std::f32::consts::PI / 180.0;
/// Field-of-view change per wheel notch, in degrees.
pub const ZOOM_STEP_DEGREES: f32 = 1.0;
pub const MIN_FOV_DEGREES: f32 = 10.0;
pub const MAX_FOV_DEGREES: f32 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        /// Vertical field of view, radians.
        fov_y: f32,
        aspect: f32,
    },
    Orthographic {
        width: f32,
        height: f32,
    },
}

/// A camera with cached view and projection matrices.
///
/// The viewer uses the perspective variant, the light the orthographic one.
/// Matrices are rebuilt eagerly on every mutation so the getters stay cheap;
/// projections follow wgpu's `[0, 1]` depth range.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    orientation: Quat,
    projection: Projection,
    near: f32,
    far: f32,

    view_matrix: Mat4,
    projection_matrix: Mat4,
}

impl Camera {
    #[must_use]
    pub fn new_perspective(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::new(
            Projection::Perspective {
                fov_y: fov_y_degrees.to_radians(),
                aspect,
            },
            near,
            far,
        )
    }

    #[must_use]
    pub fn new_orthographic(width: f32, height: f32, near: f32, far: f32) -> Self {
        Self::new(Projection::Orthographic { width, height }, near, far)
    }

    fn new(projection: Projection, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            projection,
            near,
            far,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    fn update_view_matrix(&mut self) {
        self.view_matrix =
            Mat4::from_rotation_translation(self.orientation, self.position).inverse();
    }

    fn update_projection_matrix(&mut self) {
        self.projection_matrix = match self.projection {
            Projection::Perspective { fov_y, aspect } => {
                Mat4::perspective_rh(fov_y, aspect, self.near, self.far)
            }
            Projection::Orthographic { width, height } => {
                let (w, h) = (width * 0.5, height * 0.5);
                Mat4::orthographic_rh(-w, w, -h, h, self.near, self.far)
            }
        };
    }

    // === Placement ===

    /// Places the camera at `eye` looking along `direction`.
    pub fn look_to(&mut self, eye: Vec3, direction: Vec3, up: Vec3) {
        let view = Mat4::look_to_rh(eye, direction, up);
        // Rotation part of the view is orthonormal: its transpose is the
        // camera-to-world rotation.
        self.orientation = Quat::from_mat3(&Mat3::from_mat4(view).transpose()).normalize();
        self.position = eye;
        self.update_view_matrix();
    }

    pub fn look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        self.look_to(eye, target - eye, up);
    }

    // === Projection ===

    /// Resizes an orthographic camera's view volume. No-op on a perspective
    /// camera.
    pub fn set_orthographic_extent(&mut self, width: f32, height: f32) {
        if let Projection::Orthographic { .. } = self.projection {
            self.projection = Projection::Orthographic { width, height };
            self.update_projection_matrix();
        }
    }

    /// Updates a perspective camera's aspect ratio after a resize.
    pub fn set_aspect(&mut self, new_aspect: f32) {
        if let Projection::Perspective { fov_y, .. } = self.projection {
            self.projection = Projection::Perspective {
                fov_y,
                aspect: new_aspect,
            };
            self.update_projection_matrix();
        }
    }

    pub fn zoom_in(&mut self) {
        self.adjust_fov(-ZOOM_STEP_DEGREES);
    }

    pub fn zoom_out(&mut self) {
        self.adjust_fov(ZOOM_STEP_DEGREES);
    }

    fn adjust_fov(&mut self, delta_degrees: f32) {
        if let Projection::Perspective { fov_y, aspect } = self.projection {
            let fov = (fov_y.to_degrees() + delta_degrees).clamp(MIN_FOV_DEGREES, MAX_FOV_DEGREES);
            self.projection = Projection::Perspective {
                fov_y: fov.to_radians(),
                aspect,
            };
            self.update_projection_matrix();
        }
    }

    // === Mouse-driven movement ===

    /// Moves along the viewing direction; `delta` is in drag pixels.
    pub fn move_forward(&mut self, delta: f32) {
        self.position += self.forward() * delta * MOVE_SENSITIVITY;
        self.update_view_matrix();
    }

    /// Orbits the camera around the world Y axis through the origin.
    pub fn rotate_around_world_y(&mut self, delta: f32) {
        let rotation = Quat::from_rotation_y(delta * ROTATION_SENSITIVITY);
        self.position = rotation * self.position;
        self.orientation = (rotation * self.orientation).normalize();
        self.update_view_matrix();
    }

    /// Tilts the camera around its own right axis.
    pub fn pitch(&mut self, delta: f32) {
        let rotation = Quat::from_rotation_x(delta * ROTATION_SENSITIVITY);
        self.orientation = (self.orientation * rotation).normalize();
        self.update_view_matrix();
    }

    // === Accessors ===

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// World-space viewing direction (−Z in camera space).
    #[inline]
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    #[inline]
    #[must_use]
    pub fn projection(&self) -> Projection {
        self.projection
    }

    #[inline]
    #[must_use]
    pub fn near(&self) -> f32 {
        self.near
    }

    #[inline]
    #[must_use]
    pub fn far(&self) -> f32 {
        self.far
    }

    #[inline]
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    #[inline]
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    #[inline]
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    /// Vertical field of view in degrees, `None` for orthographic cameras.
    #[must_use]
    pub fn fov_y_degrees(&self) -> Option<f32> {
        match self.projection {
            Projection::Perspective { fov_y, .. } => Some(fov_y.to_degrees()),
            Projection::Orthographic { .. } => None,
        }
    }
}
