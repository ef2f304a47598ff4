use glam::{Vec3, Vec4};

/// A light source with Blinn-Phong color terms.
///
/// `position.w == 0` marks a directional light that shines along
/// `direction`; otherwise it is a point light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vec4,
    /// Where the shadow camera looks from `position`.
    pub direction: Vec3,
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
    /// Specular exponent.
    pub shininess: f32,
}

impl Light {
    #[must_use]
    pub fn new(position: Vec4, direction: Vec3) -> Self {
        Self {
            position,
            direction,
            ambient: Vec4::ONE,
            diffuse: Vec4::new(0.9, 0.9, 0.9, 1.0),
            specular: Vec4::new(0.9, 0.9, 0.9, 1.0),
            shininess: 10.0,
        }
    }

    #[must_use]
    pub fn with_colors(mut self, ambient: Vec4, diffuse: Vec4, specular: Vec4) -> Self {
        self.ambient = ambient;
        self.diffuse = diffuse;
        self.specular = specular;
        self
    }

    #[inline]
    #[must_use]
    pub fn is_directional(&self) -> bool {
        self.position.w == 0.0
    }

    /// World-space eye position of the light's shadow camera.
    #[inline]
    #[must_use]
    pub fn eye(&self) -> Vec3 {
        self.position.truncate()
    }
}

/// The scene's lights, one of which is active, plus a global on/off switch.
#[derive(Debug, Clone)]
pub struct LightSet {
    lights: Vec<Light>,
    active: usize,
    switched_on: bool,
}

impl Default for LightSet {
    fn default() -> Self {
        Self::new()
    }
}

impl LightSet {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lights: Vec::new(),
            active: 0,
            switched_on: true,
        }
    }

    /// Adds a light and returns its index.
    pub fn add_light(&mut self, light: Light) -> usize {
        self.lights.push(light);
        self.lights.len() - 1
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Selects the active light. Out-of-range indices are ignored.
    pub fn set_active(&mut self, index: usize) -> bool {
        if index < self.lights.len() {
            self.active = index;
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn active(&self) -> Option<&Light> {
        self.lights.get(self.active)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Light> {
        self.lights.get(index)
    }

    #[inline]
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.switched_on
    }

    /// Flips the light switch and returns the new state.
    pub fn toggle_switch(&mut self) -> bool {
        self.switched_on = !self.switched_on;
        self.switched_on
    }
}
