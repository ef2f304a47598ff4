//! Renderer Settings
//!
//! [`RenderSettings`] collects the start-up configuration: frame and shadow
//! map resolutions, cascade parameters, filtering constants and the usual
//! adapter/surface options.
//!
//! # Example
//!
//! ```rust,ignore
//! use shadow_lab::{App, RenderSettings};
//!
//! let settings = RenderSettings {
//!     shadow_map_size: 2048,
//!     cascade_count: 4,
//!     vsync: false,
//!     ..Default::default()
//! };
//!
//! App::new().with_settings(settings).run()?;
//! ```

use crate::errors::{Result, ShadowLabError};
use crate::shadow::sat::DEFAULT_SAT_BASE;
use crate::shadow::{DEFAULT_SPLIT_WEIGHT, MAX_CASCADES};

/// Global configuration for renderer initialization.
///
/// | Field                  | Default            |
/// |------------------------|--------------------|
/// | `frame_width/height`   | 1920 × 1080        |
/// | `shadow_map_size`      | 1024               |
/// | `cascade_count`        | 3                  |
/// | `split_weight`         | 0.5                |
/// | `sat_base`             | 4                  |
/// | `vsync`                | `true`             |
/// | `power_preference`     | `HighPerformance`  |
/// | `clear_color`          | (0.4, 0.5, 0.6, 1) |
/// | `depth_format`         | `Depth32Float`     |
#[derive(Debug, Clone)]
pub struct RenderSettings {
    // === Frame ===
    /// Initial window width in physical pixels.
    pub frame_width: u32,
    /// Initial window height in physical pixels.
    pub frame_height: u32,

    // === Shadows ===
    /// Edge length of every light-space target (square).
    pub shadow_map_size: u32,

    /// Initial number of PSVSM cascades, in `[1, MAX_CASCADES]`.
    pub cascade_count: usize,

    /// Blend between uniform (`0.0`) and logarithmic (`1.0`) cascade splits.
    pub split_weight: f32,

    /// Taps per summed-area-table step; offsets grow by this factor.
    pub sat_base: u32,

    /// Texel radius of the PCF kernel (`1` samples 3×3).
    pub pcf_radius: u32,

    /// Lower bound on the variance used in the Chebyshev test.
    pub vsm_min_variance: f32,

    /// Fraction of the Chebyshev bound cut off to suppress light bleeding.
    pub vsm_light_bleed_reduction: f32,

    /// Half-width, in texels, of the SATVSM box filter.
    pub sat_filter_radius: u32,

    // === GPU / Surface ===
    /// Enable vertical synchronization.
    pub vsync: bool,

    pub power_preference: wgpu::PowerPreference,

    /// Background color of the main pass.
    pub clear_color: wgpu::Color,

    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,

    /// Format of the main pass depth buffer and the light-space depth target.
    pub depth_format: wgpu::TextureFormat,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            frame_width: 1920,
            frame_height: 1080,
            shadow_map_size: 1024,
            cascade_count: 3,
            split_weight: DEFAULT_SPLIT_WEIGHT,
            sat_base: DEFAULT_SAT_BASE,
            pcf_radius: 1,
            vsm_min_variance: 2e-5,
            vsm_light_bleed_reduction: 0.2,
            sat_filter_radius: 2,
            vsync: true,
            power_preference: wgpu::PowerPreference::HighPerformance,
            clear_color: wgpu::Color {
                r: 0.4,
                g: 0.5,
                b: 0.6,
                a: 1.0,
            },
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            depth_format: wgpu::TextureFormat::Depth32Float,
        }
    }
}

impl RenderSettings {
    /// Checks value ranges that would otherwise surface as GPU validation
    /// errors or degenerate shadows.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(ShadowLabError::InvalidSettings(msg));

        if self.frame_width == 0 || self.frame_height == 0 {
            return fail(format!(
                "frame size must be non-zero, got {}x{}",
                self.frame_width, self.frame_height
            ));
        }
        if self.shadow_map_size == 0 {
            return fail("shadow_map_size must be non-zero".into());
        }
        if !(1..=MAX_CASCADES).contains(&self.cascade_count) {
            return fail(format!(
                "cascade_count must lie in [1, {MAX_CASCADES}], got {}",
                self.cascade_count
            ));
        }
        if !(0.0..=1.0).contains(&self.split_weight) {
            return fail(format!(
                "split_weight must lie in [0, 1], got {}",
                self.split_weight
            ));
        }
        if self.sat_base < 2 {
            return fail(format!("sat_base must be at least 2, got {}", self.sat_base));
        }
        if self.vsm_min_variance.is_nan() || self.vsm_min_variance < 0.0 {
            return fail(format!(
                "vsm_min_variance must be non-negative, got {}",
                self.vsm_min_variance
            ));
        }
        if !(0.0..1.0).contains(&self.vsm_light_bleed_reduction) {
            return fail(format!(
                "vsm_light_bleed_reduction must lie in [0, 1), got {}",
                self.vsm_light_bleed_reduction
            ));
        }
        if !self.depth_format.is_depth_stencil_format() {
            return fail(format!("{:?} is not a depth format", self.depth_format));
        }
        Ok(())
    }
}
