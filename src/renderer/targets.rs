//! Light-Space Render Targets
//!
//! Owns the GPU textures a [`FramePlan`](crate::shadow::FramePlan) renders
//! into. Targets are created lazily the first frame a kind is needed and are
//! re-created whenever the requested [`TargetSpec`] changes (resolution or
//! cascade count). Dropping the owning struct releases the GPU resources.
//!
//! Before creation every spec is checked against the device limits; a spec
//! that cannot be satisfied is logged and the frame proceeds with a 1×1
//! fallback target, so the shadow content for that frame is undefined.

use crate::errors::{Result, ShadowLabError};
use crate::shadow::LightTarget;

/// Format of every moments texture and of the SAT scratch buffer.
pub const MOMENTS_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rg32Float;

/// Light-space depth attachment format.
pub const LIGHT_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

// ============================================================================
// Target Specification
// ============================================================================

/// What a light-space target must look like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetSpec {
    pub kind: LightTarget,
    /// Edge length of the square target.
    pub size: u32,
}

impl TargetSpec {
    #[must_use]
    pub fn new(kind: LightTarget, size: u32) -> Self {
        Self { kind, size }
    }

    #[inline]
    #[must_use]
    pub fn layers(&self) -> u32 {
        self.kind.layer_count()
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self.kind {
            LightTarget::Depth => "Light Depth Target",
            LightTarget::Moments => "Light Moments Target",
            LightTarget::MomentsArray { .. } => "Light Moments Array Target",
        }
    }

    /// Checks the target size and layer count against device limits.
    pub fn validate(&self, limits: &wgpu::Limits) -> Result<()> {
        let fail = |reason: String| {
            Err(ShadowLabError::IncompleteRenderTarget {
                label: self.label(),
                reason,
            })
        };

        if self.size == 0 {
            return fail("zero-sized target".into());
        }
        if self.size > limits.max_texture_dimension_2d {
            return fail(format!(
                "size {} exceeds max_texture_dimension_2d {}",
                self.size, limits.max_texture_dimension_2d
            ));
        }
        if self.layers() == 0 || self.layers() > limits.max_texture_array_layers {
            return fail(format!(
                "{} layers outside [1, {}]",
                self.layers(),
                limits.max_texture_array_layers
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Target Cache
// ============================================================================

/// One cached target per [`LightTarget`] kind.
///
/// Generic over the stored value so the caching rules work without a device.
#[derive(Debug)]
pub struct TargetCache<T> {
    slots: [Option<(TargetSpec, T)>; 3],
    failed: [Option<TargetSpec>; 3],
    builds: u32,
}

impl<T> Default for TargetCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn slot_index(kind: LightTarget) -> usize {
    match kind {
        LightTarget::Depth => 0,
        LightTarget::Moments => 1,
        LightTarget::MomentsArray { .. } => 2,
    }
}

impl<T> TargetCache<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: [None, None, None],
            failed: [None, None, None],
            builds: 0,
        }
    }

    /// Returns the target for `spec`, creating it with `create` when the
    /// slot is empty or holds a different spec.
    ///
    /// On failure the stale target is dropped, the `TargetSpec` is remembered as
    /// failed (see [`has_failed`](Self::has_failed)) and the error returned.
    pub fn get_or_create(
        &mut self,
        spec: TargetSpec,
        create: impl FnOnce(&TargetSpec) -> Result<T>,
    ) -> Result<&T> {
        let index = slot_index(spec.kind);
        let slot = &mut self.slots[index];

        let entry = match slot.take() {
            Some(entry) if entry.0 == spec => entry,
            stale => {
                drop(stale);
                match create(&spec) {
                    Ok(target) => {
                        self.builds += 1;
                        self.failed[index] = None;
                        (spec, target)
                    }
                    Err(err) => {
                        self.failed[index] = Some(spec);
                        return Err(err);
                    }
                }
            }
        };

        Ok(&slot.insert(entry).1)
    }

    /// Whether creating `spec` already failed; such specs are not retried.
    #[must_use]
    pub fn has_failed(&self, spec: &TargetSpec) -> bool {
        self.failed[slot_index(spec.kind)].as_ref() == Some(spec)
    }

    /// The cached target for `spec`, if one exists and matches.
    #[must_use]
    pub fn get(&self, spec: &TargetSpec) -> Option<&T> {
        self.slots[slot_index(spec.kind)]
            .as_ref()
            .filter(|(cached, _)| cached == spec)
            .map(|(_, target)| target)
    }

    /// The [`TargetSpec`] currently cached for `kind`'s slot.
    #[must_use]
    pub fn cached_spec(&self, kind: LightTarget) -> Option<TargetSpec> {
        self.slots[slot_index(kind)].as_ref().map(|(spec, _)| *spec)
    }

    /// Number of targets created so far.
    #[inline]
    #[must_use]
    pub fn builds(&self) -> u32 {
        self.builds
    }
}

// ============================================================================
// GPU Targets
// ============================================================================

/// Light-space depth attachment, shared by every light pass.
///
/// Also sampled with a comparison sampler by PCF.
pub struct DepthTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub size: u32,
}

impl DepthTarget {
    #[must_use]
    pub fn new(device: &wgpu::Device, size: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Light Depth Target"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: LIGHT_DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view, size }
    }
}

/// A (depth, depth²) texture with one or more layers.
pub struct MomentsTarget {
    pub texture: wgpu::Texture,
    /// Render-attachment view per layer.
    pub layer_views: Vec<wgpu::TextureView>,
    /// `D2Array` view over every layer, for sampling.
    pub array_view: wgpu::TextureView,
    pub size: u32,
}

impl MomentsTarget {
    #[must_use]
    pub fn new(device: &wgpu::Device, label: &'static str, size: u32, layers: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: layers,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: MOMENTS_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let layer_views = (0..layers)
            .map(|layer| {
                texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some("Light Moments Layer View"),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    base_array_layer: layer,
                    array_layer_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();

        let array_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Light Moments Array View"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });

        Self {
            texture,
            layer_views,
            array_view,
            size,
        }
    }
}

/// All light-space targets plus their fallbacks.
pub struct LightTargets {
    depth: TargetCache<DepthTarget>,
    moments: TargetCache<MomentsTarget>,
    fallback_depth: DepthTarget,
    fallback_moments: MomentsTarget,
}

/// The targets a frame renders into and samples from.
pub struct PreparedTargets<'a> {
    pub depth: &'a DepthTarget,
    pub moments: &'a MomentsTarget,
    /// `false` when a fallback stands in for the requested target.
    pub complete: bool,
}

impl LightTargets {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            depth: TargetCache::new(),
            moments: TargetCache::new(),
            fallback_depth: DepthTarget::new(device, 1),
            fallback_moments: MomentsTarget::new(device, "Fallback Moments Target", 1, 1),
        }
    }

    /// Makes sure the targets for `kind` at `size` exist.
    ///
    /// Targets that cannot be created are logged and replaced by fallbacks.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        kind: LightTarget,
        size: u32,
    ) -> PreparedTargets<'_> {
        let limits = device.limits();
        let mut complete = true;

        let depth_spec = TargetSpec::new(LightTarget::Depth, size);
        let depth = if self.depth.has_failed(&depth_spec) {
            complete = false;
            &self.fallback_depth
        } else {
            match self.depth.get_or_create(depth_spec, |spec| {
                spec.validate(&limits)?;
                Ok(DepthTarget::new(device, spec.size))
            }) {
                Ok(target) => target,
                Err(err) => {
                    log::error!("{err}");
                    complete = false;
                    &self.fallback_depth
                }
            }
        };

        let moments_spec = TargetSpec::new(kind, size);
        let moments = if !kind.has_moments() {
            &self.fallback_moments
        } else if self.moments.has_failed(&moments_spec) {
            complete = false;
            &self.fallback_moments
        } else {
            match self.moments.get_or_create(moments_spec, |spec| {
                spec.validate(&limits)?;
                log::info!(
                    "Creating {} ({}x{}, {} layers)",
                    spec.label(),
                    spec.size,
                    spec.size,
                    spec.layers()
                );
                Ok(MomentsTarget::new(device, spec.label(), spec.size, spec.layers()))
            }) {
                Ok(target) => target,
                Err(err) => {
                    log::error!("{err}");
                    complete = false;
                    &self.fallback_moments
                }
            }
        };

        PreparedTargets {
            depth,
            moments,
            complete,
        }
    }
}
