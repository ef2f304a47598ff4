//! Shadow Strategies
//!
//! One [`ShadowStrategy`] per algorithm. Each strategy turns the current
//! camera/light state into a [`FramePlan`]: which light-space target to fill,
//! which light passes to render into it, whether a summed-area table has to be
//! built, and how the main pass evaluates visibility.
//!
//! The renderer executes plans without looking at the algorithm itself.

use std::fmt;

use glam::{Mat4, UVec2};
use smallvec::{SmallVec, smallvec};

use super::ShadowAlgorithm;
use super::crop::{CascadeCrop, CropSolver};
use super::splits::{CascadeSplits, MAX_CASCADES};
use crate::errors::Result;
use crate::scene::Camera;

// ============================================================================
// Plan Types
// ============================================================================

/// The light-space render target a frame has to populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightTarget {
    /// Depth-only, sampled with a comparison sampler.
    Depth,
    /// Single two-channel (depth, depth²) target.
    Moments,
    /// One two-channel layer per cascade.
    MomentsArray { layers: u32 },
}

impl LightTarget {
    #[must_use]
    pub fn layer_count(self) -> u32 {
        match self {
            Self::Depth | Self::Moments => 1,
            Self::MomentsArray { layers } => layers,
        }
    }

    /// Whether the target has a color (moments) attachment.
    #[must_use]
    pub fn has_moments(self) -> bool {
        !matches!(self, Self::Depth)
    }
}

/// How the main pass turns light-space products into visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Evaluation {
    /// Hardware depth comparison with a PCF kernel.
    DepthCompare,
    /// One-tailed Chebyshev bound from filtered moments.
    Chebyshev,
    /// Chebyshev bound on the layer of the cascade containing the fragment.
    CascadedChebyshev,
    /// Chebyshev bound on box-filtered moments read from the SAT.
    SummedAreaChebyshev,
}

impl Evaluation {
    pub const COUNT: usize = 4;

    /// Dense index for per-evaluation pipeline tables.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::DepthCompare => 0,
            Self::Chebyshev => 1,
            Self::CascadedChebyshev => 2,
            Self::SummedAreaChebyshev => 3,
        }
    }
}

/// One clear + draw of the scene from the light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightPass {
    /// Target layer (0 for single-layer targets).
    pub layer: u32,
    /// World to light clip space for this pass.
    pub view_projection: Mat4,
}

/// Light passes of one frame; at most one per cascade.
pub type LightPasses = SmallVec<[LightPass; MAX_CASCADES]>;

/// Everything the renderer needs to produce one frame's shadows.
#[derive(Debug, Clone)]
pub struct FramePlan {
    pub algorithm: ShadowAlgorithm,
    pub target: LightTarget,
    pub light_passes: LightPasses,
    /// Cascade splits, only for cascaded strategies.
    pub splits: Option<CascadeSplits>,
    /// Per-cascade crops, parallel to `splits`' slices.
    pub cascades: Vec<CascadeCrop>,
    pub build_sat: bool,
    pub evaluation: Evaluation,
    /// Uncropped light view-projection.
    pub light_view_projection: Mat4,
}

impl FramePlan {
    /// A plan that renders no light passes; the evaluation samples whatever
    /// the target holds.
    #[must_use]
    pub fn degraded(strategy: &dyn ShadowStrategy, inputs: &FrameInputs<'_>) -> Self {
        Self {
            algorithm: strategy.algorithm(),
            target: strategy.light_target(inputs),
            light_passes: SmallVec::new(),
            splits: None,
            cascades: Vec::new(),
            build_sat: false,
            evaluation: strategy.evaluation(),
            light_view_projection: inputs.light_view_projection(),
        }
    }
}

/// Per-frame inputs shared by all strategies.
#[derive(Debug, Clone, Copy)]
pub struct FrameInputs<'a> {
    pub camera: &'a Camera,
    pub light_camera: &'a Camera,
    pub cascade_count: usize,
    pub split_weight: f32,
    /// Pixel grid used for the half-texel crop padding.
    pub padding_grid: UVec2,
}

impl FrameInputs<'_> {
    #[must_use]
    pub fn light_view_projection(&self) -> Mat4 {
        self.light_camera.projection_matrix() * self.light_camera.view_matrix()
    }

    /// Cascade count clamped to what the GPU path supports.
    #[must_use]
    pub fn clamped_cascade_count(&self) -> usize {
        self.cascade_count.clamp(1, MAX_CASCADES)
    }
}

// ============================================================================
// Strategy Trait
// ============================================================================

/// Per-algorithm frame orchestration.
pub trait ShadowStrategy: fmt::Debug {
    fn algorithm(&self) -> ShadowAlgorithm;

    fn evaluation(&self) -> Evaluation;

    /// The light-space target this strategy renders into.
    fn light_target(&self, inputs: &FrameInputs<'_>) -> LightTarget;

    /// Plans the frame's light-space work.
    fn plan(&self, inputs: &FrameInputs<'_>) -> Result<FramePlan>;
}

/// Plan for strategies rendering one map with the uncropped light transform.
fn single_map_plan(
    strategy: &dyn ShadowStrategy,
    inputs: &FrameInputs<'_>,
    build_sat: bool,
) -> FramePlan {
    let light_view_projection = inputs.light_view_projection();
    FramePlan {
        algorithm: strategy.algorithm(),
        target: strategy.light_target(inputs),
        light_passes: smallvec![LightPass {
            layer: 0,
            view_projection: light_view_projection,
        }],
        splits: None,
        cascades: Vec::new(),
        build_sat,
        evaluation: strategy.evaluation(),
        light_view_projection,
    }
}

// ============================================================================
// Strategies
// ============================================================================

/// Depth pass, then depth-compare sampling.
#[derive(Debug, Clone, Copy, Default)]
pub struct PcfStrategy;

impl ShadowStrategy for PcfStrategy {
    fn algorithm(&self) -> ShadowAlgorithm {
        ShadowAlgorithm::Pcf
    }

    fn evaluation(&self) -> Evaluation {
        Evaluation::DepthCompare
    }

    fn light_target(&self, _inputs: &FrameInputs<'_>) -> LightTarget {
        LightTarget::Depth
    }

    fn plan(&self, inputs: &FrameInputs<'_>) -> Result<FramePlan> {
        Ok(single_map_plan(self, inputs, false))
    }
}

/// Moments pass, then a Chebyshev bound on the filtered moments.
#[derive(Debug, Clone, Copy, Default)]
pub struct VsmStrategy;

impl ShadowStrategy for VsmStrategy {
    fn algorithm(&self) -> ShadowAlgorithm {
        ShadowAlgorithm::Vsm
    }

    fn evaluation(&self) -> Evaluation {
        Evaluation::Chebyshev
    }

    fn light_target(&self, _inputs: &FrameInputs<'_>) -> LightTarget {
        LightTarget::Moments
    }

    fn plan(&self, inputs: &FrameInputs<'_>) -> Result<FramePlan> {
        Ok(single_map_plan(self, inputs, false))
    }
}

/// Split the view frustum, crop each slice, render one moments layer per
/// cascade.
#[derive(Debug, Clone, Copy, Default)]
pub struct PsvsmStrategy;

impl ShadowStrategy for PsvsmStrategy {
    fn algorithm(&self) -> ShadowAlgorithm {
        ShadowAlgorithm::Psvsm
    }

    fn evaluation(&self) -> Evaluation {
        Evaluation::CascadedChebyshev
    }

    fn light_target(&self, inputs: &FrameInputs<'_>) -> LightTarget {
        LightTarget::MomentsArray {
            layers: inputs.clamped_cascade_count() as u32,
        }
    }

    fn plan(&self, inputs: &FrameInputs<'_>) -> Result<FramePlan> {
        let camera = inputs.camera;
        let splits = CascadeSplits::compute(
            camera.near(),
            camera.far(),
            inputs.clamped_cascade_count(),
            inputs.split_weight,
        )?;

        let solver = CropSolver::new(
            camera.view_matrix(),
            camera.projection_matrix(),
            inputs.light_camera.view_matrix(),
            inputs.light_camera.projection_matrix(),
            inputs.padding_grid,
        );
        let cascades = solver.solve_all(&splits);

        let light_passes = cascades
            .iter()
            .enumerate()
            .map(|(layer, crop)| LightPass {
                layer: layer as u32,
                view_projection: crop.view_projection,
            })
            .collect();

        Ok(FramePlan {
            algorithm: self.algorithm(),
            target: self.light_target(inputs),
            light_passes,
            splits: Some(splits),
            cascades,
            build_sat: false,
            evaluation: self.evaluation(),
            light_view_projection: solver.light_view_projection(),
        })
    }
}

/// Moments pass, SAT build, then a Chebyshev bound on box-filtered moments.
#[derive(Debug, Clone, Copy, Default)]
pub struct SatVsmStrategy;

impl ShadowStrategy for SatVsmStrategy {
    fn algorithm(&self) -> ShadowAlgorithm {
        ShadowAlgorithm::SatVsm
    }

    fn evaluation(&self) -> Evaluation {
        Evaluation::SummedAreaChebyshev
    }

    fn light_target(&self, _inputs: &FrameInputs<'_>) -> LightTarget {
        LightTarget::Moments
    }

    fn plan(&self, inputs: &FrameInputs<'_>) -> Result<FramePlan> {
        Ok(single_map_plan(self, inputs, true))
    }
}

/// The strategy implementing `algorithm`.
#[must_use]
pub fn strategy_for(algorithm: ShadowAlgorithm) -> Box<dyn ShadowStrategy> {
    match algorithm {
        ShadowAlgorithm::Pcf => Box::new(PcfStrategy),
        ShadowAlgorithm::Vsm => Box::new(VsmStrategy),
        ShadowAlgorithm::Psvsm => Box::new(PsvsmStrategy),
        ShadowAlgorithm::SatVsm => Box::new(SatVsmStrategy),
    }
}
