//! Shadow Algorithm Pipeline
//!
//! Pure (GPU-independent) logic for the four shadow algorithms:
//!
//! - [`splits`]: practical split scheme for cascade depth ranges
//! - [`crop`]: light-space crop transforms for each cascade slice
//! - [`sat`]: pass schedule, ping-pong bookkeeping and a CPU reference of the
//!   summed-area-table kernel
//! - [`strategy`]: one [`ShadowStrategy`] per algorithm, producing a
//!   [`FramePlan`] that the renderer executes
//! - [`state`]: the [`ShadowStateMachine`] holding the active strategy

use std::fmt;

pub mod crop;
pub mod sat;
pub mod splits;
pub mod state;
pub mod strategy;

pub use crop::{CascadeCrop, CropSolver, LightNdcBounds, MIN_CROP_EXTENT};
pub use sat::{
    MomentsGrid, PingPong, SatAxis, SatBuilder, SatSchedule, SatStep, SummedAreaTable,
};
pub use splits::{CascadeSplits, DEFAULT_SPLIT_WEIGHT, MAX_CASCADES};
pub use state::ShadowStateMachine;
pub use strategy::{
    Evaluation, FrameInputs, FramePlan, LightPass, LightPasses, LightTarget, PcfStrategy,
    PsvsmStrategy, SatVsmStrategy, ShadowStrategy, VsmStrategy,
};

/// The shadow algorithms that can be compared at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShadowAlgorithm {
    /// Percentage-closer filtering over a depth map.
    Pcf,
    /// Variance shadow maps.
    #[default]
    Vsm,
    /// Parallel-split (cascaded) variance shadow maps.
    Psvsm,
    /// Summed-area-table variance shadow maps.
    SatVsm,
}

impl ShadowAlgorithm {
    /// All algorithms, in selection-key order.
    pub const ALL: [Self; 4] = [Self::Pcf, Self::Vsm, Self::Psvsm, Self::SatVsm];

    /// Maps a 1-based selection index (the `1`..`4` keys) to an algorithm.
    #[must_use]
    pub fn from_index(index: u32) -> Option<Self> {
        index
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i as usize).copied())
    }

    /// The 1-based selection index of this algorithm.
    #[must_use]
    pub fn index(self) -> u32 {
        match self {
            Self::Pcf => 1,
            Self::Vsm => 2,
            Self::Psvsm => 3,
            Self::SatVsm => 4,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pcf => "Percentage-Closer Filtering",
            Self::Vsm => "Variance Shadow Map",
            Self::Psvsm => "Parallel-Split Variance Shadow Map",
            Self::SatVsm => "Summed-Area-Table Variance Shadow Map",
        }
    }

    #[must_use]
    pub fn short_name(self) -> &'static str {
        match self {
            Self::Pcf => "PCF",
            Self::Vsm => "VSM",
            Self::Psvsm => "PSVSM",
            Self::SatVsm => "SATVSM",
        }
    }
}

impl fmt::Display for ShadowAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}
