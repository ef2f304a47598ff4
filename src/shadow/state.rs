//! Algorithm State Machine
//!
//! Holds the active [`ShadowStrategy`]. Selections are queued and only take
//! effect at the next frame boundary, so a frame never mixes the products of
//! two algorithms.

use super::ShadowAlgorithm;
use super::strategy::{FrameInputs, FramePlan, ShadowStrategy, strategy_for};

#[derive(Debug)]
pub struct ShadowStateMachine {
    active: Box<dyn ShadowStrategy>,
    pending: Option<ShadowAlgorithm>,
    frames_in_state: u64,
}

impl Default for ShadowStateMachine {
    fn default() -> Self {
        Self::new(ShadowAlgorithm::default())
    }
}

impl ShadowStateMachine {
    #[must_use]
    pub fn new(initial: ShadowAlgorithm) -> Self {
        Self {
            active: strategy_for(initial),
            pending: None,
            frames_in_state: 0,
        }
    }

    /// The algorithm driving the current (or next, before any frame) frame.
    #[inline]
    #[must_use]
    pub fn active(&self) -> ShadowAlgorithm {
        self.active.algorithm()
    }

    /// A selection that will be applied at the next frame boundary.
    #[inline]
    #[must_use]
    pub fn pending(&self) -> Option<ShadowAlgorithm> {
        self.pending
    }

    /// Frames planned since the last switch.
    #[inline]
    #[must_use]
    pub fn frames_in_state(&self) -> u64 {
        self.frames_in_state
    }

    /// Queues `algorithm` for the next frame.
    ///
    /// Returns `false` when it is already active and nothing else is pending.
    pub fn select(&mut self, algorithm: ShadowAlgorithm) -> bool {
        if self.pending.is_none() && algorithm == self.active() {
            return false;
        }
        self.pending = (algorithm != self.active()).then_some(algorithm);
        true
    }

    /// Applies a pending selection, then plans the frame with the active
    /// strategy.
    ///
    /// A strategy that cannot plan (for example an invalid cascade range) is
    /// logged and yields a plan without light passes.
    pub fn begin_frame(&mut self, inputs: &FrameInputs<'_>) -> FramePlan {
        if let Some(next) = self.pending.take() {
            log::info!(">> {} Selected", next.label());
            self.active = strategy_for(next);
            self.frames_in_state = 0;
        }
        self.frames_in_state += 1;

        match self.active.plan(inputs) {
            Ok(plan) => plan,
            Err(err) => {
                log::error!("{} frame plan failed: {err}", self.active());
                FramePlan::degraded(self.active.as_ref(), inputs)
            }
        }
    }
}
