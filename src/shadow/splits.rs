//! Cascade Split Computation
//!
//! Partitions the main camera's `[near, far]` depth range into `N` contiguous
//! slices using the Practical Split Scheme: each interior split is a blend of
//! the uniform split and the logarithmic split at the same index.
//!
//! Logarithmic splits pack cascades close to the viewer where perspective
//! aliasing is worst, but starve the far cascade; the blend weight trades the
//! two off.

use crate::errors::{Result, ShadowLabError};

/// Maximum cascade count supported by the GPU path (uniform array size and
/// moment array layers).
pub const MAX_CASCADES: usize = 4;

/// Default blend between uniform (`0.0`) and logarithmic (`1.0`) splits.
pub const DEFAULT_SPLIT_WEIGHT: f32 = 0.5;

/// Uniform split distance at index `i` of `count`.
#[inline]
#[must_use]
pub fn uniform_split(near: f32, far: f32, i: usize, count: usize) -> f32 {
    uniform_at(f64::from(near), f64::from(far), fraction(i, count)) as f32
}

/// Logarithmic split distance at index `i` of `count`.
#[inline]
#[must_use]
pub fn log_split(near: f32, far: f32, i: usize, count: usize) -> f32 {
    log_at(f64::from(near), f64::from(far), fraction(i, count)) as f32
}

fn fraction(i: usize, count: usize) -> f64 {
    i as f64 / count as f64
}

fn uniform_at(near: f64, far: f64, t: f64) -> f64 {
    near + (far - near) * t
}

// Interpolated in log space: `far / near` overflows for wide ranges.
fn log_at(near: f64, far: f64, t: f64) -> f64 {
    (near.ln() + (far.ln() - near.ln()) * t).exp()
}

/// Ordered split distances `[d0 = near, d1, …, dN = far]` defining `N` slices.
///
/// Invariants: `distances.len() == N + 1`, `N >= 1`, strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeSplits {
    distances: Vec<f32>,
}

impl CascadeSplits {
    /// Computes `count + 1` split distances over `[near, far]`.
    ///
    /// `weight` blends the uniform split (`0.0`) with the logarithmic split
    /// (`1.0`). The first and last distances are exactly `near` and `far`.
    pub fn compute(near: f32, far: f32, count: usize, weight: f32) -> Result<Self> {
        let valid_range = near.is_finite() && far.is_finite() && near > 0.0 && far > near;
        if count == 0 || !valid_range {
            return Err(ShadowLabError::InvalidCascadeRange { near, far, count });
        }
        if !(0.0..=1.0).contains(&weight) {
            return Err(ShadowLabError::InvalidSplitWeight(weight));
        }

        let (n, f) = (f64::from(near), f64::from(far));
        let mut distances = Vec::with_capacity(count + 1);
        distances.push(near);
        for i in 1..count {
            let t = fraction(i, count);
            let u = uniform_at(n, f, t);
            let g = log_at(n, f, t);
            let w = f64::from(weight);
            distances.push((u * (1.0 - w) + g * w) as f32);
        }
        distances.push(far);

        // Ranges narrower than a few f32 ulps collapse interior splits
        let increasing = distances.windows(2).all(|w| w[0] < w[1]);
        if !increasing || distances.iter().any(|d| !d.is_finite()) {
            return Err(ShadowLabError::InvalidCascadeRange { near, far, count });
        }

        Ok(Self { distances })
    }

    /// All `N + 1` split distances.
    #[inline]
    #[must_use]
    pub fn distances(&self) -> &[f32] {
        &self.distances
    }

    /// Number of slices `N`.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.distances.len() - 1
    }

    #[inline]
    #[must_use]
    pub fn near(&self) -> f32 {
        self.distances[0]
    }

    #[inline]
    #[must_use]
    pub fn far(&self) -> f32 {
        self.distances[self.count()]
    }

    /// The `[near_i, far_i]` range of slice `i`.
    #[must_use]
    pub fn slice(&self, i: usize) -> Option<(f32, f32)> {
        if i < self.count() {
            Some((self.distances[i], self.distances[i + 1]))
        } else {
            None
        }
    }

    /// Iterates over `[near_i, far_i]` for every slice.
    pub fn slices(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.distances.windows(2).map(|w| (w[0], w[1]))
    }

    /// Index of the slice whose range contains the view-space `depth`.
    ///
    /// Mirrors the cascade selection done per fragment in the PSVSM shader:
    /// depths before the first slice map to slice 0, depths past the last
    /// slice return `None`.
    #[must_use]
    pub fn cascade_for_depth(&self, depth: f32) -> Option<usize> {
        self.distances[1..].iter().position(|&far| depth <= far)
    }

    /// Far distance of each slice, padded with the final far plane up to
    /// [`MAX_CASCADES`] entries for upload as a uniform.
    #[must_use]
    pub fn far_planes(&self) -> [f32; MAX_CASCADES] {
        let mut out = [self.far(); MAX_CASCADES];
        for (dst, &far) in out.iter_mut().zip(&self.distances[1..]) {
            *dst = far;
        }
        out
    }
}
