//! Summed-Area Table Construction
//!
//! The SAT of a moments buffer is built with a log-step parallel prefix sum
//! (Hillis-Steele, radix `base`): every step reads the whole current buffer
//! and writes every texel of the other buffer, so each step is a single
//! data-parallel dispatch on the GPU. Rows are summed first, then columns.
//!
//! A step with offset `o` computes, for each texel,
//!
//! ```text
//! out(x) = Σ_{k=0}^{base-1} in(x - k·o)
//! ```
//!
//! with zero for reads before the first texel. After the offsets
//! `1, base, base², …` below the axis length, every texel holds the sum of all
//! texels up to and including itself.
//!
//! This module owns the pass [`SatSchedule`] and the [`PingPong`] bookkeeping,
//! shared by the wgpu compute pass and by the CPU [`SatBuilder`] used as the
//! reference implementation.

use glam::Vec2;

use crate::errors::{Result, ShadowLabError};

/// Default radix of the prefix-sum steps.
pub const DEFAULT_SAT_BASE: u32 = 4;

// ============================================================================
// Pass Schedule
// ============================================================================

/// Direction of a prefix-sum step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SatAxis {
    Horizontal,
    Vertical,
}

impl SatAxis {
    /// Texel step `(dx, dy)` along this axis.
    #[inline]
    #[must_use]
    pub fn direction(self) -> (u32, u32) {
        match self {
            Self::Horizontal => (1, 0),
            Self::Vertical => (0, 1),
        }
    }
}

/// One data-parallel prefix-sum step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SatStep {
    pub axis: SatAxis,
    pub offset: u32,
}

/// Ordered list of steps building the SAT of a `width × height` buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SatSchedule {
    width: u32,
    height: u32,
    base: u32,
    steps: Vec<SatStep>,
}

impl SatSchedule {
    /// Builds the schedule for a `width × height` buffer with radix `base`
    /// (clamped to at least 2).
    #[must_use]
    pub fn new(width: u32, height: u32, base: u32) -> Self {
        let base = base.max(2);
        let horizontal = Self::offsets(width, base).map(|offset| SatStep {
            axis: SatAxis::Horizontal,
            offset,
        });
        let vertical = Self::offsets(height, base).map(|offset| SatStep {
            axis: SatAxis::Vertical,
            offset,
        });

        Self {
            width,
            height,
            base,
            steps: horizontal.chain(vertical).collect(),
        }
    }

    /// `1, base, base², …` while below `size`.
    fn offsets(size: u32, base: u32) -> impl Iterator<Item = u32> {
        std::iter::successors(Some(1u32), move |&o| o.checked_mul(base))
            .take_while(move |&o| o < size)
    }

    /// Number of steps needed along an axis of length `size`: `⌈log_base(size)⌉`.
    #[must_use]
    pub fn passes_per_axis(size: u32, base: u32) -> u32 {
        Self::offsets(size, base.max(2)).count() as u32
    }

    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[SatStep] {
        &self.steps
    }

    #[inline]
    #[must_use]
    pub fn base(&self) -> u32 {
        self.base
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Total ping-pong swaps; the result lands in the front slot iff even.
    #[inline]
    #[must_use]
    pub fn swap_count(&self) -> u32 {
        self.steps.len() as u32
    }
}

// ============================================================================
// Ping-Pong Buffer
// ============================================================================

/// Two equally sized buffers alternating between "read" and "write" roles.
///
/// Slot 0 is the caller's front buffer: the moments are rendered into it and
/// the finished SAT is expected back in it.
#[derive(Debug, Clone)]
pub struct PingPong<T> {
    buffers: [T; 2],
    current: usize,
    swaps: u32,
}

impl<T> PingPong<T> {
    #[must_use]
    pub fn new(front: T, back: T) -> Self {
        Self {
            buffers: [front, back],
            current: 0,
            swaps: 0,
        }
    }

    /// The buffer holding the latest result.
    #[inline]
    #[must_use]
    pub fn current(&self) -> &T {
        &self.buffers[self.current]
    }

    #[inline]
    #[must_use]
    pub fn front(&self) -> &T {
        &self.buffers[0]
    }

    /// Borrows the current buffer for reading and the other for writing.
    pub fn split(&mut self) -> (&T, &mut T) {
        let [a, b] = &mut self.buffers;
        if self.current == 0 { (&*a, b) } else { (&*b, a) }
    }

    /// Makes the other buffer current.
    pub fn swap(&mut self) {
        self.current = 1 - self.current;
        self.swaps += 1;
    }

    #[inline]
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[inline]
    #[must_use]
    pub fn swaps(&self) -> u32 {
        self.swaps
    }

    /// Fails if the latest result is not in the front slot.
    pub fn check_parity(&self) -> Result<()> {
        if self.current == 0 {
            Ok(())
        } else {
            Err(ShadowLabError::SatParityMismatch {
                swaps: self.swaps,
                slot: self.current,
            })
        }
    }

    /// Moves the latest result into the front slot with `copy(src, dst)`.
    ///
    /// No-op when the result already sits in the front slot.
    pub fn realign(&mut self, copy: impl FnOnce(&T, &mut T)) {
        if self.current == 0 {
            return;
        }
        let [front, back] = &mut self.buffers;
        copy(&*back, front);
        self.swap();
    }

    #[must_use]
    pub fn into_front(self) -> T {
        let [front, _] = self.buffers;
        front
    }
}

// ============================================================================
// CPU Moments Grid
// ============================================================================

/// A `width × height` grid of (depth, depth²) moments, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct MomentsGrid {
    width: u32,
    height: u32,
    texels: Vec<Vec2>,
}

impl MomentsGrid {
    /// A grid with every texel set to `value`.
    #[must_use]
    pub fn filled(width: u32, height: u32, value: Vec2) -> Self {
        Self {
            width,
            height,
            texels: vec![value; (width * height) as usize],
        }
    }

    /// A grid whose texel `(x, y)` is `f(x, y)`.
    #[must_use]
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Vec2) -> Self {
        let texels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self {
            width,
            height,
            texels,
        }
    }

    /// Moments of a depth field: `(d, d²)` per texel.
    #[must_use]
    pub fn from_depths(width: u32, height: u32, depth: impl Fn(u32, u32) -> f32) -> Self {
        Self::from_fn(width, height, |x, y| {
            let d = depth(x, y);
            Vec2::new(d, d * d)
        })
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    #[must_use]
    pub fn texels(&self) -> &[Vec2] {
        &self.texels
    }

    #[inline]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Vec2 {
        self.texels[(y * self.width + x) as usize]
    }

    /// Sum of the texels in the inclusive rectangle `[x1, x2] × [y1, y2]`.
    #[must_use]
    pub fn rect_sum(&self, x1: u32, y1: u32, x2: u32, y2: u32) -> Vec2 {
        (y1..=y2)
            .flat_map(|y| (x1..=x2).map(move |x| (x, y)))
            .map(|(x, y)| self.get(x, y))
            .sum()
    }
}

// ============================================================================
// CPU Reference Builder
// ============================================================================

/// Summed-area table of a [`MomentsGrid`].
#[derive(Debug, Clone, PartialEq)]
pub struct SummedAreaTable {
    grid: MomentsGrid,
}

impl SummedAreaTable {
    /// Cumulative moments of all texels in `[0, x] × [0, y]`.
    #[inline]
    #[must_use]
    pub fn at(&self, x: u32, y: u32) -> Vec2 {
        self.grid.get(x, y)
    }

    /// Like [`at`](Self::at) with a zero border for negative coordinates.
    #[inline]
    fn at_or_zero(&self, x: i64, y: i64) -> Vec2 {
        if x < 0 || y < 0 {
            Vec2::ZERO
        } else {
            self.at(x as u32, y as u32)
        }
    }

    /// Box sum over the inclusive rectangle `[x1, x2] × [y1, y2]`:
    /// `SAT(x2,y2) - SAT(x1-1,y2) - SAT(x2,y1-1) + SAT(x1-1,y1-1)`.
    ///
    /// Corners may be given in either order.
    #[must_use]
    pub fn box_sum(&self, x1: u32, y1: u32, x2: u32, y2: u32) -> Vec2 {
        let (x1, y1, x2, y2) = normalize_rect(x1, y1, x2, y2);
        let (x1, y1, x2, y2) = (
            i64::from(x1) - 1,
            i64::from(y1) - 1,
            i64::from(x2),
            i64::from(y2),
        );
        self.at_or_zero(x2, y2) - self.at_or_zero(x1, y2) - self.at_or_zero(x2, y1)
            + self.at_or_zero(x1, y1)
    }

    /// Mean moments over the inclusive rectangle.
    #[must_use]
    pub fn box_mean(&self, x1: u32, y1: u32, x2: u32, y2: u32) -> Vec2 {
        let (x1, y1, x2, y2) = normalize_rect(x1, y1, x2, y2);
        let area = (f64::from(x2 - x1) + 1.0) * (f64::from(y2 - y1) + 1.0);
        self.box_sum(x1, y1, x2, y2) / area as f32
    }

    #[must_use]
    pub fn grid(&self) -> &MomentsGrid {
        &self.grid
    }
}

/// Orders rectangle corners as `(min x, min y, max x, max y)`.
fn normalize_rect(x1: u32, y1: u32, x2: u32, y2: u32) -> (u32, u32, u32, u32) {
    (x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2))
}

/// Runs the SAT kernel on the CPU, step for step as the GPU does.
#[derive(Debug, Clone, Copy)]
pub struct SatBuilder {
    base: u32,
}

impl Default for SatBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SAT_BASE)
    }
}

impl SatBuilder {
    #[must_use]
    pub fn new(base: u32) -> Self {
        Self { base: base.max(2) }
    }

    #[must_use]
    pub fn schedule(&self, width: u32, height: u32) -> SatSchedule {
        SatSchedule::new(width, height, self.base)
    }

    /// Builds the summed-area table of `moments`.
    ///
    /// An odd step count leaves the result in the back buffer; this is
    /// reported and repaired by copying it to the front.
    #[must_use]
    pub fn build(&self, moments: MomentsGrid) -> SummedAreaTable {
        let (width, height) = (moments.width, moments.height);
        let schedule = self.schedule(width, height);

        let back = vec![Vec2::ZERO; moments.texels.len()];
        let mut buffers = PingPong::new(moments.texels, back);

        for step in schedule.steps() {
            let (src, dst) = buffers.split();
            run_step(src, dst, width, height, *step, self.base);
            buffers.swap();
        }

        if let Err(err) = buffers.check_parity() {
            log::warn!("{err}; copying result to the front buffer");
            buffers.realign(|src, dst| dst.copy_from_slice(src));
        }

        SummedAreaTable {
            grid: MomentsGrid {
                width,
                height,
                texels: buffers.into_front(),
            },
        }
    }
}

/// One prefix-sum step over every texel: `dst(p) = Σ_k src(p - k·offset·axis)`.
fn run_step(src: &[Vec2], dst: &mut [Vec2], width: u32, height: u32, step: SatStep, base: u32) {
    let (dx, dy) = step.axis.direction();
    let (sx, sy) = (dx * step.offset, dy * step.offset);

    dst.iter_mut().enumerate().for_each(|(i, out)| {
        let (x, y) = (i as u32 % width, i as u32 / width);
        debug_assert!(y < height);
        *out = (0..base)
            .map_while(|k| {
                let rx = x.checked_sub(k * sx)?;
                let ry = y.checked_sub(k * sy)?;
                Some(src[(ry * width + rx) as usize])
            })
            .sum();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_reads_zero_border() {
        let src = vec![Vec2::ONE; 4];
        let mut dst = vec![Vec2::ZERO; 4];
        let step = SatStep {
            axis: SatAxis::Horizontal,
            offset: 1,
        };
        run_step(&src, &mut dst, 4, 1, step, 4);
        let firsts: Vec<f32> = dst.iter().map(|v| v.x).collect();
        assert_eq!(firsts, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn ping_pong_realign_moves_result_to_front() {
        let mut pp = PingPong::new(1, 2);
        pp.swap();
        assert!(pp.check_parity().is_err());
        pp.realign(|src, dst| *dst = *src);
        assert!(pp.check_parity().is_ok());
        assert_eq!(*pp.front(), 2);
    }
}
