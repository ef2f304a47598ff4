use std::time::{Duration, Instant};

/// Frame-rate statistics over one reporting window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FpsReport {
    /// Presented frames per second.
    pub fps: f32,
    /// Frames per second if only the measured per-frame work counted.
    pub work_fps: f32,
}

/// Accumulates per-frame work durations and reports once per window.
pub struct FpsCounter {
    window: Duration,
    window_start: Instant,
    frame_count: u32,
    work_time: Duration,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::with_window(Instant::now(), Duration::from_secs(1))
    }

    #[must_use]
    pub fn with_window(start: Instant, window: Duration) -> Self {
        Self {
            window,
            window_start: start,
            frame_count: 0,
            work_time: Duration::ZERO,
        }
    }

    /// Records a frame whose shadow + shading work took `work`.
    pub fn update(&mut self, work: Duration) -> Option<FpsReport> {
        self.update_at(Instant::now(), work)
    }

    /// Same as [`update`](Self::update) with an explicit clock reading.
    pub fn update_at(&mut self, now: Instant, work: Duration) -> Option<FpsReport> {
        self.frame_count += 1;
        self.work_time += work;

        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }

        let frames = self.frame_count as f32;
        let work_secs = self.work_time.as_secs_f32();
        let report = FpsReport {
            fps: frames / elapsed.as_secs_f32(),
            work_fps: if work_secs > 0.0 { frames / work_secs } else { 0.0 },
        };

        self.window_start = now;
        self.frame_count = 0;
        self.work_time = Duration::ZERO;

        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_window() {
        let start = Instant::now();
        let mut counter = FpsCounter::with_window(start, Duration::from_secs(1));
        let work = Duration::from_millis(2);

        for i in 1..60 {
            assert!(counter.update_at(start + Duration::from_millis(i * 16), work).is_none());
        }
        let report = counter
            .update_at(start + Duration::from_secs(1), work)
            .expect("window elapsed");

        assert!((report.fps - 60.0).abs() < 1e-3);
        assert!((report.work_fps - 500.0).abs() < 1e-2);
    }
}
