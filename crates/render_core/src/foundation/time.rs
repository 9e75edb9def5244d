//! Frame timing

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Number of frame times kept for the rolling average
const ROLLING_WINDOW: usize = 120;

/// Frame timer with a rolling average and a periodic log readout
///
/// Call [`FrameTimer::tick`] once per frame. Every `report_interval` the
/// timer emits an `info!` line with the current FPS and the rolling average
/// frame time.
pub struct FrameTimer {
    last_frame: Instant,
    last_report: Instant,
    report_interval: Duration,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
    history: VecDeque<f32>,
    history_sum: f32,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    /// Create a new timer that reports once per second
    #[must_use]
    pub fn new() -> Self {
        Self::with_report_interval(Duration::from_secs(1))
    }

    /// Create a timer with a custom report interval
    #[must_use]
    pub fn with_report_interval(report_interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            last_report: now,
            report_interval,
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
            history: VecDeque::with_capacity(ROLLING_WINDOW),
            history_sum: 0.0,
        }
    }

    /// Advance the timer by the wall-clock time since the last tick
    ///
    /// Returns the frame delta in seconds.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.record(elapsed.as_secs_f32());

        if now.duration_since(self.last_report) >= self.report_interval {
            self.last_report = now;
            log::info!(
                "{:.1} FPS ({:.2} ms avg over {} frames)",
                self.current_fps(),
                self.average_frame_time() * 1000.0,
                self.history.len()
            );
        }

        self.delta_time
    }

    /// Feed a frame time directly (used by [`tick`](Self::tick) and tests)
    pub fn record(&mut self, delta_seconds: f32) {
        self.delta_time = delta_seconds;
        self.total_time += delta_seconds;
        self.frame_count += 1;

        if self.history.len() == ROLLING_WINDOW {
            if let Some(oldest) = self.history.pop_front() {
                self.history_sum -= oldest;
            }
        }
        self.history.push_back(delta_seconds);
        self.history_sum += delta_seconds;
    }

    /// Time since the last frame in seconds
    #[must_use]
    pub const fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Total elapsed time since the timer was created
    #[must_use]
    pub const fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Number of frames recorded
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Instantaneous FPS based on the last frame time
    #[must_use]
    pub fn current_fps(&self) -> f32 {
        if self.delta_time > 0.0 {
            1.0 / self.delta_time
        } else {
            0.0
        }
    }

    /// Average frame time over the rolling window, in seconds
    #[must_use]
    pub fn average_frame_time(&self) -> f32 {
        if self.history.is_empty() {
            0.0
        } else {
            self.history_sum / self.history.len() as f32
        }
    }

    /// FPS derived from the rolling average frame time
    #[must_use]
    pub fn average_fps(&self) -> f32 {
        let average = self.average_frame_time();
        if average > 0.0 {
            1.0 / average
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_timer_reports_zero() {
        let timer = FrameTimer::new();
        assert_eq!(timer.frame_count(), 0);
        assert_relative_eq!(timer.current_fps(), 0.0);
        assert_relative_eq!(timer.average_frame_time(), 0.0);
    }

    #[test]
    fn test_record_tracks_delta_and_totals() {
        let mut timer = FrameTimer::new();
        timer.record(0.016);
        timer.record(0.020);

        assert_eq!(timer.frame_count(), 2);
        assert_relative_eq!(timer.delta_time(), 0.020);
        assert_relative_eq!(timer.total_time(), 0.036, epsilon = 1e-6);
        assert_relative_eq!(timer.current_fps(), 50.0, epsilon = 1e-3);
        assert_relative_eq!(timer.average_frame_time(), 0.018, epsilon = 1e-6);
    }

    #[test]
    fn test_rolling_window_drops_old_frames() {
        let mut timer = FrameTimer::new();
        for _ in 0..ROLLING_WINDOW {
            timer.record(0.1);
        }
        for _ in 0..ROLLING_WINDOW {
            timer.record(0.01);
        }

        assert_relative_eq!(timer.average_frame_time(), 0.01, epsilon = 1e-5);
        assert_relative_eq!(timer.average_fps(), 100.0, epsilon = 0.1);
        assert_eq!(timer.frame_count(), 2 * ROLLING_WINDOW as u64);
    }

    #[test]
    fn test_tick_returns_non_negative_delta() {
        let mut timer = FrameTimer::with_report_interval(Duration::from_millis(0));
        let delta = timer.tick();
        assert!(delta >= 0.0);
        assert_eq!(timer.frame_count(), 1);
    }
}
