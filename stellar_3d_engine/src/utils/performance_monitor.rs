/// Frame-time performance monitor
///
/// Samples frame boundary timestamps and keeps a rolling average of frame
/// duration, from which average and instantaneous FPS are derived. The
/// engine samples it once per frame; consumers read `average_fps()` at
/// their leisure.

// ============================================================================
// Rolling average
// ============================================================================

/// Rolling average over the last `sample_size` samples
#[derive(Debug)]
pub struct RollingAverage {
    samples: Vec<f64>,
    cursor: usize,
    filled: usize,
}

impl RollingAverage {
    pub fn new(sample_size: usize) -> Self {
        Self {
            samples: vec![0.0; sample_size.max(1)],
            cursor: 0,
            filled: 0,
        }
    }

    /// Add a sample, evicting the oldest once the window is full
    pub fn add(&mut self, sample: f64) {
        self.samples[self.cursor] = sample;
        self.cursor = (self.cursor + 1) % self.samples.len();
        if self.filled < self.samples.len() {
            self.filled += 1;
        }
    }

    /// Average over the window, or `None` before the first sample
    pub fn average(&self) -> Option<f64> {
        if self.filled == 0 {
            return None;
        }
        let sum: f64 = self.samples[..self.filled].iter().sum();
        Some(sum / self.filled as f64)
    }

    /// Most recently added sample
    pub fn latest(&self) -> Option<f64> {
        if self.filled == 0 {
            return None;
        }
        let index = (self.cursor + self.samples.len() - 1) % self.samples.len();
        Some(self.samples[index])
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.filled = 0;
    }
}

// ============================================================================
// Performance monitor
// ============================================================================

/// Default rolling window, in frames
const DEFAULT_FRAME_SAMPLE_SIZE: usize = 30;

/// Rolling FPS/frame-time monitor
#[derive(Debug)]
pub struct PerformanceMonitor {
    enabled: bool,
    rolling_frame_time: RollingAverage,
    last_frame_time_ms: Option<f64>,
}

impl PerformanceMonitor {
    /// Monitor with the default 30-frame window
    pub fn new() -> Self {
        Self::with_sample_size(DEFAULT_FRAME_SAMPLE_SIZE)
    }

    /// Monitor with a custom window size
    pub fn with_sample_size(frame_sample_size: usize) -> Self {
        Self {
            enabled: true,
            rolling_frame_time: RollingAverage::new(frame_sample_size),
            last_frame_time_ms: None,
        }
    }

    /// Record a frame boundary at `time_ms` (milliseconds on any
    /// monotonically increasing clock)
    pub fn sample_frame(&mut self, time_ms: f64) {
        if !self.enabled {
            return;
        }
        if let Some(last) = self.last_frame_time_ms {
            self.rolling_frame_time.add(time_ms - last);
        }
        self.last_frame_time_ms = Some(time_ms);
    }

    /// Average frame duration in milliseconds over the window
    pub fn average_frame_time_ms(&self) -> Option<f64> {
        self.rolling_frame_time.average()
    }

    /// Duration of the most recent frame in milliseconds
    pub fn instantaneous_frame_time_ms(&self) -> Option<f64> {
        self.rolling_frame_time.latest()
    }

    /// Average frames per second over the window
    pub fn average_fps(&self) -> Option<f64> {
        match self.rolling_frame_time.average() {
            Some(ms) if ms > 0.0 => Some(1000.0 / ms),
            _ => None,
        }
    }

    /// Frames per second of the most recent frame
    pub fn instantaneous_fps(&self) -> Option<f64> {
        match self.rolling_frame_time.latest() {
            Some(ms) if ms > 0.0 => Some(1000.0 / ms),
            _ => None,
        }
    }

    /// Resume sampling; the interval spanning the disabled period is skipped
    pub fn enable(&mut self) {
        self.enabled = true;
        self.last_frame_time_ms = None;
    }

    /// Stop sampling
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Drop all collected samples
    pub fn reset(&mut self) {
        self.rolling_frame_time.reset();
        self.last_frame_time_ms = None;
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "performance_monitor_tests.rs"]
mod tests;
