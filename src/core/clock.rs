use std::time::Instant;

/// Seconds between FPS readings
const FPS_UPDATE_INTERVAL: f32 = 0.5;

/// Tracks delta time between frames
#[derive(Debug)]
pub struct Clock {
    last_tick: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
        }
    }

    /// Get delta time since last tick and advance clock
    /// Returns delta in seconds
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        delta
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Frames per second averaged over a short window
#[derive(Debug, Default)]
pub struct FpsCounter {
    frame_count: u32,
    elapsed: f32,
    fps: f32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one frame that took `delta` seconds. Returns the new reading
    /// whenever one is produced.
    pub fn record(&mut self, delta: f32) -> Option<f32> {
        self.frame_count += 1;
        self.elapsed += delta;

        if self.elapsed < FPS_UPDATE_INTERVAL {
            return None;
        }
        self.fps = self.frame_count as f32 / self.elapsed;
        self.frame_count = 0;
        self.elapsed = 0.0;
        Some(self.fps)
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn clock_measures_delta() {
        let mut clock = Clock::new();

        thread::sleep(Duration::from_millis(10));
        let delta = clock.tick();

        // At least the sleep; generous upper bound for loaded machines
        assert!(delta >= 0.009 && delta < 1.0);
    }

    #[test]
    fn fps_counter_reports_after_interval() {
        let mut counter = FpsCounter::new();
        for _ in 0..3 {
            assert_eq!(counter.record(0.125), None);
        }
        let fps = counter.record(0.125).expect("half a second elapsed");
        assert!((fps - 8.0).abs() < 1e-4);
        assert!((counter.fps() - fps).abs() < 1e-6);
    }

    #[test]
    fn fps_counter_starts_at_zero() {
        assert_eq!(FpsCounter::new().fps(), 0.0);
    }
}
