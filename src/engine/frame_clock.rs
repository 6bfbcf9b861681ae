/// Frame pacing for the fixed-step loop
///
/// Every frame advances the simulation by exactly one step of `1/fps`
/// seconds; the clock only sleeps away whatever is left of the frame budget.
use std::time::{Duration, Instant};

/// FPS tracking window (average over last N frames)
const FPS_WINDOW_SIZE: usize = 60;

/// Frame timing state
#[derive(Debug)]
pub struct FrameClock {
    /// Wall-clock budget of one frame
    frame_duration: Duration,

    /// When the current frame started
    frame_start: Instant,

    /// Frame timing history for FPS calculation
    frame_times: Vec<Duration>,

    /// Frames completed
    frame_count: u64,

    /// Measured FPS (updated periodically)
    current_fps: f32,
}

impl FrameClock {
    /// Create a clock targeting `fps` frames per second
    pub fn new(fps: u32) -> Self {
        Self {
            frame_duration: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
            frame_start: Instant::now(),
            frame_times: Vec::with_capacity(FPS_WINDOW_SIZE),
            frame_count: 0,
            current_fps: 0.0,
        }
    }

    /// Sleep out the rest of the frame budget and start the next frame
    ///
    /// Returns the wall-clock length of the finished frame.
    pub fn tick(&mut self) -> Duration {
        let busy = self.frame_start.elapsed();
        if let Some(remaining) = self.frame_duration.checked_sub(busy) {
            std::thread::sleep(remaining);
        }

        let now = Instant::now();
        let frame_time = now.duration_since(self.frame_start);
        self.frame_start = now;
        self.frame_count += 1;

        // Store frame time for FPS calculation
        self.frame_times.push(frame_time);
        if self.frame_times.len() > FPS_WINDOW_SIZE {
            self.frame_times.remove(0);
        }

        // Update FPS counter every 10 frames
        if self.frame_count % 10 == 0 {
            self.update_fps();
        }

        frame_time
    }

    /// Get current FPS
    pub fn fps(&self) -> f32 {
        self.current_fps
    }

    /// Get total number of frames completed
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn update_fps(&mut self) {
        if self.frame_times.is_empty() {
            self.current_fps = 0.0;
            return;
        }

        let total: Duration = self.frame_times.iter().sum();
        let avg_frame_time = total / self.frame_times.len() as u32;

        self.current_fps = if avg_frame_time.as_secs_f32() > 0.0 {
            1.0 / avg_frame_time.as_secs_f32()
        } else {
            0.0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_counting() {
        let mut clock = FrameClock::new(1000);
        assert_eq!(clock.frame_count(), 0);

        clock.tick();
        assert_eq!(clock.frame_count(), 1);

        clock.tick();
        assert_eq!(clock.frame_count(), 2);
    }

    #[test]
    fn test_tick_holds_target_rate() {
        let mut clock = FrameClock::new(100);
        let frame = clock.tick();
        assert!(frame >= Duration::from_millis(10));
    }

    #[test]
    fn test_fps_is_measured_every_ten_frames() {
        let mut clock = FrameClock::new(500);
        for _ in 0..9 {
            clock.tick();
        }
        assert_eq!(clock.fps(), 0.0);

        clock.tick();
        assert!(clock.fps() > 0.0);
        assert!(clock.fps() <= 500.0 * 1.05);
    }
}
