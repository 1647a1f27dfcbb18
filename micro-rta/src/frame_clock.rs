use crate::config::NOMINAL_FPS;

// Frame interval numerator in ms, slightly under 1000 so a display running at
// exactly the target rate does not drop frames.
const FRAME_INTERVAL_MS: f64 = 975.0;
const MEASURE_PERIOD_MS: f64 = 1000.0;

/// Paces frames to an optional fps cap and measures the rendered frame rate
/// once per second.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameClock {
    max_fps: u32,
    target_interval: f64,
    last_frame: f64,
    last_measure: f64,
    frames: u32,
    fps: f32,
    started: bool,
}

impl FrameClock {
    pub fn new(max_fps: u32) -> Self {
        Self {
            max_fps,
            target_interval: target_interval(max_fps),
            last_frame: 0.0,
            last_measure: 0.0,
            frames: 0,
            fps: initial_fps(max_fps),
            started: false,
        }
    }

    /// Changes the cap; the current measurement carries on.
    pub fn set_max_fps(&mut self, max_fps: u32) {
        self.max_fps = max_fps;
        self.target_interval = target_interval(max_fps);
        if !self.started {
            self.fps = initial_fps(max_fps);
        }
    }

    pub fn max_fps(&self) -> u32 {
        self.max_fps
    }

    /// Last measured frame rate, or the expected one before the first
    /// measurement.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Offers a frame at `timestamp_ms`. Returns `false` when the frame must be
    /// skipped to respect the cap.
    pub fn tick(&mut self, timestamp_ms: f64) -> bool {
        if !self.started {
            self.started = true;
            self.last_frame = timestamp_ms;
            self.last_measure = timestamp_ms;
            self.frames = 0;
            return true;
        }

        let elapsed = timestamp_ms - self.last_measure;
        let frame_time = timestamp_ms - self.last_frame;

        if frame_time < self.target_interval {
            return false;
        }

        self.last_frame = if self.target_interval > 0.0 {
            timestamp_ms - libm::fmod(frame_time, self.target_interval)
        } else {
            timestamp_ms
        };
        self.frames += 1;

        if elapsed >= MEASURE_PERIOD_MS {
            self.fps = (self.frames as f64 / elapsed * 1e3) as f32;
            self.frames = 0;
            self.last_measure = timestamp_ms;
        }
        true
    }
}

fn target_interval(max_fps: u32) -> f64 {
    if max_fps > 0 {
        FRAME_INTERVAL_MS / max_fps as f64
    } else {
        0.0
    }
}

fn initial_fps(max_fps: u32) -> f32 {
    if max_fps > 0 {
        max_fps as f32
    } else {
        NOMINAL_FPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VSYNC_MS: f64 = 1000.0 / 60.0;

    fn run(clock: &mut FrameClock, start: f64, ticks: u32) -> u32 {
        (0..ticks)
            .filter(|i| clock.tick(start + *i as f64 * VSYNC_MS))
            .count() as u32
    }

    #[test]
    fn test_initial_fps() {
        assert_eq!(FrameClock::new(0).fps(), 60.0);
        assert_eq!(FrameClock::new(30).fps(), 30.0);
    }

    #[test]
    fn test_unlimited_renders_every_frame() {
        let mut clock = FrameClock::new(0);
        let rendered = run(&mut clock, 12_345.0, 600);
        assert_eq!(rendered, 600);
        assert!((59.0..=61.0).contains(&clock.fps()), "fps {}", clock.fps());
    }

    #[test]
    fn test_cap_halves_a_60hz_display() {
        let mut clock = FrameClock::new(30);
        let rendered = run(&mut clock, 5_000.0, 600);
        assert!((295..=315).contains(&rendered), "rendered {}", rendered);
        assert!((29.0..=32.0).contains(&clock.fps()), "fps {}", clock.fps());
    }

    #[test]
    fn test_first_frame_is_rendered() {
        let mut clock = FrameClock::new(10);
        assert!(clock.tick(1_000_000.0));
        assert!(!clock.tick(1_000_010.0));
        assert!(clock.tick(1_000_100.0));
    }

    #[test]
    fn test_measurement_waits_a_second() {
        let mut clock = FrameClock::new(0);
        run(&mut clock, 0.0, 30);
        assert_eq!(clock.fps(), 60.0);
    }

    #[test]
    fn test_set_max_fps() {
        let mut clock = FrameClock::new(0);
        clock.set_max_fps(24);
        assert_eq!(clock.max_fps(), 24);
        assert_eq!(clock.fps(), 24.0);
    }
}
