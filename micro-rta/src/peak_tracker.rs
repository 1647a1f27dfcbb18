use alloc::{vec, vec::Vec};

use crate::config::{AnalyzerConfig, NOMINAL_FPS};
use crate::types::{BarState, ChannelState, EnergyState};

/// Frame-rate dependent constants for one update.
///
/// Hold and fade times are wall-clock; they are converted to frame counts
/// with the frame rate measured for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameDynamics {
    /// Frames a new peak is held before it starts falling or fading.
    pub hold_frames: f32,
    /// Frames a fading peak takes to become fully transparent.
    pub fade_frames: f32,
    pub fps_squared: f32,
    /// Peak acceleration in nominal units per second squared.
    pub gravity: f32,
    pub nominal_max_height: f32,
    pub fade_peaks: bool,
    pub alpha_bars: bool,
}

impl FrameDynamics {
    /// Falls back to the nominal frame rate when `fps` is not a positive number.
    pub fn new(config: &AnalyzerConfig, fps: f32) -> Self {
        let fps = if fps > 0.0 { fps } else { NOMINAL_FPS };
        Self {
            hold_frames: fps * config.peak_hold_time_ms / 1e3,
            fade_frames: fps * config.peak_fade_time_ms / 1e3,
            fps_squared: fps * fps,
            gravity: config.gravity_accel(),
            nominal_max_height: config.nominal_max_height(),
            fade_peaks: config.fade_peaks,
            alpha_bars: config.alpha_bars,
        }
    }

    /// Peak drop for a peak that has been falling for `-hold` frames.
    fn fall(&self, hold: f32) -> f32 {
        hold * self.gravity / self.fps_squared / self.nominal_max_height
    }
}

/// Peak hold, gravity and fade state for every bar on every channel, plus the
/// aggregate energy.
///
/// Sized for one layout; a layout rebuild replaces the whole tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakEnergyTracker {
    bars: Vec<BarState>,
    energy: EnergyState,
    channel_count: usize,
}

impl PeakEnergyTracker {
    pub fn new(bar_count: usize, channel_count: usize) -> Self {
        Self {
            bars: vec![BarState::default(); bar_count],
            energy: EnergyState::default(),
            channel_count: channel_count.clamp(1, 2),
        }
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn states(&self) -> &[BarState] {
        &self.bars
    }

    pub fn channel(&self, bar: usize, channel: usize) -> Option<&ChannelState> {
        self.bars
            .get(bar)
            .filter(|_| channel < self.channel_count)
            .map(|state| &state.channels[channel])
    }

    pub fn energy(&self) -> &EnergyState {
        &self.energy
    }

    pub fn reset(&mut self) {
        self.bars.fill(BarState::default());
        self.energy = EnergyState::default();
    }

    /// Runs one frame. `value_of(bar, channel)` supplies the normalized bar
    /// value for every bar on every active channel.
    pub fn update<F>(&mut self, dynamics: &FrameDynamics, mut value_of: F)
    where
        F: FnMut(usize, usize) -> f32,
    {
        let mut total = 0.0f32;

        for channel in 0..self.channel_count {
            for (index, bar) in self.bars.iter_mut().enumerate() {
                let value = value_of(index, channel);
                step_channel(&mut bar.channels[channel], value, dynamics);
                total += value;
            }
        }

        let slots = self.bars.len() * self.channel_count;
        let val = if slots > 0 { total / slots as f32 } else { 0.0 };
        step_energy(&mut self.energy, val, dynamics);
    }
}

fn step_channel(state: &mut ChannelState, value: f32, dynamics: &FrameDynamics) {
    if state.peak > 0.0 && state.alpha > 0.0 {
        state.hold -= 1.0;
        if state.hold < 0.0 {
            if dynamics.fade_peaks {
                let initial_alpha = if dynamics.alpha_bars { state.peak } else { 1.0 };
                state.alpha = if dynamics.fade_frames > 0.0 {
                    (initial_alpha * (1.0 + state.hold / dynamics.fade_frames)).max(0.0)
                } else {
                    0.0
                };
            } else {
                state.peak = (state.peak + dynamics.fall(state.hold)).max(0.0);
            }
            if state.alpha <= 0.0 {
                state.peak = 0.0;
            }
        }
    }

    if value >= state.peak {
        state.peak = value;
        state.hold = dynamics.hold_frames;
        state.alpha = if dynamics.alpha_bars { value } else { 1.0 };
    }

    state.value = value;
}

fn step_energy(energy: &mut EnergyState, val: f32, dynamics: &FrameDynamics) {
    energy.val = val;
    if energy.peak > 0.0 {
        energy.hold -= 1.0;
        if energy.hold < 0.0 {
            energy.peak = (energy.peak + dynamics.fall(energy.hold)).max(0.0);
        }
    }
    if val >= energy.peak {
        energy.peak = val;
        energy.hold = dynamics.hold_frames;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn dynamics(fade_peaks: bool) -> FrameDynamics {
        let config = AnalyzerConfig {
            fade_peaks,
            ..AnalyzerConfig::default()
        };
        FrameDynamics::new(&config, 60.0)
    }

    #[test]
    fn test_frame_dynamics() {
        let d = dynamics(false);
        assert_eq!(d.hold_frames, 30.0);
        assert_eq!(d.fade_frames, 45.0);
        assert_eq!(d.fps_squared, 3600.0);
        assert_eq!(d.gravity, 3800.0);
        assert_eq!(d.nominal_max_height, 270.0);

        let fallback = FrameDynamics::new(&AnalyzerConfig::default(), 0.0);
        assert_eq!(fallback.fps_squared, 3600.0);
        let fallback = FrameDynamics::new(&AnalyzerConfig::default(), f32::NAN);
        assert_eq!(fallback.hold_frames, 30.0);
    }

    #[test]
    fn test_new_tracker_is_silent() {
        let tracker = PeakEnergyTracker::new(4, 2);
        assert_eq!(tracker.bar_count(), 4);
        assert_eq!(tracker.channel(3, 1), Some(&ChannelState::default()));
        assert_eq!(tracker.channel(4, 0), None);
        assert_eq!(*tracker.energy(), EnergyState::default());

        let single = PeakEnergyTracker::new(4, 1);
        assert_eq!(single.channel(0, 1), None);
    }

    #[test]
    fn test_peak_follows_rising_values() {
        let d = dynamics(false);
        let mut tracker = PeakEnergyTracker::new(1, 1);
        for value in [0.1, 0.4, 0.7] {
            tracker.update(&d, |_, _| value);
            let state = tracker.channel(0, 0).unwrap();
            assert_eq!(state.value, value);
            assert_eq!(state.peak, value);
            assert_eq!(state.hold, 30.0);
            assert_eq!(state.alpha, 1.0);
        }
    }

    #[test]
    fn test_hold_then_gravity() {
        let d = dynamics(false);
        let mut tracker = PeakEnergyTracker::new(1, 1);
        tracker.update(&d, |_, _| 0.8);

        for frame in 1..=30 {
            tracker.update(&d, |_, _| 0.0);
            let state = tracker.channel(0, 0).unwrap();
            assert_eq!(state.peak, 0.8, "frame {}", frame);
            assert_eq!(state.hold, 30.0 - frame as f32);
        }

        tracker.update(&d, |_, _| 0.0);
        let state = tracker.channel(0, 0).unwrap();
        assert_abs_diff_eq!(state.peak, 0.8 - 3800.0 / 3600.0 / 270.0, epsilon = 1e-6);
    }

    #[test]
    fn test_fade_resets_peak() {
        let d = dynamics(true);
        let mut tracker = PeakEnergyTracker::new(1, 1);
        tracker.update(&d, |_, _| 0.5);

        for _ in 0..31 {
            tracker.update(&d, |_, _| 0.0);
        }
        let state = tracker.channel(0, 0).unwrap();
        assert_eq!(state.peak, 0.5);
        assert_abs_diff_eq!(state.alpha, 1.0 - 1.0 / 45.0, epsilon = 1e-6);

        for _ in 0..44 {
            tracker.update(&d, |_, _| 0.0);
        }
        let state = tracker.channel(0, 0).unwrap();
        assert_eq!(state.peak, 0.0);
    }

    #[test]
    fn test_alpha_bars_start_at_value() {
        let config = AnalyzerConfig {
            alpha_bars: true,
            ..AnalyzerConfig::default()
        };
        let d = FrameDynamics::new(&config, 60.0);
        let mut tracker = PeakEnergyTracker::new(1, 1);
        tracker.update(&d, |_, _| 0.6);
        assert_eq!(tracker.channel(0, 0).unwrap().alpha, 0.6);
    }

    #[test]
    fn test_energy_is_mean_of_all_slots() {
        let d = dynamics(false);
        let mut tracker = PeakEnergyTracker::new(2, 2);
        tracker.update(&d, |bar, channel| (bar * 2 + channel) as f32 * 0.1);
        // (0.0 + 0.1 + 0.2 + 0.3) / 4
        assert_abs_diff_eq!(tracker.energy().val, 0.15, epsilon = 1e-6);
        assert_abs_diff_eq!(tracker.energy().peak, 0.15, epsilon = 1e-6);
        assert_eq!(tracker.energy().hold, 30.0);
    }

    #[test]
    fn test_reset() {
        let d = dynamics(false);
        let mut tracker = PeakEnergyTracker::new(3, 1);
        tracker.update(&d, |_, _| 1.0);
        tracker.reset();
        assert!(tracker.states().iter().all(|s| *s == BarState::default()));
        assert_eq!(tracker.energy().peak, 0.0);
    }
}
