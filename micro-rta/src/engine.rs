use alloc::vec::Vec;
use core::f32::consts::{FRAC_PI_2, TAU};

#[cfg(feature = "logging")]
use defmt::{debug, info, warn};
#[cfg(feature = "logging")]
use defmt_rtt as _;

use crate::amplitude::AmplitudeNormalizer;
use crate::axis::{frequency_labels, AxisLabel};
use crate::band_layout::{BandLayout, BandLayoutBuilder};
use crate::config::AnalyzerConfig;
use crate::error::RtaError;
use crate::frame_clock::FrameClock;
use crate::peak_tracker::{FrameDynamics, PeakEnergyTracker};
use crate::types::{Bar, BarFrame, BarState, ChannelState, EnergyState};

const LOG_INTERVAL_FRAMES: u8 = 200;

/// Everything derived from one configuration, swapped in as a unit.
struct Prepared {
    layout: BandLayout,
    labels: Vec<AxisLabel>,
    normalizer: AmplitudeNormalizer,
    tracker: PeakEnergyTracker,
}

impl Prepared {
    fn build(config: &AnalyzerConfig) -> Result<Self, RtaError> {
        let layout = BandLayoutBuilder::new(config).build()?;
        let labels = frequency_labels(config, &layout);
        let normalizer = AmplitudeNormalizer::new(config);
        let tracker = PeakEnergyTracker::new(layout.len(), config.channel_count());
        Ok(Self {
            layout,
            labels,
            normalizer,
            tracker,
        })
    }
}

/// Owns the configuration, the bar layout and all per-frame state of one
/// analyzer instance.
///
/// Feed it one dB magnitude slice per channel every frame; read bar values,
/// peaks and energy back for rendering.
pub struct AnalyzerEngine {
    config: AnalyzerConfig,
    layout: BandLayout,
    labels: Vec<AxisLabel>,
    normalizer: AmplitudeNormalizer,
    tracker: PeakEnergyTracker,
    clock: FrameClock,
    spin_angle: f32,
    frame_counter: u32,
    log_counter: u8,
}

impl AnalyzerEngine {
    pub fn new(config: AnalyzerConfig) -> Result<Self, RtaError> {
        let Prepared {
            layout,
            labels,
            normalizer,
            tracker,
        } = Prepared::build(&config)?;

        #[cfg(feature = "logging")]
        info!(
            "AnalyzerEngine::new: {} bars, mode {}, {} channel(s)",
            layout.len(),
            config.mode,
            config.channel_count()
        );

        Ok(Self {
            clock: FrameClock::new(config.max_fps),
            config,
            layout,
            labels,
            normalizer,
            tracker,
            spin_angle: -FRAC_PI_2,
            frame_counter: 0,
            log_counter: 0,
        })
    }

    /// Rebuilds the layout and resets all peaks for `config`. On error the
    /// engine keeps running with its previous configuration.
    pub fn reconfigure(&mut self, config: AnalyzerConfig) -> Result<(), RtaError> {
        let prepared = match Prepared::build(&config) {
            Ok(prepared) => prepared,
            Err(err) => {
                #[cfg(feature = "logging")]
                warn!("reconfigure rejected: {}", err);
                return Err(err);
            }
        };

        self.layout = prepared.layout;
        self.labels = prepared.labels;
        self.normalizer = prepared.normalizer;
        self.tracker = prepared.tracker;
        self.clock.set_max_fps(config.max_fps);
        self.config = config;

        #[cfg(feature = "logging")]
        info!(
            "layout rebuilt: {} bars, mode {}, {}..{} Hz",
            self.layout.len(),
            self.config.mode,
            self.config.min_freq,
            self.config.max_freq
        );
        Ok(())
    }

    /// Offers a frame at `timestamp_ms`. Returns `Ok(false)` when the frame
    /// cap skipped it.
    pub fn frame(&mut self, timestamp_ms: f64, spectra: &[&[f32]]) -> Result<bool, RtaError> {
        self.check_spectra(spectra)?;
        if !self.clock.tick(timestamp_ms) {
            return Ok(false);
        }
        let fps = self.clock.fps();
        self.step(spectra, fps);
        Ok(true)
    }

    /// Runs one frame at an explicit frame rate.
    ///
    /// `spectra` holds one slice of `fft_size / 2` dB magnitudes per channel;
    /// a single slice feeds every channel.
    pub fn update(&mut self, spectra: &[&[f32]], fps: f32) -> Result<(), RtaError> {
        self.check_spectra(spectra)?;
        self.step(spectra, fps);
        Ok(())
    }

    /// Advances every bar by one frame. `spectra` must already be checked.
    fn step(&mut self, spectra: &[&[f32]], fps: f32) {
        if self.tracker.energy().val > 0.0 && fps > 0.0 {
            self.spin_angle += self.config.spin_speed * TAU / 60.0 / fps;
        }

        let dynamics = FrameDynamics::new(&self.config, fps);
        let normalizer = &self.normalizer;
        let bars = self.layout.bars();
        let last_spectrum = spectra.len() - 1;

        self.tracker.update(&dynamics, |bar, channel| {
            normalizer.bar_value(spectra[channel.min(last_spectrum)], &bars[bar])
        });

        self.frame_counter = self.frame_counter.wrapping_add(1);
        self.log_counter = self.log_counter.wrapping_add(1);
        if self.log_counter >= LOG_INTERVAL_FRAMES {
            #[cfg(feature = "logging")]
            debug!(
                "frame {}: fps {}, energy {} (peak {})",
                self.frame_counter,
                fps,
                self.tracker.energy().val,
                self.tracker.energy().peak
            );
            self.log_counter = 0;
        }
    }

    fn check_spectra(&self, spectra: &[&[f32]]) -> Result<(), RtaError> {
        let expected = self.config.bin_count();
        let result = if spectra.is_empty() {
            Err(RtaError::NoSpectrum)
        } else if let Some(bad) = spectra.iter().find(|s| s.len() != expected) {
            Err(RtaError::FrameLengthMismatch {
                expected,
                actual: bad.len(),
            })
        } else {
            Ok(())
        };

        #[cfg(feature = "logging")]
        if let Err(err) = result {
            warn!("frame rejected: {}", err);
        }
        result
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn layout(&self) -> &BandLayout {
        &self.layout
    }

    pub fn bars(&self) -> &[Bar] {
        self.layout.bars()
    }

    pub fn labels(&self) -> &[AxisLabel] {
        &self.labels
    }

    pub fn states(&self) -> &[BarState] {
        self.tracker.states()
    }

    pub fn channel_state(&self, bar: usize, channel: usize) -> Option<&ChannelState> {
        self.tracker.channel(bar, channel)
    }

    /// Bars paired with their current state, in layout order.
    pub fn bar_frames(&self) -> impl Iterator<Item = BarFrame<'_>> {
        self.layout
            .bars()
            .iter()
            .zip(self.tracker.states())
            .map(|(bar, state)| BarFrame { bar, state })
    }

    pub fn energy(&self) -> &EnergyState {
        self.tracker.energy()
    }

    /// Rotation in radians, advanced by the spin speed while there is energy.
    pub fn spin_angle(&self) -> f32 {
        self.spin_angle
    }

    pub fn fps(&self) -> f32 {
        self.clock.fps()
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_counter
    }

    /// Height of the lit LED stack for `value`, when LED bars are active.
    pub fn led_position(&self, value: f32) -> Option<f32> {
        self.layout.leds().map(|leds| leds.position(value))
    }
}
