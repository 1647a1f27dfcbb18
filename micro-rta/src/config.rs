use core::str::FromStr;

use crate::error::RtaError;
use crate::scale::FrequencyScale;
use crate::weighting::WeightingFilter;

// --- Frequency Config ---
pub const DEFAULT_MIN_FREQ_HZ: f64 = 20.0;
pub const DEFAULT_MAX_FREQ_HZ: f64 = 22_000.0;
pub const MIN_VALID_FREQ_HZ: f64 = 1.0; // log and mel scales are undefined below this

// --- FFT Config ---
pub const DEFAULT_FFT_SIZE: usize = 8192;
pub const MIN_FFT_SIZE: usize = 32;
pub const MAX_FFT_SIZE: usize = 32768;
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 48_000;

// --- Display Config ---
pub const DEFAULT_RESOLUTION: u32 = 640; // Distinct display slots along the frequency axis
pub const DEFAULT_HEIGHT: f32 = 270.0; // Analyzer height in display units
pub const DEFAULT_BAR_SPACE: f32 = 0.1; // < 1: fraction of bar width, >= 1: display units

// --- Amplitude Config ---
pub const DEFAULT_MIN_DECIBELS: f32 = -85.0;
pub const DEFAULT_MAX_DECIBELS: f32 = -25.0;
pub const DEFAULT_LINEAR_BOOST: f32 = 1.0;

// --- Peak Dynamics Config ---
pub const DEFAULT_PEAK_HOLD_MS: f32 = 500.0;
pub const DEFAULT_PEAK_FADE_MS: f32 = 750.0;
pub const DEFAULT_GRAVITY: f32 = 3.8; // In GRAVITY_UNIT display units per second squared
pub const GRAVITY_UNIT: f32 = 1e3;
pub const NOMINAL_FPS: f32 = 60.0; // Used until the first frame rate measurement

/// Octave fraction of a band mode, from 1/24 down to full octaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum OctaveFraction {
    TwentyFourth,
    Twelfth,
    Eighth,
    Sixth,
    Quarter,
    Third,
    Half,
    Full,
}

impl OctaveFraction {
    pub const ALL: [OctaveFraction; 8] = [
        OctaveFraction::TwentyFourth,
        OctaveFraction::Twelfth,
        OctaveFraction::Eighth,
        OctaveFraction::Sixth,
        OctaveFraction::Quarter,
        OctaveFraction::Third,
        OctaveFraction::Half,
        OctaveFraction::Full,
    ];

    /// N in "1/N octave".
    pub const fn denominator(self) -> u32 {
        match self {
            OctaveFraction::TwentyFourth => 24,
            OctaveFraction::Twelfth => 12,
            OctaveFraction::Eighth => 8,
            OctaveFraction::Sixth => 6,
            OctaveFraction::Quarter => 4,
            OctaveFraction::Third => 3,
            OctaveFraction::Half => 2,
            OctaveFraction::Full => 1,
        }
    }

    /// `(max_leds, vertical_space_ratio, horizontal_space_ratio)` for LED bars.
    pub const fn led_params(self) -> (u32, f32, f32) {
        match self {
            OctaveFraction::TwentyFourth => (128, 3.0, 0.45),
            OctaveFraction::Twelfth => (128, 4.0, 0.225),
            OctaveFraction::Eighth => (96, 6.0, 0.225),
            OctaveFraction::Sixth => (80, 6.0, 0.225),
            OctaveFraction::Quarter => (80, 6.0, 0.125),
            OctaveFraction::Third => (64, 6.0, 0.125),
            OctaveFraction::Half => (48, 8.0, 0.125),
            OctaveFraction::Full => (24, 16.0, 0.125),
        }
    }
}

/// Bar layout mode.
///
/// Numbered like the analyzer presets: 0 is discrete, 1 to 8 select
/// 1/24 to 1/1 octave bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u8", into = "u8")
)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum Mode {
    #[default]
    Discrete,
    Bands(OctaveFraction),
}

impl Mode {
    pub const fn is_bands(self) -> bool {
        matches!(self, Mode::Bands(_))
    }

    pub const fn fraction(self) -> Option<OctaveFraction> {
        match self {
            Mode::Discrete => None,
            Mode::Bands(fraction) => Some(fraction),
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Mode::Discrete => 0,
            Mode::Bands(fraction) => OctaveFraction::ALL
                .iter()
                .position(|f| *f == fraction)
                .map_or(0, |i| i as u8 + 1),
        }
    }
}

impl TryFrom<u8> for Mode {
    type Error = RtaError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Mode::Discrete),
            1..=8 => Ok(Mode::Bands(OctaveFraction::ALL[value as usize - 1])),
            other => Err(RtaError::InvalidMode(other)),
        }
    }
}

impl From<Mode> for u8 {
    fn from(mode: Mode) -> Self {
        mode.index()
    }
}

/// How many channels are analyzed and how the sink arranges them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum ChannelLayout {
    #[default]
    Single,
    DualCombined,
    DualHorizontal,
    DualVertical,
}

impl ChannelLayout {
    pub const fn channel_count(self) -> usize {
        match self {
            ChannelLayout::Single => 1,
            _ => 2,
        }
    }
}

impl FromStr for ChannelLayout {
    type Err = RtaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "single" => Ok(ChannelLayout::Single),
            "dual-combined" => Ok(ChannelLayout::DualCombined),
            "dual-horizontal" => Ok(ChannelLayout::DualHorizontal),
            "dual-vertical" => Ok(ChannelLayout::DualVertical),
            _ => Err(RtaError::UnknownChannelLayout),
        }
    }
}

/// Named frequency ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrequencyPreset {
    Bass,
    LowMid,
    Mid,
    HighMid,
    Treble,
}

impl FrequencyPreset {
    /// `(min_freq, max_freq)` in Hz.
    pub const fn range(self) -> (f64, f64) {
        match self {
            FrequencyPreset::Bass => (20.0, 250.0),
            FrequencyPreset::LowMid => (250.0, 500.0),
            FrequencyPreset::Mid => (500.0, 2e3),
            FrequencyPreset::HighMid => (2e3, 4e3),
            FrequencyPreset::Treble => (4e3, 16e3),
        }
    }
}

/// Everything a layout build and the per-frame dynamics depend on.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct AnalyzerConfig {
    pub mode: Mode,
    pub frequency_scale: FrequencyScale,
    pub min_freq: f64,
    pub max_freq: f64,
    /// Base-10 ANSI S1.11 bands with preferred nominal frequencies instead of
    /// equal-tempered ones.
    pub ansi_bands: bool,
    pub fft_size: usize,
    pub sample_rate: u32,
    pub resolution: u32,
    pub height: f32,
    pub pixel_ratio: f32,
    pub bar_space: f32,
    pub led_bars: bool,
    pub channel_layout: ChannelLayout,
    pub min_decibels: f32,
    pub max_decibels: f32,
    pub linear_amplitude: bool,
    pub linear_boost: f32,
    pub weighting_filter: WeightingFilter,
    /// Frame rate cap; 0 renders every frame offered.
    pub max_fps: u32,
    pub peak_hold_time_ms: f32,
    pub peak_fade_time_ms: f32,
    pub gravity: f32,
    pub fade_peaks: bool,
    /// Peak alpha starts at the bar value instead of fully opaque.
    pub alpha_bars: bool,
    /// Revolutions per minute at any non-zero energy.
    pub spin_speed: f32,
    pub note_labels: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Discrete,
            frequency_scale: FrequencyScale::Log,
            min_freq: DEFAULT_MIN_FREQ_HZ,
            max_freq: DEFAULT_MAX_FREQ_HZ,
            ansi_bands: false,
            fft_size: DEFAULT_FFT_SIZE,
            sample_rate: DEFAULT_SAMPLE_RATE_HZ,
            resolution: DEFAULT_RESOLUTION,
            height: DEFAULT_HEIGHT,
            pixel_ratio: 1.0,
            bar_space: DEFAULT_BAR_SPACE,
            led_bars: false,
            channel_layout: ChannelLayout::Single,
            min_decibels: DEFAULT_MIN_DECIBELS,
            max_decibels: DEFAULT_MAX_DECIBELS,
            linear_amplitude: false,
            linear_boost: DEFAULT_LINEAR_BOOST,
            weighting_filter: WeightingFilter::None,
            max_fps: 0,
            peak_hold_time_ms: DEFAULT_PEAK_HOLD_MS,
            peak_fade_time_ms: DEFAULT_PEAK_FADE_MS,
            gravity: DEFAULT_GRAVITY,
            fade_peaks: false,
            alpha_bars: false,
            spin_speed: 0.0,
            note_labels: false,
        }
    }
}

impl AnalyzerConfig {
    /// Checks every field a layout build depends on.
    pub fn validate(&self) -> Result<(), RtaError> {
        let freqs_ok = self.min_freq.is_finite()
            && self.max_freq.is_finite()
            && self.min_freq >= MIN_VALID_FREQ_HZ
            && self.max_freq >= MIN_VALID_FREQ_HZ
            && self.min_freq < self.max_freq;
        if !freqs_ok {
            return Err(RtaError::InvalidFrequencyRange {
                min: self.min_freq,
                max: self.max_freq,
            });
        }
        if !self.fft_size.is_power_of_two()
            || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&self.fft_size)
        {
            return Err(RtaError::InvalidFftSize(self.fft_size));
        }
        if self.sample_rate == 0 {
            return Err(RtaError::InvalidSampleRate);
        }
        if self.resolution == 0 {
            return Err(RtaError::InvalidResolution);
        }
        let decibels_ok = self.min_decibels < self.max_decibels;
        if !decibels_ok {
            return Err(RtaError::InvalidDecibelRange {
                min: self.min_decibels,
                max: self.max_decibels,
            });
        }
        Ok(())
    }

    pub fn with_preset(mut self, preset: FrequencyPreset) -> Self {
        let (min_freq, max_freq) = preset.range();
        self.min_freq = min_freq;
        self.max_freq = max_freq;
        self
    }

    pub const fn channel_count(&self) -> usize {
        self.channel_layout.channel_count()
    }

    /// Number of magnitude values expected per frame.
    pub const fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Height available to one channel's bars.
    pub fn channel_height(&self) -> f32 {
        match self.channel_layout {
            ChannelLayout::DualVertical => self.height / 2.0,
            _ => self.height,
        }
    }

    /// Bar height in nominal units, so gravity looks the same on any pixel
    /// density.
    pub fn nominal_max_height(&self) -> f32 {
        let ratio = if self.pixel_ratio > 0.0 { self.pixel_ratio } else { 1.0 };
        self.channel_height() / ratio
    }

    pub fn gravity_accel(&self) -> f32 {
        self.gravity * GRAVITY_UNIT
    }
}
