use alloc::vec::Vec;

use crate::bins::{BinMapper, Rounding};
use crate::config::{AnalyzerConfig, ChannelLayout, Mode, OctaveFraction};
use crate::error::RtaError;
use crate::led::LedLayout;
use crate::scale::FrequencyScale;
use crate::types::Bar;

/// Frequency of C-1, the seed of the equal-tempered band series.
pub const C_1: f64 = 8.175_798_915_643_707;

// Seed of the ANSI series: 1 kHz divided by 10^(3/10) ten times.
const ANSI_SEED: f64 = 7.943_282_35;

const EDGE_SIGNIFICANT_DIGITS: u32 = 4;

/// R20 preferred numbers, used for the nominal centers of wide ANSI bands.
const PREFERRED_R20: [f64; 21] = [
    1.0, 1.12, 1.25, 1.4, 1.6, 1.8, 2.0, 2.24, 2.5, 2.8, 3.15, 3.55, 4.0, 4.5, 5.0, 5.6, 6.3,
    7.1, 8.0, 9.0, 10.0,
];

/// Ordered bars plus the mapping between frequency and layout space.
#[derive(Debug, Clone, PartialEq)]
pub struct BandLayout {
    bars: Vec<Bar>,
    mode: Mode,
    scale: FrequencyScale,
    scale_min: f64,
    unit_width: f64,
    bar_width: f64,
    resolution: f64,
    min_freq: f64,
    max_freq: f64,
    leds: Option<LedLayout>,
}

impl BandLayout {
    /// Bars in ascending frequency order.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Number of bars.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// True when the layout holds no bars.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Mode the layout was built for.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Scale used for positions and axis labels.
    pub fn scale(&self) -> FrequencyScale {
        self.scale
    }

    /// Scale position of the left edge of the layout.
    pub fn scale_min(&self) -> f64 {
        self.scale_min
    }

    /// Layout units per scale unit.
    pub fn unit_width(&self) -> f64 {
        self.unit_width
    }

    /// Width of one bar slot before spacing is applied.
    pub fn bar_width(&self) -> f64 {
        self.bar_width
    }

    /// Width of the whole layout in layout units.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Configured `(min_freq, max_freq)` in Hz.
    pub fn frequency_range(&self) -> (f64, f64) {
        (self.min_freq, self.max_freq)
    }

    /// LED geometry, present only for band modes with LED bars.
    pub fn leds(&self) -> Option<&LedLayout> {
        self.leds.as_ref()
    }

    /// Layout-space position of `freq`.
    pub fn position_of(&self, freq: f64) -> f64 {
        self.unit_width * (self.scale.to_scale(freq) - self.scale_min)
    }
}

/// Builds the bar layout for one configuration.
///
/// The build is a pure function of the configuration: building twice with the
/// same configuration yields identical bars.
pub struct BandLayoutBuilder<'a> {
    config: &'a AnalyzerConfig,
    bins: BinMapper,
}

impl<'a> BandLayoutBuilder<'a> {
    pub fn new(config: &'a AnalyzerConfig) -> Self {
        Self {
            config,
            bins: BinMapper::new(config.fft_size, config.sample_rate),
        }
    }

    pub fn build(&self) -> Result<BandLayout, RtaError> {
        self.config.validate()?;

        let config = self.config;
        let resolution = config.resolution as f64;
        let scale = config.frequency_scale;

        let (mut bars, scale_min, unit_width) = match config.mode {
            Mode::Discrete => self.calculate_discrete_bars(resolution),
            Mode::Bands(fraction) if scale == FrequencyScale::Log => {
                self.calculate_octave_bands(fraction, resolution)?
            }
            Mode::Bands(fraction) => self.calculate_scaled_bands(fraction, resolution),
        };

        let bar_width = match config.mode {
            Mode::Discrete => 1.0,
            Mode::Bands(_) => resolution / bars.len() as f64,
        };

        let leds = match config.mode {
            Mode::Bands(fraction) if config.led_bars => Some(LedLayout::new(
                fraction,
                config.channel_height(),
                config.pixel_ratio,
                bar_width,
                config.channel_layout != ChannelLayout::DualVertical,
            )),
            _ => None,
        };

        if config.mode.is_bands() {
            self.apply_bar_spacing(&mut bars, bar_width, leds.as_ref());
        } else {
            for bar in bars.iter_mut() {
                bar.slot_width = 1.0;
                bar.slot_center = bar.slot_position;
            }
        }

        Ok(BandLayout {
            bars,
            mode: config.mode,
            scale,
            scale_min,
            unit_width,
            bar_width,
            resolution,
            min_freq: config.min_freq,
            max_freq: config.max_freq,
            leds,
        })
    }

    fn edge(&self, freq: f64) -> (usize, f64) {
        self.bins.interpolation_ratio(freq)
    }

    /// One bar per distinct rounded position; bins landing on an occupied
    /// position widen the previous bar.
    fn calculate_discrete_bars(&self, resolution: f64) -> (Vec<Bar>, f64, f64) {
        let scale = self.config.frequency_scale;
        let scale_min = scale.to_scale(self.config.min_freq);
        let unit_width = resolution / (scale.to_scale(self.config.max_freq) - scale_min);

        let min_index = self.bins.freq_to_bin(self.config.min_freq, Rounding::Floor);
        let max_index = self.bins.freq_to_bin(self.config.max_freq, Rounding::Round);

        let mut bars: Vec<Bar> = Vec::new();
        let mut last_pos = f64::NEG_INFINITY;

        for i in min_index..=max_index {
            let freq = self.bins.bin_to_freq(i);
            let pos = libm::floor(unit_width * (scale.to_scale(freq) - scale_min) + 0.5);

            if pos > last_pos {
                bars.push(Bar {
                    freq,
                    freq_lo: freq,
                    freq_hi: freq,
                    bin_lo: i,
                    bin_hi: i,
                    slot_position: pos,
                    ..Bar::default()
                });
                last_pos = pos;
            } else if let Some(last) = bars.last_mut() {
                last.bin_hi = i;
                last.freq_hi = freq;
                last.freq = libm::sqrt(last.freq_lo * freq);
            }
        }

        (bars, scale_min, unit_width)
    }

    /// Equal slots in scale space, for band modes on non-log scales.
    fn calculate_scaled_bands(
        &self,
        fraction: OctaveFraction,
        resolution: f64,
    ) -> (Vec<Bar>, f64, f64) {
        let scale = self.config.frequency_scale;
        let bands = fraction.denominator() as usize * 10;
        let bar_width = resolution / bands as f64;

        let scale_min = scale.to_scale(self.config.min_freq);
        let unit_width = resolution / (scale.to_scale(self.config.max_freq) - scale_min);
        let at = |pos: f64| scale.from_scale(scale_min + pos / unit_width);

        let bars = (0..bands)
            .map(|i| {
                let pos = i as f64 * bar_width;
                let freq_lo = at(pos);
                let freq_hi = at(pos + bar_width);
                let (bin_lo, ratio_lo) = self.edge(freq_lo);
                let (bin_hi, ratio_hi) = self.edge(freq_hi);
                Bar {
                    freq: at(pos + bar_width / 2.0),
                    freq_lo,
                    freq_hi,
                    bin_lo,
                    bin_hi,
                    ratio_lo,
                    ratio_hi,
                    slot_position: pos,
                    ..Bar::default()
                }
            })
            .collect();

        (bars, scale_min, unit_width)
    }

    /// Octave-fraction bands, equal-tempered (base 2) or ANSI S1.11 (base 10).
    fn calculate_octave_bands(
        &self,
        fraction: OctaveFraction,
        resolution: f64,
    ) -> Result<(Vec<Bar>, f64, f64), RtaError> {
        let config = self.config;
        let n = fraction.denominator();
        let band_width = if config.ansi_bands {
            libm::pow(10.0, 3.0 / (n as f64 * 10.0))
        } else {
            libm::pow(2.0, 1.0 / n as f64)
        };
        let half_band = libm::sqrt(band_width);

        // Even ANSI fractions put 1 kHz on a band edge instead of a center.
        let mut curr_freq = match (config.ansi_bands, n % 2) {
            (false, _) => C_1,
            (true, 1) => ANSI_SEED,
            (true, _) => ANSI_SEED / half_band,
        };

        let mut bars: Vec<Bar> = Vec::new();
        loop {
            let freq_lo = round_significant(curr_freq / half_band, EDGE_SIGNIFICANT_DIGITS, true);
            let freq_hi = round_significant(curr_freq * half_band, EDGE_SIGNIFICANT_DIGITS, true);

            let freq = if !config.ansi_bands {
                round_significant(curr_freq, EDGE_SIGNIFICANT_DIGITS, true)
            } else if n < 4 {
                nearest_preferred(curr_freq)
            } else if leading_digit(curr_freq) < 5 {
                round_significant(curr_freq, 3, false)
            } else {
                round_significant(curr_freq, 2, false)
            };

            if freq >= config.min_freq {
                let (bin_lo, ratio_lo) = self.edge(freq_lo);
                let (bin_hi, ratio_hi) = self.edge(freq_hi);
                bars.push(Bar {
                    freq,
                    freq_lo,
                    freq_hi,
                    bin_lo,
                    bin_hi,
                    ratio_lo,
                    ratio_hi,
                    ..Bar::default()
                });
            }

            curr_freq *= band_width;
            if !curr_freq.is_finite() || curr_freq > config.max_freq {
                break;
            }
        }

        let (first, last) = match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => {
                return Err(RtaError::NoBandsInRange {
                    min: config.min_freq,
                    max: config.max_freq,
                })
            }
        };

        let bar_width = resolution / bars.len() as f64;
        for (index, bar) in bars.iter_mut().enumerate() {
            bar.slot_position = index as f64 * bar_width;
        }

        // Axis mapping uses the unclamped outer edges so labels line up with bars.
        let scale = config.frequency_scale;
        let scale_min = scale.to_scale(first.freq_lo);
        let unit_width = resolution / (scale.to_scale(last.freq_hi) - scale_min);

        if let Some(first) = bars.first_mut() {
            if first.freq_lo < config.min_freq {
                first.freq_lo = config.min_freq;
                (first.bin_lo, first.ratio_lo) = self.edge(config.min_freq);
            }
        }
        if let Some(last) = bars.last_mut() {
            if last.freq_hi > config.max_freq {
                last.freq_hi = config.max_freq;
                (last.bin_hi, last.ratio_hi) = self.edge(config.max_freq);
                last.freq = last.freq.min(last.freq_hi);
            }
        }

        Ok((bars, scale_min, unit_width))
    }

    /// Shrinks band bars by the bar or LED spacing and recenters them.
    fn apply_bar_spacing(&self, bars: &mut [Bar], bar_width: f64, leds: Option<&LedLayout>) {
        let bar_space = self.config.bar_space as f64;
        let led_space = leds.map_or(0.0, LedLayout::space_h);

        let bar_space_px = if bar_space > 0.0 && bar_space < 1.0 {
            bar_space * bar_width
        } else {
            bar_space
        }
        .min(bar_width - 1.0);
        let gap = led_space.max(bar_space_px);
        let width = bar_width - gap;
        let gapless = bar_space == 0.0 && leds.is_none();

        let mut prev_end: Option<f64> = None;
        for bar in bars.iter_mut() {
            let mut pos = bar.slot_position;
            let mut bar_w = width;

            if gapless {
                pos = libm::trunc(pos);
                bar_w = libm::trunc(bar_w);
                if prev_end.is_some_and(|end| pos > end) {
                    pos -= 1.0;
                    bar_w += 1.0;
                }
                prev_end = Some(pos + bar_w);
            } else {
                pos += gap / 2.0;
            }

            bar.slot_position = pos;
            bar.slot_width = bar_w;
            bar.slot_center = if width == 1.0 { pos } else { pos + bar_w / 2.0 };
        }
    }
}

/// Rounds to `digits` significant digits. With `at_least`, never drops integer
/// digits.
pub fn round_significant(value: f64, digits: u32, at_least: bool) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let mut precision = digits as i32;
    if at_least {
        precision = precision.max(libm::trunc(1.0 + libm::log10(value)) as i32);
    }
    let magnitude = libm::floor(libm::log10(libm::fabs(value))) as i32;
    let shift = precision - 1 - magnitude;
    if shift >= 0 {
        let factor = libm::pow(10.0, shift as f64);
        libm::round(value * factor) / factor
    } else {
        let factor = libm::pow(10.0, -shift as f64);
        libm::round(value / factor) * factor
    }
}

/// Nearest R20 preferred number, kept to 5 significant digits.
pub fn nearest_preferred(value: f64) -> f64 {
    let power = libm::trunc(libm::log10(value));
    let normalized = value / libm::pow(10.0, power);

    let mut i = 1;
    while i < PREFERRED_R20.len() - 1 && normalized > PREFERRED_R20[i] {
        i += 1;
    }
    if normalized - PREFERRED_R20[i - 1] < PREFERRED_R20[i] - normalized {
        i -= 1;
    }

    libm::trunc(PREFERRED_R20[i] * libm::pow(10.0, power + 5.0)) / 1e5
}

fn leading_digit(value: f64) -> u32 {
    let magnitude = libm::floor(libm::log10(value));
    libm::floor(value / libm::pow(10.0, magnitude)) as u32
}
