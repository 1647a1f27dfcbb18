use alloc::vec::Vec;

use crate::bins::BinMapper;
use crate::config::AnalyzerConfig;
use crate::types::Bar;

/// Turns per-bin dB magnitudes into bar values in `[0, 1]`.
///
/// Weighting gains are computed once per layout, one per FFT bin, and added
/// to the magnitudes as they are read.
#[derive(Debug, Clone, PartialEq)]
pub struct AmplitudeNormalizer {
    min_db: f32,
    max_db: f32,
    linear: bool,
    boost: f32,
    lin_min: f32,
    lin_range: f32, // (lin(max) - lin(min)) ^ boost
    weights: Vec<f32>,
}

impl AmplitudeNormalizer {
    pub fn new(config: &AnalyzerConfig) -> Self {
        let bins = BinMapper::new(config.fft_size, config.sample_rate);
        let filter = config.weighting_filter;
        let weights = if filter.is_flat() {
            Vec::new()
        } else {
            (0..bins.bin_count())
                .map(|bin| filter.gain_db(bins.bin_to_freq(bin)) as f32)
                .collect()
        };

        let boost = if config.linear_boost > 0.0 {
            1.0 / config.linear_boost
        } else {
            1.0
        };
        let lin_min = db_to_linear(config.min_decibels);
        let lin_range = pow_boost(db_to_linear(config.max_decibels) - lin_min, boost);

        Self {
            min_db: config.min_decibels,
            max_db: config.max_decibels,
            linear: config.linear_amplitude,
            boost,
            lin_min,
            lin_range,
            weights,
        }
    }

    /// Maps a dB level to `[0, 1]`. NaN maps to 0.
    pub fn normalize(&self, raw_db: f32) -> f32 {
        let value = if self.linear {
            (pow_boost(db_to_linear(raw_db), self.boost) - self.lin_min) / self.lin_range
        } else {
            (raw_db - self.min_db) / (self.max_db - self.min_db)
        };
        if value.is_nan() {
            return 0.0;
        }
        value.clamp(0.0, 1.0)
    }

    /// Magnitude of `bin` with the weighting gain applied.
    pub fn weighted(&self, data: &[f32], bin: usize) -> f32 {
        let gain = self.weights.get(bin).copied().unwrap_or(0.0);
        data.get(bin).map_or(f32::NEG_INFINITY, |v| v + gain)
    }

    /// Value between `bin` and the next bin at `ratio`; silence when undefined.
    pub fn interpolate(&self, data: &[f32], bin: usize, ratio: f64) -> f32 {
        if bin >= data.len() {
            return f32::NEG_INFINITY;
        }
        let here = self.weighted(data, bin);
        let value = if bin + 1 < data.len() {
            here + (self.weighted(data, bin + 1) - here) * ratio as f32
        } else {
            here
        };
        if value.is_nan() {
            f32::NEG_INFINITY
        } else {
            value
        }
    }

    /// Loudest level a bar covers, in dB: both interpolated edges and every
    /// bin strictly between them.
    pub fn bar_level(&self, data: &[f32], bar: &Bar) -> f32 {
        let mut level = self
            .interpolate(data, bar.bin_lo, bar.ratio_lo)
            .max(self.interpolate(data, bar.bin_hi, bar.ratio_hi));

        for bin in bar.bin_lo + 1..bar.bin_hi {
            let v = self.weighted(data, bin);
            if v > level {
                level = v;
            }
        }
        level
    }

    pub fn bar_value(&self, data: &[f32], bar: &Bar) -> f32 {
        self.normalize(self.bar_level(data, bar))
    }
}

#[inline]
fn db_to_linear(db: f32) -> f32 {
    libm::powf(10.0, db / 20.0)
}

#[inline]
fn pow_boost(value: f32, boost: f32) -> f32 {
    if boost == 1.0 {
        value
    } else {
        libm::powf(value, boost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weighting::WeightingFilter;
    use alloc::vec;
    use approx::assert_abs_diff_eq;

    fn normalizer(linear: bool) -> AmplitudeNormalizer {
        AmplitudeNormalizer::new(&AnalyzerConfig {
            linear_amplitude: linear,
            ..AnalyzerConfig::default()
        })
    }

    #[test]
    fn test_normalize_bounds() {
        for linear in [false, true] {
            let n = normalizer(linear);
            assert_abs_diff_eq!(n.normalize(-85.0), 0.0, epsilon = 1e-6);
            assert_abs_diff_eq!(n.normalize(-25.0), 1.0, epsilon = 1e-6);
            assert_eq!(n.normalize(-120.0), 0.0);
            assert_eq!(n.normalize(0.0), 1.0);
            assert_eq!(n.normalize(f32::NEG_INFINITY), 0.0);
            assert_eq!(n.normalize(f32::NAN), 0.0);
        }
    }

    #[test]
    fn test_decibel_mode_is_linear_in_db() {
        let n = normalizer(false);
        assert_abs_diff_eq!(n.normalize(-55.0), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_linear_boost_lifts_quiet_levels() {
        let plain = normalizer(true);
        let boosted = AmplitudeNormalizer::new(&AnalyzerConfig {
            linear_amplitude: true,
            linear_boost: 2.0,
            ..AnalyzerConfig::default()
        });
        let quiet = -45.0;
        assert!(boosted.normalize(quiet) > plain.normalize(quiet));
        assert_abs_diff_eq!(plain.normalize(quiet), 0.099, epsilon = 1e-3);
    }

    #[test]
    fn test_weighting_is_added_per_bin() {
        let n = AmplitudeNormalizer::new(&AnalyzerConfig {
            weighting_filter: WeightingFilter::A,
            ..AnalyzerConfig::default()
        });
        let data = vec![-50.0; 4096];
        // bin 171 is ~1002 Hz, bin 17 is ~99.6 Hz
        assert_abs_diff_eq!(n.weighted(&data, 171), -50.0, epsilon = 0.05);
        assert!(n.weighted(&data, 17) < -65.0);
    }

    #[test]
    fn test_interpolate() {
        let n = normalizer(false);
        let data = [-60.0, -40.0, -20.0];
        assert_abs_diff_eq!(n.interpolate(&data, 0, 0.5), -50.0);
        assert_abs_diff_eq!(n.interpolate(&data, 1, 0.25), -35.0);
        // no neighbour on the last bin
        assert_eq!(n.interpolate(&data, 2, 0.9), -20.0);
        assert_eq!(n.interpolate(&data, 3, 0.0), f32::NEG_INFINITY);
    }

    #[test]
    fn test_nan_is_silence() {
        let n = normalizer(false);
        let data = [f32::NAN, -40.0];
        assert_eq!(n.interpolate(&data, 0, 0.5), f32::NEG_INFINITY);

        let data = [f32::NEG_INFINITY, f32::NEG_INFINITY];
        assert_eq!(n.interpolate(&data, 0, 0.5), f32::NEG_INFINITY);
    }

    #[test]
    fn test_bar_level_takes_interior_maximum() {
        let n = normalizer(false);
        let data = [-80.0, -70.0, -30.0, -60.0, -80.0, -80.0];
        let bar = Bar {
            bin_lo: 0,
            bin_hi: 4,
            ratio_lo: 0.0,
            ratio_hi: 0.0,
            ..Bar::default()
        };
        assert_eq!(n.bar_level(&data, &bar), -30.0);
        assert_abs_diff_eq!(n.bar_value(&data, &bar), 55.0 / 60.0, epsilon = 1e-6);

        let single = Bar {
            bin_lo: 1,
            bin_hi: 1,
            ratio_lo: 0.5,
            ratio_hi: 0.5,
            ..Bar::default()
        };
        assert_eq!(n.bar_level(&data, &single), -50.0);
    }
}
