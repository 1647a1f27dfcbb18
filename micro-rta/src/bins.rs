/// Rounding applied when a frequency is converted to a bin index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Nearest bin, halves rounded up.
    Round,
    Floor,
}

/// Converts between frequencies and FFT bin indices for one transform setup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinMapper {
    fft_size: usize,
    sample_rate: u32,
}

impl BinMapper {
    pub const fn new(fft_size: usize, sample_rate: u32) -> Self {
        Self { fft_size, sample_rate }
    }

    pub const fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of magnitude bins delivered per frame.
    pub const fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    fn max_bin(&self) -> usize {
        self.bin_count().saturating_sub(1)
    }

    pub fn freq_to_bin(&self, freq: f64, rounding: Rounding) -> usize {
        let exact = freq * self.fft_size as f64 / self.sample_rate as f64;
        let bin = match rounding {
            Rounding::Round => libm::floor(exact + 0.5),
            Rounding::Floor => libm::floor(exact),
        };
        // NaN and negatives land on bin 0
        if bin.is_nan() || bin <= 0.0 {
            return 0;
        }
        (bin as usize).min(self.max_bin())
    }

    /// Center frequency of `bin`; bin 0 reports 1 Hz so it stays on every scale.
    pub fn bin_to_freq(&self, bin: usize) -> f64 {
        let freq = bin as f64 * self.sample_rate as f64 / self.fft_size as f64;
        if freq > 0.0 {
            freq
        } else {
            1.0
        }
    }

    /// Bin below `freq` and the logarithmic position of `freq` between that bin
    /// and the next, in `[0, 1]`.
    pub fn interpolation_ratio(&self, freq: f64) -> (usize, f64) {
        let bin = self.freq_to_bin(freq, Rounding::Floor);
        let lower = self.bin_to_freq(bin);
        let upper = self.bin_to_freq(bin + 1);

        let span = libm::log2(upper / lower);
        let ratio = libm::log2(freq / lower) / span;

        if !ratio.is_finite() || span.is_nan() || span <= 0.0 {
            return (bin, 0.0);
        }
        (bin, ratio.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_bin_round_trip() {
        let mapper = BinMapper::new(8192, 48_000);
        for bin in 0..mapper.bin_count() {
            let freq = mapper.bin_to_freq(bin);
            assert_eq!(mapper.freq_to_bin(freq, Rounding::Round), bin, "bin {}", bin);
        }
    }

    #[test]
    fn test_rounding_modes() {
        let mapper = BinMapper::new(8192, 48_000);
        // 20 Hz is bin 3.41
        assert_eq!(mapper.freq_to_bin(20.0, Rounding::Floor), 3);
        assert_eq!(mapper.freq_to_bin(20.0, Rounding::Round), 3);
        // 20 kHz is bin 3413.33
        assert_eq!(mapper.freq_to_bin(20_000.0, Rounding::Round), 3413);

        let mapper = BinMapper::new(32, 32);
        assert_eq!(mapper.freq_to_bin(2.5, Rounding::Round), 3);
        assert_eq!(mapper.freq_to_bin(2.5, Rounding::Floor), 2);
    }

    #[test]
    fn test_bins_are_clamped() {
        let mapper = BinMapper::new(1024, 44_100);
        assert_eq!(mapper.freq_to_bin(30_000.0, Rounding::Round), 511);
        assert_eq!(mapper.freq_to_bin(-5.0, Rounding::Floor), 0);
        assert_eq!(mapper.freq_to_bin(f64::NAN, Rounding::Round), 0);
    }

    #[test]
    fn test_bin_zero_maps_to_one_hertz() {
        let mapper = BinMapper::new(2048, 48_000);
        assert_eq!(mapper.bin_to_freq(0), 1.0);
        assert_abs_diff_eq!(mapper.bin_to_freq(1), 23.4375);
    }

    #[test]
    fn test_interpolation_ratio() {
        let mapper = BinMapper::new(8192, 48_000);
        let bin_width = 48_000.0 / 8192.0;

        let (bin, ratio) = mapper.interpolation_ratio(bin_width * 10.0);
        assert_eq!(bin, 10);
        assert_abs_diff_eq!(ratio, 0.0, epsilon = 1e-9);

        // geometric midpoint between bins 10 and 11
        let mid = bin_width * libm::sqrt(110.0);
        let (bin, ratio) = mapper.interpolation_ratio(mid);
        assert_eq!(bin, 10);
        assert_abs_diff_eq!(ratio, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_interpolation_ratio_is_bounded() {
        let mapper = BinMapper::new(64, 48_000);
        for freq in [1.0, 100.0, 750.0, 23_999.0, 30_000.0] {
            let (bin, ratio) = mapper.interpolation_ratio(freq);
            assert!(bin < mapper.bin_count());
            assert!((0.0..=1.0).contains(&ratio), "ratio {} at {} Hz", ratio, freq);
        }
    }
}
