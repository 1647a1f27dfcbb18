#![allow(dead_code)]

use micro_rta::{AnalyzerConfig, Mode};
use rand::{rngs::StdRng, Rng, SeedableRng};

pub const SEED: u64 = 0x5eed_0f_a11;

/// 1/3 octave ANSI bands over the audible range, the usual RTA setup.
pub fn third_octave_config() -> AnalyzerConfig {
    AnalyzerConfig {
        mode: Mode::try_from(6).unwrap(),
        ansi_bands: true,
        min_freq: 20.0,
        max_freq: 20_000.0,
        ..AnalyzerConfig::default()
    }
}

pub fn flat_spectrum(bins: usize, level_db: f32) -> Vec<f32> {
    vec![level_db; bins]
}

pub fn silence(bins: usize) -> Vec<f32> {
    vec![f32::NEG_INFINITY; bins]
}

/// A single tone on `bin` over a noise floor.
pub fn tone(bins: usize, bin: usize, level_db: f32, floor_db: f32) -> Vec<f32> {
    let mut data = flat_spectrum(bins, floor_db);
    data[bin] = level_db;
    data
}

/// Uniform noise between `min_db` and `max_db`, with a sprinkling of NaN bins.
pub fn random_spectrum(rng: &mut StdRng, bins: usize, min_db: f32, max_db: f32) -> Vec<f32> {
    (0..bins)
        .map(|_| {
            if rng.random_range(0..200) == 0 {
                f32::NAN
            } else {
                rng.random_range(min_db..max_db)
            }
        })
        .collect()
}

pub fn rng() -> StdRng {
    StdRng::seed_from_u64(SEED)
}

/// dB level that normalizes to `value` under the default decibel range.
pub fn level_for(config: &AnalyzerConfig, value: f32) -> f32 {
    config.min_decibels + value * (config.max_decibels - config.min_decibels)
}
