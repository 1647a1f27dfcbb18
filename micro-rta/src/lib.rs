#![no_std]
//! Bar layout and temporal dynamics for a real-time spectrum analyzer.
//!
//! Turns FFT magnitude frames into display bars: frequency banding on several
//! scales, sub-bin interpolation, dB/linear normalization with weighting
//! filters, and peak hold/gravity/fade physics driven by the measured frame
//! rate. Drawing and the FFT itself live outside this crate.

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod amplitude;
pub mod axis;
pub mod band_layout;
pub mod bins;
pub mod config;
pub mod engine;
pub mod error;
pub mod frame_clock;
pub mod led;
pub mod peak_tracker;
pub mod scale;
pub mod types;
pub mod weighting;

pub use amplitude::AmplitudeNormalizer;
pub use axis::AxisLabel;
pub use band_layout::{BandLayout, BandLayoutBuilder};
pub use bins::{BinMapper, Rounding};
pub use config::{AnalyzerConfig, ChannelLayout, FrequencyPreset, Mode, OctaveFraction};
pub use engine::AnalyzerEngine;
pub use error::RtaError;
pub use frame_clock::FrameClock;
pub use led::LedLayout;
pub use peak_tracker::{FrameDynamics, PeakEnergyTracker};
pub use scale::FrequencyScale;
pub use types::{Bar, BarFrame, BarState, ChannelState, EnergyState};
pub use weighting::WeightingFilter;
