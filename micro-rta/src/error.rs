use thiserror::Error;

/// Everything that can reject a layout build or a frame update.
///
/// Layout errors are reported before any bar is produced; the engine keeps
/// its previous layout and peak state when one is returned.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum RtaError {
    #[error("invalid frequency range {min}..{max} Hz: both bounds must be >= 1 and min < max")]
    InvalidFrequencyRange { min: f64, max: f64 },

    #[error("invalid mode {0}: expected 0 (discrete) or 1..=8 (octave fractions)")]
    InvalidMode(u8),

    #[error("frequency {0} Hz is outside the scale domain (must be >= 1)")]
    InvalidFrequency(f64),

    #[error("unknown frequency scale")]
    UnknownFrequencyScale,

    #[error("unknown weighting filter")]
    UnknownWeightingFilter,

    #[error("unknown channel layout")]
    UnknownChannelLayout,

    #[error("FFT size {0} must be a power of two between 32 and 32768")]
    InvalidFftSize(usize),

    #[error("sample rate must be greater than zero")]
    InvalidSampleRate,

    #[error("resolution must provide at least one display slot")]
    InvalidResolution,

    #[error("invalid decibel range {min}..{max}: min must be below max")]
    InvalidDecibelRange { min: f32, max: f32 },

    #[error("no octave band falls inside {min}..{max} Hz")]
    NoBandsInRange { min: f64, max: f64 },

    #[error("no spectrum supplied for the frame")]
    NoSpectrum,

    #[error("spectrum has {actual} bins, expected {expected}")]
    FrameLengthMismatch { expected: usize, actual: usize },
}
