use core::str::FromStr;

use crate::error::RtaError;

/// Frequency scale used to place bars along the layout axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum FrequencyScale {
    #[default]
    Log,
    Bark,
    Mel,
    Linear,
}

impl FrequencyScale {
    pub const ALL: [FrequencyScale; 4] = [
        FrequencyScale::Log,
        FrequencyScale::Bark,
        FrequencyScale::Mel,
        FrequencyScale::Linear,
    ];

    /// Maps a frequency in Hz to its position on this scale.
    ///
    /// Unchecked: `freq` must be >= 1 Hz. Use [`FrequencyScale::try_to_scale`]
    /// for values that have not been validated.
    pub fn to_scale(self, freq: f64) -> f64 {
        match self {
            FrequencyScale::Log => libm::log2(freq),
            FrequencyScale::Bark => 26.81 * freq / (1960.0 + freq) - 0.53,
            FrequencyScale::Mel => libm::log2(1.0 + freq / 700.0),
            FrequencyScale::Linear => freq,
        }
    }

    /// Inverse of [`FrequencyScale::to_scale`].
    pub fn from_scale(self, x: f64) -> f64 {
        match self {
            FrequencyScale::Log => libm::exp2(x),
            FrequencyScale::Bark => 1960.0 / (26.81 / (x + 0.53) - 1.0),
            FrequencyScale::Mel => 700.0 * (libm::exp2(x) - 1.0),
            FrequencyScale::Linear => x,
        }
    }

    pub fn try_to_scale(self, freq: f64) -> Result<f64, RtaError> {
        if freq.is_nan() || freq < 1.0 {
            return Err(RtaError::InvalidFrequency(freq));
        }
        Ok(self.to_scale(freq))
    }

    pub const fn name(self) -> &'static str {
        match self {
            FrequencyScale::Log => "log",
            FrequencyScale::Bark => "bark",
            FrequencyScale::Mel => "mel",
            FrequencyScale::Linear => "linear",
        }
    }
}

impl FromStr for FrequencyScale {
    type Err = RtaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FrequencyScale::ALL
            .into_iter()
            .find(|scale| scale.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(RtaError::UnknownFrequencyScale)
    }
}
