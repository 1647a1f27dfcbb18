use core::str::FromStr;

use crate::error::RtaError;

// Squared pole frequencies shared by the IEC 61672 curves.
const SQ20_6: f64 = 424.36;
const SQ107_7: f64 = 11_599.29;
const SQ158_5: f64 = 25_122.25;
const SQ737_9: f64 = 544_496.41;
const SQ12194: f64 = 148_693_636.0;

/// Frequency weighting curve added (in dB) to every FFT bin before a bar value
/// is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum WeightingFilter {
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "none", alias = ""))]
    None,
    A,
    B,
    C,
    D,
    /// ITU-R 468 noise weighting.
    #[cfg_attr(feature = "serde", serde(rename = "468"))]
    Itu468,
}

impl WeightingFilter {
    /// Gain of the curve at `freq` Hz, in dB. `None` is flat at 0 dB.
    pub fn gain_db(self, freq: f64) -> f64 {
        let f2 = freq * freq;

        match self {
            WeightingFilter::None => 0.0,
            WeightingFilter::A => {
                let r_a = SQ12194 * f2 * f2
                    / ((f2 + SQ20_6)
                        * libm::sqrt((f2 + SQ107_7) * (f2 + SQ737_9))
                        * (f2 + SQ12194));
                2.0 + linear_to_db(r_a)
            }
            WeightingFilter::B => {
                let r_b = SQ12194 * f2 * freq
                    / ((f2 + SQ20_6) * libm::sqrt(f2 + SQ158_5) * (f2 + SQ12194));
                0.17 + linear_to_db(r_b)
            }
            WeightingFilter::C => {
                let r_c = SQ12194 * f2 / ((f2 + SQ20_6) * (f2 + SQ12194));
                0.06 + linear_to_db(r_c)
            }
            WeightingFilter::D => {
                let h = (libm::pow(1_037_918.48 - f2, 2.0) + 1_080_768.16 * f2)
                    / (libm::pow(9_837_328.0 - f2, 2.0) + 11_723_776.0 * f2);
                let r_d = (freq / 6.896_688_849_647_6e-5)
                    * libm::sqrt(h / ((f2 + 79_919.29) * (f2 + 1_345_600.0)));
                linear_to_db(r_d)
            }
            WeightingFilter::Itu468 => {
                let h1 = -4.737_338_981_378_384e-24 * libm::pow(freq, 6.0)
                    + 2.043_828_333_606_125e-15 * libm::pow(freq, 4.0)
                    - 1.363_894_795_463_638e-7 * f2
                    + 1.0;
                let h2 = 1.306_612_257_412_824e-19 * libm::pow(freq, 5.0)
                    - 2.118_150_887_518_656e-11 * libm::pow(freq, 3.0)
                    + 5.559_488_023_498_642e-4 * freq;
                let r_i = 1.246_332_637_532_143e-4 * freq / libm::hypot(h1, h2);
                18.2 + linear_to_db(r_i)
            }
        }
    }

    pub const fn is_flat(self) -> bool {
        matches!(self, WeightingFilter::None)
    }

    pub const fn name(self) -> &'static str {
        match self {
            WeightingFilter::None => "none",
            WeightingFilter::A => "A",
            WeightingFilter::B => "B",
            WeightingFilter::C => "C",
            WeightingFilter::D => "D",
            WeightingFilter::Itu468 => "468",
        }
    }
}

impl FromStr for WeightingFilter {
    type Err = RtaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "none" => Ok(WeightingFilter::None),
            "A" | "a" => Ok(WeightingFilter::A),
            "B" | "b" => Ok(WeightingFilter::B),
            "C" | "c" => Ok(WeightingFilter::C),
            "D" | "d" => Ok(WeightingFilter::D),
            "468" => Ok(WeightingFilter::Itu468),
            _ => Err(RtaError::UnknownWeightingFilter),
        }
    }
}

#[inline]
fn linear_to_db(value: f64) -> f64 {
    20.0 * libm::log10(value)
}
