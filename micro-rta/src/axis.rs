use alloc::{format, string::String, vec::Vec};

use crate::band_layout::{BandLayout, C_1};
use crate::config::{AnalyzerConfig, ChannelLayout};
use crate::scale::FrequencyScale;

const NOTE_NAMES: [Option<&str>; 12] = [
    Some("C"),
    None,
    Some("D"),
    None,
    Some("E"),
    Some("F"),
    None,
    Some("G"),
    None,
    Some("A"),
    None,
    Some("B"),
];

const LOW_LABELS_HZ: [f64; 9] = [16.0, 31.5, 63.0, 125.0, 250.0, 500.0, 1e3, 2e3, 4e3];
const LINEAR_HIGH_LABELS_HZ: [f64; 9] = [6e3, 8e3, 10e3, 12e3, 14e3, 16e3, 18e3, 20e3, 22e3];
const HIGH_LABELS_HZ: [f64; 2] = [8e3, 16e3];

const POSITION_TOLERANCE: f64 = 1e-6;

/// One label on the frequency axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisLabel {
    pub freq: f64,
    pub text: String,
    pub position: f64, // In layout space, same units as bar slots
    pub highlight: bool,
}

/// Frequency axis labels for a built layout.
pub fn frequency_labels(config: &AnalyzerConfig, layout: &BandLayout) -> Vec<AxisLabel> {
    let mut labels = Vec::new();
    let (min_freq, max_freq) = (config.min_freq, config.max_freq);

    let mut push = |freq: f64, text: String, highlight: bool| {
        if freq < min_freq || freq > max_freq {
            return;
        }
        let position = layout.position_of(freq);
        let max_position = layout.resolution() + POSITION_TOLERANCE;
        if position < -POSITION_TOLERANCE || position > max_position {
            return;
        }
        labels.push(AxisLabel {
            freq,
            text,
            position,
            highlight,
        });
    };

    let scale = config.frequency_scale;
    if !config.note_labels && (config.ansi_bands || scale != FrequencyScale::Log) {
        let high: &[f64] = if scale == FrequencyScale::Linear {
            &LINEAR_HIGH_LABELS_HZ
        } else {
            &HIGH_LABELS_HZ
        };
        for &freq in LOW_LABELS_HZ.iter().chain(high) {
            push(freq, frequency_text(freq), false);
        }
        return labels;
    }

    let all_notes = config.note_labels && config.channel_layout != ChannelLayout::DualHorizontal;
    let semitone = libm::pow(2.0, 1.0 / 12.0);
    let mut freq = C_1;

    for octave in -1..11 {
        for name in NOTE_NAMES {
            let is_c = name == Some("C");
            match name {
                Some(pitch) if is_c || all_notes => {
                    let text = match (config.note_labels, is_c) {
                        (false, _) => frequency_text(freq),
                        (true, true) => format!("{}{}", pitch, octave),
                        (true, false) => String::from(pitch),
                    };
                    push(freq, text, is_c && all_notes);
                }
                _ => {}
            }
            freq *= semitone;
        }
    }

    labels
}

/// `"500"` below 1 kHz, `"4.1k"` above, truncated to a tenth of a kHz.
pub fn frequency_text(freq: f64) -> String {
    if freq < 1e3 {
        return format!("{}", libm::trunc(freq) as u32);
    }
    let tenths = libm::trunc(freq / 100.0) as u32;
    if tenths % 10 == 0 {
        format!("{}k", tenths / 10)
    } else {
        format!("{}.{}k", tenths / 10, tenths % 10)
    }
}
