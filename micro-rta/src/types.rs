/// One display slot, aggregating one or more FFT bins over a frequency range.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bar {
    pub freq: f64,    // Center frequency (Hz)
    pub freq_lo: f64, // Lower edge frequency (Hz)
    pub freq_hi: f64, // Upper edge frequency (Hz)
    pub bin_lo: usize,
    pub bin_hi: usize,
    pub ratio_lo: f64, // Interpolation ratio at the lower edge, 0..=1
    pub ratio_hi: f64, // Interpolation ratio at the upper edge, 0..=1
    pub slot_position: f64, // Left edge in layout space, after bar spacing
    pub slot_width: f64,    // Drawn width in layout space
    pub slot_center: f64,
}

/// Dynamics of one bar on one channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelState {
    pub value: f32, // Current normalized amplitude, 0..=1
    pub peak: f32,  // Highest recent value
    pub hold: f32,  // Frames left to hold the peak; negative while falling or fading
    pub alpha: f32, // Peak marker opacity
}

/// Per-bar state for both channels. The second slot is unused in single
/// channel layouts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BarState {
    pub channels: [ChannelState; 2],
}

/// Aggregate activity of the whole analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnergyState {
    pub val: f32, // Mean of every bar value on every channel this frame
    pub peak: f32,
    pub hold: f32,
}

/// What a rendering sink reads for one bar after a frame update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarFrame<'a> {
    pub bar: &'a Bar,
    pub state: &'a BarState,
}

impl BarFrame<'_> {
    pub fn channel(&self, channel: usize) -> &ChannelState {
        &self.state.channels[channel.min(1)]
    }
}
