use crate::config::OctaveFraction;

const LED_REFERENCE_HEIGHT: f32 = 540.0; // Height at which the vertical spacing ratio applies 1:1
const MIN_LED_SPACE_V: f32 = 2.0;

/// Segmented (LED) bar geometry for one layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedLayout {
    led_count: u32,
    space_h: f64,
    space_v: f32,
    led_height: f32,
}

impl LedLayout {
    /// Derives the LED geometry for a band mode.
    ///
    /// # Arguments
    /// * `fraction`: octave fraction of the band mode, selects the LED parameters.
    /// * `height`: height available to one channel.
    /// * `pixel_ratio`: display units per nominal unit.
    /// * `bar_width`: bar width before spacing, in layout units.
    /// * `reclaim_gap`: absorb the gap below the last LED into the height.
    pub fn new(
        fraction: OctaveFraction,
        height: f32,
        pixel_ratio: f32,
        bar_width: f64,
        reclaim_gap: bool,
    ) -> Self {
        let (max_leds, space_v_ratio, space_h_ratio) = fraction.led_params();

        let reference = LED_REFERENCE_HEIGHT / space_v_ratio;
        let space_v = (space_v_ratio * pixel_ratio)
            .min(MIN_LED_SPACE_V.max(libm::truncf(height / reference + 0.1)));

        let max_height = if reclaim_gap { height + space_v } else { height };

        let fitting = libm::truncf(max_height / (space_v * 2.0));
        let led_count = if fitting >= 1.0 {
            (fitting as u32).min(max_leds)
        } else {
            1
        };

        let space_h = if space_h_ratio >= 1.0 {
            space_h_ratio as f64
        } else {
            bar_width * space_h_ratio as f64
        };

        Self {
            led_count,
            space_h,
            space_v,
            led_height: max_height / led_count as f32 - space_v,
        }
    }

    pub fn led_count(&self) -> u32 {
        self.led_count
    }

    pub fn space_h(&self) -> f64 {
        self.space_h
    }

    pub fn space_v(&self) -> f32 {
        self.space_v
    }

    pub fn led_height(&self) -> f32 {
        self.led_height
    }

    /// Number of lit LEDs for a normalized value.
    pub fn lit_count(&self, value: f32) -> u32 {
        let lit = libm::floorf(value.clamp(0.0, 1.0) * self.led_count as f32);
        lit as u32
    }

    /// Height of the lit segment stack for a normalized value.
    pub fn position(&self, value: f32) -> f32 {
        let lit = self.lit_count(value) as f32;
        (lit * (self.led_height + self.space_v) - self.space_v).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_third_octave_geometry() {
        let leds = LedLayout::new(OctaveFraction::Third, 270.0, 1.0, 20.0, true);
        assert_eq!(leds.space_v(), 3.0);
        assert_eq!(leds.led_count(), 45);
        assert_abs_diff_eq!(leds.led_height(), 273.0 / 45.0 - 3.0, epsilon = 1e-5);
        assert_abs_diff_eq!(leds.space_h(), 2.5);
    }

    #[test]
    fn test_full_value_fills_the_height() {
        let leds = LedLayout::new(OctaveFraction::Third, 270.0, 1.0, 20.0, true);
        assert_abs_diff_eq!(leds.position(1.0), 270.0, epsilon = 1e-3);
        assert_eq!(leds.position(0.0), 0.0);
        assert_eq!(leds.lit_count(0.5), 22);
    }

    #[test]
    fn test_led_count_is_capped_and_positive() {
        let leds = LedLayout::new(OctaveFraction::Full, 4000.0, 2.0, 50.0, true);
        assert_eq!(leds.led_count(), 24);

        let leds = LedLayout::new(OctaveFraction::TwentyFourth, 1.0, 1.0, 1.0, false);
        assert_eq!(leds.led_count(), 1);
    }

    #[test]
    fn test_position_is_monotonic() {
        let leds = LedLayout::new(OctaveFraction::Sixth, 300.0, 1.0, 10.0, false);
        let mut prev = 0.0;
        for step in 0..=100 {
            let pos = leds.position(step as f32 / 100.0);
            assert!(pos >= prev);
            prev = pos;
        }
    }
}
