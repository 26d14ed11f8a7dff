// Tuning knobs for bursts and their companion effects. Units are CSS pixels
// and display frames unless the field name says otherwise.

use crate::color::{Color, DEFAULT_PALETTE};
use crate::particle::Shape;
use std::ops::RangeInclusive;

#[derive(Clone, Debug)]
pub struct BurstConfig {
    pub count: u32,
    pub palette: Vec<Color>,
    pub shapes: Vec<Shape>,
    pub gravity: f64,
    pub drag: f64,
    pub decay: RangeInclusive<f64>,
    pub size: RangeInclusive<f64>,
    pub speed: RangeInclusive<f64>,
    /// Degrees per frame, sign included.
    pub rotation_speed: RangeInclusive<f64>,
    /// Extra upward kick so the cloud rises before it falls.
    pub lift: f64,
    pub pulses: u32,
    pub pulse_delay_ms: f64,
    pub bounds_margin: f64,
}

impl BurstConfig {
    pub const DEFAULT_COUNT: u32 = 120;
    pub const DEFAULT_GRAVITY: f64 = 0.3;
    pub const DEFAULT_DRAG: f64 = 0.98;
    pub const DEFAULT_PULSES: u32 = 3;
    pub const DEFAULT_PULSE_DELAY_MS: f64 = 100.0;
    pub const DEFAULT_BOUNDS_MARGIN: f64 = 100.0;
    /// Lowest per-frame decay, a particle lives at most 1000 frames.
    pub const MIN_DECAY: f64 = 0.001;

    // Splits `count` over the pulses, earlier pulses take the remainder
    pub fn pulse_sizes(&self, count: u32) -> Vec<u32> {
        let pulses = self.pulses.max(1);
        let base = count / pulses;
        let extra = count % pulses;
        (0..pulses)
            .map(|i| base + if i < extra { 1 } else { 0 })
            .filter(|&n| n > 0)
            .collect()
    }
}

impl Default for BurstConfig {
    fn default() -> Self {
        BurstConfig {
            count: BurstConfig::DEFAULT_COUNT,
            palette: DEFAULT_PALETTE.to_vec(),
            shapes: Shape::ALL.to_vec(),
            gravity: BurstConfig::DEFAULT_GRAVITY,
            drag: BurstConfig::DEFAULT_DRAG,
            decay: 0.008..=0.016,
            size: 6.0..=14.0,
            speed: 4.0..=14.0,
            rotation_speed: -10.0..=10.0,
            lift: 4.0,
            pulses: BurstConfig::DEFAULT_PULSES,
            pulse_delay_ms: BurstConfig::DEFAULT_PULSE_DELAY_MS,
            bounds_margin: BurstConfig::DEFAULT_BOUNDS_MARGIN,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EffectConfig {
    pub flash_duration_ms: f64,
    pub flash_color: Color,
    pub ring_count: u32,
    pub ring_radius: f64,
    pub ring_scale: f64,
    pub ring_duration_ms: f64,
    pub ring_stagger_ms: f64,
    pub ring_width: f64,
    pub ring_color: Color,
    pub ripple_duration_ms: f64,
    pub ripple_scale: f64,
    pub ripple_alpha: f64,
}

impl EffectConfig {
    pub const MAX_RINGS: u32 = 3;
}

impl Default for EffectConfig {
    fn default() -> Self {
        EffectConfig {
            flash_duration_ms: 400.0,
            flash_color: Color::WHITE,
            ring_count: EffectConfig::MAX_RINGS,
            ring_radius: 50.0,
            ring_scale: 4.0,
            ring_duration_ms: 800.0,
            ring_stagger_ms: 100.0,
            ring_width: 3.0,
            ring_color: Color::rgb(0x1e, 0x3d, 0xff),
            ripple_duration_ms: 600.0,
            ripple_scale: 4.0,
            ripple_alpha: 0.3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_sizes_sum_to_count() {
        let config = BurstConfig::default();
        assert_eq!(config.pulse_sizes(120), vec![40, 40, 40]);
        assert_eq!(config.pulse_sizes(11), vec![4, 4, 3]);
        assert_eq!(config.pulse_sizes(2), vec![1, 1]);
        assert!(config.pulse_sizes(0).is_empty());
    }

    #[test]
    fn zero_pulses_means_one() {
        let config = BurstConfig {
            pulses: 0,
            ..BurstConfig::default()
        };
        assert_eq!(config.pulse_sizes(7), vec![7]);
    }
}
