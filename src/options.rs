// Page-script facing configuration. Wraps the tuning structs behind setters
// since wasm-bindgen can't export their range and vector fields directly.

use crate::color::{Color, DEFAULT_PALETTE};
use crate::config::{BurstConfig, EffectConfig};
use crate::particle::Shape;
use log::warn;
use std::ops::RangeInclusive;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
#[derive(Clone, Debug, Default)]
pub struct BurstOptions {
    burst: BurstConfig,
    effects: EffectConfig,
}

#[wasm_bindgen]
impl BurstOptions {
    #[wasm_bindgen(constructor)]
    pub fn new() -> BurstOptions {
        BurstOptions::default()
    }

    pub fn set_count(&mut self, count: u32) {
        self.burst.count = count;
    }

    pub fn set_gravity(&mut self, gravity: f64) {
        self.burst.gravity = gravity;
    }

    pub fn set_drag(&mut self, drag: f64) {
        self.burst.drag = drag;
    }

    pub fn set_decay(&mut self, min: f64, max: f64) {
        let floor = BurstConfig::MIN_DECAY;
        self.burst.decay = ordered(min.max(floor), max.max(floor));
    }

    pub fn set_size(&mut self, min: f64, max: f64) {
        self.burst.size = ordered(min, max);
    }

    pub fn set_speed(&mut self, min: f64, max: f64) {
        self.burst.speed = ordered(min, max);
    }

    pub fn set_rotation_speed(&mut self, min: f64, max: f64) {
        self.burst.rotation_speed = ordered(min, max);
    }

    pub fn set_lift(&mut self, lift: f64) {
        self.burst.lift = lift;
    }

    pub fn set_pulses(&mut self, pulses: u32, delay_ms: f64) {
        self.burst.pulses = pulses.max(1);
        self.burst.pulse_delay_ms = delay_ms.max(0.0);
    }

    pub fn set_bounds_margin(&mut self, margin: f64) {
        self.burst.bounds_margin = margin;
    }

    /// CSS hex strings, e.g. `["#00008f", "#ff1721"]`.
    pub fn set_palette(&mut self, colors: &js_sys::Array) {
        self.burst.palette = parse_palette(colors.iter().filter_map(|c| c.as_string()));
    }

    /// Any of "circle", "square", "triangle", "rectangle".
    pub fn set_shapes(&mut self, shapes: &js_sys::Array) {
        self.burst.shapes = parse_shapes(shapes.iter().filter_map(|s| s.as_string()));
    }

    pub fn set_flash_duration(&mut self, ms: f64) {
        self.effects.flash_duration_ms = ms;
    }

    pub fn set_rings(&mut self, count: u32, duration_ms: f64, stagger_ms: f64) {
        self.effects.ring_count = count.max(1).min(EffectConfig::MAX_RINGS);
        self.effects.ring_duration_ms = duration_ms;
        self.effects.ring_stagger_ms = stagger_ms;
    }

    pub fn set_ring_color(&mut self, hex: &str) {
        match Color::from_hex(hex) {
            Ok(color) => self.effects.ring_color = color,
            Err(err) => warn!("ring color ignored: {}", err),
        }
    }
}

impl BurstOptions {
    pub fn burst_config(&self) -> &BurstConfig {
        &self.burst
    }

    pub fn effect_config(&self) -> &EffectConfig {
        &self.effects
    }
}

fn ordered(a: f64, b: f64) -> RangeInclusive<f64> {
    if a <= b {
        a..=b
    } else {
        b..=a
    }
}

pub fn parse_palette<I, S>(entries: I) -> Vec<Color>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let palette: Vec<Color> = entries
        .into_iter()
        .filter_map(|hex| match Color::from_hex(hex.as_ref()) {
            Ok(color) => Some(color),
            Err(err) => {
                warn!("palette entry skipped: {}", err);
                None
            }
        })
        .collect();
    if palette.is_empty() {
        DEFAULT_PALETTE.to_vec()
    } else {
        palette
    }
}

pub fn parse_shapes<I, S>(names: I) -> Vec<Shape>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let shapes: Vec<Shape> = names
        .into_iter()
        .filter_map(|name| {
            let shape = Shape::from_name(name.as_ref());
            if shape.is_none() {
                warn!("unknown shape {:?}", name.as_ref());
            }
            shape
        })
        .collect();
    if shapes.is_empty() {
        Shape::ALL.to_vec()
    } else {
        shapes
    }
}
