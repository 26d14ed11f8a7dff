// Confetti particle: position, velocity, spin and a fading lifetime.
// Coordinates are CSS pixels with y growing downward, velocities are per frame.

use crate::color::Color;
use crate::config::BurstConfig;
use crate::surface::Viewport;
use rand::seq::SliceRandom;
use rand::Rng;
use std::f64::consts::PI;
use std::ops::RangeInclusive;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    Circle,
    Square,
    Triangle,
    Rectangle,
}

/// Geometry of a shape in particle-local coordinates, centered on the origin.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Outline {
    Disc { radius: f64 },
    Rect { width: f64, height: f64 },
    Polygon([glm::DVec2; 3]),
}

impl Shape {
    pub const ALL: [Shape; 4] = [Shape::Circle, Shape::Square, Shape::Triangle, Shape::Rectangle];

    pub fn from_name(name: &str) -> Option<Shape> {
        match name.trim().to_ascii_lowercase().as_str() {
            "circle" => Some(Shape::Circle),
            "square" => Some(Shape::Square),
            "triangle" => Some(Shape::Triangle),
            "rectangle" => Some(Shape::Rectangle),
            _ => None,
        }
    }

    pub fn outline(self, size: f64) -> Outline {
        let half = size / 2.0;
        match self {
            Shape::Circle => Outline::Disc { radius: half },
            Shape::Square => Outline::Rect {
                width: size,
                height: size,
            },
            // apex up, y grows downward
            Shape::Triangle => Outline::Polygon([
                glm::vec2(0.0, -half),
                glm::vec2(half, half),
                glm::vec2(-half, half),
            ]),
            Shape::Rectangle => Outline::Rect {
                width: size,
                height: half,
            },
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Particle {
    pub pos: glm::DVec2,
    pub vel: glm::DVec2,
    pub rotation_deg: f64,
    pub rotation_speed: f64,
    pub size: f64,
    pub shape: Shape,
    pub color: Color,
    pub life: f64,
    pub decay: f64,
    pub gravity: f64,
    pub drag: f64,
}

impl Particle {
    pub fn spawn<R: Rng + ?Sized>(origin: glm::DVec2, config: &BurstConfig, rng: &mut R) -> Particle {
        let angle = rng.gen::<f64>() * 2.0 * PI;
        let speed = sample(rng, &config.speed);
        Particle {
            pos: origin,
            vel: glm::vec2(angle.cos() * speed, angle.sin() * speed - config.lift),
            rotation_deg: rng.gen::<f64>() * 360.0,
            rotation_speed: sample(rng, &config.rotation_speed),
            size: sample(rng, &config.size),
            shape: config.shapes.choose(rng).copied().unwrap_or(Shape::Square),
            color: config.palette.choose(rng).copied().unwrap_or(Color::WHITE),
            life: 1.0,
            decay: sample(rng, &config.decay).max(BurstConfig::MIN_DECAY),
            gravity: config.gravity,
            drag: config.drag,
        }
    }

    // Semi-implicit Euler: gravity, then drag, then position
    pub fn step(&mut self) {
        self.vel.y += self.gravity;
        self.vel *= self.drag;
        self.pos += self.vel;
        self.rotation_deg += self.rotation_speed;
        self.life -= self.decay;
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    // Nothing above the top edge is culled, gravity pulls it back in
    pub fn is_in_bounds(&self, viewport: Viewport, margin: f64) -> bool {
        self.pos.x >= -margin
            && self.pos.x <= viewport.width + margin
            && self.pos.y <= viewport.height + margin
    }

    pub fn opacity(&self) -> f64 {
        self.life.max(0.0).min(1.0)
    }

    pub fn rotation_rad(&self) -> f64 {
        self.rotation_deg.to_radians()
    }
}

// rand 0.7's gen_range panics on an empty range, a collapsed range is a constant
pub(crate) fn sample<R: Rng + ?Sized>(rng: &mut R, range: &RangeInclusive<f64>) -> f64 {
    let (low, high) = (*range.start(), *range.end());
    if high > low {
        rng.gen_range(low, high)
    } else {
        low
    }
}
