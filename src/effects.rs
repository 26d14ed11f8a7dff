// Time-driven companion animations: screen flash, expanding rings and the
// button ripple. Each one is a pure function of the frame clock.

use crate::color::Color;
use crate::config::EffectConfig;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect { x, y, width, height }
    }

    pub fn center(&self) -> glm::DVec2 {
        glm::vec2(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum EffectKind {
    Flash {
        color: Color,
    },
    Ring {
        center: glm::DVec2,
        radius: f64,
        scale: f64,
        width: f64,
        color: Color,
    },
    Ripple {
        center: glm::DVec2,
        radius: f64,
        scale: f64,
        alpha: f64,
        clip: Rect,
    },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Effect {
    pub start_ms: f64,
    pub duration_ms: f64,
    pub kind: EffectKind,
}

/// What to draw for one effect on one frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum EffectFrame {
    Flash {
        color: Color,
        opacity: f64,
    },
    Ring {
        center: glm::DVec2,
        radius: f64,
        width: f64,
        color: Color,
        opacity: f64,
    },
    Ripple {
        center: glm::DVec2,
        radius: f64,
        opacity: f64,
        clip: Rect,
    },
}

impl Effect {
    pub fn flash(now_ms: f64, config: &EffectConfig) -> Effect {
        Effect {
            start_ms: now_ms,
            duration_ms: config.flash_duration_ms,
            kind: EffectKind::Flash {
                color: config.flash_color,
            },
        }
    }

    pub fn rings(center: glm::DVec2, now_ms: f64, config: &EffectConfig) -> Vec<Effect> {
        (0..config.ring_count.max(1).min(EffectConfig::MAX_RINGS))
            .map(|i| Effect {
                start_ms: now_ms + i as f64 * config.ring_stagger_ms,
                duration_ms: config.ring_duration_ms,
                kind: EffectKind::Ring {
                    center,
                    radius: config.ring_radius,
                    scale: config.ring_scale,
                    width: config.ring_width,
                    color: config.ring_color,
                },
            })
            .collect()
    }

    // Diameter is the button's larger side, same as the page's CSS ripple
    pub fn ripple(click: glm::DVec2, button: Rect, now_ms: f64, config: &EffectConfig) -> Effect {
        Effect {
            start_ms: now_ms,
            duration_ms: config.ripple_duration_ms,
            kind: EffectKind::Ripple {
                center: click,
                radius: button.width.max(button.height) / 2.0,
                scale: config.ripple_scale,
                alpha: config.ripple_alpha,
                clip: button,
            },
        }
    }

    pub fn is_finished(&self, now_ms: f64) -> bool {
        now_ms >= self.start_ms + self.duration_ms
    }

    fn progress(&self, now_ms: f64) -> Option<f64> {
        if now_ms < self.start_ms || self.is_finished(now_ms) || self.duration_ms <= 0.0 {
            return None;
        }
        Some((now_ms - self.start_ms) / self.duration_ms)
    }

    /// `None` before the effect starts and after it ends.
    pub fn frame(&self, now_ms: f64) -> Option<EffectFrame> {
        let t = self.progress(now_ms)?;
        let frame = match self.kind {
            EffectKind::Flash { color } => EffectFrame::Flash {
                color,
                opacity: if t <= 0.5 { 2.0 * t } else { 2.0 * (1.0 - t) },
            },
            EffectKind::Ring {
                center,
                radius,
                scale,
                width,
                color,
            } => EffectFrame::Ring {
                center,
                radius: radius * scale * t,
                width,
                color,
                opacity: 1.0 - t,
            },
            EffectKind::Ripple {
                center,
                radius,
                scale,
                alpha,
                clip,
            } => EffectFrame::Ripple {
                center,
                radius: radius * scale * t,
                opacity: alpha * (1.0 - t),
                clip,
            },
        };
        Some(frame)
    }
}
