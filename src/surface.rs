// The overlay the simulator draws on. A provider hands out a surface on
// demand, dropping the surface releases it.

use crate::effects::EffectFrame;
use crate::particle::Particle;
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Viewport { width, height }
    }
}

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("no global window")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("document has no body")]
    NoBody,
    #[error("2d canvas context unavailable")]
    ContextUnavailable,
    #[error("javascript error: {0}")]
    Js(String),
}

impl From<JsValue> for SurfaceError {
    fn from(value: JsValue) -> Self {
        SurfaceError::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

impl From<SurfaceError> for JsValue {
    fn from(err: SurfaceError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub trait Surface {
    fn viewport(&self) -> Viewport;

    /// Clears the previous frame.
    fn begin_frame(&mut self);

    fn draw_particle(&mut self, particle: &Particle);

    fn draw_effect(&mut self, effect: &EffectFrame);
}

pub trait SurfaceProvider {
    type Surface: Surface;

    fn acquire(&mut self) -> Result<Self::Surface, SurfaceError>;
}
