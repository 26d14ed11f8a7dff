// Canvas 2D overlay that particles and effects are painted on. The canvas is
// created on acquire, tracks the window size every frame and removes itself
// from the DOM when dropped.

use crate::effects::EffectFrame;
use crate::particle::{Outline, Particle};
use crate::surface::{Surface, SurfaceError, SurfaceProvider, Viewport};
use log::{debug, warn};
use std::f64::consts::PI;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

const OVERLAY_STYLE: &str = "position: fixed; top: 0; left: 0; width: 100%; height: 100%; \
                             pointer-events: none; z-index: 10000;";

pub struct CanvasProvider {
    window: Window,
}

impl CanvasProvider {
    pub fn new(window: Window) -> Self {
        CanvasProvider { window }
    }
}

impl SurfaceProvider for CanvasProvider {
    type Surface = CanvasSurface;

    fn acquire(&mut self) -> Result<CanvasSurface, SurfaceError> {
        let document = self.window.document().ok_or(SurfaceError::NoDocument)?;
        let body = document.body().ok_or(SurfaceError::NoBody)?;
        let canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| SurfaceError::ContextUnavailable)?;
        canvas.set_attribute("style", OVERLAY_STYLE)?;
        canvas.set_attribute("aria-hidden", "true")?;
        let context = canvas
            .get_context("2d")?
            .ok_or(SurfaceError::ContextUnavailable)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| SurfaceError::ContextUnavailable)?;
        body.append_child(&canvas)?;

        let mut surface = CanvasSurface {
            window: self.window.clone(),
            canvas,
            context,
            viewport: Viewport::new(0.0, 0.0),
            pixel_ratio: 1.0,
        };
        surface.fit_to_window();
        Ok(surface)
    }
}

pub struct CanvasSurface {
    window: Window,
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    viewport: Viewport,
    pixel_ratio: f64,
}

impl CanvasSurface {
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    // Backing store follows the window and the device pixel ratio
    fn fit_to_window(&mut self) {
        let width = self
            .window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .unwrap_or(self.viewport.width);
        let height = self
            .window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(self.viewport.height);
        let ratio = self.window.device_pixel_ratio().max(1.0);
        let viewport = Viewport::new(width, height);
        if viewport == self.viewport && ratio == self.pixel_ratio {
            return;
        }
        debug!("overlay resized to {}x{} @{}x", width, height, ratio);
        self.viewport = viewport;
        self.pixel_ratio = ratio;
        self.canvas.set_width((width * ratio) as u32);
        self.canvas.set_height((height * ratio) as u32);
        // resizing resets the transform
        if let Err(err) = self.context.set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0) {
            warn!("failed to scale overlay: {:?}", err);
        }
    }

    fn fill_outline(&self, outline: Outline) -> Result<(), JsValue> {
        let ctx = &self.context;
        match outline {
            Outline::Disc { radius } => {
                ctx.begin_path();
                ctx.arc(0.0, 0.0, radius, 0.0, 2.0 * PI)?;
                ctx.fill();
            }
            Outline::Rect { width, height } => {
                ctx.fill_rect(-width / 2.0, -height / 2.0, width, height);
            }
            Outline::Polygon([a, b, c]) => {
                ctx.begin_path();
                ctx.move_to(a.x, a.y);
                ctx.line_to(b.x, b.y);
                ctx.line_to(c.x, c.y);
                ctx.close_path();
                ctx.fill();
            }
        }
        Ok(())
    }

    #[allow(deprecated)]
    fn paint_particle(&self, p: &Particle) -> Result<(), JsValue> {
        let ctx = &self.context;
        ctx.translate(p.pos.x, p.pos.y)?;
        ctx.rotate(p.rotation_rad())?;
        ctx.set_global_alpha(p.opacity());
        ctx.set_fill_style(&JsValue::from_str(&p.color.to_css()));
        self.fill_outline(p.shape.outline(p.size))
    }

    #[allow(deprecated)]
    fn paint_effect(&self, effect: &EffectFrame) -> Result<(), JsValue> {
        let ctx = &self.context;
        match *effect {
            EffectFrame::Flash { color, opacity } => {
                ctx.set_global_alpha(opacity);
                ctx.set_fill_style(&JsValue::from_str(&color.to_css()));
                ctx.fill_rect(0.0, 0.0, self.viewport.width, self.viewport.height);
            }
            EffectFrame::Ring {
                center,
                radius,
                width,
                color,
                opacity,
            } => {
                ctx.set_global_alpha(opacity);
                ctx.set_stroke_style(&JsValue::from_str(&color.to_css()));
                ctx.set_line_width(width);
                ctx.begin_path();
                ctx.arc(center.x, center.y, radius, 0.0, 2.0 * PI)?;
                ctx.stroke();
            }
            EffectFrame::Ripple {
                center,
                radius,
                opacity,
                clip,
            } => {
                ctx.begin_path();
                ctx.rect(clip.x, clip.y, clip.width, clip.height);
                ctx.clip();
                ctx.set_global_alpha(opacity);
                ctx.set_fill_style(&JsValue::from_str("#ffffff"));
                ctx.begin_path();
                ctx.arc(center.x, center.y, radius, 0.0, 2.0 * PI)?;
                ctx.fill();
            }
        }
        Ok(())
    }
}

impl Surface for CanvasSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn begin_frame(&mut self) {
        self.fit_to_window();
        self.context
            .clear_rect(0.0, 0.0, self.viewport.width, self.viewport.height);
    }

    fn draw_particle(&mut self, particle: &Particle) {
        self.context.save();
        if let Err(err) = self.paint_particle(particle) {
            warn!("failed to draw particle: {:?}", err);
        }
        self.context.restore();
    }

    fn draw_effect(&mut self, effect: &EffectFrame) {
        self.context.save();
        if let Err(err) = self.paint_effect(effect) {
            warn!("failed to draw effect: {:?}", err);
        }
        self.context.restore();
    }
}

impl Drop for CanvasSurface {
    fn drop(&mut self) {
        self.canvas.remove();
    }
}
