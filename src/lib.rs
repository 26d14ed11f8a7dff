extern crate nalgebra_glm as glm;

mod utils;
pub mod color;
pub mod config;
pub mod counter;
pub mod effects;
pub mod frame_loop;
pub mod logger;
pub mod options;
pub mod particle;
pub mod renderer;
pub mod simulator;
pub mod surface;

use crate::effects::Rect;
use crate::frame_loop::Driver;
use crate::options::BurstOptions;
use crate::renderer::CanvasProvider;
use crate::simulator::Simulator;
use crate::surface::SurfaceError;
use log::{error, info, LevelFilter};
use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, MouseEvent};

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen]
pub fn initialize() {
    utils::set_panic_hook();
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    logger::init(level);
}

/// "off", "error", "warn", "info", "debug" or "trace".
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter = logger::parse_level(level)
        .ok_or_else(|| JsValue::from_str(&format!("unknown log level {:?}", level)))?;
    logger::init(filter);
    Ok(())
}

type ClickListener = Closure<dyn FnMut(MouseEvent)>;

/// The page's confetti overlay. One instance serves every trigger on the page.
#[wasm_bindgen]
pub struct Confetti {
    driver: Driver,
    listeners: Vec<(HtmlElement, ClickListener)>,
}

#[wasm_bindgen]
impl Confetti {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<Confetti, JsValue> {
        Confetti::with_rng(StdRng::from_entropy())
    }

    /// Reproducible animations, handy for visual tests.
    pub fn seeded(seed: u32) -> Result<Confetti, JsValue> {
        Confetti::with_rng(StdRng::seed_from_u64(seed as u64))
    }

    pub fn set_options(&self, options: &BurstOptions) {
        let mut sim = self.driver.simulator().borrow_mut();
        sim.set_burst_config(options.burst_config().clone());
        sim.set_effect_config(options.effect_config().clone());
    }

    /// Particles only. `count` defaults to the configured count.
    pub fn burst(&self, x: f64, y: f64, count: Option<u32>) {
        self.driver.run("burst", |sim, now| {
            let count = count.unwrap_or(sim.burst_config().count);
            sim.burst(glm::vec2(x, y), count, now)
        });
    }

    /// Flash, rings and a staggered burst from one point.
    pub fn celebrate(&self, x: f64, y: f64) {
        celebrate(&self.driver, x, y);
    }

    pub fn ripple(&self, x: f64, y: f64, left: f64, top: f64, width: f64, height: f64) {
        let button = Rect::new(left, top, width, height);
        self.driver
            .run("ripple", |sim, now| sim.ripple(glm::vec2(x, y), button, now));
    }

    /// Celebrates from the center of `button` on every click.
    pub fn attach(&mut self, button: HtmlElement) -> Result<(), JsValue> {
        let driver = self.driver.clone();
        let target = button.clone();
        let listener = Closure::wrap(Box::new(move |_event: MouseEvent| {
            let center = element_rect(&target).center();
            celebrate(&driver, center.x, center.y);
        }) as Box<dyn FnMut(MouseEvent)>);
        self.listen(button, listener)
    }

    /// Ripple from the click point, clipped to `button`.
    pub fn attach_ripple(&mut self, button: HtmlElement) -> Result<(), JsValue> {
        let driver = self.driver.clone();
        let target = button.clone();
        let listener = Closure::wrap(Box::new(move |event: MouseEvent| {
            let rect = element_rect(&target);
            let click = glm::vec2(event.client_x() as f64, event.client_y() as f64);
            driver.run("ripple", |sim, now| sim.ripple(click, rect, now));
        }) as Box<dyn FnMut(MouseEvent)>);
        self.listen(button, listener)
    }

    pub fn live_particles(&self) -> u32 {
        self.driver.simulator().borrow().live_particles() as u32
    }

    pub fn is_running(&self) -> bool {
        self.driver.simulator().borrow().is_running()
    }

    pub fn has_surface(&self) -> bool {
        self.driver.simulator().borrow().has_surface()
    }

    /// Frame loops started so far, concurrent bursts share one.
    pub fn loop_starts(&self) -> u32 {
        self.driver.loop_starts()
    }

    pub fn pending_frame(&self) -> Option<i32> {
        self.driver.pending_frame()
    }
}

impl Confetti {
    fn with_rng(rng: StdRng) -> Result<Confetti, JsValue> {
        let window = web_sys::window().ok_or(SurfaceError::NoWindow)?;
        let sim = Simulator::new(CanvasProvider::new(window.clone()), rng);
        info!("confetti ready");
        Ok(Confetti {
            driver: Driver::new(window, sim),
            listeners: Vec::new(),
        })
    }

    fn listen(&mut self, button: HtmlElement, listener: ClickListener) -> Result<(), JsValue> {
        button.add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())?;
        self.listeners.push((button, listener));
        Ok(())
    }
}

impl Drop for Confetti {
    fn drop(&mut self) {
        for (button, listener) in self.listeners.drain(..) {
            if let Err(err) =
                button.remove_event_listener_with_callback("click", listener.as_ref().unchecked_ref())
            {
                error!("removeEventListener failed: {:?}", err);
            }
        }
        self.driver.cancel();
    }
}

fn celebrate(driver: &Driver, x: f64, y: f64) {
    driver.run("celebration", |sim, now| sim.celebrate(glm::vec2(x, y), now));
}

fn element_rect(element: &HtmlElement) -> Rect {
    let rect = element.get_bounding_client_rect();
    Rect::new(rect.left(), rect.top(), rect.width(), rect.height())
}
