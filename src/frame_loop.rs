// Drives the page-wide simulator from requestAnimationFrame. There is one
// callback per driver, re-requested only while the simulator reports work.

use crate::renderer::CanvasProvider;
use crate::simulator::{FrameStatus, Schedule, Simulator};
use crate::surface::SurfaceError;
use crate::utils::Timer;
use log::{error, log_enabled, Level};
use rand::rngs::StdRng;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

pub type CanvasSimulator = Simulator<CanvasProvider, StdRng>;

type FrameCallback = Closure<dyn FnMut(f64)>;

#[derive(Clone)]
pub struct Driver {
    window: Window,
    sim: Rc<RefCell<CanvasSimulator>>,
    frame: Rc<RefCell<Option<FrameCallback>>>,
    requested: Rc<Cell<Option<i32>>>,
    starts: Rc<Cell<u32>>,
}

impl Driver {
    pub fn new(window: Window, sim: CanvasSimulator) -> Driver {
        let sim = Rc::new(RefCell::new(sim));
        let frame: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
        let requested = Rc::new(Cell::new(None));

        let callback = {
            let window = window.clone();
            let sim = sim.clone();
            let requested = requested.clone();
            // weak, the callback lives inside the slot it points to
            let slot: Weak<RefCell<Option<FrameCallback>>> = Rc::downgrade(&frame);
            Closure::wrap(Box::new(move |now: f64| {
                requested.set(None);
                let status = {
                    let _timer = if log_enabled!(Level::Trace) {
                        Some(Timer::new("confetti frame"))
                    } else {
                        None
                    };
                    sim.borrow_mut().tick(now)
                };
                if status == FrameStatus::Continue {
                    let scheduled = match slot.upgrade() {
                        Some(slot) => match slot.borrow().as_ref() {
                            Some(callback) => request_frame(&window, callback, &requested),
                            None => false,
                        },
                        None => false,
                    };
                    if !scheduled {
                        sim.borrow_mut().halt();
                    }
                }
            }) as Box<dyn FnMut(f64)>)
        };
        *frame.borrow_mut() = Some(callback);

        Driver {
            window,
            sim,
            frame,
            requested,
            starts: Rc::new(Cell::new(0)),
        }
    }

    pub fn simulator(&self) -> &Rc<RefCell<CanvasSimulator>> {
        &self.sim
    }

    /// Loops started over the driver's lifetime.
    pub fn loop_starts(&self) -> u32 {
        self.starts.get()
    }

    /// Id of the frame request currently outstanding, if any.
    pub fn pending_frame(&self) -> Option<i32> {
        self.requested.get()
    }

    /// Same clock as the timestamps requestAnimationFrame hands out.
    pub fn now(&self) -> f64 {
        match self.window.performance() {
            Some(performance) => performance.now(),
            None => js_sys::Date::now(),
        }
    }

    /// Runs `action` against the simulator and starts the loop if it asks for it.
    /// Failures are logged, page scripts never see them.
    pub fn run<F>(&self, what: &str, action: F)
    where
        F: FnOnce(&mut CanvasSimulator, f64) -> Result<Schedule, SurfaceError>,
    {
        let now = self.now();
        let result = {
            let mut sim = self.sim.borrow_mut();
            action(&mut *sim, now)
        };
        match result {
            Ok(Schedule::StartLoop) => {
                let scheduled = match self.frame.borrow().as_ref() {
                    Some(callback) => request_frame(&self.window, callback, &self.requested),
                    None => false,
                };
                if scheduled {
                    self.starts.set(self.starts.get() + 1);
                } else {
                    // nothing would ever tick, don't leave the loop marked as running
                    self.sim.borrow_mut().halt();
                }
            }
            Ok(Schedule::Joined) | Ok(Schedule::Nothing) => {}
            Err(err) => error!("{} dropped: {}", what, err),
        }
    }

    /// Drops the outstanding frame request so the callback can be freed.
    pub fn cancel(&self) {
        if let Some(id) = self.requested.take() {
            if let Err(err) = self.window.cancel_animation_frame(id) {
                error!("cancelAnimationFrame failed: {:?}", err);
            }
        }
    }
}

fn request_frame(window: &Window, callback: &FrameCallback, requested: &Cell<Option<i32>>) -> bool {
    match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
        Ok(id) => {
            requested.set(Some(id));
            true
        }
        Err(err) => {
            error!("requestAnimationFrame failed: {:?}", err);
            false
        }
    }
}
