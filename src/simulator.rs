// Owns every live particle and effect on the page, the shared render surface
// and the running state of the frame loop. Driven by `tick` once per frame.

use crate::config::{BurstConfig, EffectConfig};
use crate::effects::{Effect, Rect};
use crate::particle::Particle;
use crate::surface::{Surface, SurfaceError, SurfaceProvider, Viewport};
use log::debug;
use rand::Rng;

/// Tells the caller whether it has to start the frame loop.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Schedule {
    StartLoop,
    Joined,
    Nothing,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    Continue,
    Idle,
}

struct Pulse {
    due_ms: f64,
    origin: glm::DVec2,
    count: u32,
    config: BurstConfig,
}

pub struct Simulator<P: SurfaceProvider, R: Rng> {
    provider: P,
    surface: Option<P::Surface>,
    rng: R,
    burst_config: BurstConfig,
    effect_config: EffectConfig,
    particles: Vec<Particle>,
    pending: Vec<Pulse>,
    effects: Vec<Effect>,
    running: bool,
    spawned: u64,
}

impl<P: SurfaceProvider, R: Rng> Simulator<P, R> {
    pub fn new(provider: P, rng: R) -> Self {
        Simulator {
            provider,
            surface: None,
            rng,
            burst_config: BurstConfig::default(),
            effect_config: EffectConfig::default(),
            particles: Vec::new(),
            pending: Vec::new(),
            effects: Vec::new(),
            running: false,
            spawned: 0,
        }
    }

    pub fn burst_config(&self) -> &BurstConfig {
        &self.burst_config
    }

    pub fn set_burst_config(&mut self, config: BurstConfig) {
        self.burst_config = config;
    }

    pub fn effect_config(&self) -> &EffectConfig {
        &self.effect_config
    }

    pub fn set_effect_config(&mut self, config: EffectConfig) {
        self.effect_config = config;
    }

    pub fn live_particles(&self) -> usize {
        self.particles.len()
    }

    pub fn live_effects(&self) -> usize {
        self.effects.len()
    }

    pub fn pending_pulses(&self) -> usize {
        self.pending.len()
    }

    /// Total particles ever emitted.
    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Burst with the active configuration.
    pub fn burst(&mut self, origin: glm::DVec2, count: u32, now_ms: f64) -> Result<Schedule, SurfaceError> {
        let config = self.burst_config.clone();
        self.burst_with(origin, count, config, now_ms)
    }

    pub fn burst_with(
        &mut self,
        origin: glm::DVec2,
        count: u32,
        config: BurstConfig,
        now_ms: f64,
    ) -> Result<Schedule, SurfaceError> {
        if count == 0 {
            return Ok(Schedule::Nothing);
        }
        self.ensure_surface()?;
        debug!(
            "burst of {} at ({:.0}, {:.0}) in {} pulse(s)",
            count,
            origin.x,
            origin.y,
            config.pulses.max(1)
        );
        let sizes = config.pulse_sizes(count);
        for (i, &size) in sizes.iter().enumerate() {
            let due_ms = now_ms + i as f64 * config.pulse_delay_ms;
            if i == 0 {
                self.emit(origin, size, &config);
            } else {
                self.pending.push(Pulse {
                    due_ms,
                    origin,
                    count: size,
                    config: config.clone(),
                });
            }
        }
        Ok(self.wake())
    }

    /// Flash, rings, then the staggered particle burst.
    pub fn celebrate(&mut self, origin: glm::DVec2, now_ms: f64) -> Result<Schedule, SurfaceError> {
        self.ensure_surface()?;
        let flash = Effect::flash(now_ms, &self.effect_config);
        self.effects.push(flash);
        let rings = Effect::rings(origin, now_ms, &self.effect_config);
        self.effects.extend(rings);
        let count = self.burst_config.count;
        match self.burst(origin, count, now_ms)? {
            Schedule::Nothing => Ok(self.wake()),
            schedule => Ok(schedule),
        }
    }

    pub fn ripple(&mut self, click: glm::DVec2, button: Rect, now_ms: f64) -> Result<Schedule, SurfaceError> {
        self.ensure_surface()?;
        let ripple = Effect::ripple(click, button, now_ms, &self.effect_config);
        self.effects.push(ripple);
        Ok(self.wake())
    }

    /// Advances one frame: integrate, cull, emit due pulses, render.
    /// Releases the surface on the frame the last thing expires.
    pub fn tick(&mut self, now_ms: f64) -> FrameStatus {
        let viewport = self
            .surface
            .as_ref()
            .map(|surface| surface.viewport())
            .unwrap_or_else(|| Viewport::new(0.0, 0.0));
        let margin = self.burst_config.bounds_margin;

        self.particles.retain_mut(|particle| {
            particle.step();
            particle.is_alive() && particle.is_in_bounds(viewport, margin)
        });

        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due_ms <= now_ms {
                due.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }
        for pulse in due {
            self.emit(pulse.origin, pulse.count, &pulse.config);
        }

        self.effects.retain(|effect| !effect.is_finished(now_ms));

        if self.particles.is_empty() && self.pending.is_empty() && self.effects.is_empty() {
            self.release_surface();
            self.running = false;
            debug!("frame loop idle after {} particles", self.spawned);
            return FrameStatus::Idle;
        }

        if let Some(surface) = self.surface.as_mut() {
            surface.begin_frame();
            for particle in &self.particles {
                surface.draw_particle(particle);
            }
            for effect in &self.effects {
                if let Some(frame) = effect.frame(now_ms) {
                    surface.draw_effect(&frame);
                }
            }
        }
        FrameStatus::Continue
    }

    /// Drops everything in flight and releases the surface, for when no
    /// frame can be scheduled to finish the animation.
    pub fn halt(&mut self) {
        debug!(
            "halting with {} particles, {} pulses and {} effects in flight",
            self.particles.len(),
            self.pending.len(),
            self.effects.len()
        );
        self.particles.clear();
        self.pending.clear();
        self.effects.clear();
        self.release_surface();
        self.running = false;
    }

    fn emit(&mut self, origin: glm::DVec2, count: u32, config: &BurstConfig) {
        self.particles.reserve(count as usize);
        for _ in 0..count {
            let particle = Particle::spawn(origin, config, &mut self.rng);
            self.particles.push(particle);
        }
        self.spawned += count as u64;
    }

    fn ensure_surface(&mut self) -> Result<(), SurfaceError> {
        if self.surface.is_none() {
            let surface = self.provider.acquire()?;
            debug!("render surface acquired {:?}", surface.viewport());
            self.surface = Some(surface);
        }
        Ok(())
    }

    fn release_surface(&mut self) {
        if self.surface.take().is_some() {
            debug!("render surface released");
        }
    }

    fn wake(&mut self) -> Schedule {
        if self.running {
            Schedule::Joined
        } else {
            self.running = true;
            debug!("frame loop started");
            Schedule::StartLoop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectFrame;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Default)]
    struct Ledger {
        acquired: Cell<u32>,
        released: Cell<u32>,
        frames: Cell<u32>,
        particle_draws: Cell<u32>,
        effect_draws: RefCell<Vec<EffectFrame>>,
    }

    struct MockSurface {
        ledger: Rc<Ledger>,
        viewport: Viewport,
    }

    impl Surface for MockSurface {
        fn viewport(&self) -> Viewport {
            self.viewport
        }

        fn begin_frame(&mut self) {
            self.ledger.frames.set(self.ledger.frames.get() + 1);
        }

        fn draw_particle(&mut self, _particle: &Particle) {
            self.ledger.particle_draws.set(self.ledger.particle_draws.get() + 1);
        }

        fn draw_effect(&mut self, effect: &EffectFrame) {
            self.ledger.effect_draws.borrow_mut().push(*effect);
        }
    }

    impl Drop for MockSurface {
        fn drop(&mut self) {
            self.ledger.released.set(self.ledger.released.get() + 1);
        }
    }

    struct MockProvider {
        ledger: Rc<Ledger>,
        viewport: Viewport,
        fail: bool,
    }

    impl SurfaceProvider for MockProvider {
        type Surface = MockSurface;

        fn acquire(&mut self) -> Result<MockSurface, SurfaceError> {
            if self.fail {
                return Err(SurfaceError::NoDocument);
            }
            self.ledger.acquired.set(self.ledger.acquired.get() + 1);
            Ok(MockSurface {
                ledger: self.ledger.clone(),
                viewport: self.viewport,
            })
        }
    }

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn simulator(viewport: Viewport) -> (Simulator<MockProvider, StdRng>, Rc<Ledger>) {
        let ledger = Rc::new(Ledger::default());
        let provider = MockProvider {
            ledger: ledger.clone(),
            viewport,
            fail: false,
        };
        (Simulator::new(provider, StdRng::seed_from_u64(42)), ledger)
    }

    fn huge() -> Viewport {
        Viewport::new(1.0e9, 1.0e9)
    }

    fn scenario_config() -> BurstConfig {
        BurstConfig {
            gravity: 0.5,
            drag: 0.98,
            decay: 0.02..=0.02,
            speed: 0.0..=2.0,
            pulses: 1,
            ..BurstConfig::default()
        }
    }

    #[test]
    fn twelve_particles_expire_after_fifty_steps() {
        let (mut sim, ledger) = simulator(huge());
        sim.set_burst_config(scenario_config());
        let schedule = sim.burst(glm::vec2(500.0, 300.0), 12, 0.0).unwrap();
        assert_eq!(schedule, Schedule::StartLoop);
        assert_eq!(sim.live_particles(), 12);

        for frame in 1..50 {
            assert_eq!(sim.tick(frame as f64 * FRAME_MS), FrameStatus::Continue);
            assert_eq!(sim.live_particles(), 12);
            let expected = 1.0 - frame as f64 * 0.02;
            for p in sim.particles() {
                assert!((p.life - expected).abs() < 1e-9);
                assert!(p.life > 0.0);
            }
        }
        assert_eq!(sim.tick(50.0 * FRAME_MS), FrameStatus::Idle);
        assert_eq!(sim.live_particles(), 0);
        assert!(!sim.has_surface());
        assert!(!sim.is_running());
        assert_eq!(ledger.acquired.get(), 1);
        assert_eq!(ledger.released.get(), 1);
        assert_eq!(ledger.frames.get(), 49);
        assert_eq!(ledger.particle_draws.get(), 49 * 12);
    }

    #[test]
    fn every_live_particle_follows_the_integrator() {
        let (mut sim, _) = simulator(huge());
        sim.set_burst_config(scenario_config());
        sim.burst(glm::vec2(0.0, 0.0), 20, 0.0).unwrap();
        let before: Vec<Particle> = sim.particles().to_vec();
        sim.tick(FRAME_MS);
        // no particle is culled on the first step, order is preserved by retain
        for (old, new) in before.iter().zip(sim.particles()) {
            let vel = glm::vec2(old.vel.x * 0.98, (old.vel.y + 0.5) * 0.98);
            assert!((new.vel - vel).norm() < 1e-9);
            assert!((new.pos - (old.pos + vel)).norm() < 1e-9);
        }
    }

    #[test]
    fn staggered_pulses_emit_exactly_count() {
        let (mut sim, _) = simulator(huge());
        sim.set_burst_config(BurstConfig {
            pulses: 3,
            pulse_delay_ms: 100.0,
            ..BurstConfig::default()
        });
        sim.burst(glm::vec2(1000.0, 1000.0), 11, 0.0).unwrap();
        assert_eq!(sim.spawned(), 4);
        assert_eq!(sim.pending_pulses(), 2);

        let mut now = 0.0;
        while sim.pending_pulses() > 0 {
            now += FRAME_MS;
            sim.tick(now);
        }
        assert!(now >= 200.0 - 1e-6 && now < 200.0 + 2.0 * FRAME_MS);
        assert_eq!(sim.spawned(), 11);
        assert_eq!(sim.live_particles(), 11);
    }

    #[test]
    fn second_burst_joins_the_running_loop() {
        let (mut sim, ledger) = simulator(huge());
        assert_eq!(sim.burst(glm::vec2(1.0, 1.0), 30, 0.0).unwrap(), Schedule::StartLoop);
        sim.tick(FRAME_MS);
        assert_eq!(sim.burst(glm::vec2(2.0, 2.0), 30, FRAME_MS).unwrap(), Schedule::Joined);
        assert_eq!(ledger.acquired.get(), 1);
        assert_eq!(ledger.released.get(), 0);
        assert!(sim.is_running());
    }

    #[test]
    fn loop_stops_and_surface_is_released_once_everything_expires() {
        let (mut sim, ledger) = simulator(huge());
        sim.burst(glm::vec2(10.0, 10.0), 50, 0.0).unwrap();
        sim.burst(glm::vec2(20.0, 20.0), 50, 5.0).unwrap();

        let mut now = 0.0;
        let mut frames = 0;
        while sim.tick(now) == FrameStatus::Continue {
            now += FRAME_MS;
            frames += 1;
            assert!(frames < 10_000, "loop never went idle");
        }
        assert_eq!(sim.live_particles(), 0);
        assert_eq!(sim.spawned(), 100);
        assert_eq!(ledger.released.get(), 1);

        // the next burst starts over with a fresh surface
        assert_eq!(sim.burst(glm::vec2(0.0, 0.0), 1, now).unwrap(), Schedule::StartLoop);
        assert_eq!(ledger.acquired.get(), 2);
    }

    #[test]
    fn weightless_particles_still_expire() {
        let (mut sim, ledger) = simulator(huge());
        sim.set_burst_config(BurstConfig {
            gravity: 0.0,
            decay: 0.0..=0.0,
            speed: 0.0..=0.0,
            lift: 0.0,
            pulses: 1,
            ..BurstConfig::default()
        });
        sim.burst(glm::vec2(400.0, 300.0), 10, 0.0).unwrap();

        let mut frames = 0;
        while sim.tick(frames as f64 * FRAME_MS) == FrameStatus::Continue {
            frames += 1;
            assert!(frames <= 1010, "particles outlived the decay floor");
        }
        assert!(!sim.is_running());
        assert_eq!(ledger.released.get(), 1);
    }

    #[test]
    fn halt_releases_everything_and_allows_a_restart() {
        let (mut sim, ledger) = simulator(huge());
        sim.celebrate(glm::vec2(100.0, 100.0), 0.0).unwrap();
        assert!(sim.pending_pulses() > 0);

        sim.halt();
        assert_eq!(sim.live_particles(), 0);
        assert_eq!(sim.pending_pulses(), 0);
        assert_eq!(sim.live_effects(), 0);
        assert!(!sim.has_surface());
        assert!(!sim.is_running());
        assert_eq!(ledger.released.get(), 1);

        // a later burst has to start a loop of its own
        assert_eq!(sim.burst(glm::vec2(0.0, 0.0), 5, 10.0).unwrap(), Schedule::StartLoop);
        assert_eq!(ledger.acquired.get(), 2);
    }

    #[test]
    fn empty_burst_touches_nothing() {
        let (mut sim, ledger) = simulator(huge());
        assert_eq!(sim.burst(glm::vec2(0.0, 0.0), 0, 0.0).unwrap(), Schedule::Nothing);
        assert_eq!(ledger.acquired.get(), 0);
        assert!(!sim.is_running());
    }

    #[test]
    fn offscreen_origin_is_culled_without_error() {
        let (mut sim, ledger) = simulator(Viewport::new(800.0, 600.0));
        sim.set_burst_config(BurstConfig {
            pulses: 1,
            ..BurstConfig::default()
        });
        sim.burst(glm::vec2(-10_000.0, 300.0), 25, 0.0).unwrap();
        assert_eq!(sim.tick(FRAME_MS), FrameStatus::Idle);
        assert_eq!(ledger.particle_draws.get(), 0);
        assert_eq!(ledger.released.get(), 1);
    }

    #[test]
    fn failed_acquire_leaves_simulator_idle() {
        let ledger = Rc::new(Ledger::default());
        let provider = MockProvider {
            ledger: ledger.clone(),
            viewport: huge(),
            fail: true,
        };
        let mut sim = Simulator::new(provider, StdRng::seed_from_u64(1));
        assert!(matches!(
            sim.burst(glm::vec2(0.0, 0.0), 10, 0.0),
            Err(SurfaceError::NoDocument)
        ));
        assert_eq!(sim.live_particles(), 0);
        assert!(!sim.is_running());
    }

    #[test]
    fn celebrate_schedules_flash_rings_and_burst() {
        let (mut sim, ledger) = simulator(huge());
        let origin = glm::vec2(300.0, 200.0);
        assert_eq!(sim.celebrate(origin, 0.0).unwrap(), Schedule::StartLoop);
        assert_eq!(sim.live_effects(), 4);
        assert_eq!(sim.spawned(), 40);

        sim.tick(200.0);
        let draws = ledger.effect_draws.borrow();
        assert!(matches!(draws[0], EffectFrame::Flash { .. }));
        // flash plus the three rings that have started by 200ms
        assert_eq!(draws.len(), 4);
    }

    #[test]
    fn effects_alone_keep_the_loop_alive() {
        let (mut sim, ledger) = simulator(huge());
        let button = Rect::new(0.0, 0.0, 120.0, 40.0);
        sim.ripple(glm::vec2(60.0, 20.0), button, 0.0).unwrap();
        assert_eq!(sim.tick(300.0), FrameStatus::Continue);
        assert_eq!(sim.tick(600.0), FrameStatus::Idle);
        assert_eq!(ledger.effect_draws.borrow().len(), 1);
        assert_eq!(ledger.released.get(), 1);
    }
}
