//! The snowfall simulation loop and the builder that wires it to a host

use crate::clock::FrameGate;
use crate::event::HostEvent;
use crate::power::{target_count, PowerMonitor, PowerReading};
use crate::state::LoopState;
use crossbeam::channel::{Receiver, TryRecvError};
use flurry_core::{FlurryError, Result, SnowfallConfig};
use flurry_particles::{ParticleRanges, ParticleSet};
use flurry_render::{draw_all, GeometryProvider, RenderCache, SpriteRequest, StrokeStyle, Surface};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};

/// What a frame callback did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A tick ran and the surface was redrawn
    Rendered,
    /// The frame gate rejected the timestamp
    Throttled,
    /// The loop is idle, suspended or destroyed
    Inactive,
}

/// Collects the host capabilities a [`Snowfall`] needs.
///
/// The surface and geometry provider are required; the power monitor is
/// optional and its absence is silent.
pub struct SnowfallBuilder<S: Surface> {
    config: SnowfallConfig,
    surface: Option<S>,
    geometry: Option<Box<dyn GeometryProvider>>,
    power: Option<Box<dyn PowerMonitor>>,
}

impl<S: Surface> SnowfallBuilder<S> {
    pub fn new(config: SnowfallConfig) -> Self {
        Self {
            config,
            surface: None,
            geometry: None,
            power: None,
        }
    }

    pub fn surface(mut self, surface: S) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn geometry(mut self, provider: impl GeometryProvider + 'static) -> Self {
        self.geometry = Some(Box::new(provider));
        self
    }

    pub fn power_monitor(mut self, monitor: impl PowerMonitor + 'static) -> Self {
        self.power = Some(Box::new(monitor));
        self
    }

    /// Validate the configuration and assemble the loop in the `Idle` state
    /// with a freshly generated particle set.
    pub fn build(self) -> Result<Snowfall<S>> {
        self.config.validate()?;

        let Some(surface) = self.surface else {
            warn!("no drawing surface available, snowfall disabled");
            return Err(FlurryError::SurfaceUnavailable(
                "host supplied no drawing surface".into(),
            ));
        };
        let Some(geometry) = self.geometry else {
            error!("no snowflake geometry provider registered");
            return Err(FlurryError::MissingGeometry(
                "a geometry provider is required to draw motifs".into(),
            ));
        };

        let power = self.power.and_then(|mut monitor| monitor.subscribe());
        if power.is_none() {
            debug!("no power monitor, running at configured count");
        }

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let ranges = ParticleRanges::from_config(&self.config);
        let particles = ParticleSet::generate(
            self.config.count,
            &ranges,
            surface.width() as f32,
            surface.height() as f32,
            &mut rng,
        );

        info!(
            count = particles.len(),
            width = surface.width(),
            height = surface.height(),
            "snowfall initialized"
        );

        Ok(Snowfall {
            gate: FrameGate::with_target_fps(self.config.target_fps),
            cache: RenderCache::new(self.config.cache.clone()),
            style: StrokeStyle {
                color: self.config.color,
                line_width: self.config.line_width,
            },
            config: self.config,
            ranges,
            surface: Some(surface),
            geometry,
            power,
            particles,
            rng,
            state: LoopState::Idle,
            visible: true,
            destroyed: false,
            warned_after_destroy: false,
        })
    }
}

/// The running overlay: owns the surface, particle set, render cache and
/// frame gate. All mutation happens on the thread that drives `frame`.
pub struct Snowfall<S: Surface> {
    config: SnowfallConfig,
    ranges: ParticleRanges,
    style: StrokeStyle,
    surface: Option<S>,
    geometry: Box<dyn GeometryProvider>,
    power: Option<Receiver<PowerReading>>,
    particles: ParticleSet,
    cache: RenderCache,
    gate: FrameGate,
    rng: StdRng,
    state: LoopState,
    visible: bool,
    destroyed: bool,
    warned_after_destroy: bool,
}

impl<S: Surface> Snowfall<S> {
    pub fn builder(config: SnowfallConfig) -> SnowfallBuilder<S> {
        SnowfallBuilder::new(config)
    }

    /// Begin ticking on admitted frames. Starts `Suspended` if the host last
    /// reported the display hidden.
    pub fn start(&mut self) {
        if self.destroyed {
            if !self.warned_after_destroy {
                warn!("start() called on a destroyed snowfall, ignoring");
                self.warned_after_destroy = true;
            }
            return;
        }
        if self.state.is_started() {
            return;
        }
        self.gate.reset();
        self.state = if self.visible {
            LoopState::Running
        } else {
            LoopState::Suspended
        };
        info!(state = %self.state, "snowfall started");
    }

    /// Cancel scheduling. Calling it again is a no-op.
    pub fn stop(&mut self) {
        if self.state == LoopState::Idle {
            return;
        }
        self.state = LoopState::Idle;
        info!("snowfall stopped");
    }

    /// Stop and release every resource. Calling it again is a no-op.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.stop();
        self.cache.clear();
        self.particles.clear();
        self.surface = None;
        self.power = None;
        self.destroyed = true;
        info!("snowfall destroyed");
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        let next = match (self.state, visible) {
            (LoopState::Running, false) => LoopState::Suspended,
            (LoopState::Suspended, true) => LoopState::Running,
            (state, _) => state,
        };
        if next != self.state {
            debug!(from = %self.state, to = %next, "visibility changed");
            self.state = next;
        }
    }

    /// Resize the surface and drop every cached sprite. Particles keep their
    /// positions.
    pub fn resize(&mut self, width: u32, height: u32) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.resize(width, height);
        self.cache.clear();
        debug!(width, height, "surface resized");
    }

    /// Handle a host frame callback.
    ///
    /// Pending power readings are applied first. A tick runs only while
    /// `Running` and when the frame gate admits the timestamp.
    pub fn frame(&mut self, timestamp_ms: f64) -> FrameOutcome {
        self.pump_power();

        if !self.state.is_running() {
            return FrameOutcome::Inactive;
        }
        if !self.gate.admit(timestamp_ms) {
            return FrameOutcome::Throttled;
        }
        let Some(surface) = self.surface.as_mut() else {
            return FrameOutcome::Inactive;
        };

        let width = surface.width() as f32;
        let height = surface.height() as f32;
        self.particles.update(width, height, &mut self.rng);

        surface.clear();
        let requests = self.particles.iter().map(|p| SpriteRequest {
            motif: p.motif,
            size: p.size,
            x: p.x,
            y: p.y,
            opacity: p.opacity,
        });
        draw_all(
            surface,
            &mut self.cache,
            &*self.geometry,
            requests,
            &self.style,
            timestamp_ms,
        );
        surface.flush();
        FrameOutcome::Rendered
    }

    /// Apply a battery reading, regenerating the particle set when the
    /// power policy calls for a different count.
    pub fn on_power_reading(&mut self, reading: PowerReading) {
        if self.destroyed {
            return;
        }
        let current = self.particles.len();
        let Some(count) = target_count(&reading, current, self.config.count, &self.config.power)
        else {
            return;
        };
        info!(
            level = reading.level,
            charging = reading.charging,
            from = current,
            to = count,
            "power state changed, regenerating particles"
        );
        self.regenerate(count);
    }

    /// Dispatch a host event. Returns the outcome for frame callbacks.
    pub fn handle(&mut self, event: HostEvent) -> Option<FrameOutcome> {
        match event {
            HostEvent::Resized { width, height } => self.resize(width, height),
            HostEvent::VisibilityChanged(visible) => self.set_visible(visible),
            HostEvent::Power(reading) => self.on_power_reading(reading),
            HostEvent::Frame(timestamp_ms) => return Some(self.frame(timestamp_ms)),
        }
        None
    }

    fn regenerate(&mut self, count: usize) {
        let Some(surface) = self.surface.as_ref() else {
            return;
        };
        self.particles = ParticleSet::generate(
            count,
            &self.ranges,
            surface.width() as f32,
            surface.height() as f32,
            &mut self.rng,
        );
    }

    fn pump_power(&mut self) {
        let Some(receiver) = self.power.as_ref() else {
            return;
        };
        let mut readings = Vec::new();
        let disconnected = loop {
            match receiver.try_recv() {
                Ok(reading) => readings.push(reading),
                Err(TryRecvError::Empty) => break false,
                Err(TryRecvError::Disconnected) => break true,
            }
        };
        if disconnected {
            debug!("power monitor disconnected");
            self.power = None;
        }
        for reading in readings {
            self.on_power_reading(reading);
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn config(&self) -> &SnowfallConfig {
        &self.config
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn configured_count(&self) -> usize {
        self.config.count
    }

    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    /// The drawing surface, or `None` once destroyed
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
