//! Battery readings and the particle count policy they drive

use crossbeam::channel::{Receiver, Sender};
use flurry_core::PowerConfig;

/// A battery status sample from the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerReading {
    /// Charge fraction in `[0, 1]`
    pub level: f32,
    pub charging: bool,
}

impl PowerReading {
    pub fn new(level: f32, charging: bool) -> Self {
        Self { level, charging }
    }

    /// Low power means discharging at or below the configured threshold
    pub fn is_low(&self, config: &PowerConfig) -> bool {
        self.level <= config.low_battery_threshold && !self.charging
    }
}

/// Particle count a reading calls for, or `None` when the current count
/// already satisfies it.
///
/// Evaluated on every reading with no hysteresis. A low reading only ever
/// reduces the count; it never raises a set already at or below the low
/// power count.
pub fn target_count(
    reading: &PowerReading,
    current: usize,
    configured: usize,
    config: &PowerConfig,
) -> Option<usize> {
    if reading.is_low(config) {
        (current > config.low_power_count).then_some(config.low_power_count)
    } else {
        (current != configured).then_some(configured)
    }
}

/// A source of battery readings.
///
/// The simulation subscribes once at build time and drains the returned
/// channel on every frame callback. Returning `None` means the platform has
/// no battery information, which is not an error.
pub trait PowerMonitor {
    fn subscribe(&mut self) -> Option<Receiver<PowerReading>>;
}

/// Sending half handed to whatever observes the platform battery
#[derive(Clone)]
pub struct PowerFeed {
    sender: Sender<PowerReading>,
}

impl PowerFeed {
    /// Deliver a reading. Returns false once the simulation has been torn down.
    pub fn send(&self, reading: PowerReading) -> bool {
        self.sender.send(reading).is_ok()
    }

    pub fn report(&self, level: f32, charging: bool) -> bool {
        self.send(PowerReading::new(level, charging))
    }
}

/// Channel-backed monitor paired with a `PowerFeed`
pub struct ChannelPowerMonitor {
    receiver: Option<Receiver<PowerReading>>,
}

impl PowerMonitor for ChannelPowerMonitor {
    fn subscribe(&mut self) -> Option<Receiver<PowerReading>> {
        self.receiver.take()
    }
}

/// Create a connected feed and monitor
pub fn power_channel() -> (PowerFeed, ChannelPowerMonitor) {
    let (sender, receiver) = crossbeam::channel::unbounded();
    (
        PowerFeed { sender },
        ChannelPowerMonitor {
            receiver: Some(receiver),
        },
    )
}
