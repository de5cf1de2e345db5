//! Flurry Runtime - Snowfall loop infrastructure
//!
//! Provides the pieces a host drives once per display frame:
//! - `FrameGate` - throttles host callbacks to the target tick rate
//! - `LoopState` - idle / running / suspended lifecycle
//! - `PowerMonitor` / `power_channel` - battery readings over a channel
//! - `HostEvent` - resize, visibility, power and frame notifications
//! - `Snowfall` / `SnowfallBuilder` - the simulation loop itself

mod clock;
mod event;
mod power;
mod simulation;
mod state;

pub use clock::{FrameGate, DEFAULT_TARGET_FPS};
pub use event::HostEvent;
pub use power::{
    power_channel, target_count, ChannelPowerMonitor, PowerFeed, PowerMonitor, PowerReading,
};
pub use simulation::{FrameOutcome, Snowfall, SnowfallBuilder};
pub use state::LoopState;
