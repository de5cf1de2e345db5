use crate::power::PowerReading;

/// Host notifications the simulation reacts to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// The viewport changed size
    Resized { width: u32, height: u32 },
    /// The display became visible (`true`) or hidden (`false`)
    VisibilityChanged(bool),
    /// A battery status change
    Power(PowerReading),
    /// A frame callback with the host timestamp in milliseconds
    Frame(f64),
}
