//! Simulation loop lifecycle states

use std::fmt;

/// Where the loop is in its lifecycle.
///
/// `Suspended` keeps the particle set and cache but skips ticks until the
/// host reports the display visible again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    /// Not scheduled; no tick fires.
    #[default]
    Idle,
    /// Ticking on admitted frames.
    Running,
    /// Started, but the host display is hidden.
    Suspended,
}

impl LoopState {
    pub fn is_running(self) -> bool {
        self == LoopState::Running
    }

    /// True between `start()` and `stop()`, whether or not frames tick
    pub fn is_started(self) -> bool {
        self != LoopState::Idle
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoopState::Idle => "idle",
            LoopState::Running => "running",
            LoopState::Suspended => "suspended",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(LoopState::default(), LoopState::Idle);
        assert!(!LoopState::Idle.is_started());
    }

    #[test]
    fn test_suspended_is_started_but_not_running() {
        assert!(LoopState::Suspended.is_started());
        assert!(!LoopState::Suspended.is_running());
        assert!(LoopState::Running.is_running());
        assert_eq!(LoopState::Suspended.to_string(), "suspended");
    }
}
