//! Frame gate that throttles host frame callbacks to a target rate

/// Default simulation rate in ticks per second
pub const DEFAULT_TARGET_FPS: f32 = 45.0;

/// Admits host frame timestamps at most once per `interval_ms`
#[derive(Clone, Debug)]
pub struct FrameGate {
    /// Minimum milliseconds between admitted frames
    pub interval_ms: f64,
    /// Timestamp of the last admitted frame
    last_ms: Option<f64>,
}

impl Default for FrameGate {
    fn default() -> Self {
        Self::with_target_fps(DEFAULT_TARGET_FPS)
    }
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gate admitting at most `fps` frames per second
    pub fn with_target_fps(fps: f32) -> Self {
        Self {
            interval_ms: 1000.0 / fps as f64,
            last_ms: None,
        }
    }

    /// Returns true if a tick should run for this timestamp.
    ///
    /// The first timestamp is always admitted. An admitted frame stores its
    /// own timestamp, so rejected callbacks never shift the schedule.
    pub fn admit(&mut self, timestamp_ms: f64) -> bool {
        match self.last_ms {
            Some(last) if timestamp_ms - last < self.interval_ms => false,
            _ => {
                self.last_ms = Some(timestamp_ms);
                true
            }
        }
    }

    pub fn last_admitted(&self) -> Option<f64> {
        self.last_ms
    }

    /// Forget the last admitted frame so the next callback ticks immediately
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host_timestamps(hz: f64, count: usize) -> impl Iterator<Item = f64> {
        (0..count).map(move |k| k as f64 * 1000.0 / hz)
    }

    #[test]
    fn test_gate_defaults() {
        let gate = FrameGate::new();
        assert!((gate.interval_ms - 1000.0 / 45.0).abs() < 1e-10);
        assert_eq!(gate.last_admitted(), None);
    }

    #[test]
    fn test_first_timestamp_admitted() {
        let mut gate = FrameGate::new();
        assert!(gate.admit(12_345.0));
        assert_eq!(gate.last_admitted(), Some(12_345.0));
    }

    #[test]
    fn test_45fps_admits_every_other_60hz_callback() {
        let mut gate = FrameGate::new();
        let admitted: Vec<bool> = host_timestamps(60.0, 60).map(|ts| gate.admit(ts)).collect();
        assert_eq!(admitted.iter().filter(|a| **a).count(), 30);
        for (k, a) in admitted.iter().enumerate() {
            assert_eq!(*a, k % 2 == 0, "callback {k}");
        }
    }

    #[test]
    fn test_rejected_frames_do_not_move_schedule() {
        let mut gate = FrameGate::with_target_fps(10.0);
        assert!(gate.admit(0.0));
        assert!(!gate.admit(50.0));
        assert!(!gate.admit(99.0));
        assert!(gate.admit(100.0));
        assert_eq!(gate.last_admitted(), Some(100.0));
    }

    #[test]
    fn test_reset() {
        let mut gate = FrameGate::new();
        gate.admit(0.0);
        gate.reset();
        assert!(gate.admit(1.0));
    }
}
