/// One-shot warm-up window that holds control off while the pose provider
/// acquires the marker.
#[derive(Debug, Clone, Copy)]
pub struct WarmupGate {
    start_time: f64,
    delay: f64,
}

impl WarmupGate {
    pub fn new(start_time: f64, delay: f64) -> Self {
        Self { start_time, delay }
    }

    /// Open once the elapsed time strictly exceeds the delay
    pub fn is_open(&self, now: f64) -> bool {
        now - self.start_time > self.delay
    }

    /// Seconds left before the gate opens (0 once open)
    pub fn remaining(&self, now: f64) -> f64 {
        (self.delay - (now - self.start_time)).max(0.0)
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn delay(&self) -> f64 {
        self.delay
    }
}
