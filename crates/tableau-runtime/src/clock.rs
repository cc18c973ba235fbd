// crates/tableau-runtime/src/clock.rs
use tableau_core::TickContext;

/// Turns the host's frame timestamps into per-tick contexts.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    now: Option<f64>,
    frame_count: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a frame at `now` (milliseconds). A timestamp earlier than the
    /// previous one is treated as no time passing.
    pub fn advance(&mut self, now: f64, canvas_scale: f32) -> TickContext {
        let delta = self.now.map_or(0.0, |previous| (now - previous).max(0.0));
        let now = self.now.map_or(now, |previous| now.max(previous));
        self.now = Some(now);
        self.frame_count += 1;
        TickContext::new(now, delta, canvas_scale)
    }

    pub fn now(&self) -> f64 {
        self.now.unwrap_or(0.0)
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
