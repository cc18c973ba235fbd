// crates/tableau-core/src/tick.rs

/// Per-frame context handed down the update and draw traversals.
///
/// Times are milliseconds on the host's clock. Nothing in the engine reads
/// the wall clock directly, so tests drive it with plain numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    pub now: f64,
    pub delta: f64,
    /// Root space to device pixels.
    pub canvas_scale: f32,
}

impl TickContext {
    pub fn new(now: f64, delta: f64, canvas_scale: f32) -> Self {
        Self {
            now,
            delta,
            canvas_scale,
        }
    }

    pub fn at(now: f64) -> Self {
        Self::new(now, 0.0, 1.0)
    }
}

impl Default for TickContext {
    fn default() -> Self {
        Self::at(0.0)
    }
}
