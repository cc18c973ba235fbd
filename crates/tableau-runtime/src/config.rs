// crates/tableau-runtime/src/config.rs
use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

/// Host-facing settings for a [`crate::Session`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Root-space size every scene is authored against.
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Device pixels per point.
    pub device_pixel_ratio: f32,
    /// RGBA, drawn behind every scene.
    pub background_color: [f32; 4],
    /// Frame pacing for hosts that drive their own loop.
    pub frame_interval_ms: u64,
    /// Log every node's resolved transform.
    pub debug_layout: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 600.0,
            device_pixel_ratio: 1.0,
            background_color: [0.1, 0.1, 0.1, 1.0],
            frame_interval_ms: 16,
            debug_layout: false,
        }
    }
}

impl SessionOptions {
    pub fn canvas_size(&self) -> Vec2 {
        Vec2::new(self.canvas_width, self.canvas_height)
    }

    pub fn background_color(&self) -> Vec4 {
        Vec4::from_array(self.background_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SessionOptions::default();
        assert_eq!(options.canvas_size(), Vec2::new(800.0, 600.0));
        assert_eq!(options.background_color().w, 1.0);
        assert_eq!(options.frame_interval_ms, 16);
    }
}
