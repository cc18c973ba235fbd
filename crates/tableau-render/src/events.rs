// crates/tableau-render/src/events.rs
use glam::Vec2;

/// Pointer input in device pixels, as delivered by a backend's event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    MouseMove { position: Vec2 },
    MousePress { position: Vec2, button: MouseButton },
    MouseRelease { position: Vec2, button: MouseButton },
    Resize { size: Vec2 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}
