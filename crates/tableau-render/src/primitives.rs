// crates/tableau-render/src/primitives.rs
use glam::Vec2;

/// Axis-aligned box in device pixels, stored as its two corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::from_position_size(Vec2::new(x, y), Vec2::new(width, height))
    }

    pub fn from_position_size(position: Vec2, size: Vec2) -> Self {
        Self {
            min: position,
            max: position + size,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Edges count as inside.
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }
}

/// Named colors and conversions into `Vec4` RGBA.
pub mod color {
    use glam::Vec4;

    pub const TRANSPARENT: Vec4 = Vec4::ZERO;
    pub const BLACK: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Vec4 = Vec4::ONE;
    pub const RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Vec4 = Vec4::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0);
    pub const GRAY: Vec4 = Vec4::new(0.5, 0.5, 0.5, 1.0);

    /// `0xRRGGBBAA`
    pub fn from_hex(hex: u32) -> Vec4 {
        let [r, g, b, a] = hex.to_be_bytes();
        from_rgba(r, g, b, a)
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Vec4 {
        from_rgba(r, g, b, u8::MAX)
    }

    pub fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Vec4 {
        Vec4::new(r as f32, g as f32, b as f32, a as f32) / 255.0
    }
}
