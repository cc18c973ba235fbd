// crates/tableau-core/src/transform.rs
use glam::Vec2;

/// A position/scale pair. Nodes keep a local one (`position`, `scale`) and a
/// derived absolute one that the layout pass rewrites every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    pub scale: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        scale: 1.0,
    };

    pub fn new(position: Vec2, scale: f32) -> Self {
        Self { position, scale }
    }

    /// Absolute transform of a node without a parent.
    pub fn root(local: Transform) -> Self {
        Self {
            position: local.position * local.scale,
            scale: local.scale,
        }
    }

    /// Absolute transform of an unconstrained child, given its parent's
    /// already-updated absolute transform.
    pub fn compose(parent: Transform, local: Transform) -> Self {
        Self {
            position: parent.position + local.position * parent.scale,
            scale: parent.scale * local.scale,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_transform_law() {
        let local = Transform::new(Vec2::new(10.0, -4.0), 3.0);
        let absolute = Transform::root(local);
        assert_eq!(absolute.position, Vec2::new(30.0, -12.0));
        assert_eq!(absolute.scale, 3.0);
    }

    #[test]
    fn test_child_transform_law() {
        let parent = Transform::root(Transform::new(Vec2::new(50.0, 50.0), 2.0));
        assert_eq!(parent.position, Vec2::new(100.0, 100.0));

        let child = Transform::compose(parent, Transform::new(Vec2::new(10.0, 10.0), 1.0));
        assert_eq!(child.position, Vec2::new(120.0, 120.0));
        assert_eq!(child.scale, 2.0);
    }

    #[test]
    fn test_zero_scale_collapses_children() {
        let parent = Transform::new(Vec2::new(5.0, 5.0), 0.0);
        let child = Transform::compose(parent, Transform::new(Vec2::new(100.0, 100.0), 4.0));
        assert_eq!(child.position, Vec2::new(5.0, 5.0));
        assert_eq!(child.scale, 0.0);
    }
}
