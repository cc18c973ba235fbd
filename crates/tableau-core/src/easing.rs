// crates/tableau-core/src/easing.rs
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Easing curves for `move` and `scale` actions and slide transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    SineIn,
    SineOut,
    SineInOut,
}

impl Easing {
    /// Maps linear progress in [0, 1] onto the curve. Input outside the
    /// range is clamped, so every curve starts at 0 and ends at 1.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => t * (2.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::CubicIn => t * t * t,
            Easing::CubicOut => {
                let u = t - 1.0;
                u * u * u + 1.0
            }
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = 2.0 * t - 2.0;
                    0.5 * u * u * u + 1.0
                }
            }
            Easing::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Easing::SineOut => (t * PI / 2.0).sin(),
            Easing::SineInOut => -0.5 * ((PI * t).cos() - 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 10] = [
        Easing::Linear,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
        Easing::SineIn,
        Easing::SineOut,
        Easing::SineInOut,
    ];

    #[test]
    fn test_endpoints() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-6, "{:?} should start at 0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{:?} should end at 1", easing);
        }
    }

    #[test]
    fn test_linear_midpoint() {
        assert_eq!(Easing::Linear.apply(0.5), 0.5);
        assert_eq!(Easing::QuadIn.apply(0.5), 0.25);
        assert!((Easing::QuadInOut.apply(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_clamps_out_of_range() {
        assert_eq!(Easing::CubicOut.apply(2.0), 1.0);
        assert_eq!(Easing::QuadIn.apply(-1.0), 0.0);
    }
}
