//! Easing curves
//!
//! The power curves follow the usual tweening-library numbering where
//! `power1` is quadratic, `power2` cubic, `power3` quartic and `power4`
//! quintic.

use std::f32::consts::TAU;

/// Easing function applied to a tween's linear progress
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    #[default]
    Linear,
    /// Quadratic deceleration, the usual library default
    Power1Out,
    /// Cubic ease-in/ease-out
    Power2InOut,
    /// Quartic deceleration
    Power3Out,
    /// Quintic ease-in/ease-out
    Power4InOut,
    /// Overshoot past the end value, then oscillate and settle
    ElasticOut { amplitude: f32, period: f32 },
}

impl Easing {
    /// `elastic.out(1, 0.3)`
    pub const fn elastic_out() -> Self {
        Easing::ElasticOut {
            amplitude: 1.0,
            period: 0.3,
        }
    }

    /// Map linear progress `t` (0.0 to 1.0) onto the curve
    ///
    /// Input is clamped. Elastic curves may return values outside 0..1.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Easing::Linear => t,
            Easing::Power1Out => 1.0 - (1.0 - t).powi(2),
            Easing::Power2InOut => power_in_out(t, 3),
            Easing::Power3Out => 1.0 - (1.0 - t).powi(4),
            Easing::Power4InOut => power_in_out(t, 5),
            Easing::ElasticOut { amplitude, period } => elastic_out(t, amplitude, period),
        }
    }
}

fn power_in_out(t: f32, exponent: i32) -> f32 {
    if t < 0.5 {
        2f32.powi(exponent - 1) * t.powi(exponent)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(exponent) / 2.0
    }
}

fn elastic_out(t: f32, amplitude: f32, period: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let amplitude = amplitude.max(1.0);
    let period = if period > 0.0 { period } else { 0.3 };
    let phase = period / TAU * (1.0 / amplitude).asin();
    amplitude * 2f32.powf(-10.0 * t) * ((t - phase) * TAU / period).sin() + 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVES: [Easing; 6] = [
        Easing::Linear,
        Easing::Power1Out,
        Easing::Power2InOut,
        Easing::Power3Out,
        Easing::Power4InOut,
        Easing::elastic_out(),
    ];

    #[test]
    fn test_endpoints() {
        for easing in CURVES {
            assert!(easing.apply(0.0).abs() < 1e-4, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-4, "{easing:?} at 1");
        }
    }

    #[test]
    fn test_in_out_symmetry() {
        for easing in [Easing::Power2InOut, Easing::Power4InOut] {
            assert!((easing.apply(0.5) - 0.5).abs() < 1e-4);
            let a = easing.apply(0.2);
            let b = easing.apply(0.8);
            assert!((a + b - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_power_out_decelerates() {
        // Most of the distance is covered early
        assert!(Easing::Power3Out.apply(0.25) > 0.6);
        assert_eq!(Easing::Power1Out.apply(0.5), 0.75);
    }

    #[test]
    fn test_elastic_overshoots() {
        let peak = (1..100)
            .map(|i| Easing::elastic_out().apply(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_input_is_clamped() {
        assert_eq!(Easing::Linear.apply(-1.0), 0.0);
        assert_eq!(Easing::Linear.apply(2.0), 1.0);
    }
}
