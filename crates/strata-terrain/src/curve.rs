//! Response curves used to shape blend weights and height bands.

use serde::{Deserialize, Serialize};

/// Monotonic mapping of `[0, 1]` onto `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseCurve {
    /// `t`
    #[default]
    Linear,
    /// `t²`, slow start.
    Quadratic,
    /// `√t`, fast start.
    Root,
    /// `3t² - 2t³`, flat at both ends.
    SmoothStep,
}

impl ResponseCurve {
    /// Evaluates the curve. Input is clamped to `[0, 1]`.
    #[inline]
    pub fn eval(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Quadratic => t * t,
            Self::Root => t.sqrt(),
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// A response curve stretched over an output range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveRange {
    pub curve: ResponseCurve,
    pub from: f64,
    pub to: f64,
}

impl Default for CurveRange {
    fn default() -> Self {
        Self {
            curve: ResponseCurve::Linear,
            from: 0.0,
            to: 1.0,
        }
    }
}

impl CurveRange {
    pub fn new(curve: ResponseCurve, from: f64, to: f64) -> Self {
        Self { curve, from, to }
    }

    /// `from + (to - from) * curve(t)`.
    #[inline]
    pub fn eval(&self, t: f64) -> f64 {
        self.from + (self.to - self.from) * self.curve.eval(t)
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.from.is_finite() && self.to.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVES: [ResponseCurve; 4] = [
        ResponseCurve::Linear,
        ResponseCurve::Quadratic,
        ResponseCurve::Root,
        ResponseCurve::SmoothStep,
    ];

    #[test]
    fn test_curves_fix_endpoints() {
        for curve in CURVES {
            assert_eq!(curve.eval(0.0), 0.0, "{curve:?} at 0");
            assert_eq!(curve.eval(1.0), 1.0, "{curve:?} at 1");
        }
    }

    #[test]
    fn test_curves_clamp_input() {
        for curve in CURVES {
            assert_eq!(curve.eval(-3.0), 0.0);
            assert_eq!(curve.eval(7.5), 1.0);
        }
    }

    #[test]
    fn test_curves_monotonic() {
        for curve in CURVES {
            let mut last = curve.eval(0.0);
            for i in 1..=100 {
                let v = curve.eval(i as f64 / 100.0);
                assert!(v >= last, "{curve:?} decreased at step {i}");
                last = v;
            }
        }
    }

    #[test]
    fn test_curve_range_maps_onto_band() {
        let range = CurveRange::new(ResponseCurve::Quadratic, 10.0, 50.0);
        assert_eq!(range.eval(0.0), 10.0);
        assert_eq!(range.eval(0.5), 20.0);
        assert_eq!(range.eval(1.0), 50.0);
    }
}
