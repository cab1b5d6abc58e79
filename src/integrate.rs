//! Acceleration to velocity/displacement conversion.

use crate::types::Units;

/// Cumulative trapezoidal integral of `samples` with sample spacing `delta`.
///
/// The output has the same length as the input and starts at zero.
///
/// ```
/// use dmg_rs::integrate::cumulative_trapezoid;
///
/// let out = cumulative_trapezoid(&[1.0, 1.0, 1.0], 0.5);
/// assert_eq!(out, vec![0.0, 0.5, 1.0]);
/// ```
pub fn cumulative_trapezoid(samples: &[f64], delta: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(samples.len());
    let mut total = 0.0;
    let mut previous = None;
    for &value in samples {
        if let Some(prev) = previous {
            total += 0.5 * (prev + value) * delta;
        }
        out.push(total);
        previous = Some(value);
    }
    out
}

/// Convert an acceleration series (cm/s^2) into the requested units.
///
/// `Acc` hands the input back untouched; `Vel` integrates once (cm/s) and
/// `Disp` twice (cm).
pub fn convert(acceleration: Vec<f64>, delta: f64, units: Units) -> Vec<f64> {
    match units {
        Units::Acc => acceleration,
        Units::Vel => cumulative_trapezoid(&acceleration, delta),
        Units::Disp => {
            let velocity = cumulative_trapezoid(&acceleration, delta);
            cumulative_trapezoid(&velocity, delta)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_single() {
        assert!(cumulative_trapezoid(&[], 0.01).is_empty());
        assert_eq!(cumulative_trapezoid(&[5.0], 0.01), vec![0.0]);
    }

    #[test]
    fn test_linear_ramp() {
        // Integral of t over [0, 4] with dt = 1 is exact under the trapezoid rule.
        let acc = [0.0, 1.0, 2.0, 3.0, 4.0];
        assert_eq!(cumulative_trapezoid(&acc, 1.0), vec![0.0, 0.5, 2.0, 4.5, 8.0]);
    }

    #[test]
    fn test_convert_preserves_length() {
        let acc: Vec<f64> = (0..100).map(|i| (i as f64 * 0.1).sin()).collect();
        for units in [Units::Acc, Units::Vel, Units::Disp] {
            assert_eq!(convert(acc.clone(), 0.005, units).len(), acc.len());
        }
    }

    #[test]
    fn test_convert_acc_is_identity() {
        let acc = vec![1.5, -2.0, 3.25];
        assert_eq!(convert(acc.clone(), 0.01, Units::Acc), acc);
    }

    #[test]
    fn test_constant_acceleration_displacement() {
        // a = 2 over 10 steps of 0.1 s: v = 2t, d = t^2 (trapezoid is exact for v).
        let acc = vec![2.0; 11];
        let vel = convert(acc.clone(), 0.1, Units::Vel);
        assert!((vel[10] - 2.0).abs() < 1e-12);
        let disp = convert(acc, 0.1, Units::Disp);
        assert!((disp[10] - 1.0).abs() < 1e-12);
    }
}
