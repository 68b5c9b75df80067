//! Angle helpers shared by the RPM model and the injector.

/// Floor `value` to a multiple of `step`.
/// - A non-positive or non-finite `step` leaves `value` untouched.
#[inline]
pub fn floor_step(value: f64, step: f64) -> f64 {
    if !(step.is_finite() && step > 0.0) {
        return value;
    }
    (value / step).floor() * step
}

/// Convert a B-axis reading to the tool tilt theta used by the formulas.
///
/// theta = 0 is the tool tip (centre), theta = 90 the tool side. Negative
/// results are floored at 0; the safety minimum is applied later.
#[inline]
pub fn b_to_theta(b_deg: f64) -> f64 {
    (90.0 - b_deg).max(0.0)
}
