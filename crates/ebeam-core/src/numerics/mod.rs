use serde::{Deserialize, Serialize};

const EXACT_INTEGER_LIMIT: f64 = 4_503_599_627_370_496.0; // 2^52

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct NumericTolerance {
    #[serde(rename = "absTol")]
    pub abs_tol: f64,
    #[serde(rename = "relTol")]
    pub rel_tol: f64,
    #[serde(rename = "relativeFloor")]
    pub relative_floor: f64,
}

impl NumericTolerance {
    /// Tolerance matching a value that was rounded to `decimals` places.
    pub fn for_rounding(decimals: u32) -> Self {
        Self {
            abs_tol: 0.5 * 10f64.powi(-(decimals as i32)),
            rel_tol: 1.0e-12,
            relative_floor: 1.0e-300,
        }
    }

    pub fn accepts(&self, lhs: f64, rhs: f64) -> bool {
        within_tolerance(lhs, rhs, self.abs_tol, self.rel_tol, self.relative_floor)
    }
}

/// Round half-to-even at `decimals` places after the point.
///
/// Values whose scaled magnitude no longer carries a fractional part, and
/// non-finite values, are returned unchanged.
pub fn round_to_decimals(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let scale = 10f64.powi(decimals as i32);
    let scaled = value * scale;
    if !scaled.is_finite() || scaled.abs() >= EXACT_INTEGER_LIMIT {
        return value;
    }

    scaled.round_ties_even() / scale
}

pub fn relative_difference(lhs: f64, rhs: f64, relative_floor: f64) -> f64 {
    let scale = lhs.abs().max(rhs.abs()).max(relative_floor);
    (lhs - rhs).abs() / scale
}

pub fn within_tolerance(
    lhs: f64,
    rhs: f64,
    abs_tol: f64,
    rel_tol: f64,
    relative_floor: f64,
) -> bool {
    let abs_diff = (lhs - rhs).abs();
    abs_diff <= abs_tol || relative_difference(lhs, rhs, relative_floor) <= rel_tol
}

/// Determinant of the symmetric 2x2 matrix `[[a, b], [b, c]]`.
pub fn symmetric_determinant(a: f64, b: f64, c: f64) -> f64 {
    a * c - b * b
}
