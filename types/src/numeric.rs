//! Rounding to a fixed number of decimal places.

/// Round `value` to `places` decimal places, halfway cases away from zero.
///
/// ```
/// use kitbag_types::precised;
///
/// assert_eq!(precised(2.123, 1), 2.1);
/// assert_eq!(precised(2.123, 2), 2.12);
/// ```
#[must_use]
pub fn precised(value: f64, places: i32) -> f64 {
    let offset = 10f64.powi(places);
    (value * offset).round() / offset
}

/// Compare two values after rounding both to `places` decimal places.
///
/// With `places == None` this is plain `==`.
#[must_use]
#[allow(clippy::float_cmp)] // equality after rounding is the point
pub fn approx_eq(lhs: f64, rhs: f64, places: Option<i32>) -> bool {
    match places {
        Some(places) => precised(lhs, places) == precised(rhs, places),
        None => lhs == rhs,
    }
}
