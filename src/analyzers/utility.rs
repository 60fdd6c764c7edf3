/// Divides `numerator` by `denominator`, returning 0.0 when the denominator
/// is zero (or not a positive finite number of trips/fares to divide by).
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    numerator / denominator
}

/// Sums a field over a slice of rows.
pub fn sum_by<T>(rows: &[T], field: impl Fn(&T) -> f64) -> f64 {
    rows.iter().map(field).sum()
}
