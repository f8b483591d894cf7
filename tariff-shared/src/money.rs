//! Output rounding. Everything upstream of a response works in full precision.

/// Rounds a currency amount to cents.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Rounds a margin ratio to four places (hundredths of a percent).
pub fn round4(v: f64) -> f64 {
    if !v.is_finite() {
        return v;
    }
    (v * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_keeps_infinities() {
        assert_eq!(round2(190.0912), 190.09);
        assert_eq!(round4(0.123456), 0.1235);
        assert_eq!(round4(f64::INFINITY), f64::INFINITY);
        assert_eq!(round4(f64::NEG_INFINITY), f64::NEG_INFINITY);
    }
}
