//! Rounding rules shared by ingestion and reporting
//!
//! Halves round up (2.5 -> 3), matching how values were always shown in the
//! product. Every helper maps non-finite input to zero.

/// Round to the nearest whole number, halves up
pub fn round_whole(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    (value + 0.5).floor() as i64
}

/// Round to one decimal place
pub fn round_tenth(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 10.0).round() / 10.0
}

/// `round(100 * part / whole)`, or 0 when `whole` is zero
pub fn percent_of(part: i64, whole: i64) -> i64 {
    if whole == 0 {
        return 0;
    }
    round_whole(part as f64 * 100.0 / whole as f64)
}

/// Like [`percent_of`], capped at 100
pub fn capped_percent_of(part: i64, whole: i64) -> i64 {
    percent_of(part, whole).min(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_whole_halves_up() {
        assert_eq!(round_whole(2.5), 3);
        assert_eq!(round_whole(2.49), 2);
        assert_eq!(round_whole(0.0), 0);
        assert_eq!(round_whole(f64::NAN), 0);
        assert_eq!(round_whole(f64::INFINITY), 0);
    }

    #[test]
    fn test_round_tenth() {
        assert_eq!(round_tenth(5.0), 5.0);
        assert_eq!(round_tenth(4.96), 5.0);
        assert_eq!(round_tenth(-2.34), -2.3);
    }

    #[test]
    fn test_percent_of_zero_whole() {
        assert_eq!(percent_of(10, 0), 0);
        assert_eq!(capped_percent_of(10, 0), 0);
    }

    #[test]
    fn test_capped_percent_of() {
        assert_eq!(capped_percent_of(2500, 2000), 100);
        assert_eq!(capped_percent_of(1000, 2000), 50);
        assert_eq!(percent_of(2500, 2000), 125);
    }
}
