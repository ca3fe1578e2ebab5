/// Shared helpers for the groundwater analysis core
///
/// Round a value to a fixed number of decimal places for display
///
/// Results are displayed rather than computed on further, so every
/// numeric output passes through here. `-0.0` is normalized to `0.0` and
/// non-finite values pass through unchanged.
///
/// # Examples
///
/// ```
/// use groundwater_insight::utils::round_to;
///
/// assert_eq!(round_to(99.12345, 3), 99.123);
/// assert_eq!(round_to(0.4999, 2), 0.5);
/// assert_eq!(round_to(-0.0001, 2), 0.0);
/// ```
pub fn round_to(value: f64, places: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(places);
    normalize_zero((value * factor).round() / factor)
}

/// Round an optional value, mapping non-finite results to `None`
pub fn round_opt(value: Option<f64>, places: i32) -> Option<f64> {
    value.filter(|v| v.is_finite()).map(|v| round_to(v, places))
}

/// Normalize -0.0 to 0.0 for cleaner API responses
pub fn normalize_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

/// Width class of a fixed-width date key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateKeyKind {
    /// `YYYYMMDD`
    Daily,
    /// `YYYYMM`
    Monthly,
}

/// Classify and validate a date key
///
/// Daily keys must be a real calendar date, monthly keys a real
/// year/month. Anything else is rejected.
///
/// # Examples
///
/// ```
/// use groundwater_insight::utils::{date_key_kind, DateKeyKind};
///
/// assert_eq!(date_key_kind("20250101").unwrap(), DateKeyKind::Daily);
/// assert_eq!(date_key_kind("202512").unwrap(), DateKeyKind::Monthly);
/// assert!(date_key_kind("20250230").is_err());
/// assert!(date_key_kind("2025-01-01").is_err());
/// ```
pub fn date_key_kind(key: &str) -> Result<DateKeyKind, crate::analysis_error::AnalysisError> {
    use crate::analysis_error::AnalysisError;
    use chrono::NaiveDate;

    if !key.chars().all(|c| c.is_ascii_digit()) {
        return Err(AnalysisError::InvalidDate(key.to_string()));
    }

    match key.len() {
        8 => NaiveDate::parse_from_str(key, "%Y%m%d")
            .map(|_| DateKeyKind::Daily)
            .map_err(|_| AnalysisError::InvalidDate(key.to_string())),
        6 => NaiveDate::parse_from_str(&format!("{key}01"), "%Y%m%d")
            .map(|_| DateKeyKind::Monthly)
            .map_err(|_| AnalysisError::InvalidDate(key.to_string())),
        _ => Err(AnalysisError::InvalidDate(key.to_string())),
    }
}

/// Split a `YYYYMM` period into `(year, month)`
pub fn split_yyyymm(yyyymm: u32) -> (i32, u32) {
    ((yyyymm / 100) as i32, yyyymm % 100)
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_three_places() {
        assert_eq!(round_to(100.12349, 3), 100.123);
        assert_eq!(round_to(100.1236, 3), 100.124);
    }

    #[test]
    fn test_round_to_keeps_nan() {
        assert!(round_to(f64::NAN, 2).is_nan());
    }

    #[test]
    fn test_round_opt_drops_non_finite() {
        assert_eq!(round_opt(Some(f64::INFINITY), 2), None);
        assert_eq!(round_opt(None, 2), None);
        assert_eq!(round_opt(Some(1.005_1), 2), Some(1.01));
    }

    #[test]
    fn test_normalize_negative_zero() {
        assert!(normalize_zero(-0.0).is_sign_positive());
    }

    #[test]
    fn test_date_key_kind_daily() {
        assert_eq!(date_key_kind("20240229").unwrap(), DateKeyKind::Daily);
    }

    #[test]
    fn test_date_key_kind_invalid_leap_day() {
        assert!(date_key_kind("20250229").is_err());
    }

    #[test]
    fn test_date_key_kind_monthly() {
        assert_eq!(date_key_kind("202401").unwrap(), DateKeyKind::Monthly);
        assert!(date_key_kind("202413").is_err());
        assert!(date_key_kind("202400").is_err());
    }

    #[test]
    fn test_date_key_kind_wrong_width() {
        assert!(date_key_kind("2025010").is_err());
        assert!(date_key_kind("").is_err());
    }

    #[test]
    fn test_split_yyyymm() {
        assert_eq!(split_yyyymm(202412), (2024, 12));
        assert_eq!(split_yyyymm(202501), (2025, 1));
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
    }
}
