//! Percentile banding of a current reading.

use crate::models::{PercentileProfile, StatusBand3, StatusBand5};

/// Five-level band of `value` against its historical percentiles.
///
/// A missing profile, a non-finite percentile or a non-finite value yields
/// `NoData`, never a default band.
pub fn band5(value: Option<f64>, profile: Option<&PercentileProfile>) -> StatusBand5 {
    let (Some(v), Some(p)) = (value, profile) else {
        return StatusBand5::NoData;
    };
    if !v.is_finite() || !p.is_finite() {
        return StatusBand5::NoData;
    }

    if v > p.p90 {
        StatusBand5::VeryHigh
    } else if v > p.p75 {
        StatusBand5::High
    } else if v >= p.p25 {
        StatusBand5::Normal
    } else if v >= p.p10 {
        StatusBand5::Low
    } else {
        StatusBand5::VeryLow
    }
}

/// Three-level map color band: outside `[p10, p90]` is danger, outside
/// `[p25, p75]` is warning.
pub fn band3(value: Option<f64>, profile: Option<&PercentileProfile>) -> StatusBand3 {
    let (Some(v), Some(p)) = (value, profile) else {
        return StatusBand3::NoData;
    };
    if !v.is_finite() || !p.is_finite() {
        return StatusBand3::NoData;
    }

    if v < p.p10 || v > p.p90 {
        StatusBand3::Danger
    } else if v < p.p25 || v > p.p75 {
        StatusBand3::Warning
    } else {
        StatusBand3::Normal
    }
}
