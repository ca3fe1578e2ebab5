//! Latest reading and its relative position within the observed range.

use crate::models::TrendMetric;
use crate::utils::{round_opt, round_to};

const ELEVATION_PLACES: i32 = 2;
const POSITION_PLACES: i32 = 3;

/// Position reported for a single point or a flat series
pub const MID_RANGE_POSITION: f64 = 0.5;

/// Compute the trend indicator of one station from `(date, elevation)` pairs.
///
/// Non-finite elevations are ignored. With no finite reading every field is
/// `None`. With fewer than two readings, or when max equals min, the
/// position is mid-range rather than undefined.
pub fn trend_metric(readings: &[(String, f64)]) -> TrendMetric {
    let mut finite: Vec<&(String, f64)> = readings.iter().filter(|(_, v)| v.is_finite()).collect();
    if finite.is_empty() {
        return TrendMetric::default();
    }

    finite.sort_by(|a, b| a.0.cmp(&b.0));

    let Some(last) = finite.last() else {
        return TrendMetric::default();
    };
    let (latest_ymd, latest) = (&last.0, last.1);
    let min = finite.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
    let max = finite.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);

    let position = if finite.len() >= 2 && max != min {
        ((latest - min) / (max - min)).clamp(0.0, 1.0)
    } else {
        MID_RANGE_POSITION
    };

    TrendMetric {
        position: Some(round_to(position, POSITION_PLACES)),
        latest_elev: round_opt(Some(latest), ELEVATION_PLACES),
        latest_ymd: Some(latest_ymd.clone()),
        min_elev: round_opt(Some(min), ELEVATION_PLACES),
        max_elev: round_opt(Some(max), ELEVATION_PLACES),
    }
}
