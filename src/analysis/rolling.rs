//! Trailing-window means for the geomap.

use crate::models::RollingMeans;
use crate::utils::round_to;

/// Window sizes shown on the map, in days
pub const GEOMAP_WINDOWS: [usize; 4] = [1, 7, 14, 30];

/// Decimal places of a windowed mean
const MEAN_PLACES: i32 = 3;

/// Mean of the last `min(window, len)` values of an oldest-to-newest series.
///
/// Returns `None` for an empty series or a zero window.
pub fn average_latest(series: &[f64], window: usize) -> Option<f64> {
    let take = window.min(series.len());
    if take == 0 {
        return None;
    }
    let tail = &series[series.len() - take..];
    Some(round_to(tail.iter().sum::<f64>() / take as f64, MEAN_PLACES))
}

/// Geomap means of one station.
///
/// `series` must be chronological. Zero and non-finite readings are empty
/// readings and are dropped before windowing.
pub fn rolling_means(series: &[f64]) -> RollingMeans {
    let finite: Vec<f64> = series
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v != 0.0)
        .collect();
    let [w1, w7, w14, w30] = GEOMAP_WINDOWS;

    RollingMeans {
        elev_mean_1: average_latest(&finite, w1),
        elev_mean_7: average_latest(&finite, w7),
        elev_mean_14: average_latest(&finite, w14),
        elev_mean_30: average_latest(&finite, w30),
    }
}
