//! Rainfall/drought response classification.

use crate::models::{ClassifiedSensitivity, SensitivityRecord, SensitivityType};

/// Magnitude gap below which a station responds to both conditions alike
pub const DEFAULT_COMPOSITE_THRESHOLD: f64 = 0.05;

/// Classify one station's response.
///
/// The composite check runs first; only a gap at or above `threshold`
/// falls through to the rainfall/drought comparison. The gap is taken on
/// millimetre-scaled values to avoid false precision at the third decimal.
/// Non-finite magnitudes are not classified.
pub fn classify(rainfall: f64, drought: f64, threshold: f64) -> Option<SensitivityType> {
    if !rainfall.is_finite() || !drought.is_finite() {
        return None;
    }

    let diff = (rainfall * 1000.0 - drought * 1000.0).abs() / 1000.0;

    if diff < threshold {
        Some(SensitivityType::Composite)
    } else if rainfall > drought {
        Some(SensitivityType::Rainfall)
    } else {
        Some(SensitivityType::Drought)
    }
}

pub fn classify_record(record: &SensitivityRecord, threshold: f64) -> ClassifiedSensitivity {
    ClassifiedSensitivity {
        record: record.clone(),
        sensitive_type: classify(
            record.increase_if_rainfall,
            record.decrease_if_drought,
            threshold,
        ),
    }
}
