use tracing::{debug, instrument};

use crate::analysis::sensitivity::classify_record;
use crate::analysis::{band3, band5};
use crate::analysis_error::AnalysisError;
use crate::models::{
    BandCounts, SensitivityRequest, SensitivityResult, StationStatus, StatusBand5, StatusRequest,
    StatusResult,
};

/// Station classification from precomputed scalar summaries.
#[derive(Clone)]
pub struct ClassificationService {
    sensitivity_threshold: f64,
}

impl ClassificationService {
    pub fn new(sensitivity_threshold: f64) -> Result<Self, AnalysisError> {
        if !sensitivity_threshold.is_finite() || sensitivity_threshold < 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "sensitivity threshold must be a non-negative number, got {sensitivity_threshold}"
            )));
        }
        Ok(Self {
            sensitivity_threshold,
        })
    }

    pub fn sensitivity_threshold(&self) -> f64 {
        self.sensitivity_threshold
    }

    #[instrument(skip(self, request), fields(stations = request.stations.len()))]
    pub fn classify_sensitivity(&self, request: &SensitivityRequest) -> SensitivityResult {
        let stations: Vec<_> = request
            .stations
            .iter()
            .map(|record| classify_record(record, self.sensitivity_threshold))
            .collect();

        let unclassified = stations.iter().filter(|s| s.sensitive_type.is_none()).count();
        debug!(
            "Classified {} stations ({} without finite magnitudes)",
            stations.len(),
            unclassified
        );

        SensitivityResult { stations }
    }

    #[instrument(skip(self, request), fields(stations = request.stations.len()))]
    pub fn band_statuses(&self, request: &StatusRequest) -> StatusResult {
        let mut band_counts = BandCounts::default();

        let stations: Vec<StationStatus> = request
            .stations
            .iter()
            .map(|input| {
                let profile = input.percentiles.as_ref();
                let status = StationStatus {
                    station_id: input.station_id.clone(),
                    value: input.value.filter(|v| v.is_finite()),
                    band5: band5(input.value, profile),
                    band3: band3(input.value, profile),
                };
                match status.band5 {
                    StatusBand5::VeryHigh => band_counts.very_high += 1,
                    StatusBand5::High => band_counts.high += 1,
                    StatusBand5::Normal => band_counts.normal += 1,
                    StatusBand5::Low => band_counts.low += 1,
                    StatusBand5::VeryLow => band_counts.very_low += 1,
                    StatusBand5::NoData => band_counts.no_data += 1,
                }
                status
            })
            .collect();

        debug!("Banded {} stations: {:?}", stations.len(), band_counts);

        StatusResult {
            stations,
            band_counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        PercentileProfile, SensitivityRecord, SensitivityType, StationStatusInput, StatusBand3,
    };

    #[test]
    fn test_rejects_invalid_threshold() {
        assert!(ClassificationService::new(-0.1).is_err());
        assert!(ClassificationService::new(f64::NAN).is_err());
        assert!(ClassificationService::new(0.05).is_ok());
    }

    #[test]
    fn test_classify_sensitivity_uses_threshold() {
        let request = SensitivityRequest {
            stations: vec![SensitivityRecord {
                station_id: "5724".to_string(),
                increase_if_rainfall: 0.30,
                decrease_if_drought: 0.20,
                range_variation: None,
            }],
        };

        let strict = ClassificationService::new(0.05).unwrap();
        assert_eq!(
            strict.classify_sensitivity(&request).stations[0].sensitive_type,
            Some(SensitivityType::Rainfall)
        );

        let loose = ClassificationService::new(0.2).unwrap();
        assert_eq!(
            loose.classify_sensitivity(&request).stations[0].sensitive_type,
            Some(SensitivityType::Composite)
        );
    }

    #[test]
    fn test_band_statuses_counts() {
        let profile = PercentileProfile {
            p10: 90.0,
            p25: 95.0,
            p75: 105.0,
            p90: 110.0,
        };
        let request = StatusRequest {
            stations: vec![
                StationStatusInput {
                    station_id: "5724".to_string(),
                    value: Some(107.0),
                    percentiles: Some(profile),
                },
                StationStatusInput {
                    station_id: "9100".to_string(),
                    value: Some(100.0),
                    percentiles: None,
                },
            ],
        };

        let result = ClassificationService::new(0.05)
            .unwrap()
            .band_statuses(&request);

        assert_eq!(result.stations[0].band5, StatusBand5::High);
        assert_eq!(result.stations[0].band3, StatusBand3::Warning);
        assert_eq!(result.stations[1].band5, StatusBand5::NoData);
        assert_eq!(result.band_counts.high, 1);
        assert_eq!(result.band_counts.no_data, 1);
    }
}
