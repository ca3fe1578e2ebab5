use tracing::{info, instrument};

use crate::analysis::verify_forecasts;
use crate::analysis_error::AnalysisError;
use crate::models::{VerificationRequest, VerificationResult};

/// Historical forecast performance views.
#[derive(Clone, Default)]
pub struct VerificationService;

impl VerificationService {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self, request), fields(records = request.records.len()))]
    pub fn verify(&self, request: &VerificationRequest) -> Result<VerificationResult, AnalysisError> {
        let result = verify_forecasts(&request.records)?;

        if let Some(overall) = &result.overall {
            info!(
                "Verified {} years, overall rmse {:.3}, nse {:.3}, kge {:.3}",
                result.years.len(),
                overall.rmse,
                overall.nse,
                overall.kge
            );
        } else {
            info!("No usable forecast records to verify");
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ForecastRecord;

    #[test]
    fn test_verify_request() {
        let request = VerificationRequest {
            records: vec![
                ForecastRecord::new(202401, 100.0, 100.0),
                ForecastRecord::new(202402, 100.0, 100.0),
                ForecastRecord::new(202403, 100.0, 100.0),
            ],
        };

        let result = VerificationService::new().verify(&request).unwrap();
        let year = &result.years[0];

        assert_eq!(year.metrics.rmse, 0.0);
        assert_eq!(year.metrics.nse, 1.0);
        assert_eq!(year.metrics.kge, 1.0);
        assert_eq!(year.metrics.r2, 0.0);
    }
}
