use std::env;
use std::time::Duration;

use crate::analysis::sensitivity::DEFAULT_COMPOSITE_THRESHOLD;
use crate::analysis_error::AnalysisError;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// Time budget of a single aggregation call
    pub aggregation_timeout_secs: u64,
    pub sensitivity_threshold: f64,
}

impl Config {
    pub fn from_env() -> Result<Self, AnalysisError> {
        let sensitivity_threshold = match env::var("SENSITIVITY_THRESHOLD") {
            Ok(raw) => raw.trim().parse::<f64>().map_err(|e| {
                AnalysisError::InvalidConfig(format!("SENSITIVITY_THRESHOLD={raw}: {e}"))
            })?,
            Err(_) => DEFAULT_COMPOSITE_THRESHOLD,
        };
        if !sensitivity_threshold.is_finite() || sensitivity_threshold < 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "SENSITIVITY_THRESHOLD must be a non-negative number, got {sensitivity_threshold}"
            )));
        }

        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            aggregation_timeout_secs: env::var("AGGREGATION_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            sensitivity_threshold,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn aggregation_timeout(&self) -> Duration {
        Duration::from_secs(self.aggregation_timeout_secs.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 8080,
            aggregation_timeout_secs: 10,
            sensitivity_threshold: DEFAULT_COMPOSITE_THRESHOLD,
        }
    }
}
