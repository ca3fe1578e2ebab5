#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("Observed/predicted length mismatch: {observed} observed vs {predicted} predicted")]
    DimensionMismatch { observed: usize, predicted: usize },
    #[error("No input to compute {0}")]
    EmptyInput(String),
    #[error("Invalid date key: {0}")]
    InvalidDate(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
