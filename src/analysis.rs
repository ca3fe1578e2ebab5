pub mod aligner;
pub mod daily_table;
pub mod rolling;
pub mod sensitivity;
pub mod status_band;
pub mod trend;
pub mod verification;

pub use aligner::AlignedSeries;
pub use daily_table::build_daily_table;
pub use rolling::{average_latest, rolling_means};
pub use sensitivity::classify;
pub use status_band::{band3, band5};
pub use trend::trend_metric;
pub use verification::{verify_forecasts, PairStatistics};
