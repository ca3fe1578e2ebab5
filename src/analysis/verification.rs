//! Multi-year forecast verification.
//!
//! Monthly observed/predicted pairs are grouped by calendar year and by
//! climatological season. Each year gets RMSE, bias, MAE, predicted range,
//! Nash-Sutcliffe efficiency, Kling-Gupta efficiency and R², and the whole
//! record set yields a year x month deviation heatmap.
//!
//! Degenerate inputs resolve to fixed values instead of NaN:
//!
//! - constant observed series: `nse = 1`, `alpha = 1`
//! - zero observed mean: `beta = 1`
//! - either series constant: `r = 0` (so `r2 = 0`); when *both* are
//!   constant the KGE correlation term is taken as 1, which keeps
//!   `kge = 1` for a pointwise-perfect constant forecast

use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::analysis_error::AnalysisError;
use crate::models::{
    ForecastRecord, HeatmapRow, MetricSummary, Season, SeasonSummary, VerificationResult,
    YearSummary,
};
use crate::utils::{round_to, split_yyyymm};

/// Spread, in units of machine epsilon relative to the data's magnitude,
/// below which a series counts as constant
const RELATIVE_ULPS: f64 = 16.0;

const MEAN_PLACES: i32 = 2;
const SCORE_PLACES: i32 = 3;
const DEVIATION_PLACES: i32 = 3;

/// Unrounded statistics of one set of observed/predicted pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairStatistics {
    pub count: usize,
    pub mean_observed: f64,
    pub mean_predicted: f64,
    pub bias: f64,
    pub mae: f64,
    pub range: f64,
    pub rmse: f64,
    pub nse: f64,
    pub r: f64,
    pub kge: f64,
    pub r2: f64,
}

impl PairStatistics {
    /// Compute every statistic for equally long, non-empty vectors.
    pub fn compute(observed: &[f64], predicted: &[f64]) -> Result<Self, AnalysisError> {
        if observed.len() != predicted.len() {
            return Err(AnalysisError::DimensionMismatch {
                observed: observed.len(),
                predicted: predicted.len(),
            });
        }
        if observed.is_empty() {
            return Err(AnalysisError::EmptyInput("verification statistics".to_string()));
        }

        let n = observed.len() as f64;
        let mean_observed = observed.iter().sum::<f64>() / n;
        let mean_predicted = predicted.iter().sum::<f64>() / n;

        let errors: Vec<f64> = predicted
            .iter()
            .zip(observed.iter())
            .map(|(p, o)| p - o)
            .collect();

        let bias = errors.iter().sum::<f64>() / n;
        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
        let sse: f64 = errors.iter().map(|e| e * e).sum();
        let rmse = (sse / n).sqrt();

        let max_p = predicted.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min_p = predicted.iter().copied().fold(f64::INFINITY, f64::min);
        let range = max_p - min_p;

        let ss_obs: f64 = observed.iter().map(|o| (o - mean_observed).powi(2)).sum();
        let ss_pred: f64 = predicted.iter().map(|p| (p - mean_predicted).powi(2)).sum();

        let observed_constant = is_negligible_spread(ss_obs, observed.len(), mean_observed);
        let predicted_constant = is_negligible_spread(ss_pred, predicted.len(), mean_predicted);

        let nse = if observed_constant {
            1.0
        } else {
            1.0 - sse / ss_obs
        };

        let r = if observed_constant || predicted_constant {
            0.0
        } else {
            let cov: f64 = observed
                .iter()
                .zip(predicted.iter())
                .map(|(o, p)| (o - mean_observed) * (p - mean_predicted))
                .sum();
            (cov / (ss_obs.sqrt() * ss_pred.sqrt())).clamp(-1.0, 1.0)
        };

        let std_observed = (ss_obs / n).sqrt();
        let std_predicted = (ss_pred / n).sqrt();
        let alpha = if observed_constant {
            1.0
        } else {
            std_predicted / std_observed
        };
        let beta = if is_negligible_mean(mean_observed, observed) {
            1.0
        } else {
            mean_predicted / mean_observed
        };

        let kge_r = if observed_constant && predicted_constant {
            1.0
        } else {
            r
        };
        let kge = 1.0 - ((kge_r - 1.0).powi(2) + (alpha - 1.0).powi(2) + (beta - 1.0).powi(2)).sqrt();

        Ok(Self {
            count: observed.len(),
            mean_observed,
            mean_predicted,
            bias,
            mae,
            range,
            rmse,
            nse,
            r,
            kge,
            r2: r * r,
        })
    }

    /// Display-rounded summary
    pub fn summary(&self) -> MetricSummary {
        MetricSummary {
            count: self.count,
            mean_predicted: round_to(self.mean_predicted, MEAN_PLACES),
            mean_observed: round_to(self.mean_observed, MEAN_PLACES),
            rmse: round_to(self.rmse, SCORE_PLACES),
            nse: round_to(self.nse, SCORE_PLACES),
            kge: round_to(self.kge, SCORE_PLACES),
            r2: round_to(self.r2, SCORE_PLACES),
            bias: round_to(self.bias, SCORE_PLACES),
            range: round_to(self.range, SCORE_PLACES),
            mae: round_to(self.mae, SCORE_PLACES),
        }
    }

    fn season_summary(&self, season: Season) -> SeasonSummary {
        SeasonSummary {
            season,
            count: self.count,
            rmse: round_to(self.rmse, SCORE_PLACES),
            bias: round_to(self.bias, SCORE_PLACES),
            range: round_to(self.range, SCORE_PLACES),
        }
    }
}

/// Sum of squared deviations indistinguishable from rounding noise at the
/// series' own scale.
fn is_negligible_spread(sum_squares: f64, count: usize, mean: f64) -> bool {
    let ulp = RELATIVE_ULPS * f64::EPSILON * mean.abs();
    sum_squares <= count as f64 * ulp * ulp
}

/// Mean indistinguishable from zero given the magnitude of the values.
fn is_negligible_mean(mean: f64, values: &[f64]) -> bool {
    let magnitude = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    mean.abs() <= RELATIVE_ULPS * f64::EPSILON * magnitude
}

/// Keep records with finite values and a real month.
fn usable_records(records: &[ForecastRecord]) -> Vec<&ForecastRecord> {
    let usable: Vec<&ForecastRecord> = records
        .iter()
        .filter(|r| {
            let (_, month) = split_yyyymm(r.yyyymm);
            r.observed.is_finite() && r.predicted.is_finite() && (1..=12).contains(&month)
        })
        .collect();

    let dropped = records.len() - usable.len();
    if dropped > 0 {
        warn!("Dropped {} forecast records with non-finite values or invalid months", dropped);
    }

    usable
}

fn observed_predicted(records: &[&ForecastRecord]) -> (Vec<f64>, Vec<f64>) {
    records.iter().map(|r| (r.observed, r.predicted)).unzip()
}

/// Summarize one year's records, seasons with no records omitted.
fn summarize_year(year: i32, records: &[&ForecastRecord]) -> Result<YearSummary, AnalysisError> {
    let (observed, predicted) = observed_predicted(records);
    let stats = PairStatistics::compute(&observed, &predicted)?;

    let mut seasons = Vec::new();
    for season in Season::ALL {
        let subset: Vec<&ForecastRecord> = records
            .iter()
            .copied()
            .filter(|r| Season::from_month(split_yyyymm(r.yyyymm).1) == Some(season))
            .collect();
        if subset.is_empty() {
            continue;
        }
        let (o, p) = observed_predicted(&subset);
        seasons.push(PairStatistics::compute(&o, &p)?.season_summary(season));
    }

    Ok(YearSummary {
        year,
        metrics: stats.summary(),
        seasons,
    })
}

/// Year x month deviation row; months without a record stay null.
/// A later record for the same month replaces an earlier one.
fn heatmap_row(year: i32, records: &[&ForecastRecord]) -> HeatmapRow {
    let mut values: Vec<Option<f64>> = vec![None; 12];
    for record in records {
        let (_, month) = split_yyyymm(record.yyyymm);
        let deviation = record.deviation();
        values[(month - 1) as usize] = if deviation.is_finite() {
            Some(round_to(deviation, DEVIATION_PLACES))
        } else {
            None
        };
    }
    HeatmapRow { year, values }
}

/// Verify a set of monthly forecast records.
pub fn verify_forecasts(records: &[ForecastRecord]) -> Result<VerificationResult, AnalysisError> {
    let usable = usable_records(records);

    let mut by_year: BTreeMap<i32, Vec<&ForecastRecord>> = BTreeMap::new();
    for record in &usable {
        let (year, _) = split_yyyymm(record.yyyymm);
        by_year.entry(year).or_default().push(*record);
    }

    let mut years = Vec::with_capacity(by_year.len());
    let mut heatmap = Vec::with_capacity(by_year.len());
    for (year, year_records) in &by_year {
        years.push(summarize_year(*year, year_records)?);
        heatmap.push(heatmap_row(*year, year_records));
    }

    let overall = if usable.is_empty() {
        None
    } else {
        let (o, p) = observed_predicted(&usable);
        Some(PairStatistics::compute(&o, &p)?.summary())
    };

    debug!(
        "Verified {} records across {} years",
        usable.len(),
        years.len()
    );

    Ok(VerificationResult {
        years,
        heatmap,
        overall,
    })
}
