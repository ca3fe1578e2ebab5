use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

use crate::analysis::{build_daily_table, rolling_means, trend_metric, AlignedSeries};
use crate::models::{Measurement, OverviewRequest, OverviewResult};

/// Current-state views of a batch of station series: daily table, geomap
/// means and trend indicators.
#[derive(Clone, Default)]
pub struct ObservationService;

impl ObservationService {
    pub fn new() -> Self {
        Self
    }

    /// Build the overview for one already-fetched batch.
    ///
    /// Never fails: a station with no usable readings degrades to empty
    /// cells and null indicators and is listed in `missing_stations`.
    #[instrument(skip(self, request), fields(stations = request.stations.len(), measurement = ?request.measurement))]
    pub fn build_overview(&self, request: &OverviewRequest) -> OverviewResult {
        let aligned = AlignedSeries::align(
            &request.stations,
            request.measurement,
            &request.expected_stations,
        );
        let table = build_daily_table(&aligned);
        debug!("Built daily table with {} rows", table.rows.len());

        // Geomap and trend always read elevation, under the same batch rules
        let elevation = if request.measurement == Measurement::Elevation {
            None
        } else {
            Some(AlignedSeries::align(
                &request.stations,
                Measurement::Elevation,
                &request.expected_stations,
            ))
        };
        let elevation = elevation.as_ref().unwrap_or(&aligned);

        let mut geomap = BTreeMap::new();
        let mut trend = BTreeMap::new();
        let mut missing_stations = Vec::new();

        for station_id in aligned.stations() {
            let readings = Self::elevation_readings(elevation, station_id);
            let elevations: Vec<f64> = readings.iter().map(|(_, v)| *v).collect();

            let means = rolling_means(&elevations);
            let metric = trend_metric(&readings);

            if metric.latest_elev.is_none() && aligned.station_values(station_id).is_empty() {
                missing_stations.push(station_id.clone());
            }

            geomap.insert(station_id.clone(), means);
            trend.insert(station_id.clone(), metric);
        }

        if !missing_stations.is_empty() {
            warn!(
                "{} stations have no usable readings: {:?}",
                missing_stations.len(),
                missing_stations
            );
        }

        info!(
            "Overview built for {} stations over {} dates",
            aligned.stations().len(),
            aligned.calendar().len()
        );

        OverviewResult {
            table,
            geomap,
            trend,
            missing_stations,
        }
    }

    /// Chronological `(date, elevation)` pairs of one station on the calendar
    fn elevation_readings(elevation: &AlignedSeries, station_id: &str) -> Vec<(String, f64)> {
        elevation
            .calendar()
            .iter()
            .filter_map(|date| {
                elevation
                    .value(date, station_id)
                    .map(|value| (date.clone(), value))
            })
            .collect()
    }
}
