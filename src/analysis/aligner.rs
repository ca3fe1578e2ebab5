//! Calendar alignment of sparse per-station series.
//!
//! Builds the sorted union of every date key seen in a batch and a single
//! `date -> station -> value` lookup, so table construction is one pass over
//! the calendar instead of a per-date scan of every station.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, warn};

use crate::models::{Measurement, ObservationPoint};
use crate::utils::{date_key_kind, DateKeyKind};

/// Sparse series aligned onto a dense calendar.
#[derive(Debug, Clone, Default)]
pub struct AlignedSeries {
    calendar: Vec<String>,
    stations: Vec<String>,
    lookup: HashMap<String, HashMap<String, f64>>,
}

impl AlignedSeries {
    /// Align every station's readings of `measurement`.
    ///
    /// Stations listed in `expected` but absent from `stations` get a column
    /// with no values. Date keys must be one fixed width per batch (the
    /// width of the first valid key wins); malformed keys are dropped.
    /// A reading whose value is not finite keeps its date on the calendar
    /// but leaves the cell empty. Duplicate dates keep the last reading.
    pub fn align(
        stations: &BTreeMap<String, Vec<ObservationPoint>>,
        measurement: Measurement,
        expected: &[String],
    ) -> Self {
        let mut calendar = BTreeSet::new();
        let mut lookup: HashMap<String, HashMap<String, f64>> = HashMap::new();
        let mut batch_kind: Option<DateKeyKind> = None;
        let mut dropped = 0usize;

        for (station_id, points) in stations {
            for point in points {
                let key = point.date.trim();
                let kind = match date_key_kind(key) {
                    Ok(kind) => kind,
                    Err(e) => {
                        debug!("Station {}: {}", station_id, e);
                        dropped += 1;
                        continue;
                    }
                };

                match batch_kind {
                    None => batch_kind = Some(kind),
                    Some(expected_kind) if expected_kind != kind => {
                        debug!(
                            "Station {}: key {} does not match batch width {:?}",
                            station_id, key, expected_kind
                        );
                        dropped += 1;
                        continue;
                    }
                    Some(_) => {}
                }

                calendar.insert(key.to_string());

                let value = point.value_of(measurement);
                let row = lookup.entry(key.to_string()).or_default();
                if value.is_finite() {
                    row.insert(station_id.clone(), value);
                } else {
                    row.remove(station_id);
                }
            }
        }

        if dropped > 0 {
            warn!("Dropped {} observations with malformed date keys", dropped);
        }

        let station_set: BTreeSet<String> = stations
            .keys()
            .cloned()
            .chain(expected.iter().cloned())
            .collect();

        let aligned = Self {
            calendar: calendar.into_iter().collect(),
            stations: station_set.into_iter().collect(),
            lookup,
        };

        debug!(
            "Aligned {} stations onto {} dates",
            aligned.stations.len(),
            aligned.calendar.len()
        );

        aligned
    }

    /// Sorted, duplicate-free date keys
    pub fn calendar(&self) -> &[String] {
        &self.calendar
    }

    /// Sorted station ids, including expected stations with no data
    pub fn stations(&self) -> &[String] {
        &self.stations
    }

    /// Value of `station` on `date`, `None` when not observed
    pub fn value(&self, date: &str, station: &str) -> Option<f64> {
        self.lookup
            .get(date)
            .and_then(|row| row.get(station))
            .copied()
    }

    /// Chronological values of one station, skipping gaps
    pub fn station_values(&self, station: &str) -> Vec<f64> {
        self.calendar
            .iter()
            .filter_map(|date| self.value(date, station))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.calendar.is_empty()
    }
}
