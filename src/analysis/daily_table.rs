//! Wide daily table and its day-over-day difference table.

use std::collections::BTreeMap;

use super::aligner::AlignedSeries;
use crate::models::{DailyCell, DailyTable, DailyTableRow, DiffTableRow};
use crate::utils::round_opt;

/// Decimal places of the difference values
const DIFF_PLACES: i32 = 3;

/// Build the value table and the parallel difference table.
///
/// Every calendar date gets a row even when no station reported. The diff
/// convention is `previous - current`, so a falling level is positive.
pub fn build_daily_table(aligned: &AlignedSeries) -> DailyTable {
    let calendar = aligned.calendar();
    let stations = aligned.stations();

    let mut rows = Vec::with_capacity(calendar.len());
    let mut diff_rows = Vec::with_capacity(calendar.len());

    for (index, date) in calendar.iter().enumerate() {
        let values: BTreeMap<String, DailyCell> = stations
            .iter()
            .map(|station| {
                let cell = match aligned.value(date, station) {
                    Some(v) if index == 0 => DailyCell::First(v),
                    Some(v) => DailyCell::Observed(v),
                    None => DailyCell::Missing,
                };
                (station.clone(), cell)
            })
            .collect();

        let diffs: BTreeMap<String, Option<f64>> = match index.checked_sub(1) {
            None => stations.iter().map(|s| (s.clone(), None)).collect(),
            Some(prev_index) => {
                let prev_date = &calendar[prev_index];
                stations
                    .iter()
                    .map(|station| {
                        let diff = day_over_day(
                            aligned.value(prev_date, station),
                            aligned.value(date, station),
                        );
                        (station.clone(), diff)
                    })
                    .collect()
            }
        };

        rows.push(DailyTableRow {
            date: date.clone(),
            values,
        });
        diff_rows.push(DiffTableRow {
            date: date.clone(),
            values: diffs,
        });
    }

    DailyTable { rows, diff_rows }
}

/// `previous - current`, `None` when either side is missing or the result
/// is not finite
pub fn day_over_day(previous: Option<f64>, current: Option<f64>) -> Option<f64> {
    let diff = previous? - current?;
    round_opt(Some(diff), DIFF_PLACES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Measurement, ObservationPoint};

    fn aligned(entries: &[(&str, &[(&str, f64)])], expected: &[String]) -> AlignedSeries {
        let stations = entries
            .iter()
            .map(|(station, points)| {
                (
                    station.to_string(),
                    points
                        .iter()
                        .map(|(date, value)| ObservationPoint::new(date, *value))
                        .collect(),
                )
            })
            .collect();
        AlignedSeries::align(&stations, Measurement::Elevation, expected)
    }

    #[test]
    fn test_decrease_is_positive() {
        let series = aligned(&[("5724", &[("20250101", 100.0), ("20250102", 99.5)])], &[]);
        let table = build_daily_table(&series);

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.diff_rows[1].date, "20250102");
        assert_eq!(table.diff_rows[1].values["5724"], Some(0.5));
    }

    #[test]
    fn test_first_row_marks_first_and_has_null_diffs() {
        let series = aligned(
            &[
                ("5724", &[("20250101", 100.0), ("20250102", 101.0)]),
                ("9100", &[("20250102", 50.0)]),
            ],
            &[],
        );
        let table = build_daily_table(&series);

        assert_eq!(table.rows[0].values["5724"], DailyCell::First(100.0));
        assert_eq!(table.rows[0].values["9100"], DailyCell::Missing);
        assert_eq!(table.rows[1].values["5724"], DailyCell::Observed(101.0));
        assert!(table.diff_rows[0].values.values().all(Option::is_none));
        assert_eq!(table.diff_rows[1].values["5724"], Some(-1.0));
        assert_eq!(table.diff_rows[1].values["9100"], None);
    }

    #[test]
    fn test_gap_breaks_diff() {
        let series = aligned(
            &[
                ("5724", &[("20250101", 100.0), ("20250103", 99.0)]),
                ("9100", &[("20250102", 50.0)]),
            ],
            &[],
        );
        let table = build_daily_table(&series);

        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[1].values["5724"], DailyCell::Missing);
        assert_eq!(table.diff_rows[1].values["5724"], None);
        assert_eq!(table.diff_rows[2].values["5724"], None);
    }

    #[test]
    fn test_row_for_every_date_even_if_all_absent() {
        let series = aligned(&[("5724", &[("20250101", 1.0)])], &["0001".to_string()]);
        let table = build_daily_table(&series);

        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].values["0001"], DailyCell::Missing);
    }

    #[test]
    fn test_diff_rows_parallel_rows() {
        let series = aligned(
            &[("5724", &[("20250101", 10.0), ("20250102", 9.0), ("20250103", 9.25)])],
            &[],
        );
        let table = build_daily_table(&series);

        for (row, diff_row) in table.rows.iter().zip(table.diff_rows.iter()) {
            assert_eq!(row.date, diff_row.date);
        }
        for i in 1..table.rows.len() {
            let prev = table.rows[i - 1].values["5724"].value().unwrap();
            let curr = table.rows[i].values["5724"].value().unwrap();
            assert_eq!(table.diff_rows[i].values["5724"], Some(prev - curr));
        }
    }

    #[test]
    fn test_empty_batch() {
        let series = aligned(&[], &[]);
        let table = build_daily_table(&series);
        assert!(table.rows.is_empty());
        assert!(table.diff_rows.is_empty());
    }

    #[test]
    fn test_cell_serialization() {
        assert_eq!(
            serde_json::to_string(&DailyCell::First(100.0)).unwrap(),
            "[100.0,null]"
        );
        assert_eq!(serde_json::to_string(&DailyCell::Observed(99.5)).unwrap(), "[99.5]");
        assert_eq!(serde_json::to_string(&DailyCell::Missing).unwrap(), "[]");
    }

    #[test]
    fn test_day_over_day_non_finite() {
        assert_eq!(day_over_day(Some(f64::INFINITY), Some(f64::INFINITY)), None);
        assert_eq!(day_over_day(None, Some(1.0)), None);
    }
}
