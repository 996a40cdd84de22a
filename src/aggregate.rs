//! Bucketed historical aggregation
//!
//! Builds the fixed dashboard grid: one column per calendar day in a trailing
//! window (default 5 days, ending today in the local zone), one row per
//! 2-hour bucket, and in each cell the last reading of that span by local
//! instant. The grid is deterministic for a given log regardless of log
//! order: out-of-order and duplicate-timestamped records resolve by instant,
//! with equal instants going to the record seen last in the scan.
//!
//! Bucket rows are labeled `02:00` through `22:00` plus a final `24:00` row
//! that only the 00-01 hours reach: they wrap to the `24:00` label of the
//! *same* date. The dashboard's rightmost row reads "as of end of day" and
//! its layout depends on the wraparound, so it is kept as-is.

use chrono::{DateTime, Duration, NaiveDate, Timelike};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::store::RecordStore;
use crate::time::Normalizer;

/// 2-hour buckets per day
pub const BUCKETS_PER_DAY: usize = 12;

/// Default trailing window in calendar days
pub const DEFAULT_WINDOW_DAYS: usize = 5;

/// Winning reading for one (date, bucket) cell
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Cell {
    pub temperatura: f64,
    pub humedad: f64,
    /// Winner's instant in the local zone, `"YYYY-MM-DD HH:MM:SS"`
    pub ts_local: String,
}

/// The derived day-by-bucket grid. Not stored; recomputed per request.
#[derive(Debug, Clone, Serialize)]
pub struct BucketTable {
    /// Zone the table was computed for
    pub zona: String,
    /// Window dates, oldest first
    pub dias: Vec<NaiveDate>,
    /// Bucket labels in row order, `02:00 .. 22:00, 24:00`
    pub horas: Vec<String>,
    /// Winning cell per date per label; absent entries are empty cells
    pub celdas: BTreeMap<NaiveDate, BTreeMap<String, Cell>>,
}

/// Bucket label for a local hour: `h = (hour / 2) * 2`, with the 0 bucket
/// wrapping to the end-of-day label `"24:00"`
pub fn bucket_label(hour: u32) -> String {
    let h = (hour / 2) * 2;
    if h == 0 {
        "24:00".to_string()
    } else {
        format!("{:02}:00", h)
    }
}

/// All bucket labels in table row order
pub fn bucket_labels() -> Vec<String> {
    (1..=BUCKETS_PER_DAY as u32).map(|i| format!("{:02}:00", i * 2)).collect()
}

/// Computes last-writer-wins bucket tables from the reading log
#[derive(Debug, Clone, Copy)]
pub struct BucketAggregator {
    days: usize,
    max_scan_lines: usize,
}

impl BucketAggregator {
    /// Aggregator over a `days`-day window, scanning at most `max_scan_lines`
    /// raw log lines
    pub fn new(days: usize, max_scan_lines: usize) -> Self {
        Self {
            days: days.max(1),
            max_scan_lines,
        }
    }

    /// Build the table for `zona`, window ending at `today` inclusive.
    ///
    /// Runs in O(scanned lines) time and O(days x 12) memory. Records outside
    /// the window, in other zones, missing a measurement, or with timestamps
    /// that do not normalize are passed over.
    pub fn table(
        &self,
        store: &dyn RecordStore,
        normalizer: &Normalizer,
        zona: &str,
        today: NaiveDate,
    ) -> BucketTable {
        let oldest = today - Duration::days(self.days as i64 - 1);
        let dias: Vec<NaiveDate> = (0..self.days)
            .map(|i| oldest + Duration::days(i as i64))
            .collect();

        let mut winners: BTreeMap<NaiveDate, BTreeMap<String, (DateTime<Tz>, Cell)>> =
            BTreeMap::new();
        let mut skipped = 0usize;

        for reading in store.scan_bounded(self.max_scan_lines) {
            if reading.zona != zona {
                continue;
            }

            let local = match normalizer.normalize(&reading) {
                Ok(dt) => dt,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };

            let date = local.date_naive();
            if date < oldest || date > today {
                continue;
            }

            let (temperatura, humedad) = match (reading.temperatura, reading.humedad) {
                (Some(t), Some(h)) => (t, h),
                // Incomplete readings stay in the raw log but never win a cell
                _ => continue,
            };

            let label = bucket_label(local.hour());
            let cell = Cell {
                temperatura,
                humedad,
                ts_local: local.format("%Y-%m-%d %H:%M:%S").to_string(),
            };

            let slot = winners.entry(date).or_default().entry(label);
            match slot {
                std::collections::btree_map::Entry::Vacant(v) => {
                    v.insert((local, cell));
                }
                std::collections::btree_map::Entry::Occupied(mut o) => {
                    // >= so an equal instant goes to the record seen last
                    if local >= o.get().0 {
                        o.insert((local, cell));
                    }
                }
            }
        }

        if skipped > 0 {
            tracing::debug!(skipped, zona, "Skipped records with unparseable timestamps");
        }

        let celdas = winners
            .into_iter()
            .map(|(date, row)| {
                let row = row.into_iter().map(|(label, (_, cell))| (label, cell)).collect();
                (date, row)
            })
            .collect();

        BucketTable {
            zona: zona.to_string(),
            dias,
            horas: bucket_labels(),
            celdas,
        }
    }
}

impl Default for BucketAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_DAYS, 50_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, Reading};
    use tempfile::tempdir;

    fn reading(zona: &str, ts: &str, temp: f64, hum: f64) -> Reading {
        Reading::new(zona, temp, hum).timestamp(ts)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    #[test]
    fn test_bucket_label_mapping() {
        assert_eq!(bucket_label(0), "24:00");
        assert_eq!(bucket_label(1), "24:00");
        assert_eq!(bucket_label(2), "02:00");
        assert_eq!(bucket_label(3), "02:00");
        assert_eq!(bucket_label(4), "04:00");
        assert_eq!(bucket_label(11), "10:00");
        assert_eq!(bucket_label(22), "22:00");
        assert_eq!(bucket_label(23), "22:00");
    }

    #[test]
    fn test_bucket_labels_order() {
        let labels = bucket_labels();
        assert_eq!(labels.len(), BUCKETS_PER_DAY);
        assert_eq!(labels.first().unwrap(), "02:00");
        assert_eq!(labels.last().unwrap(), "24:00");
    }

    #[test]
    fn test_last_writer_wins_by_instant() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let n = Normalizer::default();

        // Same cell (10:00 and 11:30 share the 10:00 bucket), appended
        // newest-instant first to prove log order does not decide
        store.append(&reading("Z1", "2024-01-10 11:30:00", 25.0, 65.0)).unwrap();
        store.append(&reading("Z1", "2024-01-10 10:00:00", 20.0, 60.0)).unwrap();

        let table = BucketAggregator::default().table(&store, &n, "Z1", today());
        let cell = &table.celdas[&today()]["10:00"];
        assert_eq!(cell.temperatura, 25.0);
        assert_eq!(cell.ts_local, "2024-01-10 11:30:00");
    }

    #[test]
    fn test_equal_instants_resolve_to_last_seen() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let n = Normalizer::default();

        store.append(&reading("Z1", "2024-01-10 08:15:00", 1.0, 50.0)).unwrap();
        store.append(&reading("Z1", "2024-01-10 08:15:00", 2.0, 51.0)).unwrap();

        let table = BucketAggregator::default().table(&store, &n, "Z1", today());
        assert_eq!(table.celdas[&today()]["08:00"].temperatura, 2.0);
    }

    #[test]
    fn test_one_winner_per_cell() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let n = Normalizer::default();

        for minute in [0, 10, 20, 45, 59] {
            let ts = format!("2024-01-10 06:{:02}:00", minute);
            store.append(&reading("Z1", &ts, minute as f64, 60.0)).unwrap();
        }

        let table = BucketAggregator::default().table(&store, &n, "Z1", today());
        let row = &table.celdas[&today()];
        assert_eq!(row.len(), 1);
        assert_eq!(row["06:00"].temperatura, 59.0);
    }

    #[test]
    fn test_incomplete_reading_never_wins() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let n = Normalizer::default();

        store.append(&reading("Z1", "2024-01-10 14:00:00", 20.0, 60.0)).unwrap();
        // Later instant but no humidity: retained in the log, excluded here
        let partial = Reading {
            zona: "Z1".to_string(),
            timestamp: Some("2024-01-10 15:30:00".to_string()),
            temperatura: Some(99.0),
            ..Default::default()
        };
        store.append(&partial).unwrap();

        let table = BucketAggregator::default().table(&store, &n, "Z1", today());
        assert_eq!(table.celdas[&today()]["14:00"].temperatura, 20.0);
    }

    #[test]
    fn test_window_retention_drops_oldest_date() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let n = Normalizer::default();

        // Six consecutive dates ending today
        for day in 5..=10 {
            let ts = format!("2024-01-{:02} 12:00:00", day);
            store.append(&reading("Z1", &ts, day as f64, 60.0)).unwrap();
        }

        let table = BucketAggregator::default().table(&store, &n, "Z1", today());
        let oldest = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(table.dias.len(), 5);
        assert!(!table.dias.contains(&oldest));
        assert!(!table.celdas.contains_key(&oldest));
        assert!(table.celdas.contains_key(&NaiveDate::from_ymd_opt(2024, 1, 6).unwrap()));
    }

    #[test]
    fn test_midnight_hours_wrap_to_end_of_day_label() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let n = Normalizer::default();

        store.append(&reading("Z1", "2024-01-10 00:30:00", 17.0, 80.0)).unwrap();

        let table = BucketAggregator::default().table(&store, &n, "Z1", today());
        // Same date, last label
        assert_eq!(table.celdas[&today()]["24:00"].temperatura, 17.0);
    }

    #[test]
    fn test_zone_filter_and_bad_timestamps_skipped() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let n = Normalizer::default();

        store.append(&reading("Z2", "2024-01-10 12:00:00", 30.0, 40.0)).unwrap();
        store.append(&reading("Z1", "not a timestamp", 31.0, 41.0)).unwrap();
        store.append(&reading("Z1", "2024-01-10 12:05:00", 21.0, 61.0)).unwrap();

        let table = BucketAggregator::default().table(&store, &n, "Z1", today());
        assert_eq!(table.celdas[&today()]["12:00"].temperatura, 21.0);
        assert_eq!(table.celdas[&today()].len(), 1);
    }

    #[test]
    fn test_local_zone_moves_bucket_assignment() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        // UTC-6, no DST
        let n = Normalizer::new(chrono_tz::America::Costa_Rica);

        // 18:30 UTC is 12:30 local
        store.append(&reading("Z1", "2024-01-10 18:30:00", 22.0, 55.0)).unwrap();

        let table = BucketAggregator::default().table(&store, &n, "Z1", today());
        let cell = &table.celdas[&today()]["12:00"];
        assert_eq!(cell.ts_local, "2024-01-10 12:30:00");
    }
}
