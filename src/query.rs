//! History filtering and summary enumeration
//!
//! Read-side views over the log:
//!
//! - [`filter_history`]: zone/month/day/hour filtering, sorted by local
//!   instant descending (most recent first)
//! - [`summary_index`]: distinct local months and the distinct days within
//!   each, for the dashboard's filter pickers
//!
//! Both normalize timestamps through the configured zone and silently skip
//! records that fail to normalize; neither fails on log content.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::store::{Reading, RecordStore, DEFAULT_ZONE};
use crate::time::Normalizer;

/// Default result cap for history queries
pub const DEFAULT_LIMIT: usize = 5000;

/// Filter parameters for a history query
#[derive(Debug, Clone)]
pub struct HistoryFilter {
    /// Zone, exact match
    pub zona: String,
    /// Optional local month, `YYYY-MM`
    pub mes: Option<String>,
    /// Optional local day, `YYYY-MM-DD`
    pub dia: Option<String>,
    /// Optional local hour, `HH` zero-padded
    pub hora: Option<String>,
    /// Maximum number of results
    pub n: usize,
}

impl Default for HistoryFilter {
    fn default() -> Self {
        Self {
            zona: DEFAULT_ZONE.to_string(),
            mes: None,
            dia: None,
            hora: None,
            n: DEFAULT_LIMIT,
        }
    }
}

/// Distinct months and days present in the log, sorted ascending
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub meses: Vec<String>,
    pub dias_por_mes: BTreeMap<String, Vec<String>>,
}

/// Matching records, most recent local instant first.
///
/// All matches are collected before sorting; the cap is applied after the
/// sort, so it bounds the response, not the scan. `max_scan_lines` bounds
/// the raw lines considered.
pub fn filter_history(
    store: &dyn RecordStore,
    normalizer: &Normalizer,
    filter: &HistoryFilter,
    max_scan_lines: usize,
) -> Vec<Reading> {
    let mut matches: Vec<(chrono::DateTime<chrono_tz::Tz>, Reading)> = Vec::new();
    let mut skipped = 0usize;

    for reading in store.scan_bounded(max_scan_lines) {
        if reading.zona != filter.zona {
            continue;
        }

        let local = match normalizer.normalize(&reading) {
            Ok(dt) => dt,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };

        if let Some(mes) = &filter.mes {
            if local.format("%Y-%m").to_string() != *mes {
                continue;
            }
        }
        if let Some(dia) = &filter.dia {
            if local.format("%Y-%m-%d").to_string() != *dia {
                continue;
            }
        }
        if let Some(hora) = &filter.hora {
            if local.format("%H").to_string() != *hora {
                continue;
            }
        }

        matches.push((local, reading));
    }

    if skipped > 0 {
        tracing::debug!(skipped, zona = %filter.zona, "Skipped records with unparseable timestamps");
    }

    matches.sort_by(|a, b| b.0.cmp(&a.0));
    matches.truncate(filter.n);
    matches.into_iter().map(|(_, r)| r).collect()
}

/// Enumerate distinct local `YYYY-MM` and `YYYY-MM-DD` values in one scan
pub fn summary_index(store: &dyn RecordStore, normalizer: &Normalizer) -> Summary {
    let mut dias: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for reading in store.scan_bounded(usize::MAX) {
        let local = match normalizer.normalize(&reading) {
            Ok(dt) => dt,
            Err(_) => continue,
        };

        let mes = local.format("%Y-%m").to_string();
        let dia = local.format("%Y-%m-%d").to_string();
        dias.entry(mes).or_default().insert(dia);
    }

    Summary {
        meses: dias.keys().cloned().collect(),
        dias_por_mes: dias
            .into_iter()
            .map(|(mes, days)| (mes, days.into_iter().collect()))
            .collect(),
    }
}
