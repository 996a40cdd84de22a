//! CSV export of the reading log
//!
//! Streams zone/month-filtered records into a CSV table with the header
//! `fecha,hora,temperatura,humedad,zona`, one row per matching record in log
//! order (not time-sorted). Missing measurements render as empty strings;
//! records whose timestamps do not normalize are skipped.

use thiserror::Error;

use crate::store::RecordStore;
use crate::time::Normalizer;

/// CSV rendering failures
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output was not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Render matching records as a CSV document.
///
/// `mes` filters on the local `YYYY-MM`; `max_scan_lines` bounds the raw
/// lines scanned.
pub fn export_csv(
    store: &dyn RecordStore,
    normalizer: &Normalizer,
    zona: &str,
    mes: Option<&str>,
    max_scan_lines: usize,
) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["fecha", "hora", "temperatura", "humedad", "zona"])?;

    let mut rows = 0usize;
    let mut skipped = 0usize;

    for reading in store.scan_bounded(max_scan_lines) {
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

        if let Some(mes) = mes {
            if local.format("%Y-%m").to_string() != mes {
                continue;
            }
        }

        writer.write_record([
            local.format("%Y-%m-%d").to_string(),
            local.format("%H:%M").to_string(),
            reading.temperatura.map(|v| v.to_string()).unwrap_or_default(),
            reading.humedad.map(|v| v.to_string()).unwrap_or_default(),
            reading.zona.clone(),
        ])?;
        rows += 1;
    }

    if skipped > 0 {
        tracing::debug!(skipped, zona, "Skipped records with unparseable timestamps");
    }
    tracing::debug!(rows, zona, mes = mes.unwrap_or("TODO"), "Rendered CSV export");

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Attachment filename for an export: `historial_{zona}_{mes|TODO}.csv`
pub fn export_filename(zona: &str, mes: Option<&str>) -> String {
    format!("historial_{}_{}.csv", zona, mes.unwrap_or("TODO"))
}
