pub mod sink;

pub use sink::{DirectoryExportSink, ExportSink};

use chrono::{DateTime, Local, SecondsFormat, TimeZone};
use serde::Serialize;

use crate::timer::{format_elapsed, LapLedger};

const CSV_HEADER: [&str; 6] = ["Lap", "Time (ms)", "Time", "Delta (ms)", "Delta", "Recorded At"];

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub index: usize,
    pub time_ms: i64,
    pub formatted_time: String,
    pub delta_ms: i64,
    pub formatted_delta: String,
    pub recorded_at: String,
}

/// Chronological rows for every lap. Empty ledger, empty export.
pub fn export_rows(ledger: &LapLedger) -> Vec<ExportRow> {
    ledger
        .iter()
        .map(|lap| ExportRow {
            index: lap.index,
            time_ms: lap.time_ms.round() as i64,
            formatted_time: format_elapsed(lap.time_ms),
            delta_ms: lap.delta_ms.round() as i64,
            formatted_delta: format_elapsed(lap.delta_ms),
            recorded_at: lap.recorded_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        })
        .collect()
}

pub fn to_csv(rows: &[ExportRow]) -> String {
    let mut out = String::new();
    push_record(&mut out, CSV_HEADER.iter().map(|field| field.to_string()));
    for row in rows {
        push_record(
            &mut out,
            [
                row.index.to_string(),
                row.time_ms.to_string(),
                row.formatted_time.clone(),
                row.delta_ms.to_string(),
                row.formatted_delta.clone(),
                row.recorded_at.clone(),
            ],
        );
    }
    out
}

fn push_record(out: &mut String, fields: impl IntoIterator<Item = String>) {
    let line = fields
        .into_iter()
        .map(|field| quote_field(&field))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push('\n');
}

/// Every field is quoted; embedded quotes are doubled.
pub fn quote_field(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// `laps-YYYY-MM-DDTHH-MM-SS.csv`, colon-free so it is a valid name everywhere.
pub fn export_file_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("laps-{}.csv", now.format("%Y-%m-%dT%H-%M-%S"))
}

pub fn export_file_name_now() -> String {
    export_file_name(&Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn sample_ledger() -> LapLedger {
        let recorded_at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let mut ledger = LapLedger::new();
        ledger.record_lap(1500.4, recorded_at);
        ledger.record_lap(4200.6, recorded_at);
        ledger
    }

    #[test]
    fn test_export_rows_round_and_format() {
        let rows = export_rows(&sample_ledger());
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].index, 1);
        assert_eq!(rows[0].time_ms, 1500);
        assert_eq!(rows[0].formatted_time, "00:00:01.50");
        assert_eq!(rows[0].delta_ms, 1500);

        assert_eq!(rows[1].index, 2);
        assert_eq!(rows[1].time_ms, 4201);
        assert_eq!(rows[1].delta_ms, 2700);
        assert_eq!(rows[1].formatted_delta, "00:00:02.70");
        assert_eq!(rows[1].recorded_at, "2024-03-09T14:05:07.000Z");
    }

    #[test]
    fn test_empty_ledger_exports_nothing() {
        assert!(export_rows(&LapLedger::new()).is_empty());
    }

    #[test]
    fn test_csv_quotes_every_field() {
        let csv = to_csv(&export_rows(&sample_ledger()));
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "\"Lap\",\"Time (ms)\",\"Time\",\"Delta (ms)\",\"Delta\",\"Recorded At\""
        );
        assert_eq!(
            lines[1],
            "\"1\",\"1500\",\"00:00:01.50\",\"1500\",\"00:00:01.50\",\"2024-03-09T14:05:07.000Z\""
        );
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_quote_field_escapes_quotes_and_separators() {
        assert_eq!(quote_field("plain"), "\"plain\"");
        assert_eq!(quote_field("a,b"), "\"a,b\"");
        assert_eq!(quote_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_export_file_name() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(export_file_name(&now), "laps-2024-03-09T14-05-07.csv");
    }
}
