//! CSV and JSON export of event study results.

use crate::charts::{CarChartSeries, ConfidenceChartSeries};
use crate::summary::ImpactMetrics;
use chrono::NaiveDate;
use eventide_study::{EventDayRecord, EventStudyResult, ModelChoice, ModelFit, Reliability};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" | "prettyjson" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Flat per-day row, one CSV line per event-window day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventDayRow {
    /// Ticker studied.
    pub ticker: String,
    /// Short model name.
    pub model: String,
    /// Trading days relative to the event.
    pub relative_day: i64,
    /// Trading date.
    pub date: NaiveDate,
    /// Realised return.
    pub stock_return: f64,
    /// Normal return.
    pub expected_return: f64,
    /// Abnormal return.
    pub abnormal_return: f64,
    /// CAR through this day.
    pub cumulative_abnormal_return: f64,
    /// Lower confidence bound.
    pub ci_lower: f64,
    /// Upper confidence bound.
    pub ci_upper: f64,
}

impl EventDayRow {
    fn new(ticker: &str, model: ModelChoice, record: &EventDayRecord) -> Self {
        Self {
            ticker: ticker.to_string(),
            model: model.short_name().to_string(),
            relative_day: record.relative_day,
            date: record.date,
            stock_return: record.stock_return,
            expected_return: record.expected_return,
            abnormal_return: record.abnormal_return,
            cumulative_abnormal_return: record.cumulative_abnormal_return,
            ci_lower: record.ci_lower,
            ci_upper: record.ci_upper,
        }
    }
}

/// Complete export of one study.
///
/// JSON carries the fit diagnostics and per-day records; CSV carries only the
/// per-day rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventStudyExport {
    /// Ticker studied.
    pub ticker: String,

    /// Return model used.
    pub model: ModelChoice,

    /// Requested event date.
    pub event_date: NaiveDate,

    /// Trading date treated as day 0.
    pub event_trading_date: NaiveDate,

    /// Confidence level of the band.
    pub confidence_level: f64,

    /// Whether the band is statistically meaningful.
    pub reliability: Reliability,

    /// Estimation-window fit.
    pub fit: ModelFit,

    /// Per-day records ordered by relative day.
    pub days: Vec<EventDayRecord>,
}

impl EventStudyExport {
    /// Snapshot a study result for export.
    pub fn from_result(result: &EventStudyResult) -> Self {
        Self {
            ticker: result.ticker().to_string(),
            model: result.model(),
            event_date: result.event_date(),
            event_trading_date: result.event_trading_date(),
            confidence_level: result.confidence_level().value(),
            reliability: result.reliability(),
            fit: result.fit().clone(),
            days: result.records().to_vec(),
        }
    }

    /// Flat rows for CSV.
    pub fn rows(&self) -> Vec<EventDayRow> {
        self.days
            .iter()
            .map(|d| EventDayRow::new(&self.ticker, self.model, d))
            .collect()
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

/// Serialize rows into CSV text with a header line.
fn write_csv<T: Serialize>(rows: impl IntoIterator<Item = T>) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in rows {
        wtr.serialize(row)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

fn write_json<T: Serialize>(value: &T, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(value)?),
        _ => Ok(serde_json::to_string(value)?),
    }
}

impl Exporter for EventStudyExport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => write_csv(self.rows()),
            ExportFormat::Json | ExportFormat::PrettyJson => write_json(self, format),
        }
    }
}

impl Exporter for Vec<EventStudyExport> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => write_csv(self.iter().flat_map(EventStudyExport::rows)),
            ExportFormat::Json | ExportFormat::PrettyJson => write_json(self, format),
        }
    }
}

impl Exporter for ImpactMetrics {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => write_csv([self]),
            ExportFormat::Json | ExportFormat::PrettyJson => write_json(self, format),
        }
    }
}

impl Exporter for CarChartSeries {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => write_csv(&self.points),
            ExportFormat::Json | ExportFormat::PrettyJson => write_json(self, format),
        }
    }
}

impl Exporter for ConfidenceChartSeries {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => write_csv(&self.points),
            ExportFormat::Json | ExportFormat::PrettyJson => write_json(self, format),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use rstest::rstest;

    #[test]
    fn test_study_export_csv() {
        let export = EventStudyExport::from_result(&fixtures::jump_result());
        let csv = export.export_to_string(ExportFormat::Csv).unwrap();

        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "ticker,model,relative_day,date,stock_return,expected_return,abnormal_return,\
             cumulative_abnormal_return,ci_lower,ci_upper"
        );
        assert_eq!(lines.count(), 7);
        assert!(csv.contains("EVNT,market,0,"));
    }

    #[test]
    fn test_study_export_json_round_trip() {
        let export = EventStudyExport::from_result(&fixtures::jump_result());
        let json = export.export_to_string(ExportFormat::PrettyJson).unwrap();

        assert!(json.contains("\"fit\""));
        let back: EventStudyExport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.days.len(), export.days.len());
        assert_eq!(back.model, ModelChoice::MarketAdjusted);
    }

    #[test]
    fn test_metrics_csv_has_single_row() {
        let metrics = ImpactMetrics::from_result(&fixtures::jump_result()).unwrap();
        let csv = metrics.export_to_string(ExportFormat::Csv).unwrap();
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.starts_with("ticker,model,event_date,actual_return_pct"));
    }

    #[test]
    fn test_chart_csv() {
        let chart = ConfidenceChartSeries::from_result(&fixtures::jump_result());
        let csv = chart.export_to_string(ExportFormat::Csv).unwrap();
        assert!(csv.starts_with("relative_day,car_pct,lower_pct,upper_pct"));
        assert_eq!(csv.lines().count(), 8);
    }

    #[test]
    fn test_export_to_file() {
        let export = EventStudyExport::from_result(&fixtures::jump_result());
        let path = std::env::temp_dir().join(format!("eventide-export-{}.json", std::process::id()));

        export.export_to_file(&path, ExportFormat::Json).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, export.export_to_string(ExportFormat::Json).unwrap());

        std::fs::remove_file(&path).unwrap();
    }

    #[rstest]
    #[case("csv", ExportFormat::Csv, "csv")]
    #[case("JSON", ExportFormat::Json, "json")]
    #[case("pretty-json", ExportFormat::PrettyJson, "json")]
    fn test_format_parsing(
        #[case] raw: &str,
        #[case] expected: ExportFormat,
        #[case] extension: &str,
    ) {
        let format: ExportFormat = raw.parse().unwrap();
        assert_eq!(format, expected);
        assert_eq!(format.extension(), extension);
    }

    #[test]
    fn test_unknown_format() {
        assert!(matches!(
            "xlsx".parse::<ExportFormat>(),
            Err(ExportError::InvalidFormat(_))
        ));
    }
}
