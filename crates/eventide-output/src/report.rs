//! Report generation for event studies.

use crate::summary::ImpactMetrics;
use chrono::{DateTime, NaiveDate, Utc};
use eventide_study::{EventStudyResult, ModelChoice};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The study produced no event-window days.
    #[error("Study for {0} has no event-window records")]
    EmptyResult(String),

    /// A required builder field was not set.
    #[error("Missing report field: {0}")]
    MissingField(&'static str),
}

/// A JSON report of one event study.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Symbol being analyzed.
    pub symbol: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Event date studied.
    pub event_date: NaiveDate,

    /// Return model used.
    pub model: ModelChoice,

    /// Report contents (JSON format).
    pub contents: serde_json::Value,
}

impl Report {
    /// Create a new report.
    pub fn new(
        symbol: String,
        event_date: NaiveDate,
        model: ModelChoice,
        contents: serde_json::Value,
    ) -> Self {
        Self {
            symbol,
            timestamp: Utc::now(),
            event_date,
            model,
            contents,
        }
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    symbol: Option<String>,
    event_date: Option<NaiveDate>,
    model: Option<ModelChoice>,
    contents: Option<serde_json::Value>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the symbol.
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Set the event date.
    pub const fn event_date(mut self, date: NaiveDate) -> Self {
        self.event_date = Some(date);
        self
    }

    /// Set the model.
    pub const fn model(mut self, model: ModelChoice) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the report contents.
    pub fn contents(mut self, contents: serde_json::Value) -> Self {
        self.contents = Some(contents);
        self
    }

    /// Populate every field from a study result.
    ///
    /// Contents hold the impact metrics, the fit and the per-day records.
    pub fn study(self, result: &EventStudyResult) -> Result<Self, ReportError> {
        let metrics = ImpactMetrics::from_result(result)
            .ok_or_else(|| ReportError::EmptyResult(result.ticker().to_string()))?;
        let contents = serde_json::json!({
            "impact": serde_json::to_value(&metrics)?,
            "fit": serde_json::to_value(result.fit())?,
            "days": serde_json::to_value(result.records())?,
        });
        Ok(self
            .symbol(result.ticker())
            .event_date(result.event_date())
            .model(result.model())
            .contents(contents))
    }

    /// Build the report.
    pub fn build(self) -> Result<Report, ReportError> {
        Ok(Report::new(
            self.symbol.ok_or(ReportError::MissingField("symbol"))?,
            self.event_date.ok_or(ReportError::MissingField("event_date"))?,
            self.model.unwrap_or(ModelChoice::MarketAdjusted),
            self.contents.unwrap_or(serde_json::Value::Null),
        ))
    }
}

/// Human-readable rendering of one study.
#[derive(Debug, Clone)]
pub struct EventStudyReport<'a> {
    result: &'a EventStudyResult,
    metrics: ImpactMetrics,
}

impl<'a> EventStudyReport<'a> {
    /// Wrap a result; an empty result cannot be reported.
    pub fn new(result: &'a EventStudyResult) -> Result<Self, ReportError> {
        let metrics = ImpactMetrics::from_result(result)
            .ok_or_else(|| ReportError::EmptyResult(result.ticker().to_string()))?;
        Ok(Self { result, metrics })
    }

    /// Headline metrics.
    pub const fn metrics(&self) -> &ImpactMetrics {
        &self.metrics
    }

    /// Render as a plain-text table.
    pub fn to_ascii_table(&self) -> String {
        let result = self.result;
        let fit = result.fit();
        let mut output = String::new();

        output.push_str(&format!("\nEvent Study: {}\n", result.ticker()));
        output.push_str(&format!("Model: {}\n", result.model().label()));
        output.push_str(&format!(
            "Event Date: {} (day 0 trades {})\n",
            result.event_date(),
            result.event_trading_date()
        ));
        let (est_start, est_end) = fit.estimation_date_range();
        output.push_str(&format!(
            "Estimation: {} to {} ({} days)\n",
            est_start,
            est_end,
            fit.observations()
        ));
        output.push_str(&"=".repeat(80));
        output.push('\n');

        output.push_str(&format!(
            "{:>4} {:<12} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}\n",
            "Day", "Date", "Actual", "Expected", "Abnormal", "CAR", "CI Low", "CI High"
        ));
        output.push_str(&"-".repeat(80));
        output.push('\n');

        for day in result.records() {
            output.push_str(&format!(
                "{:>+4} {:<12} {:>9.2}% {:>9.2}% {:>9.2}% {:>9.2}% {:>9.2}% {:>9.2}%\n",
                day.relative_day,
                day.date.to_string(),
                day.stock_return * 100.0,
                day.expected_return * 100.0,
                day.abnormal_return * 100.0,
                day.cumulative_abnormal_return * 100.0,
                day.ci_lower * 100.0,
                day.ci_upper * 100.0,
            ));
        }

        output.push_str(&"-".repeat(80));
        output.push('\n');

        let m = &self.metrics;
        output.push_str(&format!("{:<28} {:>9.2}%\n", "Actual Return", m.actual_return_pct));
        output.push_str(&format!(
            "{:<28} {:>9.2}%\n",
            "Expected Return (Normal)", m.expected_return_pct
        ));
        output.push_str(&format!("{:<28} {:>9.2}%\n", "CAR (Impact)", m.car_pct));
        output.push_str(&format!(
            "{:<28} [{:.2}%, {:.2}%]\n",
            format!("{:.0}% Interval", m.confidence_level * 100.0),
            m.ci_lower_pct,
            m.ci_upper_pct
        ));
        for loading in fit.loadings() {
            output.push_str(&format!("{:<28} {:>10.4}\n", loading.name, loading.beta));
        }
        output.push_str(&format!("{:<28} {:>10.6}\n", "alpha", fit.intercept()));
        if let Some(r2) = fit.r_squared() {
            output.push_str(&format!("{:<28} {:>10.4}\n", "R-squared", r2));
        }
        if !m.reliability.is_reliable() {
            output.push_str("WARNING: zero residual variance, interval is not meaningful\n");
        }
        output.push_str(&"=".repeat(80));
        output.push('\n');

        output
    }

    /// Render as Markdown.
    pub fn to_markdown(&self) -> String {
        let result = self.result;
        let m = &self.metrics;
        let mut output = String::new();

        output.push_str(&format!("# Event Study: {}\n\n", result.ticker()));
        output.push_str(&format!("**Model:** {}\n\n", result.model().label()));
        output.push_str(&format!("**Event Date:** {}\n\n", result.event_date()));

        output.push_str("| Day | Date | Actual | Expected | Abnormal | CAR | CI Low | CI High |\n");
        output.push_str("|-----|------|--------|----------|----------|-----|--------|---------|\n");

        for day in result.records() {
            output.push_str(&format!(
                "| {:+} | {} | {:.2}% | {:.2}% | {:.2}% | {:.2}% | {:.2}% | {:.2}% |\n",
                day.relative_day,
                day.date,
                day.stock_return * 100.0,
                day.expected_return * 100.0,
                day.abnormal_return * 100.0,
                day.cumulative_abnormal_return * 100.0,
                day.ci_lower * 100.0,
                day.ci_upper * 100.0,
            ));
        }

        output.push('\n');

        output.push_str("## Summary\n\n");
        output.push_str(&format!("- **Actual Return:** {:.2}%\n", m.actual_return_pct));
        output.push_str(&format!(
            "- **Expected Return (Normal):** {:.2}%\n",
            m.expected_return_pct
        ));
        output.push_str(&format!("- **CAR (Impact):** {:.2}%\n", m.car_pct));
        output.push_str(&format!(
            "- **{:.0}% Interval:** [{:.2}%, {:.2}%]\n",
            m.confidence_level * 100.0,
            m.ci_lower_pct,
            m.ci_upper_pct
        ));
        if !m.reliability.is_reliable() {
            output.push_str("\n> Zero residual variance: the interval is not meaningful.\n");
        }

        output
    }
}
