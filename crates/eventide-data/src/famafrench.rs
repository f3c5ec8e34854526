//! Fama-French daily three-factor data.
//!
//! The Kenneth French data library publishes the daily factors as a text
//! table framed by a free-form preamble and a copyright footer:
//!
//! ```text
//! This file was created by CMPT_ME_BEME_RETS_DAILY using the 202403 CRSP database.
//!
//! ,Mkt-RF,SMB,HML,RF
//! 19260701,    0.10,   -0.25,   -0.27,    0.01
//! ...
//!
//! Copyright 2024 Kenneth R. French
//! ```
//!
//! Values are in percent. Only the first block of `YYYYMMDD` rows is read.

use crate::error::{DataError, Result};
use crate::source::{FactorSource, validate_range};
use async_trait::async_trait;
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use eventide_study::{FactorSeries, FamaFrenchSeries, ModelChoice, ThreeFactorRow};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

const USER_AGENT: &str = "Eventide/0.1";

/// Where the daily factor table is read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorFileLocation {
    /// Plain-text table served over HTTP(S)
    Url(String),
    /// Table on the local filesystem
    Path(PathBuf),
}

/// Configuration for the Fama-French factor client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamaFrenchConfig {
    /// Location of the daily three-factor table
    pub location: FactorFileLocation,

    /// Whether values are in percent and must be divided by 100 (default: true)
    #[serde(default = "default_percent_scaled")]
    pub percent_scaled: bool,
}

const fn default_percent_scaled() -> bool {
    true
}

impl FamaFrenchConfig {
    /// Read from a URL with percent-scaled values.
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            location: FactorFileLocation::Url(url.into()),
            percent_scaled: true,
        }
    }

    /// Read from a local file with percent-scaled values.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self {
            location: FactorFileLocation::Path(path.into()),
            percent_scaled: true,
        }
    }
}

/// Client serving Fama-French factors for the three-factor model.
#[derive(Debug)]
pub struct FamaFrenchClient {
    client: reqwest::Client,
    config: FamaFrenchConfig,
}

impl FamaFrenchClient {
    /// Create a client for the configured location.
    pub fn new(config: FamaFrenchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(DataError::Network)?;
        Ok(Self { client, config })
    }

    /// Active configuration.
    pub const fn config(&self) -> &FamaFrenchConfig {
        &self.config
    }

    /// Raw table text.
    pub async fn fetch_text(&self) -> Result<String> {
        match &self.config.location {
            FactorFileLocation::Url(url) => {
                debug!(%url, "downloading Fama-French factors");
                let response = self.client.get(url).send().await?;
                if !response.status().is_success() {
                    return Err(DataError::Http(format!(
                        "Failed to fetch Fama-French factors from {}: HTTP {}",
                        url,
                        response.status()
                    )));
                }
                Ok(response.text().await?)
            }
            FactorFileLocation::Path(path) => {
                debug!(path = %path.display(), "reading Fama-French factors");
                Ok(tokio::fs::read_to_string(path).await?)
            }
        }
    }

    /// Factor rows within `[start, end]`.
    pub async fn fetch_factors(&self, start: NaiveDate, end: NaiveDate) -> Result<FamaFrenchSeries> {
        validate_range(start, end)?;
        let text = self.fetch_text().await?;
        let all = parse_fama_french_csv(&text, self.config.percent_scaled)?;
        let series = all.restrict(start, end);

        if series.is_empty() {
            let coverage = all
                .date_range()
                .map_or_else(|| "no rows".to_string(), |(a, b)| format!("{a}..={b}"));
            return Err(DataError::MissingData {
                symbol: "Fama-French".to_string(),
                reason: format!("no factor rows in {start}..={end}, file covers {coverage}"),
            });
        }

        info!(rows = series.len(), %start, %end, "loaded Fama-French factors");
        Ok(series)
    }
}

#[async_trait]
impl FactorSource for FamaFrenchClient {
    async fn fetch_factor_series(
        &self,
        model: ModelChoice,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FactorSeries> {
        match model {
            ModelChoice::FamaFrench3 => Ok(FactorSeries::FamaFrench(
                self.fetch_factors(start, end).await?,
            )),
            ModelChoice::MarketAdjusted => Err(DataError::Unsupported(
                "the Fama-French client does not serve benchmark returns".to_string(),
            )),
        }
    }
}

/// Column positions of the factor table.
#[derive(Debug, Clone, Copy)]
struct Columns {
    market_excess: usize,
    smb: usize,
    hml: usize,
    risk_free: usize,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| DataError::Parse(format!("factor header has no '{name}' column")))
        };
        Ok(Self {
            market_excess: find("Mkt-RF")?,
            smb: find("SMB")?,
            hml: find("HML")?,
            risk_free: find("RF")?,
        })
    }
}

/// Parse the daily three-factor table.
///
/// Rows are kept from the line after the header up to the first line that is
/// not a `YYYYMMDD` row. With `percent_scaled` every value is divided by 100.
pub fn parse_fama_french_csv(text: &str, percent_scaled: bool) -> Result<FamaFrenchSeries> {
    let header_idx = text
        .lines()
        .position(|line| line.contains("Mkt-RF"))
        .ok_or_else(|| DataError::Parse("no 'Mkt-RF' header line found".to_string()))?;

    let block: Vec<&str> = text
        .lines()
        .skip(header_idx)
        .enumerate()
        .take_while(|(i, line)| *i == 0 || is_data_line(line))
        .map(|(_, line)| line)
        .collect();

    let joined = block.join("\n");
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(joined.as_bytes());

    let columns = Columns::from_header(reader.headers()?)?;
    let scale = if percent_scaled { 0.01 } else { 1.0 };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let date = parse_yyyymmdd(field(&record, 0)?)?;
        let value = |idx: usize| -> Result<f64> {
            let raw = field(&record, idx)?;
            let v: f64 = raw
                .parse()
                .map_err(|_| DataError::Parse(format!("bad factor value '{raw}' on {date}")))?;
            Ok(v * scale)
        };
        rows.push(ThreeFactorRow {
            date,
            market_excess: value(columns.market_excess)?,
            smb: value(columns.smb)?,
            hml: value(columns.hml)?,
            risk_free: value(columns.risk_free)?,
        });
    }

    debug!(rows = rows.len(), "parsed Fama-French table");
    Ok(FamaFrenchSeries::new(rows)?)
}

fn is_data_line(line: &str) -> bool {
    let first = line.split(',').next().unwrap_or("").trim();
    first.len() == 8 && first.bytes().all(|b| b.is_ascii_digit())
}

fn field<'r>(record: &'r StringRecord, idx: usize) -> Result<&'r str> {
    record
        .get(idx)
        .ok_or_else(|| DataError::Parse(format!("factor row is missing column {idx}")))
}

fn parse_yyyymmdd(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y%m%d")
        .map_err(|e| DataError::Parse(format!("bad factor date '{raw}': {e}")))
}
