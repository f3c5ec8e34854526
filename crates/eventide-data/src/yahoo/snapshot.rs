//! Stock snapshot shown next to an event study.
//!
//! Quote-summary style responses are loosely typed maps where any field may
//! be absent, null, or the wrong type. [`StockSnapshot`] validates such a map
//! once, at this boundary, into explicit optional fields.

use chrono::NaiveDate;
use eventide_study::PriceSeries;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Company snapshot with explicit optional fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockSnapshot {
    /// Stock symbol
    pub symbol: String,
    /// Current price
    pub current_price: Option<f64>,
    /// One-day change, in percent
    pub day_change_percent: Option<f64>,
    /// Sector
    pub sector: Option<String>,
    /// Industry
    pub industry: Option<String>,
    /// Market capitalization
    pub market_cap: Option<f64>,
    /// Trailing P/E ratio
    pub trailing_pe: Option<f64>,
    /// Dividend yield
    pub dividend_yield: Option<f64>,
    /// Recent daily closes, oldest first
    pub trend: Vec<(NaiveDate, f64)>,
}

impl StockSnapshot {
    /// Snapshot from a quote-summary info map.
    pub fn from_info(symbol: &str, info: &Value) -> Self {
        Self {
            symbol: symbol.to_ascii_uppercase(),
            current_price: positive(info, "currentPrice"),
            day_change_percent: finite(info, "regularMarketChangePercent"),
            sector: text(info, "sector"),
            industry: text(info, "industry"),
            market_cap: positive(info, "marketCap"),
            trailing_pe: finite(info, "trailingPE"),
            dividend_yield: finite(info, "dividendYield").filter(|v| *v >= 0.0),
            trend: Vec::new(),
        }
    }

    /// Snapshot from recent closes alone.
    ///
    /// The last close becomes the current price and the change between the
    /// last two closes the one-day change.
    pub fn from_history(history: &PriceSeries) -> Self {
        let mut snapshot = Self {
            symbol: history.ticker().to_ascii_uppercase(),
            ..Self::default()
        };
        snapshot.apply_history(history);
        snapshot
    }

    /// Fill price fields from `history`, keeping values already present.
    pub fn apply_history(&mut self, history: &PriceSeries) {
        let points = history.points();
        self.trend = points.iter().map(|p| (p.date, p.close)).collect();

        if self.current_price.is_none() {
            self.current_price = points.last().map(|p| p.close);
        }
        if self.day_change_percent.is_none() {
            self.day_change_percent = match points {
                [.., prev, last] => Some((last.close / prev.close - 1.0) * 100.0),
                _ => None,
            };
        }
    }

    /// Change over the trend window, in percent.
    pub fn trend_change_percent(&self) -> Option<f64> {
        let (_, first) = self.trend.first()?;
        let (_, last) = self.trend.last()?;
        (self.trend.len() > 1).then(|| (last / first - 1.0) * 100.0)
    }
}

impl fmt::Display for StockSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stock Snapshot: {}", self.symbol)?;
        writeln!(f, "{}", "-".repeat(40))?;
        writeln!(f, "Current Price:   {}", display_money(self.current_price))?;
        writeln!(f, "1-Day Change:    {}", display_percent(self.day_change_percent))?;
        writeln!(f, "1-Month Trend:   {}", display_percent(self.trend_change_percent()))?;
        writeln!(f, "Sector:          {}", display_text(self.sector.as_deref()))?;
        writeln!(f, "Industry:        {}", display_text(self.industry.as_deref()))?;
        writeln!(f, "Market Cap:      {}", display_market_cap(self.market_cap))?;
        writeln!(f, "P/E Ratio:       {}", display_number(self.trailing_pe))?;
        write!(f, "Dividend Yield:  {}", display_number(self.dividend_yield))
    }
}

const MISSING: &str = "N/A";

/// `$123.45` or `N/A`.
pub fn display_money(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("${v:.2}"))
}

/// `+1.23%` or `N/A`.
pub fn display_percent(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{v:+.2}%"))
}

/// `12.34` or `N/A`.
pub fn display_number(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{v:.2}"))
}

/// The text or `N/A`.
pub fn display_text(value: Option<&str>) -> String {
    value.unwrap_or(MISSING).to_string()
}

/// `$2,950,000,000` or `N/A`.
pub fn display_market_cap(value: Option<f64>) -> String {
    let Some(value) = value else {
        return MISSING.to_string();
    };
    let digits = format!("{:.0}", value.round());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("${grouped}")
}

fn finite(info: &Value, key: &str) -> Option<f64> {
    let value = info.get(key)?;
    match value.as_f64() {
        Some(v) if v.is_finite() => Some(v),
        _ => {
            debug!(key, %value, "ignoring non-numeric snapshot field");
            None
        }
    }
}

fn positive(info: &Value, key: &str) -> Option<f64> {
    finite(info, key).filter(|v| *v > 0.0)
}

fn text(info: &Value, key: &str) -> Option<String> {
    info.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
