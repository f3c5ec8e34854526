#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/eventide/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod abnormal;
pub mod align;
pub mod car;
pub mod confidence;
pub mod config;
pub mod error;
pub mod model;
pub mod request;
pub mod result;
pub mod series;
pub mod study;
pub mod window;

// Re-export main types
pub use abnormal::{AbnormalReturns, abnormal_returns};
pub use align::{AlignedReturns, align_returns};
pub use car::{CumulativeReturns, aggregate, cumulative_sum};
pub use confidence::{ConfidenceBand, ConfidenceLevel, Reliability, confidence_band};
pub use config::StudyConfig;
pub use error::{Result, StudyError};
pub use model::{
    FactorLoading, FamaFrenchModel, MarketModel, ModelChoice, ModelFit, ReturnModelFitter,
};
pub use request::AnalysisRequest;
pub use result::{EventDayRecord, EventStudyResult};
pub use series::{
    FactorSeries, FamaFrenchSeries, PricePoint, PriceSeries, ReturnPoint, ReturnSeries,
    ThreeFactorRow,
};
pub use study::{compute_event_study, run_analysis};
pub use window::{EventWindowSpec, WindowSplit, split_windows};
