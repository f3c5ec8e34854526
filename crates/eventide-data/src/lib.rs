#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/eventide/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod events;
pub mod famafrench;
pub mod source;
pub mod yahoo;

pub use error::{DataError, Result};
pub use events::{EventCatalog, EventRecord, Sentiment};
pub use famafrench::{FactorFileLocation, FamaFrenchClient, FamaFrenchConfig, parse_fama_french_csv};
pub use source::{CompositeFactorSource, FactorSource, PriceHistorySource};
pub use yahoo::{StockSnapshot, YahooConfig, YahooQuoteProvider};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
