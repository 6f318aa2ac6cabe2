pub mod analysis;
pub mod args;
pub mod classify;
pub mod config;
pub mod domain;
pub mod error;
pub mod report;
pub mod source;
pub mod stats;
pub mod store;
pub mod utils;

pub use analysis::{analyze, run, Analysis};
pub use args::Args;
pub use classify::{classify, Classification};
pub use domain::{extract_attribution, DomData, LogEntry, Reason};
pub use error::DataError;
pub use report::{render_report, ReportOptions};
pub use stats::{aggregate, coverage, redundancy, BlistData, Histogram};
pub use store::{reconcile, reconcile_with_store, Drift, Reconciliation, Store};
