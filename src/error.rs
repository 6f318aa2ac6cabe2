use thiserror::Error;

/// Data-quality problems found in log entries or in a persisted store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    #[error("log entry #{index} for '{domain}' has no blocking reasons")]
    EmptyReasons { domain: String, index: usize },

    #[error("log entry #{index} has an empty domain")]
    EmptyDomain { index: usize },

    #[error("log entry #{index} for '{domain}' has a reason with an empty blocklist id")]
    EmptyBlocklistId { domain: String, index: usize },

    #[error("store entry for '{domain}' has no blocklist ids")]
    EmptyStoreEntry { domain: String },

    #[error("unsupported store version {found} (expected {supported})")]
    UnsupportedStoreVersion { found: u32, supported: u32 },
}
