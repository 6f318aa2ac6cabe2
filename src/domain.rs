use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;
use tracing::info;

use crate::error::DataError;

/// Domain → blocklist ids that blocked it.
pub type DomData = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub domain: String,
    pub reasons: Vec<Reason>,
}

/// A batch of log entries, either as returned by the logs API (`{"data": [...]}`)
/// or as a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LogPayload {
    Wrapped { data: Vec<LogEntry> },
    Bare(Vec<LogEntry>),
}

impl LogPayload {
    pub fn into_entries(self) -> Vec<LogEntry> {
        match self {
            LogPayload::Wrapped { data } => data,
            LogPayload::Bare(entries) => entries,
        }
    }
}

/// Builds the domain attribution map from raw entries.
///
/// The first entry seen for a domain wins; later entries for the same domain are
/// skipped without validation. A first occurrence with no reasons is rejected,
/// since an empty attribution would look like a domain blocked by nothing.
pub fn extract_attribution(entries: &[LogEntry]) -> Result<DomData, DataError> {
    let start_time = Instant::now();
    let mut attribution = DomData::new();
    let mut duplicates = 0usize;

    for (index, entry) in entries.iter().enumerate() {
        if attribution.contains_key(&entry.domain) {
            duplicates += 1;
            continue;
        }

        if entry.domain.is_empty() {
            return Err(DataError::EmptyDomain { index });
        }
        if entry.reasons.is_empty() {
            return Err(DataError::EmptyReasons {
                domain: entry.domain.clone(),
                index,
            });
        }

        let mut ids = BTreeSet::new();
        for reason in &entry.reasons {
            if reason.id.is_empty() {
                return Err(DataError::EmptyBlocklistId {
                    domain: entry.domain.clone(),
                    index,
                });
            }
            ids.insert(reason.id.clone());
        }

        attribution.insert(entry.domain.clone(), ids);
    }

    info!(
        action = "complete",
        component = "attribution_extraction",
        entry_count = entries.len(),
        unique_domains = attribution.len(),
        duplicates_skipped = duplicates,
        duration_ms = start_time.elapsed().as_millis(),
        "Domain attribution extracted"
    );

    Ok(attribution)
}
