use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use crate::domain::DomData;
use crate::error::DataError;
use crate::utils::redact_domain;

pub const STORE_VERSION: u32 = 1;
const STORE_SUFFIX: &str = "blists.json";

/// A domain whose stored attribution differs from what the current run observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drift {
    pub domain: String,
    pub previous: BTreeSet<String>,
    pub current: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub merged: DomData,
    pub drifts: Vec<Drift>,
    pub carried_forward: usize,
}

/// Merges a previously stored attribution map with the current run's map.
///
/// The current run is authoritative for every domain it contains. Domains only
/// present in `prior` are carried forward unchanged.
pub fn reconcile(prior: DomData, current: &DomData) -> Reconciliation {
    let mut merged = current.clone();
    let mut drifts = Vec::new();
    let mut carried_forward = 0;

    for (domain, previous) in prior {
        match current.get(&domain) {
            Some(now) if *now != previous => drifts.push(Drift {
                domain,
                previous,
                current: now.clone(),
            }),
            Some(_) => {}
            None => {
                merged.insert(domain, previous);
                carried_forward += 1;
            }
        }
    }

    Reconciliation {
        merged,
        drifts,
        carried_forward,
    }
}

#[derive(Serialize)]
struct StoreFile<'a> {
    version: u32,
    domains: &'a DomData,
}

/// On-disk attribution store, one JSON file per store name.
#[derive(Debug, Clone)]
pub struct Store {
    pub name: String,
    pub path: PathBuf,
    pub redact_logs: bool,
}

impl Store {
    pub fn open(dir: &Path, name: &str) -> Self {
        Self {
            name: name.to_string(),
            path: dir.join(format!("{}.{}", name, STORE_SUFFIX)),
            redact_logs: false,
        }
    }

    /// Masks domain names in drift log events.
    pub fn with_redacted_logs(mut self, redact: bool) -> Self {
        self.redact_logs = redact;
        self
    }

    fn log_domain(&self, domain: &str) -> String {
        if self.redact_logs {
            redact_domain(domain)
        } else {
            domain.to_string()
        }
    }

    /// Loads the stored map. A missing file is an empty store.
    pub fn load(&self) -> Result<DomData> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(action = "load", component = "store", store = %self.name, file_path = ?self.path, "No existing store, starting empty");
                return Ok(DomData::new());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read store {:?}", self.path))
            }
        };

        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Store {:?} is not valid JSON", self.path))?;
        let data = parse_store(value)
            .with_context(|| format!("Store {:?} is malformed", self.path))?;

        info!(action = "loaded", component = "store", store = %self.name, domain_count = data.len(), file_path = ?self.path, "Loaded store");
        Ok(data)
    }

    /// Writes the full map, replacing the previous file only once the new one is complete.
    pub fn save(&self, data: &DomData) -> Result<()> {
        let body = serde_json::to_string_pretty(&StoreFile {
            version: STORE_VERSION,
            domains: data,
        })?;
        write_atomic(&self.path, body.as_bytes())
            .with_context(|| format!("Failed to write store {:?}", self.path))?;

        info!(action = "saved", component = "store", store = %self.name, domain_count = data.len(), file_path = ?self.path, "Saved store");
        Ok(())
    }
}

fn parse_store(value: Value) -> Result<DomData> {
    let raw: BTreeMap<String, Vec<String>> = match value {
        Value::Object(mut obj) if obj.get("version").is_some_and(Value::is_number) => {
            let found = obj
                .get("version")
                .and_then(Value::as_u64)
                .context("store version must be a non-negative integer")?;
            if found != u64::from(STORE_VERSION) {
                return Err(DataError::UnsupportedStoreVersion {
                    found: u32::try_from(found).unwrap_or(u32::MAX),
                    supported: STORE_VERSION,
                }
                .into());
            }
            let domains = obj
                .remove("domains")
                .context("store is missing the 'domains' field")?;
            serde_json::from_value(domains)?
        }
        // Unversioned stores are a bare domain → ids map.
        other => serde_json::from_value(other)?,
    };

    let mut data = DomData::new();
    for (domain, ids) in raw {
        if ids.is_empty() {
            return Err(DataError::EmptyStoreEntry { domain }.into());
        }
        data.insert(domain, ids.into_iter().collect());
    }
    Ok(data)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp = path.with_extension("tmp");
    let result = fs::write(&tmp, bytes).and_then(|()| fs::rename(&tmp, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

/// Loads the store, reconciles it against `current`, reports drift and saves the result.
pub fn reconcile_with_store(store: &Store, current: &DomData) -> Result<Reconciliation> {
    let start_time = Instant::now();
    let prior = store.load()?;
    let reconciliation = reconcile(prior, current);

    for drift in &reconciliation.drifts {
        warn!(
            action = "reconcile",
            component = "store",
            domain = %store.log_domain(&drift.domain),
            previous = ?drift.previous,
            current = ?drift.current,
            "Blocklist attribution changed"
        );
    }

    store.save(&reconciliation.merged)?;

    info!(
        action = "complete",
        component = "store_reconciliation",
        store = %store.name,
        drift_count = reconciliation.drifts.len(),
        carried_forward = reconciliation.carried_forward,
        duration_ms = start_time.elapsed().as_millis(),
        "Store reconciliation completed"
    );
    Ok(reconciliation)
}
