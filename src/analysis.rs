use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use crate::classify::{classify, Classification};
use crate::config::Config;
use crate::domain::{extract_attribution, DomData, LogEntry};
use crate::stats::{aggregate, redundancy, BlistData, Histogram};
use crate::store::{reconcile_with_store, Drift, Store};
use crate::{source, Args};

/// Everything the report needs from one run.
#[derive(Debug)]
pub struct Analysis {
    pub source_label: String,
    pub entry_count: usize,
    pub attribution: DomData,
    pub blists: BlistData,
    pub classification: Classification,
    pub redundancy: BTreeMap<String, Histogram>,
    pub drifts: Vec<Drift>,
    pub carried_forward: usize,
}

struct Input {
    label: String,
    store_name: String,
    entries: Vec<LogEntry>,
}

pub fn run(args: &Args) -> Result<Analysis> {
    let total_start_time = Instant::now();
    info!(action = "start", component = "analysis", "Starting blocklist analysis");

    let input = resolve_input(args)?;
    info!(action = "loaded", component = "analysis", entry_count = input.entries.len(), "Found entries");

    let store = if args.no_store {
        None
    } else {
        Some(Store::open(&args.store_dir, &input.store_name).with_redacted_logs(args.redact))
    };

    let analysis = analyze(input.label, &input.entries, store.as_ref())?;

    info!(
        action = "complete",
        component = "analysis",
        duration_ms = total_start_time.elapsed().as_millis(),
        "Analysis completed successfully"
    );
    Ok(analysis)
}

/// Runs extraction, optional store reconciliation and the derived reports over
/// already-loaded entries.
pub fn analyze(source_label: String, entries: &[LogEntry], store: Option<&Store>) -> Result<Analysis> {
    let current = extract_attribution(entries)?;

    let (attribution, drifts, carried_forward) = match store {
        Some(store) => {
            let reconciliation = reconcile_with_store(store, &current)?;
            (
                reconciliation.merged,
                reconciliation.drifts,
                reconciliation.carried_forward,
            )
        }
        None => (current, Vec::new(), 0),
    };

    let blists = aggregate(&attribution);
    let classification = classify(&attribution);
    let redundancy = redundancy(&attribution);

    info!(
        action = "complete",
        component = "classification",
        domain_count = attribution.len(),
        blocklist_count = blists.len(),
        solo_count = classification.solos.len(),
        combo_count = classification.combos.len(),
        "Blocklists classified"
    );

    Ok(Analysis {
        source_label,
        entry_count: entries.len(),
        attribution,
        blists,
        classification,
        redundancy,
        drifts,
        carried_forward,
    })
}

fn resolve_input(args: &Args) -> Result<Input> {
    if let Some(profile) = &args.profile {
        let config = Config::load(&args.config)?;
        let profile_id = config.profile_id(profile)?.to_string();
        let api_key = config.api_key()?;

        let body = source::fetch_profile_logs(&config.api_base, &api_key, &profile_id)?;
        if args.keep {
            source::keep_payload(Path::new("."), &profile_id, &body)?;
        }

        let entries = source::parse_payload(&body)
            .with_context(|| format!("Unexpected log payload for profile '{}'", profile))?;
        return Ok(Input {
            label: format!("profile {} ({})", profile, profile_id),
            store_name: profile_id,
            entries,
        });
    }

    if let Some(file) = &args.file {
        if args.keep {
            warn!(action = "configure", component = "analysis", "--keep has no effect when reading from a file");
        }
        let entries = source::load_log_file(file)?;
        return Ok(Input {
            label: format!("file {}", file.display()),
            store_name: store_name_for_file(file)?,
            entries,
        });
    }

    anyhow::bail!("No profile or file specified")
}

fn store_name_for_file(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .with_context(|| format!("Cannot derive a store name from {:?}", path))
}
