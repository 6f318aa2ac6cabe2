use std::collections::{BTreeMap, BTreeSet};

use crate::domain::DomData;

/// Blocklist id → domains it contributed to blocking.
pub type BlistData = BTreeMap<String, BTreeSet<String>>;

/// Inverts a domain attribution map into a per-blocklist view.
pub fn aggregate(attribution: &DomData) -> BlistData {
    let mut blists = BlistData::new();
    for (domain, ids) in attribution {
        for id in ids {
            blists
                .entry(id.clone())
                .or_default()
                .insert(domain.clone());
        }
    }
    blists
}

#[derive(Debug, Clone, PartialEq)]
pub struct Coverage {
    pub id: String,
    pub domains: usize,
    pub percent: f64,
}

/// Share of all observed domains each blocklist took part in blocking,
/// highest first.
pub fn coverage(blists: &BlistData, total_domains: usize) -> Vec<Coverage> {
    if total_domains == 0 {
        return Vec::new();
    }

    let mut rows: Vec<Coverage> = blists
        .iter()
        .map(|(id, domains)| Coverage {
            id: id.clone(),
            domains: domains.len(),
            percent: 100.0 * domains.len() as f64 / total_domains as f64,
        })
        .collect();

    rows.sort_by(|a, b| b.domains.cmp(&a.domains).then_with(|| a.id.cmp(&b.id)));
    rows
}

/// Co-occurrence level → number of domains seen at that level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Histogram {
    levels: BTreeMap<usize, usize>,
}

impl Histogram {
    pub fn record(&mut self, level: usize) {
        *self.levels.entry(level).or_insert(0) += 1;
    }

    pub fn count(&self, level: usize) -> usize {
        self.levels.get(&level).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.levels.values().sum()
    }

    pub fn max_level(&self) -> usize {
        self.levels.keys().next_back().copied().unwrap_or(0)
    }

    /// Every level from 1 to the observed maximum, unobserved levels as zero.
    pub fn dense(&self) -> Vec<(usize, usize)> {
        (1..=self.max_level())
            .map(|level| (level, self.count(level)))
            .collect()
    }
}

/// For each blocklist, how many blocklists fired alongside it (itself included).
pub fn redundancy(attribution: &DomData) -> BTreeMap<String, Histogram> {
    let mut histograms: BTreeMap<String, Histogram> = BTreeMap::new();
    for ids in attribution.values() {
        let level = ids.len();
        for id in ids {
            histograms.entry(id.clone()).or_default().record(level);
        }
    }
    histograms
}
