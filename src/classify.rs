use std::collections::{BTreeMap, BTreeSet};

use crate::domain::DomData;

/// Solo/combo partition of the blocklists in an attribution map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Blocklists that were the only reason for at least one domain.
    pub solos: BTreeMap<String, BTreeSet<String>>,
    /// Sorted id combinations containing no solo blocklist → domains with exactly that set.
    pub combos: BTreeMap<Vec<String>, BTreeSet<String>>,
    /// Domains left out of combo grouping because a solo blocklist already explains them.
    pub absorbed: BTreeSet<String>,
}

impl Classification {
    /// Ids that only ever show up inside a combo group.
    pub fn combo_only_ids(&self) -> BTreeSet<&str> {
        self.combos
            .keys()
            .flatten()
            .map(String::as_str)
            .collect()
    }
}

pub fn classify(attribution: &DomData) -> Classification {
    let solos = find_solos(attribution);
    let mut combos: BTreeMap<Vec<String>, BTreeSet<String>> = BTreeMap::new();
    let mut absorbed = BTreeSet::new();

    for (domain, ids) in attribution {
        if ids.iter().any(|id| solos.contains_key(id)) {
            absorbed.insert(domain.clone());
            continue;
        }
        // BTreeSet iteration is already sorted
        let key: Vec<String> = ids.iter().cloned().collect();
        combos.entry(key).or_default().insert(domain.clone());
    }

    Classification {
        solos,
        combos,
        absorbed,
    }
}

fn find_solos(attribution: &DomData) -> BTreeMap<String, BTreeSet<String>> {
    let mut solos: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (domain, ids) in attribution {
        if ids.len() != 1 {
            continue;
        }
        if let Some(id) = ids.iter().next() {
            solos.entry(id.clone()).or_default().insert(domain.clone());
        }
    }
    solos
}
