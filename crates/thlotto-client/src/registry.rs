use std::{fmt::Display, sync::Arc};

use serde::Serialize;
use thlotto_combora::{HistoricalSet, LottoNumber};

use crate::models::{Dataset, PrizeCategory};

/// Collapse every stored number of every category into one membership set.
///
/// Returns the set and how many entries were skipped as malformed.
pub fn build_set(dataset: &Dataset) -> (HistoricalSet, usize) {
    let mut set = HistoricalSet::new();
    let mut skipped = 0;

    for (category, draws) in dataset.categories() {
        for record in &draws.draws {
            for raw in &record.numbers {
                match raw.parse::<LottoNumber>() {
                    Ok(number) => {
                        set.insert(number);
                    }
                    Err(e) => {
                        skipped += 1;
                        log::warn!(
                            "Skipping malformed number {raw:?} in {category} {}: {e}",
                            record.date
                        );
                    }
                }
            }
        }
    }

    log::debug!(
        "Built historical set: {} distinct numbers, {skipped} skipped",
        set.len()
    );
    (set, skipped)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub total_draws: usize,
    pub distinct_numbers: usize,
    pub remaining: usize,
    pub skipped: usize,
    pub per_category: Vec<(PrizeCategory, usize)>,
}

impl Display for RegistryStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total draws:       {}", self.total_draws)?;
        writeln!(f, "Distinct numbers:  {}", self.distinct_numbers)?;
        writeln!(f, "Never drawn:       {}", self.remaining)?;
        if self.skipped > 0 {
            writeln!(f, "Malformed entries: {}", self.skipped)?;
        }
        for (category, count) in &self.per_category {
            writeln!(f, "  {:<15} {count:>5} ({})", category.key(), category.name())?;
        }
        Ok(())
    }
}

/// Owns the membership set derived from a [`Dataset`] and rebuilds it
/// when the dataset has changed since the last build.
#[derive(Debug, Clone)]
pub struct Registry {
    set: Arc<HistoricalSet>,
    revision: u64,
    skipped: usize,
}

impl Registry {
    pub fn build(dataset: &Dataset) -> Self {
        let (set, skipped) = build_set(dataset);
        Self {
            set: Arc::new(set),
            revision: dataset.revision(),
            skipped,
        }
    }

    /// Rebuild if `dataset` was mutated since this registry was built.
    /// Returns whether a rebuild happened.
    pub fn refresh(&mut self, dataset: &Dataset) -> bool {
        if dataset.revision() == self.revision {
            return false;
        }
        *self = Self::build(dataset);
        true
    }

    /// Membership of a raw number string; malformed input is never a member.
    pub fn contains(&self, number: &str) -> bool {
        self.set.contains_str(number)
    }

    pub fn size(&self) -> usize {
        self.set.len()
    }

    /// Shared read-only view for samplers.
    pub fn snapshot(&self) -> Arc<HistoricalSet> {
        Arc::clone(&self.set)
    }

    pub fn stats(&self, dataset: &Dataset) -> RegistryStats {
        RegistryStats {
            total_draws: dataset.total_draws(),
            distinct_numbers: self.set.len(),
            remaining: self.set.remaining(),
            skipped: self.skipped,
            per_category: dataset.categories().map(|(c, d)| (c, d.len())).collect(),
        }
    }
}
