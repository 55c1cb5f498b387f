use rand::{seq::SliceRandom, Rng};
use shared::domain::ControlSpec;
use tracing::debug;

use crate::catalog::ControlCatalog;

/// Hands out control specs so that no spec is leased to two devices at once.
///
/// Allocation runs in two phases when the available set runs short: first it reclaims every
/// catalog entry nobody holds, then it synthesizes numbered variants of random catalog entries.
/// `allocate` therefore never fails, however many devices are connected.
#[derive(Debug)]
pub struct ControlPool {
    catalog: ControlCatalog,
    available: Vec<ControlSpec>,
    leased: Vec<ControlSpec>,
    next_variant: u64,
}

impl ControlPool {
    pub fn new(catalog: ControlCatalog) -> Self {
        Self {
            available: catalog.specs().to_vec(),
            catalog,
            leased: Vec::new(),
            next_variant: 1,
        }
    }

    pub fn catalog(&self) -> &ControlCatalog {
        &self.catalog
    }

    pub fn available(&self) -> &[ControlSpec] {
        &self.available
    }

    pub fn leased(&self) -> &[ControlSpec] {
        &self.leased
    }

    pub fn is_leased(&self, spec: &ControlSpec) -> bool {
        self.leased.contains(spec)
    }

    /// Removes `count` distinct specs from the available set, chosen uniformly at random.
    pub fn allocate<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> Vec<ControlSpec> {
        if self.available.len() < count {
            self.reclaim();
        }
        if self.available.len() < count {
            self.synthesize(count - self.available.len(), rng);
        }

        self.available.shuffle(rng);
        let selected = self.available.split_off(self.available.len() - count);
        self.leased.extend(selected.iter().cloned());
        selected
    }

    /// Returns specs to the available set. Specs that are not currently leased are skipped.
    pub fn release(&mut self, specs: impl IntoIterator<Item = ControlSpec>) {
        for spec in specs {
            let Some(index) = self.leased.iter().position(|leased| *leased == spec) else {
                continue;
            };
            self.leased.swap_remove(index);
            if !self.available.contains(&spec) {
                self.available.push(spec);
            }
        }
    }

    fn reclaim(&mut self) {
        self.available = self
            .catalog
            .specs()
            .iter()
            .filter(|spec| !self.leased.contains(spec))
            .cloned()
            .collect();
        debug!(available = self.available.len(), "control pool reclaimed");
    }

    fn synthesize<R: Rng + ?Sized>(&mut self, missing: usize, rng: &mut R) {
        let target = self.available.len() + missing;
        while self.available.len() < target {
            let template = self.catalog.choose(rng);
            let variant = ControlSpec {
                name: format!("{} {}", template.name, self.next_variant),
                ..template.clone()
            };
            self.next_variant += 1;

            // A custom catalog may already hold an entry named like a variant.
            if self.available.contains(&variant) || self.leased.contains(&variant) {
                continue;
            }
            self.available.push(variant);
        }
        debug!(
            synthesized = missing,
            next_variant = self.next_variant,
            "control catalog exhausted, synthesized variants"
        );
    }
}

#[cfg(test)]
#[path = "tests/pool_tests.rs"]
mod tests;
