use std::collections::HashSet;

use rand::Rng;
use shared::{
    domain::{ControlKind, ControlSpec},
    error::CatalogError,
};

/// Validated, deduplicated and never empty list of control templates.
#[derive(Debug, Clone)]
pub struct ControlCatalog {
    specs: Vec<ControlSpec>,
}

impl ControlCatalog {
    pub fn new(specs: Vec<ControlSpec>) -> Result<Self, CatalogError> {
        if specs.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::with_capacity(specs.len());
        for spec in &specs {
            if spec.min_value < 0 {
                return Err(CatalogError::NegativeRange {
                    name: spec.name.clone(),
                });
            }
            if spec.min_value > spec.max_value {
                return Err(CatalogError::InvalidRange {
                    name: spec.name.clone(),
                    min_value: spec.min_value,
                    max_value: spec.max_value,
                });
            }
            if !seen.insert(spec) {
                return Err(CatalogError::Duplicate {
                    name: spec.name.clone(),
                });
            }
        }

        Ok(Self { specs })
    }

    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(builtin_specs())
    }

    pub fn specs(&self) -> &[ControlSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn contains(&self, spec: &ControlSpec) -> bool {
        self.specs.contains(spec)
    }

    /// Uniformly random template; the catalog is never empty once constructed.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &ControlSpec {
        &self.specs[rng.random_range(0..self.specs.len())]
    }
}

fn builtin_specs() -> Vec<ControlSpec> {
    use ControlKind::{Dial, PushButton, Slider, Switch, Toggle};

    [
        ("Antrieb", Switch, "rot", 0, 3),
        ("Schilde", Slider, "blau", 0, 3),
        ("Navigation", PushButton, "grün", 0, 3),
        ("Kommunikation", Switch, "gelb", 0, 2),
        ("Triebwerk", Slider, "rot", 0, 4),
        ("Scanner", PushButton, "blau", 0, 4),
        ("Laser", PushButton, "rot", 0, 3),
        ("Fracht", Slider, "grün", 0, 5),
        ("Sauerstoff", Switch, "blau", 0, 3),
        ("Gravitation", Slider, "gelb", 0, 3),
        ("Lebenserhaltung", Switch, "grün", 0, 2),
        ("Turbinen", Slider, "rot", 0, 4),
        ("Dock", PushButton, "gelb", 0, 2),
        ("Sensor Boost", Slider, "blau", 0, 5),
        ("Plasma", Switch, "rot", 0, 3),
        ("Schildgenerator", PushButton, "grün", 0, 4),
        ("Funk", Slider, "gelb", 0, 2),
        ("Verteidigung", Switch, "blau", 0, 3),
        ("Warp", Slider, "grün", 0, 4),
        ("Kühlung", Switch, "gelb", 0, 2),
        ("Analyse", PushButton, "blau", 0, 3),
        ("Versorgung", Slider, "grün", 0, 5),
        ("Stabilisator", Switch, "rot", 0, 2),
        ("Hangar", PushButton, "gelb", 0, 3),
        ("Reaktor Sicherung", Toggle, "rot", 0, 1),
        ("Orbit Dial", Dial, "blau", 0, 8),
        ("Andock Taster", Toggle, "gelb", 0, 1),
        ("Grav-Justierer", Dial, "grün", 0, 10),
    ]
    .into_iter()
    .map(|(name, kind, color, min, max)| ControlSpec::new(name, kind, color, min, max))
    .collect()
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
