//! Name-indexed table of projection implementations.
//!
//! Seeded once with every built-in projection; callers may add their own with
//! [`register`]. Entries are never removed.

use std::collections::HashMap;

use lazy_static::lazy_static;
use parking_lot::RwLock;

use super::InitFn;
use crate::names::projection_key;

/// A registry entry: the names it answers to and its constructor.
#[derive(Clone, Copy)]
pub struct ProjectionDefinition {
    pub names: &'static [&'static str],
    pub init: InitFn,
}

impl std::fmt::Debug for ProjectionDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectionDefinition")
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct Registry {
    definitions: Vec<ProjectionDefinition>,
    /// Lower-cased name -> index
    exact: HashMap<String, usize>,
    /// Normalized name -> index
    normalized: HashMap<String, usize>,
}

impl Registry {
    fn insert(&mut self, def: ProjectionDefinition) {
        let index = self.definitions.len();
        self.definitions.push(def);
        for name in def.names {
            self.exact.entry(name.to_lowercase()).or_insert(index);
            self.normalized.entry(projection_key(name)).or_insert(index);
        }
    }

    fn get(&self, name: &str) -> Option<ProjectionDefinition> {
        self.exact
            .get(&name.to_lowercase())
            .or_else(|| self.normalized.get(&projection_key(name)))
            .map(|&i| self.definitions[i])
    }
}

lazy_static! {
    static ref REGISTRY: RwLock<Registry> = {
        let mut registry = Registry::default();
        for def in super::builtin_definitions() {
            registry.insert(def);
        }
        tracing::debug!(count = registry.definitions.len(), "seeded projection registry");
        RwLock::new(registry)
    };
}

/// Add a projection. Names already taken keep their original binding.
pub fn register(def: ProjectionDefinition) {
    REGISTRY.write().insert(def);
}

/// Find a projection by name, case-insensitively and ignoring punctuation.
pub fn lookup(name: &str) -> Option<ProjectionDefinition> {
    REGISTRY.read().get(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proj::{Projection, Setup};

    struct Swap;

    impl Projection for Swap {
        fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
            Some((lat, lon))
        }

        fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
            Some((y, x))
        }
    }

    fn init_swap(_: &Setup<'_>) -> crate::error::Result<Box<dyn Projection>> {
        Ok(Box::new(Swap))
    }

    #[test]
    fn test_lookup_variants() {
        for name in [
            "tmerc",
            "Transverse_Mercator",
            "transverse mercator",
            "Lambert Conic Conformal (2SP)",
            "LAMBERT_CONFORMAL_CONIC_2SP",
            "Polar Stereographic (variant B)",
            "Hotine_Oblique_Mercator_Azimuth_Center",
            "longlat",
            "identity",
        ] {
            assert!(lookup(name).is_some(), "missing {name}");
        }
        assert!(lookup("no_such_projection").is_none());
    }

    #[test]
    fn test_register_custom() {
        register(ProjectionDefinition {
            names: &["test_swap_axes", "Test Swap Axes"],
            init: init_swap,
        });
        let def = lookup("test-swap-axes").unwrap();
        assert_eq!(def.names[0], "test_swap_axes");
    }

    #[test]
    fn test_existing_names_are_not_rebound() {
        register(ProjectionDefinition {
            names: &["merc"],
            init: init_swap,
        });
        let def = lookup("merc").unwrap();
        assert!(def.names.contains(&"Mercator"));
    }
}
