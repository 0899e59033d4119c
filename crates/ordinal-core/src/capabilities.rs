//! Capability gates consulted before any ordering operation.
//!
//! The gate answers two questions per content type: may the caller reorder
//! records of this type, and may the caller bulk-delete its trash. Hosts
//! with a real permission model implement [`CapabilityGate`] themselves; the
//! CLI uses [`ConfigGate`], which reads the `[types.*]` tables from
//! `.ordinal/config.toml`.
//!
//! Gates are infallible from the caller's perspective: an unknown type is
//! simply not permitted, and every decision is logged at `debug!`.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::{ProjectConfig, TypeConfig};

/// Boolean permission checks for a content type.
pub trait CapabilityGate {
    /// May the caller reorder records of `record_type`?
    fn can_reorder(&self, record_type: &str) -> bool;

    /// May the caller permanently delete trashed records of `record_type`?
    fn can_bulk_delete(&self, record_type: &str) -> bool;
}

/// Gate driven by the registered content types in project configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigGate {
    types: BTreeMap<String, TypeConfig>,
}

impl ConfigGate {
    #[must_use]
    pub const fn new(types: BTreeMap<String, TypeConfig>) -> Self {
        Self { types }
    }

    #[must_use]
    pub fn from_config(config: &ProjectConfig) -> Self {
        Self::new(config.types.clone())
    }
}

impl CapabilityGate for ConfigGate {
    fn can_reorder(&self, record_type: &str) -> bool {
        let allowed = self.types.get(record_type).is_some_and(|t| t.sortable);
        debug!(record_type, allowed, "can_reorder");
        allowed
    }

    fn can_bulk_delete(&self, record_type: &str) -> bool {
        let allowed = self.types.get(record_type).is_some_and(|t| t.bulk_delete);
        debug!(record_type, allowed, "can_bulk_delete");
        allowed
    }
}

/// Gate that answers the same for every type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticGate {
    pub reorder: bool,
    pub bulk_delete: bool,
}

impl StaticGate {
    /// Permit everything.
    #[must_use]
    pub const fn allow_all() -> Self {
        Self {
            reorder: true,
            bulk_delete: true,
        }
    }
}

impl CapabilityGate for StaticGate {
    fn can_reorder(&self, _record_type: &str) -> bool {
        self.reorder
    }

    fn can_bulk_delete(&self, _record_type: &str) -> bool {
        self.bulk_delete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_registers_page_only() {
        let gate = ConfigGate::from_config(&ProjectConfig::default());
        assert!(gate.can_reorder("page"));
        assert!(gate.can_bulk_delete("page"));
        assert!(!gate.can_reorder("post"));
        assert!(!gate.can_bulk_delete("post"));
    }

    #[test]
    fn per_type_switches_are_honoured() {
        let gate = ConfigGate::new(BTreeMap::from([(
            "faq".to_string(),
            TypeConfig {
                sortable: true,
                bulk_delete: false,
            },
        )]));
        assert!(gate.can_reorder("faq"));
        assert!(!gate.can_bulk_delete("faq"));
    }

    #[test]
    fn static_gate_ignores_type() {
        let gate = StaticGate {
            reorder: false,
            bulk_delete: true,
        };
        assert!(!gate.can_reorder("anything"));
        assert!(gate.can_bulk_delete("anything"));
        assert!(StaticGate::allow_all().can_reorder("page"));
    }
}
