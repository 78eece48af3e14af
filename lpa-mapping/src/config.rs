//! Mapping engine configuration.

use serde::{Deserialize, Serialize};

/// What to do when aggregate resolution reaches an entry it is already resolving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePolicy {
    /// Abort the load with a reference-cycle error.
    #[default]
    Fail,
    /// Leave the referencing field untouched and keep going.
    Skip,
}

/// How many levels of an entity hierarchy must carry the entity marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyPolicy {
    /// Only the most-derived type must be marked; only its object classes gate a load.
    #[default]
    LeafOnly,
    /// Every level must be marked and every level's object classes gate a load.
    EveryLevel,
}

/// Mapper configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Attribute holding an entry's object classes.
    pub object_class_attribute: String,
    pub cycle_policy: CyclePolicy,
    /// Maximum nesting of aggregate resolution in one load.
    pub max_resolution_depth: usize,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            object_class_attribute: lpa_types::OBJECT_CLASS.to_string(),
            cycle_policy: CyclePolicy::Fail,
            max_resolution_depth: 16,
        }
    }
}

impl MapperConfig {
    pub fn with_cycle_policy(mut self, policy: CyclePolicy) -> Self {
        self.cycle_policy = policy;
        self
    }

    pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth;
        self
    }
}
