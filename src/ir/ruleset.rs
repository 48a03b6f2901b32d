//! The compiler's output: a `CompiledRuleSet` ready for the runtime
//! (spec §3 "CompiledRuleSet").

use std::{collections::HashMap, time::SystemTime};

use indexmap::IndexMap;
use serde_json::Value;

use super::{action::TransformSpec, plan::ExecutionPlan, rule::CompiledRule, semver::SemVer};

/// A resolved `ccm_mapping` entry (spec §3, §4.2 step 4).
#[derive(Debug, Clone)]
pub struct CcmFieldMapping {
    pub source_field:  String,
    pub transform:     Option<TransformSpec>,
    pub default_value: Option<Value>,
    pub required:      bool
}

/// The compiled CCM mapping: per-canonical-field source descriptors plus a
/// topological `validation_order` (spec §4.2 step 4).
#[derive(Debug, Clone, Default)]
pub struct CompiledCcmMapping {
    pub field_mappings:   IndexMap<String, CcmFieldMapping>,
    pub validation_order: Vec<String>
}

/// Rule-version compatibility policy (spec §6). All fields optional in the
/// source document, with the defaults below.
#[derive(Debug, Clone, Copy)]
pub struct CompatibilityConfig {
    pub auto_apply_patch:             bool,
    pub shadow_period_days:           u32,
    pub require_major_opt_in:         bool,
    pub validate_field_removals:      bool,
    pub validate_type_changes:        bool,
    pub validate_constraint_tightening: bool,
    pub fallback_on_error:            bool,
    pub max_fallback_versions:        u32
}

impl Default for CompatibilityConfig {
    fn default() -> Self {
        Self {
            auto_apply_patch:             true,
            shadow_period_days:           30,
            require_major_opt_in:         true,
            validate_field_removals:      true,
            validate_type_changes:        true,
            validate_constraint_tightening: true,
            fallback_on_error:            true,
            max_fallback_versions:        3
        }
    }
}

/// Compile-time counters (spec §3, §4.2 step 10, §6 "Stats format").
#[derive(Debug, Clone, Default)]
pub struct CompilationStats {
    pub total_rules:           usize,
    pub rules_by_type:         HashMap<String, usize>,
    pub rules_by_field:        HashMap<String, usize>,
    pub compilation_time_ms:   f64,
    pub optimizations_applied: usize
}

/// The runtime-ready form of an authored rule document (GLOSSARY
/// "Compiled rule set (IR)").
#[derive(Debug, Clone)]
pub struct CompiledRuleSet {
    pub schema_version:   String,
    pub marketplace:       String,
    pub version:           SemVer,
    /// Lowercase hex SHA-256 of the canonical document serialization.
    pub checksum:          String,
    pub compiled_at:       SystemTime,
    pub ccm_mapping:       CompiledCcmMapping,
    pub rules:             IndexMap<String, CompiledRule>,
    pub execution_plan:    ExecutionPlan,
    pub compatibility:     CompatibilityConfig,
    pub stats:             CompilationStats
}
