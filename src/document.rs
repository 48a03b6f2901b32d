//! Raw rule document types, deserialized directly from the authored YAML
//! (or JSON) source, before compilation.
//!
//! Condition and action nodes are deserialized as flat structs with
//! optional fields rather than `serde`-tagged enums: the source format (spec
//! §3, §6 "Rule document surface") distinguishes simple from logical
//! condition nodes, and assert/transform/suggest action nodes, by which
//! keys are present rather than by an explicit tag, so the compiler (not
//! serde) resolves the variant. This mirrors how `original_source`'s
//! `compiler.py` reads the parsed dict directly.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

fn default_precedence() -> i64 {
    500
}

fn default_true() -> bool {
    true
}

/// Top-level document (spec §3 "RuleDocument").
#[derive(Debug, Clone, Deserialize)]
pub struct RuleDocument {
    pub schema_version:       String,
    pub marketplace:          String,
    pub version:              String,
    #[serde(default)]
    pub ccm_mapping:          IndexMap<String, CcmMappingNode>,
    pub rules:                Vec<RuleEntryNode>,
    #[serde(default)]
    pub compatibility:        Option<CompatibilityNode>,
    #[serde(default)]
    pub metadata:             Option<Value>
}

/// A `ccm_mapping` entry: either a bare source-column name, or a full
/// descriptor with transform/default/required (spec §3 "RuleDocument",
/// §4.2 step 4).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CcmMappingNode {
    Simple(String),
    Full {
        source: String,
        #[serde(default)]
        transform: Option<TransformNode>,
        #[serde(default)]
        default: Option<Value>,
        #[serde(default)]
        required: Option<bool>
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransformNode {
    #[serde(rename = "type")]
    pub kind:   String,
    #[serde(default)]
    pub params: HashMap<String, Value>
}

/// One authored rule (spec §3 "RuleEntry").
#[derive(Debug, Clone, Deserialize)]
pub struct RuleEntryNode {
    pub id:     String,
    pub field:  String,
    #[serde(rename = "type")]
    pub kind:   String,
    #[serde(default = "default_precedence")]
    pub precedence: i64,
    #[serde(default)]
    pub scope:  Option<String>,
    #[serde(default)]
    pub condition: Option<ConditionNode>,
    #[serde(default)]
    pub action: ActionNode,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub tags: Vec<String>
}

/// A condition tree node, flattened: exactly one of `and`/`or`/`not` marks a
/// logical node; otherwise it is a simple node carrying `operator` (spec §3
/// "Condition node").
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConditionNode {
    #[serde(default)]
    pub operator:       Option<String>,
    #[serde(default)]
    pub value:          Option<Value>,
    #[serde(default)]
    pub case_sensitive: Option<bool>,
    #[serde(default)]
    pub field:          Option<String>,
    #[serde(default)]
    pub and: Option<Vec<ConditionNode>>,
    #[serde(default)]
    pub or: Option<Vec<ConditionNode>>,
    #[serde(default)]
    pub not: Option<Box<ConditionNode>>
}

/// An action node, flattened over the three action kinds (spec §3 "Action
/// node"); the compiler picks the relevant fields by the rule's `type`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ActionNode {
    #[serde(default)]
    pub stop_on_error: Option<bool>,
    #[serde(default)]
    pub operation:     Option<String>,
    #[serde(default)]
    pub value:         Option<Value>,
    #[serde(default)]
    pub params:        HashMap<String, Value>,
    #[serde(default)]
    pub suggestions:   Vec<String>,
    #[serde(default)]
    pub confidence:    Option<f64>
}

/// Compatibility policy node (spec §6); all fields optional.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CompatibilityNode {
    #[serde(default)]
    pub auto_apply_patch: Option<bool>,
    #[serde(default)]
    pub shadow_period_days: Option<u32>,
    #[serde(default)]
    pub require_major_opt_in: Option<bool>,
    #[serde(default)]
    pub validate_field_removals: Option<bool>,
    #[serde(default)]
    pub validate_type_changes: Option<bool>,
    #[serde(default)]
    pub validate_constraint_tightening: Option<bool>,
    #[serde(default)]
    pub fallback_on_error: Option<bool>,
    #[serde(default)]
    pub max_fallback_versions: Option<u32>
}
