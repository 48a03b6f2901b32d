//! The execution plan (spec §3 "ExecutionPlan", §4.2 steps 7-9).

use indexmap::IndexMap;
use std::collections::BTreeMap;

/// How a rule group is dispatched by the runtime (spec §4.3 top-level
/// control flow).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Sequential,
    Parallel,
    Vectorized
}

/// One of the three strictly ordered execution phases (spec §4.3, GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PhaseType {
    Validation,
    Transformation,
    Suggestion
}

impl PhaseType {
    /// Derive the owning phase from an action's type (REDESIGN FLAG:
    /// derived from `action.type`, not an id-prefix heuristic).
    pub fn for_action_type(action_type: &str) -> Self {
        match action_type {
            "assert" => Self::Validation,
            "transform" => Self::Transformation,
            "suggest" => Self::Suggestion,
            other => unreachable!("unknown action type reached phase split: {other}")
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Transformation => "transformation",
            Self::Suggestion => "suggestion"
        }
    }
}

/// A set of co-executing rules sharing an execution mode.
#[derive(Debug, Clone)]
pub struct RuleGroup {
    pub rule_ids:        Vec<String>,
    pub execution_mode:  ExecutionMode,
    /// External fields this group's rules depend on (other than their own
    /// target field).
    pub dependencies:    Vec<String>
}

/// One phase: an ordered list of rule groups.
#[derive(Debug, Clone)]
pub struct ExecutionPhase {
    pub phase_type:   PhaseType,
    pub rule_groups:  Vec<RuleGroup>,
    pub can_vectorize: bool
}

/// The full partition of a `CompiledRuleSet`'s rules into phases and groups,
/// plus the lookup indices the runtime uses to dispatch efficiently.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    pub phases:           Vec<ExecutionPhase>,
    pub field_index:      IndexMap<String, Vec<String>>,
    pub precedence_index: BTreeMap<i64, Vec<String>>,
    pub parallel_groups:  Vec<Vec<String>>,
    pub optimizations:    Vec<String>
}
