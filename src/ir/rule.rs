//! Compiled rule entries (spec §3 "RuleEntry", §4.1).

use serde::Serialize;

use super::{Action, Condition};

/// Severity of a failed assertion. Ordered lowest to highest, mirroring the
/// teacher's `rules::types::Severity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Info,
    Warning,
    Error
}

impl Severity {
    pub fn parse(raw: &str) -> Option<Self> {
        Some(match raw {
            "error" => Self::Error,
            "warning" => Self::Warning,
            "info" => Self::Info,
            _ => return None
        })
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error")
        }
    }
}

/// The unit of evaluation for a rule (spec §3 "RuleEntry").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    Row,
    Column,
    Global
}

impl RuleScope {
    pub fn parse(raw: &str) -> Option<Self> {
        Some(match raw {
            "row" => Self::Row,
            "column" => Self::Column,
            "global" => Self::Global,
            _ => return None
        })
    }
}

/// A fully resolved rule: condition/action pre-compiled, ready for the
/// runtime to dispatch without further interpretation.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub id:         String,
    pub field:      String,
    pub precedence: i64,
    pub scope:      RuleScope,
    pub condition:  Condition,
    pub action:     Action,
    pub message:    String,
    pub severity:   Severity,
    pub enabled:    bool,
    pub tags:       Vec<String>
}

impl CompiledRule {
    pub fn action_type(&self) -> &'static str {
        self.action.type_name()
    }
}
