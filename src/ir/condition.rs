//! Compiled condition trees.
//!
//! A [`Condition`] is the resolved form of a rule document's condition
//! node: regexes are pre-compiled, `in`/`not_in` lists are materialized as
//! sets, and logical combinators own their children exclusively (no
//! cycles, no shared mutable state).

use std::collections::HashSet;

use regex::Regex;
use serde_json::Value;

/// Recognized simple condition operators (spec §4.3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    StartsWith,
    EndsWith,
    Matches,
    In,
    NotIn,
    Empty,
    NotEmpty,
    LengthEq,
    LengthGt,
    LengthLt,
    IsNumber,
    IsEmail,
    IsUrl,
    IsDate
}

impl Operator {
    /// Parse the document's string spelling of an operator.
    pub fn parse(raw: &str) -> Option<Self> {
        Some(match raw {
            "eq" => Self::Eq,
            "ne" => Self::Ne,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "contains" => Self::Contains,
            "startswith" => Self::StartsWith,
            "endswith" => Self::EndsWith,
            "matches" => Self::Matches,
            "in" => Self::In,
            "not_in" => Self::NotIn,
            "empty" => Self::Empty,
            "not_empty" => Self::NotEmpty,
            "length_eq" => Self::LengthEq,
            "length_gt" => Self::LengthGt,
            "length_lt" => Self::LengthLt,
            "is_number" => Self::IsNumber,
            "is_email" => Self::IsEmail,
            "is_url" => Self::IsUrl,
            "is_date" => Self::IsDate,
            _ => return None
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Contains => "contains",
            Self::StartsWith => "startswith",
            Self::EndsWith => "endswith",
            Self::Matches => "matches",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::Empty => "empty",
            Self::NotEmpty => "not_empty",
            Self::LengthEq => "length_eq",
            Self::LengthGt => "length_gt",
            Self::LengthLt => "length_lt",
            Self::IsNumber => "is_number",
            Self::IsEmail => "is_email",
            Self::IsUrl => "is_url",
            Self::IsDate => "is_date"
        }
    }

    /// Whether this operator has a column-wise vectorized implementation
    /// (spec §4.2 step 7: every simple operator in §4.3.2 is vectorizable).
    pub fn is_vectorizable(&self) -> bool {
        true
    }
}

/// A resolved simple (leaf) condition.
#[derive(Debug, Clone)]
pub struct SimpleCondition {
    pub operator:       Operator,
    /// Column this condition reads; `None` means "the rule's own field".
    pub field:          Option<String>,
    pub value:          Option<Value>,
    pub case_sensitive: bool,
    /// Pre-compiled regex, present only for `matches`.
    pub regex:          Option<Regex>,
    /// Materialized membership set, present only for `in`/`not_in`.
    pub set:            Option<HashSet<String>>
}

/// A compiled condition tree.
#[derive(Debug, Clone)]
pub enum Condition {
    Simple(SimpleCondition),
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>)
}

impl Condition {
    /// The set of columns this condition tree reads, excluding the rule's
    /// own field (which is implicit for operators that omit `field`).
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Condition::Simple(simple) => {
                if let Some(field) = &simple.field {
                    out.push(field.as_str());
                }
            }
            Condition::And(children) | Condition::Or(children) => {
                for child in children {
                    child.collect_fields(out);
                }
            }
            Condition::Not(child) => child.collect_fields(out)
        }
    }
}
