//! Condition evaluation: a vectorized column-wise path (spec §4.3.2) and a
//! row-wise fallback used when vectorized evaluation can't proceed (a
//! referenced column is absent from the table).

use regex::Regex;
use std::sync::LazyLock;

use crate::{
    ir::{Condition, Operator, SimpleCondition},
    table::Table
};

use super::cache::{cache_key, ConditionCache};

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap());
static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());

/// Evaluate a rule's condition over every row of `table`, consulting and
/// populating the condition cache (spec §4.3.4). Returns the boolean
/// column and whether the result came from cache.
pub fn evaluate_with_cache(
    rule_id: &str,
    condition: &Condition,
    default_field: &str,
    table: &Table,
    table_identity: u64,
    cache: &ConditionCache,
    cache_enabled: bool
) -> (Vec<bool>, bool) {
    let key = cache_key(rule_id, default_field, table_identity);
    if cache_enabled
        && let Some(cached) = cache.get(key)
    {
        return (cached, true);
    }

    let column = evaluate_column(condition, default_field, table);

    if cache_enabled {
        cache.insert(key, column.clone());
    }
    (column, false)
}

/// Column-wise evaluation. Falls back to row-wise per-row evaluation when
/// the target column referenced by a simple node is absent from the table
/// (spec §4.3.2 "If evaluation of any sub-expression raises, the rule
/// falls back to sequential row-wise evaluation").
pub fn evaluate_column(condition: &Condition, default_field: &str, table: &Table) -> Vec<bool> {
    let row_count = table.row_count();
    match try_evaluate_column(condition, default_field, table, row_count) {
        Some(column) => column,
        None => (0..row_count)
            .map(|row| evaluate_row(condition, default_field, table, row))
            .collect()
    }
}

fn try_evaluate_column(
    condition: &Condition,
    default_field: &str,
    table: &Table,
    row_count: usize
) -> Option<Vec<bool>> {
    match condition {
        Condition::Simple(simple) => {
            let field = simple.field.as_deref().unwrap_or(default_field);
            if !table.has_column(field) {
                return None;
            }
            Some((0..row_count).map(|row| eval_simple(simple, table, field, row)).collect())
        }
        Condition::And(children) => {
            let columns: Option<Vec<Vec<bool>>> = children
                .iter()
                .map(|c| try_evaluate_column(c, default_field, table, row_count))
                .collect();
            columns.map(|cols| {
                (0..row_count).map(|row| cols.iter().all(|col| col[row])).collect()
            })
        }
        Condition::Or(children) => {
            let columns: Option<Vec<Vec<bool>>> = children
                .iter()
                .map(|c| try_evaluate_column(c, default_field, table, row_count))
                .collect();
            columns.map(|cols| {
                (0..row_count).map(|row| cols.iter().any(|col| col[row])).collect()
            })
        }
        Condition::Not(child) => try_evaluate_column(child, default_field, table, row_count)
            .map(|col| col.into_iter().map(|b| !b).collect())
    }
}

/// Row-wise tree walk, used as the fallback and for `global`/`column` scope
/// single evaluations.
pub fn evaluate_row(condition: &Condition, default_field: &str, table: &Table, row: usize) -> bool {
    match condition {
        Condition::Simple(simple) => {
            let field = simple.field.as_deref().unwrap_or(default_field);
            eval_simple(simple, table, field, row)
        }
        Condition::And(children) => children
            .iter()
            .all(|c| evaluate_row(c, default_field, table, row)),
        Condition::Or(children) => children
            .iter()
            .any(|c| evaluate_row(c, default_field, table, row)),
        Condition::Not(child) => !evaluate_row(child, default_field, table, row)
    }
}

fn eval_simple(simple: &SimpleCondition, table: &Table, field: &str, row: usize) -> bool {
    let is_null = table.column(field).map(|c| c.is_null(row)).unwrap_or(true);

    match simple.operator {
        Operator::Empty => is_null || is_blank(table, field, row),
        Operator::NotEmpty => !is_null && !is_blank(table, field, row),
        Operator::IsNumber => !is_null && table.column(field).unwrap().get_numeric(row).is_some(),
        Operator::IsEmail => string_matches(table, field, row, &EMAIL_PATTERN),
        Operator::IsUrl => string_matches(table, field, row, &URL_PATTERN),
        Operator::IsDate => !is_null && parse_date(table, field, row).is_some(),
        Operator::Eq | Operator::Ne => eval_equality(simple, table, field, row),
        Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => {
            eval_numeric_comparison(simple, table, field, row)
        }
        Operator::Contains | Operator::StartsWith | Operator::EndsWith => {
            eval_string_predicate(simple, table, field, row)
        }
        Operator::Matches => {
            !is_null
                && simple
                    .regex
                    .as_ref()
                    .zip(table.column(field).and_then(|c| c.get_string(row)))
                    .is_some_and(|(re, s)| re.is_match(&s))
        }
        Operator::In | Operator::NotIn => eval_membership(simple, table, field, row),
        Operator::LengthEq | Operator::LengthGt | Operator::LengthLt => {
            eval_length_predicate(simple, table, field, row)
        }
    }
}

fn is_blank(table: &Table, field: &str, row: usize) -> bool {
    table
        .column(field)
        .and_then(|c| c.get_string(row))
        .map(|s| s.trim().is_empty())
        .unwrap_or(true)
}

fn string_matches(table: &Table, field: &str, row: usize, pattern: &Regex) -> bool {
    table
        .column(field)
        .and_then(|c| c.get_string(row))
        .is_some_and(|s| pattern.is_match(&s))
}

fn parse_date(table: &Table, field: &str, row: usize) -> Option<chrono::NaiveDate> {
    let raw = table.column(field)?.get_string(row)?;
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw.trim()) {
        return Some(dt.naive_utc().date());
    }
    ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"]
        .iter()
        .find_map(|fmt| chrono::NaiveDate::parse_from_str(raw.trim(), fmt).ok())
}

fn eval_equality(simple: &SimpleCondition, table: &Table, field: &str, row: usize) -> bool {
    let Some(actual) = table.column(field).and_then(|c| c.get_string(row)) else {
        return simple.operator == Operator::Ne && simple.value.is_some();
    };
    let Some(expected) = simple.value.as_ref().and_then(|v| v.as_str()) else { return false };

    let equal = if simple.case_sensitive {
        actual == expected
    } else {
        actual.eq_ignore_ascii_case(expected)
    };
    if simple.operator == Operator::Eq { equal } else { !equal }
}

fn eval_numeric_comparison(simple: &SimpleCondition, table: &Table, field: &str, row: usize) -> bool {
    let Some(actual) = table.column(field).and_then(|c| c.get_numeric(row)) else { return false };
    let Some(expected) = simple.value.as_ref().and_then(|v| v.as_f64()) else { return false };

    match simple.operator {
        Operator::Gt => actual > expected,
        Operator::Gte => actual >= expected,
        Operator::Lt => actual < expected,
        Operator::Lte => actual <= expected,
        _ => unreachable!()
    }
}

fn eval_string_predicate(simple: &SimpleCondition, table: &Table, field: &str, row: usize) -> bool {
    let Some(actual) = table.column(field).and_then(|c| c.get_string(row)) else { return false };
    let Some(expected) = simple.value.as_ref().and_then(|v| v.as_str()) else { return false };

    let (actual, expected) = if simple.case_sensitive {
        (actual, expected.to_string())
    } else {
        (actual.to_lowercase(), expected.to_lowercase())
    };

    match simple.operator {
        Operator::Contains => actual.contains(&expected),
        Operator::StartsWith => actual.starts_with(&expected),
        Operator::EndsWith => actual.ends_with(&expected),
        _ => unreachable!()
    }
}

fn eval_membership(simple: &SimpleCondition, table: &Table, field: &str, row: usize) -> bool {
    let Some(actual) = table.column(field).and_then(|c| c.get_string(row)) else { return false };
    let Some(set) = &simple.set else { return false };
    let member = set.contains(&actual);
    if simple.operator == Operator::In { member } else { !member }
}

fn eval_length_predicate(simple: &SimpleCondition, table: &Table, field: &str, row: usize) -> bool {
    let Some(actual) = table.column(field).and_then(|c| c.get_string(row)) else { return false };
    let Some(expected) = simple.value.as_ref().and_then(|v| v.as_i64()) else { return false };
    let len = actual.chars().count() as i64;

    match simple.operator {
        Operator::LengthEq => len == expected,
        Operator::LengthGt => len > expected,
        Operator::LengthLt => len < expected,
        _ => unreachable!()
    }
}
