//! A columnar, named, typed table (spec §3 "Table model", §9
//! re-architecture guidance: typed arrays with a null bitmap in place of a
//! dynamically typed DataFrame cell).

use compact_str::CompactString;
use indexmap::IndexMap;
use serde_json::Value;

/// One column's storage: a typed array plus a null bitmap (spec §9).
/// Values that fail numeric/date coercion stay in their original textual
/// form; operators needing coercion fall back to "false" rather than
/// erroring (spec §4.3.2). String cells are `CompactString`, which inlines
/// short values (SKUs, titles, currency codes) without heap allocation —
/// the common case for this domain's columns.
#[derive(Debug, Clone)]
pub enum ColumnData {
    String(Vec<Option<CompactString>>),
    Number(Vec<Option<f64>>),
    Bool(Vec<Option<bool>>)
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::String(v) => v.len(),
            ColumnData::Number(v) => v.len(),
            ColumnData::Bool(v) => v.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read one cell as an owned JSON value (the common currency between
    /// the table and condition/action evaluation).
    pub fn get(&self, row: usize) -> Option<Value> {
        match self {
            ColumnData::String(v) => v.get(row).and_then(|c| c.clone()).map(|s| Value::String(s.to_string())),
            ColumnData::Number(v) => v
                .get(row)
                .and_then(|c| *c)
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            ColumnData::Bool(v) => v.get(row).and_then(|c| *c).map(Value::Bool)
        }
    }

    /// Best-effort numeric coercion of a cell (spec §4.3.2 `gt`/`gte`/…).
    pub fn get_numeric(&self, row: usize) -> Option<f64> {
        match self {
            ColumnData::Number(v) => v.get(row).copied().flatten(),
            ColumnData::String(v) => v.get(row).and_then(|c| c.as_ref()).and_then(|s| {
                s.trim().replace(',', ".").parse::<f64>().ok()
            }),
            ColumnData::Bool(_) => None
        }
    }

    /// Best-effort string view of a cell, for string operators.
    pub fn get_string(&self, row: usize) -> Option<String> {
        match self {
            ColumnData::String(v) => v.get(row).and_then(|c| c.clone()).map(|s| s.to_string()),
            ColumnData::Number(v) => v.get(row).and_then(|c| *c).map(|n| n.to_string()),
            ColumnData::Bool(v) => v.get(row).and_then(|c| *c).map(|b| b.to_string())
        }
    }

    pub fn is_null(&self, row: usize) -> bool {
        match self {
            ColumnData::String(v) => v.get(row).map(Option::is_none).unwrap_or(true),
            ColumnData::Number(v) => v.get(row).map(Option::is_none).unwrap_or(true),
            ColumnData::Bool(v) => v.get(row).map(Option::is_none).unwrap_or(true)
        }
    }

    fn with_string_set(&self, row: usize, value: String) -> ColumnData {
        match self {
            ColumnData::String(v) => {
                let mut v = v.clone();
                v[row] = Some(CompactString::from(value));
                ColumnData::String(v)
            }
            other => other.clone()
        }
    }
}

/// A columnar relation. Row identity is ordinal index in `[0, row_count)`.
/// No in-place mutation: `with_column` returns a new table reflecting one
/// column's updated values, used to materialize the transformation phase's
/// working table (spec §4.3 top-level control flow).
#[derive(Debug, Clone)]
pub struct Table {
    columns:   IndexMap<String, ColumnData>,
    row_count: usize
}

impl Table {
    pub fn new(columns: IndexMap<String, ColumnData>) -> Self {
        let row_count = columns.values().map(ColumnData::len).max().unwrap_or(0);
        Self { columns, row_count }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns.get(name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn cell(&self, column: &str, row: usize) -> Option<Value> {
        self.columns.get(column).and_then(|c| c.get(row))
    }

    /// Apply a single-cell string update, returning a new table (row-level
    /// transforms materialize one cell at a time into a fresh column).
    pub fn with_cell_string(&self, column: &str, row: usize, value: String) -> Table {
        let mut columns = self.columns.clone();
        if let Some(existing) = columns.get(column) {
            columns.insert(column.to_string(), existing.with_string_set(row, value));
        }
        Table { columns, row_count: self.row_count }
    }

    /// Build from a header row plus string rows, as read from a CSV file —
    /// every column starts out as an opaque string column; operators that
    /// need numeric coercion call `get_numeric` per spec §9.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Table {
        let mut columns: IndexMap<String, ColumnData> = IndexMap::new();
        for (idx, header) in headers.iter().enumerate() {
            let values: Vec<Option<CompactString>> = rows
                .iter()
                .map(|row| row.get(idx).map(|s| CompactString::from(s.as_str())).filter(|s| !s.is_empty()))
                .collect();
            columns.insert(header.clone(), ColumnData::String(values));
        }
        Table::new(columns)
    }

    /// Rename source columns to canonical names using the compiled CCM
    /// mapping, filling absent canonical columns with each mapping's default
    /// value repeated over every row (spec §4.5 "Transform table", consumed
    /// optionally by the runtime to canonicalize the inbound table before
    /// rule evaluation per spec §4.3). Columns the mapping doesn't mention
    /// pass through unchanged.
    pub fn remap(&self, mapping: &crate::ir::CompiledCcmMapping) -> Table {
        let mut columns: IndexMap<String, ColumnData> = IndexMap::new();
        let mut consumed_sources = std::collections::HashSet::new();

        for (canonical, field_mapping) in &mapping.field_mappings {
            if let Some(source) = self.columns.get(&field_mapping.source_field) {
                consumed_sources.insert(field_mapping.source_field.clone());
                columns.insert(canonical.clone(), source.clone());
            } else if let Some(default) = &field_mapping.default_value {
                let text = default.as_str().map(str::to_string).unwrap_or_else(|| default.to_string());
                columns.insert(
                    canonical.clone(),
                    ColumnData::String(vec![Some(CompactString::from(text)); self.row_count])
                );
            }
        }

        for (name, column) in &self.columns {
            if !consumed_sources.contains(name) {
                columns.entry(name.clone()).or_insert_with(|| column.clone());
            }
        }

        Table { columns, row_count: self.row_count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_coercion_ignores_non_numeric_cells() {
        let col = ColumnData::String(vec![Some(CompactString::from("10")), Some(CompactString::from("abc")), None]);
        assert_eq!(col.get_numeric(0), Some(10.0));
        assert_eq!(col.get_numeric(1), None);
        assert_eq!(col.get_numeric(2), None);
    }

    #[test]
    fn row_count_is_max_column_length() {
        let mut columns = IndexMap::new();
        columns.insert("a".to_string(), ColumnData::String(vec![Some(CompactString::from("x"))]));
        let table = Table::new(columns);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn remap_renames_source_columns_to_canonical_names() {
        use crate::ir::{CcmFieldMapping, CompiledCcmMapping};

        let mut columns = IndexMap::new();
        columns.insert(
            "nome_produto".to_string(),
            ColumnData::String(vec![Some(CompactString::from("Widget"))])
        );
        let table = Table::new(columns);

        let mut field_mappings = IndexMap::new();
        field_mappings.insert(
            "title".to_string(),
            CcmFieldMapping {
                source_field: "nome_produto".to_string(),
                transform: None,
                default_value: None,
                required: true
            }
        );
        let mapping = CompiledCcmMapping { field_mappings, validation_order: vec!["title".to_string()] };

        let remapped = table.remap(&mapping);
        assert!(remapped.has_column("title"));
        assert!(!remapped.has_column("nome_produto"));
        assert_eq!(remapped.cell("title", 0).unwrap(), serde_json::json!("Widget"));
    }

    #[test]
    fn remap_fills_missing_source_with_default() {
        use crate::ir::{CcmFieldMapping, CompiledCcmMapping};

        let mut columns = IndexMap::new();
        columns.insert(
            "sku".to_string(),
            ColumnData::String(vec![Some(CompactString::from("A")), Some(CompactString::from("B"))])
        );
        let table = Table::new(columns);

        let mut field_mappings = IndexMap::new();
        field_mappings.insert(
            "currency".to_string(),
            CcmFieldMapping {
                source_field: "moeda".to_string(),
                transform: None,
                default_value: Some(serde_json::json!("BRL")),
                required: false
            }
        );
        let mapping = CompiledCcmMapping { field_mappings, validation_order: vec!["currency".to_string()] };

        let remapped = table.remap(&mapping);
        assert_eq!(remapped.row_count(), 2);
        assert_eq!(remapped.cell("currency", 0).unwrap(), serde_json::json!("BRL"));
        assert_eq!(remapped.cell("currency", 1).unwrap(), serde_json::json!("BRL"));
    }
}
