//! Canonical Field Model (C4): a fixed schema of commerce-domain columns
//! with declared types and validators, independent of any marketplace's
//! source schema (spec §4.5, GLOSSARY).

mod fields;
mod normalize;
mod validate;

use indexmap::IndexMap;
use serde_json::Value;

pub use fields::{CcmField, FieldType, FIELDS};
pub use validate::FieldValidation;

/// The canonical field model. Stateless; injected at construction rather
/// than accessed as a global singleton (spec §9 re-architecture guidance),
/// so tests can substitute alternates if the catalog ever needs one.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cfm;

impl Cfm {
    pub fn lookup(&self, name: &str) -> Option<&'static CcmField> {
        fields::lookup(name)
    }

    pub fn fields(&self) -> &'static [CcmField] {
        FIELDS
    }

    /// Validate one record field-by-field, plus the cross-field checks
    /// (spec §4.5 "Responsibilities").
    pub fn validate_record(&self, record: &IndexMap<String, Value>) -> Vec<FieldValidation> {
        let mut results: Vec<FieldValidation> = FIELDS
            .iter()
            .map(|field| validate::validate_field(field, record.get(field.name)))
            .collect();

        if let Some(result) = validate::check_dimensions_all_or_none(record) {
            results.push(result);
        }
        if let Some(result) = validate::check_price_currency_consistency(record) {
            results.push(result);
        }

        results
    }

    /// Normalize every known field present in the record into its
    /// canonical representation.
    pub fn normalize_record(&self, record: &IndexMap<String, Value>) -> IndexMap<String, Value> {
        let mut out = record.clone();
        for field in FIELDS {
            if let Some(value) = record.get(field.name).filter(|v| !v.is_null()) {
                out.insert(field.name.to_string(), normalize::normalize(field.field_type, value));
            }
        }
        out
    }

    /// Rename source columns to canonical names using the compiled CCM
    /// mapping (spec §4.5 "Transform table").
    pub fn remap_table(
        &self,
        record: &IndexMap<String, Value>,
        mapping: &crate::ir::CompiledCcmMapping
    ) -> IndexMap<String, Value> {
        let mut out = IndexMap::new();
        for (canonical, field_mapping) in &mapping.field_mappings {
            let value = record
                .get(&field_mapping.source_field)
                .cloned()
                .or_else(|| field_mapping.default_value.clone());
            if let Some(value) = value {
                out.insert(canonical.clone(), value);
            }
        }
        for (key, value) in record {
            out.entry(key.clone()).or_insert_with(|| value.clone());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn required_field_missing_is_invalid() {
        let cfm = Cfm;
        let record = IndexMap::new();
        let results = cfm.validate_record(&record);
        let title = results.iter().find(|r| r.field == "title").unwrap();
        assert!(!title.is_valid);
    }

    #[test]
    fn brl_decimal_comma_normalizes() {
        let cfm = Cfm;
        let mut record = IndexMap::new();
        record.insert("sku".to_string(), json!("ABC-1"));
        record.insert("title".to_string(), json!("Widget"));
        record.insert("price_brl".to_string(), json!("1.234,56"));
        let results = cfm.validate_record(&record);
        let price = results.iter().find(|r| r.field == "price_brl").unwrap();
        assert!(price.is_valid);
        assert_eq!(price.normalized.as_ref().unwrap().as_f64().unwrap(), 1234.56);
    }

    #[test]
    fn dimensions_partial_presence_is_invalid() {
        let cfm = Cfm;
        let mut record = IndexMap::new();
        record.insert("sku".to_string(), json!("ABC-1"));
        record.insert("title".to_string(), json!("Widget"));
        record.insert("price_brl".to_string(), json!(9.9));
        record.insert("length_cm".to_string(), json!(10));
        let results = cfm.validate_record(&record);
        assert!(results.iter().any(|r| r.field == "dimensions" && !r.is_valid));
    }

    #[test]
    fn price_without_brl_currency_is_invalid() {
        let cfm = Cfm;
        let mut record = IndexMap::new();
        record.insert("sku".to_string(), json!("ABC-1"));
        record.insert("title".to_string(), json!("Widget"));
        record.insert("price_brl".to_string(), json!(9.9));
        record.insert("currency".to_string(), json!("USD"));
        let results = cfm.validate_record(&record);
        assert!(results.iter().any(|r| r.field == "currency" && !r.is_valid));
    }

    fn valid_record() -> IndexMap<String, serde_json::Value> {
        let mut record = IndexMap::new();
        record.insert("sku".to_string(), json!("ABC-1.0"));
        record.insert("title".to_string(), json!("A fully fledged product"));
        record.insert("price_brl".to_string(), json!(19.9));
        record
    }

    #[test]
    fn negative_stock_is_invalid() {
        let cfm = Cfm;
        let mut record = valid_record();
        record.insert("stock".to_string(), json!(-1));
        let results = cfm.validate_record(&record);
        let stock = results.iter().find(|r| r.field == "stock").unwrap();
        assert!(!stock.is_valid);
    }

    #[test]
    fn zero_price_is_invalid() {
        let cfm = Cfm;
        let mut record = valid_record();
        record.insert("price_brl".to_string(), json!(0));
        let results = cfm.validate_record(&record);
        let price = results.iter().find(|r| r.field == "price_brl").unwrap();
        assert!(!price.is_valid);
    }

    #[test]
    fn negative_dimension_is_invalid() {
        let cfm = Cfm;
        let mut record = valid_record();
        record.insert("length_cm".to_string(), json!(-5));
        record.insert("width_cm".to_string(), json!(5));
        record.insert("height_cm".to_string(), json!(5));
        let results = cfm.validate_record(&record);
        let length = results.iter().find(|r| r.field == "length_cm").unwrap();
        assert!(!length.is_valid);
    }

    #[test]
    fn invalid_image_url_is_rejected() {
        let cfm = Cfm;
        let mut record = valid_record();
        record.insert("images".to_string(), json!(["not a url", "https://example.com/a.jpg"]));
        let results = cfm.validate_record(&record);
        let images = results.iter().find(|r| r.field == "images").unwrap();
        assert!(!images.is_valid);
    }

    #[test]
    fn valid_image_urls_pass() {
        let cfm = Cfm;
        let mut record = valid_record();
        record.insert(
            "images".to_string(),
            json!(["https://example.com/a.jpg", "http://example.com/b.jpg"])
        );
        let results = cfm.validate_record(&record);
        let images = results.iter().find(|r| r.field == "images").unwrap();
        assert!(images.is_valid);
    }

    #[test]
    fn gtin_rejects_non_canonical_lengths() {
        let cfm = Cfm;
        let mut record = valid_record();
        record.insert("gtin".to_string(), json!("1234567890"));
        let results = cfm.validate_record(&record);
        assert!(!results.iter().find(|r| r.field == "gtin").unwrap().is_valid);

        record.insert("gtin".to_string(), json!("12345678"));
        let results = cfm.validate_record(&record);
        assert!(results.iter().find(|r| r.field == "gtin").unwrap().is_valid);
    }

    #[test]
    fn ncm_requires_dotted_format() {
        let cfm = Cfm;
        let mut record = valid_record();
        record.insert("ncm".to_string(), json!("12345678"));
        let results = cfm.validate_record(&record);
        assert!(!results.iter().find(|r| r.field == "ncm").unwrap().is_valid);

        record.insert("ncm".to_string(), json!("1234.56.78"));
        let results = cfm.validate_record(&record);
        assert!(results.iter().find(|r| r.field == "ncm").unwrap().is_valid);
    }

    #[test]
    fn currency_only_accepts_three_codes() {
        let cfm = Cfm;
        let mut record = valid_record();
        record.insert("currency".to_string(), json!("GBP"));
        let results = cfm.validate_record(&record);
        assert!(!results.iter().find(|r| r.field == "currency").unwrap().is_valid);

        record.insert("currency".to_string(), json!("EUR"));
        let results = cfm.validate_record(&record);
        assert!(results.iter().find(|r| r.field == "currency").unwrap().is_valid);
    }

    #[test]
    fn boolean_accepts_portuguese_full_words_not_single_letters() {
        let cfm = Cfm;
        let mut record = valid_record();
        record.insert("attributes".to_string(), json!({"in_stock": "verdadeiro"}));
        let normalized = cfm.normalize_record(&record);
        assert_eq!(normalized.get("attributes").unwrap(), &json!({"in_stock": "verdadeiro"}));

        assert_eq!(
            super::normalize::normalize(super::fields::FieldType::Boolean, &json!("verdadeiro")),
            json!(true)
        );
        assert_eq!(
            super::normalize::normalize(super::fields::FieldType::Boolean, &json!("falso")),
            json!(false)
        );
        assert_eq!(
            super::normalize::normalize(super::fields::FieldType::Boolean, &json!("y")),
            json!("y"),
            "single-letter tokens are not part of the accepted boolean vocabulary"
        );
    }
}
