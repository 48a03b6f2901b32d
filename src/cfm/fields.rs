//! The canonical field catalog (spec §4.5; field list grounded in
//! `original_source/.../engine/ccm.py`'s `CCM.FIELDS`).

/// Semantic type of a canonical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Decimal,
    Boolean,
    Array,
    Object,
    Url,
    Date,
    Currency
}

/// A declared canonical field: type, required flag, bounds, pattern, and
/// allowed values.
#[derive(Debug, Clone)]
pub struct CcmField {
    pub name:            &'static str,
    pub field_type:       FieldType,
    pub required:         bool,
    pub min_length:       Option<usize>,
    pub max_length:       Option<usize>,
    pub pattern:          Option<&'static str>,
    pub allowed_values:   Option<&'static [&'static str]>,
    pub description:      &'static str
}

const CURRENCY_CODES: &[&str] = &["BRL", "USD", "EUR"];

/// The fixed set of canonical commerce fields this engine understands.
pub const FIELDS: &[CcmField] = &[
    CcmField {
        name: "sku",
        field_type: FieldType::String,
        required: true,
        min_length: Some(1),
        max_length: Some(100),
        pattern: Some(r"^[A-Za-z0-9\-_\.]+$"),
        allowed_values: None,
        description: "Unique stock-keeping unit identifier"
    },
    CcmField {
        name: "title",
        field_type: FieldType::String,
        required: true,
        min_length: Some(10),
        max_length: Some(200),
        pattern: None,
        allowed_values: None,
        description: "Product display title"
    },
    CcmField {
        name: "description",
        field_type: FieldType::String,
        required: false,
        min_length: Some(20),
        max_length: Some(5000),
        pattern: None,
        allowed_values: None,
        description: "Long-form product description"
    },
    CcmField {
        name: "brand",
        field_type: FieldType::String,
        required: false,
        min_length: None,
        max_length: Some(100),
        pattern: None,
        allowed_values: None,
        description: "Brand or manufacturer name"
    },
    CcmField {
        name: "category_path",
        field_type: FieldType::String,
        required: false,
        min_length: None,
        max_length: Some(300),
        pattern: None,
        allowed_values: None,
        description: "Slash-separated marketplace category path"
    },
    CcmField {
        name: "gtin",
        field_type: FieldType::String,
        required: false,
        min_length: None,
        max_length: None,
        pattern: Some(r"^(\d{8}|\d{12}|\d{13}|\d{14})$"),
        allowed_values: None,
        description: "Global Trade Item Number (EAN/UPC)"
    },
    CcmField {
        name: "ncm",
        field_type: FieldType::String,
        required: false,
        min_length: None,
        max_length: None,
        pattern: Some(r"^\d{4}\.\d{2}\.\d{2}$"),
        allowed_values: None,
        description: "Brazilian Mercosul Common Nomenclature code"
    },
    CcmField {
        name: "price_brl",
        field_type: FieldType::Decimal,
        required: true,
        min_length: None,
        max_length: None,
        pattern: None,
        allowed_values: None,
        description: "Listing price in Brazilian reais"
    },
    CcmField {
        name: "currency",
        field_type: FieldType::Currency,
        required: false,
        min_length: None,
        max_length: None,
        pattern: None,
        allowed_values: Some(CURRENCY_CODES),
        description: "ISO 4217 currency code"
    },
    CcmField {
        name: "stock",
        field_type: FieldType::Integer,
        required: false,
        min_length: None,
        max_length: None,
        pattern: None,
        allowed_values: None,
        description: "Available stock quantity"
    },
    CcmField {
        name: "weight_kg",
        field_type: FieldType::Decimal,
        required: false,
        min_length: None,
        max_length: None,
        pattern: None,
        allowed_values: None,
        description: "Shipping weight in kilograms"
    },
    CcmField {
        name: "length_cm",
        field_type: FieldType::Decimal,
        required: false,
        min_length: None,
        max_length: None,
        pattern: None,
        allowed_values: None,
        description: "Package length in centimeters"
    },
    CcmField {
        name: "width_cm",
        field_type: FieldType::Decimal,
        required: false,
        min_length: None,
        max_length: None,
        pattern: None,
        allowed_values: None,
        description: "Package width in centimeters"
    },
    CcmField {
        name: "height_cm",
        field_type: FieldType::Decimal,
        required: false,
        min_length: None,
        max_length: None,
        pattern: None,
        allowed_values: None,
        description: "Package height in centimeters"
    },
    CcmField {
        name: "images",
        field_type: FieldType::Array,
        required: false,
        min_length: None,
        max_length: None,
        pattern: None,
        allowed_values: None,
        description: "List of image URLs"
    },
    CcmField {
        name: "attributes",
        field_type: FieldType::Object,
        required: false,
        min_length: None,
        max_length: None,
        pattern: None,
        allowed_values: None,
        description: "Free-form marketplace-specific attribute map"
    }
];

pub fn lookup(name: &str) -> Option<&'static CcmField> {
    FIELDS.iter().find(|f| f.name == name)
}
