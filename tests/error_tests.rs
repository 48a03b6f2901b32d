use rule_engine::error::{
    ccm_mapping_unknown_field, condition_tree_invalid, config_error, document_parse_error,
    duplicate_rule_id, file_read_error, invalid_rule_id, missing_action_field,
    unknown_action_type, unknown_operator
};

#[test]
fn file_read_error_formats_path_and_source() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error = file_read_error("/path/to/rules.yaml", io_error);
    assert!(!error.to_string().is_empty());
}

#[test]
fn config_error_carries_message() {
    let error = config_error("invalid configuration value");
    assert!(!error.to_string().is_empty());
}

#[test]
fn document_parse_error_is_not_rule_localized() {
    let error = document_parse_error("unexpected mapping");
    assert!(error.rule_id.is_none());
    assert!(error.to_string().contains("unexpected mapping"));
}

#[test]
fn duplicate_rule_id_is_localized() {
    let error = duplicate_rule_id("title_required");
    assert_eq!(error.rule_id.as_deref(), Some("title_required"));
    assert!(error.to_string().contains("title_required"));
}

#[test]
fn invalid_rule_id_mentions_the_pattern() {
    let error = invalid_rule_id("Bad-ID");
    assert!(error.to_string().contains("^[a-z][a-z0-9_]{2,63}$"));
}

#[test]
fn unknown_operator_is_localized() {
    let error = unknown_operator("r1", "fuzzy_match");
    assert_eq!(error.rule_id.as_deref(), Some("r1"));
    assert!(error.to_string().contains("fuzzy_match"));
}

#[test]
fn unknown_action_type_is_localized() {
    let error = unknown_action_type("r1", "notify");
    assert!(error.to_string().contains("notify"));
}

#[test]
fn missing_action_field_names_the_field() {
    let error = missing_action_field("r1", "operation");
    assert!(error.to_string().contains("operation"));
}

#[test]
fn condition_tree_invalid_carries_custom_message() {
    let error = condition_tree_invalid("r1", "confidence must be between 0 and 1");
    assert!(error.to_string().contains("confidence must be between 0 and 1"));
}

#[test]
fn ccm_mapping_unknown_field_is_not_rule_localized() {
    let error = ccm_mapping_unknown_field("not_a_real_field");
    assert!(error.rule_id.is_none());
    assert!(error.to_string().contains("not_a_real_field"));
}

#[test]
fn errors_convert_into_app_error() {
    let app_error: rule_engine::error::AppError = duplicate_rule_id("r1").into();
    assert!(!app_error.to_string().is_empty());
}
