//! Dependency analysis (spec §4.2 step 6): for each rule, the set of
//! columns its condition (and action) reference, excluding its own field.

use indexmap::IndexMap;

use crate::ir::CompiledRule;

pub fn analyze(rules: &IndexMap<String, CompiledRule>) -> IndexMap<String, Vec<String>> {
    rules
        .iter()
        .map(|(id, rule)| {
            let mut fields: Vec<String> = rule
                .condition
                .referenced_fields()
                .into_iter()
                .filter(|field| *field != rule.field)
                .map(str::to_string)
                .collect();
            fields.sort();
            fields.dedup();
            (id.clone(), fields)
        })
        .collect()
}
