use crate::{ID_FIELD, MAX_ENTITY_NAME_LEN, MAX_FIELD_NAME_LEN, err, error::ErrorTree};
use convert_case::{Case, Casing};

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();

    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(super) fn validate_entity_name(name: &str, errs: &mut ErrorTree) {
    if name.len() > MAX_ENTITY_NAME_LEN {
        err!(
            errs,
            "entity name '{name}' exceeds max length {MAX_ENTITY_NAME_LEN}"
        );
    }

    if !is_identifier(name) {
        err!(errs, "entity name '{name}' is not a valid identifier");
    } else if name != name.to_case(Case::Pascal) {
        err!(errs, "entity name '{name}' must be PascalCase");
    }
}

pub(super) fn validate_field_name(name: &str, errs: &mut ErrorTree) {
    if name == ID_FIELD {
        err!(errs, "field name '{ID_FIELD}' is reserved for the identifier");
        return;
    }

    if name.len() > MAX_FIELD_NAME_LEN {
        err!(
            errs,
            "field name '{name}' exceeds max length {MAX_FIELD_NAME_LEN}"
        );
    }

    if !is_identifier(name) {
        err!(errs, "field name '{name}' is not a valid identifier");
    } else if name != name.to_case(Case::Camel) && name != name.to_case(Case::Snake) {
        err!(errs, "field name '{name}' must be camelCase or snake_case");
    }
}
