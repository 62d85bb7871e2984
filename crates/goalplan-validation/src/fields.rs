//! Field lookups that produce path-carrying validation errors.

use goalplan_utils::error::ValidationError;
use serde_json::{Map, Value};

pub(crate) type Object = Map<String, Value>;

pub(crate) fn child_path(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{path}.{field}")
    }
}

pub(crate) fn element_path(path: &str, field: &str, index: usize) -> String {
    format!("{}[{index}]", child_path(path, field))
}

pub(crate) fn require<'a>(obj: &'a Object, path: &str, field: &str) -> Result<&'a Value, ValidationError> {
    obj.get(field).ok_or_else(|| ValidationError::MissingField {
        path: path.to_string(),
        field: field.to_string(),
    })
}

fn wrong_type(path: &str, field: &str, expected: &'static str) -> ValidationError {
    ValidationError::WrongType {
        path: path.to_string(),
        field: field.to_string(),
        expected,
    }
}

pub(crate) fn require_object<'a>(
    obj: &'a Object,
    path: &str,
    field: &str,
) -> Result<&'a Object, ValidationError> {
    require(obj, path, field)?
        .as_object()
        .ok_or_else(|| wrong_type(path, field, "an object"))
}

pub(crate) fn require_list<'a>(
    obj: &'a Object,
    path: &str,
    field: &str,
) -> Result<&'a Vec<Value>, ValidationError> {
    require(obj, path, field)?
        .as_array()
        .ok_or_else(|| wrong_type(path, field, "a list"))
}

pub(crate) fn require_non_empty_list<'a>(
    obj: &'a Object,
    path: &str,
    field: &str,
) -> Result<&'a Vec<Value>, ValidationError> {
    let list = require_list(obj, path, field)?;
    if list.is_empty() {
        return Err(ValidationError::EmptyList {
            path: path.to_string(),
            field: field.to_string(),
        });
    }
    Ok(list)
}

/// Present and a string, number or boolean.
pub(crate) fn require_scalar(obj: &Object, path: &str, field: &str) -> Result<(), ValidationError> {
    match require(obj, path, field)? {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(()),
        _ => Err(wrong_type(path, field, "a string or number")),
    }
}

/// Every element of `list` (found at `path.field`) is a scalar.
pub(crate) fn require_scalar_elements(
    list: &[Value],
    path: &str,
    field: &str,
) -> Result<(), ValidationError> {
    for (i, item) in list.iter().enumerate() {
        if !matches!(item, Value::String(_) | Value::Number(_) | Value::Bool(_)) {
            return Err(wrong_type(path, &format!("{field}[{i}]"), "a string"));
        }
    }
    Ok(())
}

pub(crate) fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Object, ValidationError> {
    value.as_object().ok_or_else(|| ValidationError::NotAnObject {
        path: path.to_string(),
    })
}
