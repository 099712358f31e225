//! Typed access to attribute stores
//!
//! Getters return `None` for absent or mistyped attributes; schema
//! validation runs before any handler reads them. Setters remove the
//! attribute when the remote record has no value for it.

use std::collections::HashMap;

use cloudcenter_core::resource::Value;

pub type Attributes = HashMap<String, Value>;

pub fn get_string(attrs: &Attributes, key: &str) -> Option<String> {
    attrs.get(key).and_then(Value::as_str).map(str::to_string)
}

pub fn get_int(attrs: &Attributes, key: &str) -> Option<i64> {
    attrs.get(key).and_then(Value::as_int)
}

pub fn get_float(attrs: &Attributes, key: &str) -> Option<f64> {
    attrs.get(key).and_then(Value::as_float)
}

pub fn get_bool(attrs: &Attributes, key: &str) -> Option<bool> {
    attrs.get(key).and_then(Value::as_bool)
}

/// List of plain strings (e.g. role `perms`)
pub fn get_string_list(attrs: &Attributes, key: &str) -> Vec<String> {
    attrs
        .get(key)
        .and_then(Value::as_list)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// List of nested blocks (e.g. group `users`)
pub fn get_blocks<'a>(attrs: &'a Attributes, key: &str) -> Vec<&'a Attributes> {
    attrs
        .get(key)
        .and_then(Value::as_list)
        .map(|items| items.iter().filter_map(Value::as_map).collect())
        .unwrap_or_default()
}

/// One string field out of each block of a block list (e.g. `user_id` of every `users` entry)
pub fn get_block_field(attrs: &Attributes, key: &str, field: &str) -> Vec<String> {
    get_blocks(attrs, key)
        .into_iter()
        .filter_map(|block| get_string(block, field))
        .collect()
}

/// Integer view of an identifier attribute; string IDs must parse completely
pub fn parse_numeric(attrs: &Attributes, key: &str) -> Option<i64> {
    match attrs.get(key)? {
        Value::Int(n) => Some(*n),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

pub fn set_value(attrs: &mut Attributes, key: &str, value: Option<Value>) {
    match value {
        Some(v) => {
            attrs.insert(key.to_string(), v);
        }
        None => {
            attrs.remove(key);
        }
    }
}

pub fn set_string(attrs: &mut Attributes, key: &str, value: Option<&String>) {
    set_value(attrs, key, value.map(|s| Value::String(s.clone())));
}

pub fn set_int(attrs: &mut Attributes, key: &str, value: Option<i64>) {
    set_value(attrs, key, value.map(Value::Int));
}

pub fn set_float(attrs: &mut Attributes, key: &str, value: Option<f64>) {
    set_value(attrs, key, value.map(Value::Float));
}

pub fn set_bool(attrs: &mut Attributes, key: &str, value: Option<bool>) {
    set_value(attrs, key, value.map(Value::Bool));
}

pub fn set_string_list(attrs: &mut Attributes, key: &str, values: &[String]) {
    let items = values.iter().map(|s| Value::String(s.clone())).collect();
    attrs.insert(key.to_string(), Value::List(items));
}
