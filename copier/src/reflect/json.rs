//! Adapters from already-parsed `serde_json` documents to dynamic source values
//!
//! Numbers become `i64` when they fit, then `u64`, then `f64`. `null` becomes
//! `Option::<()>::None`, which the copy engine treats as an absent member.

use serde_json::Value;

use super::{DynamicList, DynamicMap, Reflect};
use crate::error::{Error, Result};

/// Convert any JSON value into a boxed reflected value
pub(crate) fn to_reflect(value: &Value) -> Box<dyn Reflect> {
    match value {
        Value::Null => Box::new(None::<()>),
        Value::Bool(flag) => Box::new(*flag),
        Value::Number(number) => {
            if let Some(signed) = number.as_i64() {
                Box::new(signed)
            } else if let Some(unsigned) = number.as_u64() {
                Box::new(unsigned)
            } else {
                Box::new(number.as_f64().unwrap_or_default())
            }
        }
        Value::String(text) => Box::new(text.clone()),
        Value::Array(items) => Box::new(list_from_items(items)),
        Value::Object(object) => Box::new(map_from_object(object)),
    }
}

fn list_from_items(items: &[Value]) -> DynamicList {
    let mut list = DynamicList::new();
    for item in items {
        list.push_boxed(to_reflect(item));
    }
    list
}

fn map_from_object(object: &serde_json::Map<String, Value>) -> DynamicMap {
    let mut map = DynamicMap::new();
    for (key, value) in object {
        map.insert_boxed(key.clone(), to_reflect(value));
    }
    map
}

impl DynamicMap {
    /// Build a map from a JSON object
    ///
    /// # Errors
    ///
    /// Returns a `Shape` error when `value` is not an object.
    pub fn from_json(value: &Value) -> Result<Self> {
        let Value::Object(object) = value else {
            return Err(Error::invalid("JSON source", "expected an object at the top level").into());
        };
        Ok(map_from_object(object))
    }
}

impl DynamicList {
    /// Build a list from a JSON array
    ///
    /// # Errors
    ///
    /// Returns a `Shape` error when `value` is not an array.
    pub fn from_json(value: &Value) -> Result<Self> {
        let Value::Array(items) = value else {
            return Err(Error::invalid("JSON source", "expected an array at the top level").into());
        };
        Ok(list_from_items(items))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::type_key::TypeKind;

    #[test]
    fn object_becomes_nested_dynamic_values() {
        let source = json!({
            "FieldString": "aaa",
            "FieldInt": 11,
            "Big": 18_446_744_073_709_551_615_u64,
            "Ratio": 1.22,
            "Flag": true,
            "Missing": null,
            "Struct": { "Role": "role" },
            "Tags": ["a", "b"]
        });

        let map = DynamicMap::from_json(&source);
        assert!(map.is_ok());
        let Ok(map) = map else { return };

        assert_eq!(map.get_as::<String>("FieldString").map(String::as_str), Some("aaa"));
        assert_eq!(map.get_as::<i64>("FieldInt"), Some(&11));
        assert_eq!(map.get_as::<u64>("Big"), Some(&u64::MAX));
        assert_eq!(map.get_as::<f64>("Ratio"), Some(&1.22));
        assert_eq!(map.get_as::<bool>("Flag"), Some(&true));
        assert_eq!(map.get_as::<Option<()>>("Missing"), Some(&None));
        assert_eq!(map.get("Struct").map(<dyn Reflect>::kind), Some(TypeKind::Mapping));
        assert_eq!(map.get("Tags").map(<dyn Reflect>::kind), Some(TypeKind::Sequence));
    }

    #[test]
    fn non_object_is_rejected() {
        let report = DynamicMap::from_json(&json!([1, 2]));
        assert!(report.is_err_and(|report| report.current_context().is_fatal()));
        assert!(DynamicList::from_json(&json!({"a": 1})).is_err());
        assert_eq!(DynamicList::from_json(&json!([1, "x"])).map(|list| list.len()).ok(), Some(2));
    }
}
