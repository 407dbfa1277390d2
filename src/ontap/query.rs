//! Query builder for ONTAP REST collection endpoints
//!
//! ONTAP filters collections with plain query parameters (`name=lif1`,
//! `svm.name=vs1`) and selects the returned projection with `fields`.

use serde::Serialize;
use serde_json::Value;

/// Ordered list of query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing any previous value for `key`
    pub fn set(&mut self, key: &str, value: &str) -> &mut Self {
        if let Some(entry) = self.params.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value.to_string();
        } else {
            self.params.push((key.to_string(), value.to_string()));
        }
        self
    }

    /// Append `key=value`, keeping any previous values for `key`
    pub fn add(&mut self, key: &str, value: &str) -> &mut Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    /// Select the projection returned by the server
    pub fn fields(&mut self, fields: &[&str]) -> &mut Self {
        self.set("fields", &fields.join(","))
    }

    /// Bulk assignment from an already flattened mapping
    pub fn set_values<I, K, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in values {
            self.set(key.as_ref(), value.as_ref());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.params
    }

    /// Render as `k=v&k2=v2` with percent-encoded values
    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Flatten a serializable structure into query parameters
///
/// Nested objects become dotted keys (`svm: {name}` -> `svm.name`), nulls
/// and empty strings are skipped. Arrays and non-object roots cannot be
/// expressed as ONTAP query parameters and are rejected.
pub fn flatten_to_query<T: Serialize>(value: &T) -> Result<Vec<(String, String)>, String> {
    let value = serde_json::to_value(value).map_err(|e| e.to_string())?;
    let map = match value {
        Value::Object(map) => map,
        other => return Err(format!("expected an object, got {}", other)),
    };

    let mut pairs = Vec::new();
    for (key, value) in map {
        flatten_value(&key, value, &mut pairs)?;
    }
    Ok(pairs)
}

fn flatten_value(key: &str, value: Value, out: &mut Vec<(String, String)>) -> Result<(), String> {
    match value {
        Value::Null => {}
        Value::String(s) if s.is_empty() => {}
        Value::String(s) => out.push((key.to_string(), s)),
        Value::Number(n) => out.push((key.to_string(), n.to_string())),
        Value::Bool(b) => out.push((key.to_string(), b.to_string())),
        Value::Object(map) => {
            for (child, value) in map {
                flatten_value(&format!("{}.{}", key, child), value, out)?;
            }
        }
        Value::Array(_) => {
            return Err(format!("field '{}' is a list and cannot be used as a filter", key));
        }
    }
    Ok(())
}
