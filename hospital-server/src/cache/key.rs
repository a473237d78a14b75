//! Cache key scheme

use serde_json::Value;

/// Key namespace
pub const KEY_PREFIX: &str = "hms";

/// Bump when the cached payload shape changes
pub const KEY_VERSION: &str = "v1";

/// Cache key: `hms:v1:{entity}:{operation}:{md5 of canonical args}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build a key from the resource, the operation, and the call arguments.
    ///
    /// # Example
    /// ```
    /// use hospital_server::cache::CacheKey;
    /// use serde_json::json;
    ///
    /// let a = CacheKey::new("room", "get", &json!({"room_no": 101}));
    /// let b = CacheKey::new("room", "get", &json!({"room_no": 101}));
    /// assert_eq!(a, b);
    /// assert!(a.as_str().starts_with("hms:v1:room:get:"));
    /// ```
    pub fn new(resource: &str, operation: &str, args: &Value) -> Self {
        let digest = md5::compute(canonical_json(args).as_bytes());
        Self(format!(
            "{}:{}:{}:{}:{:x}",
            KEY_PREFIX, KEY_VERSION, resource, operation, digest
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compact JSON with object keys sorted at every level.
///
/// `serde_json` is built without `preserve_order`, so `Map` is a `BTreeMap`
/// and plain serialization already emits sorted keys.
pub fn canonical_json(value: &Value) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_layout() {
        let key = CacheKey::new("patient", "list", &json!({}));
        let parts: Vec<_> = key.as_str().split(':').collect();
        assert_eq!(parts[..4], ["hms", "v1", "patient", "list"]);
        assert_eq!(parts[4].len(), 32);
        assert!(parts[4].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn argument_order_does_not_matter() {
        let a = CacheKey::new("undergoes", "get", &json!({"pat_id": 1, "proc_code": 2}));
        let b = CacheKey::new("undergoes", "get", &json!({"proc_code": 2, "pat_id": 1}));
        assert_eq!(a, b);
    }

    #[test]
    fn different_arguments_differ() {
        let a = CacheKey::new("room", "get", &json!({"room_no": 101}));
        let b = CacheKey::new("room", "get", &json!({"room_no": 102}));
        assert_ne!(a, b);
    }

    #[test]
    fn operation_and_resource_are_part_of_key() {
        let args = json!({"id": 1});
        assert_ne!(
            CacheKey::new("patient", "get", &args),
            CacheKey::new("doctor", "get", &args)
        );
        assert_ne!(
            CacheKey::new("patient", "get", &args),
            CacheKey::new("patient", "list", &args)
        );
    }

    #[test]
    fn canonical_form_is_sorted_and_compact() {
        let value = json!({"b": [1, {"d": null, "c": "x"}], "a": true});
        assert_eq!(canonical_json(&value), r#"{"a":true,"b":[1,{"c":"x","d":null}]}"#);
    }
}
