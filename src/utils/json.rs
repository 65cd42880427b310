//! Lenient JSON field access and request-body merging.
//!
//! Every accessor returns `None` when a key is absent, `null`, or of the wrong
//! shape, so callers can tell "irrelevant to this record" apart from
//! "present but empty".

use serde_json::{Map, Value};

/// Typed, non-failing accessors over a JSON object.
pub trait JsonObjectExt {
    fn opt_str(&self, key: &str) -> Option<String>;
    fn opt_u64(&self, key: &str) -> Option<u64>;
    fn opt_u32(&self, key: &str) -> Option<u32>;
    fn opt_object(&self, key: &str) -> Option<Map<String, Value>>;
    fn opt_array(&self, key: &str) -> Option<Vec<Value>>;
}

impl JsonObjectExt for Map<String, Value> {
    fn opt_str(&self, key: &str) -> Option<String> {
        self.get(key).and_then(Value::as_str).map(String::from)
    }

    fn opt_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(Value::as_u64)
    }

    fn opt_u32(&self, key: &str) -> Option<u32> {
        self.opt_u64(key).and_then(|n| u32::try_from(n).ok())
    }

    fn opt_object(&self, key: &str) -> Option<Map<String, Value>> {
        self.get(key).and_then(Value::as_object).cloned()
    }

    fn opt_array(&self, key: &str) -> Option<Vec<Value>> {
        self.get(key).and_then(Value::as_array).cloned()
    }
}

/// Merge caller-supplied extra fields into a request body.
///
/// Named fields already present in `body` win on key collision.
pub fn merge_extra(body: &mut Map<String, Value>, extra: &Map<String, Value>) {
    for (k, v) in extra {
        if !body.contains_key(k) {
            body.insert(k.clone(), v.clone());
        }
    }
}
