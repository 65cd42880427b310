//! Generic list-page wrapper shared by every list endpoint.
//!
//! ```json
//! { "object": "list", "data": [ ... ], "first_id": "...", "last_id": "...", "has_more": true }
//! ```

use crate::{Error, ErrorContext, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A typed record decoded from an API object, keeping the original JSON.
pub trait ApiObject: DeserializeOwned {
    fn attach_raw(&mut self, raw: Value);

    fn from_value(value: Value) -> Result<Self> {
        let mut record: Self = serde_json::from_value(value.clone())?;
        record.attach_raw(value);
        Ok(record)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<T> {
    pub object: String,
    pub data: Vec<T>,
    pub first_id: Option<String>,
    pub last_id: Option<String>,
    pub has_more: bool,
    pub raw: Value,
}

impl<T: ApiObject> ListPage<T> {
    pub fn from_value(value: Value) -> Result<Self> {
        Self::from_value_with_key(value, "data")
    }

    /// Decode a page whose items live under `item_key`.
    ///
    /// Non-object entries are skipped; an object entry that fails to decode fails
    /// the whole page.
    pub fn from_value_with_key(value: Value, item_key: &str) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            Error::protocol_with_context(
                "list response is not a JSON object",
                ErrorContext::new().with_source("list_page"),
            )
        })?;

        let mut data = Vec::new();
        if let Some(items) = obj.get(item_key).and_then(Value::as_array) {
            for item in items.iter().filter(|i| i.is_object()) {
                data.push(T::from_value(item.clone())?);
            }
        }

        Ok(Self {
            object: obj
                .get("object")
                .and_then(Value::as_str)
                .unwrap_or("list")
                .to_string(),
            data,
            first_id: obj.get("first_id").and_then(Value::as_str).map(String::from),
            last_id: obj.get("last_id").and_then(Value::as_str).map(String::from),
            has_more: obj.get("has_more").and_then(Value::as_bool).unwrap_or(false),
            raw: value,
        })
    }
}

impl<T> ListPage<T> {
    /// Cursor for the next page, if the server says there is one.
    pub fn next_after(&self) -> Option<&str> {
        if self.has_more {
            self.last_id.as_deref()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }
}

impl<T> IntoIterator for ListPage<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ListPage<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
