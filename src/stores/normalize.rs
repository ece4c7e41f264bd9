//! Response-shape normalization for bulk list fetches.
//!
//! The backend answers list requests in several envelope shapes depending on
//! the endpoint's vintage: an object keyed by the resource name, a generic
//! `items` object with optional pagination metadata, or a bare array. The
//! matcher below tries those in priority order; anything else is malformed
//! and falls back to an empty collection instead of failing the fetch.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Pagination metadata carried by some paginated list responses.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub pages: Option<u64>,
    #[serde(default)]
    pub per_page: Option<u64>,
}

impl PageMeta {
    fn from_envelope(envelope: &Value) -> Option<Self> {
        let meta: PageMeta = serde_json::from_value(envelope.clone()).ok()?;
        if meta == PageMeta::default() {
            None
        } else {
            Some(meta)
        }
    }
}

/// The recognized list envelope shapes, in match priority order.
#[derive(Debug)]
pub enum ListShape<'a> {
    /// `{ "<resource>": [...] , ...meta }`
    Named(&'a Vec<Value>, Option<PageMeta>),
    /// `{ "items": [...], ...meta }`
    Items(&'a Vec<Value>, Option<PageMeta>),
    /// `[...]`
    Bare(&'a Vec<Value>),
    /// Anything else.
    Malformed,
}

/// Classify a list response body against the resource's named array field.
pub fn classify<'a>(body: &'a Value, resource: &str) -> ListShape<'a> {
    if let Some(array) = body.get(resource).and_then(Value::as_array) {
        return ListShape::Named(array, PageMeta::from_envelope(body));
    }
    if let Some(array) = body.get("items").and_then(Value::as_array) {
        return ListShape::Items(array, PageMeta::from_envelope(body));
    }
    if let Some(array) = body.as_array() {
        return ListShape::Bare(array);
    }
    ListShape::Malformed
}

/// A normalized list response: typed entities plus optional page metadata.
#[derive(Debug)]
pub struct Normalized<T> {
    pub entities: Vec<T>,
    pub meta: Option<PageMeta>,
}

impl<T> Normalized<T> {
    fn empty() -> Self {
        Self {
            entities: Vec::new(),
            meta: None,
        }
    }
}

/// Normalize a list response into typed entities.
///
/// Malformed envelopes and undecodable elements are logged and yield an
/// empty collection; bulk fetches never fail on shape.
pub fn normalize<T: DeserializeOwned>(body: &Value, resource: &str) -> Normalized<T> {
    let (array, meta) = match classify(body, resource) {
        ListShape::Named(array, meta) | ListShape::Items(array, meta) => (array, meta),
        ListShape::Bare(array) => (array, None),
        ListShape::Malformed => {
            warn!(resource, "unexpected API response shape, using empty collection");
            return Normalized::empty();
        }
    };

    match array
        .iter()
        .map(|element| serde_json::from_value(element.clone()))
        .collect::<std::result::Result<Vec<T>, _>>()
    {
        Ok(entities) => Normalized { entities, meta },
        Err(err) => {
            warn!(resource, %err, "undecodable list element, using empty collection");
            Normalized::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Task;
    use serde_json::json;

    #[test]
    fn test_named_field_shape() {
        let body = json!({ "tasks": [{ "id": 1 }, { "id": 2 }] });
        let normalized: Normalized<Task> = normalize(&body, "tasks");
        assert_eq!(normalized.entities.len(), 2);
        assert!(normalized.meta.is_none());
    }

    #[test]
    fn test_items_shape_with_pagination() {
        let body = json!({
            "items": [{ "id": 3 }],
            "total": 41, "page": 2, "pages": 5, "per_page": 10
        });
        let normalized: Normalized<Task> = normalize(&body, "tasks");
        assert_eq!(normalized.entities.len(), 1);
        let meta = normalized.meta.unwrap();
        assert_eq!(meta.total, Some(41));
        assert_eq!(meta.page, Some(2));
        assert_eq!(meta.per_page, Some(10));
    }

    #[test]
    fn test_bare_array_shape() {
        let body = json!([{ "id": 4 }, { "id": 5 }, { "id": 6 }]);
        let normalized: Normalized<Task> = normalize(&body, "tasks");
        assert_eq!(normalized.entities.len(), 3);
    }

    #[test]
    fn test_named_field_wins_over_items() {
        let body = json!({
            "tasks": [{ "id": 1 }],
            "items": [{ "id": 2 }, { "id": 3 }]
        });
        let normalized: Normalized<Task> = normalize(&body, "tasks");
        assert_eq!(normalized.entities.len(), 1);
        assert_eq!(normalized.entities[0].id, 1);
    }

    #[test]
    fn test_malformed_shapes_yield_empty() {
        for body in [
            json!({ "data": "nope" }),
            json!("just a string"),
            json!(42),
            Value::Null,
        ] {
            let normalized: Normalized<Task> = normalize(&body, "tasks");
            assert!(normalized.entities.is_empty());
        }
    }

    #[test]
    fn test_undecodable_element_yields_empty() {
        let body = json!({ "tasks": [{ "id": "not numeric" }] });
        let normalized: Normalized<Task> = normalize(&body, "tasks");
        assert!(normalized.entities.is_empty());
    }
}
