//! Client-side stores: one in-memory collection cache per resource domain.
//!
//! Every store follows the same state machine: a `loading` flag, a
//! store-local `error` string, and the last-fetched collection. Bulk fetches
//! absorb failures into `error` and return an empty sequence; single-entity
//! fetches and all mutations propagate failures to the caller. This
//! asymmetry is part of the observed contract and is kept deliberately.
//!
//! State lives behind a mutex so actions take `&self`, but the lock is never
//! held across an await: two racing fetches on the same store are allowed,
//! and whichever response resolves last wins.

pub mod auth;
pub mod documents;
pub mod normalize;
pub mod schedule;
pub mod tasks;

pub use auth::AuthStore;
pub use documents::DocumentStore;
pub use schedule::ScheduleStore;
pub use tasks::TaskStore;

use crate::types::{ApiError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Shared shape of every store's mutable state.
#[derive(Debug)]
pub(crate) struct StoreState<T> {
    pub collection: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for StoreState<T> {
    fn default() -> Self {
        Self {
            collection: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

impl<T> StoreState<T> {
    /// Enter the fetching state: loading on, previous error discarded.
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }
}

/// Entities addressable by their server identifier.
pub trait Identified {
    fn id(&self) -> i64;
}

impl Identified for crate::types::ScheduleEvent {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for crate::types::Task {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for crate::types::Document {
    fn id(&self) -> i64 {
        self.id
    }
}

/// Replace-if-present-else-append, keyed by entity id via linear scan.
pub(crate) fn upsert_by_id<T: Identified>(collection: &mut Vec<T>, entity: T) {
    match collection.iter().position(|e| e.id() == entity.id()) {
        Some(index) => collection[index] = entity,
        None => collection.push(entity),
    }
}

/// Remove the matching entity if present. Absence is not an error: the
/// server already confirmed the deletion.
pub(crate) fn remove_by_id<T: Identified>(collection: &mut Vec<T>, id: i64) {
    collection.retain(|e| e.id() != id);
}

/// Shallow-merge a partial server response into a typed entity.
///
/// The entity is lowered to a JSON object, the patch's top-level keys are
/// written over it, and the result is lifted back into the entity type.
pub(crate) fn shallow_merge<T>(entity: &T, patch: &Value) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let mut base = serde_json::to_value(entity)
        .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;

    if let (Some(target), Some(source)) = (base.as_object_mut(), patch.as_object()) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }

    serde_json::from_value(base).map_err(|e| ApiError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Task, TaskStatus};
    use serde_json::json;

    fn task(id: i64, title: &str) -> Task {
        serde_json::from_value(json!({ "id": id, "title": title })).unwrap()
    }

    #[test]
    fn test_upsert_replaces_existing_entry() {
        let mut tasks = vec![task(1, "old"), task(2, "other")];
        upsert_by_id(&mut tasks, task(1, "new"));
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title.as_deref(), Some("new"));
    }

    #[test]
    fn test_upsert_appends_missing_entry() {
        let mut tasks = vec![task(1, "a")];
        upsert_by_id(&mut tasks, task(2, "b"));
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].id, 2);
    }

    #[test]
    fn test_remove_is_noop_for_absent_id() {
        let mut tasks = vec![task(1, "a")];
        remove_by_id(&mut tasks, 99);
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn test_shallow_merge_patches_known_and_extra_fields() {
        let original = task(1, "write minutes");
        let merged: Task =
            shallow_merge(&original, &json!({ "status": "completed", "room": "204" })).unwrap();
        assert_eq!(merged.status, Some(TaskStatus::Completed));
        assert_eq!(merged.title.as_deref(), Some("write minutes"));
        assert_eq!(merged.extra["room"], json!("204"));
    }

    #[test]
    fn test_shallow_merge_rejects_incompatible_patch() {
        let original = task(1, "a");
        let result = shallow_merge(&original, &json!({ "id": "not-a-number" }));
        assert!(matches!(result, Err(ApiError::MalformedResponse(_))));
    }
}
