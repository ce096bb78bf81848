use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::store::{Collection, Document, EntityStore, Patch, Query, to_document};
use crate::core::{PlanError, Result};

/// In-memory document store: one map per collection, each behind its own
/// lock so writes to different collections never contend.
pub struct MemoryStore {
    collections: HashMap<Collection, Arc<RwLock<HashMap<String, Document>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let mut collections = HashMap::new();
        for collection in Collection::ALL {
            collections.insert(collection, Arc::new(RwLock::new(HashMap::new())));
        }
        Self { collections }
    }

    /// Handle for concurrent access to one collection.
    fn handle(&self, collection: Collection) -> Result<Arc<RwLock<HashMap<String, Document>>>> {
        self.collections
            .get(&collection)
            .cloned()
            .ok_or_else(|| PlanError::Storage(format!("collection '{collection}' not registered")))
    }

    pub async fn len(&self, collection: Collection) -> Result<usize> {
        let handle = self.handle(collection)?;
        let map = handle.read().await;
        Ok(map.len())
    }

    pub async fn is_empty(&self, collection: Collection) -> Result<bool> {
        Ok(self.len(collection).await? == 0)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn doc_id(document: &Document) -> Result<String> {
    document
        .get("id")
        .and_then(Document::as_str)
        .map(str::to_string)
        .ok_or_else(|| PlanError::Storage("document has no 'id' field".to_string()))
}

fn matches(document: &Document, query: &Query) -> Result<bool> {
    match query {
        Query::ById(id) => Ok(document.get("id").and_then(Document::as_str) == Some(id.as_str())),
        Query::ByRef(object) => Ok(document.get("object") == Some(&to_document(object)?)),
    }
}

fn find_key(map: &HashMap<String, Document>, query: &Query) -> Result<Option<String>> {
    if let Query::ById(id) = query {
        return Ok(map.contains_key(id.as_str()).then(|| id.to_string()));
    }
    for (key, document) in map {
        if matches(document, query)? {
            return Ok(Some(key.clone()));
        }
    }
    Ok(None)
}

fn apply_patch(document: &mut Document, patch: &Patch) -> Result<()> {
    match patch {
        Patch::Set(fields) => {
            let Some(source) = fields.as_object() else {
                return Err(PlanError::Storage("patch is not an object".to_string()));
            };
            let Some(target) = document.as_object_mut() else {
                return Err(PlanError::Storage("patch target is not an object".to_string()));
            };
            for (key, value) in source {
                // the primary key is immutable
                if key == "id" {
                    continue;
                }
                target.insert(key.clone(), value.clone());
            }
        }
        Patch::AddToSet { field, id } => {
            let Some(target) = document.as_object_mut() else {
                return Err(PlanError::Storage("patch target is not an object".to_string()));
            };
            let entry = target
                .entry(field.to_string())
                .or_insert_with(|| Document::Array(Vec::new()));
            let Some(entries) = entry.as_array_mut() else {
                return Err(PlanError::Storage(format!("field '{field}' is not an array")));
            };
            let value = Document::String(id.to_string());
            if !entries.contains(&value) {
                entries.push(value);
            }
        }
        Patch::Pull { field, id } => {
            if let Some(entries) = document.get_mut(*field).and_then(Document::as_array_mut) {
                entries.retain(|entry| entry.as_str() != Some(id.as_str()));
            }
        }
    }

    if let Some(target) = document.as_object_mut() {
        target.insert("updatedAt".to_string(), to_document(&Utc::now())?);
    }
    Ok(())
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn insert(&self, collection: Collection, document: Document) -> Result<Document> {
        let id = doc_id(&document)?;
        let handle = self.handle(collection)?;
        let mut map = handle.write().await;

        if map.contains_key(&id) {
            return Err(PlanError::Storage(format!(
                "duplicate id '{id}' in '{collection}'"
            )));
        }
        map.insert(id, document.clone());
        Ok(document)
    }

    async fn find_one(&self, collection: Collection, query: &Query) -> Result<Option<Document>> {
        let handle = self.handle(collection)?;
        let map = handle.read().await;

        if let Query::ById(id) = query {
            return Ok(map.get(id.as_str()).cloned());
        }
        for document in map.values() {
            if matches(document, query)? {
                return Ok(Some(document.clone()));
            }
        }
        Ok(None)
    }

    async fn find_one_and_update(
        &self,
        collection: Collection,
        query: &Query,
        patch: &Patch,
    ) -> Result<Option<Document>> {
        let handle = self.handle(collection)?;
        let mut map = handle.write().await;

        let Some(key) = find_key(&map, query)? else {
            return Ok(None);
        };
        let document = map
            .get_mut(&key)
            .ok_or_else(|| PlanError::Storage(format!("lost document '{key}' mid-update")))?;
        apply_patch(document, patch)?;
        Ok(Some(document.clone()))
    }

    async fn find_one_and_delete(
        &self,
        collection: Collection,
        query: &Query,
    ) -> Result<Option<Document>> {
        let handle = self.handle(collection)?;
        let mut map = handle.write().await;

        let Some(key) = find_key(&map, query)? else {
            return Ok(None);
        };
        Ok(map.remove(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EntityId, EntityType, ObjectRef};
    use serde_json::json;

    fn sample(id: &EntityId) -> Document {
        json!({ "id": id.as_str(), "name": "Trip to Saskatoon" })
    }

    #[tokio::test]
    async fn test_insert_then_find_by_id() {
        let store = MemoryStore::new();
        let id = EntityId::generate();

        store
            .insert(Collection::Planners, sample(&id))
            .await
            .unwrap();

        let found = store
            .find_one(Collection::Planners, &Query::ById(id.clone()))
            .await
            .unwrap();
        assert_eq!(found.unwrap()["name"], "Trip to Saskatoon");
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_ids() {
        let store = MemoryStore::new();
        let id = EntityId::generate();

        store
            .insert(Collection::Planners, sample(&id))
            .await
            .unwrap();
        let err = store.insert(Collection::Planners, sample(&id)).await;
        assert!(matches!(err, Err(PlanError::Storage(_))));
    }

    #[tokio::test]
    async fn test_find_by_ref_scans_the_object_key() {
        let store = MemoryStore::new();
        let thread_id = EntityId::generate();
        let target = ObjectRef::new(EntityType::Activity, EntityId::generate());

        store
            .insert(
                Collection::CommentThreads,
                json!({
                    "id": thread_id.as_str(),
                    "object": { "id": target.id.as_str(), "collection": "Activity" },
                    "comments": [],
                }),
            )
            .await
            .unwrap();

        let found = store
            .find_one(Collection::CommentThreads, &Query::ByRef(target.clone()))
            .await
            .unwrap();
        assert_eq!(found.unwrap()["id"], thread_id.as_str());

        let other = ObjectRef::new(EntityType::Activity, EntityId::generate());
        let missing = store
            .find_one(Collection::CommentThreads, &Query::ByRef(other))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_add_to_set_is_idempotent() {
        let store = MemoryStore::new();
        let id = EntityId::generate();
        let child = EntityId::generate();
        store
            .insert(Collection::Planners, sample(&id))
            .await
            .unwrap();

        for _ in 0..2 {
            store
                .find_one_and_update(
                    Collection::Planners,
                    &Query::ById(id.clone()),
                    &Patch::AddToSet {
                        field: "destinations",
                        id: child.clone(),
                    },
                )
                .await
                .unwrap();
        }

        let document = store
            .find_one(Collection::Planners, &Query::ById(id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(document["destinations"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_pull_removes_the_id_and_tolerates_missing_fields() {
        let store = MemoryStore::new();
        let id = EntityId::generate();
        let child = EntityId::generate();
        store
            .insert(
                Collection::Planners,
                json!({ "id": id.as_str(), "destinations": [child.as_str()] }),
            )
            .await
            .unwrap();

        store
            .find_one_and_update(
                Collection::Planners,
                &Query::ById(id.clone()),
                &Patch::Pull {
                    field: "destinations",
                    id: child.clone(),
                },
            )
            .await
            .unwrap();

        // pulling from a field that does not exist is a no-op
        store
            .find_one_and_update(
                Collection::Planners,
                &Query::ById(id.clone()),
                &Patch::Pull {
                    field: "transportations",
                    id: child,
                },
            )
            .await
            .unwrap();

        let document = store
            .find_one(Collection::Planners, &Query::ById(id))
            .await
            .unwrap()
            .unwrap();
        assert!(document["destinations"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        let id = EntityId::generate();
        store
            .insert(Collection::Planners, sample(&id))
            .await
            .unwrap();

        let first = store
            .find_one_and_delete(Collection::Planners, &Query::ById(id.clone()))
            .await
            .unwrap();
        assert!(first.is_some());

        let second = store
            .find_one_and_delete(Collection::Planners, &Query::ById(id))
            .await
            .unwrap();
        assert!(second.is_none());
    }
}
