use crate::{
    db::{
        document::{Document, DocumentId},
        store::{DocumentCollection, StoreError, StoreFilter, StoreQuery, eval},
    },
    value::Value,
};
use std::{
    collections::{BTreeMap, btree_map::Entry},
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};
use tokio::sync::RwLock;

///
/// MemoryCollection
///
/// In-process document collection backed by an ordered map.
/// Used by tests and by hosts that want the repository semantics without an
/// external document database.
///

#[derive(Debug, Default)]
pub struct MemoryCollection {
    documents: RwLock<BTreeMap<DocumentId, Document>>,
    unavailable: AtomicBool,
    latency: Option<Duration>,
}

impl MemoryCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every operation by `latency` before touching the map.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every subsequent operation fail with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored documents, bypassing the fault hook.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    async fn ready(&self) -> Result<(), StoreError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                message: "memory collection is marked unavailable".to_string(),
            });
        }

        Ok(())
    }
}

impl DocumentCollection for MemoryCollection {
    async fn find(&self, query: &StoreQuery) -> Result<Vec<Document>, StoreError> {
        self.ready().await?;

        let documents = self.documents.read().await;
        let mut matched: Vec<&Document> = documents
            .values()
            .filter(|doc| query.filter.as_ref().is_none_or(|f| f.matches(doc)))
            .collect();
        matched.sort_by(|a, b| eval::order(&query.sort, a, b));

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = query
            .limit
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));

        Ok(matched
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|doc| match &query.projection {
                Some(fields) => doc.project(fields),
                None => doc.clone(),
            })
            .collect())
    }

    async fn count(&self, filter: Option<&StoreFilter>) -> Result<u64, StoreError> {
        self.ready().await?;

        let documents = self.documents.read().await;
        let count = documents
            .values()
            .filter(|doc| filter.is_none_or(|f| f.matches(doc)))
            .count();

        Ok(count as u64)
    }

    async fn get(&self, id: &DocumentId) -> Result<Option<Document>, StoreError> {
        self.ready().await?;

        Ok(self.documents.read().await.get(id).cloned())
    }

    async fn insert(&self, mut document: Document) -> Result<DocumentId, StoreError> {
        self.ready().await?;

        let id = document.id.clone().unwrap_or_else(DocumentId::generate);
        document.id = Some(id.clone());

        match self.documents.write().await.entry(id.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateKey {
                id: id.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(document);
                Ok(id)
            }
        }
    }

    async fn set_fields(
        &self,
        id: &DocumentId,
        fields: BTreeMap<String, Value>,
    ) -> Result<bool, StoreError> {
        self.ready().await?;

        let mut documents = self.documents.write().await;
        let Some(document) = documents.get_mut(id) else {
            return Ok(false);
        };
        document.attributes.extend(fields);

        Ok(true)
    }

    async fn delete(&self, id: &DocumentId) -> Result<bool, StoreError> {
        self.ready().await?;

        Ok(self.documents.write().await.remove(id).is_some())
    }
}
