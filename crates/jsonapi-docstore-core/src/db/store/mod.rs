//! Module: store
//! Responsibility: the document collection boundary and its native query shape.
//! Does not own: plan validation or relationship semantics; everything here
//! addresses attributes of a single collection.
//! Boundary: repositories talk to storage exclusively through `DocumentCollection`.

pub(crate) mod eval;
mod memory;


use crate::{
    db::{
        document::{Document, DocumentId},
        query::{CompareOp, OrderDirection, TextMatchKind},
    },
    value::Value,
};
use std::{
    collections::{BTreeMap, BTreeSet},
    future::Future,
};

// re-exports
pub use crate::error::StoreError;
pub use memory::MemoryCollection;

///
/// StoreFilter
///
/// Attribute-only predicate understood by the document store.
/// Every field is a top-level attribute name; there is no traversal.
///

#[derive(Clone, Debug, PartialEq)]
pub enum StoreFilter {
    True,
    False,
    Compare {
        field: String,
        op: CompareOp,
        value: Value,
    },
    TextMatch {
        field: String,
        kind: TextMatchKind,
        value: String,
    },
    In {
        field: String,
        values: Vec<Value>,
    },
    Not(Box<Self>),
    And(Vec<Self>),
    Or(Vec<Self>),
}

impl StoreFilter {
    /// Evaluate this filter against one document.
    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        eval::matches(self, document)
    }
}

///
/// StoreSort
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StoreSort {
    pub field: String,
    pub direction: OrderDirection,
}

///
/// StoreQuery
///
/// One `find` call: filter, sort keys, skip/limit window, and the attribute
/// projection. `projection: None` returns every attribute.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StoreQuery {
    pub filter: Option<StoreFilter>,
    pub sort: Vec<StoreSort>,
    pub skip: u64,
    pub limit: Option<u64>,
    pub projection: Option<BTreeSet<String>>,
}

///
/// DocumentCollection
///
/// Async handle to one collection of documents. Implementations are shared
/// between concurrent requests and must be safe for concurrent use.
///

pub trait DocumentCollection: Send + Sync {
    /// Documents matching the query, in sort order, within the window.
    fn find(
        &self,
        query: &StoreQuery,
    ) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// Number of documents matching the filter; `None` counts everything.
    fn count(
        &self,
        filter: Option<&StoreFilter>,
    ) -> impl Future<Output = Result<u64, StoreError>> + Send;

    fn get(
        &self,
        id: &DocumentId,
    ) -> impl Future<Output = Result<Option<Document>, StoreError>> + Send;

    /// Insert a new document, generating its id when absent.
    ///
    /// Fails with `DuplicateKey` when the id is already taken.
    fn insert(
        &self,
        document: Document,
    ) -> impl Future<Output = Result<DocumentId, StoreError>> + Send;

    /// Overwrite exactly the given attributes of one document.
    ///
    /// Attributes not named in `fields` are left untouched. Returns whether a
    /// document with that id existed.
    fn set_fields(
        &self,
        id: &DocumentId,
        fields: BTreeMap<String, Value>,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Remove one document. Returns whether it existed.
    fn delete(&self, id: &DocumentId) -> impl Future<Output = Result<bool, StoreError>> + Send;
}
