//! Module: fields
//! Responsibility: sparse field sets, targeted write fields, and the
//! relationship-stripping output filter.
//! Does not own: serialization of the selected fields.
//! Boundary: consumed by repositories and handed back to the host serializer.

mod cache;


use crate::model::ResourceType;
use derive_more::{Deref, IntoIterator};
use std::collections::{BTreeMap, BTreeSet};

// re-exports
pub use cache::SparseFieldSetCache;

///
/// SparseFieldSet
///
/// Set of field names selected for one resource type. Membership is all that
/// matters; insertion order is discarded.
///

#[derive(Clone, Debug, Default, Deref, Eq, IntoIterator, PartialEq)]
pub struct SparseFieldSet(BTreeSet<String>);

impl SparseFieldSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>) -> Self {
        self.0.insert(field.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>) -> bool {
        self.0.insert(field.into())
    }

    /// Every field of a resource type, attributes and relationships alike.
    #[must_use]
    pub fn all_of(resource: &ResourceType) -> Self {
        resource.fields.iter().map(|f| f.name.clone()).collect()
    }
}

impl<S: Into<String>> FromIterator<S> for SparseFieldSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Projection map: requested sparse field sets keyed by resource type name.
pub type ProjectionMap = BTreeMap<String, SparseFieldSet>;

///
/// TargetedFields
///
/// Attributes and relationships a write request is allowed to touch.
/// Anything outside these sets must be left unchanged in storage.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TargetedFields {
    pub attributes: BTreeSet<String>,
    pub relationships: BTreeSet<String>,
}

impl TargetedFields {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Target the given attribute names.
    #[must_use]
    pub fn attributes<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attributes: names.into_iter().map(Into::into).collect(),
            relationships: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_relationship(mut self, name: impl Into<String>) -> Self {
        self.relationships.insert(name.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.relationships.is_empty()
    }
}

/// Strip relationship fields from a field set bound for the serializer.
///
/// Only applies to types stored in the restricted backend; other types pass
/// through unchanged. Idempotent.
#[must_use]
pub fn filter_for_output(fields: &SparseFieldSet, resource: &ResourceType) -> SparseFieldSet {
    if !resource.restricted_backend {
        return fields.clone();
    }

    fields
        .iter()
        .filter(|name| !resource.is_relationship(name))
        .cloned()
        .collect()
}
