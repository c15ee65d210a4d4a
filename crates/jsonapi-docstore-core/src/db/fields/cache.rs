use crate::{
    db::fields::{ProjectionMap, SparseFieldSet, filter_for_output},
    model::ResourceGraph,
};
use std::{cell::RefCell, collections::BTreeMap};

///
/// SparseFieldSetCache
///
/// Request-scoped view of the fields the serializer may emit per resource
/// type. Wraps the requested projection map, falls back to every field of a
/// type when the request did not constrain it, and strips relationships of
/// restricted-backend types. Results are memoized for the life of the request.
///

pub struct SparseFieldSetCache<'a> {
    graph: &'a ResourceGraph,
    requested: &'a ProjectionMap,
    resolved: RefCell<BTreeMap<String, SparseFieldSet>>,
}

impl<'a> SparseFieldSetCache<'a> {
    #[must_use]
    pub fn new(graph: &'a ResourceGraph, requested: &'a ProjectionMap) -> Self {
        Self {
            graph,
            requested,
            resolved: RefCell::new(BTreeMap::new()),
        }
    }

    /// Fields the serializer should emit for a resource of the given type.
    ///
    /// Unknown types resolve to the empty set.
    #[must_use]
    pub fn fields_for_serializer(&self, resource_type: &str) -> SparseFieldSet {
        if let Some(hit) = self.resolved.borrow().get(resource_type) {
            return hit.clone();
        }

        let fields = self.resolve(resource_type);
        self.resolved
            .borrow_mut()
            .insert(resource_type.to_string(), fields.clone());

        fields
    }

    /// Field set used when a resource only appears as relationship linkage.
    #[must_use]
    pub fn id_only(&self, _resource_type: &str) -> SparseFieldSet {
        SparseFieldSet::new()
    }

    /// Drop memoized results, e.g. when the cache outlives a request in tests.
    pub fn reset(&self) {
        self.resolved.borrow_mut().clear();
    }

    fn resolve(&self, resource_type: &str) -> SparseFieldSet {
        let Some(resource) = self.graph.get(resource_type) else {
            return SparseFieldSet::new();
        };

        let selected = self
            .requested
            .get(resource_type)
            .cloned()
            .unwrap_or_else(|| SparseFieldSet::all_of(resource));

        filter_for_output(&selected, resource)
    }
}
