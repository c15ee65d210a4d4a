//! Module: repository
//! Responsibility: JSON:API resource operations for one resource type stored
//! in a document collection.
//! Does not own: HTTP, serialization, or relationship storage.
//! Boundary: hosts call repositories; repositories call `DocumentCollection`.

mod page;

#[cfg(test)]
mod tests;

use crate::{
    ID_FIELD,
    db::{
        cancel::CancelSignal,
        config::RepositoryConfig,
        document::{Document, DocumentId},
        fields::TargetedFields,
        query::{
            lower::{lower_filter, lower_projection, lower_sort},
            plan::QueryPlan,
            validate::{PlanError, validate},
        },
        store::{DocumentCollection, StoreError, StoreFilter, StoreQuery},
    },
    error::{Error, ErrorClass, ErrorOrigin},
    model::{ResourceGraph, ResourceType},
    obs::{ExecKind, GlobalMetricsSink, MetricsEvent, MetricsSink, sink::Span},
    value::Value,
};
use std::{collections::BTreeMap, future::Future, sync::Arc};
use tracing::{debug, warn};

// re-exports
pub use page::{Page, PageLinks};

///
/// Repository
///
/// Resource repository for one resource type backed by a document collection.
///
/// Reads are validated against the backend's capabilities before any I/O.
/// Writes touch only targeted attributes. Relationship mutations are always
/// refused. The collection handle is shared; the repository itself holds no
/// per-request state and can serve concurrent requests.
///

pub struct Repository<C: DocumentCollection> {
    collection: Arc<C>,
    graph: Arc<ResourceGraph>,
    resource: ResourceType,
    config: RepositoryConfig,
    metrics: Arc<dyn MetricsSink>,
}

impl<C: DocumentCollection> Repository<C> {
    /// Bind a repository to the named resource type of `graph`.
    pub fn new(
        collection: Arc<C>,
        graph: Arc<ResourceGraph>,
        resource: &str,
    ) -> Result<Self, Error> {
        let resource = graph
            .get(resource)
            .cloned()
            .ok_or_else(|| PlanError::UnknownResourceType {
                name: resource.to_string(),
            })?;

        Ok(Self {
            collection,
            graph,
            resource,
            config: RepositoryConfig::default(),
            metrics: Arc::new(GlobalMetricsSink),
        })
    }

    #[must_use]
    pub const fn with_config(mut self, config: RepositoryConfig) -> Self {
        self.config = config;
        self
    }

    /// Route this repository's metrics events to `sink` instead of the
    /// process-wide counters.
    #[must_use]
    pub fn with_metrics_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.metrics = sink;
        self
    }

    #[must_use]
    pub const fn resource(&self) -> &ResourceType {
        &self.resource
    }

    #[must_use]
    pub const fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    #[must_use]
    pub fn collection(&self) -> &C {
        &self.collection
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Validate a query plan for this repository without executing it.
    pub fn validate(&self, plan: &QueryPlan) -> Result<(), Error> {
        if plan.resource != self.resource.name {
            return Err(Error::new(
                ErrorClass::InvalidQuery,
                ErrorOrigin::Query,
                format!(
                    "query plan targets resource type '{}' but this repository serves '{}'",
                    plan.resource, self.resource.name
                ),
            ));
        }

        validate(&self.graph, plan).map_err(|err| self.reject(err))
    }

    /// Run a validated, paginated query.
    pub async fn find_all(&self, plan: &QueryPlan, cancel: &CancelSignal) -> Result<Page, Error> {
        let mut span = Span::new(self.metrics.as_ref(), ExecKind::Load, &self.resource.name);
        self.validate(plan)?;

        let number = plan.pagination.map_or(1, |p| p.number.max(1));
        let size = self
            .config
            .effective_page_size(plan.pagination.and_then(|p| p.size));
        let query = StoreQuery {
            filter: self.lower_plan_filter(plan)?,
            sort: match &plan.sort {
                Some(sort) => lower_sort(&self.resource, sort)?,
                None => Vec::new(),
            },
            skip: size.map_or(0, |size| u64::from(number - 1) * u64::from(size)),
            limit: size.map(u64::from),
            projection: plan
                .primary_fields()
                .map(|fields| lower_projection(&self.resource, fields)),
        };

        debug!(
            resource = %self.resource.name,
            page = number,
            size = ?size,
            filtered = query.filter.is_some(),
            "find_all"
        );

        let documents = self
            .call(cancel, "find_all", self.collection.find(&query))
            .await?;
        let total = if self.config.include_total_count {
            Some(
                self.call(cancel, "count", self.collection.count(query.filter.as_ref()))
                    .await?,
            )
        } else {
            None
        };

        span.set_rows(documents.len() as u64);

        Ok(Page::new(documents, number, size, total))
    }

    /// Count documents matching the plan's filter; pagination is ignored.
    pub async fn count(&self, plan: &QueryPlan, cancel: &CancelSignal) -> Result<u64, Error> {
        let _span = Span::new(self.metrics.as_ref(), ExecKind::Load, &self.resource.name);
        self.validate(plan)?;

        let filter = self.lower_plan_filter(plan)?;
        debug!(resource = %self.resource.name, filtered = filter.is_some(), "count");

        self.call(cancel, "count", self.collection.count(filter.as_ref()))
            .await
    }

    pub async fn find_one(
        &self,
        id: &DocumentId,
        cancel: &CancelSignal,
    ) -> Result<Document, Error> {
        let mut span = Span::new(self.metrics.as_ref(), ExecKind::Load, &self.resource.name);
        debug!(resource = %self.resource.name, %id, "find_one");

        let document = self
            .call(cancel, "find_one", self.collection.get(id))
            .await?
            .ok_or_else(|| Error::not_found(&self.resource.name, id))?;
        span.set_rows(1);

        Ok(document)
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Create a document from the targeted attributes of `document`.
    ///
    /// A fresh id is generated when the document carries none; a supplied id
    /// that already exists fails with a conflict.
    pub async fn create(
        &self,
        document: Document,
        targeted: &TargetedFields,
        cancel: &CancelSignal,
    ) -> Result<Document, Error> {
        let mut span = Span::new(self.metrics.as_ref(), ExecKind::Save, &self.resource.name);
        self.check_targets("create", targeted)?;

        let Document { id, attributes } = document;
        let stored = Document {
            id,
            attributes: targeted_values(attributes, targeted),
        };
        debug!(
            resource = %self.resource.name,
            id = ?stored.id,
            attributes = stored.attributes.len(),
            "create"
        );

        let id = self
            .call(cancel, "create", self.collection.insert(stored.clone()))
            .await?;
        span.set_rows(1);

        Ok(Document {
            id: Some(id),
            ..stored
        })
    }

    /// Overwrite exactly the targeted attributes of an existing document.
    ///
    /// Untargeted attributes keep their stored values.
    pub async fn update(
        &self,
        id: &DocumentId,
        document: Document,
        targeted: &TargetedFields,
        cancel: &CancelSignal,
    ) -> Result<(), Error> {
        let mut span = Span::new(self.metrics.as_ref(), ExecKind::Save, &self.resource.name);
        self.check_targets("update", targeted)?;

        let fields = targeted_values(document.attributes, targeted);
        debug!(
            resource = %self.resource.name,
            %id,
            fields = ?fields.keys().collect::<Vec<_>>(),
            "update"
        );

        let matched = self
            .call(cancel, "update", self.collection.set_fields(id, fields))
            .await?;
        if !matched {
            return Err(Error::not_found(&self.resource.name, id));
        }
        span.set_rows(1);

        Ok(())
    }

    pub async fn delete(&self, id: &DocumentId, cancel: &CancelSignal) -> Result<(), Error> {
        let mut span = Span::new(self.metrics.as_ref(), ExecKind::Delete, &self.resource.name);
        debug!(resource = %self.resource.name, %id, "delete");

        let deleted = self
            .call(cancel, "delete", self.collection.delete(id))
            .await?;
        if !deleted {
            return Err(Error::not_found(&self.resource.name, id));
        }
        span.set_rows(1);

        Ok(())
    }

    // ------------------------------------------------------------------
    // Relationship mutations
    // ------------------------------------------------------------------

    /// Replace a relationship's linkage. Never supported by this backend.
    pub fn update_relationship(
        &self,
        id: &DocumentId,
        relationship: &str,
        _targets: &[DocumentId],
    ) -> Result<(), Error> {
        Err(self.unsupported("update_relationship", id, relationship))
    }

    /// Add members to a to-many relationship. Never supported by this backend.
    pub fn add_to_relationship(
        &self,
        id: &DocumentId,
        relationship: &str,
        _targets: &[DocumentId],
    ) -> Result<(), Error> {
        Err(self.unsupported("add_to_relationship", id, relationship))
    }

    /// Remove members from a to-many relationship. Never supported by this backend.
    pub fn remove_from_relationship(
        &self,
        id: &DocumentId,
        relationship: &str,
        _targets: &[DocumentId],
    ) -> Result<(), Error> {
        Err(self.unsupported("remove_from_relationship", id, relationship))
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn lower_plan_filter(&self, plan: &QueryPlan) -> Result<Option<StoreFilter>, Error> {
        match &plan.filter {
            Some(filter) => Ok(lower_filter(&self.resource, filter)?),
            None => Ok(None),
        }
    }

    // Run one storage call under the request's cancellation signal.
    async fn call<T>(
        &self,
        cancel: &CancelSignal,
        operation: &'static str,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, Error> {
        let result = cancel
            .guard(operation, async move { fut.await.map_err(Error::from) })
            .await;

        if let Err(err) = &result {
            warn!(
                resource = %self.resource.name,
                operation,
                class = %err.class,
                "{err}"
            );
        }

        result
    }

    fn reject(&self, err: PlanError) -> Error {
        if let Some(rejection) = err.capability() {
            self.metrics.record(MetricsEvent::Rejected {
                resource: &self.resource.name,
                rejection,
            });
        }
        warn!(resource = %self.resource.name, "query rejected: {err}");

        Error::from(err)
    }

    fn unsupported(&self, operation: &'static str, id: &DocumentId, relationship: &str) -> Error {
        warn!(
            resource = %self.resource.name,
            %id,
            relationship,
            operation,
            "relationship mutation refused"
        );

        Error::unsupported(operation, &self.resource.name)
    }

    fn check_targets(
        &self,
        operation: &'static str,
        targeted: &TargetedFields,
    ) -> Result<(), Error> {
        if let Some(relationship) = targeted.relationships.iter().next() {
            warn!(
                resource = %self.resource.name,
                relationship,
                operation,
                "relationship write refused"
            );

            return Err(Error::unsupported(
                &format!("{operation} with relationship '{relationship}'"),
                &self.resource.name,
            ));
        }

        for name in &targeted.attributes {
            if name == ID_FIELD {
                return Err(Error::invalid_input(format!(
                    "'{ID_FIELD}' is the resource identifier and cannot be written as an attribute"
                )));
            }
            if !self.resource.is_attribute(name) {
                return Err(Error::invalid_input(format!(
                    "'{name}' is not an attribute of resource type '{}'",
                    self.resource.name
                )));
            }
        }

        Ok(())
    }
}

// Keep only the targeted attributes that the request actually supplied.
fn targeted_values(
    mut attributes: BTreeMap<String, Value>,
    targeted: &TargetedFields,
) -> BTreeMap<String, Value> {
    attributes.retain(|name, _| targeted.attributes.contains(name));

    attributes
}
