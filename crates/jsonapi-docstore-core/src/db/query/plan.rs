use crate::{
    db::{
        fields::{ProjectionMap, SparseFieldSet},
        query::{
            expr::{FieldChain, FilterExpr, PaginationExpr, SortExpr},
            validate::{PlanError, validate},
        },
    },
    model::ResourceGraph,
};

///
/// QueryPlan
///
/// One inbound read request as handed over by the hosting framework:
/// primary resource type, optional filter/sort/pagination, inclusion chains,
/// and per-type sparse field sets. Built per request and consumed once.
///

#[derive(Clone, Debug, PartialEq)]
pub struct QueryPlan {
    pub resource: String,
    pub filter: Option<FilterExpr>,
    pub sort: Option<SortExpr>,
    pub pagination: Option<PaginationExpr>,
    pub include: Vec<FieldChain>,
    pub projection: ProjectionMap,
}

impl QueryPlan {
    #[must_use]
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            filter: None,
            sort: None,
            pagination: None,
            include: Vec::new(),
            projection: ProjectionMap::new(),
        }
    }

    #[must_use]
    pub fn filter(mut self, filter: FilterExpr) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn sort(mut self, sort: SortExpr) -> Self {
        self.sort = Some(sort);
        self
    }

    #[must_use]
    pub const fn paginate(mut self, pagination: PaginationExpr) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Shorthand for `page[number]=number&page[size]=size`.
    #[must_use]
    pub const fn page(self, number: u32, size: u32) -> Self {
        self.paginate(PaginationExpr::page(number, size))
    }

    #[must_use]
    pub fn include(mut self, path: &str) -> Self {
        self.include.push(FieldChain::parse(path));
        self
    }

    /// Request a sparse field set for one resource type (`fields[type]=a,b`).
    #[must_use]
    pub fn fields<I, S>(mut self, resource: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection
            .insert(resource.into(), names.into_iter().collect::<SparseFieldSet>());
        self
    }

    /// Sparse field set requested for the primary resource type, if any.
    #[must_use]
    pub fn primary_fields(&self) -> Option<&SparseFieldSet> {
        self.projection.get(&self.resource)
    }

    /// Validate this plan against the capabilities of the document backend.
    pub fn validate(&self, graph: &ResourceGraph) -> Result<(), PlanError> {
        validate(graph, self)
    }
}
