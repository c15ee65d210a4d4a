//! Capability validation for query plans.
//!
//! The document backend can filter and sort on the primary resource's own
//! attributes, compared against constant values. Everything else fails closed:
//!
//! 1. inclusion chains, or projections naming relationship fields
//! 2. field chains in filter/sort that traverse or name a relationship
//! 3. comparisons with a field chain on both sides
//!
//! Rules run in that order and the first violation wins. A plan that passes
//! them is still refused when it asks for pages of size zero. Validation never
//! alters the plan; a plan that passes is executed exactly as received.


use crate::{
    db::query::{
        expr::{FieldChain, FilterExpr, Operand, SortExpr, SortTarget},
        plan::QueryPlan,
    },
    model::{ResourceGraph, ResourceType},
};
use thiserror::Error as ThisError;

///
/// CapabilityRejection
///
/// Permanent refusal to execute a plan because the backend lacks a feature.
/// Never retried; always a client-input problem.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CapabilityRejection {
    #[error(
        "relationship traversal unsupported: '{chain}' on resource type '{resource}' requires following a relationship, which the document backend cannot do"
    )]
    RelationshipTraversal { resource: String, chain: String },

    #[error(
        "attribute comparison unsupported: '{left}' cannot be compared against '{right}'; compare an attribute with a constant value instead"
    )]
    AttributeComparison { left: String, right: String },
}

impl CapabilityRejection {
    /// Machine-stable reason code.
    #[must_use]
    pub const fn reason_code(&self) -> &'static str {
        match self {
            Self::RelationshipTraversal { .. } => "relationship_traversal_unsupported",
            Self::AttributeComparison { .. } => "attribute_comparison_unsupported",
        }
    }

    /// Stable human-readable title, one per rule.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::RelationshipTraversal { .. } => "relationship traversal unsupported",
            Self::AttributeComparison { .. } => "attribute comparison unsupported",
        }
    }

    fn traversal(resource: &ResourceType, chain: impl ToString) -> Self {
        Self::RelationshipTraversal {
            resource: resource.name.clone(),
            chain: chain.to_string(),
        }
    }
}

///
/// PlanError
///
/// Validation failures for one query plan. Capability rejections are the
/// backend-specific refusals; the remaining variants are malformed plans.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PlanError {
    #[error("{0}")]
    Capability(CapabilityRejection),

    #[error("unknown resource type '{name}'")]
    UnknownResourceType { name: String },

    #[error("unknown field '{field}' on resource type '{resource}'")]
    UnknownField { resource: String, field: String },

    #[error("page size must be at least 1")]
    ZeroPageSize,
}

impl PlanError {
    #[must_use]
    pub const fn capability(&self) -> Option<&CapabilityRejection> {
        match self {
            Self::Capability(rejection) => Some(rejection),
            _ => None,
        }
    }

    fn unknown_field(resource: &ResourceType, field: impl ToString) -> Self {
        Self::UnknownField {
            resource: resource.name.clone(),
            field: field.to_string(),
        }
    }
}

impl From<CapabilityRejection> for PlanError {
    fn from(err: CapabilityRejection) -> Self {
        Self::Capability(err)
    }
}

/// Validate a query plan against the document backend's capabilities.
pub fn validate(graph: &ResourceGraph, plan: &QueryPlan) -> Result<(), PlanError> {
    let resource = graph
        .get(&plan.resource)
        .ok_or_else(|| PlanError::UnknownResourceType {
            name: plan.resource.clone(),
        })?;

    validate_inclusion_and_projection(graph, resource, plan)?;

    if let Some(filter) = &plan.filter {
        validate_filter_chains(resource, filter)?;
    }
    if let Some(sort) = &plan.sort {
        validate_sort_chains(resource, sort)?;
    }

    if let Some(filter) = &plan.filter {
        reject_attribute_comparisons(filter)?;
    }

    if plan.pagination.is_some_and(|p| p.size == Some(0)) {
        return Err(PlanError::ZeroPageSize);
    }

    Ok(())
}

// Rule 1: nothing may pull related resources into the response.
fn validate_inclusion_and_projection(
    graph: &ResourceGraph,
    resource: &ResourceType,
    plan: &QueryPlan,
) -> Result<(), PlanError> {
    if let Some(chain) = plan.include.first() {
        return Err(CapabilityRejection::traversal(resource, chain).into());
    }

    for (type_name, fields) in &plan.projection {
        let projected = graph
            .get(type_name)
            .ok_or_else(|| PlanError::UnknownResourceType {
                name: type_name.clone(),
            })?;

        for name in fields.iter() {
            match projected.field(name) {
                Some(field) if field.kind.is_relationship() => {
                    return Err(CapabilityRejection::traversal(projected, name).into());
                }
                Some(_) => {}
                None => return Err(PlanError::unknown_field(projected, name)),
            }
        }
    }

    Ok(())
}

// Rule 2 (filter): every chain must resolve to one attribute of the primary type.
fn validate_filter_chains(resource: &ResourceType, filter: &FilterExpr) -> Result<(), PlanError> {
    match filter {
        FilterExpr::Compare { left, right, .. } => {
            validate_operand(resource, left)?;
            validate_operand(resource, right)
        }
        FilterExpr::TextMatch { field, .. } | FilterExpr::Any { field, .. } => {
            resolve_attribute(resource, field)
        }
        // `has` tests a to-many relationship for existence.
        FilterExpr::Has { field, .. } => {
            Err(CapabilityRejection::traversal(resource, field).into())
        }
        FilterExpr::Not(inner) => validate_filter_chains(resource, inner),
        FilterExpr::And(children) | FilterExpr::Or(children) => {
            for child in children {
                validate_filter_chains(resource, child)?;
            }

            Ok(())
        }
    }
}

// Rule 2 (sort).
fn validate_sort_chains(resource: &ResourceType, sort: &SortExpr) -> Result<(), PlanError> {
    for term in &sort.terms {
        match &term.target {
            SortTarget::Field(chain) => resolve_attribute(resource, chain)?,
            SortTarget::Count(chain) => {
                return Err(
                    CapabilityRejection::traversal(resource, format!("count({chain})")).into(),
                );
            }
        }
    }

    Ok(())
}

fn validate_operand(resource: &ResourceType, operand: &Operand) -> Result<(), PlanError> {
    match operand {
        Operand::Field(chain) => resolve_attribute(resource, chain),
        Operand::Literal(_) => Ok(()),
        Operand::Count(_) => Err(CapabilityRejection::traversal(resource, operand).into()),
    }
}

fn resolve_attribute(resource: &ResourceType, chain: &FieldChain) -> Result<(), PlanError> {
    if chain.is_empty() || chain.iter().any(String::is_empty) {
        return Err(PlanError::unknown_field(resource, chain));
    }

    let Some(name) = chain.single() else {
        return Err(CapabilityRejection::traversal(resource, chain).into());
    };

    match resource.field(name) {
        Some(field) if field.kind.is_relationship() => {
            Err(CapabilityRejection::traversal(resource, chain).into())
        }
        Some(_) => Ok(()),
        None => Err(PlanError::unknown_field(resource, name)),
    }
}

// Rule 3: the backend only compares attributes against constants.
fn reject_attribute_comparisons(filter: &FilterExpr) -> Result<(), CapabilityRejection> {
    match filter {
        FilterExpr::Compare { left, right, .. } => {
            if left.is_field() && right.is_field() {
                return Err(CapabilityRejection::AttributeComparison {
                    left: left.to_string(),
                    right: right.to_string(),
                });
            }

            Ok(())
        }
        FilterExpr::TextMatch { .. } | FilterExpr::Any { .. } => Ok(()),
        FilterExpr::Has { filter, .. } => filter
            .as_deref()
            .map_or(Ok(()), reject_attribute_comparisons),
        FilterExpr::Not(inner) => reject_attribute_comparisons(inner),
        FilterExpr::And(children) | FilterExpr::Or(children) => {
            children.iter().try_for_each(reject_attribute_comparisons)
        }
    }
}
