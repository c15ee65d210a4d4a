//! Lowering of validated query expressions into the store's native shape.
//!
//! Lowering assumes the plan passed validation but stays total: shapes the
//! store cannot express still come back as capability rejections.
//!
//! Normalization applied on the way down:
//! - comparisons are rewritten so the attribute sits on the left
//! - literal-vs-literal comparisons fold to `True` / `False`
//! - nested AND / OR nodes are flattened and neutral elements removed
//! - double negation is eliminated

use crate::{
    db::{
        fields::{SparseFieldSet, filter_for_output},
        query::{
            expr::{FieldChain, FilterExpr, Operand, SortExpr, SortTarget},
            validate::CapabilityRejection,
        },
        store::{StoreFilter, StoreSort, eval},
    },
    model::ResourceType,
};
use std::collections::BTreeSet;

/// Lower a filter expression. A filter that folds to `True` lowers to `None`.
pub(crate) fn lower_filter(
    resource: &ResourceType,
    filter: &FilterExpr,
) -> Result<Option<StoreFilter>, CapabilityRejection> {
    let lowered = lower(resource, filter)?;

    Ok(match lowered {
        StoreFilter::True => None,
        other => Some(other),
    })
}

pub(crate) fn lower_sort(
    resource: &ResourceType,
    sort: &SortExpr,
) -> Result<Vec<StoreSort>, CapabilityRejection> {
    sort.terms
        .iter()
        .map(|term| match &term.target {
            SortTarget::Field(chain) => Ok(StoreSort {
                field: attribute_name(resource, chain)?,
                direction: term.direction,
            }),
            SortTarget::Count(chain) => Err(traversal(resource, format!("count({chain})"))),
        })
        .collect()
}

/// Attribute names to push down for a requested sparse field set.
pub(crate) fn lower_projection(
    resource: &ResourceType,
    fields: &SparseFieldSet,
) -> BTreeSet<String> {
    filter_for_output(fields, resource)
        .into_iter()
        .filter(|name| resource.is_attribute(name))
        .collect()
}

fn lower(resource: &ResourceType, filter: &FilterExpr) -> Result<StoreFilter, CapabilityRejection> {
    match filter {
        FilterExpr::Compare { op, left, right } => match (left, right) {
            (Operand::Field(chain), Operand::Literal(value)) => Ok(StoreFilter::Compare {
                field: attribute_name(resource, chain)?,
                op: *op,
                value: value.clone(),
            }),
            (Operand::Literal(value), Operand::Field(chain)) => Ok(StoreFilter::Compare {
                field: attribute_name(resource, chain)?,
                op: op.mirrored(),
                value: value.clone(),
            }),
            (Operand::Literal(a), Operand::Literal(b)) => Ok(if eval::compare(a, *op, b) {
                StoreFilter::True
            } else {
                StoreFilter::False
            }),
            (Operand::Field(_), Operand::Field(_)) => {
                Err(CapabilityRejection::AttributeComparison {
                    left: left.to_string(),
                    right: right.to_string(),
                })
            }
            (Operand::Count(_), _) => Err(traversal(resource, left)),
            (_, Operand::Count(_)) => Err(traversal(resource, right)),
        },
        FilterExpr::TextMatch { field, kind, value } => Ok(StoreFilter::TextMatch {
            field: attribute_name(resource, field)?,
            kind: *kind,
            value: value.clone(),
        }),
        FilterExpr::Any { field, values } => Ok(StoreFilter::In {
            field: attribute_name(resource, field)?,
            values: values.clone(),
        }),
        FilterExpr::Has { field, .. } => Err(traversal(resource, field)),
        FilterExpr::Not(inner) => Ok(match lower(resource, inner)? {
            StoreFilter::True => StoreFilter::False,
            StoreFilter::False => StoreFilter::True,
            StoreFilter::Not(double) => *double,
            other => StoreFilter::Not(Box::new(other)),
        }),
        FilterExpr::And(children) => lower_and(resource, children),
        FilterExpr::Or(children) => lower_or(resource, children),
    }
}

///
/// Rules:
/// - AND(True, x)        → x
/// - AND(False, x)       → False
/// - AND(AND(a, b), c)   → AND(a, b, c)
/// - AND()               → True
///
fn lower_and(
    resource: &ResourceType,
    children: &[FilterExpr],
) -> Result<StoreFilter, CapabilityRejection> {
    let mut out = Vec::new();

    for child in children {
        match lower(resource, child)? {
            StoreFilter::True => {}
            StoreFilter::False => return Ok(StoreFilter::False),
            StoreFilter::And(grandchildren) => out.extend(grandchildren),
            other => out.push(other),
        }
    }

    Ok(collapse(out, StoreFilter::True, StoreFilter::And))
}

///
/// Rules:
/// - OR(False, x)        → x
/// - OR(True, x)         → True
/// - OR(OR(a, b), c)     → OR(a, b, c)
/// - OR()                → False
///
fn lower_or(
    resource: &ResourceType,
    children: &[FilterExpr],
) -> Result<StoreFilter, CapabilityRejection> {
    let mut out = Vec::new();

    for child in children {
        match lower(resource, child)? {
            StoreFilter::False => {}
            StoreFilter::True => return Ok(StoreFilter::True),
            StoreFilter::Or(grandchildren) => out.extend(grandchildren),
            other => out.push(other),
        }
    }

    Ok(collapse(out, StoreFilter::False, StoreFilter::Or))
}

fn collapse(
    mut children: Vec<StoreFilter>,
    empty: StoreFilter,
    wrap: fn(Vec<StoreFilter>) -> StoreFilter,
) -> StoreFilter {
    match children.len() {
        0 => empty,
        1 => children.pop().unwrap_or(empty),
        _ => wrap(children),
    }
}

fn attribute_name(
    resource: &ResourceType,
    chain: &FieldChain,
) -> Result<String, CapabilityRejection> {
    match chain.single() {
        Some(name) if !resource.is_relationship(name) => Ok(name.to_string()),
        _ => Err(traversal(resource, chain)),
    }
}

fn traversal(resource: &ResourceType, chain: impl ToString) -> CapabilityRejection {
    CapabilityRejection::RelationshipTraversal {
        resource: resource.name.clone(),
        chain: chain.to_string(),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::query::expr::{CompareOp, OrderDirection, TextMatchKind},
        test_fixtures::book_type,
        value::Value,
    };

    fn price(op: CompareOp, value: impl Into<Value>) -> StoreFilter {
        StoreFilter::Compare {
            field: "price".into(),
            op,
            value: value.into(),
        }
    }

    #[test]
    fn literal_left_is_mirrored() {
        let filter = FilterExpr::compare(
            CompareOp::LessThan,
            Operand::literal(5),
            Operand::field("price"),
        );

        assert_eq!(
            lower_filter(&book_type(), &filter),
            Ok(Some(price(CompareOp::GreaterThan, 5)))
        );
    }

    #[test]
    fn literal_comparisons_fold_to_constants() {
        let books = book_type();
        let always = FilterExpr::compare(
            CompareOp::LessThan,
            Operand::literal(1),
            Operand::literal(2),
        );
        let never = FilterExpr::compare(
            CompareOp::Equals,
            Operand::literal("a"),
            Operand::literal("b"),
        );

        assert_eq!(lower_filter(&books, &always), Ok(None));
        assert_eq!(lower_filter(&books, &never), Ok(Some(StoreFilter::False)));
        assert_eq!(
            lower_filter(
                &books,
                &FilterExpr::and(vec![always, FilterExpr::equals("price", 2)])
            ),
            Ok(Some(price(CompareOp::Equals, 2)))
        );
    }

    #[test]
    fn nested_combinators_flatten() {
        let filter = FilterExpr::and(vec![
            FilterExpr::and(vec![
                FilterExpr::greater_than("price", 1),
                FilterExpr::less_than("price", 10),
            ]),
            FilterExpr::not(FilterExpr::not(FilterExpr::text(
                "name",
                TextMatchKind::StartsWith,
                "Basic",
            ))),
        ]);

        let Ok(Some(StoreFilter::And(children))) = lower_filter(&book_type(), &filter) else {
            panic!("expected a flattened AND");
        };

        assert_eq!(children.len(), 3);
        assert!(matches!(children[2], StoreFilter::TextMatch { .. }));
    }

    #[test]
    fn empty_or_lowers_to_false() {
        assert_eq!(
            lower_filter(&book_type(), &FilterExpr::or(vec![])),
            Ok(Some(StoreFilter::False))
        );
    }

    #[test]
    fn unvalidated_traversal_is_still_rejected() {
        let rejection = lower_filter(&book_type(), &FilterExpr::equals("publisher.name", "Acme"))
            .expect_err("traversal cannot be lowered");

        assert_eq!(rejection.reason_code(), "relationship_traversal_unsupported");
    }

    #[test]
    fn sort_lowers_attribute_terms() {
        let sort = SortExpr::desc("price").then("name", OrderDirection::Asc);

        assert_eq!(
            lower_sort(&book_type(), &sort),
            Ok(vec![
                StoreSort {
                    field: "price".into(),
                    direction: OrderDirection::Desc,
                },
                StoreSort {
                    field: "name".into(),
                    direction: OrderDirection::Asc,
                },
            ])
        );
    }

    #[test]
    fn projection_keeps_only_attributes() {
        let fields = SparseFieldSet::new()
            .with("name")
            .with("tags")
            .with("publisher");

        assert_eq!(
            lower_projection(&book_type(), &fields),
            BTreeSet::from(["name".to_string()])
        );
    }
}
