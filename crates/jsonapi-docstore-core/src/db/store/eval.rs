use crate::{
    db::{
        document::Document,
        query::{CompareOp, OrderDirection, TextMatchKind},
        store::{StoreFilter, StoreSort},
    },
    value::{Value, canonical_cmp, strict_order_cmp, values_equal},
};
use std::cmp::Ordering;

static NULL: Value = Value::Null;

// Missing attributes read as null.
fn attribute<'a>(document: &'a Document, field: &str) -> &'a Value {
    document.get(field).unwrap_or(&NULL)
}

pub(super) fn matches(filter: &StoreFilter, document: &Document) -> bool {
    match filter {
        StoreFilter::True => true,
        StoreFilter::False => false,
        StoreFilter::Compare { field, op, value } => {
            compare(attribute(document, field), *op, value)
        }
        StoreFilter::TextMatch { field, kind, value } => attribute(document, field)
            .as_text()
            .is_some_and(|text| match kind {
                TextMatchKind::Contains => text.contains(value.as_str()),
                TextMatchKind::StartsWith => text.starts_with(value.as_str()),
                TextMatchKind::EndsWith => text.ends_with(value.as_str()),
            }),
        StoreFilter::In { field, values } => {
            let actual = attribute(document, field);
            values.iter().any(|candidate| values_equal(actual, candidate))
        }
        StoreFilter::Not(inner) => !matches(inner, document),
        StoreFilter::And(children) => children.iter().all(|child| matches(child, document)),
        StoreFilter::Or(children) => children.iter().any(|child| matches(child, document)),
    }
}

/// Apply one comparison operator.
///
/// Ordering operators only match values of the same family; a text attribute
/// is never less than a number.
pub(crate) fn compare(actual: &Value, op: CompareOp, expected: &Value) -> bool {
    let ordered = |accept: fn(Ordering) -> bool| {
        strict_order_cmp(actual, expected).is_some_and(accept)
    };

    match op {
        CompareOp::Equals => values_equal(actual, expected),
        CompareOp::LessThan => ordered(Ordering::is_lt),
        CompareOp::LessOrEqual => ordered(Ordering::is_le),
        CompareOp::GreaterThan => ordered(Ordering::is_gt),
        CompareOp::GreaterOrEqual => ordered(Ordering::is_ge),
    }
}

/// Order two documents by the sort keys, ties broken by id.
pub(super) fn order(sort: &[StoreSort], left: &Document, right: &Document) -> Ordering {
    for key in sort {
        let cmp = canonical_cmp(attribute(left, &key.field), attribute(right, &key.field));
        let cmp = match key.direction {
            OrderDirection::Asc => cmp,
            OrderDirection::Desc => cmp.reverse(),
        };

        if cmp != Ordering::Equal {
            return cmp;
        }
    }

    left.id.cmp(&right.id)
}
