use crate::value::Value;
use std::{cmp::Ordering, collections::BTreeMap};

/// Total canonical comparator used by sorting and stable tie-breaks.
///
/// Ordering rules:
/// 1. Canonical variant rank (`Null` sorts first)
/// 2. Variant-specific comparison for same-ranked values
///
/// Mixed-variant comparisons are rank-only and must remain deterministic.
#[must_use]
pub fn canonical_cmp(left: &Value, right: &Value) -> Ordering {
    let rank = left.canonical_rank().cmp(&right.canonical_rank());
    if rank != Ordering::Equal {
        return rank;
    }

    canonical_cmp_same_rank(left, right)
}

/// Strict comparator for filter evaluation.
///
/// Returns `None` for mismatched or non-orderable variants, so a filter such as
/// `lessThan(price, 'abc')` matches nothing instead of falling back to rank order.
#[must_use]
pub fn strict_order_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (a, b) if a.is_numeric() && b.is_numeric() => {
            let (a, b) = (a.to_f64()?, b.to_f64()?);
            a.partial_cmp(&b)
        }
        _ => None,
    }
}

/// Equality used by filters: numeric-aware, structural otherwise.
#[must_use]
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (a, b) if a.is_numeric() && b.is_numeric() => {
            strict_order_cmp(a, b) == Some(Ordering::Equal)
        }
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        _ => left == right,
    }
}

fn canonical_cmp_same_rank(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::Text(a), Value::Text(b)) => a.cmp(b),
        (Value::List(a), Value::List(b)) => canonical_cmp_value_list(a, b),
        (Value::Map(a), Value::Map(b)) => canonical_cmp_value_map(a, b),
        (a, b) if a.is_numeric() && b.is_numeric() => {
            // Both sides are numeric here; NaN is ordered by total_cmp.
            let a = a.to_f64().unwrap_or(f64::NAN);
            let b = b.to_f64().unwrap_or(f64::NAN);
            a.total_cmp(&b)
        }
        _ => Ordering::Equal,
    }
}

fn canonical_cmp_value_list(left: &[Value], right: &[Value]) -> Ordering {
    for (a, b) in left.iter().zip(right) {
        let cmp = canonical_cmp(a, b);
        if cmp != Ordering::Equal {
            return cmp;
        }
    }

    left.len().cmp(&right.len())
}

fn canonical_cmp_value_map(
    left: &BTreeMap<String, Value>,
    right: &BTreeMap<String, Value>,
) -> Ordering {
    for ((lk, lv), (rk, rv)) in left.iter().zip(right) {
        let cmp = lk.cmp(rk).then_with(|| canonical_cmp(lv, rv));
        if cmp != Ordering::Equal {
            return cmp;
        }
    }

    left.len().cmp(&right.len())
}
