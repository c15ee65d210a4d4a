//! Query expression tree.
//!
//! Pure, schema-agnostic representation of the filter/sort/pagination/include
//! parts of one request. The tree carries no type information; whether a field
//! chain names an attribute or a relationship is decided by validation against
//! a `ResourceGraph`.

use crate::value::Value;
use derive_more::Deref;
use std::fmt;

///
/// FieldChain
///
/// Dotted path of one or more field names (`price`, `author.name`).
/// Chains longer than one segment traverse a relationship.
///

#[derive(Clone, Debug, Deref, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FieldChain(Vec<String>);

impl FieldChain {
    #[must_use]
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Split a dotted path into segments. Empty segments are kept so that
    /// validation can reject malformed paths such as `price.` or `.price`.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        Self::new(path.split('.'))
    }

    /// The only segment, when the chain has exactly one.
    #[must_use]
    pub fn single(&self) -> Option<&str> {
        match self.0.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for FieldChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl From<&str> for FieldChain {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareOp {
    Equals,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
}

impl CompareOp {
    /// Operator to use when the operands swap sides.
    #[must_use]
    pub const fn mirrored(self) -> Self {
        match self {
            Self::Equals => Self::Equals,
            Self::LessThan => Self::GreaterThan,
            Self::LessOrEqual => Self::GreaterOrEqual,
            Self::GreaterThan => Self::LessThan,
            Self::GreaterOrEqual => Self::LessOrEqual,
        }
    }
}

///
/// TextMatchKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextMatchKind {
    Contains,
    StartsWith,
    EndsWith,
}

///
/// Operand
///
/// One side of a comparison. `Count` is the number of resources in a
/// to-many relationship and therefore always names a relationship.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Field(FieldChain),
    Literal(Value),
    Count(FieldChain),
}

impl Operand {
    #[must_use]
    pub fn field(path: &str) -> Self {
        Self::Field(FieldChain::parse(path))
    }

    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    #[must_use]
    pub fn count(path: &str) -> Self {
        Self::Count(FieldChain::parse(path))
    }

    #[must_use]
    pub const fn is_field(&self) -> bool {
        matches!(self, Self::Field(_))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(chain) => write!(f, "{chain}"),
            Self::Literal(value) => write!(f, "{value:?}"),
            Self::Count(chain) => write!(f, "count({chain})"),
        }
    }
}

///
/// FilterExpr
///

#[derive(Clone, Debug, PartialEq)]
pub enum FilterExpr {
    Compare {
        op: CompareOp,
        left: Operand,
        right: Operand,
    },
    TextMatch {
        field: FieldChain,
        kind: TextMatchKind,
        value: String,
    },
    Any {
        field: FieldChain,
        values: Vec<Value>,
    },
    Has {
        field: FieldChain,
        filter: Option<Box<Self>>,
    },
    Not(Box<Self>),
    And(Vec<Self>),
    Or(Vec<Self>),
}

impl FilterExpr {
    #[must_use]
    pub const fn compare(op: CompareOp, left: Operand, right: Operand) -> Self {
        Self::Compare { op, left, right }
    }

    #[must_use]
    pub fn equals(path: &str, value: impl Into<Value>) -> Self {
        Self::compare(CompareOp::Equals, Operand::field(path), Operand::literal(value))
    }

    #[must_use]
    pub fn less_than(path: &str, value: impl Into<Value>) -> Self {
        Self::compare(CompareOp::LessThan, Operand::field(path), Operand::literal(value))
    }

    #[must_use]
    pub fn less_or_equal(path: &str, value: impl Into<Value>) -> Self {
        Self::compare(CompareOp::LessOrEqual, Operand::field(path), Operand::literal(value))
    }

    #[must_use]
    pub fn greater_than(path: &str, value: impl Into<Value>) -> Self {
        Self::compare(CompareOp::GreaterThan, Operand::field(path), Operand::literal(value))
    }

    #[must_use]
    pub fn greater_or_equal(path: &str, value: impl Into<Value>) -> Self {
        Self::compare(
            CompareOp::GreaterOrEqual,
            Operand::field(path),
            Operand::literal(value),
        )
    }

    /// Comparison of two field chains (`equals(name,title)`).
    #[must_use]
    pub fn fields(op: CompareOp, left: &str, right: &str) -> Self {
        Self::compare(op, Operand::field(left), Operand::field(right))
    }

    #[must_use]
    pub fn text(path: &str, kind: TextMatchKind, value: impl Into<String>) -> Self {
        Self::TextMatch {
            field: FieldChain::parse(path),
            kind,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn any<V: Into<Value>>(path: &str, values: impl IntoIterator<Item = V>) -> Self {
        Self::Any {
            field: FieldChain::parse(path),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn has(path: &str, filter: Option<Self>) -> Self {
        Self::Has {
            field: FieldChain::parse(path),
            filter: filter.map(Box::new),
        }
    }

    #[expect(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(inner: Self) -> Self {
        Self::Not(Box::new(inner))
    }

    #[must_use]
    pub const fn and(children: Vec<Self>) -> Self {
        Self::And(children)
    }

    #[must_use]
    pub const fn or(children: Vec<Self>) -> Self {
        Self::Or(children)
    }
}

///
/// OrderDirection
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

///
/// SortTarget
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SortTarget {
    Field(FieldChain),
    Count(FieldChain),
}

///
/// SortTerm
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SortTerm {
    pub target: SortTarget,
    pub direction: OrderDirection,
}

///
/// SortExpr
///
/// Ordered list of sort terms; earlier terms take precedence.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SortExpr {
    pub terms: Vec<SortTerm>,
}

impl SortExpr {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn asc(path: &str) -> Self {
        Self::new().then(path, OrderDirection::Asc)
    }

    #[must_use]
    pub fn desc(path: &str) -> Self {
        Self::new().then(path, OrderDirection::Desc)
    }

    #[must_use]
    pub fn then(mut self, path: &str, direction: OrderDirection) -> Self {
        self.terms.push(SortTerm {
            target: SortTarget::Field(FieldChain::parse(path)),
            direction,
        });
        self
    }

    #[must_use]
    pub fn then_count(mut self, path: &str, direction: OrderDirection) -> Self {
        self.terms.push(SortTerm {
            target: SortTarget::Count(FieldChain::parse(path)),
            direction,
        });
        self
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

///
/// PaginationExpr
///
/// 1-based page number plus optional page size. Carries no field chains.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PaginationExpr {
    pub number: u32,
    pub size: Option<u32>,
}

impl PaginationExpr {
    /// Build a page request; page number zero is treated as the first page.
    #[must_use]
    pub const fn new(number: u32, size: Option<u32>) -> Self {
        Self {
            number: if number == 0 { 1 } else { number },
            size,
        }
    }

    #[must_use]
    pub const fn page(number: u32, size: u32) -> Self {
        Self::new(number, Some(size))
    }
}

impl Default for PaginationExpr {
    fn default() -> Self {
        Self::new(1, None)
    }
}
