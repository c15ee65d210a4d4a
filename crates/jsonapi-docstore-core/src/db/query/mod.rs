//! Query plan vocabulary, capability validation, and lowering to the
//! document store's native query shape.

pub mod expr;
pub(crate) mod lower;
pub mod plan;
pub mod validate;

pub use expr::{
    CompareOp, FieldChain, FilterExpr, Operand, OrderDirection, PaginationExpr, SortExpr,
    SortTarget, SortTerm, TextMatchKind,
};
pub use plan::QueryPlan;
pub use validate::{CapabilityRejection, PlanError, validate};
