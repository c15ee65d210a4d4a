//! Core runtime for jsonapi-docstore: resource models, values, query
//! expressions, the capability validator, document collections, and the
//! repository adapter that ties them together.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod db;
pub mod error;
pub mod model;
pub mod obs;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::Error;

///
/// CONSTANTS
///

/// Name of the identifier member every document carries.
///
/// It is never an attribute; writes may not target it.
pub const ID_FIELD: &str = "id";

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No executors, stores, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{
            document::{Document, DocumentId},
            fields::{SparseFieldSet, TargetedFields},
            query::{FieldChain, FilterExpr, OrderDirection, QueryPlan, SortExpr},
        },
        model::{FieldKind, ResourceGraph, ResourceType},
        value::Value,
    };
}
