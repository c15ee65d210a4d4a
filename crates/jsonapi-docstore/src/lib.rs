//! ## Crate layout
//! - `core`: resource models, values, query plans, capability validation,
//!   document collections, repositories, and observability.
//! - `json`: JSON:API document helpers for hosts that speak raw JSON.
//!
//! The `prelude` module mirrors the surface a host request handler needs.

pub use jsonapi_docstore_core as core;

pub mod json;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use core::{Error, db};

///
/// Host Prelude
///

pub mod prelude {
    pub use crate::core::{
        db::{
            CancelHandle, CancelSignal, DocumentCollection as _, MemoryCollection, Page,
            PageLinks, Repository, RepositoryConfig,
            fields::SparseFieldSetCache,
            query::{CompareOp, Operand, TextMatchKind},
        },
        error::{ErrorClass, ErrorObject},
        prelude::*,
    };
    pub use serde::{Deserialize, Serialize};
}
