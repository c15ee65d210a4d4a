//! Runtime resource model definitions.
//!
//! Types in `model` describe the resource schema handed over by the hosting
//! framework. Query validation, field filtering, and repositories read them;
//! nothing here touches storage.
//!
//! In general:
//! - the framework defines *what exists*
//! - `model` defines *what the backend can see*

mod graph;
mod resource;

#[cfg(test)]
mod tests;

pub use graph::{ResourceGraph, ResourceGraphError};
pub use resource::{Cardinality, FieldKind, ResourceField, ResourceType};
