//! Document-store runtime: query plans and their validation, the
//! collection abstraction, and the repository adapter.

pub mod cancel;
pub mod config;
pub mod document;
pub mod fields;
pub mod query;
pub mod repository;
pub mod store;

// re-exports
pub use cancel::{CancelHandle, CancelSignal};
pub use config::RepositoryConfig;
pub use repository::{Page, PageLinks, Repository};
pub use store::{DocumentCollection, MemoryCollection};
