//! Storage seams for the engine
//!
//! Wayfarer owns no persistence of its own. The vector store and the
//! user/preference store are external collaborators reached through the
//! async traits in [`traits`]; the in-memory implementations in [`memory`]
//! back tests and embedded use.

pub mod errors;
pub mod memory;
pub mod traits;

pub use errors::{StorageError, StorageResult};
pub use memory::{InMemoryProfileStore, InMemoryVectorStore};
pub use traits::{BaseStore, ProfileStore, VectorStore};
