//! Trait definitions for storage components in Wayfarer

use std::fmt::Debug;

use async_trait::async_trait;

use crate::models::{EntityType, PreferenceProfile, TravelEntity, UserProfile};
use crate::storage::errors::StorageError;

/// Base trait for all storage implementations
#[async_trait]
pub trait BaseStore: Send + Sync + 'static + Debug {
    /// Check if the store is healthy and available
    async fn health_check(&self) -> std::result::Result<bool, StorageError>;

    /// Clear all data in the store
    async fn clear(&self) -> std::result::Result<(), StorageError>;
}

/// Trait for vector search over travel entities
///
/// Records without a stored embedding must never be returned from the
/// similarity operations. Similarity is `1 - cosine_distance`, so it is
/// monotonically higher for closer vectors.
#[async_trait]
pub trait VectorStore: BaseStore {
    /// Add an entity to the store
    async fn add_entity(&self, entity: TravelEntity)
        -> std::result::Result<TravelEntity, StorageError>;

    /// Get an entity by its ID
    async fn get_entity(&self, id: &str)
        -> std::result::Result<Option<TravelEntity>, StorageError>;

    /// Count entities, optionally restricted to one type
    async fn count_entities(
        &self,
        entity_type: Option<EntityType>,
    ) -> std::result::Result<usize, StorageError>;

    /// Return up to `limit` entities of the requested type whose cosine
    /// similarity to `query_vector` is at least `threshold`, ordered by
    /// similarity descending.
    ///
    /// Tie order between equal similarities is implementation-defined but
    /// must be stable; implementations document their choice.
    async fn search_similar(
        &self,
        entity_type: EntityType,
        query_vector: &[f32],
        limit: usize,
        threshold: f32,
    ) -> std::result::Result<Vec<(TravelEntity, f32)>, StorageError>;

    /// Entity-to-entity variant: given an existing entity's own embedding,
    /// find other entities of `target_type` above `threshold`, excluding
    /// the entity itself.
    async fn find_related(
        &self,
        entity_id: &str,
        target_type: EntityType,
        limit: usize,
        threshold: f32,
    ) -> std::result::Result<Vec<(TravelEntity, f32)>, StorageError>;
}

/// Trait for per-user profile storage
///
/// Wayfarer does not synchronize concurrent access to a single user's
/// profile: `put_preferences` is last-write-wins. Callers needing stronger
/// guarantees add a per-user lock above this trait.
#[async_trait]
pub trait ProfileStore: BaseStore {
    /// Load a user's preference profile, if one exists
    async fn get_preferences(
        &self,
        user_id: &str,
    ) -> std::result::Result<Option<PreferenceProfile>, StorageError>;

    /// Persist a user's preference profile, replacing any stored value
    async fn put_preferences(
        &self,
        profile: PreferenceProfile,
    ) -> std::result::Result<(), StorageError>;

    /// Load basic user fields used in context framing
    async fn get_user(&self, user_id: &str)
        -> std::result::Result<Option<UserProfile>, StorageError>;

    /// Persist basic user fields
    async fn put_user(&self, user: UserProfile) -> std::result::Result<(), StorageError>;
}
