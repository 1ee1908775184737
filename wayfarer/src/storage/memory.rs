//! In-memory storage backends
//!
//! These back tests and embedded use. The vector store keeps entities in
//! insertion order and uses a stable sort when ranking by similarity, so
//! equal-similarity ties always come back in insertion order.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::{EntityType, PreferenceProfile, TravelEntity, UserProfile};
use crate::storage::errors::StorageError;
use crate::storage::traits::{BaseStore, ProfileStore, VectorStore};

/// Cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched lengths or zero-norm inputs. For identical
/// non-zero vectors the result is 1.0 within floating-point tolerance.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// In-memory vector store over travel entities
#[derive(Debug)]
pub struct InMemoryVectorStore {
    dimension: usize,
    entities: RwLock<Vec<TravelEntity>>,
}

impl InMemoryVectorStore {
    /// Create an empty store expecting embeddings of the given dimension
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entities: RwLock::new(Vec::new()),
        }
    }

    /// The embedding dimension this store accepts
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), StorageError> {
        if vector.len() != self.dimension {
            return Err(StorageError::Validation(format!(
                "query vector has {} components, store expects {}",
                vector.len(),
                self.dimension
            )));
        }
        Ok(())
    }

    async fn similar_to_vector(
        &self,
        entity_type: EntityType,
        query_vector: &[f32],
        limit: usize,
        threshold: f32,
        exclude_id: Option<&str>,
    ) -> Result<Vec<(TravelEntity, f32)>, StorageError> {
        self.check_dimension(query_vector)?;

        let entities = self.entities.read().await;
        let mut hits: Vec<(TravelEntity, f32)> = entities
            .iter()
            .filter(|e| e.entity_type == entity_type)
            .filter(|e| exclude_id != Some(e.id.as_str()))
            .filter_map(|e| {
                // Entities lacking a usable embedding are never returned.
                let embedding = e.embedding.as_ref()?;
                if embedding.len() != self.dimension {
                    return None;
                }
                let similarity = cosine_similarity(embedding, query_vector);
                if similarity >= threshold {
                    Some((e.clone(), similarity))
                } else {
                    None
                }
            })
            .collect();

        // Stable sort keeps equal similarities in insertion order.
        hits.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);
        Ok(hits)
    }
}

#[async_trait]
impl BaseStore for InMemoryVectorStore {
    async fn health_check(&self) -> Result<bool, StorageError> {
        Ok(true)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.entities.write().await.clear();
        Ok(())
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add_entity(&self, entity: TravelEntity) -> Result<TravelEntity, StorageError> {
        if let Some(embedding) = entity.embedding.as_ref() {
            if embedding.len() != self.dimension {
                return Err(StorageError::Validation(format!(
                    "entity '{}' embedding has {} components, store expects {}",
                    entity.id,
                    embedding.len(),
                    self.dimension
                )));
            }
        }
        self.entities.write().await.push(entity.clone());
        Ok(entity)
    }

    async fn get_entity(&self, id: &str) -> Result<Option<TravelEntity>, StorageError> {
        let entities = self.entities.read().await;
        Ok(entities.iter().find(|e| e.id == id).cloned())
    }

    async fn count_entities(
        &self,
        entity_type: Option<EntityType>,
    ) -> Result<usize, StorageError> {
        let entities = self.entities.read().await;
        Ok(match entity_type {
            Some(t) => entities.iter().filter(|e| e.entity_type == t).count(),
            None => entities.len(),
        })
    }

    async fn search_similar(
        &self,
        entity_type: EntityType,
        query_vector: &[f32],
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<(TravelEntity, f32)>, StorageError> {
        self.similar_to_vector(entity_type, query_vector, limit, threshold, None)
            .await
    }

    async fn find_related(
        &self,
        entity_id: &str,
        target_type: EntityType,
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<(TravelEntity, f32)>, StorageError> {
        let source = self
            .get_entity(entity_id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("entity '{}'", entity_id)))?;
        let embedding = source.embedding.clone().ok_or_else(|| {
            StorageError::Validation(format!("entity '{}' has no embedding", entity_id))
        })?;

        self.similar_to_vector(target_type, &embedding, limit, threshold, Some(entity_id))
            .await
    }
}

/// In-memory user and preference store
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    preferences: RwLock<HashMap<String, PreferenceProfile>>,
    users: RwLock<HashMap<String, UserProfile>>,
}

impl InMemoryProfileStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseStore for InMemoryProfileStore {
    async fn health_check(&self) -> Result<bool, StorageError> {
        Ok(true)
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.preferences.write().await.clear();
        self.users.write().await.clear();
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get_preferences(
        &self,
        user_id: &str,
    ) -> Result<Option<PreferenceProfile>, StorageError> {
        Ok(self.preferences.read().await.get(user_id).cloned())
    }

    async fn put_preferences(&self, profile: PreferenceProfile) -> Result<(), StorageError> {
        self.preferences
            .write()
            .await
            .insert(profile.user_id.clone(), profile);
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, StorageError> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn put_user(&self, user: UserProfile) -> Result<(), StorageError> {
        self.users.write().await.insert(user.id.clone(), user);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityBuilder;

    fn destination(name: &str, embedding: Vec<f32>) -> TravelEntity {
        EntityBuilder::new(EntityType::Destination, name)
            .embedding(embedding)
            .build()
    }

    #[test]
    fn test_cosine_similarity_identical_vectors() {
        let v = vec![0.3, 0.5, 0.8];
        let similarity = cosine_similarity(&v, &v);
        assert!((similarity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal_and_degenerate() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_search_orders_by_similarity_descending() {
        tokio_test::block_on(async {
            let store = InMemoryVectorStore::new(2);
            store
                .add_entity(destination("far", vec![0.0, 1.0]))
                .await
                .unwrap();
            store
                .add_entity(destination("near", vec![1.0, 0.1]))
                .await
                .unwrap();

            let hits = store
                .search_similar(EntityType::Destination, &[1.0, 0.0], 10, 0.0)
                .await
                .unwrap();
            assert_eq!(hits.len(), 2);
            assert_eq!(hits[0].0.name, "near");
            assert!(hits[0].1 > hits[1].1);
        });
    }

    #[test]
    fn test_threshold_filters_and_limit_caps() {
        tokio_test::block_on(async {
            let store = InMemoryVectorStore::new(2);
            store
                .add_entity(destination("a", vec![1.0, 0.0]))
                .await
                .unwrap();
            store
                .add_entity(destination("b", vec![0.9, 0.1]))
                .await
                .unwrap();
            store
                .add_entity(destination("c", vec![0.0, 1.0]))
                .await
                .unwrap();

            let hits = store
                .search_similar(EntityType::Destination, &[1.0, 0.0], 1, 0.5)
                .await
                .unwrap();
            assert_eq!(hits.len(), 1);
            assert_eq!(hits[0].0.name, "a");
        });
    }

    #[test]
    fn test_entities_without_embedding_never_returned() {
        tokio_test::block_on(async {
            let store = InMemoryVectorStore::new(2);
            store
                .add_entity(EntityBuilder::new(EntityType::Destination, "unembedded").build())
                .await
                .unwrap();

            let hits = store
                .search_similar(EntityType::Destination, &[1.0, 0.0], 10, 0.0)
                .await
                .unwrap();
            assert!(hits.is_empty());
        });
    }

    #[test]
    fn test_ties_stay_in_insertion_order() {
        tokio_test::block_on(async {
            let store = InMemoryVectorStore::new(2);
            // Parallel vectors: identical similarity to any query.
            store
                .add_entity(destination("first", vec![1.0, 0.0]))
                .await
                .unwrap();
            store
                .add_entity(destination("second", vec![2.0, 0.0]))
                .await
                .unwrap();

            let hits = store
                .search_similar(EntityType::Destination, &[3.0, 0.0], 10, 0.0)
                .await
                .unwrap();
            assert_eq!(hits[0].0.name, "first");
            assert_eq!(hits[1].0.name, "second");
        });
    }

    #[test]
    fn test_dimension_mismatch_is_loud() {
        tokio_test::block_on(async {
            let store = InMemoryVectorStore::new(3);
            let result = store
                .search_similar(EntityType::Destination, &[1.0, 0.0], 10, 0.0)
                .await;
            assert!(matches!(result, Err(StorageError::Validation(_))));

            let rejected = store
                .add_entity(destination("bad", vec![1.0, 0.0]))
                .await;
            assert!(matches!(rejected, Err(StorageError::Validation(_))));
        });
    }

    #[test]
    fn test_find_related_excludes_self() {
        tokio_test::block_on(async {
            let store = InMemoryVectorStore::new(2);
            let anchor = EntityBuilder::new(EntityType::Destination, "anchor")
                .id("anchor-id")
                .embedding(vec![1.0, 0.0])
                .build();
            store.add_entity(anchor).await.unwrap();
            store
                .add_entity(destination("twin", vec![1.0, 0.0]))
                .await
                .unwrap();

            let related = store
                .find_related("anchor-id", EntityType::Destination, 10, 0.9)
                .await
                .unwrap();
            assert_eq!(related.len(), 1);
            assert_eq!(related[0].0.name, "twin");
        });
    }

    #[test]
    fn test_profile_store_last_write_wins() {
        tokio_test::block_on(async {
            let store = InMemoryProfileStore::new();
            let mut first = PreferenceProfile::new("u1");
            first.budget_history.push(100.0);
            store.put_preferences(first).await.unwrap();

            let second = PreferenceProfile::new("u1");
            store.put_preferences(second).await.unwrap();

            let loaded = store.get_preferences("u1").await.unwrap().unwrap();
            assert!(loaded.budget_history.is_empty());
        });
    }
}
