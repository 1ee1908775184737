//! Travel entity model representing searchable catalog records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Types of travel entities the engine searches and ranks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// A travel destination (city, island, region)
    Destination,
    /// A lodging property (hotel, villa, hostel)
    Property,
    /// A lodging category (boutique hotel, beach resort, cabin)
    Category,
    /// An amenity (pool, spa, pet-friendly)
    Amenity,
}

impl EntityType {
    /// All entity types, in the order searches fan out
    pub const ALL: [EntityType; 4] = [
        EntityType::Destination,
        EntityType::Property,
        EntityType::Category,
        EntityType::Amenity,
    ];

    /// Convert a string to an EntityType, if it names one
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "destination" => Some(Self::Destination),
            "property" => Some(Self::Property),
            "category" => Some(Self::Category),
            "amenity" => Some(Self::Amenity),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Destination => write!(f, "destination"),
            Self::Property => write!(f, "property"),
            Self::Category => write!(f, "category"),
            Self::Amenity => write!(f, "amenity"),
        }
    }
}

/// Core travel entity structure for all searchable records
///
/// Entities are embedded out of band (an external batch process) and carry
/// their embedding inline. Entities without an embedding are stored but
/// never returned by similarity search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TravelEntity {
    /// Unique identifier for the entity
    pub id: String,

    /// Type of entity
    pub entity_type: EntityType,

    /// Display name
    pub name: String,

    /// Free-text description shown in assembled context
    pub description: String,

    /// Tags for categorization (climate, activities, styles)
    pub tags: Vec<String>,

    /// Region the entity belongs to (e.g. "mediterranean")
    pub region: Option<String>,

    /// Country name
    pub country: Option<String>,

    /// Normalized popularity index in [0, 1], if known
    pub popularity: Option<f32>,

    /// Coarse price level from 1 (budget) to 5 (luxury)
    pub price_level: Option<u8>,

    /// Typical nightly rate in the catalog's base currency
    pub nightly_rate: Option<f64>,

    /// Guest capacity, for lodging properties
    pub capacity: Option<u32>,

    /// Star rating from 0.0 to 5.0, for lodging properties
    pub star_rating: Option<f32>,

    /// Parent destination, for properties that belong to one
    pub destination_id: Option<String>,

    /// Additional properties as arbitrary JSON
    pub properties: serde_json::Value,

    /// When the entity was created
    pub created_at: DateTime<Utc>,

    /// Vector embedding if available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl TravelEntity {
    /// Create a new entity with minimal information
    pub fn new(entity_type: EntityType, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            entity_type,
            name: name.into(),
            description: String::new(),
            tags: Vec::new(),
            region: None,
            country: None,
            popularity: None,
            price_level: None,
            nightly_rate: None,
            capacity: None,
            star_rating: None,
            destination_id: None,
            properties: serde_json::json!({}),
            created_at: Utc::now(),
            embedding: None,
        }
    }

    /// Create a builder for more complex entity creation
    pub fn builder(entity_type: EntityType, name: impl Into<String>) -> EntityBuilder {
        EntityBuilder::new(entity_type, name)
    }

    /// Whether this entity can participate in similarity search
    pub fn is_searchable(&self, dimension: usize) -> bool {
        self.embedding
            .as_ref()
            .map(|e| e.len() == dimension)
            .unwrap_or(false)
    }

    /// Whether any of the entity's tags matches the given tag (case-insensitive)
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Star rating bucket used as a preference-map key (e.g. "4", "5")
    pub fn star_bucket(&self) -> Option<String> {
        self.star_rating.map(|r| format!("{}", r.floor() as u8))
    }
}

/// Builder for creating travel entities
#[derive(Debug, Clone)]
pub struct EntityBuilder {
    entity: TravelEntity,
}

impl EntityBuilder {
    /// Create a new builder for the given entity type and name
    pub fn new(entity_type: EntityType, name: impl Into<String>) -> Self {
        Self {
            entity: TravelEntity::new(entity_type, name),
        }
    }

    /// Set the entity id (defaults to a random UUID)
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.entity.id = id.into();
        self
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.entity.description = description.into();
        self
    }

    /// Add a single tag
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.entity.tags.push(tag.into());
        self
    }

    /// Replace all tags
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.entity.tags = tags;
        self
    }

    /// Set the region
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.entity.region = Some(region.into());
        self
    }

    /// Set the country
    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.entity.country = Some(country.into());
        self
    }

    /// Set the normalized popularity index, clamped to [0, 1]
    pub fn popularity(mut self, popularity: f32) -> Self {
        self.entity.popularity = Some(popularity.clamp(0.0, 1.0));
        self
    }

    /// Set the price level (1 = budget, 5 = luxury)
    pub fn price_level(mut self, level: u8) -> Self {
        self.entity.price_level = Some(level.clamp(1, 5));
        self
    }

    /// Set the typical nightly rate
    pub fn nightly_rate(mut self, rate: f64) -> Self {
        self.entity.nightly_rate = Some(rate);
        self
    }

    /// Set the guest capacity
    pub fn capacity(mut self, capacity: u32) -> Self {
        self.entity.capacity = Some(capacity);
        self
    }

    /// Set the star rating
    pub fn star_rating(mut self, rating: f32) -> Self {
        self.entity.star_rating = Some(rating.clamp(0.0, 5.0));
        self
    }

    /// Set the parent destination id
    pub fn destination_id(mut self, id: impl Into<String>) -> Self {
        self.entity.destination_id = Some(id.into());
        self
    }

    /// Set a property value
    pub fn property(mut self, key: &str, value: serde_json::Value) -> Self {
        if let serde_json::Value::Object(ref mut map) = self.entity.properties {
            map.insert(key.to_string(), value);
        }
        self
    }

    /// Set the embedding vector
    pub fn embedding(mut self, embedding: Vec<f32>) -> Self {
        self.entity.embedding = Some(embedding);
        self
    }

    /// Build the entity
    pub fn build(self) -> TravelEntity {
        self.entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_roundtrip() {
        for entity_type in EntityType::ALL {
            assert_eq!(EntityType::parse(&entity_type.to_string()), Some(entity_type));
        }
        assert_eq!(EntityType::parse("restaurant"), None);
    }

    #[test]
    fn test_builder_sets_fields() {
        let entity = EntityBuilder::new(EntityType::Property, "Cliffside Suites")
            .description("Small hotel carved into the caldera")
            .tag("boutique")
            .tag("sea-view")
            .region("mediterranean")
            .country("Greece")
            .nightly_rate(280.0)
            .capacity(24)
            .star_rating(4.5)
            .build();

        assert_eq!(entity.entity_type, EntityType::Property);
        assert_eq!(entity.tags.len(), 2);
        assert!(entity.has_tag("BOUTIQUE"));
        assert_eq!(entity.star_bucket().as_deref(), Some("4"));
        assert!(!entity.is_searchable(4));
    }

    #[test]
    fn test_is_searchable_requires_exact_dimension() {
        let entity = EntityBuilder::new(EntityType::Destination, "Kyoto")
            .embedding(vec![0.1, 0.2, 0.3])
            .build();

        assert!(entity.is_searchable(3));
        assert!(!entity.is_searchable(4));
    }

    #[test]
    fn test_popularity_clamped() {
        let entity = EntityBuilder::new(EntityType::Destination, "Reykjavik")
            .popularity(1.7)
            .build();
        assert_eq!(entity.popularity, Some(1.0));
    }
}
