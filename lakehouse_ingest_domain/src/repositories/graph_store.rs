use crate::entities::{Entity, Relationship};
use crate::error::IngestionError;
use crate::value_objects::CustomerId;
use async_trait::async_trait;
use serde_json::Value as Json;

/// Entity/relationship graph storage. Nodes merge on `Entity::id` so
/// repeated mentions across documents accumulate onto one node rather than
/// duplicating it.
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn upsert_entities(&self, customer_id: &CustomerId, entities: Vec<Entity>) -> Result<usize, IngestionError>;

    async fn upsert_relationships(
        &self,
        customer_id: &CustomerId,
        relationships: Vec<Relationship>,
    ) -> Result<usize, IngestionError>;

    /// Traverses outward from `start_entity_id` up to `max_hops` edges,
    /// returning the entity ids reached at each hop.
    async fn n_hop_neighbors(
        &self,
        customer_id: &CustomerId,
        start_entity_id: &str,
        max_hops: u32,
    ) -> Result<Vec<String>, IngestionError>;

    /// The `n` entities with the highest mention count for a customer,
    /// highest first.
    async fn top_entities(&self, customer_id: &CustomerId, n: usize) -> Result<Vec<Entity>, IngestionError>;

    /// Escape hatch for opaque, backend-specific queries that don't fit
    /// the typed ops above (used by the Structured Extractor and external
    /// callers). Backends without a query language of their own may
    /// reject this outright.
    async fn execute_raw(&self, customer_id: &CustomerId, query: &str) -> Result<Json, IngestionError>;
}
