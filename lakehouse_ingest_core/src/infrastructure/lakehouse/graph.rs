use async_trait::async_trait;
use lakehouse_ingest_domain::entities::{Entity, Relationship};
use lakehouse_ingest_domain::error::IngestionError;
use lakehouse_ingest_domain::repositories::GraphStore;
use lakehouse_ingest_domain::value_objects::CustomerId;
use parking_lot::RwLock;
use serde_json::Value as Json;
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Default)]
struct Graph {
    entities: HashMap<String, Entity>,
    mention_counts: HashMap<String, u32>,
    edges: HashMap<String, Vec<String>>,
}

/// In-process entity/relationship graph, one `Graph` per customer. Nodes
/// merge on `Entity::id` - inserting the same id again only bumps its
/// mention count, matching the identity contract `Entity::new` establishes
/// via `stable_id`.
pub struct InMemoryGraphStore {
    graphs: RwLock<HashMap<String, Graph>>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self {
            graphs: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn upsert_entities(&self, customer_id: &CustomerId, entities: Vec<Entity>) -> Result<usize, IngestionError> {
        let mut graphs = self.graphs.write();
        let graph = graphs.entry(customer_id.as_str().to_string()).or_default();
        let mut upserted = 0;
        for entity in entities {
            *graph.mention_counts.entry(entity.id.clone()).or_insert(0) += 1;
            graph.entities.insert(entity.id.clone(), entity);
            upserted += 1;
        }
        Ok(upserted)
    }

    async fn upsert_relationships(&self, customer_id: &CustomerId, relationships: Vec<Relationship>) -> Result<usize, IngestionError> {
        let mut graphs = self.graphs.write();
        let graph = graphs.entry(customer_id.as_str().to_string()).or_default();
        let mut upserted = 0;
        for relationship in relationships {
            let neighbors = graph.edges.entry(relationship.source_entity_id.clone()).or_default();
            if !neighbors.contains(&relationship.target_entity_id) {
                neighbors.push(relationship.target_entity_id.clone());
            }
            upserted += 1;
        }
        Ok(upserted)
    }

    async fn n_hop_neighbors(&self, customer_id: &CustomerId, start_entity_id: &str, max_hops: u32) -> Result<Vec<String>, IngestionError> {
        let graphs = self.graphs.read();
        let Some(graph) = graphs.get(customer_id.as_str()) else {
            return Ok(Vec::new());
        };

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(start_entity_id.to_string());
        let mut frontier: VecDeque<(String, u32)> = VecDeque::new();
        frontier.push_back((start_entity_id.to_string(), 0));
        let mut reached = Vec::new();

        while let Some((node, hop)) = frontier.pop_front() {
            if hop >= max_hops {
                continue;
            }
            if let Some(neighbors) = graph.edges.get(&node) {
                for neighbor in neighbors {
                    if visited.insert(neighbor.clone()) {
                        reached.push(neighbor.clone());
                        frontier.push_back((neighbor.clone(), hop + 1));
                    }
                }
            }
        }

        Ok(reached)
    }

    async fn top_entities(&self, customer_id: &CustomerId, n: usize) -> Result<Vec<Entity>, IngestionError> {
        let graphs = self.graphs.read();
        let Some(graph) = graphs.get(customer_id.as_str()) else {
            return Ok(Vec::new());
        };

        let mut ranked: Vec<(&String, &u32)> = graph.mention_counts.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(a.1));
        Ok(ranked
            .into_iter()
            .take(n)
            .filter_map(|(id, _)| graph.entities.get(id).cloned())
            .collect())
    }

    async fn execute_raw(&self, customer_id: &CustomerId, query: &str) -> Result<Json, IngestionError> {
        Err(IngestionError::unsupported(format!(
            "in-memory graph store has no query language to run {query:?} for customer {customer_id}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lakehouse_ingest_domain::value_objects::{EntityKind, RelationshipKind};

    fn entity(text: &str, doc: &str) -> Entity {
        Entity::new(text, EntityKind::Org, (0, text.len()), "...", 0.9, doc)
    }

    #[tokio::test]
    async fn repeated_mentions_merge_onto_one_node() {
        let store = InMemoryGraphStore::new();
        let customer = CustomerId::new("acme");
        store.upsert_entities(&customer, vec![entity("Acme Corp", "doc1")]).await.unwrap();
        store.upsert_entities(&customer, vec![entity("acme corp", "doc2")]).await.unwrap();

        let graphs = store.graphs.read();
        let graph = graphs.get("acme").unwrap();
        assert_eq!(graph.entities.len(), 1);
        assert_eq!(*graph.mention_counts.values().next().unwrap(), 2);
    }

    #[tokio::test]
    async fn n_hop_neighbors_respects_the_hop_limit() {
        let store = InMemoryGraphStore::new();
        let customer = CustomerId::new("acme");
        let a = entity("Acme", "doc1");
        let b = entity("Bolt", "doc1");
        let c = entity("Crate", "doc1");
        let (a_id, b_id, c_id) = (a.id.clone(), b.id.clone(), c.id.clone());
        store.upsert_entities(&customer, vec![a, b, c]).await.unwrap();
        store
            .upsert_relationships(
                &customer,
                vec![
                    Relationship::rule_derived(a_id.clone(), b_id.clone(), RelationshipKind::Mentions, "doc1"),
                    Relationship::rule_derived(b_id.clone(), c_id.clone(), RelationshipKind::Mentions, "doc1"),
                ],
            )
            .await
            .unwrap();

        let one_hop = store.n_hop_neighbors(&customer, &a_id, 1).await.unwrap();
        assert_eq!(one_hop, vec![b_id.clone()]);

        let two_hop = store.n_hop_neighbors(&customer, &a_id, 2).await.unwrap();
        assert_eq!(two_hop, vec![b_id, c_id]);
    }

    #[tokio::test]
    async fn top_entities_ranks_by_mention_count_descending() {
        let store = InMemoryGraphStore::new();
        let customer = CustomerId::new("acme");
        let popular = entity("Acme", "doc1");
        let rare = entity("Bolt", "doc1");
        let popular_id = popular.id.clone();
        store.upsert_entities(&customer, vec![popular.clone(), rare]).await.unwrap();
        store.upsert_entities(&customer, vec![popular]).await.unwrap();

        let top = store.top_entities(&customer, 1).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].id, popular_id);
    }

    #[tokio::test]
    async fn execute_raw_is_rejected_by_the_in_memory_backend() {
        let store = InMemoryGraphStore::new();
        let customer = CustomerId::new("acme");
        assert!(store.execute_raw(&customer, "MATCH (n) RETURN n").await.is_err());
    }
}
