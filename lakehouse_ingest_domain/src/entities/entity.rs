use crate::value_objects::EntityKind;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A named entity mentioned in a document. Identity is `hash(text, kind)`,
/// not a random id - the same entity mentioned in ten documents is one
/// graph node with `mention_count` 10, not ten nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub text: String,
    pub kind: EntityKind,
    pub span: (usize, usize),
    pub context: String,
    pub confidence: f32,
    pub source_document_id: String,
}

impl Entity {
    pub fn new(
        text: impl Into<String>,
        kind: EntityKind,
        span: (usize, usize),
        context: impl Into<String>,
        confidence: f32,
        source_document_id: impl Into<String>,
    ) -> Self {
        let text = text.into();
        Self {
            id: stable_id(&text, kind),
            text,
            kind,
            span,
            context: context.into(),
            confidence,
            source_document_id: source_document_id.into(),
        }
    }
}

/// `hash(text, type)` per the graph's merge-on-id contract: repeated
/// inserts of the same (text, type) pair must resolve to one node.
pub fn stable_id(text: &str, kind: EntityKind) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.to_lowercase().as_bytes());
    hasher.update([0u8]);
    hasher.update(kind.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_and_kind_yield_the_same_id() {
        let a = Entity::new("Acme Corp", EntityKind::Org, (0, 9), "...", 0.9, "doc1");
        let b = Entity::new("acme corp", EntityKind::Org, (20, 29), "...", 0.8, "doc2");
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn different_kind_yields_a_different_id() {
        let a = Entity::new("Acme", EntityKind::Org, (0, 4), "...", 0.9, "doc1");
        let b = Entity::new("Acme", EntityKind::Product, (0, 4), "...", 0.9, "doc1");
        assert_ne!(a.id, b.id);
    }
}
