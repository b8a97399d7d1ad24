use crate::value_objects::RelationshipKind;
use serde::{Deserialize, Serialize};

/// A directed relationship edge between two entities, derived by the
/// Entity Extractor's sentence-co-occurrence rules. Rule-derived
/// relationships always carry the fixed confidence `0.8`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub source_entity_id: String,
    pub target_entity_id: String,
    pub kind: RelationshipKind,
    pub confidence: f32,
    pub source_document_id: String,
}

impl Relationship {
    pub const RULE_DERIVED_CONFIDENCE: f32 = 0.8;

    pub fn rule_derived(
        source_entity_id: impl Into<String>,
        target_entity_id: impl Into<String>,
        kind: RelationshipKind,
        source_document_id: impl Into<String>,
    ) -> Self {
        Self {
            source_entity_id: source_entity_id.into(),
            target_entity_id: target_entity_id.into(),
            kind,
            confidence: Self::RULE_DERIVED_CONFIDENCE,
            source_document_id: source_document_id.into(),
        }
    }
}
