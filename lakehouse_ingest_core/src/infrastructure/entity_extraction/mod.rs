// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Pattern-based named entity extraction.
//!
//! The original extractor is built on spaCy's statistical NER pipeline, which
//! has no equivalent in this crate's dependency stack - pulling in a
//! full NLP/ML dependency for entity recognition would be out of step with
//! every other adapter in this codebase, which is regex- and rule-driven
//! throughout (the classifier, the chunker). This adapter reimplements the
//! same entity categories with surface-form heuristics: organization-suffix
//! matching, capitalized-phrase detection for people, and regexes for dates
//! and money. It trades recall for zero new dependencies and determinism.
//! Relationship inference is unaffected - it's the same sentence
//! co-occurrence rule either way, via `derive_relationship`.

use async_trait::async_trait;
use lakehouse_ingest_domain::entities::{Entity, Relationship};
use lakehouse_ingest_domain::error::IngestionError;
use lakehouse_ingest_domain::services::EntityExtractorService;
use lakehouse_ingest_domain::value_objects::{derive_relationship, EntityKind};
use regex::Regex;
use std::sync::OnceLock;

const ORG_SUFFIXES: &[&str] = &[
    "GmbH", "AG", "KG", "OHG", "mbH", "Inc", "Inc.", "Corp", "Corp.", "Ltd", "Ltd.", "LLC", "Co", "Co.", "SE", "SA",
];

fn org_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let suffixes = ORG_SUFFIXES.iter().map(|s| regex::escape(s)).collect::<Vec<_>>().join("|");
        Regex::new(&format!(r"\b([A-Z][\w&.-]*(?:\s+[A-Z][\w&.-]*)*\s+(?:{suffixes}))")).expect("org pattern is valid")
    })
}

fn person_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b([A-Z][a-zÀ-ÿ]+(?:-[A-Z][a-zÀ-ÿ]+)?\s+[A-Z][a-zÀ-ÿ]+)\b").expect("person pattern is valid"))
}

fn date_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\b(\d{1,2}\.\d{1,2}\.\d{2,4}|\d{4}-\d{2}-\d{2}|(?:January|February|March|April|May|June|July|August|September|October|November|December|Januar|Februar|März|April|Mai|Juni|Juli|August|September|Oktober|November|Dezember)\s+\d{1,2},?\s*\d{4})\b",
        )
        .expect("date pattern is valid")
    })
}

fn money_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:€|\$|EUR|USD)\s?\d[\d.,]*|\b\d[\d.,]*\s?(?:€|\$|EUR|USD)\b").expect("money pattern is valid")
    })
}

fn sentence_splitter() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^.!?]+[.!?]*").expect("sentence splitter regex is valid"))
}

struct Candidate {
    text: String,
    kind: EntityKind,
    span: (usize, usize),
    confidence: f32,
}

fn find_candidates(text: &str) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for m in org_pattern().find_iter(text) {
        candidates.push(Candidate {
            text: m.as_str().to_string(),
            kind: EntityKind::Org,
            span: (m.start(), m.end()),
            confidence: 0.85,
        });
    }
    for m in date_pattern().find_iter(text) {
        candidates.push(Candidate {
            text: m.as_str().to_string(),
            kind: EntityKind::Date,
            span: (m.start(), m.end()),
            confidence: 0.9,
        });
    }
    for m in money_pattern().find_iter(text) {
        candidates.push(Candidate {
            text: m.as_str().to_string(),
            kind: EntityKind::Money,
            span: (m.start(), m.end()),
            confidence: 0.9,
        });
    }
    for m in person_pattern().find_iter(text) {
        if ORG_SUFFIXES.iter().any(|suffix| m.as_str().ends_with(suffix)) {
            continue;
        }
        candidates.push(Candidate {
            text: m.as_str().to_string(),
            kind: EntityKind::Person,
            span: (m.start(), m.end()),
            confidence: 0.6,
        });
    }

    candidates
}

/// Sorted by start offset then confidence descending, overlaps dropped -
/// matches the original extractor's `_deduplicate_entities` policy.
fn deduplicate(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| a.span.0.cmp(&b.span.0).then(b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal)));

    let mut kept: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        let overlaps = kept.iter().any(|k| candidate.span.0 < k.span.1 && k.span.0 < candidate.span.1);
        if !overlaps {
            kept.push(candidate);
        }
    }
    kept
}

/// Pattern/regex-based entity extractor. See the module doc comment for why
/// this isn't a statistical NER model.
pub struct PatternEntityExtractor;

impl PatternEntityExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PatternEntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityExtractorService for PatternEntityExtractor {
    async fn extract(&self, document_id: &str, text: &str) -> Result<(Vec<Entity>, Vec<Relationship>), IngestionError> {
        let mut entities = Vec::new();
        let mut relationships = Vec::new();

        for sentence_match in sentence_splitter().find_iter(text) {
            let sentence = sentence_match.as_str();
            let sentence_start = sentence_match.start();
            let candidates = deduplicate(find_candidates(sentence));

            let sentence_entities: Vec<Entity> = candidates
                .iter()
                .map(|c| {
                    Entity::new(
                        c.text.clone(),
                        c.kind,
                        (sentence_start + c.span.0, sentence_start + c.span.1),
                        sentence.trim(),
                        c.confidence,
                        document_id,
                    )
                })
                .collect();

            for i in 0..sentence_entities.len() {
                for j in (i + 1)..sentence_entities.len() {
                    let (forward, _backward) = derive_relationship(sentence_entities[i].kind, sentence_entities[j].kind);
                    relationships.push(Relationship::rule_derived(
                        sentence_entities[i].id.clone(),
                        sentence_entities[j].id.clone(),
                        forward,
                        document_id,
                    ));
                }
            }

            entities.extend(sentence_entities);
        }

        Ok((entities, relationships))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recognizes_an_organization_by_legal_suffix() {
        let extractor = PatternEntityExtractor::new();
        let (entities, _) = extractor.extract("doc1", "Acme Corp GmbH shipped the order.").await.unwrap();
        assert!(entities.iter().any(|e| e.kind == EntityKind::Org));
    }

    #[tokio::test]
    async fn recognizes_a_date() {
        let extractor = PatternEntityExtractor::new();
        let (entities, _) = extractor.extract("doc1", "The contract was signed on 2024-05-01.").await.unwrap();
        assert!(entities.iter().any(|e| e.kind == EntityKind::Date));
    }

    #[tokio::test]
    async fn recognizes_a_money_amount() {
        let extractor = PatternEntityExtractor::new();
        let (entities, _) = extractor.extract("doc1", "The invoice totals €1,250.00 this month.").await.unwrap();
        assert!(entities.iter().any(|e| e.kind == EntityKind::Money));
    }

    #[tokio::test]
    async fn org_and_date_in_the_same_sentence_derive_a_relationship() {
        let extractor = PatternEntityExtractor::new();
        let (_, relationships) = extractor
            .extract("doc1", "Bolt Systems AG released the update on 2024-05-01.")
            .await
            .unwrap();
        assert!(!relationships.is_empty());
    }

    #[test]
    fn overlapping_candidates_keep_the_higher_confidence_match() {
        let candidates = vec![
            Candidate {
                text: "Acme Corp GmbH".to_string(),
                kind: EntityKind::Org,
                span: (0, 14),
                confidence: 0.85,
            },
            Candidate {
                text: "Acme Corp".to_string(),
                kind: EntityKind::Person,
                span: (0, 9),
                confidence: 0.6,
            },
        ];
        let kept = deduplicate(candidates);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].kind, EntityKind::Org);
    }
}
