// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Maps `Products`-category text to the three standard tables via an LLM
//! schema-mapper port, then coerces the LLM's loosely-typed JSON into the
//! domain's strongly-typed row structs.

use async_trait::async_trait;
use chrono::Utc;
use lakehouse_ingest_domain::entities::tabular_record::{DataQualityAuditRow, ProductRow, SyndicationProductRow};
use lakehouse_ingest_domain::entities::TabularRecord;
use lakehouse_ingest_domain::error::IngestionError;
use lakehouse_ingest_domain::services::external_ports::StructuredExtractorLlmPort;
use lakehouse_ingest_domain::services::StructuredExtractorService;
use lakehouse_ingest_domain::value_objects::Category;
use rust_decimal::Decimal;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

const DEFAULT_CURRENCY: &str = "EUR";
const MAX_TEXT_BYTES: usize = 8 * 1024;

const SCHEMA_HINT: &str = r#"{
  "products": [{"sku or gtin": "string", "name": "string", "price": "number", "currency": "string (optional, default EUR)"}],
  "syndication_products": [{"sku or id": "string", "channel": "string", "published_at": "RFC3339 string (optional)"}],
  "data_quality": [{"document_id": "string (optional)", "issue": "string"}]
}"#;

fn truncate_to_bytes(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

fn string_field(obj: &serde_json::Map<String, Json>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| obj.get(*k)).and_then(|v| v.as_str()).map(str::to_string)
}

fn decimal_field(obj: &serde_json::Map<String, Json>, key: &str) -> Option<Decimal> {
    match obj.get(key)? {
        Json::Number(n) => n.as_f64().and_then(Decimal::from_f64_retain),
        Json::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn known_product_fields() -> &'static [&'static str] {
    &["sku", "gtin", "id", "name", "price", "currency"]
}

fn metadata_from(obj: &serde_json::Map<String, Json>, known: &[&str]) -> HashMap<String, Json> {
    obj.iter().filter(|(k, _)| !known.contains(&k.as_str())).map(|(k, v)| (k.clone(), v.clone())).collect()
}

fn product_row(obj: &serde_json::Map<String, Json>) -> Option<ProductRow> {
    let sku = string_field(obj, &["sku", "gtin", "id"])?;
    let name = string_field(obj, &["name"]).unwrap_or_default();
    Some(ProductRow {
        sku,
        customer_id: None,
        name,
        price: decimal_field(obj, "price"),
        currency: Some(string_field(obj, &["currency"]).unwrap_or_else(|| DEFAULT_CURRENCY.to_string())),
        metadata: metadata_from(obj, known_product_fields()),
    })
}

fn syndication_row(obj: &serde_json::Map<String, Json>) -> Option<SyndicationProductRow> {
    let sku = string_field(obj, &["sku", "id", "gtin"])?;
    let channel = string_field(obj, &["channel"]).unwrap_or_else(|| "default".to_string());
    let published_at = string_field(obj, &["published_at"]).and_then(|s| chrono::DateTime::parse_from_rfc3339(&s).ok()).map(|dt| dt.with_timezone(&Utc));
    Some(SyndicationProductRow {
        sku,
        customer_id: None,
        channel,
        published_at,
        metadata: metadata_from(obj, &["sku", "id", "gtin", "channel", "published_at"]),
    })
}

fn data_quality_row(obj: &serde_json::Map<String, Json>, document_id: &str) -> Option<DataQualityAuditRow> {
    let issue = string_field(obj, &["issue"])?;
    let row_document_id = string_field(obj, &["document_id"]).unwrap_or_else(|| document_id.to_string());
    Some(DataQualityAuditRow {
        document_id: row_document_id,
        customer_id: None,
        issue,
        detected_at: Utc::now(),
    })
}

/// Implements `StructuredExtractorService` against an LLM schema-mapper
/// port. Only `Products`-category documents are mapped - everything else
/// is a cheap no-op, per the fixed category scope (no config flag widens
/// it).
pub struct LlmStructuredExtractor {
    llm: Arc<dyn StructuredExtractorLlmPort>,
}

impl LlmStructuredExtractor {
    pub fn new(llm: Arc<dyn StructuredExtractorLlmPort>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl StructuredExtractorService for LlmStructuredExtractor {
    async fn extract(&self, category: Category, document_id: &str, text: &str) -> Result<Vec<TabularRecord>, IngestionError> {
        if category != Category::Products {
            return Ok(Vec::new());
        }

        let truncated = truncate_to_bytes(text, MAX_TEXT_BYTES);
        let mapped = self.llm.map_to_schema(SCHEMA_HINT, truncated).await?;

        let mut records = Vec::new();

        if let Some(products) = mapped.get("products").and_then(Json::as_array) {
            for entry in products {
                match entry.as_object().and_then(product_row) {
                    Some(row) => records.push(TabularRecord::Product(row)),
                    None => warn!(document_id, "dropping product row with no usable sku"),
                }
            }
        }
        if let Some(items) = mapped.get("syndication_products").and_then(Json::as_array) {
            for entry in items {
                match entry.as_object().and_then(syndication_row) {
                    Some(row) => records.push(TabularRecord::SyndicationProduct(row)),
                    None => warn!(document_id, "dropping syndication row with no usable sku"),
                }
            }
        }
        if let Some(items) = mapped.get("data_quality").and_then(Json::as_array) {
            for entry in items {
                if let Some(row) = entry.as_object().and_then(|o| data_quality_row(o, document_id)) {
                    records.push(TabularRecord::DataQualityAudit(row));
                }
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct StubLlm {
        response: Json,
    }

    #[async_trait]
    impl StructuredExtractorLlmPort for StubLlm {
        async fn map_to_schema(&self, _schema_hint: &str, _text: &str) -> Result<Json, IngestionError> {
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn non_products_category_is_a_no_op() {
        let extractor = LlmStructuredExtractor::new(Arc::new(StubLlm { response: json!({}) }));
        let records = extractor.extract(Category::Tax, "doc1", "irrelevant").await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn gtin_maps_to_sku_with_currency_defaulted_to_eur() {
        let extractor = LlmStructuredExtractor::new(Arc::new(StubLlm {
            response: json!({
                "products": [{"gtin": "4062321283001", "price": 43}],
                "syndication_products": [{"id": "4062321283001"}],
                "data_quality": [{"issue": "missing description"}]
            }),
        }));

        let records = extractor.extract(Category::Products, "doc1", "raw text").await.unwrap();
        assert_eq!(records.len(), 3);

        let TabularRecord::Product(product) = &records[0] else { panic!("expected product row") };
        assert_eq!(product.sku, "4062321283001");
        assert_eq!(product.currency.as_deref(), Some("EUR"));
        assert_eq!(product.price, Decimal::from_f64_retain(43.0));

        let TabularRecord::SyndicationProduct(syndication) = &records[1] else { panic!("expected syndication row") };
        assert_eq!(syndication.sku, "4062321283001");

        let TabularRecord::DataQualityAudit(audit) = &records[2] else { panic!("expected audit row") };
        assert_eq!(audit.document_id, "doc1");
    }

    #[tokio::test]
    async fn products_missing_every_identifier_are_dropped() {
        let extractor = LlmStructuredExtractor::new(Arc::new(StubLlm {
            response: json!({"products": [{"name": "Widget", "price": 10}]}),
        }));
        let records = extractor.extract(Category::Products, "doc1", "raw text").await.unwrap();
        assert!(records.is_empty());
    }
}
