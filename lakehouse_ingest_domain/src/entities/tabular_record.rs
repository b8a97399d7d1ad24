use crate::value_objects::{Category, CustomerId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::HashMap;

/// A row destined for the tabular store. `documents`/`chunks` rows are
/// per-category tables (e.g. `products_documents`); `products`,
/// `syndication_products`, and `data_quality_audit` are the three standard
/// tables the Structured Extractor writes to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TabularRecord {
    Document(DocumentRow),
    Chunk(ChunkRow),
    Product(ProductRow),
    SyndicationProduct(SyndicationProductRow),
    DataQualityAudit(DataQualityAuditRow),
}

impl TabularRecord {
    pub fn table_name(&self, category: Category) -> String {
        match self {
            TabularRecord::Document(_) => format!("{category}_documents"),
            TabularRecord::Chunk(_) => format!("{category}_chunks"),
            TabularRecord::Product(_) => "products".to_string(),
            TabularRecord::SyndicationProduct(_) => "syndication_products".to_string(),
            TabularRecord::DataQualityAudit(_) => "data_quality_audit".to_string(),
        }
    }

    /// Missing primary keys are dropped at the write boundary rather than
    /// erroring the run - §4.7 treats this as a per-row data-quality
    /// concern, not a processing failure.
    pub fn has_primary_key(&self) -> bool {
        match self {
            TabularRecord::Document(r) => !r.document_id.is_empty(),
            TabularRecord::Chunk(r) => !r.chunk_id.is_empty(),
            TabularRecord::Product(r) => !r.sku.is_empty(),
            TabularRecord::SyndicationProduct(r) => !r.sku.is_empty(),
            TabularRecord::DataQualityAudit(r) => !r.document_id.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRow {
    pub document_id: String,
    pub customer_id: Option<CustomerId>,
    pub filename: String,
    pub category: Category,
    pub ingested_at: DateTime<Utc>,
    pub metadata: Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRow {
    pub chunk_id: String,
    pub document_id: String,
    pub customer_id: Option<CustomerId>,
    pub category: Category,
    pub ordinal: usize,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRow {
    pub sku: String,
    pub customer_id: Option<CustomerId>,
    pub name: String,
    pub price: Option<Decimal>,
    pub currency: Option<String>,
    pub metadata: HashMap<String, Json>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyndicationProductRow {
    pub sku: String,
    pub customer_id: Option<CustomerId>,
    pub channel: String,
    pub published_at: Option<DateTime<Utc>>,
    pub metadata: HashMap<String, Json>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataQualityAuditRow {
    pub document_id: String,
    pub customer_id: Option<CustomerId>,
    pub issue: String,
    pub detected_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_without_sku_has_no_primary_key() {
        let row = TabularRecord::Product(ProductRow {
            sku: String::new(),
            customer_id: None,
            name: "widget".into(),
            price: None,
            currency: None,
            metadata: HashMap::new(),
        });
        assert!(!row.has_primary_key());
    }

    #[test]
    fn table_name_is_category_prefixed_for_documents() {
        let row = TabularRecord::Document(DocumentRow {
            document_id: "d1".into(),
            customer_id: None,
            filename: "f.pdf".into(),
            category: Category::Tax,
            ingested_at: Utc::now(),
            metadata: Json::Null,
        });
        assert_eq!(row.table_name(Category::Tax), "tax_documents");
    }

    #[test]
    fn table_name_is_category_prefixed_for_chunks() {
        let row = TabularRecord::Chunk(ChunkRow {
            chunk_id: "c1".into(),
            document_id: "d1".into(),
            customer_id: None,
            category: Category::Products,
            ordinal: 0,
            text: "text".into(),
        });
        assert_eq!(row.table_name(Category::Products), "products_chunks");
    }
}
