use crate::entities::TabularRecord;
use crate::error::IngestionError;
use crate::value_objects::Category;
use async_trait::async_trait;

/// Maps a `Products`-category document's extracted text to the standard
/// `products`/`syndication_products` tabular schema. Other categories pass
/// through without structured extraction.
#[async_trait]
pub trait StructuredExtractorService: Send + Sync {
    async fn extract(&self, category: Category, document_id: &str, text: &str) -> Result<Vec<TabularRecord>, IngestionError>;
}
