use serde::{Deserialize, Serialize};

/// A contiguous span of a document's normalized text, sized by the
/// Chunker's strategy for the document's extension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub document_id: String,
    pub ordinal: usize,
    pub text: String,
    pub char_count: usize,
}

impl Chunk {
    pub fn new(document_id: impl Into<String>, ordinal: usize, text: String) -> Self {
        let document_id = document_id.into();
        let char_count = text.chars().count();
        Self {
            id: format!("{document_id}_{ordinal}"),
            document_id,
            ordinal,
            text,
            char_count,
        }
    }
}
