use crate::value_objects::{Category, CustomerId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A file discovered during the crawl stage, carried through the pipeline
/// until it's either processed or recorded as a skip/failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub id: String,
    pub customer_id: CustomerId,
    pub path: PathBuf,
    pub filename: String,
    pub extension: Option<String>,
    pub size_bytes: u64,
    pub category: Option<Category>,
    pub pre_assigned_category: Option<Category>,
}

impl FileDescriptor {
    pub fn new(customer_id: CustomerId, path: PathBuf, size_bytes: u64) -> Self {
        let filename = path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()));

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            customer_id,
            path,
            filename,
            extension,
            size_bytes,
            category: None,
            pre_assigned_category: None,
        }
    }

    /// Handler lookup is keyed on this alone (lowercased, dot-prefixed),
    /// never on magic bytes or path - this is what makes handler dispatch
    /// deterministic.
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased_and_dot_prefixed() {
        let fd = FileDescriptor::new(CustomerId::new("acme"), PathBuf::from("/x/Report.PDF"), 10);
        assert_eq!(fd.extension(), Some(".pdf"));
    }

    #[test]
    fn extensionless_files_have_no_extension() {
        let fd = FileDescriptor::new(CustomerId::new("acme"), PathBuf::from("/x/README"), 10);
        assert_eq!(fd.extension(), None);
    }
}
