// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Folder crawl: depth-bounded, dot-entries and oversize files skipped,
//! unknown extensions collected for the extract stage's adaptive path.

use crate::infrastructure::handlers::HandlerRegistry;
use lakehouse_ingest_domain::entities::FileDescriptor;
use lakehouse_ingest_domain::error::IngestionError;
use lakehouse_ingest_domain::value_objects::CustomerId;
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct CrawlResult {
    pub files: Vec<FileDescriptor>,
    pub unknown_extensions: Vec<String>,
    pub skipped_oversize: usize,
}

/// Walks each folder breadth-first up to `max_depth` levels below it.
/// Dot-prefixed entries (files or directories) are skipped entirely;
/// files over `max_file_bytes` are counted and skipped, not descriptored.
pub async fn crawl_folders(
    folders: &[PathBuf],
    customer_id: &CustomerId,
    registry: &HandlerRegistry,
    max_depth: u32,
    max_file_bytes: u64,
) -> Result<CrawlResult, IngestionError> {
    let mut result = CrawlResult::default();
    let mut unknown = HashSet::new();
    let mut stack: Vec<(PathBuf, u32)> = Vec::new();

    for folder in folders {
        if !tokio::fs::try_exists(folder).await.unwrap_or(false) {
            return Err(IngestionError::user_input(format!(
                "folder does not exist: {}",
                folder.display()
            )));
        }
        stack.push((folder.clone(), 0));
    }

    while let Some((dir, depth)) = stack.pop() {
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            if name.to_string_lossy().starts_with('.') {
                continue;
            }
            let path = entry.path();
            let file_type = entry.file_type().await?;

            if file_type.is_dir() {
                if depth < max_depth {
                    stack.push((path, depth + 1));
                }
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            let size = entry.metadata().await?.len();
            if size > max_file_bytes {
                result.skipped_oversize += 1;
                continue;
            }

            let descriptor = FileDescriptor::new(customer_id.clone(), path, size);
            if let Some(ext) = descriptor.extension() {
                if registry.lookup(ext).is_none() {
                    unknown.insert(ext.to_string());
                }
            } else {
                unknown.insert("<none>".to_string());
            }
            result.files.push(descriptor);
        }
    }

    result.unknown_extensions = unknown.into_iter().collect();
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::handlers::HandlerRegistry;
    use tempfile::tempdir;

    #[tokio::test]
    async fn dot_entries_and_oversize_files_are_skipped() {
        let dir = tempdir().unwrap();
        tokio::fs::write(dir.path().join("visible.csv"), b"a,b\n1,2\n").await.unwrap();
        tokio::fs::write(dir.path().join(".hidden.csv"), b"secret").await.unwrap();
        tokio::fs::write(dir.path().join("huge.csv"), vec![0u8; 1024]).await.unwrap();

        let registry = HandlerRegistry::with_built_ins();
        let result = crawl_folders(&[dir.path().to_path_buf()], &CustomerId::new("acme"), &registry, 20, 100).await.unwrap();

        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].filename, "visible.csv");
        assert_eq!(result.skipped_oversize, 1);
    }

    #[tokio::test]
    async fn depth_limit_stops_recursion() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        tokio::fs::create_dir_all(&nested).await.unwrap();
        tokio::fs::write(nested.join("deep.csv"), b"x").await.unwrap();
        tokio::fs::write(dir.path().join("shallow.csv"), b"x").await.unwrap();

        let registry = HandlerRegistry::with_built_ins();
        let result = crawl_folders(&[dir.path().to_path_buf()], &CustomerId::new("acme"), &registry, 1, 1024).await.unwrap();

        let names: Vec<_> = result.files.iter().map(|f| f.filename.clone()).collect();
        assert!(names.contains(&"shallow.csv".to_string()));
        assert!(!names.contains(&"deep.csv".to_string()));
    }

    #[tokio::test]
    async fn unknown_extensions_are_recorded_without_blocking_the_crawl() {
        let dir = tempdir().unwrap();
        tokio::fs::write(dir.path().join("weird.xyz"), b"data").await.unwrap();

        let registry = HandlerRegistry::with_built_ins();
        let result = crawl_folders(&[dir.path().to_path_buf()], &CustomerId::new("acme"), &registry, 20, 1024).await.unwrap();

        assert_eq!(result.files.len(), 1);
        assert_eq!(result.unknown_extensions, vec![".xyz".to_string()]);
    }

    #[tokio::test]
    async fn missing_folder_is_a_user_input_error() {
        let registry = HandlerRegistry::with_built_ins();
        let err = crawl_folders(&[PathBuf::from("/does/not/exist")], &CustomerId::new("acme"), &registry, 20, 1024)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestionError::UserInput(_)));
    }
}
