// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Filesystem path resolution for customer data.
//!
//! Centralizes the one rule that matters: persistent data never lands under
//! the OS temp directory. Managed deployments get one base path per kind
//! with no per-customer nesting (the container boundary already isolates
//! tenants); self-hosted and development deployments nest under
//! `customer_id`.

use async_trait::async_trait;
use lakehouse_ingest_domain::error::IngestionError;
use lakehouse_ingest_domain::repositories::PathResolver;
use lakehouse_ingest_domain::value_objects::{CustomerId, DeploymentMode, PathKind};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Base directory roots for each deployment mode, mirroring the original
/// `CustomerPaths.BASE_PATHS` table.
#[derive(Debug, Clone)]
pub struct PathRoots {
    pub tabular: PathBuf,
    pub vector: PathBuf,
    pub graph: PathBuf,
    pub lora: PathBuf,
    pub uploads: PathBuf,
    pub handlers: PathBuf,
    pub scratch: PathBuf,
}

impl PathRoots {
    pub fn for_mode(mode: DeploymentMode) -> Self {
        match mode {
            DeploymentMode::Managed => Self {
                tabular: PathBuf::from("/data/lakehouse/tabular"),
                vector: PathBuf::from("/data/lakehouse/vector"),
                graph: PathBuf::from("/data/lakehouse/graph"),
                lora: PathBuf::from("/data/loras"),
                uploads: PathBuf::from("/data/uploads"),
                handlers: PathBuf::from("/data/lakehouse/handlers"),
                scratch: std::env::temp_dir(),
            },
            DeploymentMode::SelfHosted => {
                let base = |env: &str, default: &str| {
                    PathBuf::from(std::env::var(env).unwrap_or_else(|_| default.to_string()))
                };
                Self {
                    tabular: base("LAKEHOUSE_BASE", "/var/lib/0711/lakehouse").join("tabular"),
                    vector: base("LAKEHOUSE_BASE", "/var/lib/0711/lakehouse").join("vector"),
                    graph: base("LAKEHOUSE_BASE", "/var/lib/0711/lakehouse").join("graph"),
                    lora: base("LORA_BASE", "/var/lib/0711/loras"),
                    uploads: base("UPLOAD_BASE", "/var/lib/0711/uploads"),
                    handlers: base("LAKEHOUSE_BASE", "/var/lib/0711/lakehouse").join("handlers"),
                    scratch: std::env::temp_dir(),
                }
            }
            DeploymentMode::Development => {
                let base = |env: &str, default: &str| {
                    PathBuf::from(std::env::var(env).unwrap_or_else(|_| default.to_string()))
                };
                Self {
                    tabular: base("LAKEHOUSE_BASE", "./data/lakehouse").join("tabular"),
                    vector: base("LAKEHOUSE_BASE", "./data/lakehouse").join("vector"),
                    graph: base("LAKEHOUSE_BASE", "./data/lakehouse").join("graph"),
                    lora: base("LORA_BASE", "./data/loras"),
                    uploads: base("UPLOAD_BASE", "./data/uploads"),
                    handlers: base("LAKEHOUSE_BASE", "./data/lakehouse").join("handlers"),
                    scratch: std::env::temp_dir(),
                }
            }
        }
    }

    fn base_for(&self, kind: PathKind) -> &Path {
        match kind {
            PathKind::TabularRoot => &self.tabular,
            PathKind::VectorRoot => &self.vector,
            PathKind::GraphRoot => &self.graph,
            PathKind::LoraRoot => &self.lora,
            PathKind::UploadStaging => &self.uploads,
            PathKind::HandlerStore => &self.handlers,
            PathKind::EphemeralScratch => &self.scratch,
        }
    }
}

/// Resolves logical path kinds to filesystem paths, creating the resolved
/// directory on demand.
pub struct FsPathResolver {
    mode: DeploymentMode,
    roots: PathRoots,
}

impl FsPathResolver {
    pub fn new(mode: DeploymentMode) -> Self {
        Self {
            mode,
            roots: PathRoots::for_mode(mode),
        }
    }

    pub fn from_env() -> Self {
        Self::new(DeploymentMode::from_env())
    }

    /// Refuses to resolve any persistent kind under the OS temp directory -
    /// the one invariant this whole module exists to enforce.
    fn assert_safe(&self, kind: PathKind, path: &Path) -> Result<(), IngestionError> {
        if kind.is_ephemeral() {
            return Ok(());
        }
        let temp_dir = std::env::temp_dir();
        if path.starts_with(&temp_dir) {
            return Err(IngestionError::fatal_invariant(format!(
                "refusing to resolve persistent path kind {kind} under temp directory: {}",
                path.display()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl PathResolver for FsPathResolver {
    async fn resolve(&self, customer_id: &CustomerId, kind: PathKind) -> Result<PathBuf, IngestionError> {
        let base = self.roots.base_for(kind);
        let resolved = if self.mode.uses_customer_subdir() {
            base.join(customer_id.as_str())
        } else {
            base.to_path_buf()
        };

        self.assert_safe(kind, &resolved)?;

        tokio::fs::create_dir_all(&resolved).await?;
        debug!(path = %resolved.display(), kind = %kind, "resolved customer path");
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn managed_mode_shares_one_base_with_no_customer_subdir() {
        let resolver = FsPathResolver::new(DeploymentMode::Managed);
        let a = resolver
            .resolve(&CustomerId::new("acme"), PathKind::HandlerStore)
            .await
            .unwrap();
        let b = resolver
            .resolve(&CustomerId::new("widgets"), PathKind::HandlerStore)
            .await
            .unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn development_mode_nests_per_customer() {
        let resolver = FsPathResolver::new(DeploymentMode::Development);
        let a = resolver
            .resolve(&CustomerId::new("acme"), PathKind::UploadStaging)
            .await
            .unwrap();
        assert!(a.ends_with("acme"));
    }

    #[tokio::test]
    async fn ephemeral_scratch_is_allowed_under_temp_dir() {
        let resolver = FsPathResolver::new(DeploymentMode::Development);
        let path = resolver
            .resolve(&CustomerId::new("acme"), PathKind::EphemeralScratch)
            .await
            .unwrap();
        assert!(path.starts_with(std::env::temp_dir()));
    }
}
