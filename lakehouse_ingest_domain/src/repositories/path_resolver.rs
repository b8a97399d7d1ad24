use crate::error::IngestionError;
use crate::value_objects::{CustomerId, PathKind};
use async_trait::async_trait;
use std::path::PathBuf;

/// Resolves logical storage locations (raw uploads, processed output,
/// ephemeral scratch space, ...) to filesystem paths, honoring the
/// deployment mode's customer-subdirectory rule and refusing to resolve
/// any persistent kind under the OS temp directory.
#[async_trait]
pub trait PathResolver: Send + Sync {
    async fn resolve(&self, customer_id: &CustomerId, kind: PathKind) -> Result<PathBuf, IngestionError>;
}
