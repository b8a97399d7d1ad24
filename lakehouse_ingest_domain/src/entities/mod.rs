//! Entities: identity-bearing domain objects whose fields may change over
//! their lifetime but whose identity does not.

pub mod chunk;
pub mod deployment_context;
pub mod embedding_record;
pub mod entity;
pub mod file_descriptor;
pub mod relationship;
pub mod tabular_record;

pub use chunk::Chunk;
pub use deployment_context::DeploymentContext;
pub use embedding_record::EmbeddingRecord;
pub use entity::Entity;
pub use file_descriptor::FileDescriptor;
pub use relationship::Relationship;
pub use tabular_record::TabularRecord;
