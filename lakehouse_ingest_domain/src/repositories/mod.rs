//! Repository ports: the storage-facing seams the domain depends on as
//! traits, implemented by infrastructure adapters outside this crate.

pub mod graph_store;
pub mod handler_registry;
pub mod path_resolver;
pub mod tabular_store;
pub mod vector_store;

pub use graph_store::GraphStore;
pub use handler_registry::Handler;
pub use path_resolver::PathResolver;
pub use tabular_store::TabularStore;
pub use vector_store::VectorStore;
