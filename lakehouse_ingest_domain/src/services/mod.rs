//! Service ports: the domain's application-facing seams, implemented by
//! infrastructure adapters (rule engines, LLM clients, object storage).

pub mod adaptive_handler_generator;
pub mod chunker;
pub mod classifier;
pub mod entity_extractor;
pub mod external_ports;
pub mod structured_extractor;

pub use adaptive_handler_generator::{AdaptiveHandlerGenerator, GeneratedHandler, GeneratedHandlerRuntime};
pub use chunker::ChunkerService;
pub use classifier::{ClassificationResult, ClassifierService};
pub use entity_extractor::EntityExtractorService;
pub use external_ports::{
    AdaptiveHandlerLlmPort, ClassifierLlmPort, EmbedderPort, MetadataExtractorLlmPort, ObjectStorePort,
    StructuredExtractorLlmPort,
};
pub use structured_extractor::StructuredExtractorService;
