//! Domain events and the observer port used to surface them without the
//! domain depending on any particular sink (logging, metrics, a UI).

pub mod ingestion_observer;

pub use ingestion_observer::{IngestionObserver, NoOpObserver};
