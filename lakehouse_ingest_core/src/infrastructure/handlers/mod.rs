// /////////////////////////////////////////////////////////////////////////////
// Lakehouse Ingest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Handler Registry: dispatches a `FileDescriptor` to the `Handler` whose
//! claimed extensions include the file's extension. Mirrors the pipeline
//! stage executor's service-lookup idiom - a name-keyed map of trait
//! objects behind a lock, built once at startup and read many times
//! thereafter.

mod built_in;

pub use built_in::{
    CadHandler, CatalogXmlHandler, CsvTsvHandler, EmailHandler, HtmlHandler, ImageHandler, JsonHandler,
    OfficeDocumentHandler, PdfHandler, PlainTextHandler, SpreadsheetHandler, XmlHandler,
};

use lakehouse_ingest_domain::error::IngestionError;
use lakehouse_ingest_domain::repositories::Handler;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Looks up the registered `Handler` for a file extension. Unknown
/// extensions are a handler-registry miss, not a parse error - the caller
/// decides whether to fall back to the Adaptive Handler Generator or treat
/// the file as unsupported.
pub struct HandlerRegistry {
    by_extension: Arc<RwLock<HashMap<&'static str, Arc<dyn Handler>>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            by_extension: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Builds a registry pre-populated with the built-in handlers for the
    /// common office/document/data formats.
    pub fn with_built_ins() -> Self {
        let registry = Self::new();
        registry.register(Arc::new(PdfHandler));
        registry.register(Arc::new(OfficeDocumentHandler));
        registry.register(Arc::new(SpreadsheetHandler));
        registry.register(Arc::new(CsvTsvHandler));
        registry.register(Arc::new(XmlHandler));
        registry.register(Arc::new(CatalogXmlHandler));
        registry.register(Arc::new(HtmlHandler));
        registry.register(Arc::new(JsonHandler));
        registry.register(Arc::new(EmailHandler));
        registry.register(Arc::new(ImageHandler));
        registry.register(Arc::new(CadHandler));
        registry.register(Arc::new(PlainTextHandler));
        registry
    }

    pub fn register(&self, handler: Arc<dyn Handler>) {
        let mut map = self.by_extension.write();
        for ext in handler.extensions() {
            map.insert(*ext, handler.clone());
        }
    }

    pub fn lookup(&self, extension: &str) -> Option<Arc<dyn Handler>> {
        self.by_extension.read().get(extension).cloned()
    }

    /// Like `lookup`, but also matches handlers registered under a
    /// compound filename suffix (e.g. `CatalogXmlHandler`'s `catalog.xml`)
    /// rather than a plain dot-prefixed extension. Filename-suffix keys are
    /// the ones that don't start with `.`; there are few enough registered
    /// handlers that a linear scan over them is cheaper than a second map.
    pub fn lookup_for_file(&self, filename: &str, extension: Option<&str>) -> Option<Arc<dyn Handler>> {
        let lower = filename.to_lowercase();
        {
            let map = self.by_extension.read();
            for (key, handler) in map.iter() {
                if !key.starts_with('.') && lower.ends_with(key) {
                    return Some(handler.clone());
                }
            }
        }
        extension.and_then(|ext| self.lookup(ext))
    }

    pub fn registered_extensions(&self) -> Vec<&'static str> {
        self.by_extension.read().keys().copied().collect()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::with_built_ins()
    }
}

/// Raised when no registered handler, built-in or adaptively generated,
/// claims a file's extension.
pub fn no_handler_for(extension: Option<&str>) -> IngestionError {
    IngestionError::unsupported(format!(
        "no handler registered for extension {:?}",
        extension.unwrap_or("<none>")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_ins_cover_the_expected_extensions() {
        let registry = HandlerRegistry::with_built_ins();
        assert!(registry.lookup(".pdf").is_some());
        assert!(registry.lookup(".csv").is_some());
        assert!(registry.lookup(".bogus").is_none());
    }

    #[test]
    fn registering_the_same_handler_twice_is_idempotent_by_extension() {
        let registry = HandlerRegistry::new();
        registry.register(Arc::new(PdfHandler));
        registry.register(Arc::new(PdfHandler));
        assert_eq!(registry.registered_extensions().len(), 1);
    }

    #[test]
    fn catalog_xml_files_route_to_the_catalog_handler_not_the_generic_xml_handler() {
        let registry = HandlerRegistry::with_built_ins();
        let via_filename = registry.lookup_for_file("product-catalog.xml", Some(".xml"));
        assert!(via_filename.is_some());
        assert_eq!(via_filename.unwrap().extensions(), CatalogXmlHandler.extensions());
    }

    #[test]
    fn a_plain_xml_file_still_routes_to_the_generic_handler() {
        let registry = HandlerRegistry::with_built_ins();
        let handler = registry.lookup_for_file("invoice.xml", Some(".xml")).unwrap();
        assert_eq!(handler.extensions(), XmlHandler.extensions());
    }
}
