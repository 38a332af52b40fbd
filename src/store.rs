//! Document store seam.
//!
//! Persistence itself is out of scope; the export path only needs a
//! fetch-by-id returning the document shape or "not found".

use crate::error::Result;
use crate::model::Document;
use std::collections::HashMap;

/// Supplies documents by id.
pub trait DocumentStore {
    /// Fetch a document, or `None` when the id is unknown.
    fn fetch(&self, id: &str) -> Result<Option<Document>>;
}

/// In-memory store backed by a map, used by tests and embedding callers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: HashMap<String, Document>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document, keyed by its own id.
    pub fn insert(&mut self, doc: Document) {
        self.documents.insert(doc.id.clone(), doc);
    }
}

impl DocumentStore for MemoryStore {
    fn fetch(&self, id: &str) -> Result<Option<Document>> {
        Ok(self.documents.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_fetch() {
        let mut store = MemoryStore::new();
        store.insert(Document::new("f1", "Form One"));

        let found = store.fetch("f1").unwrap();
        assert_eq!(found.unwrap().name, "Form One");
        assert!(store.fetch("missing").unwrap().is_none());
    }
}
