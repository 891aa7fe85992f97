use crate::compressor::Compressor;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Maps content types to the compressor that handles them.
///
/// Populated once before a run starts and only read afterwards, so the
/// dispatcher shares it between workers without locking.
#[derive(Default, Clone)]
pub struct CompressorRegistry {
    compressors: HashMap<String, Arc<dyn Compressor>>,
}

impl CompressorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps every type `compressor` declares to it. A later registration for
    /// the same type replaces the earlier one.
    pub fn register(&mut self, compressor: impl Compressor + 'static) {
        self.register_shared(Arc::new(compressor));
    }

    pub fn register_shared(&mut self, compressor: Arc<dyn Compressor>) {
        for content_type in compressor.supported_types() {
            self.compressors
                .insert((*content_type).to_string(), Arc::clone(&compressor));
        }
    }

    /// Exact-match lookup. Callers normalize the type first if they want
    /// parameters such as `; charset=utf-8` ignored.
    pub fn lookup(&self, content_type: &str) -> Option<Arc<dyn Compressor>> {
        self.compressors.get(content_type).cloned()
    }

    pub fn contains(&self, content_type: &str) -> bool {
        self.compressors.contains_key(content_type)
    }

    /// Copy of the current mapping; later registrations do not show up in it.
    pub fn snapshot(&self) -> HashMap<String, Arc<dyn Compressor>> {
        self.compressors.clone()
    }

    pub fn len(&self) -> usize {
        self.compressors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compressors.is_empty()
    }
}

impl fmt::Debug for CompressorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<_> = self
            .compressors
            .iter()
            .map(|(content_type, compressor)| (content_type.as_str(), compressor.name()))
            .collect();
        entries.sort_unstable();
        f.debug_map().entries(entries).finish()
    }
}
