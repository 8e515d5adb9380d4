//! Models offered for download.
//!
//! A curated subset of the Ollama library with approximate download sizes,
//! for pickers that cannot query the registry.

/// One downloadable model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Human-readable label including parameter count and size.
    pub label: &'static str,
    /// Tag passed to [`Ollama::pull`](crate::Ollama::pull).
    pub tag: &'static str,
}

const fn entry(label: &'static str, tag: &'static str) -> CatalogEntry {
    CatalogEntry { label, tag }
}

/// Models listed by the download picker.
pub const PULLABLE_MODELS: &[CatalogEntry] = &[
    entry("Llama 3.2 3B 2.0GB", "llama3.2"),
    entry("Llama 3.2 1B 1.3GB", "llama3.2:1b"),
    entry("Llama 3.1 8B 4.7GB", "llama3.1"),
    entry("Llama 3.1 70B 40GB", "llama3.1:70b"),
    entry("Llama 3.1 405B 231GB", "llama3.1:405b"),
    entry("Phi 3 Mini 3.8B 2.3GB", "phi3"),
    entry("Phi 3 Medium 14B 7.9GB", "phi3:medium"),
    entry("Gemma 2 2B 1.6GB", "gemma2:2b"),
    entry("Gemma 2 9B 5.5GB", "gemma2"),
    entry("Gemma 2 27B 16GB", "gemma2:27b"),
    entry("Mistral 7B 4.1GB", "mistral"),
    entry("Moondream 2 1.4B 829MB", "moondream"),
    entry("Neural Chat 7B 4.1GB", "neural-chat"),
    entry("Starling 7B 4.1GB", "starling-lm"),
    entry("Code Llama 7B 3.8GB", "codellama"),
    entry("Llama 2 Uncensored 7B 3.8GB", "llama2-uncensored"),
    entry("LLaVA 7B 4.5GB", "llava"),
    entry("Solar 10.7B 6.1GB", "solar"),
];

/// Look up a catalog entry by tag.
#[must_use]
pub fn find(tag: &str) -> Option<&'static CatalogEntry> {
    PULLABLE_MODELS.iter().find(|e| e.tag == tag)
}
