// src/extractors/mod.rs
pub mod section;
pub mod tokenizer;

// Re-export key extraction types for convenience
pub use section::{PageTextSource, PageTrace, SectionExtractor};
pub use tokenizer::tokenize;
