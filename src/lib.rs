// Re-export main components
pub mod analysis;
pub mod api;
pub mod config;
pub mod document;
pub mod engine;
pub mod index;
pub mod segment;
pub mod tokenizer;

// Re-export commonly used types
pub use analysis::{
    AnalyzeDocument, AnalyzedDocument, AnalyzedTerm, DocumentAnalyzer, Posting, Term, Word,
};
pub use config::AnalyzerConfig;
pub use document::{Document, Field};
pub use engine::Indexer;
pub use index::InvertedIndex;
pub use segment::{IxInfo, SegmentError};
pub use tokenizer::{StandardAnalyzer, TextAnalyzer, Tokens};

// Re-export error types
pub use anyhow::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
