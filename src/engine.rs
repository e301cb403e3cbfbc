use crate::analysis::{AnalyzeDocument, AnalyzedDocument, DocumentAnalyzer, Posting, Term};
use crate::document::Document;
use crate::index::{IndexStats, InvertedIndex};
use crate::segment::{
    self, ChronologicalIdGenerator, IdGenerator, IxInfo, MonotonicIdGenerator, SystemClock,
};
use crate::tokenizer::{StandardAnalyzer, TextAnalyzer};
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

/// Analyzes documents, keeps their postings in memory and writes a segment
/// descriptor on every commit.
pub struct Indexer {
    analyzer: DocumentAnalyzer<StandardAnalyzer>,
    index: RwLock<InvertedIndex>,
    uncommitted: Mutex<usize>,
    segment_dir: PathBuf,
    ids: Box<dyn IdGenerator>,
}

impl Indexer {
    /// Create an indexer writing segments into `segment_dir`
    pub fn open<P: AsRef<Path>>(segment_dir: P, analyzer: StandardAnalyzer) -> Result<Self> {
        let segment_dir = segment_dir.as_ref().to_path_buf();
        fs::create_dir_all(&segment_dir).with_context(|| {
            format!("Failed to create segment directory {}", segment_dir.display())
        })?;

        Ok(Self {
            analyzer: DocumentAnalyzer::new(analyzer),
            index: RwLock::new(InvertedIndex::new()),
            uncommitted: Mutex::new(0),
            segment_dir,
            ids: Box::new(MonotonicIdGenerator::new(ChronologicalIdGenerator::new(SystemClock))),
        })
    }

    /// Replace the segment id source
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn segment_dir(&self) -> &Path {
        &self.segment_dir
    }

    /// Tokenize free text with the configured analyzer
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.analyzer.text_analyzer().analyze(text).collect()
    }

    /// Analyze a document without indexing it
    pub fn analyze(&self, document: &Document) -> AnalyzedDocument {
        self.analyzer.analyze_document(document)
    }

    /// Analyze a document and insert or replace it in the index
    pub fn index_document(&self, document: &Document) -> Result<AnalyzedDocument> {
        let analyzed = self.analyze(document);

        self.index
            .write()
            .map_err(|_| anyhow!("index lock poisoned"))?
            .update_document(&analyzed);
        *self
            .uncommitted
            .lock()
            .map_err(|_| anyhow!("commit counter lock poisoned"))? += 1;

        Ok(analyzed)
    }

    /// Batch insert documents
    pub fn index_batch(&self, documents: &[Document]) -> Result<usize> {
        for document in documents {
            self.index_document(document)?;
        }
        tracing::debug!(documents = documents.len(), "indexed batch");
        Ok(documents.len())
    }

    /// Write a descriptor for everything indexed since the last commit.
    ///
    /// Returns `None` when nothing was indexed in between.
    pub fn commit(&self) -> Result<Option<PathBuf>> {
        let mut uncommitted = self
            .uncommitted
            .lock()
            .map_err(|_| anyhow!("commit counter lock poisoned"))?;
        if *uncommitted == 0 {
            return Ok(None);
        }

        let info = IxInfo::new(self.ids.next_id(), *uncommitted);
        let path = info
            .save(&self.segment_dir)
            .with_context(|| format!("Failed to write segment {}", info.segment_id))?;
        *uncommitted = 0;

        tracing::info!(
            segment = info.segment_id,
            documents = info.document_count,
            "committed segment"
        );
        Ok(Some(path))
    }

    /// Segment descriptors in this indexer's directory, oldest first
    pub fn segments(&self) -> Result<Vec<PathBuf>> {
        Ok(segment::index_file_names_in_chronological_order(&self.segment_dir)?)
    }

    /// Documents recorded across committed segments; see
    /// [`segment::document_count`] for how rewrites are counted
    pub fn segment_document_count(&self) -> Result<usize> {
        Ok(segment::document_count(&self.segment_dir)?)
    }

    pub fn postings(&self, term: &Term) -> Result<Vec<Posting>> {
        let index = self.index.read().map_err(|_| anyhow!("index lock poisoned"))?;
        Ok(index.postings(term).map(<[Posting]>::to_vec).unwrap_or_default())
    }

    /// Get index statistics
    pub fn stats(&self) -> Result<IndexStats> {
        let index = self.index.read().map_err(|_| anyhow!("index lock poisoned"))?;
        Ok(index.stats())
    }
}
