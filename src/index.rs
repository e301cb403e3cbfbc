use crate::analysis::{AnalyzedDocument, Posting, Term};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Inverted index: term -> postings of every document containing it
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    postings: HashMap<Term, Vec<Posting>>,
    documents: HashSet<String>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge an analyzed document's postings into the index
    pub fn add_document(&mut self, document: &AnalyzedDocument) {
        for analyzed in &document.terms {
            let list = self.postings.entry(analyzed.term.clone()).or_default();

            // Analysis yields one posting per term; keep the first if a
            // caller feeds the same document twice without removing it.
            if !list.iter().any(|p| p.document_id == document.document_id) {
                list.push(analyzed.posting.clone());
            }
        }

        self.documents.insert(document.document_id.clone());
    }

    /// Remove a document from the index
    pub fn remove_document(&mut self, document_id: &str) {
        for list in self.postings.values_mut() {
            list.retain(|p| p.document_id != document_id);
        }
        self.documents.remove(document_id);

        // Clean up empty entries
        self.postings.retain(|_, list| !list.is_empty());
    }

    /// Update a document (remove old, add new)
    pub fn update_document(&mut self, document: &AnalyzedDocument) {
        self.remove_document(&document.document_id);
        self.add_document(document);
    }

    pub fn postings(&self, term: &Term) -> Option<&[Posting]> {
        self.postings.get(term).map(Vec::as_slice)
    }

    /// Number of documents containing `term`
    pub fn doc_frequency(&self, term: &Term) -> usize {
        self.postings.get(term).map_or(0, Vec::len)
    }

    /// Total occurrences of `term` across all documents
    pub fn collection_frequency(&self, term: &Term) -> usize {
        self.postings
            .get(term)
            .map_or(0, |list| list.iter().map(|p| p.term_frequency).sum())
    }

    /// Number of distinct documents in the index
    pub fn total_documents(&self) -> usize {
        self.documents.len()
    }

    pub fn contains_document(&self, document_id: &str) -> bool {
        self.documents.contains(document_id)
    }

    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.postings.keys()
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            total_documents: self.documents.len(),
            total_terms: self.postings.len(),
            avg_postings_per_term: if self.postings.is_empty() {
                0.0
            } else {
                self.postings.values().map(Vec::len).sum::<usize>() as f64 / self.postings.len() as f64
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexStats {
    pub total_documents: usize,
    pub total_terms: usize,
    pub avg_postings_per_term: f64,
}
