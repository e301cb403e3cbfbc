use crate::document::{Document, Field};
use crate::tokenizer::{StandardAnalyzer, TextAnalyzer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized (or, for verbatim fields, literal) vocabulary entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Word(String);

impl Word {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique (field, word) identity in the vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Term {
    pub field: String,
    pub word: Word,
}

impl Term {
    pub fn new(field: impl Into<String>, word: Word) -> Self {
        Self {
            field: field.into(),
            word,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.word)
    }
}

/// Occurrence count of a term within one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub document_id: String,
    pub term_frequency: usize,
}

impl Posting {
    pub fn new(document_id: String, term_frequency: usize) -> Self {
        Self {
            document_id,
            term_frequency,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedTerm {
    pub term: Term,
    pub posting: Posting,
}

/// Analysis output for a single document.
///
/// Terms are grouped by field, in field order. Order within a field is
/// unspecified and must not be relied on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedDocument {
    pub document_id: String,
    pub terms: Vec<AnalyzedTerm>,
}

impl AnalyzedDocument {
    pub fn new(document_id: String, terms: Vec<AnalyzedTerm>) -> Self {
        Self { document_id, terms }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Posting for `word` in `field`, if the document produced that term
    pub fn posting(&self, field: &str, word: &str) -> Option<&Posting> {
        self.terms
            .iter()
            .find(|t| t.term.field == field && t.term.word.as_str() == word)
            .map(|t| &t.posting)
    }
}

/// Capability to turn a whole document into analyzed terms
pub trait AnalyzeDocument {
    fn analyze_document(&self, document: &Document) -> AnalyzedDocument;
}

/// Field-aware analyzer built on any [`TextAnalyzer`].
///
/// Analyzed fields are tokenized and counted; verbatim fields become a single
/// term with frequency 1 and their value untouched.
#[derive(Debug, Clone, Default)]
pub struct DocumentAnalyzer<A = StandardAnalyzer> {
    text_analyzer: A,
}

impl<A: TextAnalyzer> DocumentAnalyzer<A> {
    pub fn new(text_analyzer: A) -> Self {
        Self { text_analyzer }
    }

    pub fn text_analyzer(&self) -> &A {
        &self.text_analyzer
    }

    fn analyze_field(&self, document_id: &str, name: &str, field: &Field, out: &mut Vec<AnalyzedTerm>) {
        if !field.analyze {
            out.push(AnalyzedTerm {
                term: Term::new(name, Word::new(field.value.as_str())),
                posting: Posting::new(document_id.to_string(), 1),
            });
            return;
        }

        let frequencies = self.text_analyzer.analyze_with_frequencies(&field.value);
        out.extend(frequencies.into_iter().map(|(token, count)| AnalyzedTerm {
            term: Term::new(name, Word::new(token)),
            posting: Posting::new(document_id.to_string(), count),
        }));
    }
}

impl<A: TextAnalyzer> AnalyzeDocument for DocumentAnalyzer<A> {
    fn analyze_document(&self, document: &Document) -> AnalyzedDocument {
        let mut terms = Vec::new();
        for (name, field) in &document.fields {
            self.analyze_field(&document.id, name, field, &mut terms);
        }

        tracing::debug!(
            document_id = %document.id,
            fields = document.fields.len(),
            terms = terms.len(),
            "analyzed document"
        );

        AnalyzedDocument::new(document.id.clone(), terms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::new("doc-1".to_string()).with_text("body", text)
    }

    #[test]
    fn test_term_frequencies() {
        let analyzer = DocumentAnalyzer::new(StandardAnalyzer::default());
        let analyzed = analyzer.analyze_document(&doc("the cat sat on the mat"));

        assert_eq!(analyzed.document_id, "doc-1");
        assert_eq!(analyzed.len(), 5);
        assert_eq!(analyzed.posting("body", "the").unwrap().term_frequency, 2);
        for word in ["cat", "sat", "on", "mat"] {
            assert_eq!(analyzed.posting("body", word).unwrap().term_frequency, 1);
        }
    }

    #[test]
    fn test_stopwords_excluded_from_terms() {
        let analyzer = DocumentAnalyzer::new(StandardAnalyzer::default().with_stopwords(["the"]));
        let analyzed = analyzer.analyze_document(&doc("the cat sat"));

        let mut words: Vec<&str> = analyzed.terms.iter().map(|t| t.term.word.as_str()).collect();
        words.sort_unstable();
        assert_eq!(words, vec!["cat", "sat"]);
        assert!(analyzed.terms.iter().all(|t| t.posting.term_frequency == 1));
    }

    #[test]
    fn test_verbatim_field_untouched() {
        let analyzer = DocumentAnalyzer::new(StandardAnalyzer::default());
        let document = Document::new("42".to_string()).with_keyword("sku", "Exact-Value_123");
        let analyzed = analyzer.analyze_document(&document);

        assert_eq!(analyzed.len(), 1);
        let term = &analyzed.terms[0];
        assert_eq!(term.term, Term::new("sku", Word::new("Exact-Value_123")));
        assert_eq!(term.posting, Posting::new("42".to_string(), 1));
    }

    #[test]
    fn test_verbatim_empty_value_still_emits_term() {
        let analyzer = DocumentAnalyzer::new(StandardAnalyzer::default());
        let document = Document::new("1".to_string()).with_keyword("tag", "");
        let analyzed = analyzer.analyze_document(&document);

        assert_eq!(analyzed.len(), 1);
        assert_eq!(analyzed.terms[0].term.word.as_str(), "");
    }

    #[test]
    fn test_empty_document() {
        let analyzer = DocumentAnalyzer::new(StandardAnalyzer::default());
        let analyzed = analyzer.analyze_document(&Document::new("empty".to_string()));

        assert_eq!(analyzed.document_id, "empty");
        assert!(analyzed.is_empty());
    }

    #[test]
    fn test_terms_grouped_by_field_order() {
        let analyzer = DocumentAnalyzer::new(StandardAnalyzer::default());
        let document = Document::new("1".to_string())
            .with_text("title", "Rust rust")
            .with_text("body", "fast safe fast")
            .with_keyword("lang", "EN");
        let analyzed = analyzer.analyze_document(&document);

        let fields: Vec<&str> = analyzed.terms.iter().map(|t| t.term.field.as_str()).collect();
        assert_eq!(fields, vec!["body", "body", "lang", "title"]);
        assert_eq!(analyzed.posting("title", "rust").unwrap().term_frequency, 2);
        assert_eq!(analyzed.posting("body", "fast").unwrap().term_frequency, 2);
        assert_eq!(analyzed.posting("lang", "EN").unwrap().term_frequency, 1);
        assert!(analyzed.posting("lang", "en").is_none());
    }

    #[test]
    fn test_same_word_in_different_fields_is_distinct_term() {
        let analyzer = DocumentAnalyzer::new(StandardAnalyzer::default());
        let document = Document::new("1".to_string())
            .with_text("a", "word")
            .with_text("b", "word");
        let analyzed = analyzer.analyze_document(&document);

        assert_eq!(analyzed.len(), 2);
        assert_ne!(analyzed.terms[0].term, analyzed.terms[1].term);
    }

    #[test]
    fn test_shared_analyzer_across_threads() {
        let analyzer = DocumentAnalyzer::new(StandardAnalyzer::english());
        let documents: Vec<Document> = (0..8)
            .map(|i| Document::new(i.to_string()).with_text("body", "The rust words, the rust counts"))
            .collect();

        let results: Vec<AnalyzedDocument> = std::thread::scope(|scope| {
            let analyzer = &analyzer;
            let handles: Vec<_> = documents
                .iter()
                .map(|document| scope.spawn(move || analyzer.analyze_document(document)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for (i, analyzed) in results.iter().enumerate() {
            assert_eq!(analyzed.document_id, i.to_string());
            assert_eq!(analyzed.len(), 3);
            assert_eq!(analyzed.posting("body", "rust").unwrap().term_frequency, 2);
            assert!(analyzed.posting("body", "the").is_none());
        }
    }

    struct WhitespaceAnalyzer;

    impl TextAnalyzer for WhitespaceAnalyzer {
        type Tokens<'a> = std::iter::Map<std::str::SplitWhitespace<'a>, fn(&str) -> String>;

        fn analyze<'a>(&'a self, text: &'a str) -> Self::Tokens<'a> {
            text.split_whitespace().map(str::to_string as fn(&str) -> String)
        }
    }

    #[test]
    fn test_alternative_text_analyzer() {
        let analyzer = DocumentAnalyzer::new(WhitespaceAnalyzer);
        let analyzed = analyzer.analyze_document(&doc("Hello, hello, World"));

        assert_eq!(analyzed.posting("body", "hello,").unwrap().term_frequency, 1);
        assert_eq!(analyzed.posting("body", "Hello,").unwrap().term_frequency, 1);
        assert_eq!(analyzed.posting("body", "World").unwrap().term_frequency, 1);
    }
}
