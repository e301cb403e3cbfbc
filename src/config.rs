use crate::tokenizer::StandardAnalyzer;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Analyzer configuration.
///
/// Absent sets disable the feature; they are fixed once the analyzer is built.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Alphanumeric characters that split tokens
    pub token_separators: Option<Vec<char>>,
    /// Normalized tokens dropped from the output
    pub stopwords: Option<Vec<String>>,
    /// Include the built-in English stop-word list
    pub english_stopwords: bool,
}

impl AnalyzerConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open analyzer config {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Invalid analyzer config {}", path.display()))
    }

    pub fn build(&self) -> StandardAnalyzer {
        let mut analyzer = if self.english_stopwords {
            StandardAnalyzer::english()
        } else {
            StandardAnalyzer::default()
        };
        if let Some(separators) = &self.token_separators {
            analyzer = analyzer.with_token_separators(separators.iter().copied());
        }
        if let Some(stopwords) = &self.stopwords {
            analyzer = analyzer.with_stopwords(stopwords.iter().cloned());
        }
        analyzer
    }
}
