use std::char::ToLowercase;
use std::collections::{HashMap, HashSet};
use std::str::Chars;

lazy_static::lazy_static! {
    static ref ENGLISH_STOPWORDS: HashSet<&'static str> = {
        [
            "a", "about", "above", "after", "again", "against", "all", "am", "an", "and",
            "any", "are", "as", "at", "be", "because", "been", "before", "being", "below",
            "between", "both", "but", "by", "cannot", "could", "did", "do", "does", "doing",
            "down", "during", "each", "few", "for", "from", "further", "had", "has", "have",
            "having", "he", "her", "here", "hers", "herself", "him", "himself", "his", "how",
            "i", "if", "in", "into", "is", "it", "its", "itself", "me", "more", "most", "my",
            "myself", "no", "nor", "not", "of", "off", "on", "once", "only", "or", "other",
            "ought", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
            "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
            "themselves", "then", "there", "these", "they", "this", "those", "through", "to",
            "too", "under", "until", "up", "very", "was", "we", "were", "what", "when",
            "where", "which", "while", "who", "whom", "why", "with", "would", "you", "your",
            "yours", "yourself", "yourselves",
        ]
        .iter()
        .copied()
        .collect()
    };
}

/// Turns free text into normalized tokens.
///
/// Implementations must be deterministic: the same input always yields the
/// same sequence, since index-time and query-time analysis have to agree.
pub trait TextAnalyzer: Send + Sync {
    type Tokens<'a>: Iterator<Item = String>
    where
        Self: 'a;

    /// Tokenize `text` lazily, in left-to-right order, duplicates included.
    fn analyze<'a>(&'a self, text: &'a str) -> Self::Tokens<'a>;

    /// Analyze and count term frequencies
    fn analyze_with_frequencies(&self, text: &str) -> HashMap<String, usize> {
        let mut frequencies = HashMap::new();
        for token in self.analyze(text) {
            *frequencies.entry(token).or_insert(0) += 1;
        }
        frequencies
    }
}

/// Lowercasing, noise-stripping tokenizer with optional custom separators
/// and stop-words.
///
/// Every non-alphanumeric character is noise. Custom separators can only
/// turn alphanumeric characters into noise as well; they never make
/// punctuation part of a word. Separators are matched against the already
/// lowercased character.
#[derive(Debug, Clone, Default)]
pub struct StandardAnalyzer {
    token_separators: Option<HashSet<char>>,
    stopwords: Option<HashSet<String>>,
}

impl StandardAnalyzer {
    pub fn new(token_separators: Option<HashSet<char>>, stopwords: Option<HashSet<String>>) -> Self {
        Self {
            token_separators,
            stopwords,
        }
    }

    /// Analyzer with the built-in English stop-word list.
    pub fn english() -> Self {
        Self::default().with_stopwords(ENGLISH_STOPWORDS.iter().copied())
    }

    pub fn with_token_separators<I>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = char>,
    {
        self.token_separators
            .get_or_insert_with(HashSet::new)
            .extend(separators);
        self
    }

    /// Add stop-words. Entries are compared against normalized tokens as-is.
    pub fn with_stopwords<I, S>(mut self, stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stopwords
            .get_or_insert_with(HashSet::new)
            .extend(stopwords.into_iter().map(Into::into));
        self
    }

    pub fn token_separators(&self) -> Option<&HashSet<char>> {
        self.token_separators.as_ref()
    }

    pub fn stopwords(&self) -> Option<&HashSet<String>> {
        self.stopwords.as_ref()
    }

    fn is_noise(&self, c: char) -> bool {
        if !c.is_alphanumeric() {
            return true;
        }
        self.token_separators
            .as_ref()
            .map_or(false, |separators| separators.contains(&c))
    }

    fn is_stopword(&self, token: &str) -> bool {
        self.stopwords
            .as_ref()
            .map_or(false, |stopwords| stopwords.contains(token))
    }
}

impl TextAnalyzer for StandardAnalyzer {
    type Tokens<'a> = Tokens<'a>;

    fn analyze<'a>(&'a self, text: &'a str) -> Tokens<'a> {
        Tokens {
            analyzer: self,
            chars: text.chars(),
            lowered: None,
        }
    }
}

/// Lazy token stream produced by [`StandardAnalyzer`].
///
/// Cloning forks the stream at its current position; a clone taken before
/// iteration starts re-enumerates the whole sequence.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    analyzer: &'a StandardAnalyzer,
    chars: Chars<'a>,
    lowered: Option<ToLowercase>,
}

impl Tokens<'_> {
    fn next_char(&mut self) -> Option<char> {
        loop {
            if let Some(c) = self.lowered.as_mut().and_then(Iterator::next) {
                return Some(c);
            }
            self.lowered = Some(self.chars.next()?.to_lowercase());
        }
    }

    fn next_raw_token(&mut self) -> Option<String> {
        let mut token = String::new();
        while let Some(c) = self.next_char() {
            if !self.analyzer.is_noise(c) {
                token.push(c);
            } else if !token.is_empty() {
                return Some(token);
            }
        }
        (!token.is_empty()).then_some(token)
    }
}

impl Iterator for Tokens<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let token = self.next_raw_token()?;
            if !self.analyzer.is_stopword(&token) {
                return Some(token);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(analyzer: &StandardAnalyzer, text: &str) -> Vec<String> {
        analyzer.analyze(text).collect()
    }

    #[test]
    fn test_tokenize() {
        let analyzer = StandardAnalyzer::default();
        let tokens = tokens(&analyzer, "Hello, World! This is a test.");
        assert_eq!(tokens, vec!["hello", "world", "this", "is", "a", "test"]);
    }

    #[test]
    fn test_empty_and_noise_only_input() {
        let analyzer = StandardAnalyzer::default();
        assert!(tokens(&analyzer, "").is_empty());
        assert!(tokens(&analyzer, "  ,.;-- !?  ").is_empty());
    }

    #[test]
    fn test_duplicates_and_order_preserved() {
        let analyzer = StandardAnalyzer::default();
        assert_eq!(
            tokens(&analyzer, "b a b-a"),
            vec!["b", "a", "b", "a"]
        );
    }

    #[test]
    fn test_unicode_letters_are_kept() {
        let analyzer = StandardAnalyzer::default();
        assert_eq!(tokens(&analyzer, "Ærøskøbing Straße"), vec!["ærøskøbing", "straße"]);
    }

    #[test]
    fn test_custom_separators_split_alphanumerics() {
        let analyzer = StandardAnalyzer::default().with_token_separators(['x', '1']);
        assert_eq!(tokens(&analyzer, "fooxbar21baz"), vec!["foo", "bar2", "baz"]);
    }

    #[test]
    fn test_custom_separators_never_rescue_punctuation() {
        let analyzer = StandardAnalyzer::default().with_token_separators(['_', '-']);
        assert_eq!(tokens(&analyzer, "snake_case-word"), vec!["snake", "case", "word"]);
    }

    #[test]
    fn test_separators_match_lowercased_characters() {
        let analyzer = StandardAnalyzer::default().with_token_separators(['X']);
        assert_eq!(tokens(&analyzer, "fooXbar"), vec!["fooxbar"]);
    }

    #[test]
    fn test_stopwords_removed() {
        let analyzer = StandardAnalyzer::default().with_stopwords(["the"]);
        assert_eq!(tokens(&analyzer, "The cat sat on THE mat"), vec!["cat", "sat", "on", "mat"]);
    }

    #[test]
    fn test_stopword_filter_equals_post_filter() {
        let stopwords = ["on", "the", "mat"];
        let plain = StandardAnalyzer::default();
        let filtered = StandardAnalyzer::default().with_stopwords(stopwords);
        let text = "The cat sat on the mat, then the dog sat on the cat.";

        let expected: Vec<String> = plain
            .analyze(text)
            .filter(|t| !stopwords.contains(&t.as_str()))
            .collect();
        let actual: Vec<String> = filtered.analyze(text).collect();

        assert_eq!(actual, expected);
        assert!(actual.iter().all(|t| !stopwords.contains(&t.as_str())));
    }

    #[test]
    fn test_output_tokens_are_fixed_points() {
        let analyzer = StandardAnalyzer::default().with_token_separators(['q']);
        let text = "Quick-brown FOX; jumps_over 42 lazy dogs... ÉCOLE";
        for token in analyzer.analyze(text) {
            assert!(!token.is_empty());
            assert!(token.chars().all(|c| !analyzer.is_noise(c)));
            assert_eq!(tokens(&analyzer, &token), vec![token.clone()]);
        }
    }

    #[test]
    fn test_case_insensitive_for_ascii() {
        let analyzer = StandardAnalyzer::default();
        for text in ["hello world", "MiXeD CaSe text", "abc def ghi"] {
            assert_eq!(tokens(&analyzer, text), tokens(&analyzer, &text.to_uppercase()));
        }
    }

    #[test]
    fn test_token_stream_is_restartable() {
        let analyzer = StandardAnalyzer::default();
        let stream = analyzer.analyze("one two three");
        let first: Vec<String> = stream.clone().collect();
        let second: Vec<String> = stream.collect();
        assert_eq!(first, second);
        assert_eq!(first, tokens(&analyzer, "one two three"));
    }

    #[test]
    fn test_english_preset() {
        let analyzer = StandardAnalyzer::english();
        assert_eq!(
            tokens(&analyzer, "The quick brown fox jumps over the lazy dog"),
            vec!["quick", "brown", "fox", "jumps", "lazy", "dog"]
        );
    }

    #[test]
    fn test_analyze_with_frequencies() {
        let analyzer = StandardAnalyzer::default();
        let frequencies = analyzer.analyze_with_frequencies("to be or not to be");
        assert_eq!(frequencies.len(), 4);
        assert_eq!(frequencies["to"], 2);
        assert_eq!(frequencies["be"], 2);
        assert_eq!(frequencies["or"], 1);
    }
}
