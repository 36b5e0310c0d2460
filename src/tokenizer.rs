/// Normalizes raw text into the word sequence used for indexing.
///
/// The exact same pipeline runs on documents and on queries; if the two
/// sides ever diverge, no term can match.
pub struct Tokenizer;

impl Tokenizer {
    pub fn new() -> Self {
        Self
    }

    /// Split text into raw tokens, treating every character that is neither
    /// a word character nor whitespace as a separator
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                    c
                } else {
                    ' '
                }
            })
            .collect::<String>()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    /// Convert tokens to lowercase
    fn lowercase_filter(&self, tokens: Vec<String>) -> Vec<String> {
        tokens.into_iter().map(|t| t.to_lowercase()).collect()
    }

    /// Drop tokens shorter than two characters
    fn short_token_filter(&self, tokens: Vec<String>) -> Vec<String> {
        tokens
            .into_iter()
            .filter(|t| t.chars().count() >= 2)
            .collect()
    }

    /// Full normalization pipeline
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let tokens = self.tokenize(text);
        let tokens = self.lowercase_filter(tokens);
        let tokens = self.short_token_filter(tokens);
        tokens
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_strips_punctuation() {
        let tokenizer = Tokenizer::new();
        let tokens = tokenizer.analyze("Hello, World! This is... a test.");
        assert_eq!(tokens, vec!["hello", "world", "this", "is", "test"]);
    }

    #[test]
    fn test_analyze_drops_short_tokens() {
        let tokenizer = Tokenizer::new();
        let tokens = tokenizer.analyze("a I of ox");
        assert_eq!(tokens, vec!["of", "ox"]);
    }

    #[test]
    fn test_analyze_collapses_whitespace() {
        let tokenizer = Tokenizer::new();
        let tokens = tokenizer.analyze("cat \t\n  mat");
        assert_eq!(tokens, vec!["cat", "mat"]);
    }

    #[test]
    fn test_query_and_document_normalize_identically() {
        let tokenizer = Tokenizer::new();
        assert_eq!(
            tokenizer.analyze("Retrieval-Augmented Generation"),
            tokenizer.analyze("retrieval augmented generation")
        );
    }

}
