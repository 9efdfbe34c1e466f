use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, TextAnalyzer, TokenStream};

/// Splits text on anything that is not alphanumeric and case-folds each token.
/// Every token is kept regardless of length. Indexing and querying go through
/// the same analyzer.
#[derive(Clone)]
pub struct Tokenizer {
    analyzer: TextAnalyzer,
}

impl Tokenizer {
    pub fn new() -> Self {
        let analyzer = TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(LowerCaser)
            .build();
        Self { analyzer }
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut analyzer = self.analyzer.clone();
        let mut stream = analyzer.token_stream(text);
        let mut tokens = Vec::new();
        while stream.advance() {
            tokens.push(stream.token().text.clone());
        }
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
    fn test_splits_on_punctuation_and_folds_case() {
        let tokens = Tokenizer::new().tokenize("Cone-6 Glaze, TENMOKU!  shino");
        assert_eq!(tokens, vec!["cone", "6", "glaze", "tenmoku", "shino"]);
    }

    #[test]
    fn test_long_tokens_are_kept() {
        let tokenizer = Tokenizer::new();
        let word = "hydroxyapatiteandwollastonitecombinationglaze";
        assert_eq!(tokenizer.tokenize(&word.to_uppercase()), vec![word]);
        // No separators between CJK characters, so a title stays one token.
        assert_eq!(
            tokenizer.tokenize("陶芸の釉薬テストを毎週続ける"),
            vec!["陶芸の釉薬テストを毎週続ける"]
        );
    }

    #[test]
    fn test_empty_text_has_no_tokens() {
        assert!(Tokenizer::new().tokenize(" ... ").is_empty());
    }
}
