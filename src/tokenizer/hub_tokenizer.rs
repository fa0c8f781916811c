use std::path::Path;
use tokenizers::Tokenizer;

use crate::models::ModelChoice;
use super::strategy::TokenizerHandle;
use super::types::{TokenizationResult, TokenizeError};

/// A `tokenizers` tokenizer loaded from a `tokenizer.json` artifact
pub struct HubTokenizer {
    model: ModelChoice,
    inner: Tokenizer,
    add_special_tokens: bool,
}

impl HubTokenizer {
    pub fn new(model: ModelChoice, inner: Tokenizer, add_special_tokens: bool) -> Self {
        Self {
            model,
            inner,
            add_special_tokens,
        }
    }

    /// Parses a `tokenizer.json` file
    pub fn from_file(
        model: ModelChoice,
        path: &Path,
        add_special_tokens: bool,
    ) -> Result<Self, tokenizers::Error> {
        let inner = Tokenizer::from_file(path)?;
        Ok(Self::new(model, inner, add_special_tokens))
    }

    /// Vocabulary size including added tokens
    pub fn vocab_size(&self) -> usize {
        self.inner.get_vocab_size(true)
    }
}

impl TokenizerHandle for HubTokenizer {
    fn model(&self) -> &ModelChoice {
        &self.model
    }

    fn tokenize(&self, text: &str) -> Result<TokenizationResult, TokenizeError> {
        let encoding = self
            .inner
            .encode(text, self.add_special_tokens)
            .map_err(|e| TokenizeError::Encode { message: e.to_string() })?;

        TokenizationResult::from_parts(encoding.get_ids(), encoding.get_tokens())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    /// Word-level vocabulary split on whitespace and punctuation
    const WORD_LEVEL_JSON: &str = r#"{
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": { "[UNK]": 0, "Hello": 1, "World": 2, "!": 3 },
            "unk_token": "[UNK]"
        }
    }"#;

    fn word_level() -> HubTokenizer {
        let inner = Tokenizer::from_str(WORD_LEVEL_JSON).unwrap();
        HubTokenizer::new(ModelChoice::Custom("word-level".to_string()), inner, true)
    }

    #[test]
    fn test_hello_world() {
        let tokenizer = word_level();
        let result = tokenizer.tokenize("Hello World!").unwrap();

        assert_eq!(result.tokens(), vec!["Hello", "World", "!"]);
        assert_eq!(result.ids(), vec![1, 2, 3]);
        assert_eq!(result.ids().len(), result.tokens().len());
    }

    #[test]
    fn test_unknown_words_map_to_unk() {
        let tokenizer = word_level();
        let result = tokenizer.tokenize("Hello there").unwrap();
        assert_eq!(result.tokens(), vec!["Hello", "[UNK]"]);
        assert_eq!(result.ids(), vec![1, 0]);
    }

    #[test]
    fn test_tokenize_is_idempotent() {
        let tokenizer = word_level();
        let first = tokenizer.tokenize("Hello World! Hello").unwrap();
        let second = tokenizer.tokenize("Hello World! Hello").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_separately_loaded_handles_agree() {
        let a = word_level().tokenize("World Hello !").unwrap();
        let b = word_level().tokenize("World Hello !").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_input() {
        let result = word_level().tokenize("").unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_vocab_size() {
        assert_eq!(word_level().vocab_size(), 4);
    }
}
