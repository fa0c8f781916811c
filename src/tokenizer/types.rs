use thiserror::Error;

/// Represents a token produced from the input text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The unique ID of the token in the vocabulary
    pub id: u32,
    /// The display form of the token as the vocabulary stores it
    pub text: String,
}

/// Tokens in left-to-right order of occurrence in the input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenizationResult {
    tokens: Vec<Token>,
}

impl TokenizationResult {
    /// Pairs ids with their display strings. Both slices come from the same
    /// encoding; a length mismatch is reported instead of truncated.
    pub fn from_parts(ids: &[u32], tokens: &[String]) -> Result<Self, TokenizeError> {
        if ids.len() != tokens.len() {
            return Err(TokenizeError::Misaligned {
                ids: ids.len(),
                tokens: tokens.len(),
            });
        }

        Ok(Self {
            tokens: ids
                .iter()
                .zip(tokens)
                .map(|(&id, text)| Token { id, text: text.clone() })
                .collect(),
        })
    }

    pub fn ids(&self) -> Vec<u32> {
        self.tokens.iter().map(|t| t.id).collect()
    }

    pub fn tokens(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl FromIterator<Token> for TokenizationResult {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self { tokens: iter.into_iter().collect() }
    }
}

/// Failure while tokenizing a single input; the session keeps going after it
#[derive(Debug, Error)]
pub enum TokenizeError {
    #[error("{message}")]
    Encode { message: String },

    #[error("tokenizer returned {ids} ids but {tokens} token strings")]
    Misaligned { ids: usize, tokens: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_keeps_order() {
        let result = TokenizationResult::from_parts(
            &[15496, 2159, 0],
            &["Hello".to_string(), "ĠWorld".to_string(), "!".to_string()],
        ).unwrap();

        assert_eq!(result.ids(), vec![15496, 2159, 0]);
        assert_eq!(result.tokens(), vec!["Hello", "ĠWorld", "!"]);
    }

    #[test]
    fn test_from_parts_rejects_mismatch() {
        let err = TokenizationResult::from_parts(&[1, 2], &["a".to_string()]).unwrap_err();
        assert!(matches!(err, TokenizeError::Misaligned { ids: 2, tokens: 1 }));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let result: TokenizationResult = [
            Token { id: 7, text: "la".to_string() },
            Token { id: 7, text: "la".to_string() },
        ].into_iter().collect();
        assert_eq!(result.len(), 2);
    }
}
