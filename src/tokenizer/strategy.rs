use crate::models::ModelChoice;
use super::types::{TokenizationResult, TokenizeError};

/// A loaded tokenizer, bound to the model it was loaded for.
///
/// Tokenizing never changes the handle, so the same text always yields the
/// same result.
pub trait TokenizerHandle {
    /// The model this handle was loaded for
    fn model(&self) -> &ModelChoice;

    /// Convert text into ordered (id, token) pairs
    fn tokenize(&self, text: &str) -> Result<TokenizationResult, TokenizeError>;
}
