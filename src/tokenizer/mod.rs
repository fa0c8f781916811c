mod strategy;
mod hub_tokenizer;
pub mod types;

pub use strategy::TokenizerHandle;
pub use hub_tokenizer::HubTokenizer;
pub use types::{Token, TokenizationResult, TokenizeError};
