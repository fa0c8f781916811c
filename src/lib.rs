//! Interactive explorer for Hugging Face tokenizers: pick a model, type text,
//! see the token ids and token strings it produces.

pub mod config;
pub mod hub;
pub mod models;
pub mod session;
pub mod tokenizer;
