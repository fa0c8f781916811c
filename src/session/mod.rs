// Result rendering and user-facing messages
pub mod display;

// The prompt abstraction and its terminal implementation
pub mod prompt;

// The session state machine
mod session;

pub use prompt::{LinePrompter, PromptError, Prompter};
pub use session::{tokenize_once, Outcome, Session, SessionError};
