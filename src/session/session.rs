use std::io::Write;

use colored::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::hub::{LoadError, TokenizerLoader};
use crate::models::{Catalog, ModelChoice};
use crate::tokenizer::{TokenizationResult, TokenizeError, TokenizerHandle};
use super::display;
use super::prompt::{PromptError, Prompter};

const SELECT_MESSAGE: &str = "Select a model or choose 'Enter custom model name'";
const CUSTOM_MESSAGE: &str = "Enter the Hugging Face model repository name (e.g., 'bert-base-uncased')";
const TEXT_MESSAGE: &str = "Enter the text you want to tokenize";
const CONTINUE_MESSAGE: &str = "Tokenize another string with the same model?";

/// How a session that did not fail came to an end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The user backed out of model selection
    Aborted,
    /// The user stopped after `rounds` tokenization rounds
    Finished { rounds: usize },
}

/// Fatal session errors. Load failures have already been reported to the
/// user when they are returned.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("failed to write to the console: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    /// Whether the user has already been shown a message for this error
    pub fn is_reported(&self) -> bool {
        matches!(self, SessionError::Load(_))
    }
}

enum SessionState<H> {
    SelectingModel,
    LoadingTokenizer(ModelChoice),
    Ready(H),
    Tokenizing(H, String),
    Terminated,
}

/// Tokenizes `text` with `handle`; the handle is left untouched
pub fn tokenize_once<H: TokenizerHandle>(handle: &H, text: &str) -> Result<TokenizationResult, TokenizeError> {
    handle.tokenize(text)
}

/// One interactive run: pick a model, load it, then tokenize until the user stops
pub struct Session<'a, P, L, W> {
    prompter: P,
    loader: &'a L,
    catalog: &'a Catalog,
    out: W,
    rounds: usize,
}

impl<'a, P, L, W> Session<'a, P, L, W>
where
    P: Prompter,
    L: TokenizerLoader,
    W: Write,
{
    pub fn new(prompter: P, loader: &'a L, catalog: &'a Catalog, out: W) -> Self {
        Self {
            prompter,
            loader,
            catalog,
            out,
            rounds: 0,
        }
    }

    pub async fn run(&mut self) -> Result<Outcome, SessionError> {
        info!("Session started");
        writeln!(self.out, "{}", display::WELCOME)?;

        let mut state = SessionState::SelectingModel;
        loop {
            state = match state {
                SessionState::SelectingModel => match self.select_model()? {
                    Some(choice) => SessionState::LoadingTokenizer(choice),
                    None => {
                        writeln!(self.out, "{}", display::EXITING)?;
                        info!("Model selection aborted");
                        return Ok(Outcome::Aborted);
                    }
                },
                SessionState::LoadingTokenizer(choice) => {
                    SessionState::Ready(self.load_tokenizer(&choice).await?)
                }
                SessionState::Ready(handle) => {
                    writeln!(self.out, "{}", display::round_separator())?;
                    match self.read_text()? {
                        None => {
                            writeln!(self.out, "{}", display::EXITING)?;
                            SessionState::Terminated
                        }
                        Some(text) if text.trim().is_empty() => {
                            writeln!(self.out, "{}", display::EMPTY_TEXT_HINT)?;
                            SessionState::Ready(handle)
                        }
                        Some(text) => SessionState::Tokenizing(handle, text),
                    }
                }
                SessionState::Tokenizing(handle, text) => {
                    self.tokenize_round(&handle, &text)?;
                    if self.prompt_continue()? {
                        SessionState::Ready(handle)
                    } else {
                        writeln!(self.out, "{}", display::GOODBYE)?;
                        SessionState::Terminated
                    }
                }
                SessionState::Terminated => {
                    info!("Session finished after {} rounds", self.rounds);
                    return Ok(Outcome::Finished { rounds: self.rounds });
                }
            };
        }
    }

    /// Shows the catalog and returns the picked model, or `None` if the user aborted
    pub fn select_model(&mut self) -> Result<Option<ModelChoice>, SessionError> {
        self.out.flush()?;
        let menu = self.catalog.menu();
        let Some(index) = self.prompter.select(SELECT_MESSAGE, &menu)? else {
            return Ok(None);
        };

        if let Some(choice) = self.catalog.resolve(index) {
            info!("Selected catalog model {}", choice);
            return Ok(Some(choice));
        }

        let Some(name) = self.prompter.text(CUSTOM_MESSAGE)? else {
            return Ok(None);
        };
        // A blank name leaves the session the same way an abort does
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        let choice = ModelChoice::Custom(name.to_string());
        info!("Selected custom model {}", choice);
        Ok(Some(choice))
    }

    pub async fn load_tokenizer(&mut self, choice: &ModelChoice) -> Result<L::Handle, SessionError> {
        writeln!(self.out, "{}", display::loading(choice.repo_id()))?;
        self.out.flush()?;

        match self.loader.load(choice).await {
            Ok(handle) => {
                let provenance = if handle.model().is_custom() { "custom" } else { "catalog" };
                info!("Tokenizer ready for {} model {}", provenance, handle.model());
                writeln!(self.out, "{}", display::LOADED.green())?;
                Ok(handle)
            }
            Err(e) => {
                warn!("Loading {} failed: {}", choice, e);
                writeln!(self.out, "{}", display::load_failure(&e).red())?;
                Err(e.into())
            }
        }
    }

    fn read_text(&mut self) -> Result<Option<String>, SessionError> {
        self.out.flush()?;
        Ok(self.prompter.text(TEXT_MESSAGE)?)
    }

    /// Tokenizes and prints one input. A tokenizer error only ends this round.
    fn tokenize_round(&mut self, handle: &L::Handle, text: &str) -> Result<(), SessionError> {
        self.rounds += 1;
        writeln!(self.out, "{}", display::input_echo(text))?;

        match tokenize_once(handle, text) {
            Ok(result) => {
                debug!("Round {}: {} tokens", self.rounds, result.len());
                writeln!(self.out, "{}", display::render_result(&result))?;
            }
            Err(e) => {
                warn!("Round {}: tokenization failed: {}", self.rounds, e);
                writeln!(self.out, "{}", display::tokenize_failure(&e.to_string()).red())?;
            }
        }
        Ok(())
    }

    /// Asks whether to go on with the same model; aborting counts as no
    fn prompt_continue(&mut self) -> Result<bool, SessionError> {
        self.out.flush()?;
        Ok(self.prompter.confirm(CONTINUE_MESSAGE, true)?.unwrap_or(false))
    }
}
