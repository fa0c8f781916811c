use std::fmt;

/// Menu entry that switches the selection prompt to free-form input
pub const CUSTOM_ENTRY_LABEL: &str = "Enter custom model name";

/// A model picked by the user.
///
/// Both variants carry a hub repository name (or a local path); the variant
/// only records where the name came from so it can be shown back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelChoice {
    /// One of the catalog entries
    Predefined(String),
    /// Typed in by the user
    Custom(String),
}

impl ModelChoice {
    /// The identifier handed to the loader
    pub fn repo_id(&self) -> &str {
        match self {
            ModelChoice::Predefined(name) | ModelChoice::Custom(name) => name,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, ModelChoice::Custom(_))
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.repo_id())
    }
}

/// The fixed list of candidate models offered in the selection menu
#[derive(Debug, Clone)]
pub struct Catalog {
    candidates: Vec<String>,
}

impl Catalog {
    pub fn new(candidates: Vec<String>) -> Self {
        Self { candidates }
    }

    /// Menu lines: every candidate followed by the custom entry
    pub fn menu(&self) -> Vec<&str> {
        self.candidates
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(CUSTOM_ENTRY_LABEL))
            .collect()
    }

    /// Maps a menu index to a choice; `None` means the custom entry was picked
    /// and the name still has to be asked for.
    pub fn resolve(&self, index: usize) -> Option<ModelChoice> {
        self.candidates.get(index).cloned().map(ModelChoice::Predefined)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(
            [
                "meta-llama/Llama-3.1-70B-Instruct",
                "google/gemma-2-9b-it",
                "mistralai/Mistral-7B-Instruct-v0.3",
                "bert-base-uncased",
                "gpt2",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        )
    }
}
