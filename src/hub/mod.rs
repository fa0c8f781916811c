mod probe;

use std::path::{Path, PathBuf};
use std::time::Duration;

use hf_hub::api::tokio::ApiBuilder;
use hf_hub::{Cache, Repo, RepoType};
use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::HubConfig;
use crate::models::ModelChoice;
use crate::tokenizer::{HubTokenizer, TokenizerHandle};
use probe::ProbeOutcome;

/// The artifact every supported model repository ships
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Why a tokenizer could not be obtained. Any of these ends the session.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not find tokenizer for model '{repo_id}'. Please check the repository name.")]
    NotFound { repo_id: String },

    #[error(
        "Model '{repo_id}' is gated and requires authentication. \
         Set the {credential_var} environment variable to an access token \
         that has been granted access to this repository."
    )]
    AuthRequired { repo_id: String, credential_var: String },

    #[error("Network error while fetching the tokenizer for '{repo_id}': {detail}")]
    NetworkFailure { repo_id: String, detail: String },

    #[error("The tokenizer for '{repo_id}' could not be read: {detail}")]
    Malformed { repo_id: String, detail: String },
}

/// Produces a tokenizer handle for a model choice
#[allow(async_fn_in_trait)]
pub trait TokenizerLoader {
    type Handle: TokenizerHandle;

    async fn load(&self, choice: &ModelChoice) -> Result<Self::Handle, LoadError>;
}

/// Loads tokenizers from local `tokenizer.json` files or the Hugging Face hub
pub struct HubLoader {
    hub: HubConfig,
    credential: Option<String>,
    add_special_tokens: bool,
}

impl HubLoader {
    /// `credential` is the token read from the environment at startup, if any
    pub fn new(hub: HubConfig, credential: Option<String>, add_special_tokens: bool) -> Self {
        Self {
            hub,
            credential,
            add_special_tokens,
        }
    }

    fn cache(&self) -> Cache {
        match &self.hub.cache_dir {
            Some(dir) => Cache::new(dir.clone()),
            None => Cache::default(),
        }
    }

    /// The environment credential, falling back to the token saved by `huggingface-cli login`
    fn token(&self) -> Option<String> {
        self.credential.clone().or_else(|| self.cache().token())
    }

    fn from_path(&self, choice: &ModelChoice, path: &Path) -> Result<HubTokenizer, LoadError> {
        HubTokenizer::from_file(choice.clone(), path, self.add_special_tokens).map_err(|e| {
            LoadError::Malformed {
                repo_id: choice.repo_id().to_string(),
                detail: e.to_string(),
            }
        })
    }

    fn repo(&self, repo_id: &str) -> Repo {
        Repo::with_revision(repo_id.to_string(), RepoType::Model, self.hub.revision.clone())
    }

    /// `tokenizer.json` already present in the hub cache for the configured revision
    fn cached(&self, repo_id: &str) -> Option<PathBuf> {
        self.cache().repo(self.repo(repo_id)).get(TOKENIZER_FILE)
    }

    /// Uses the cached `tokenizer.json` when there is one; otherwise checks
    /// access and downloads it into the hub cache
    async fn fetch(&self, repo_id: &str, spinner: &ProgressBar) -> Result<PathBuf, LoadError> {
        if let Some(path) = self.cached(repo_id) {
            debug!("Using cached {} for {}", TOKENIZER_FILE, repo_id);
            return Ok(path);
        }

        let token = self.token();
        let network_failure = |detail: String| LoadError::NetworkFailure {
            repo_id: repo_id.to_string(),
            detail,
        };

        spinner.set_message(format!("Checking access to {}...", repo_id));
        let client = probe::client().map_err(|e| network_failure(e.to_string()))?;
        let url = probe::resolve_url(&self.hub.endpoint, repo_id, &self.hub.revision, TOKENIZER_FILE);
        match probe::probe(&client, &url, token.as_deref()).await {
            Ok(ProbeOutcome::Available) => {}
            Ok(ProbeOutcome::NotFound) => {
                return Err(LoadError::NotFound { repo_id: repo_id.to_string() });
            }
            Ok(ProbeOutcome::AuthRequired) => {
                return Err(LoadError::AuthRequired {
                    repo_id: repo_id.to_string(),
                    credential_var: self.hub.token_env.clone(),
                });
            }
            Ok(ProbeOutcome::Unexpected(status)) => {
                return Err(network_failure(format!("hub answered with HTTP {}", status)));
            }
            Err(e) => return Err(network_failure(e.to_string())),
        }

        spinner.set_message(format!("Downloading {}...", TOKENIZER_FILE));
        let api = ApiBuilder::from_cache(self.cache())
            .with_progress(false)
            .with_endpoint(self.hub.endpoint.trim_end_matches('/').to_string())
            .with_token(token)
            .build()
            .map_err(|e| network_failure(e.to_string()))?;

        api.repo(self.repo(repo_id))
            .get(TOKENIZER_FILE)
            .await
            .map_err(|e| network_failure(e.to_string()))
    }
}

impl TokenizerLoader for HubLoader {
    type Handle = HubTokenizer;

    async fn load(&self, choice: &ModelChoice) -> Result<HubTokenizer, LoadError> {
        let repo_id = choice.repo_id();

        if let Some(path) = local_tokenizer_path(repo_id) {
            info!("Loading tokenizer from local file {}", path.display());
            return self.from_path(choice, &path);
        }

        info!("Fetching tokenizer for {} (revision {})", repo_id, self.hub.revision);
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {wide_msg}") {
            spinner.set_style(style);
        }
        spinner.enable_steady_tick(Duration::from_millis(120));

        let fetched = self.fetch(repo_id, &spinner).await;
        spinner.finish_and_clear();

        let path = fetched.inspect_err(|e| warn!("Failed to fetch tokenizer: {}", e))?;
        debug!("Tokenizer file cached at {}", path.display());

        let tokenizer = self.from_path(choice, &path)?;
        info!("Loaded tokenizer for {} with {} entries", repo_id, tokenizer.vocab_size());
        Ok(tokenizer)
    }
}

/// A local `tokenizer.json`, given either directly or as the directory holding it
fn local_tokenizer_path(identifier: &str) -> Option<PathBuf> {
    let path = Path::new(identifier);
    if path.is_file() {
        Some(path.to_path_buf())
    } else if path.is_dir() {
        let candidate = path.join(TOKENIZER_FILE);
        candidate.is_file().then_some(candidate)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hftok-hub-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn loader_with(endpoint: &str, cache_dir: Option<PathBuf>) -> HubLoader {
        HubLoader::new(
            HubConfig {
                endpoint: endpoint.to_string(),
                revision: "main".to_string(),
                token_env: "HF_TOKEN".to_string(),
                cache_dir,
            },
            None,
            true,
        )
    }

    fn loader() -> HubLoader {
        loader_with("https://huggingface.co", None)
    }

    #[tokio::test]
    async fn test_cached_tokenizer_loads_without_network() {
        let cache_dir = scratch_dir("cache");
        let repo_dir = cache_dir.join("models--acme--word-level");
        let snapshot = repo_dir.join("snapshots").join("0123abcd");
        std::fs::create_dir_all(repo_dir.join("refs")).unwrap();
        std::fs::create_dir_all(&snapshot).unwrap();
        std::fs::write(repo_dir.join("refs").join("main"), "0123abcd").unwrap();
        std::fs::write(snapshot.join(TOKENIZER_FILE), WORD_LEVEL_JSON).unwrap();

        // Nothing listens on port 1, so any request would fail
        let loader = loader_with("http://127.0.0.1:1", Some(cache_dir));
        let choice = ModelChoice::Predefined("acme/word-level".to_string());
        let tokenizer = loader.load(&choice).await.unwrap();
        assert_eq!(tokenizer.tokenize("Hello World!").unwrap().ids(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_cache_miss_with_unreachable_hub_is_network_failure() {
        let cache_dir = scratch_dir("empty-cache");
        let loader = loader_with("http://127.0.0.1:1", Some(cache_dir));
        let choice = ModelChoice::Predefined("acme/not-cached".to_string());
        let err = loader.load(&choice).await.err().unwrap();
        assert!(matches!(err, LoadError::NetworkFailure { .. }));
    }

    #[tokio::test]
    async fn test_load_local_file() {
        let dir = scratch_dir("file");
        let path = dir.join("tokenizer.json");
        std::fs::write(&path, WORD_LEVEL_JSON).unwrap();

        let choice = ModelChoice::Custom(path.to_string_lossy().into_owned());
        let tokenizer = loader().load(&choice).await.unwrap();
        assert_eq!(tokenizer.model(), &choice);
        assert_eq!(tokenizer.tokenize("Hello World!").unwrap().tokens(), vec!["Hello", "World", "!"]);
    }

    #[tokio::test]
    async fn test_load_local_directory() {
        let dir = scratch_dir("dir");
        std::fs::write(dir.join(TOKENIZER_FILE), WORD_LEVEL_JSON).unwrap();

        let choice = ModelChoice::Custom(dir.to_string_lossy().into_owned());
        let tokenizer = loader().load(&choice).await.unwrap();
        assert_eq!(tokenizer.tokenize("World").unwrap().ids(), vec![2]);
    }

    #[tokio::test]
    async fn test_malformed_local_file() {
        let dir = scratch_dir("malformed");
        let path = dir.join("tokenizer.json");
        std::fs::write(&path, "{ \"not\": \"a tokenizer\" }").unwrap();

        let choice = ModelChoice::Custom(path.to_string_lossy().into_owned());
        let err = loader().load(&choice).await.err().unwrap();
        assert!(matches!(err, LoadError::Malformed { .. }));
    }

    #[test]
    fn test_auth_message_names_variable() {
        let err = LoadError::AuthRequired {
            repo_id: "meta-llama/Llama-3.1-70B-Instruct".to_string(),
            credential_var: "HF_TOKEN".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("gated"));
        assert!(message.contains("HF_TOKEN"));
    }

    #[test]
    fn test_missing_path_is_not_local() {
        assert!(local_tokenizer_path("some-org/definitely-not-a-local-dir").is_none());
    }
}
