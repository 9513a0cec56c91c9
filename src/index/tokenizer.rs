//! Text normalization backends
//!
//! The external backend runs a normalization program that reads a JSON array
//! of words on stdin and prints either a JSON array of tokens or an object
//! with a `result` field holding that array. The in-process backend lowercases
//! and strips punctuation. `TokenizerAdapter` always produces tokens: any
//! failure of the configured backend degrades to the in-process routine.

use crate::config::TokenizerConfig;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{P}").expect("valid regex"));

/// Errors raised by a tokenizer backend
#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("Failed to start tokenizer `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("Tokenizer I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tokenizer exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },

    #[error("Tokenizer timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unparsable tokenizer output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Capability that turns raw words into normalized tokens
#[async_trait]
pub trait Tokenizer: Send + Sync {
    async fn normalize(&self, words: Vec<String>) -> Result<Vec<String>, TokenizerError>;
}

/// Removes every Unicode punctuation character from `word`
pub fn strip_punctuation(word: &str) -> String {
    PUNCTUATION.replace_all(word, "").into_owned()
}

/// Lowercases and strips punctuation from every word, keeping order
///
/// Words that are empty after stripping are dropped. Applying this twice is
/// the same as applying it once.
pub fn local_normalize(words: &[String]) -> Vec<String> {
    words
        .iter()
        .map(|word| strip_punctuation(&word.to_lowercase()))
        .filter(|token| !token.is_empty())
        .collect()
}

/// In-process normalizer; never fails
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTokenizer;

#[async_trait]
impl Tokenizer for LocalTokenizer {
    async fn normalize(&self, words: Vec<String>) -> Result<Vec<String>, TokenizerError> {
        Ok(local_normalize(&words))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TokenizerOutput {
    Tokens(Vec<String>),
    Wrapped { result: Vec<String> },
}

/// Parses tokenizer stdout as a JSON array or a `{"result": [...]}` object
pub fn parse_tokenizer_output(stdout: &[u8]) -> Result<Vec<String>, TokenizerError> {
    let text = String::from_utf8_lossy(stdout);
    let output: TokenizerOutput = serde_json::from_str(text.trim())?;
    Ok(match output {
        TokenizerOutput::Tokens(tokens) => tokens,
        TokenizerOutput::Wrapped { result } => result,
    })
}

/// Normalizer backed by an external program
#[derive(Debug, Clone)]
pub struct ExternalTokenizer {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ExternalTokenizer {
    pub fn new(command: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            args,
            timeout,
        }
    }

    async fn run(&self, input: Vec<u8>) -> Result<Vec<String>, TokenizerError> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TokenizerError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        // stdin is fed while stdout is drained; dropping it at the end of the
        // write signals end of input
        let stdin = child.stdin.take();
        let feed = async move {
            let Some(mut stdin) = stdin else {
                return Ok(());
            };
            match stdin.write_all(&input).await {
                // The program may exit without consuming its input
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
                other => other,
            }
        };

        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;
        if !output.status.success() {
            return Err(TokenizerError::Exit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        fed?;

        parse_tokenizer_output(&output.stdout)
    }
}

#[async_trait]
impl Tokenizer for ExternalTokenizer {
    async fn normalize(&self, words: Vec<String>) -> Result<Vec<String>, TokenizerError> {
        let input = serde_json::to_vec(&words)?;
        match tokio::time::timeout(self.timeout, self.run(input)).await {
            Ok(result) => result,
            Err(_) => Err(TokenizerError::Timeout(self.timeout)),
        }
    }
}

/// Tokenizer front end used by indexing and search
///
/// Wraps the configured backend and falls back to [`local_normalize`] when it
/// fails, so callers never block or error on normalization.
#[derive(Clone)]
pub struct TokenizerAdapter {
    backend: Arc<dyn Tokenizer>,
}

impl Default for TokenizerAdapter {
    fn default() -> Self {
        Self::new(Arc::new(LocalTokenizer))
    }
}

impl TokenizerAdapter {
    pub fn new(backend: Arc<dyn Tokenizer>) -> Self {
        Self { backend }
    }

    /// Builds the adapter from configuration
    ///
    /// Without a configured command the in-process normalizer is used.
    pub fn from_config(config: &TokenizerConfig) -> Self {
        match &config.command {
            Some(command) => Self::new(Arc::new(ExternalTokenizer::new(
                command.clone(),
                config.args.clone(),
                Duration::from_secs(config.timeout_secs),
            ))),
            None => Self::default(),
        }
    }

    /// Normalizes `words`, degrading to the local routine on failure
    pub async fn normalize(&self, words: Vec<String>) -> Vec<String> {
        if words.is_empty() {
            return Vec::new();
        }

        let fallback = local_normalize(&words);
        match self.backend.normalize(words).await {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::warn!("Tokenizer unavailable, using local normalization: {}", e);
                fallback
            }
        }
    }
}
