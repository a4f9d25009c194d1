//! Configuration management for askdoc.
//!
//! Configuration is merged from multiple sources, in increasing
//! precedence:
//! - Built-in defaults
//! - Config file (`<workspace>/.askdoc/config.yaml`)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is workspace-centric: the index and config both live
//! under `<workspace>/.askdoc/`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .askdoc/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// LLM provider (e.g., "ollama")
    pub provider: String,

    /// Completion model identifier
    pub model: String,

    /// Provider endpoint URL override
    pub endpoint: Option<String>,

    /// Embedding settings
    pub embedding: EmbeddingSettings,

    /// Retrieval and batch settings
    pub retrieval: RetrievalSettings,

    /// Ingestion settings
    pub ingest: IngestSettings,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Embedding provider ("trigram" or "ollama")
    pub provider: String,

    /// Embedding model identifier (ignored by the trigram provider)
    pub model: String,

    /// Embedding vector dimension
    #[serde(default = "default_embedding_dim")]
    pub dimensions: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: default_embedding_dim(),
        }
    }
}

/// Retrieval and batch orchestration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalSettings {
    /// Number of passages retrieved per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Maximum concurrent workflow sessions in a batch
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            parallelism: default_parallelism(),
        }
    }
}

/// Ingestion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSettings {
    /// Chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_embedding_dim() -> usize {
    384
}

fn default_top_k() -> usize {
    4
}

fn default_parallelism() -> usize {
    4
}

fn default_chunk_size() -> usize {
    300
}

fn default_chunk_overlap() -> usize {
    60
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    embedding: Option<EmbeddingSettings>,
    retrieval: Option<RetrievalSettings>,
    ingest: Option<IngestSettings>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            endpoint: None,
            embedding: EmbeddingSettings::default(),
            retrieval: RetrievalSettings::default(),
            ingest: IngestSettings::default(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and environment variables.
    ///
    /// Environment variables:
    /// - `ASKDOC_WORKSPACE`: Override workspace path
    /// - `ASKDOC_CONFIG`: Path to config file
    /// - `ASKDOC_PROVIDER`: LLM provider
    /// - `ASKDOC_MODEL`: Model identifier
    /// - `ASKDOC_ENDPOINT`: Provider endpoint URL
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("ASKDOC_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("ASKDOC_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = if let Some(ref cf) = config.config_file {
            cf.clone()
        } else {
            config.workspace.join(".askdoc/config.yaml")
        };

        if config_path.exists() {
            tracing::debug!("Merging config file {:?}", config_path);
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override the config file
        if let Ok(provider) = std::env::var("ASKDOC_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("ASKDOC_MODEL") {
            config.model = model;
        }

        if let Ok(endpoint) = std::env::var("ASKDOC_ENDPOINT") {
            config.endpoint = Some(endpoint);
        }

        if config.log_level.is_none() {
            config.log_level = std::env::var("RUST_LOG").ok();
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if llm.endpoint.is_some() {
                result.endpoint = llm.endpoint;
            }
        }

        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }

        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }

        if let Some(ingest) = config_file.ingest {
            result.ingest = ingest;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over both the config file and
    /// environment variables.
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .askdoc directory.
    pub fn askdoc_dir(&self) -> PathBuf {
        self.workspace.join(".askdoc")
    }

    /// Get the path to the document index directory.
    pub fn index_dir(&self) -> PathBuf {
        self.askdoc_dir().join("index")
    }

    /// Ensure the .askdoc directory exists.
    pub fn ensure_askdoc_dir(&self) -> AppResult<()> {
        let dir = self.askdoc_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create .askdoc directory: {}", e))
            })?;
        }
        Ok(())
    }
}
