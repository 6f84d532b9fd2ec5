use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use docent_core::rerank::RerankParams;
use docent_core::vocab::{
    builtin_definitional_sources, builtin_noise_triggers, builtin_procedural_sources,
    builtin_technical_terms, Vocabulary,
};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub kb: KbConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub lemmatizer: LemmatizerConfig,
    #[serde(default)]
    pub vocabulary: Option<VocabularyConfig>,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KbConfig {
    /// Directory holding the knowledge-base documents.
    pub dir: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.md".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Nearest chunks fetched per question before reranking.
    #[serde(default = "default_candidate_k")]
    pub candidate_k: usize,
    /// Acceptance ceiling for candidates with technical-term evidence.
    #[serde(default = "default_tech_threshold")]
    pub tech_threshold: f32,
    /// Acceptance ceiling for candidates without it.
    #[serde(default = "default_plain_threshold")]
    pub plain_threshold: f32,
    /// Distance bonus for definitional-tier sources.
    #[serde(default = "default_definitional_bonus")]
    pub definitional_bonus: f32,
    /// Distance bonus for procedural-tier sources.
    #[serde(default = "default_procedural_bonus")]
    pub procedural_bonus: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            candidate_k: default_candidate_k(),
            tech_threshold: default_tech_threshold(),
            plain_threshold: default_plain_threshold(),
            definitional_bonus: default_definitional_bonus(),
            procedural_bonus: default_procedural_bonus(),
        }
    }
}

fn default_candidate_k() -> usize {
    docent_core::engine::DEFAULT_CANDIDATE_K
}
fn default_tech_threshold() -> f32 {
    1.7
}
fn default_plain_threshold() -> f32 {
    1.15
}
fn default_definitional_bonus() -> f32 {
    0.6
}
fn default_procedural_bonus() -> f32 {
    0.3
}

impl RetrievalConfig {
    pub fn rerank_params(&self) -> RerankParams {
        RerankParams {
            tech_threshold: self.tech_threshold,
            plain_threshold: self.plain_threshold,
            definitional_bonus: self.definitional_bonus,
            procedural_bonus: self.procedural_bonus,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    /// Base URL for the Ollama provider.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "disabled".to_string(),
            model: None,
            dims: None,
            url: None,
            batch_size: 64,
            max_retries: 5,
            timeout_secs: 30,
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LemmatizerConfig {
    /// TSV dictionary (`form<TAB>lemma[<TAB>stop]`); absent means the gate
    /// falls back to raw tokens.
    #[serde(default)]
    pub dictionary: Option<PathBuf>,
}

/// Optional vocabulary overrides; omitted fields keep the built-in sets.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct VocabularyConfig {
    #[serde(default)]
    pub technical_terms: Vec<String>,
    #[serde(default)]
    pub noise_triggers: Vec<String>,
    #[serde(default)]
    pub priors: PriorsConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PriorsConfig {
    #[serde(default)]
    pub definitional: Vec<String>,
    #[serde(default)]
    pub procedural: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7878".to_string()
}

impl Config {
    /// Resolve the effective vocabulary: built-in sets, with any non-empty
    /// override from `[vocabulary]` replacing its counterpart wholesale.
    pub fn vocabulary(&self) -> Vocabulary {
        let overrides = self.vocabulary.clone().unwrap_or_default();

        let technical = if overrides.technical_terms.is_empty() {
            builtin_technical_terms()
                .iter()
                .map(|s| s.to_string())
                .collect()
        } else {
            overrides.technical_terms
        };
        let noise = if overrides.noise_triggers.is_empty() {
            builtin_noise_triggers()
                .iter()
                .map(|s| s.to_string())
                .collect()
        } else {
            overrides.noise_triggers
        };
        let no_priors =
            overrides.priors.definitional.is_empty() && overrides.priors.procedural.is_empty();
        let (definitional, procedural) = if no_priors {
            (
                builtin_definitional_sources()
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                builtin_procedural_sources()
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            )
        } else {
            (overrides.priors.definitional, overrides.priors.procedural)
        };

        Vocabulary::new(technical, noise, definitional, procedural)
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate knowledge base
    if config.kb.dir.as_os_str().is_empty() {
        anyhow::bail!("kb.dir must not be empty");
    }
    if config.kb.include_globs.is_empty() {
        anyhow::bail!("kb.include_globs must contain at least one pattern");
    }

    // Validate retrieval
    if config.retrieval.candidate_k == 0 {
        anyhow::bail!("retrieval.candidate_k must be > 0");
    }
    if config.retrieval.tech_threshold <= 0.0 || config.retrieval.plain_threshold <= 0.0 {
        anyhow::bail!("retrieval thresholds must be > 0");
    }
    if config.retrieval.definitional_bonus < 0.0 || config.retrieval.procedural_bonus < 0.0 {
        anyhow::bail!("retrieval bonuses must be >= 0");
    }

    // Validate embedding
    if config.embedding.is_enabled() {
        if config.embedding.dims.is_none() || config.embedding.dims == Some(0) {
            anyhow::bail!(
                "embedding.dims must be > 0 when provider is '{}'",
                config.embedding.provider
            );
        }
        if config.embedding.model.is_none() {
            anyhow::bail!(
                "embedding.model must be specified when provider is '{}'",
                config.embedding.provider
            );
        }
    }

    match config.embedding.provider.as_str() {
        "disabled" | "openai" | "ollama" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be disabled, openai, or ollama.",
            other
        ),
    }

    Ok(config)
}
