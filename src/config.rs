//! Configuration management for the resume matcher

use crate::error::{MatcherError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub scoring: ScoringConfig,
    pub lexical: LexicalConfig,
    pub generative: GenerativeConfig,
    pub comparison: ComparisonConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    /// Model2Vec repo id or local model folder for the semantic strategy.
    pub embedding_model: String,
    /// Local folder holding config.json, model.safetensors and tokenizer.json
    /// for the cross-encoder.
    pub cross_encoder_dir: PathBuf,
    /// JSON artifact (vocabulary + logistic regression weights) for the
    /// supervised strategy.
    pub classifier_path: PathBuf,
    /// Resume-set size above which the semantic batch path pre-filters to a
    /// shortlist before exact scoring.
    pub shortlist_threshold: usize,
}

/// Fusion weights blending a strategy-specific similarity with the
/// skill-overlap score. Defaults are fixed design constants; overridable
/// through the config file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FusionWeights {
    pub similarity: f32,
    pub skills: f32,
}

impl FusionWeights {
    pub const fn new(similarity: f32, skills: f32) -> Self {
        Self { similarity, skills }
    }

    pub fn blend(&self, similarity: f32, skills: f32) -> f32 {
        (self.similarity * similarity + self.skills * skills).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub semantic: FusionWeights,
    pub lexical: FusionWeights,
    pub supervised: FusionWeights,
    pub reranking: FusionWeights,
    pub generative: FusionWeights,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalConfig {
    /// Vocabulary cap for the TF-IDF vectorizer.
    pub max_features: usize,
    pub stop_words: StopWordsMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopWordsMode {
    /// Detect the text language and apply English stop words only for
    /// English text.
    Auto,
    English,
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerativeConfig {
    /// OpenAI-style chat-completions endpoint base URL.
    pub base_url: String,
    pub model: String,
    /// Explicit API key; falls back to OPENAI_API_KEY when unset.
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Retries on transient failure before falling back.
    pub max_retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonConfig {
    /// Sample variance below this bucket as high agreement.
    pub high_agreement_variance: f32,
    /// Sample variance below this (and above the high bound) buckets as
    /// medium agreement.
    pub medium_agreement_variance: f32,
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".resume-matcher")
            .join("models");

        Self {
            models: ModelConfig {
                embedding_model: "minishlab/M2V_base_output".to_string(),
                cross_encoder_dir: models_dir.join("ms-marco-MiniLM-L-6-v2"),
                classifier_path: models_dir.join("tfidf_classifier.json"),
                shortlist_threshold: 50,
                models_dir,
            },
            scoring: ScoringConfig {
                semantic: FusionWeights::new(0.6, 0.4),
                lexical: FusionWeights::new(0.5, 0.5),
                supervised: FusionWeights::new(0.6, 0.4),
                reranking: FusionWeights::new(0.7, 0.3),
                generative: FusionWeights::new(0.7, 0.3),
            },
            lexical: LexicalConfig {
                max_features: 500,
                stop_words: StopWordsMode::Auto,
            },
            generative: GenerativeConfig {
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-4o".to_string(),
                api_key: None,
                timeout_secs: 15,
                max_retries: 1,
            },
            comparison: ComparisonConfig {
                high_agreement_variance: 0.01,
                medium_agreement_variance: 0.05,
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &PathBuf) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content).map_err(|e| {
                MatcherError::Configuration(format!("Failed to parse config: {}", e))
            })?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            MatcherError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(&config_path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-matcher")
            .join("config.toml")
    }

    /// API key for the generative backend: explicit config value first,
    /// then the OPENAI_API_KEY environment variable.
    pub fn generative_api_key(&self) -> Option<String> {
        self.generative
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_are_the_documented_constants() {
        let config = Config::default();
        assert_eq!(config.scoring.semantic.similarity, 0.6);
        assert_eq!(config.scoring.semantic.skills, 0.4);
        assert_eq!(config.scoring.lexical.similarity, 0.5);
        assert_eq!(config.scoring.generative.similarity, 0.7);
        assert_eq!(config.scoring.reranking.skills, 0.3);
    }

    #[test]
    fn blend_clamps_into_unit_interval() {
        let weights = FusionWeights::new(0.8, 0.8);
        assert_eq!(weights.blend(1.0, 1.0), 1.0);
        assert_eq!(weights.blend(0.0, 0.0), 0.0);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let restored: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(
            restored.scoring.supervised.similarity,
            config.scoring.supervised.similarity
        );
        assert_eq!(restored.generative.timeout_secs, 15);
    }
}
