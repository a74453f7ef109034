//! Reranking strategy: cross-encoder scoring of the joint (resume, job) pair
//!
//! Unlike the semantic strategy there are no independent embeddings; a BERT
//! sequence classifier attends to both texts together and emits one
//! relevance logit. This is the most expensive strategy per pair.

use crate::config::{Config, FusionWeights};
use crate::error::{MatcherError, Result};
use crate::matching::{build_result, fallback_result, skill_match, validate_pair, Matcher, Strategy};
use crate::models::{Job, MatchResult, Resume};
use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tokenizers::{Tokenizer, TruncationParams};

/// Fixed maximum sequence length for the pair encoding; longer inputs are
/// truncated by the tokenizer.
const MAX_SEQ_LEN: usize = 512;

/// Process-lifetime cross-encoder handle, loaded once on first construction.
static CROSS_ENCODER: OnceLock<Option<Arc<CrossEncoder>>> = OnceLock::new();

fn shared_encoder(model_dir: &Path) -> Option<Arc<CrossEncoder>> {
    CROSS_ENCODER
        .get_or_init(|| match CrossEncoder::load(model_dir) {
            Ok(encoder) => {
                log::info!("Loaded cross-encoder from {}", model_dir.display());
                Some(Arc::new(encoder))
            }
            Err(e) => {
                log::warn!(
                    "Cross-encoder '{}' unavailable, reranking degrades to skill overlap: {}",
                    model_dir.display(),
                    e
                );
                None
            }
        })
        .clone()
}

/// BERT with a single-logit classification head over the [CLS] token.
struct CrossEncoder {
    bert: BertModel,
    classifier: Linear,
    tokenizer: Tokenizer,
    device: Device,
}

impl CrossEncoder {
    fn load(model_dir: &Path) -> Result<Self> {
        let config_path = model_dir.join("config.json");
        let weights_path = model_dir.join("model.safetensors");
        let tokenizer_path = model_dir.join("tokenizer.json");
        for path in [&config_path, &weights_path, &tokenizer_path] {
            if !path.exists() {
                return Err(MatcherError::CrossEncoder(format!(
                    "missing model file: {}",
                    path.display()
                )));
            }
        }

        let config: BertConfig = serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;
        let device = Device::Cpu;
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)?
        };

        let bert = if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
            BertModel::load(vb.pp("bert"), &config)?
        } else {
            BertModel::load(vb.clone(), &config)?
        };
        let classifier = candle_nn::linear(config.hidden_size, 1, vb.pp("classifier"))?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| MatcherError::CrossEncoder(format!("failed to load tokenizer: {}", e)))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQ_LEN,
                ..Default::default()
            }))
            .map_err(|e| {
                MatcherError::CrossEncoder(format!("failed to configure truncation: {}", e))
            })?;

        Ok(Self {
            bert,
            classifier,
            tokenizer,
            device,
        })
    }

    /// Relevance of the pair in [0, 1]: forward pass over the jointly
    /// tokenized texts, classification logit mapped through a sigmoid.
    fn relevance(&self, resume_text: &str, job_text: &str) -> Result<f32> {
        let encoding = self
            .tokenizer
            .encode((resume_text, job_text), true)
            .map_err(|e| MatcherError::CrossEncoder(format!("tokenization failed: {}", e)))?;

        let token_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(encoding.get_type_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask =
            Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let hidden = self
            .bert
            .forward(&token_ids, &type_ids, Some(&attention_mask))?;
        let cls_token = hidden.i((.., 0, ..))?;
        let logit = self
            .classifier
            .forward(&cls_token)?
            .flatten_all()?
            .to_vec1::<f32>()?[0];

        Ok(sigmoid(logit))
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

pub struct RerankerMatcher {
    encoder: Option<Arc<CrossEncoder>>,
    weights: FusionWeights,
}

impl RerankerMatcher {
    pub fn new(config: &Config) -> Self {
        Self {
            encoder: shared_encoder(&config.models.cross_encoder_dir),
            weights: config.scoring.reranking,
        }
    }

    /// Fallback-mode instance that never touches the model directory.
    pub fn stub(config: &Config) -> Self {
        Self {
            encoder: None,
            weights: config.scoring.reranking,
        }
    }
}

impl Matcher for RerankerMatcher {
    fn name(&self) -> &str {
        "Cross-Encoder Matcher"
    }

    fn match_one(&self, resume: &Resume, job: &Job) -> Result<MatchResult> {
        validate_pair(resume, job)?;

        let skill = skill_match(resume, job);

        let Some(encoder) = &self.encoder else {
            return Ok(fallback_result(resume, job, skill, Strategy::Reranking));
        };

        let relevance = match encoder.relevance(&resume.full_text, &job.full_text) {
            Ok(score) => score,
            Err(e) => {
                log::warn!("Cross-encoder scoring failed for '{}': {}", resume.id, e);
                return Ok(fallback_result(resume, job, skill, Strategy::Reranking));
            }
        };

        let overall = self.weights.blend(relevance, skill.score);
        Ok(build_result(
            resume,
            job,
            overall,
            relevance,
            skill,
            Strategy::Reranking.as_str().to_string(),
            String::new(),
        ))
    }
}
