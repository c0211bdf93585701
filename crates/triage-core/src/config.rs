use crate::errors::{TriageError, TriageResult};
use crate::model::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const MODEL_ENV: &str = "TRIAGE_MODEL";

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TriageConfig {
    pub model: ModelConfig,
    pub judge: JudgeConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// `provider:model`, e.g. `openai:gpt-4o`.
    pub spec: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            spec: "openai:gpt-4o".to_string(),
            temperature: 0.0,
            max_tokens: 512,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct JudgeConfig {
    /// Minimum similarity score that counts as a pass.
    pub pass_threshold: u8,

    /// Tell the judge model that candidate text is data, not instructions.
    pub hijack_defense: bool,

    /// Per-category replacements for the built-in reference examples.
    pub examples: BTreeMap<Category, Vec<String>>,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            pass_threshold: 70,
            hijack_defense: true,
            examples: BTreeMap::new(),
        }
    }
}

impl TriageConfig {
    pub fn load(path: &Path) -> TriageResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            TriageError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let mut cfg = Self::from_yaml_str(&raw)?;
        cfg.apply_env();
        tracing::debug!(path = %path.display(), model = %cfg.model.spec, "config loaded");
        Ok(cfg)
    }

    pub fn from_yaml_str(raw: &str) -> TriageResult<Self> {
        let cfg: Self = serde_yaml::from_str(raw)
            .map_err(|e| TriageError::Config(format!("invalid config: {}", e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn apply_env(&mut self) {
        if let Ok(spec) = std::env::var(MODEL_ENV) {
            if !spec.trim().is_empty() {
                self.model.spec = spec.trim().to_string();
            }
        }
    }

    pub fn validate(&self) -> TriageResult<()> {
        let t = self.judge.pass_threshold;
        if t == 0 || t >= 100 {
            return Err(TriageError::Config(format!(
                "judge.pass_threshold must be within 1..=99, got {}",
                t
            )));
        }
        if self.model.max_tokens == 0 {
            return Err(TriageError::Config("model.max_tokens must be > 0".into()));
        }
        crate::judge::ReferenceExamples::defaults().with_overrides(&self.judge.examples)?;
        Ok(())
    }
}
