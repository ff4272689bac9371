//! Arena configuration: participants, scoring and question supply.
//!
//! Loaded from TOML, or from JSON when the file ends in `.json` (the
//! `config.json` layout with `models` and `competition_settings`).
//! API keys can be supplied through `ARENA_<NAME>_API_KEY` instead of the
//! file, where `<NAME>` is the model name upper-cased with every other
//! character replaced by `_`.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use arena::{
    Difficulty, InvokeOptions, JudgeFormat, Locale, Participant, PointTable, ProviderKind,
    TournamentSettings, MIN_PARTICIPANTS,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Problems found by [`ArenaConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("min_models must be at least {min}, got {0}", min = MIN_PARTICIPANTS)]
    MinModelsTooLow(usize),

    #[error("scoring must not reward a lower place more than a higher one: {0:?}")]
    PointTableNotMonotonic(PointTable),

    #[error("timeout_secs must be positive")]
    ZeroTimeout,

    #[error("model entry {index} has an empty {field}")]
    EmptyField { index: usize, field: &'static str },

    #[error("duplicate model name: {0}")]
    DuplicateModel(String),

    #[error("question_generation.count must be positive")]
    ZeroQuestionCount,
}

/// One configured model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    pub provider: ProviderKind,
    pub model: String,
    #[serde(default)]
    pub api_key: String,
    /// Provider default when absent
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ModelConfig {
    /// Name of the environment variable that overrides this model's key.
    pub fn env_key_var(&self) -> String {
        let normalized: String = self
            .name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("ARENA_{}_API_KEY", normalized)
    }

    /// Empty keys and template values such as `your_openai_api_key`.
    pub fn has_placeholder_key(&self) -> bool {
        let key = self.api_key.trim();
        key.is_empty()
            || key.starts_with("your_")
            || key.starts_with("your-")
            || (key.starts_with('<') && key.ends_with('>'))
    }

    pub fn to_participant(&self) -> Participant {
        let participant =
            Participant::new(&self.name, self.provider, &self.model, self.api_key.trim());
        match &self.base_url {
            Some(url) if !url.trim().is_empty() => participant.with_base_url(url.trim()),
            _ => participant,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionGeneration {
    /// Ask the first participant to write the questions
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_question_count")]
    pub count: usize,
    #[serde(default = "default_difficulty")]
    pub difficulty: Difficulty,
    /// Restricts bank sampling too; empty means every topic
    #[serde(default)]
    pub topics: Vec<String>,
}

impl Default for QuestionGeneration {
    fn default() -> Self {
        Self {
            enabled: false,
            count: default_question_count(),
            difficulty: default_difficulty(),
            topics: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitionSettings {
    #[serde(default = "default_min_models")]
    pub min_models: usize,
    #[serde(default)]
    pub scoring: PointTable,
    #[serde(default)]
    pub question_generation: QuestionGeneration,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub locale: Locale,
    #[serde(default)]
    pub judge_format: JudgeFormat,
}

impl Default for CompetitionSettings {
    fn default() -> Self {
        Self {
            min_models: default_min_models(),
            scoring: PointTable::default(),
            question_generation: QuestionGeneration::default(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            locale: Locale::default(),
            judge_format: JudgeFormat::default(),
        }
    }
}

fn default_min_models() -> usize {
    MIN_PARTICIPANTS
}

fn default_question_count() -> usize {
    5
}

fn default_difficulty() -> Difficulty {
    Difficulty::Medium
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f32 {
    InvokeOptions::default().temperature
}

fn default_max_tokens() -> u32 {
    InvokeOptions::default().max_tokens
}

/// Top-level arena configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaConfig {
    pub models: Vec<ModelConfig>,
    #[serde(default)]
    pub competition_settings: CompetitionSettings,
}

impl ArenaConfig {
    /// Read, parse and apply environment key overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let mut config = if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&raw)
        } else {
            Self::from_toml(&raw)
        }
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.apply_key_overrides(|var| std::env::var(var).ok());
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("invalid TOML config")
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("invalid JSON config")
    }

    /// Replace keys with values found by `lookup`, keyed by [`ModelConfig::env_key_var`].
    pub fn apply_key_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for model in &mut self.models {
            if let Some(key) = lookup(&model.env_key_var()).filter(|k| !k.trim().is_empty()) {
                model.api_key = key;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let settings = &self.competition_settings;
        if settings.min_models < MIN_PARTICIPANTS {
            return Err(ConfigError::MinModelsTooLow(settings.min_models));
        }
        if !settings.scoring.is_monotonic() {
            return Err(ConfigError::PointTableNotMonotonic(settings.scoring));
        }
        if settings.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if settings.question_generation.count == 0 {
            return Err(ConfigError::ZeroQuestionCount);
        }

        let mut seen: Vec<&str> = Vec::with_capacity(self.models.len());
        for (index, model) in self.models.iter().enumerate() {
            if model.name.trim().is_empty() {
                return Err(ConfigError::EmptyField { index, field: "name" });
            }
            if model.model.trim().is_empty() {
                return Err(ConfigError::EmptyField { index, field: "model" });
            }
            if seen.contains(&model.name.as_str()) {
                return Err(ConfigError::DuplicateModel(model.name.clone()));
            }
            seen.push(&model.name);
        }
        Ok(())
    }

    /// Models with a usable key, in configuration order.
    pub fn participants(&self) -> Vec<Participant> {
        self.models
            .iter()
            .filter(|m| {
                let usable = !m.has_placeholder_key();
                if !usable {
                    warn!(
                        model = %m.name,
                        env = %m.env_key_var(),
                        "Skipping model without a usable API key"
                    );
                }
                usable
            })
            .map(ModelConfig::to_participant)
            .collect()
    }

    pub fn tournament_settings(&self, seed: Option<u64>) -> TournamentSettings {
        let settings = &self.competition_settings;
        TournamentSettings {
            min_participants: settings.min_models,
            points: settings.scoring,
            timeout: Duration::from_secs(settings.timeout_secs),
            options: InvokeOptions {
                temperature: settings.temperature,
                max_tokens: settings.max_tokens,
            },
            locale: settings.locale,
            judge_format: settings.judge_format,
            seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TOML: &str = r#"
[[models]]
name = "gpt-4o"
provider = "openai"
model = "gpt-4o"
api_key = "sk-live"

[[models]]
name = "claude"
provider = "anthropic"
model = "claude-3-5-sonnet"
api_key = "your_anthropic_api_key"

[[models]]
name = "qwen"
provider = "dashscope"
model = "qwen-max"
api_key = "dsk"
base_url = "https://proxy.example/api/"

[competition_settings]
min_models = 3
timeout_secs = 30
locale = "en"
judge_format = "free_text"

[competition_settings.scoring]
first_place = 5
second_place = 3
third_place = 1
"#;

    #[test]
    fn test_toml_parses_with_defaults() {
        let config = ArenaConfig::from_toml(SAMPLE_TOML).unwrap();
        let settings = &config.competition_settings;
        assert_eq!(config.models.len(), 3);
        assert_eq!(settings.scoring.first_place, 5);
        assert_eq!(settings.scoring.other_place, 0);
        assert_eq!(settings.locale, Locale::En);
        assert_eq!(settings.judge_format, JudgeFormat::FreeText);
        assert_eq!(settings.question_generation.count, 5);
        assert!(!settings.question_generation.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_placeholder_keys_are_skipped() {
        let config = ArenaConfig::from_toml(SAMPLE_TOML).unwrap();
        let names: Vec<String> = config.participants().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["gpt-4o".to_string(), "qwen".to_string()]);
    }

    #[test]
    fn test_base_url_override_trimmed() {
        let config = ArenaConfig::from_toml(SAMPLE_TOML).unwrap();
        let qwen = config
            .participants()
            .into_iter()
            .find(|p| p.name == "qwen")
            .unwrap();
        assert_eq!(qwen.base_url, "https://proxy.example/api");
        let gpt = config.models[0].to_participant();
        assert_eq!(gpt.base_url, ProviderKind::Openai.default_base_url());
    }

    #[test]
    fn test_env_key_override() {
        let mut config = ArenaConfig::from_toml(SAMPLE_TOML).unwrap();
        assert_eq!(config.models[1].env_key_var(), "ARENA_CLAUDE_API_KEY");
        assert_eq!(config.models[0].env_key_var(), "ARENA_GPT_4O_API_KEY");

        config.apply_key_overrides(|var| match var {
            "ARENA_CLAUDE_API_KEY" => Some("sk-ant".to_string()),
            "ARENA_QWEN_API_KEY" => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(config.models[1].api_key, "sk-ant");
        assert_eq!(config.models[2].api_key, "dsk");
        assert_eq!(config.participants().len(), 3);
    }

    #[test]
    fn test_json_layout() {
        let raw = r#"{
            "models": [
                {"name": "A", "provider": "openai", "model": "m", "api_key": "k", "base_url": "https://a/v1"},
                {"name": "B", "provider": "google", "model": "gemini-pro", "api_key": "k"}
            ],
            "competition_settings": {
                "min_models": 4,
                "scoring": {"first_place": 3, "second_place": 2, "third_place": 1},
                "question_generation": {"enabled": true, "count": 2, "difficulty": "hard", "topics": ["技术"]}
            }
        }"#;
        let config = ArenaConfig::from_json(raw).unwrap();
        let generation = &config.competition_settings.question_generation;
        assert!(generation.enabled);
        assert_eq!(generation.difficulty, Difficulty::Hard);
        assert_eq!(generation.topics, vec!["技术".to_string()]);

        let settings = config.tournament_settings(Some(9));
        assert_eq!(settings.min_participants, 4);
        assert_eq!(settings.timeout, Duration::from_secs(60));
        assert_eq!(settings.seed, Some(9));
        assert_eq!(settings.locale, Locale::Zh);
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let mut config = ArenaConfig::from_toml(SAMPLE_TOML).unwrap();
        config.competition_settings.min_models = 2;
        assert_eq!(config.validate(), Err(ConfigError::MinModelsTooLow(2)));

        let mut config = ArenaConfig::from_toml(SAMPLE_TOML).unwrap();
        config.competition_settings.scoring.second_place = 9;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PointTableNotMonotonic(_))
        ));

        let mut config = ArenaConfig::from_toml(SAMPLE_TOML).unwrap();
        config.competition_settings.timeout_secs = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout));

        let mut config = ArenaConfig::from_toml(SAMPLE_TOML).unwrap();
        config.models[2].name = "gpt-4o".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateModel("gpt-4o".to_string()))
        );

        let mut config = ArenaConfig::from_toml(SAMPLE_TOML).unwrap();
        config.models[0].model = " ".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyField { index: 0, field: "model" })
        );
    }

    #[test]
    fn test_debug_hides_keys() {
        let config = ArenaConfig::from_toml(SAMPLE_TOML).unwrap();
        let rendered = format!("{:?}", config.participants());
        assert!(!rendered.contains("sk-live"));
    }
}
