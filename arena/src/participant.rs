//! Tournament participants.

use serde::{Deserialize, Serialize};

/// Wire format family a participant is reached through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// OpenAI-compatible chat completions
    Openai,
    /// Anthropic messages API
    Anthropic,
    /// Google Gemini generateContent
    Google,
    /// Alibaba DashScope text generation
    Dashscope,
}

impl ProviderKind {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Openai => "https://api.openai.com/v1",
            Self::Anthropic => "https://api.anthropic.com",
            Self::Google => "https://generativelanguage.googleapis.com/v1beta",
            Self::Dashscope => "https://dashscope.aliyuncs.com/api/v1",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Openai => write!(f, "openai"),
            Self::Anthropic => write!(f, "anthropic"),
            Self::Google => write!(f, "google"),
            Self::Dashscope => write!(f, "dashscope"),
        }
    }
}

/// A model taking part in the tournament.
///
/// Immutable for the duration of a run. Everything downstream of the
/// orchestrator refers to participants by `name`.
#[derive(Clone, Serialize, Deserialize)]
pub struct Participant {
    /// Unique display name within a run
    pub name: String,
    pub provider: ProviderKind,
    /// Model identifier sent to the provider
    pub model: String,
    pub base_url: String,
    #[serde(default, skip_serializing)]
    pub api_key: String,
}

impl Participant {
    pub fn new(
        name: impl Into<String>,
        provider: ProviderKind,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            provider,
            model: model.into(),
            base_url: provider.default_base_url().to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

// Keys never reach logs.
impl std::fmt::Debug for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Participant")
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_display() {
        assert_eq!(ProviderKind::Openai.to_string(), "openai");
        assert_eq!(ProviderKind::Anthropic.to_string(), "anthropic");
        assert_eq!(ProviderKind::Google.to_string(), "google");
        assert_eq!(ProviderKind::Dashscope.to_string(), "dashscope");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let p = Participant::new("gpt", ProviderKind::Openai, "gpt-4o", "sk-test")
            .with_base_url("http://localhost:8080/v1/");
        assert_eq!(p.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn test_debug_hides_api_key() {
        let p = Participant::new("claude", ProviderKind::Anthropic, "claude-3", "secret-key");
        let dbg = format!("{:?}", p);
        assert!(dbg.contains("claude"));
        assert!(!dbg.contains("secret-key"));
    }

    #[test]
    fn test_provider_kind_deserialize() {
        let kind: ProviderKind = serde_json::from_str("\"dashscope\"").unwrap();
        assert_eq!(kind, ProviderKind::Dashscope);
    }
}
