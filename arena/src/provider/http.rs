//! HTTP adapters for the supported provider wire formats.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{InvokeOptions, ProviderInvoker};
use crate::error::ProviderError;
use crate::participant::{Participant, ProviderKind};

/// Invoker backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpInvoker {
    client: reqwest::Client,
}

impl HttpInvoker {
    /// Build a client whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::new(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// Fully described request for one provider call.
#[derive(Debug)]
struct WireRequest {
    url: String,
    headers: Vec<(&'static str, String)>,
    body: Value,
}

fn build_request(participant: &Participant, prompt: &str, options: &InvokeOptions) -> WireRequest {
    let base = participant.base_url.trim_end_matches('/');
    match participant.provider {
        ProviderKind::Openai => WireRequest {
            url: format!("{}/chat/completions", base),
            headers: vec![(
                "Authorization",
                format!("Bearer {}", participant.api_key),
            )],
            body: json!({
                "model": participant.model,
                "messages": [{"role": "user", "content": prompt}],
                "temperature": options.temperature,
                "max_tokens": options.max_tokens,
            }),
        },
        ProviderKind::Anthropic => WireRequest {
            url: format!("{}/v1/messages", base),
            headers: vec![
                ("x-api-key", participant.api_key.clone()),
                ("anthropic-version", "2023-06-01".to_string()),
            ],
            body: json!({
                "model": participant.model,
                "max_tokens": options.max_tokens,
                "temperature": options.temperature,
                "messages": [{"role": "user", "content": prompt}],
            }),
        },
        ProviderKind::Google => WireRequest {
            url: format!(
                "{}/models/{}:generateContent?key={}",
                base, participant.model, participant.api_key
            ),
            headers: Vec::new(),
            body: json!({
                "contents": [{"parts": [{"text": prompt}]}],
                "generationConfig": {
                    "temperature": options.temperature,
                    "maxOutputTokens": options.max_tokens,
                },
            }),
        },
        ProviderKind::Dashscope => WireRequest {
            url: format!("{}/services/aigc/text-generation/generation", base),
            headers: vec![(
                "Authorization",
                format!("Bearer {}", participant.api_key),
            )],
            body: json!({
                "model": participant.model,
                "input": {"messages": [{"role": "user", "content": prompt}]},
                "parameters": {
                    "temperature": options.temperature,
                    "max_tokens": options.max_tokens,
                },
            }),
        },
    }
}

/// Pull the generated text out of a successful response body.
fn extract_text(provider: ProviderKind, body: &Value) -> Option<String> {
    let text = match provider {
        ProviderKind::Openai => &body["choices"][0]["message"]["content"],
        ProviderKind::Anthropic => &body["content"][0]["text"],
        ProviderKind::Google => &body["candidates"][0]["content"]["parts"][0]["text"],
        ProviderKind::Dashscope => &body["output"]["text"],
    };
    text.as_str().map(str::to_string)
}

#[async_trait]
impl ProviderInvoker for HttpInvoker {
    async fn invoke(
        &self,
        participant: &Participant,
        prompt: &str,
        options: &InvokeOptions,
    ) -> Result<String, ProviderError> {
        let start = Instant::now();
        let request = build_request(participant, prompt, options);

        let mut builder = self.client.post(&request.url).json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProviderError::new(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::with_status(
                status.as_u16(),
                format!("{} API error: {}", participant.provider, body),
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::new(format!("invalid response body: {}", e)))?;

        let text = extract_text(participant.provider, &body).ok_or_else(|| {
            ProviderError::new(format!(
                "malformed {} response: no generated text",
                participant.provider
            ))
        })?;

        debug!(
            participant = %participant.name,
            provider = %participant.provider,
            elapsed_ms = start.elapsed().as_millis() as u64,
            chars = text.len(),
            "Provider call complete"
        );

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(kind: ProviderKind) -> Participant {
        Participant::new("p", kind, "model-x", "key-123").with_base_url("http://host/api")
    }

    #[test]
    fn test_openai_request_shape() {
        let req = build_request(&participant(ProviderKind::Openai), "hi", &InvokeOptions::default());
        assert_eq!(req.url, "http://host/api/chat/completions");
        assert_eq!(req.headers[0], ("Authorization", "Bearer key-123".to_string()));
        assert_eq!(req.body["messages"][0]["content"], "hi");
        assert_eq!(req.body["max_tokens"], 2000);
    }

    #[test]
    fn test_anthropic_request_shape() {
        let req = build_request(
            &participant(ProviderKind::Anthropic),
            "hi",
            &InvokeOptions::default(),
        );
        assert_eq!(req.url, "http://host/api/v1/messages");
        assert!(req
            .headers
            .contains(&("anthropic-version", "2023-06-01".to_string())));
        assert!(req.headers.contains(&("x-api-key", "key-123".to_string())));
    }

    #[test]
    fn test_google_request_puts_key_in_query() {
        let req = build_request(&participant(ProviderKind::Google), "hi", &InvokeOptions::default());
        assert_eq!(
            req.url,
            "http://host/api/models/model-x:generateContent?key=key-123"
        );
        assert!(req.headers.is_empty());
        assert_eq!(req.body["contents"][0]["parts"][0]["text"], "hi");
    }

    #[test]
    fn test_dashscope_request_shape() {
        let options = InvokeOptions {
            temperature: 0.2,
            max_tokens: 64,
        };
        let req = build_request(&participant(ProviderKind::Dashscope), "hi", &options);
        assert_eq!(
            req.url,
            "http://host/api/services/aigc/text-generation/generation"
        );
        assert_eq!(req.body["parameters"]["max_tokens"], 64);
    }

    #[test]
    fn test_extract_text_per_provider() {
        let openai = json!({"choices": [{"message": {"content": "a"}}]});
        let anthropic = json!({"content": [{"text": "b"}]});
        let google = json!({"candidates": [{"content": {"parts": [{"text": "c"}]}}]});
        let dashscope = json!({"output": {"text": "d"}});

        assert_eq!(extract_text(ProviderKind::Openai, &openai).as_deref(), Some("a"));
        assert_eq!(extract_text(ProviderKind::Anthropic, &anthropic).as_deref(), Some("b"));
        assert_eq!(extract_text(ProviderKind::Google, &google).as_deref(), Some("c"));
        assert_eq!(extract_text(ProviderKind::Dashscope, &dashscope).as_deref(), Some("d"));
        assert_eq!(extract_text(ProviderKind::Openai, &dashscope), None);
    }
}
