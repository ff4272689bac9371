//! Provider invocation seam.
//!
//! The core only ever sees [`ProviderInvoker`]: one prompt in, one text out,
//! or a [`ProviderError`]. Every provider failure is treated the same way
//! regardless of which wire format produced it.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::participant::Participant;

pub use http::HttpInvoker;

/// Sampling options forwarded to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvokeOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

/// A single request/response call to a participant's model.
#[async_trait]
pub trait ProviderInvoker: Send + Sync {
    async fn invoke(
        &self,
        participant: &Participant,
        prompt: &str,
        options: &InvokeOptions,
    ) -> Result<String, ProviderError>;
}
