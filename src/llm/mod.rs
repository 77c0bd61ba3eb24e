//! Model-client capability and its concrete implementations.
//!
//! The dispatcher talks to language models through [`ModelClient`] and
//! builds clients through [`ClientFactory`], so front ends and tests can
//! substitute their own. [`ProviderClientFactory`] is the production
//! factory, dispatching on the descriptor's [`ProviderKind`] tag.

pub mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;

use crate::catalog::{ModelDescriptor, ProviderKind};
use crate::error::Result;

/// One-shot request/response capability against a language model.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send a prompt and return the model's text completion.
    async fn invoke(&self, prompt: &str) -> Result<String>;
}

/// Builds a [`ModelClient`] from a descriptor and a resolved credential.
pub trait ClientFactory: Send + Sync {
    fn build(&self, descriptor: &ModelDescriptor, credential: &str) -> Box<dyn ModelClient>;
}

/// Production factory selecting the client by provider kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderClientFactory;

impl ClientFactory for ProviderClientFactory {
    fn build(&self, descriptor: &ModelDescriptor, credential: &str) -> Box<dyn ModelClient> {
        match descriptor.kind {
            ProviderKind::Gemini => {
                Box::new(GeminiClient::new(credential, None, &descriptor.api_model_id))
            }
        }
    }
}
