//! DeepSeek chat-completion adapter
//!
//! Translates a provider-agnostic chat request into DeepSeek's
//! OpenAI-compatible HTTP dialect and back. Covers request construction
//! and parameter normalization, incremental SSE stream decoding with
//! per-fragment callbacks, response parsing with cost/usage
//! normalization, cached model-catalog discovery with graceful
//! degradation, and an error taxonomy distinguishing authentication,
//! rate-limit, network, and server failures.
//!
//! # Example
//!
//! ```rust,ignore
//! use deepseek_provider::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), LlmError> {
//!     let config = DeepSeekConfig {
//!         enabled: true,
//!         api_key: std::env::var("DEEPSEEK_API_KEY").unwrap_or_default(),
//!         ..Default::default()
//!     };
//!     let client = DeepSeekClient::new(config);
//!
//!     let request = ChatRequest::new(vec![ChatMessage::user("Hello, DeepSeek!")]);
//!     let response = client.chat(&request).await?;
//!     println!("{}", response.content);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod pricing;
pub mod request;
pub mod response;
pub mod streaming;
pub mod types;

pub use cache::{InMemoryModelCache, ModelCache, NoopModelCache};
pub use client::{ChatProvider, DeepSeekClient};
pub use config::{ConfigOverrides, DeepSeekConfig};
pub use error::LlmError;
pub use types::{ChatMessage, ChatRequest, ChatResponse, MessageRole, ModelInfo, Usage};

/// Common imports for host integrations
pub mod prelude {
    pub use crate::cache::{InMemoryModelCache, ModelCache, NoopModelCache};
    pub use crate::client::{ChatProvider, DeepSeekClient};
    pub use crate::config::{ConfigOverrides, DeepSeekConfig};
    pub use crate::error::LlmError;
    pub use crate::types::{
        ChatMessage, ChatRequest, ChatResponse, MessageRole, ModelInfo, Usage,
    };
}
