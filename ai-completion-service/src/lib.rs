//! Chat-completion client for the hosted Azure OpenAI deployment.
//!
//! Public API:
//! - `services::azure_open_ai_service::AzureOpenAiService`: retry-wrapped,
//!   non-streaming chat completion.
//! - `health_service`: dependency snapshots and the DNS-only reachability
//!   probe for the `/health` endpoint.

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod services;

pub use config::completion_config::CompletionConfig;
pub use error_handler::AiCompletionError;
pub use services::azure_open_ai_service::{AzureOpenAiService, ChatMessage, CompletionOutcome};
