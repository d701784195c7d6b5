//! OpenRouter API client for chat completions

pub mod client;
pub mod types;

pub use client::{OpenRouterClient, RetryPolicy, DEFAULT_BASE_URL};
pub use types::*;
