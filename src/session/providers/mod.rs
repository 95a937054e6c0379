// Copyright 2025 Muvon Un Limited
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Provider abstraction layer for the completion service

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod openai;

pub use openai::OpenAiProvider;

/// Token usage reported by the provider
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TokenUsage {
	pub prompt_tokens: u64,
	pub output_tokens: u64,
	pub total_tokens: u64,
	#[serde(default)]
	pub request_time_ms: Option<u64>,
}

/// Raw request/response pair kept for the session log
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProviderExchange {
	pub request: serde_json::Value,
	pub response: serde_json::Value,
	pub timestamp: u64,
	pub usage: Option<TokenUsage>,
	pub provider: String,
}

impl ProviderExchange {
	pub fn new(
		request: serde_json::Value,
		response: serde_json::Value,
		usage: Option<TokenUsage>,
		provider: &str,
	) -> Self {
		Self {
			request,
			response,
			timestamp: SystemTime::now()
				.duration_since(UNIX_EPOCH)
				.unwrap_or_default()
				.as_secs(),
			usage,
			provider: provider.to_string(),
		}
	}
}

/// Everything the completion service needs for one suggestion
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
	pub model: String,
	pub system: String,
	pub prompt: String,
	pub temperature: f32,
	pub max_tokens: u32,
}

/// Generated text plus bookkeeping
#[derive(Debug, Clone)]
pub struct Completion {
	pub content: String,
	pub usage: Option<TokenUsage>,
	pub exchange: Option<ProviderExchange>,
}

/// Trait every completion backend implements
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
	/// Get the provider name (e.g., "openai")
	fn name(&self) -> &str;

	/// Send one completion request. Failures are classified into the remote
	/// error kinds of `CliError`.
	async fn complete(&self, request: &CompletionRequest) -> Result<Completion>;
}
