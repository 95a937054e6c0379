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

// OpenAI chat-completions provider

use super::{Completion, CompletionProvider, CompletionRequest, ProviderExchange, TokenUsage};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::log_debug;
use reqwest::{Client, StatusCode};

/// Value of the `user` field sent with every request
const REQUEST_USER: &str = "codex-cli";

/// Check if a model supports the temperature parameter
/// O-series reasoning models don't support temperature
fn supports_temperature(model: &str) -> bool {
	!model.starts_with("o1")
		&& !model.starts_with("o2")
		&& !model.starts_with("o3")
		&& !model.starts_with("o4")
}

/// Map an unsuccessful HTTP status to an error kind
fn classify_status(status: StatusCode, message: String) -> CliError {
	match status {
		StatusCode::TOO_MANY_REQUESTS => CliError::RemoteRateLimited(message),
		s if s.is_client_error() => CliError::RemoteBadRequest(message),
		_ => CliError::RemoteUnknown(message),
	}
}

/// Map a transport failure to an error kind
fn classify_transport(error: reqwest::Error) -> CliError {
	if error.is_connect() || error.is_timeout() {
		CliError::RemoteConnectionFailed(error.to_string())
	} else {
		CliError::RemoteUnknown(error.to_string())
	}
}

/// Pull a readable message out of an OpenAI error body
fn error_message(status: StatusCode, body: &serde_json::Value, raw: &str) -> String {
	let mut details = vec![format!("HTTP {}", status)];
	if let Some(error_obj) = body.get("error") {
		if let Some(msg) = error_obj.get("message").and_then(|m| m.as_str()) {
			details.push(msg.to_string());
		}
		if let Some(code) = error_obj.get("code").and_then(|c| c.as_str()) {
			details.push(format!("code: {}", code));
		}
	}
	if details.len() == 1 && !raw.trim().is_empty() {
		details.push(raw.trim().to_string());
	}
	details.join(" | ")
}

fn build_request_body(request: &CompletionRequest) -> serde_json::Value {
	let mut body = serde_json::json!({
		"model": request.model,
		"user": REQUEST_USER,
		"messages": [
			{ "role": "system", "content": request.system },
			{ "role": "user", "content": request.prompt },
		],
		"max_completion_tokens": request.max_tokens,
		"n": 1,
	});

	if supports_temperature(&request.model) {
		body["temperature"] = serde_json::json!(request.temperature);
	}
	body
}

fn parse_usage(response: &serde_json::Value, api_time_ms: u64) -> Option<TokenUsage> {
	let usage = response.get("usage")?;
	let field = |name: &str| usage.get(name).and_then(|v| v.as_u64()).unwrap_or(0);
	Some(TokenUsage {
		prompt_tokens: field("prompt_tokens"),
		output_tokens: field("completion_tokens"),
		total_tokens: field("total_tokens"),
		request_time_ms: Some(api_time_ms),
	})
}

/// OpenAI provider implementation
pub struct OpenAiProvider {
	client: Client,
	api_key: String,
	organization: Option<String>,
	api_base: String,
}

impl OpenAiProvider {
	pub fn new(api_key: impl Into<String>, organization: Option<String>, api_base: impl Into<String>) -> Self {
		Self {
			client: Client::new(),
			api_key: api_key.into(),
			organization,
			api_base: api_base.into(),
		}
	}

	pub fn from_config(config: &Config) -> Self {
		Self::new(
			config.openai.secret_key.clone(),
			config.organization().map(str::to_string),
			config.openai.api_base.clone(),
		)
	}

	fn endpoint(&self) -> String {
		format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
	}
}

#[async_trait::async_trait]
impl CompletionProvider for OpenAiProvider {
	fn name(&self) -> &str {
		"openai"
	}

	async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
		let request_body = build_request_body(request);

		let mut http_request = self
			.client
			.post(self.endpoint())
			.header("Authorization", format!("Bearer {}", self.api_key))
			.header("Content-Type", "application/json")
			.json(&request_body);
		if let Some(org) = &self.organization {
			http_request = http_request.header("OpenAI-Organization", org);
		}

		let api_start = std::time::Instant::now();
		let response = http_request.send().await.map_err(classify_transport)?;
		let api_time_ms = api_start.elapsed().as_millis() as u64;

		let status = response.status();
		let response_text = response.text().await.map_err(classify_transport)?;
		let response_json: serde_json::Value =
			serde_json::from_str(&response_text).unwrap_or(serde_json::Value::Null);

		if !status.is_success() {
			return Err(classify_status(
				status,
				error_message(status, &response_json, &response_text),
			));
		}

		// Errors can arrive with HTTP 200 too
		if let Some(error_obj) = response_json.get("error") {
			let msg = error_obj
				.get("message")
				.and_then(|m| m.as_str())
				.unwrap_or("error in response body");
			return Err(CliError::RemoteUnknown(msg.to_string()));
		}

		let choice = response_json
			.get("choices")
			.and_then(|choices| choices.get(0))
			.ok_or_else(|| {
				CliError::RemoteUnknown(format!("Invalid response format: {}", response_text))
			})?;

		if let Some(reason) = choice.get("finish_reason").and_then(|r| r.as_str()) {
			log_debug!("Finish reason: {}", reason);
		}

		let content = choice
			.get("message")
			.and_then(|m| m.get("content"))
			.and_then(|c| c.as_str())
			.unwrap_or_default()
			.to_string();

		let usage = parse_usage(&response_json, api_time_ms);
		let exchange = ProviderExchange::new(request_body, response_json, usage.clone(), self.name());

		Ok(Completion {
			content,
			usage,
			exchange: Some(exchange),
		})
	}
}
