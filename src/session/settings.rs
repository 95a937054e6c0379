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

// Session generation parameters and their on-disk header encoding

use crate::config::Config;
use crate::shell::Shell;

/// Number of lines the header occupies at the top of every context file
pub const HEADER_LINES: usize = 6;

const HEADER_PREFIX: &str = "## ";

const HEADER_KEYS: [&str; HEADER_LINES] = [
	"model",
	"temperature",
	"max_tokens",
	"shell",
	"multi_turn",
	"token_count",
];

/// Mutable generation parameters of the running session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
	pub model: String,
	pub temperature: f32,
	pub max_tokens: u32,
	pub shell: Shell,
	pub multi_turn: bool,
	pub token_count: u64,
}

impl SessionConfig {
	/// Defaults for a fresh context file: configured model and generation
	/// parameters, the detected shell, multi-turn off.
	pub fn from_config(config: &Config, shell: Shell) -> Self {
		Self {
			model: config.openai.model.clone(),
			temperature: config.temperature,
			max_tokens: config.max_tokens,
			shell,
			multi_turn: false,
			token_count: 0,
		}
	}

	pub fn multi_turn_label(&self) -> &'static str {
		if self.multi_turn {
			"on"
		} else {
			"off"
		}
	}

	/// Ordered `(key, value)` pairs as they appear in the header
	pub fn entries(&self) -> [(&'static str, String); HEADER_LINES] {
		[
			("model", self.model.clone()),
			("temperature", self.temperature.to_string()),
			("max_tokens", self.max_tokens.to_string()),
			("shell", self.shell.to_string()),
			("multi_turn", self.multi_turn_label().to_string()),
			("token_count", self.token_count.to_string()),
		]
	}

	/// Render the fixed six-line header, newline terminated
	pub fn to_header(&self) -> String {
		let mut header = String::new();
		for (key, value) in self.entries() {
			header.push_str(&format!("{}{}: {}\n", HEADER_PREFIX, key, value));
		}
		header
	}

	/// Parse a header from its six lines. The error describes the first
	/// offending line.
	pub fn from_header_lines(lines: &[&str]) -> Result<Self, String> {
		if lines.len() < HEADER_LINES {
			return Err(format!(
				"expected {} header lines, found {}",
				HEADER_LINES,
				lines.len()
			));
		}

		let mut values: Vec<&str> = Vec::with_capacity(HEADER_LINES);
		for (idx, (line, expected_key)) in lines.iter().zip(HEADER_KEYS).enumerate() {
			let rest = line
				.trim_end_matches(['\r', '\n'])
				.strip_prefix(HEADER_PREFIX)
				.ok_or_else(|| format!("header line {} does not start with '##'", idx + 1))?;
			let (key, value) = rest
				.split_once(':')
				.ok_or_else(|| format!("header line {} has no ':' separator", idx + 1))?;
			if key.trim() != expected_key {
				return Err(format!(
					"header line {} should hold '{}', found '{}'",
					idx + 1,
					expected_key,
					key.trim()
				));
			}
			values.push(value.trim());
		}

		let temperature = values[1]
			.parse::<f32>()
			.map_err(|e| format!("temperature '{}': {}", values[1], e))?;
		let max_tokens = values[2]
			.parse::<u32>()
			.map_err(|e| format!("max_tokens '{}': {}", values[2], e))?;
		let multi_turn = match values[4] {
			"on" => true,
			"off" => false,
			other => return Err(format!("multi_turn must be on/off, found '{}'", other)),
		};
		let token_count = values[5]
			.parse::<u64>()
			.map_err(|e| format!("token_count '{}': {}", values[5], e))?;

		Ok(Self {
			model: values[0].to_string(),
			temperature,
			max_tokens,
			shell: values[3].parse().unwrap_or_default(),
			multi_turn,
			token_count,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> SessionConfig {
		SessionConfig {
			model: "gpt-4o-mini".to_string(),
			temperature: 0.0,
			max_tokens: 300,
			shell: Shell::Zsh,
			multi_turn: false,
			token_count: 0,
		}
	}

	#[test]
	fn test_header_layout() {
		let header = sample().to_header();
		assert_eq!(
			header,
			"## model: gpt-4o-mini\n\
			 ## temperature: 0\n\
			 ## max_tokens: 300\n\
			 ## shell: zsh\n\
			 ## multi_turn: off\n\
			 ## token_count: 0\n"
		);
		assert_eq!(header.lines().count(), HEADER_LINES);
	}

	#[test]
	fn test_header_parse_restores_config() {
		let mut config = sample();
		config.temperature = 0.7;
		config.multi_turn = true;
		config.token_count = 42;

		let header = config.to_header();
		let lines: Vec<&str> = header.lines().collect();
		assert_eq!(SessionConfig::from_header_lines(&lines).unwrap(), config);
	}

	#[test]
	fn test_header_parse_rejects_garbage() {
		assert!(SessionConfig::from_header_lines(&["## model: x"]).is_err());

		let header = sample().to_header().replace("multi_turn: off", "multi_turn: maybe");
		let lines: Vec<&str> = header.lines().collect();
		let err = SessionConfig::from_header_lines(&lines).unwrap_err();
		assert!(err.contains("multi_turn"));

		let swapped = sample().to_header().replace("## model", "## engine");
		let lines: Vec<&str> = swapped.lines().collect();
		assert!(SessionConfig::from_header_lines(&lines).is_err());
	}
}
