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

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::PathBuf;
use std::str::FromStr;

pub mod loading;

pub use loading::credentials_template;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
	#[serde(rename = "none")]
	None,
	#[serde(rename = "info")]
	Info,
	#[serde(rename = "debug")]
	Debug,
}

impl Default for LogLevel {
	fn default() -> Self {
		Self::None
	}
}

impl LogLevel {
	/// Check if info logging is enabled
	pub fn is_info_enabled(&self) -> bool {
		matches!(self, LogLevel::Info | LogLevel::Debug)
	}

	/// Check if debug logging is enabled
	pub fn is_debug_enabled(&self) -> bool {
		matches!(self, LogLevel::Debug)
	}
}

impl FromStr for LogLevel {
	type Err = anyhow::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"none" => Ok(LogLevel::None),
			"info" => Ok(LogLevel::Info),
			"debug" => Ok(LogLevel::Debug),
			other => Err(anyhow::anyhow!(
				"Unknown log level '{}'. Valid levels: none, info, debug",
				other
			)),
		}
	}
}

// Default functions
fn default_temperature() -> f32 {
	0.0
}

fn default_max_tokens() -> u32 {
	300
}

pub fn default_api_base() -> String {
	"https://api.openai.com/v1".to_string()
}

/// `[openai]` section: credentials plus the model used for fresh contexts
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct OpenAiConfig {
	#[serde(default)]
	pub organization_id: String,
	#[serde(default)]
	pub secret_key: String,
	#[serde(default)]
	pub model: String,
	#[serde(default = "default_api_base")]
	pub api_base: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
	#[serde(default)]
	pub log_level: LogLevel,

	// Generation defaults for a freshly created context file
	#[serde(default = "default_temperature")]
	pub temperature: f32,
	#[serde(default = "default_max_tokens")]
	pub max_tokens: u32,

	#[serde(default)]
	pub openai: OpenAiConfig,

	#[serde(skip)]
	config_path: Option<PathBuf>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			log_level: LogLevel::default(),
			temperature: default_temperature(),
			max_tokens: default_max_tokens(),
			openai: OpenAiConfig {
				api_base: default_api_base(),
				..Default::default()
			},
			config_path: None,
		}
	}
}

impl Config {
	/// Get the global log level
	pub fn get_log_level(&self) -> LogLevel {
		self.log_level
	}

	/// Path the config was loaded from, if any
	pub fn config_path(&self) -> Option<&PathBuf> {
		self.config_path.as_ref()
	}

	/// Organization header value, `None` when not configured
	pub fn organization(&self) -> Option<&str> {
		let org = self.openai.organization_id.trim();
		if org.is_empty() {
			None
		} else {
			Some(org)
		}
	}
}

// Logging macros for different log levels
// These macros automatically check the current log level and only print if appropriate.
// Output goes to stderr: stdout carries the suggested shell command.

thread_local! {
	static CURRENT_CONFIG: RefCell<Option<Config>> = const { RefCell::new(None) };
}

/// Set the current config for the thread (to be used by logging macros)
pub fn set_thread_config(config: &Config) {
	CURRENT_CONFIG.with(|c| {
		*c.borrow_mut() = Some(config.clone());
	});
}

/// Get the current config for the thread
pub fn with_thread_config<F, R>(f: F) -> Option<R>
where
	F: FnOnce(&Config) -> R,
{
	CURRENT_CONFIG.with(|c| (*c.borrow()).as_ref().map(f))
}

/// Info logging macro with automatic cyan coloring
/// Shows info messages when log level is Info OR Debug
#[macro_export]
macro_rules! log_info {
	($fmt:expr) => {
		if let Some(should_log) = $crate::config::with_thread_config(|config| config.get_log_level().is_info_enabled()) {
			if should_log {
				use colored::Colorize;
				eprintln!("{}", $fmt.cyan());
			}
		}
	};
	($fmt:expr, $($arg:expr),*) => {
		if let Some(should_log) = $crate::config::with_thread_config(|config| config.get_log_level().is_info_enabled()) {
			if should_log {
				use colored::Colorize;
				eprintln!("{}", format!($fmt, $($arg),*).cyan());
			}
		}
	};
}

/// Debug logging macro with automatic bright blue coloring
#[macro_export]
macro_rules! log_debug {
	($fmt:expr) => {
		if let Some(should_log) = $crate::config::with_thread_config(|config| config.get_log_level().is_debug_enabled()) {
			if should_log {
				use colored::Colorize;
				eprintln!("{}", $fmt.bright_blue());
			}
		}
	};
	($fmt:expr, $($arg:expr),*) => {
		if let Some(should_log) = $crate::config::with_thread_config(|config| config.get_log_level().is_debug_enabled()) {
			if should_log {
				use colored::Colorize;
				eprintln!("{}", format!($fmt, $($arg),*).bright_blue());
			}
		}
	};
}

/// Error logging macro with automatic bright red coloring
/// Always visible regardless of log level (errors should always be shown)
#[macro_export]
macro_rules! log_error {
	($fmt:expr) => {{
		use colored::Colorize;
		eprintln!("{}", $fmt.bright_red());
	}};
	($fmt:expr, $($arg:expr),*) => {{
		use colored::Colorize;
		eprintln!("{}", format!($fmt, $($arg),*).bright_red());
	}};
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_log_level_parsing() {
		assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
		assert_eq!("INFO".parse::<LogLevel>().unwrap(), LogLevel::Info);
		assert_eq!("none".parse::<LogLevel>().unwrap(), LogLevel::None);
		assert!("verbose".parse::<LogLevel>().is_err());

		assert!(LogLevel::Debug.is_info_enabled());
		assert!(!LogLevel::Info.is_debug_enabled());
		assert!(!LogLevel::None.is_info_enabled());
	}

	#[test]
	fn test_defaults_when_fields_missing() {
		let config: Config = toml::from_str(
			r#"
			[openai]
			secret_key = "sk-test"
			model = "gpt-4o-mini"
			"#,
		)
		.unwrap();

		assert_eq!(config.log_level, LogLevel::None);
		assert_eq!(config.temperature, 0.0);
		assert_eq!(config.max_tokens, 300);
		assert_eq!(config.openai.api_base, "https://api.openai.com/v1");
		assert_eq!(config.organization(), None);
	}

	#[test]
	fn test_thread_config_drives_log_level() {
		let config = Config {
			log_level: LogLevel::Debug,
			..Default::default()
		};
		set_thread_config(&config);
		assert_eq!(
			with_thread_config(|c| c.get_log_level()),
			Some(LogLevel::Debug)
		);
	}
}
