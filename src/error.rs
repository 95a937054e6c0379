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

//! Error taxonomy shared by the context store, the dispatcher and the providers.

use std::path::PathBuf;

/// Prefix of every diagnostic printed at the process boundary.
pub const DIAGNOSTIC_PREFIX: &str = "# Codex CLI error: ";

#[derive(Debug, thiserror::Error)]
pub enum CliError {
	/// The credential/config file does not exist yet.
	#[error("Credential file not found at {0}")]
	MissingCredentialFile(PathBuf),

	#[error("Invalid credential file {path}: {reason}")]
	MalformedCredentialFile { path: PathBuf, reason: String },

	/// A `set` command carried a value that is not a valid number.
	#[error("Invalid value '{value}' for {key}: {reason}")]
	NumericParse {
		key: &'static str,
		value: String,
		reason: String,
	},

	#[error("File not found: {0}")]
	FileNotFound(PathBuf),

	#[error("Invalid context file {path}: {reason}")]
	MalformedContextFile { path: PathBuf, reason: String },

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Rate limit exceeded, try later")]
	RemoteRateLimited(String),

	#[error("API connection error, are you connected to the internet? ({0})")]
	RemoteConnectionFailed(String),

	#[error("Invalid request - {0}")]
	RemoteBadRequest(String),

	#[error("Unexpected exception - {0}")]
	RemoteUnknown(String),
}

impl CliError {
	/// Single-line, comment-prefixed rendering safe to drop into a shell transcript.
	pub fn diagnostic(&self) -> String {
		let message = match self {
			CliError::FileNotFound(path) => {
				format!("Prompt file not found ({}), try again", path.display())
			}
			other => other.to_string(),
		};
		// Keep it on one line: remote error bodies can contain newlines
		let flat = message.split_whitespace().collect::<Vec<_>>().join(" ");
		format!("{}{}", DIAGNOSTIC_PREFIX, flat)
	}

	/// Errors that stop the tool before any session exists.
	pub fn is_preflight(&self) -> bool {
		matches!(
			self,
			CliError::MissingCredentialFile(_) | CliError::MalformedCredentialFile { .. }
		)
	}
}

pub type Result<T> = std::result::Result<T, CliError>;
