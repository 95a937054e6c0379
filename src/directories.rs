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

// Directory utilities for cross-platform data directory management

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that relocates the whole data directory
pub const DATA_DIR_ENV: &str = "CODEX_CLI_DATA_DIR";

/// Name of the credential/config file inside the config directory
pub const CREDENTIALS_FILE_NAME: &str = "openaiapirc";

/// Context file used when no shell-specific default exists
pub const CURRENT_CONTEXT_FILE_NAME: &str = "current_context.txt";

/// Get the system-wide data directory for codex-cli
///
/// This function returns the appropriate data directory based on the OS:
/// - macOS: ~/.local/share/codex-cli
/// - Linux: ~/.local/share/codex-cli (XDG Base Directory layout)
/// - Windows: %LOCALAPPDATA%/codex-cli
///
/// `CODEX_CLI_DATA_DIR` takes precedence on every platform.
pub fn get_data_dir() -> Result<PathBuf> {
	let data_dir = if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
		PathBuf::from(dir)
	} else {
		match dirs::home_dir() {
			Some(home) => {
				#[cfg(target_os = "windows")]
				let path = {
					match dirs::data_local_dir() {
						Some(dir) => dir.join("codex-cli"),
						None => home.join("AppData").join("Local").join("codex-cli"),
					}
				};

				#[cfg(not(target_os = "windows"))]
				let path = home.join(".local").join("share").join("codex-cli");

				path
			}
			None => {
				return Err(anyhow::anyhow!("Unable to determine home directory"));
			}
		}
	};

	ensure_dir(&data_dir)?;
	Ok(data_dir)
}

fn ensure_dir(dir: &Path) -> Result<()> {
	if !dir.exists() {
		fs::create_dir_all(dir)
			.context(format!("Failed to create directory: {}", dir.display()))?;
	}
	Ok(())
}

fn get_sub_dir(name: &str) -> Result<PathBuf> {
	let dir = get_data_dir()?.join(name);
	ensure_dir(&dir)?;
	Ok(dir)
}

/// Get the configuration directory path
pub fn get_config_dir() -> Result<PathBuf> {
	get_sub_dir("config")
}

/// Get the directory holding context (prompt) files
pub fn get_contexts_dir() -> Result<PathBuf> {
	get_sub_dir("contexts")
}

/// Get the logs directory path
pub fn get_logs_dir() -> Result<PathBuf> {
	get_sub_dir("logs")
}

/// Get the credential/config file path
pub fn get_credentials_file_path() -> Result<PathBuf> {
	Ok(get_config_dir()?.join(CREDENTIALS_FILE_NAME))
}

/// Pick the initial context file for a shell flavor.
///
/// `<contexts>/<shell>-context.txt` wins when it exists, otherwise the shared
/// `current_context.txt` is used (and created on first open).
pub fn context_file_for_shell(contexts_dir: &Path, shell: &str) -> PathBuf {
	let shell_file = contexts_dir.join(format!("{}-context.txt", shell));
	if shell_file.is_file() {
		shell_file
	} else {
		contexts_dir.join(CURRENT_CONTEXT_FILE_NAME)
	}
}
