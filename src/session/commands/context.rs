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

// Context command handlers

use std::io::Write;

use super::super::context_store::ContextStore;
use crate::error::{CliError, Result};

pub fn handle_default(store: &mut ContextStore) -> Result<&'static str> {
	store.reset()?;
	Ok("stopped context")
}

pub fn handle_clear(store: &mut ContextStore) -> Result<&'static str> {
	store.reset()?;
	Ok("unlearned interaction")
}

/// Print the body (or its last `lines` lines) as comments
pub fn handle_show(store: &ContextStore, lines: Option<usize>, out: &mut dyn Write) -> Result<&'static str> {
	writeln!(out)?;
	for line in store.tail(lines)? {
		writeln!(out, "# {}", line)?;
	}
	Ok("context shown")
}

/// Open the context file with the desktop's default application
pub fn handle_view(store: &ContextStore) -> Result<&'static str> {
	let path = store.path();
	if !path.is_file() {
		return Err(CliError::FileNotFound(path.to_path_buf()));
	}

	let status = store.config().shell.open_command(path).status()?;

	if !status.success() {
		crate::log_error!(
			"Opening {} exited with code {}",
			path.display(),
			status.code().unwrap_or(-1)
		);
	}
	Ok("context shown")
}

/// Copy the context file, naming it after the current time when no name is given
pub fn handle_save(store: &ContextStore, filename: Option<&str>, out: &mut dyn Write) -> Result<&'static str> {
	let filename = match filename {
		Some(name) => name.to_string(),
		None => chrono::Local::now().format("%Y-%m-%d_%H-%M-%S.txt").to_string(),
	};
	let destination = store.save_as(&filename)?;
	writeln!(out, "# Context saved to {}", destination.display())?;
	Ok("context saved")
}

pub fn handle_load(store: &mut ContextStore, filename: &str) -> Result<&'static str> {
	store.load_from(filename)?;
	Ok("context loaded")
}
