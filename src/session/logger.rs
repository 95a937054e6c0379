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

// Session audit log - one JSONL file per context file, one record per line

use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use super::providers::ProviderExchange;

/// JSONL log file for a context file, named after its stem
pub fn get_session_log_file(context_file: &Path) -> Result<PathBuf> {
	let logs_dir = crate::directories::get_logs_dir()?;
	Ok(log_file_in(&logs_dir, context_file))
}

fn log_file_in(logs_dir: &Path, context_file: &Path) -> PathBuf {
	let stem = context_file
		.file_stem()
		.map(|s| s.to_string_lossy().into_owned())
		.unwrap_or_else(|| "session".to_string());
	logs_dir.join(format!("{}.jsonl", stem))
}

/// Log raw user input
pub fn log_user_input(log_file: &Path, content: &str) -> Result<()> {
	let log_entry = serde_json::json!({
		"type": "USER",
		"timestamp": get_timestamp(),
		"content": content
	});
	append_to_log(log_file, &serde_json::to_string(&log_entry)?)
}

/// Log an executed (or malformed) command with its status token
pub fn log_command(log_file: &Path, command_line: &str, status: &str) -> Result<()> {
	let log_entry = serde_json::json!({
		"type": "COMMAND",
		"timestamp": get_timestamp(),
		"command": command_line.trim(),
		"status": status
	});
	append_to_log(log_file, &serde_json::to_string(&log_entry)?)
}

/// Log the raw API request and response of one completion
pub fn log_exchange(log_file: &Path, exchange: &ProviderExchange) -> Result<()> {
	let request_entry = serde_json::json!({
		"type": "API_REQUEST",
		"timestamp": exchange.timestamp,
		"provider": exchange.provider,
		"data": exchange.request
	});
	append_to_log(log_file, &serde_json::to_string(&request_entry)?)?;

	let response_entry = serde_json::json!({
		"type": "API_RESPONSE",
		"timestamp": exchange.timestamp,
		"provider": exchange.provider,
		"data": exchange.response,
		"usage": exchange.usage
	});
	append_to_log(log_file, &serde_json::to_string(&response_entry)?)
}

/// Log a failure that ended the invocation
pub fn log_error(log_file: &Path, message: &str) -> Result<()> {
	let log_entry = serde_json::json!({
		"type": "ERROR",
		"timestamp": get_timestamp(),
		"message": message
	});
	append_to_log(log_file, &serde_json::to_string(&log_entry)?)
}

fn get_timestamp() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.unwrap_or_default()
		.as_secs()
}

/// Helper to append to log file ensuring single lines
fn append_to_log(log_file: &Path, content: &str) -> Result<()> {
	let mut file = OpenOptions::new()
		.create(true)
		.append(true)
		.open(log_file)?;

	// Ensure content is on a single line - replace any newlines with spaces
	let single_line_content = content.replace(['\n', '\r'], " ");
	writeln!(file, "{}", single_line_content)?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_log_file_named_after_context() {
		let path = log_file_in(Path::new("/logs"), Path::new("/ctx/bash-context.txt"));
		assert_eq!(path, PathBuf::from("/logs/bash-context.jsonl"));
	}

	#[test]
	fn test_records_are_single_json_lines() {
		let dir = tempfile::tempdir().unwrap();
		let log = dir.path().join("session.jsonl");

		log_user_input(&log, "# list files\n").unwrap();
		log_command(&log, "# show config\n", "config shown").unwrap();
		log_error(&log, "boom").unwrap();

		let content = std::fs::read_to_string(&log).unwrap();
		let records: Vec<serde_json::Value> = content
			.lines()
			.map(|l| serde_json::from_str(l).unwrap())
			.collect();
		assert_eq!(records.len(), 3);
		assert_eq!(records[0]["type"], "USER");
		assert_eq!(records[0]["content"], "# list files\n");
		assert_eq!(records[1]["type"], "COMMAND");
		assert_eq!(records[1]["command"], "# show config");
		assert_eq!(records[1]["status"], "config shown");
		assert_eq!(records[2]["type"], "ERROR");
	}
}
