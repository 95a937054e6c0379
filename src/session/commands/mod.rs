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

//! In-band command language.
//!
//! A line typed at the prompt is either a control command (changing the
//! session config or the context file) or a query for the model. Keywords are
//! detected case-insensitively anywhere in the line, except in the value or
//! file name slot of `set`/`show`/`save`/`load`; the first matching group in
//! this order wins:
//!
//! 1. `set temperature|max_tokens|shell|model <value>`
//! 2. `show config`
//! 3. `start multi-turn` / `stop multi-turn`
//! 4. `<default|show [n]|view|save [file]|clear|load <file>> context`
//!
//! A leading `#` directive prefix is ignored, so `# set model gpt-4o` and
//! `set model gpt-4o` are the same command.

mod config;
mod context;
mod multi_turn;
mod set;

use std::io::Write;

use super::context_store::ContextStore;
use crate::error::{CliError, Result};
use crate::shell::Shell;

/// Keys accepted by `set`, in match priority order
const SET_KEYS: [&str; 4] = ["temperature", "max_tokens", "shell", "model"];

/// Commands whose third token is a free-form value or file name
const ARGUMENT_COMMANDS: [&str; 4] = ["set", "show", "save", "load"];

/// Printed when `load context` is missing its file name
pub const LOAD_USAGE_ERROR: &str = "#\tInvalid command format, did you specify which file to load?";

/// A parsed control command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
	SetTemperature(f32),
	SetMaxTokens(u32),
	SetShell(Shell),
	SetModel(String),
	ShowConfig,
	StartMultiTurn,
	StopMultiTurn,
	DefaultContext,
	ShowContextDefault,
	ShowContextTail(usize),
	ViewContextExternally,
	SaveContext(Option<String>),
	ClearContext,
	LoadContext(String),
}

/// Result of parsing one line
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
	Command(Command),
	/// Recognized command with unusable arguments
	Malformed(String),
	NotACommand,
}

/// What the caller should do with the line after dispatching it
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
	/// Not a command: forward the line to the model
	Query,
	/// Command executed; carries its status token
	Executed(&'static str),
	/// Command recognized but invalid; already reported, nothing to forward
	Malformed(String),
}

impl Dispatch {
	/// Status token, empty when the line is a query
	pub fn status(&self) -> &str {
		match self {
			Dispatch::Query => "",
			Dispatch::Executed(status) => status,
			Dispatch::Malformed(_) => "malformed command",
		}
	}

	pub fn is_query(&self) -> bool {
		matches!(self, Dispatch::Query)
	}
}

/// Split a line into whitespace separated tokens, dropping a leading `#`
/// directive prefix (either a standalone token or glued to the first word).
pub fn tokenize(line: &str) -> Vec<&str> {
	let mut tokens: Vec<&str> = line.split_whitespace().collect();
	if let Some(first) = tokens.first().copied() {
		let stripped = first.trim_start_matches('#');
		if stripped.is_empty() {
			tokens.remove(0);
		} else {
			tokens[0] = stripped;
		}
	}
	tokens
}

/// Lowercased words searched for keywords. For `<command> <word> <argument>`
/// lines the argument is left out, so a value such as `dataset_model.txt`
/// cannot trigger another command.
fn command_words(tokens: &[&str]) -> String {
	let head = tokens.iter().take(2).copied().collect::<Vec<_>>().join(" ").to_lowercase();
	if tokens.len() == 3 && ARGUMENT_COMMANDS.iter().any(|keyword| head.contains(keyword)) {
		head
	} else {
		tokens.join(" ").to_lowercase()
	}
}

fn parse_temperature(value: &str) -> Result<f32> {
	let parsed = value.parse::<f32>().map_err(|e| CliError::NumericParse {
		key: "temperature",
		value: value.to_string(),
		reason: e.to_string(),
	})?;
	if !parsed.is_finite() {
		return Err(CliError::NumericParse {
			key: "temperature",
			value: value.to_string(),
			reason: "must be a finite number".to_string(),
		});
	}
	Ok(parsed)
}

fn parse_max_tokens(value: &str) -> Result<u32> {
	let parsed = value.parse::<u32>().map_err(|e| CliError::NumericParse {
		key: "max_tokens",
		value: value.to_string(),
		reason: e.to_string(),
	})?;
	if parsed == 0 {
		return Err(CliError::NumericParse {
			key: "max_tokens",
			value: value.to_string(),
			reason: "must be greater than 0".to_string(),
		});
	}
	Ok(parsed)
}

/// Parse one line of input into a command.
///
/// Numeric values that fail to parse are errors; a `set` line with the wrong
/// number of tokens is not a command at all.
pub fn parse(line: &str) -> Result<Parsed> {
	let tokens = tokenize(line);
	let normalized = command_words(&tokens);
	let has = |keyword: &str| normalized.contains(keyword);

	if has("set") {
		if let Some(key) = SET_KEYS.iter().copied().find(|key| has(*key)) {
			// set <key> <value>
			if tokens.len() != 3 {
				return Ok(Parsed::NotACommand);
			}
			let value = tokens[2];
			let command = match key {
				"temperature" => Command::SetTemperature(parse_temperature(value)?),
				"max_tokens" => Command::SetMaxTokens(parse_max_tokens(value)?),
				"shell" => Command::SetShell(value.parse().unwrap_or_default()),
				_ => Command::SetModel(value.to_string()),
			};
			return Ok(Parsed::Command(command));
		}
	}

	if has("show config") {
		return Ok(Parsed::Command(Command::ShowConfig));
	}

	if has("multi-turn") {
		if has("start") {
			return Ok(Parsed::Command(Command::StartMultiTurn));
		}
		if has("stop") {
			return Ok(Parsed::Command(Command::StopMultiTurn));
		}
	}

	if has("context") {
		if has("default") {
			return Ok(Parsed::Command(Command::DefaultContext));
		}
		if has("show") {
			let lines = tokens
				.get(2)
				.and_then(|t| t.parse::<usize>().ok())
				.filter(|n| *n > 0);
			let command = match lines {
				Some(n) => Command::ShowContextTail(n),
				None => Command::ShowContextDefault,
			};
			return Ok(Parsed::Command(command));
		}
		if has("view") {
			return Ok(Parsed::Command(Command::ViewContextExternally));
		}
		if has("save") {
			let filename = if tokens.len() == 3 {
				Some(tokens[2].to_string())
			} else {
				None
			};
			return Ok(Parsed::Command(Command::SaveContext(filename)));
		}
		if has("clear") {
			return Ok(Parsed::Command(Command::ClearContext));
		}
		if has("load") {
			if tokens.len() == 3 {
				return Ok(Parsed::Command(Command::LoadContext(tokens[2].to_string())));
			}
			return Ok(Parsed::Malformed(LOAD_USAGE_ERROR.to_string()));
		}
	}

	Ok(Parsed::NotACommand)
}

/// Run a parsed command against the store, returning its status token.
pub fn execute(command: Command, store: &mut ContextStore, out: &mut dyn Write) -> Result<&'static str> {
	match command {
		Command::SetTemperature(value) => set::handle_temperature(store, value, out),
		Command::SetMaxTokens(value) => set::handle_max_tokens(store, value, out),
		Command::SetShell(value) => set::handle_shell(store, value, out),
		Command::SetModel(value) => set::handle_model(store, value, out),
		Command::ShowConfig => config::handle_show_config(store, out),
		Command::StartMultiTurn => multi_turn::handle_start(store),
		Command::StopMultiTurn => multi_turn::handle_stop(store),
		Command::DefaultContext => context::handle_default(store),
		Command::ShowContextDefault => context::handle_show(store, None, out),
		Command::ShowContextTail(n) => context::handle_show(store, Some(n), out),
		Command::ViewContextExternally => context::handle_view(store),
		Command::SaveContext(filename) => context::handle_save(store, filename.as_deref(), out),
		Command::ClearContext => context::handle_clear(store),
		Command::LoadContext(filename) => context::handle_load(store, &filename),
	}
}

/// Decide whether `line` is a command and, if so, run it.
pub fn dispatch(line: &str, store: &mut ContextStore, out: &mut dyn Write) -> Result<Dispatch> {
	match parse(line)? {
		Parsed::NotACommand => Ok(Dispatch::Query),
		Parsed::Malformed(message) => {
			writeln!(out, "\n{}", message)?;
			Ok(Dispatch::Malformed(message))
		}
		Parsed::Command(command) => {
			crate::log_debug!("Executing command {:?}", command);
			execute(command, store, out).map(Dispatch::Executed)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::session::settings::SessionConfig;
	use std::fs;

	fn open_temp() -> (tempfile::TempDir, ContextStore) {
		let dir = tempfile::tempdir().unwrap();
		let defaults = SessionConfig {
			model: "gpt-4o-mini".to_string(),
			temperature: 0.0,
			max_tokens: 300,
			shell: Shell::Bash,
			multi_turn: false,
			token_count: 0,
		};
		let store = ContextStore::open(dir.path().join("current_context.txt"), defaults).unwrap();
		(dir, store)
	}

	fn run(line: &str, store: &mut ContextStore) -> (Result<Dispatch>, String) {
		let mut out = Vec::new();
		let result = dispatch(line, store, &mut out);
		(result, String::from_utf8(out).unwrap())
	}

	#[test]
	fn test_tokenize_strips_directive_prefix() {
		assert_eq!(tokenize("# set model gpt-4o"), vec!["set", "model", "gpt-4o"]);
		assert_eq!(tokenize("#set model gpt-4o"), vec!["set", "model", "gpt-4o"]);
		assert_eq!(tokenize("  set   model\tgpt-4o\n"), vec!["set", "model", "gpt-4o"]);
		assert!(tokenize("#").is_empty());
		assert!(tokenize("").is_empty());
	}

	#[test]
	fn test_parse_priority_and_variants() {
		let cases = [
			("# set temperature 0.5", Command::SetTemperature(0.5)),
			("set max_tokens 128", Command::SetMaxTokens(128)),
			("# set shell zsh", Command::SetShell(Shell::Zsh)),
			("# set shell fish", Command::SetShell(Shell::Unknown)),
			("# set model GPT-4o", Command::SetModel("GPT-4o".to_string())),
			("# show config", Command::ShowConfig),
			("# start multi-turn", Command::StartMultiTurn),
			("# STOP Multi-Turn", Command::StopMultiTurn),
			("# default context", Command::DefaultContext),
			("# show context", Command::ShowContextDefault),
			("# show context 5", Command::ShowContextTail(5)),
			("# show context 0", Command::ShowContextDefault),
			("# show context all", Command::ShowContextDefault),
			("# view context", Command::ViewContextExternally),
			("# save context", Command::SaveContext(None)),
			(
				"# save context work.txt",
				Command::SaveContext(Some("work.txt".to_string())),
			),
			("# clear context", Command::ClearContext),
			("# load context work.txt", Command::LoadContext("work.txt".to_string())),
		];

		for (line, expected) in cases {
			assert_eq!(parse(line).unwrap(), Parsed::Command(expected), "line: {}", line);
		}
	}

	#[test]
	fn test_set_with_wrong_arity_is_not_a_command() {
		assert_eq!(parse("set temperature 0.5 extra").unwrap(), Parsed::NotACommand);
		assert_eq!(parse("# set temperature 0.5 extra").unwrap(), Parsed::NotACommand);
		// No fall-through to later groups once a set key matched
		assert_eq!(parse("set model and show config").unwrap(), Parsed::NotACommand);
	}

	#[test]
	fn test_argument_never_selects_command() {
		assert_eq!(
			parse("# load context dataset_model.txt").unwrap(),
			Parsed::Command(Command::LoadContext("dataset_model.txt".to_string()))
		);
		assert_eq!(
			parse("# save context reset-shell.txt").unwrap(),
			Parsed::Command(Command::SaveContext(Some("reset-shell.txt".to_string())))
		);
		assert_eq!(
			parse("# set model show-config").unwrap(),
			Parsed::Command(Command::SetModel("show-config".to_string()))
		);
		// Without an argument slot the whole line is still searched
		assert_eq!(parse("# clear the context").unwrap(), Parsed::Command(Command::ClearContext));
	}

	#[test]
	fn test_load_file_named_like_setting_keeps_config() {
		let (dir, mut store) = open_temp();
		fs::write(dir.path().join("dataset_model.txt"), "# say hi\necho hi\n").unwrap();
		let config_before = store.config().clone();

		let (result, _) = run("# load context dataset_model.txt", &mut store);
		assert_eq!(result.unwrap(), Dispatch::Executed("context loaded"));
		assert_eq!(store.config().model, config_before.model);
		assert_eq!(store.body().unwrap(), "# say hi\necho hi\n");
	}

	#[test]
	fn test_set_without_known_key_falls_through() {
		assert_eq!(
			parse("# reset then show config").unwrap(),
			Parsed::Command(Command::ShowConfig)
		);
	}

	#[test]
	fn test_numeric_parse_failures() {
		assert!(matches!(
			parse("# set temperature hot"),
			Err(CliError::NumericParse { key: "temperature", .. })
		));
		assert!(matches!(
			parse("# set max_tokens lots"),
			Err(CliError::NumericParse { key: "max_tokens", .. })
		));
		assert!(matches!(
			parse("# set max_tokens 0"),
			Err(CliError::NumericParse { key: "max_tokens", .. })
		));
	}

	#[test]
	fn test_load_without_filename_is_malformed() {
		assert_eq!(
			parse("# load context").unwrap(),
			Parsed::Malformed(LOAD_USAGE_ERROR.to_string())
		);
		assert!(matches!(parse("# load context a b").unwrap(), Parsed::Malformed(_)));
	}

	#[test]
	fn test_plain_query_is_not_a_command() {
		for line in ["list files", "# find all png files in this folder", "", "   "] {
			assert_eq!(parse(line).unwrap(), Parsed::NotACommand, "line: {:?}", line);
		}
	}

	#[test]
	fn test_dispatch_query_leaves_store_untouched() {
		let (_dir, mut store) = open_temp();
		let before = fs::read_to_string(store.path()).unwrap();
		let config_before = store.config().clone();

		let (result, printed) = run("# list all running docker containers", &mut store);
		let dispatch = result.unwrap();
		assert_eq!(dispatch, Dispatch::Query);
		assert_eq!(dispatch.status(), "");
		assert!(printed.is_empty());
		assert_eq!(store.config(), &config_before);
		assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
	}

	#[test]
	fn test_dispatch_set_persists_to_header() {
		let (_dir, mut store) = open_temp();

		let (result, printed) = run("# set temperature 0.5", &mut store);
		assert_eq!(result.unwrap(), Dispatch::Executed("config set"));
		assert_eq!(printed, "# Temperature set to 0.5\n");

		run("# set max_tokens 1024", &mut store).0.unwrap();
		run("# set shell powershell", &mut store).0.unwrap();
		run("# set model gpt-4o", &mut store).0.unwrap();

		let reopened = ContextStore::open(store.path(), store.config().clone()).unwrap();
		let config = reopened.config();
		assert_eq!(config.temperature, 0.5);
		assert_eq!(config.max_tokens, 1024);
		assert_eq!(config.shell, Shell::PowerShell);
		assert_eq!(config.model, "gpt-4o");
	}

	#[test]
	fn test_dispatch_extra_token_keeps_temperature() {
		let (_dir, mut store) = open_temp();
		let (result, _) = run("set temperature 0.5 extra", &mut store);
		assert_eq!(result.unwrap(), Dispatch::Query);
		assert_eq!(store.config().temperature, 0.0);
	}

	#[test]
	fn test_dispatch_show_config() {
		let (_dir, mut store) = open_temp();
		let (result, printed) = run("# show config", &mut store);
		assert_eq!(result.unwrap(), Dispatch::Executed("config shown"));
		assert!(printed.contains("# model: gpt-4o-mini"));
		assert!(printed.contains("# multi_turn: off"));
		assert!(printed.contains("# token_count: 0"));
	}

	#[test]
	fn test_dispatch_multi_turn_toggle() {
		let (_dir, mut store) = open_temp();
		store.append_pair("list files", "ls").unwrap();

		let (result, _) = run("# start multi-turn", &mut store);
		assert_eq!(result.unwrap(), Dispatch::Executed("multi turn mode on"));
		assert!(store.config().multi_turn);

		// Idempotent
		let (result, _) = run("# start multi-turn", &mut store);
		assert_eq!(result.unwrap(), Dispatch::Executed("multi turn mode on"));
		assert!(store.config().multi_turn);

		let (result, _) = run("# stop multi-turn", &mut store);
		assert_eq!(result.unwrap(), Dispatch::Executed("multi turn mode off"));
		assert!(!store.config().multi_turn);
		assert_eq!(store.body().unwrap(), "# list files\nls\n");
	}

	#[test]
	fn test_dispatch_clear_then_show_is_empty() {
		let (_dir, mut store) = open_temp();
		store.append_pair("list files", "ls").unwrap();
		store.append_pair("show date", "date").unwrap();

		let (result, _) = run("# clear context", &mut store);
		assert_eq!(result.unwrap(), Dispatch::Executed("unlearned interaction"));

		let (result, printed) = run("# show context", &mut store);
		assert_eq!(result.unwrap(), Dispatch::Executed("context shown"));
		assert_eq!(printed.trim(), "");
		assert_eq!(store.body().unwrap(), "");
	}

	#[test]
	fn test_dispatch_default_resets() {
		let (_dir, mut store) = open_temp();
		store.append_pair("list files", "ls").unwrap();
		let (result, _) = run("# default context", &mut store);
		assert_eq!(result.unwrap(), Dispatch::Executed("stopped context"));
		assert_eq!(store.body().unwrap(), "");
	}

	#[test]
	fn test_dispatch_show_tail() {
		let (_dir, mut store) = open_temp();
		store.append_pair("one", "1").unwrap();
		store.append_pair("two", "2").unwrap();

		let (_, printed) = run("# show context 2", &mut store);
		assert_eq!(printed, "\n# # two\n# 2\n");

		let (_, printed) = run("# show context", &mut store);
		assert_eq!(printed, "\n# # one\n# 1\n# # two\n# 2\n");
	}

	#[test]
	fn test_dispatch_save_and_load() {
		let (dir, mut store) = open_temp();
		store.append_pair("list files", "ls -la").unwrap();

		let (result, _) = run("# save context backup.txt", &mut store);
		assert_eq!(result.unwrap(), Dispatch::Executed("context saved"));
		assert!(dir.path().join("backup.txt").is_file());

		run("# clear context", &mut store).0.unwrap();
		let (result, _) = run("# load context backup.txt", &mut store);
		assert_eq!(result.unwrap(), Dispatch::Executed("context loaded"));
		assert_eq!(store.body().unwrap(), "# list files\nls -la\n");
	}

	#[test]
	fn test_dispatch_save_without_name_uses_timestamp() {
		let (dir, mut store) = open_temp();
		let (result, printed) = run("# save context", &mut store);
		assert_eq!(result.unwrap(), Dispatch::Executed("context saved"));

		let saved: Vec<String> = fs::read_dir(dir.path())
			.unwrap()
			.filter_map(|e| e.ok())
			.map(|e| e.file_name().to_string_lossy().into_owned())
			.filter(|name| name != "current_context.txt")
			.collect();
		assert_eq!(saved.len(), 1);
		let name = &saved[0];
		// YYYY-MM-DD_HH-MM-SS.txt
		assert_eq!(name.len(), "2024-01-01_00-00-00.txt".len());
		assert!(name.ends_with(".txt"));
		assert_eq!(&name[4..5], "-");
		assert_eq!(&name[10..11], "_");
		assert!(printed.contains(name.as_str()));
	}

	#[test]
	fn test_dispatch_load_missing_file_propagates() {
		let (_dir, mut store) = open_temp();
		let (result, _) = run("# load context missing.txt", &mut store);
		assert!(matches!(result, Err(CliError::FileNotFound(_))));
	}

	#[test]
	fn test_dispatch_malformed_load_is_handled() {
		let (_dir, mut store) = open_temp();
		let (result, printed) = run("# load context", &mut store);
		let dispatch = result.unwrap();
		assert!(matches!(dispatch, Dispatch::Malformed(_)));
		assert!(!dispatch.is_query());
		assert!(!dispatch.status().is_empty());
		assert!(printed.contains("did you specify which file to load?"));
	}
}
