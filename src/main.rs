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

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use codex_cli::config::{credentials_template, set_thread_config, Config, LogLevel};
use codex_cli::error::{CliError, DIAGNOSTIC_PREFIX};
use codex_cli::session::{logger, process_line, ContextStore, LineOutcome, OpenAiProvider, SessionConfig};
use codex_cli::{directories, log_debug, log_info, shell};

#[derive(Parser)]
#[command(name = "codex_query")]
#[command(version)]
#[command(about = "Turns a natural-language request read from stdin into a shell command")]
struct CodexArgs {
	/// Prompt for one line with a line editor instead of reading stdin
	#[arg(long, short)]
	interactive: bool,

	/// Use this context file instead of the shell's default one
	#[arg(long, value_name = "PATH")]
	context: Option<PathBuf>,

	/// Override the configured log level (none, info, debug)
	#[arg(long, value_name = "LEVEL")]
	log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() {
	let args = CodexArgs::parse();

	if let Err(e) = run(args).await {
		match e.downcast_ref::<CliError>() {
			Some(CliError::MissingCredentialFile(path)) => {
				println!("{}", credentials_template(path));
				std::process::exit(1);
			}
			Some(err) if err.is_preflight() => {
				println!("{}", err.diagnostic());
				std::process::exit(1);
			}
			Some(err) => println!("\n\n{}", err.diagnostic()),
			None => {
				let flat = e.to_string().split_whitespace().collect::<Vec<_>>().join(" ");
				println!("\n\n{}Unexpected exception - {}", DIAGNOSTIC_PREFIX, flat);
			}
		}
	}
}

fn read_input(interactive: bool) -> anyhow::Result<String> {
	if interactive {
		let mut editor = rustyline::DefaultEditor::new()?;
		let line = editor.readline("prompt: ")?;
		Ok(format!("{}\n", line))
	} else {
		let mut buffer = String::new();
		io::stdin().read_to_string(&mut buffer)?;
		Ok(buffer)
	}
}

async fn run(args: CodexArgs) -> anyhow::Result<()> {
	let mut config = Config::load()?;
	if let Some(level) = args.log_level {
		config.log_level = level;
	}
	set_thread_config(&config);
	if let Some(path) = config.config_path() {
		log_debug!("Loaded config from {}", path.display());
	}

	let shell = shell::detect_shell();
	let context_path = match args.context {
		Some(path) => path,
		None => directories::context_file_for_shell(&directories::get_contexts_dir()?, shell.as_str()),
	};
	log_debug!("Using context file {}", context_path.display());

	let mut store = ContextStore::open(&context_path, SessionConfig::from_config(&config, shell))?;
	let log_file = logger::get_session_log_file(&context_path).ok();

	let result = handle_input(args.interactive, &mut store, &config, log_file.as_deref()).await;
	if let (Err(e), Some(log)) = (&result, &log_file) {
		let _ = logger::log_error(log, &e.to_string());
	}
	result
}

async fn handle_input(
	interactive: bool,
	store: &mut ContextStore,
	config: &Config,
	log_file: Option<&Path>,
) -> anyhow::Result<()> {
	let input = read_input(interactive)?;
	if input.trim().is_empty() {
		log_info!("Empty input, nothing to do");
		return Ok(());
	}
	if let Some(log) = log_file {
		let _ = logger::log_user_input(log, &input);
	}

	let provider = OpenAiProvider::from_config(config);
	let mut out = io::stdout();

	match process_line(&input, store, &provider, &mut out).await? {
		LineOutcome::Command(dispatch) => {
			log_debug!("Command handled: {}", dispatch.status());
			if let Some(log) = log_file {
				let _ = logger::log_command(log, &input, dispatch.status());
			}
		}
		LineOutcome::Completed(completion) => {
			if let Some(usage) = &completion.usage {
				log_info!(
					"Tokens: {} prompt, {} completion",
					usage.prompt_tokens,
					usage.output_tokens
				);
			}
			if let (Some(log), Some(exchange)) = (log_file, &completion.exchange) {
				let _ = logger::log_exchange(log, exchange);
			}
		}
	}

	Ok(())
}
