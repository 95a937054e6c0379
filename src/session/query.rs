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

// Query assembly and the per-line request flow

use std::io::Write;

use super::commands::{self, Dispatch};
use super::context_store::ContextStore;
use super::providers::{Completion, CompletionProvider, CompletionRequest};
use crate::error::Result;
use crate::shell::Shell;

/// Outbound payload for the completion service
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
	pub system: String,
	pub prompt: String,
}

/// Outcome of processing one input line
#[derive(Debug)]
pub enum LineOutcome {
	/// The line was a command (executed or reported as malformed)
	Command(Dispatch),
	/// The line was sent to the model
	Completed(Completion),
}

/// System instruction for the given shell flavor
pub fn system_prompt(shell: Shell) -> String {
	format!(
		"You are a shell code assistant, complete the textual query of the user with a valid shell command. \
		 The specific shell type is {}. \
		 If the user wants a textual reply, your reply should be prefixed with a comment symbol based on the shell type. \
		 You must not use code blocks to respond to the user, write commands directly.",
		shell
	)
}

/// Context body (multi-turn only) followed by the new input, untouched
pub fn assemble(store: &ContextStore, input: &str) -> Result<Query> {
	let config = store.config();
	let mut prompt = if config.multi_turn {
		store.body()?
	} else {
		String::new()
	};
	prompt.push_str(input);

	Ok(Query {
		system: system_prompt(config.shell),
		prompt,
	})
}

/// Build the full request for the completion service
pub fn build_request(store: &ContextStore, input: &str) -> Result<CompletionRequest> {
	let query = assemble(store, input)?;
	let config = store.config();
	Ok(CompletionRequest {
		model: config.model.clone(),
		system: query.system,
		prompt: query.prompt,
		temperature: config.temperature,
		max_tokens: config.max_tokens,
	})
}

/// Handle one line: run it as a command, or query the provider, print the
/// suggestion and record the pair when multi-turn is on.
pub async fn process_line(
	line: &str,
	store: &mut ContextStore,
	provider: &dyn CompletionProvider,
	out: &mut dyn Write,
) -> Result<LineOutcome> {
	let dispatch = commands::dispatch(line, store, out)?;
	if !dispatch.is_query() {
		return Ok(LineOutcome::Command(dispatch));
	}

	let request = build_request(store, line)?;
	crate::log_debug!(
		"Querying {} with model {} ({} prompt bytes)",
		provider.name(),
		request.model,
		request.prompt.len()
	);

	let completion = provider.complete(&request).await?;
	writeln!(out, "{}", completion.content)?;

	if store.config().multi_turn && !completion.content.is_empty() {
		store.append_pair(line, &completion.content)?;
	}

	Ok(LineOutcome::Completed(completion))
}
