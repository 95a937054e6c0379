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

// Set command handlers

use std::io::Write;

use super::super::context_store::ContextStore;
use super::super::settings::SessionConfig;
use crate::error::Result;
use crate::shell::Shell;

const STATUS: &str = "config set";

/// Apply `update` to a copy of the config, persist it and confirm.
fn apply(
	store: &mut ContextStore,
	out: &mut dyn Write,
	update: impl FnOnce(&mut SessionConfig) -> String,
) -> Result<&'static str> {
	let mut config = store.config().clone();
	let confirmation = update(&mut config);
	store.set_config(config)?;
	writeln!(out, "{}", confirmation)?;
	Ok(STATUS)
}

pub fn handle_temperature(store: &mut ContextStore, value: f32, out: &mut dyn Write) -> Result<&'static str> {
	apply(store, out, |config| {
		config.temperature = value;
		format!("# Temperature set to {}", value)
	})
}

pub fn handle_max_tokens(store: &mut ContextStore, value: u32, out: &mut dyn Write) -> Result<&'static str> {
	apply(store, out, |config| {
		config.max_tokens = value;
		format!("# Max tokens set to {}", value)
	})
}

pub fn handle_shell(store: &mut ContextStore, value: Shell, out: &mut dyn Write) -> Result<&'static str> {
	apply(store, out, |config| {
		config.shell = value;
		format!("# Shell set to {}", value)
	})
}

pub fn handle_model(store: &mut ContextStore, value: String, out: &mut dyn Write) -> Result<&'static str> {
	apply(store, out, |config| {
		let confirmation = format!("# Model set to {}", value);
		config.model = value;
		confirmation
	})
}
