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

// Multi-turn command handlers

use super::super::context_store::ContextStore;
use crate::error::Result;

pub fn handle_start(store: &mut ContextStore) -> Result<&'static str> {
	if !store.config().multi_turn {
		let mut config = store.config().clone();
		config.multi_turn = true;
		store.set_config(config)?;
		crate::log_info!("Multi-turn mode enabled");
	}
	Ok("multi turn mode on")
}

// History is kept; only new pairs stop being recorded
pub fn handle_stop(store: &mut ContextStore) -> Result<&'static str> {
	let mut config = store.config().clone();
	config.multi_turn = false;
	store.set_config(config)?;
	crate::log_info!("Multi-turn mode disabled");
	Ok("multi turn mode off")
}
