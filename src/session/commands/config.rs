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

// Show config command handler

use std::io::Write;

use super::super::context_store::ContextStore;
use crate::error::Result;

pub fn handle_show_config(store: &ContextStore, out: &mut dyn Write) -> Result<&'static str> {
	writeln!(out)?;
	for (key, value) in store.config().entries() {
		writeln!(out, "# {}: {}", key, value)?;
	}
	Ok("config shown")
}
