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

// Session module: context file, command language and query flow

pub mod commands; // In-band command language
pub mod context_store; // File-backed interaction history
pub mod logger; // JSONL audit log
pub mod providers; // Completion provider abstraction
pub mod query; // Query assembly and per-line flow
pub mod settings; // Session config and header encoding
mod token_counter; // Token counting utilities

pub use commands::{dispatch, Command, Dispatch};
pub use context_store::ContextStore;
pub use providers::{Completion, CompletionProvider, CompletionRequest, OpenAiProvider, TokenUsage};
pub use query::{assemble, process_line, LineOutcome, Query};
pub use settings::SessionConfig;
pub use token_counter::estimate_tokens;
