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

//! File-backed interaction history ("prompt file").
//!
//! The file is a six-line configuration header followed by the body: past
//! input/output pairs and loaded fragments in insertion order. Every mutation
//! reads the whole file, changes it in memory and writes the whole file back.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::settings::{SessionConfig, HEADER_LINES};
use super::token_counter::estimate_tokens;
use crate::error::{CliError, Result};

/// In-memory image of the whole context file
struct Document {
	config: SessionConfig,
	body: String,
}

/// Split `content` into a parsed header and the body that follows it
fn split_header(content: &str) -> std::result::Result<(SessionConfig, &str), String> {
	let mut offset = 0;
	let mut header_lines = Vec::with_capacity(HEADER_LINES);
	for line in content.split_inclusive('\n').take(HEADER_LINES) {
		offset += line.len();
		header_lines.push(line);
	}
	let config = SessionConfig::from_header_lines(&header_lines)?;
	Ok((config, &content[offset..]))
}

/// Append `text` to `body` keeping both newline terminated
fn append_text(body: &mut String, text: &str) {
	if text.is_empty() {
		return;
	}
	if !body.is_empty() && !body.ends_with('\n') {
		body.push('\n');
	}
	body.push_str(text);
	if !body.ends_with('\n') {
		body.push('\n');
	}
}

/// Render one input/output pair as a body block: input lines commented out,
/// then the output.
pub fn format_pair(input: &str, output: &str, comment_marker: &str) -> String {
	let mut block = String::new();
	for line in input.trim_end().lines() {
		if line.trim_start().starts_with(comment_marker) {
			block.push_str(line);
		} else {
			block.push_str(comment_marker);
			block.push(' ');
			block.push_str(line);
		}
		block.push('\n');
	}
	let output = output.trim_end();
	if !output.is_empty() {
		block.push_str(output);
		block.push('\n');
	}
	block
}

/// Sibling used for the write-then-rename: `<file name>.tmp`
fn temp_path(path: &Path) -> PathBuf {
	let mut name = path.as_os_str().to_owned();
	name.push(".tmp");
	PathBuf::from(name)
}

#[derive(Debug)]
pub struct ContextStore {
	path: PathBuf,
	config: SessionConfig,
}

impl ContextStore {
	/// Open the context file at `path`, restoring the session config from its
	/// header. A missing or empty file is initialized with `defaults`.
	pub fn open(path: impl Into<PathBuf>, defaults: SessionConfig) -> Result<Self> {
		let path = path.into();

		let existing = match fs::read_to_string(&path) {
			Ok(content) => Some(content),
			Err(e) if e.kind() == ErrorKind::NotFound => None,
			Err(e) => return Err(e.into()),
		};

		match existing {
			Some(content) if !content.trim().is_empty() => {
				let (config, _) =
					split_header(&content).map_err(|reason| CliError::MalformedContextFile {
						path: path.clone(),
						reason,
					})?;
				crate::log_debug!("Loaded context file {}", path.display());
				Ok(Self { path, config })
			}
			_ => {
				let store = Self {
					path,
					config: defaults,
				};
				store.write_document(&store.config, "")?;
				crate::log_info!("Initialized context file {}", store.path.display());
				Ok(store)
			}
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn config(&self) -> &SessionConfig {
		&self.config
	}

	/// Replace the session config and persist it in the header.
	pub fn set_config(&mut self, config: SessionConfig) -> Result<()> {
		let doc = self.read_document()?;
		self.write_document(&config, &doc.body)?;
		self.config = config;
		Ok(())
	}

	/// Truncate the body and rewrite a fresh header (token count back to 0).
	pub fn reset(&mut self) -> Result<()> {
		let mut config = self.config.clone();
		config.token_count = 0;
		self.write_document(&config, "")?;
		self.config = config;
		Ok(())
	}

	/// Append one input/output block to the body.
	pub fn append_pair(&mut self, input: &str, output: &str) -> Result<()> {
		let block = format_pair(input, output, self.config.shell.comment_marker());
		let mut doc = self.read_document()?;
		append_text(&mut doc.body, &block);
		doc.config.token_count += estimate_tokens(&block);
		self.write_document(&doc.config, &doc.body)?;
		self.config = doc.config;
		Ok(())
	}

	/// The whole body, header excluded
	pub fn body(&self) -> Result<String> {
		Ok(self.read_document()?.body)
	}

	/// Last `n` body lines, read from the file on every call. `None` or `0`
	/// yields the whole body.
	pub fn tail(&self, n: Option<usize>) -> Result<impl Iterator<Item = String>> {
		let body = self.body()?;
		let lines: Vec<String> = body.lines().map(str::to_string).collect();
		let skip = match n {
			Some(n) if n > 0 => lines.len().saturating_sub(n),
			_ => 0,
		};
		Ok(lines.into_iter().skip(skip))
	}

	/// Copy the whole context file (header and body) to `filename`.
	pub fn save_as(&self, filename: &str) -> Result<PathBuf> {
		let destination = self.resolve(filename);
		if !self.path.is_file() {
			return Err(CliError::FileNotFound(self.path.clone()));
		}
		if destination != self.path {
			fs::copy(&self.path, &destination)?;
		}
		crate::log_info!("Context saved to {}", destination.display());
		Ok(destination)
	}

	/// Append the body of another context file (or the whole content of a
	/// header-less file) to this body.
	pub fn load_from(&mut self, filename: &str) -> Result<()> {
		let source = self.resolve(filename);
		let content = match fs::read_to_string(&source) {
			Ok(content) => content,
			Err(e) if e.kind() == ErrorKind::NotFound => {
				return Err(CliError::FileNotFound(source));
			}
			Err(e) => return Err(e.into()),
		};

		let fragment = match split_header(&content) {
			Ok((_, body)) => body,
			Err(_) => content.as_str(),
		};

		let mut doc = self.read_document()?;
		append_text(&mut doc.body, fragment);
		doc.config.token_count += estimate_tokens(fragment);
		self.write_document(&doc.config, &doc.body)?;
		self.config = doc.config;
		crate::log_info!("Context loaded from {}", source.display());
		Ok(())
	}

	/// Relative names live next to the context file; absolute paths are kept.
	pub fn resolve(&self, filename: &str) -> PathBuf {
		let candidate = Path::new(filename);
		if candidate.is_absolute() {
			return candidate.to_path_buf();
		}
		match self.path.parent() {
			Some(dir) => dir.join(candidate),
			None => candidate.to_path_buf(),
		}
	}

	fn read_document(&self) -> Result<Document> {
		let content = match fs::read_to_string(&self.path) {
			Ok(content) => content,
			Err(e) if e.kind() == ErrorKind::NotFound => {
				return Err(CliError::FileNotFound(self.path.clone()));
			}
			Err(e) => return Err(e.into()),
		};
		let (config, body) =
			split_header(&content).map_err(|reason| CliError::MalformedContextFile {
				path: self.path.clone(),
				reason,
			})?;
		Ok(Document {
			config,
			body: body.to_string(),
		})
	}

	fn write_document(&self, config: &SessionConfig, body: &str) -> Result<()> {
		if let Some(parent) = self.path.parent() {
			if !parent.as_os_str().is_empty() && !parent.exists() {
				fs::create_dir_all(parent)?;
			}
		}

		let mut content = config.to_header();
		content.push_str(body);

		let tmp = temp_path(&self.path);
		fs::write(&tmp, content)?;
		fs::rename(&tmp, &self.path)?;
		Ok(())
	}
}
