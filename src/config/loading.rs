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

use std::fs;
use std::path::Path;

use super::Config;
use crate::error::{CliError, Result};

const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Comment-prefixed instructions printed when the credential file is missing
pub fn credentials_template(path: &Path) -> String {
	format!(
		"# Please create a file at {} and add your secret key\n\
		 # The format is:\n\
		 #\n\
		 # [openai]\n\
		 # organization_id = \"<organization-id>\"\n\
		 # secret_key = \"<your secret key>\"\n\
		 # model = \"<model-id>\"",
		path.display()
	)
}

impl Config {
	/// Load configuration from the system-wide credential file
	pub fn load() -> anyhow::Result<Self> {
		let path = crate::directories::get_credentials_file_path()?;
		Ok(Self::load_from(&path)?)
	}

	/// Load and validate the credential/config file at `path`
	pub fn load_from(path: &Path) -> Result<Self> {
		if !path.is_file() {
			return Err(CliError::MissingCredentialFile(path.to_path_buf()));
		}

		let raw = fs::read_to_string(path)?;
		let mut config: Config =
			toml::from_str(&raw).map_err(|e| CliError::MalformedCredentialFile {
				path: path.to_path_buf(),
				reason: e.message().to_string(),
			})?;

		config.config_path = Some(path.to_path_buf());
		config.normalize();

		// Environment variables take precedence over config file values
		if let Ok(key) = std::env::var(OPENAI_API_KEY_ENV) {
			if !key.trim().is_empty() {
				config.openai.secret_key = key;
			}
		}

		config.validate().map_err(|reason| CliError::MalformedCredentialFile {
			path: path.to_path_buf(),
			reason,
		})?;

		Ok(config)
	}

	/// Strip stray quotes users tend to leave around INI-style values
	fn normalize(&mut self) {
		for value in [
			&mut self.openai.organization_id,
			&mut self.openai.secret_key,
			&mut self.openai.model,
			&mut self.openai.api_base,
		] {
			*value = value.trim().trim_matches('"').trim_matches('\'').to_string();
		}
		while self.openai.api_base.ends_with('/') {
			self.openai.api_base.pop();
		}
		if self.openai.api_base.is_empty() {
			self.openai.api_base = super::default_api_base();
		}
	}

	pub fn validate(&self) -> std::result::Result<(), String> {
		if self.openai.secret_key.is_empty() {
			return Err("missing [openai] secret_key".to_string());
		}
		if self.openai.model.is_empty() {
			return Err("missing [openai] model".to_string());
		}
		if self.max_tokens == 0 {
			return Err("max_tokens must be greater than 0".to_string());
		}
		Ok(())
	}
}
