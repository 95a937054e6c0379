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

// Shell flavor detection

use regex::Regex;
use std::fmt;
use std::path::Path;
use std::process::Command;
use std::str::FromStr;
use std::sync::OnceLock;

fn process_name_pattern() -> Option<&'static Regex> {
	static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
	PATTERN
		.get_or_init(|| {
			Regex::new(
				r"^(?:(?P<powershell>pwsh|pwsh\.exe|powershell\.exe)|(?P<bash>bash|bash\.exe)|(?P<zsh>zsh|zsh\.exe))$",
			)
			.map_err(|e| crate::log_error!("Invalid shell name pattern: {}", e))
			.ok()
		})
		.as_ref()
}

/// Interactive shell family the tool was invoked from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shell {
	Bash,
	Zsh,
	PowerShell,
	#[default]
	Unknown,
}

impl Shell {
	pub fn as_str(&self) -> &'static str {
		match self {
			Shell::Bash => "bash",
			Shell::Zsh => "zsh",
			Shell::PowerShell => "powershell",
			Shell::Unknown => "unknown",
		}
	}

	/// Line comment marker of the shell
	pub fn comment_marker(&self) -> &'static str {
		// Every supported family uses '#'
		"#"
	}

	/// Command that opens `path` with the desktop's default application
	pub fn open_command(&self, path: &Path) -> Command {
		let mut command = match self {
			// `start` is a cmd builtin, not a program
			Shell::PowerShell => {
				let mut command = Command::new("cmd");
				command.args(["/C", "start", ""]);
				command
			}
			_ if cfg!(target_os = "linux") => Command::new("xdg-open"),
			_ => Command::new("open"),
		};
		command.arg(path);
		command
	}

	/// Classify a process name (e.g. `bash`, `pwsh.exe`).
	pub fn from_process_name(name: &str) -> Shell {
		let Some(captures) = process_name_pattern().and_then(|re| re.captures(name.trim())) else {
			return Shell::Unknown;
		};
		if captures.name("powershell").is_some() {
			Shell::PowerShell
		} else if captures.name("bash").is_some() {
			Shell::Bash
		} else {
			Shell::Zsh
		}
	}
}

impl fmt::Display for Shell {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Shell {
	type Err = std::convert::Infallible;

	/// Unrecognized names map to `Unknown`
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(match s.trim().to_lowercase().as_str() {
			"bash" => Shell::Bash,
			"zsh" => Shell::Zsh,
			"powershell" | "pwsh" => Shell::PowerShell,
			_ => Shell::Unknown,
		})
	}
}

/// Name of the parent process, when the platform exposes it
fn parent_process_name() -> Option<String> {
	#[cfg(target_os = "linux")]
	{
		let ppid = std::os::unix::process::parent_id();
		std::fs::read_to_string(format!("/proc/{}/comm", ppid))
			.ok()
			.map(|s| s.trim().to_string())
	}

	#[cfg(not(target_os = "linux"))]
	{
		None
	}
}

/// Detect the shell from the parent process, falling back to `$SHELL`.
pub fn detect_shell() -> Shell {
	if let Some(name) = parent_process_name() {
		let shell = Shell::from_process_name(&name);
		if shell != Shell::Unknown {
			crate::log_debug!("Detected shell '{}' from parent process", shell);
			return shell;
		}
	}

	let from_env = std::env::var("SHELL")
		.ok()
		.and_then(|path| {
			std::path::Path::new(&path)
				.file_name()
				.map(|n| n.to_string_lossy().into_owned())
		})
		.map(|name| Shell::from_process_name(&name))
		.unwrap_or_default();

	crate::log_debug!("Detected shell '{}' from SHELL", from_env);
	from_env
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_from_process_name() {
		assert_eq!(Shell::from_process_name("bash"), Shell::Bash);
		assert_eq!(Shell::from_process_name("bash.exe"), Shell::Bash);
		assert_eq!(Shell::from_process_name("zsh"), Shell::Zsh);
		assert_eq!(Shell::from_process_name("pwsh"), Shell::PowerShell);
		assert_eq!(Shell::from_process_name("powershell.exe"), Shell::PowerShell);

		// Full match only
		assert_eq!(Shell::from_process_name("bashful"), Shell::Unknown);
		assert_eq!(Shell::from_process_name("fish"), Shell::Unknown);
	}

	#[test]
	fn test_from_str_round_trip() {
		for shell in [Shell::Bash, Shell::Zsh, Shell::PowerShell, Shell::Unknown] {
			assert_eq!(shell.as_str().parse::<Shell>().unwrap(), shell);
		}
		assert_eq!("fish".parse::<Shell>().unwrap(), Shell::Unknown);
		assert_eq!("ZSH".parse::<Shell>().unwrap(), Shell::Zsh);
	}

	#[test]
	fn test_open_command() {
		let path = Path::new("/tmp/ctx.txt");

		let command = Shell::PowerShell.open_command(path);
		assert_eq!(command.get_program(), "cmd");
		let args: Vec<_> = command.get_args().collect();
		assert_eq!(args, ["/C", "start", "", "/tmp/ctx.txt"]);

		let command = Shell::Bash.open_command(path);
		assert_ne!(command.get_program(), "cmd");
		let args: Vec<_> = command.get_args().collect();
		assert_eq!(args, ["/tmp/ctx.txt"]);
		if cfg!(target_os = "linux") {
			assert_eq!(command.get_program(), "xdg-open");
		}
	}

	#[test]
	fn test_process_name_pattern_compiles() {
		assert!(process_name_pattern().is_some());
		assert_eq!(Shell::from_process_name(" zsh.exe\n"), Shell::Zsh);
		assert_eq!(Shell::from_process_name("pwsh.exe.old"), Shell::Unknown);
	}
}
