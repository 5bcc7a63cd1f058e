//! Access to the machine being inventoried.
//!
//! Every collector reaches the system through [`Host`], so the whole engine can
//! run against canned tool captures in tests.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use tracing::{debug, warn};

/// Default budget for a tool invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Exit status `timeout(1)` reports when it had to kill the child.
const TIMEOUT_EXIT_CODE: i32 = 124;

/// Result of running an external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command finished (successfully or not) and printed this on stdout.
    Completed(String),
    /// The command was killed for exceeding its timeout.
    TimedOut,
}

impl CommandOutcome {
    /// Captured stdout, or an empty string when the command timed out.
    pub fn into_stdout(self) -> String {
        match self {
            CommandOutcome::Completed(out) => out,
            CommandOutcome::TimedOut => String::new(),
        }
    }

    pub fn timed_out(&self) -> bool {
        matches!(self, CommandOutcome::TimedOut)
    }
}

pub trait Host {
    /// Run a shell command line, bounded by `timeout`.
    ///
    /// Non-zero exits are not errors: callers get whatever was printed.
    fn run(&self, command: &str, timeout: Duration) -> CommandOutcome;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    fn exists(&self, path: &Path) -> bool;

    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;

    /// Paths matching a glob pattern, sorted.
    fn glob(&self, pattern: &str) -> Vec<PathBuf>;

    fn hostname(&self) -> Option<String>;

    /// Whether `name` resolves to something the shell can run.
    fn has_command(&self, name: &str) -> bool;
}

/// The real machine.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxHost;

impl Host for LinuxHost {
    fn run(&self, command: &str, timeout: Duration) -> CommandOutcome {
        let secs = timeout.as_secs().max(1);
        let wrapped = format!("timeout {} {}", secs, command);
        debug!(command, timeout_secs = secs, "running command");

        let output = match Command::new("sh").arg("-c").arg(&wrapped).output() {
            Ok(o) => o,
            Err(e) => {
                warn!(command, error = %e, "failed to spawn command");
                return CommandOutcome::Completed(String::new());
            }
        };

        if output.status.code() == Some(TIMEOUT_EXIT_CODE) {
            warn!(command, timeout_secs = secs, "command timed out");
            return CommandOutcome::TimedOut;
        }

        CommandOutcome::Completed(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        fs::read_link(path)
    }

    fn glob(&self, pattern: &str) -> Vec<PathBuf> {
        let paths = match glob::glob(pattern) {
            Ok(p) => p,
            Err(e) => {
                warn!(pattern, error = %e, "invalid glob pattern");
                return Vec::new();
            }
        };
        let mut found: Vec<PathBuf> = paths.flatten().collect();
        found.sort();
        found
    }

    fn hostname(&self) -> Option<String> {
        sysinfo::System::host_name().filter(|h| !h.is_empty())
    }

    fn has_command(&self, name: &str) -> bool {
        // `command` is a shell builtin, so it cannot sit behind `timeout(1)`.
        let output = Command::new("sh")
            .arg("-c")
            .arg("command -v \"$1\"")
            .arg("sh")
            .arg(name)
            .output();
        match output {
            Ok(o) => o.status.success() && !String::from_utf8_lossy(&o.stdout).trim().is_empty(),
            Err(e) => {
                warn!(name, error = %e, "failed to spawn shell");
                false
            }
        }
    }
}

/// Read a file and trim it, treating empty content as absent.
pub fn read_trimmed(host: &dyn Host, path: &Path) -> Option<String> {
    host.read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Final path component of a symlink target, e.g. `0000:06:00.0`.
pub fn link_basename(host: &dyn Host, path: &Path) -> Option<String> {
    let target = host.read_link(path).ok()?;
    target
        .file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.to_string())
}
