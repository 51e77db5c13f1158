//! External command execution utilities.
//!
//! Provides a Builder-based API for running a command to completion and
//! capturing its combined output together with the raw exit code.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! let output = Cmd::new("cwctl")
//!     .args(["project", "sync", "-p", "/work/app"])
//!     .cwd("/opt/cwctl")
//!     .output()?;
//!
//! if output.success() {
//!     // ...
//! }
//! ```

use anyhow::{Context, Result};
use regex::Regex;
use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{Command, Stdio},
    sync::OnceLock,
};

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Debug, Default, Clone)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
}

/// Result of a command that ran to completion.
#[derive(Debug, Clone)]
pub struct CmdOutput {
    /// Exit code, `None` if the process was terminated by a signal.
    pub code: Option<i32>,
    /// Stdout followed by stderr, lossily decoded.
    pub combined: String,
}

impl CmdOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Add a single argument.
    ///
    /// Empty arguments are kept: a blank value is still a positional slot
    /// for the callee.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_owned()));
        self
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Render arguments as `[ arg] ` fragments for log output.
    pub fn display_args(&self) -> String {
        self.get_args()
            .iter()
            .map(|a| format!("[ {}] ", a.to_string_lossy()))
            .collect()
    }

    /// Get the program name for error messages.
    fn program_name(&self) -> String {
        self.program().to_string_lossy().into_owned()
    }

    /// Spawn the command, wait for it, and capture stdout + stderr.
    ///
    /// A non-zero exit is not an error here; only failing to spawn or to
    /// collect the output is.
    pub fn output(&self) -> Result<CmdOutput> {
        let name = self.program_name();
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = self.get_cwd() {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .with_context(|| format!("Failed to execute `{name}`"))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CmdOutput {
            code: output.status.code(),
            combined,
        })
    }
}

// ============================================================================
// Output Filtering
// ============================================================================

/// Filter rule for command output logging.
///
/// Used to reduce noise by skipping known warnings or irrelevant messages.
pub struct FilterRule {
    /// Prefixes to skip when logging output.
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    /// Create a new filter rule.
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    /// Check if a line should be skipped.
    fn should_skip(&self, line: &str) -> bool {
        line.is_empty() || self.skip_prefixes.iter().any(|p| line.starts_with(p))
    }

    /// Lines of `output` that pass the filter, with ANSI codes removed.
    pub fn apply(&self, output: &str) -> Vec<String> {
        output
            .lines()
            .map(|line| strip_ansi(line).trim().to_string())
            .filter(|line| !self.should_skip(line))
            .collect()
    }
}

/// Empty filter (no skipping).
pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

// ============================================================================
// Helpers
// ============================================================================

/// Strip ANSI escape codes from string.
pub fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());
    re.replace_all(s, "")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_builder() {
        let cmd = Cmd::new("echo")
            .arg("hello")
            .args(["world", "!"])
            .cwd("/tmp");

        assert_eq!(cmd.program, OsString::from("echo"));
        assert_eq!(cmd.args.len(), 3);
        assert_eq!(cmd.cwd, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_display_args() {
        let cmd = Cmd::new("cwctl").args(["project", "sync"]);
        assert_eq!(cmd.display_args(), "[ project] [ sync] ");
    }

    #[test]
    fn test_filter_rule() {
        let filter = FilterRule::new(&["WARN:", "INFO:"]);
        assert!(filter.should_skip("WARN: something"));
        assert!(filter.should_skip("INFO: something"));
        assert!(!filter.should_skip("ERROR: something"));
        assert!(filter.should_skip(""));
    }

    #[test]
    fn test_filter_apply_strips_ansi() {
        let lines = EMPTY_FILTER.apply("\x1b[31mfailed\x1b[0m\n\n  ok  ");
        assert_eq!(lines, vec!["failed".to_string(), "ok".to_string()]);
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[31mRed\x1b[0m"), "Red");
        assert_eq!(strip_ansi("Plain text"), "Plain text");
    }

    #[cfg(unix)]
    #[test]
    fn test_output_captures_both_streams() {
        let output = Cmd::new("sh")
            .args(["-c", "echo out; echo err 1>&2; exit 3"])
            .output()
            .unwrap();
        assert_eq!(output.code, Some(3));
        assert!(!output.success());
        assert!(output.combined.contains("out"));
        assert!(output.combined.contains("err"));
    }

    #[cfg(unix)]
    #[test]
    fn test_output_respects_cwd() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = Cmd::new("pwd").cwd(dir.path()).output().unwrap();
        assert!(output.success());
        let expected = dir.path().canonicalize().unwrap();
        let actual = PathBuf::from(output.combined.trim()).canonicalize().unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_spawn_failure_is_error() {
        let result = Cmd::new("/definitely/not/a/real/binary-xyz").output();
        assert!(result.is_err());
    }
}
