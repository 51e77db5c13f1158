//! Configuration management for `syncwatch.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── project    # [[project]]
//! │   └── sync       # [sync]
//! ├── types/         # Utility types
//! │   └── error      # ConfigError, ConfigDiagnostics
//! ├── util.rs        # Config discovery, command resolution
//! └── mod.rs         # SyncConfig (this file)
//! ```
//!
//! CLI flags override file values. The resulting [`SyncConfig`] is passed
//! explicitly to everything that needs it; nothing below the CLI reads the
//! process environment.

pub mod section;
pub mod types;
mod util;

use util::{find_config_file, resolve_command};

pub use section::{ProjectSection, SyncSection};
pub use types::{ConfigDiagnostics, ConfigError};

use crate::actor::invoker::{MockCommand, SyncCommand};
use crate::cli::{Cli, CommandArgs};
use crate::log;
use crate::utils::path::resolve_path;
use anyhow::Result;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing syncwatch.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Directory of the config file, or cwd without one (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Sync command settings
    #[serde(default)]
    pub sync: SyncSection,

    /// Watched projects
    #[serde(default, rename = "project")]
    pub projects: Vec<ProjectSection>,
}

impl SyncConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. `sync` works without
    /// one; the other commands require it.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = path;
                config
            }
            None if cli.is_sync() => Self::default(),
            None => return Err(ConfigError::NotFound(cli.config.clone()).into()),
        };

        config.finalize(cli.command_args());

        if !cli.is_sync() {
            config.validate()?;
        }

        Ok(config)
    }

    /// Finalize configuration after loading.
    fn finalize(&mut self, args: &CommandArgs) {
        let root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_default();
        self.root = root;

        self.apply_command_args(args);
        self.normalize_paths();
    }

    /// CLI overrides win over file values.
    fn apply_command_args(&mut self, args: &CommandArgs) {
        Self::update_option(&mut self.sync.command, args.command.as_ref());
        Self::update_option(&mut self.sync.mock_command, args.mock_command.as_ref());
        Self::update_option(&mut self.sync.loader, args.loader.as_ref());
    }

    fn normalize_paths(&mut self) {
        self.sync.command = resolve_command(&self.sync.command, &self.root);
        if let Some(mock) = self.sync.mock().map(str::to_string) {
            self.sync.mock_command = resolve_path(&mock, &self.root).display().to_string();
        }
        for project in &mut self.projects {
            project.normalize_paths(&self.root);
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(target: &mut T, value: Option<&T>) {
        if let Some(v) = value {
            *target = v.clone();
        }
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate the whole config, reporting every problem at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        if self.sync.command.trim().is_empty() {
            diag.error_with_hint(
                "sync.command",
                "sync command path is empty",
                "set `[sync] command` or pass `--command <path>`",
            );
        }

        if self.projects.is_empty() {
            diag.error_with_hint(
                "project",
                "no projects configured",
                "add a `[[project]]` entry with `id` and `path`",
            );
        }

        let mut seen = FxHashSet::default();
        for (i, project) in self.projects.iter().enumerate() {
            if project.id.trim().is_empty() {
                diag.error(format!("project[{i}].id"), "project id is empty");
            } else if !seen.insert(project.id.as_str()) {
                diag.error(
                    format!("project[{i}].id"),
                    format!("duplicate project id `{}`", project.id),
                );
            }

            if project.path.trim().is_empty() {
                diag.error(format!("project[{i}].path"), "project path is empty");
            }
        }

        diag.into_result()
    }

    // ========================================================================
    // accessors
    // ========================================================================

    pub fn project(&self, id: &str) -> Option<&ProjectSection> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Sync command description for one project.
    pub fn sync_command(&self, project_id: &str, project_path: &str) -> SyncCommand {
        SyncCommand {
            project_id: project_id.to_string(),
            project_path: project_path.to_string(),
            command_path: PathBuf::from(&self.sync.command),
            mock: self.sync.mock().map(|jar| MockCommand {
                jar: PathBuf::from(jar),
                loader: self.sync.loader.clone(),
            }),
        }
    }
}

/// Parse config, panicking if there are unknown fields (to catch config
/// typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SyncConfig {
    let (parsed, ignored) = SyncConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn finalized(content: &str, args: CommandArgs) -> SyncConfig {
        let mut config = test_parse_config(content);
        config.config_path = PathBuf::from("/work/syncwatch.toml");
        config.finalize(&args);
        config
    }

    #[test]
    fn test_unknown_fields_are_collected() {
        let (_, ignored) =
            SyncConfig::parse_with_ignored("[sync]\ncommand = \"x\"\ncomand = \"typo\"").unwrap();
        assert_eq!(ignored, vec!["sync.comand".to_string()]);
    }

    #[test]
    fn test_invalid_toml() {
        let err = SyncConfig::parse_with_ignored("[sync\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_cli_overrides_file() {
        let config = finalized(
            "[sync]\ncommand = \"/opt/cwctl\"\nmock_command = \"/tmp/a.jar\"",
            CommandArgs {
                command: Some("/usr/local/bin/cwctl".into()),
                mock_command: Some("mock/b.jar".into()),
                loader: Some("/usr/bin/java".into()),
            },
        );
        assert_eq!(config.sync.command, "/usr/local/bin/cwctl");
        assert_eq!(config.sync.mock(), Some("/work/mock/b.jar"));
        assert_eq!(config.sync.loader, "/usr/bin/java");
        assert_eq!(config.root, PathBuf::from("/work"));
    }

    #[cfg(unix)]
    #[test]
    fn test_projects_resolved_against_root() {
        let config = finalized(
            "[sync]\ncommand = \"/opt/cwctl\"\n[[project]]\nid = \"a\"\npath = \"apps/a\"",
            CommandArgs::default(),
        );
        assert_eq!(config.projects[0].path, "/work/apps/a");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_all_problems() {
        let config = finalized(
            r#"
[[project]]
id = "a"
path = "/work/a"

[[project]]
id = "a"
path = ""

[[project]]
id = ""
path = "/work/c"
"#,
            CommandArgs::default(),
        );
        let Err(ConfigError::Diagnostics(diag)) = config.validate() else {
            panic!("expected diagnostics");
        };
        let fields: Vec<_> = diag.errors().iter().map(|d| d.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["sync.command", "project[1].id", "project[1].path", "project[2].id"]
        );
    }

    #[test]
    fn test_validate_requires_projects() {
        let config = finalized("[sync]\ncommand = \"/opt/cwctl\"", CommandArgs::default());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sync_command_for_project() {
        let config = finalized(
            "[sync]\ncommand = \"/opt/cwctl/cwctl\"\nmock_command = \"/tmp/mock.jar\"",
            CommandArgs::default(),
        );
        let cmd = config.sync_command("id-1", "/work/a");
        assert_eq!(cmd.project_id, "id-1");
        assert_eq!(cmd.project_path, "/work/a");
        let mock = cmd.mock.unwrap();
        assert_eq!(mock.loader, "java");
        assert!(mock.jar.ends_with("mock.jar"));
    }
}
