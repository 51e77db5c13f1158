//! `syncwatch check` - show what `watch` would do, and what looks wrong.
//!
//! Structural problems (no projects, duplicate ids, ...) are already
//! rejected while loading the config. This command adds checks that need
//! the file system.

use std::path::Path;

use anyhow::Result;

use crate::config::SyncConfig;
use crate::log;
use crate::utils::date::timestamp_to_string;

pub fn check_config(config: &SyncConfig) -> Result<()> {
    log!("check"; "config: {}", config.config_path.display());
    log!("check"; "sync command: {}", config.sync.command);
    if let Some(mock) = config.sync.mock() {
        log!("check"; "mock mode: {} -jar {}", config.sync.loader, mock);
    }

    for project in &config.projects {
        log!(
            "check";
            "[{}] {} (creation time {})",
            project.id,
            project.path,
            timestamp_to_string(project.creation_time)
        );
        for path in &project.watch {
            log!("check"; "[{}]   watch {}", project.id, path);
        }
    }

    let warnings = warnings(config);
    for warning in &warnings {
        log!("warning"; "{}", warning);
    }
    log!("check"; "{} project(s), {} warning(s)", config.projects.len(), warnings.len());

    Ok(())
}

/// Problems that only show up on disk.
fn warnings(config: &SyncConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    let command = Path::new(&config.sync.command);
    if config.sync.mock().is_none() && !command.is_file() {
        warnings.push(format!("sync command not found: {}", command.display()));
    }
    if let Some(mock) = config.sync.mock()
        && !Path::new(mock).is_file()
    {
        warnings.push(format!("mock command not found: {mock}"));
    }

    for project in &config.projects {
        if !project.root().is_dir() {
            warnings.push(format!("[{}] project path does not exist: {}", project.id, project.path));
        }
        for path in project.watch_paths() {
            if !path.exists() {
                warnings.push(format!("[{}] watch path does not exist yet: {}", project.id, path.display()));
            }
        }
    }

    warnings
}
