//! CLI subcommands and the helpers they share.

pub mod config;
pub mod invoices;
pub mod output;
pub mod report;
pub mod sales;

use std::path::{Path, PathBuf};

use glob::{glob, Pattern};
use tracing::debug;

use salesdash_core::{load_sources, LoadedSources, SalesConfig, SalesError};

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("salesdash")
        .join("config.json")
}

/// Resolve the config file: explicit path, then the default path, then defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<SalesConfig> {
    if let Some(path) = config_path {
        return Ok(SalesConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(SalesConfig::from_file(&default_path)?)
    } else {
        Ok(SalesConfig::default())
    }
}

/// Expand files, directories and glob patterns into sheet files.
///
/// Directories and patterns only yield files with one of `extensions`;
/// explicitly named files are taken as given.
pub fn expand_inputs(inputs: &[String], extensions: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        let path = Path::new(input);

        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }

        let pattern = if path.is_dir() {
            format!("{}/*", Pattern::escape(input.trim_end_matches('/')))
        } else {
            input.clone()
        };

        let mut matched: Vec<PathBuf> = glob(&pattern)?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file() && has_extension(p, extensions))
            .collect();
        matched.sort();
        files.extend(matched);
    }

    let mut seen = std::collections::HashSet::new();
    files.retain(|p| seen.insert(p.clone()));

    Ok(files)
}

/// Load sheet files. Skipped files are logged by the loader.
///
/// Returns `None` when nothing readable was found.
pub fn load_reported(files: &[PathBuf]) -> anyhow::Result<Option<LoadedSources>> {
    if files.is_empty() {
        return Ok(None);
    }

    match load_sources(files) {
        Ok(loaded) => Ok(Some(loaded)),
        Err(SalesError::NoData) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext))
}
