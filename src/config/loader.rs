use std::path::Path;

use tracing::debug;

use crate::error::{AppError, AppResult, ConfigError};

use super::types::PlanFile;

/// Reads a plan file, picking the format from its extension.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed, or when it
/// lists no requests.
pub fn load_plan(path: &Path) -> AppResult<PlanFile> {
    let content = std::fs::read_to_string(path).map_err(|err| {
        AppError::config(ConfigError::ReadConfig {
            path: path.to_path_buf(),
            source: err,
        })
    })?;
    let plan: PlanFile = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseToml {
                path: path.to_path_buf(),
                source: err,
            })
        })?,
        Some("json") => serde_json::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseJson {
                path: path.to_path_buf(),
                source: err,
            })
        })?,
        Some(ext) => {
            return Err(AppError::config(ConfigError::UnsupportedExtension {
                ext: ext.to_owned(),
            }));
        }
        None => return Err(AppError::config(ConfigError::MissingExtension)),
    };

    if plan.requests.is_empty() {
        return Err(AppError::config(ConfigError::NoRequests));
    }
    debug!(
        "Loaded plan {} with {} requests",
        path.display(),
        plan.requests.len()
    );
    Ok(plan)
}
