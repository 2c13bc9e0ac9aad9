use super::RequestError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read plan '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML plan '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse JSON plan '{path}': {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported plan extension '{ext}'. Use .toml or .json.")]
    UnsupportedExtension { ext: String },
    #[error("Plan file must have .toml or .json extension.")]
    MissingExtension,
    #[error("Plan must include at least one request.")]
    NoRequests,
    #[error("fd_headroom_percent must be between 1 and 100, got {value}.")]
    InvalidHeadroom { value: u8 },
    #[error("Plan defaults are invalid: {source}")]
    InvalidDefaults {
        #[source]
        source: RequestError,
    },
    #[error("Request {index} is invalid: {source}")]
    InvalidRequest {
        index: usize,
        #[source]
        source: RequestError,
    },
    #[error("Request {index} has an invalid timeout: {source}")]
    InvalidTimeout {
        index: usize,
        #[source]
        source: Box<ConfigError>,
    },
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
}
