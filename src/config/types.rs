use std::time::Duration;

use serde::Deserialize;

use crate::dispatch::{DEFAULT_HEADROOM_PERCENT, DispatchSettings};
use crate::error::ConfigError;
use crate::http::{HeaderSet, Request, RequestSpec};

/// Concurrency used when neither the plan nor the command line sets one.
pub const DEFAULT_CONCURRENCY: usize = 16;

#[derive(Debug, Default, Deserialize)]
pub struct PlanFile {
    pub concurrency: Option<usize>,
    pub fd_headroom_percent: Option<u8>,
    #[serde(default)]
    pub defaults: PlanDefaults,
    #[serde(default)]
    pub requests: Vec<PlanRequest>,
}

/// Values applied to every request that does not set them itself.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PlanDefaults {
    pub insecure: Option<bool>,
    pub timeout: Option<DurationValue>,
    pub headers: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct PlanRequest {
    pub url: String,
    pub method: Option<String>,
    pub body: Option<String>,
    pub headers: Option<Vec<String>>,
    pub insecure: Option<bool>,
    pub timeout: Option<DurationValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Millis(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ConfigError> {
        match self {
            DurationValue::Millis(ms) => Ok(Duration::from_millis(*ms)),
            DurationValue::Text(text) => super::parse_duration_value(text),
        }
    }

    pub(crate) fn to_timeout_ms(&self) -> Result<i64, ConfigError> {
        let duration = self.to_duration()?;
        i64::try_from(duration.as_millis()).or(Err(ConfigError::DurationOverflow))
    }
}

impl PlanFile {
    /// Settings for the dispatcher running this plan.
    ///
    /// # Errors
    ///
    /// Returns an error when `fd_headroom_percent` is outside `1..=100`.
    pub fn dispatch_settings(&self) -> Result<DispatchSettings, ConfigError> {
        let headroom_percent = self.fd_headroom_percent.unwrap_or(DEFAULT_HEADROOM_PERCENT);
        if !(1..=100).contains(&headroom_percent) {
            return Err(ConfigError::InvalidHeadroom {
                value: headroom_percent,
            });
        }
        Ok(DispatchSettings { headroom_percent })
    }

    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency.unwrap_or(DEFAULT_CONCURRENCY)
    }

    /// Builds one validated request per plan entry, in plan order.
    ///
    /// # Errors
    ///
    /// Returns the first entry that fails, with its zero-based index.
    pub fn into_requests(self) -> Result<Vec<Request>, ConfigError> {
        let PlanFile {
            defaults, requests, ..
        } = self;
        if requests.is_empty() {
            return Err(ConfigError::NoRequests);
        }
        let default_headers = match &defaults.headers {
            Some(lines) => HeaderSet::parse_lines(lines)
                .map_err(|err| ConfigError::InvalidDefaults { source: err })?,
            None => HeaderSet::new(),
        };

        requests
            .into_iter()
            .enumerate()
            .map(|(index, entry)| build_request(index, entry, &defaults, &default_headers))
            .collect()
    }
}

fn build_request(
    index: usize,
    entry: PlanRequest,
    defaults: &PlanDefaults,
    default_headers: &HeaderSet,
) -> Result<Request, ConfigError> {
    let invalid = |err| ConfigError::InvalidRequest { index, source: err };

    let mut headers = default_headers.clone();
    if let Some(lines) = &entry.headers {
        headers.extend(&HeaderSet::parse_lines(lines).map_err(invalid)?);
    }

    let timeout_ms = match entry.timeout.as_ref().or(defaults.timeout.as_ref()) {
        Some(value) => value
            .to_timeout_ms()
            .map_err(|err| ConfigError::InvalidTimeout {
                index,
                source: Box::new(err),
            })?,
        None => 0,
    };
    let insecure = entry.insecure.or(defaults.insecure).unwrap_or(false);

    let mut spec = RequestSpec::new(entry.url, entry.method.unwrap_or_else(|| "GET".to_owned()))
        .headers(headers)
        .skip_tls_verification(insecure)
        .timeout_ms(timeout_ms);
    if let Some(body) = entry.body {
        spec = spec.body(body);
    }
    Request::new(spec).map_err(invalid)
}
