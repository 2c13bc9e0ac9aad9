use std::collections::BTreeMap;
use std::time::Duration;

use bytes::Bytes;

use crate::error::ExecError;

/// Separator used when a response carries the same header more than once.
pub const HEADER_VALUE_SEPARATOR: &str = ",";

/// A cookie set by the server through `Set-Cookie`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub secure: bool,
    pub http_only: bool,
}

impl Cookie {
    pub(crate) fn from_reqwest(cookie: &reqwest::cookie::Cookie<'_>) -> Self {
        Self {
            name: cookie.name().to_owned(),
            value: cookie.value().to_owned(),
            domain: cookie.domain().map(str::to_owned),
            path: cookie.path().map(str::to_owned),
            secure: cookie.secure(),
            http_only: cookie.http_only(),
        }
    }
}

/// A fully received response.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub cookies: Vec<Cookie>,
    pub body: Bytes,
}

impl Reply {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Result of executing one request.
///
/// `elapsed` is always recorded, also when the call failed part way.
#[derive(Debug)]
pub struct Outcome {
    pub elapsed: Duration,
    pub reply: Result<Reply, ExecError>,
}

impl Outcome {
    #[must_use]
    pub const fn success(reply: Reply, elapsed: Duration) -> Self {
        Self {
            elapsed,
            reply: Ok(reply),
        }
    }

    #[must_use]
    pub const fn failure(error: ExecError, elapsed: Duration) -> Self {
        Self {
            elapsed,
            reply: Err(error),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.reply.is_ok()
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.reply.as_ref().ok().map(|reply| reply.status)
    }

    #[must_use]
    pub fn error(&self) -> Option<&ExecError> {
        self.reply.as_ref().err()
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.error().is_some_and(ExecError::is_timeout)
    }
}
