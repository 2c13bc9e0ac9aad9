use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::Url;
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, warn};

use crate::error::RequestError;

use super::headers::HeaderSet;
use super::method::Method;
use super::query::{escape_query, merge_query};
use super::transport::{HttpTransport, TlsPolicy, TransportPolicy};

/// Adjustments made while building a request that the caller should know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestWarning {
    /// A negative timeout was replaced by its absolute value.
    NegativeTimeout { requested_ms: i64 },
}

/// Declarative description of a request, validated by [`Request::new`].
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub url: String,
    pub method: String,
    pub body: Option<Bytes>,
    pub headers: HeaderSet,
    pub tls: TlsPolicy,
    /// Milliseconds; `0` waits forever, negative values are taken as absolute.
    pub timeout_ms: i64,
    /// Transport to bind instead of the shared one for `tls`.
    pub transport: Option<Arc<dyn HttpTransport>>,
}

impl RequestSpec {
    #[must_use]
    pub fn new(url: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            body: None,
            headers: HeaderSet::new(),
            tls: TlsPolicy::Verify,
            timeout_ms: 0,
            transport: None,
        }
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn headers(mut self, headers: HeaderSet) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub const fn skip_tls_verification(mut self, skip: bool) -> Self {
        self.tls = TlsPolicy::from_skip_verification(skip);
        self
    }

    #[must_use]
    pub const fn timeout_ms(mut self, timeout_ms: i64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }
}

/// A validated, immutable request bound to its transport and timeout.
///
/// Cloning is cheap and executing the same request twice performs two
/// independent calls.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: String,
    target: Url,
    body: Option<Bytes>,
    headers: HeaderMap,
    tls: TlsPolicy,
    timeout: Option<Duration>,
    warnings: Vec<RequestWarning>,
    transport: Arc<dyn HttpTransport>,
}

impl Request {
    /// Validates `spec` and builds an executable request.
    ///
    /// Checks run in order and stop at the first failure: URL scheme prefix,
    /// method, GET query merge, POST body default, query escaping, headers,
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] describing the first check that failed.
    pub fn new(spec: RequestSpec) -> Result<Self, RequestError> {
        let RequestSpec {
            url,
            method,
            body,
            headers,
            tls,
            timeout_ms,
            transport,
        } = spec;

        if !url.starts_with("http://") && !url.starts_with("https://") {
            debug!("Rejecting URL without http/https prefix: {}", url);
            return Err(RequestError::InvalidUrlPrefix { url });
        }

        let method: Method = method.parse()?;

        let (url, body) = match method {
            Method::Get => match body {
                Some(args) if !args.is_empty() => {
                    let args = String::from_utf8(args.to_vec())
                        .map_err(|err| RequestError::QueryNotUtf8 { source: err })?;
                    (merge_query(&url, &args), None)
                }
                Some(_) | None => (url, None),
            },
            Method::Post => (url, Some(body.unwrap_or_default())),
            Method::Put | Method::Delete | Method::Head | Method::Options => (url, body),
        };

        let url = escape_query(&url);
        let target = Url::parse(&url).map_err(|err| RequestError::InvalidUrl {
            url: url.clone(),
            source: err,
        })?;

        let mut header_map = apply_headers(&headers)?;
        if method == Method::Post && !header_map.contains_key(CONTENT_LENGTH) {
            let length = body.as_ref().map_or(0, Bytes::len);
            debug!("Content-Length not provided, deriving {} from body", length);
            header_map.insert(CONTENT_LENGTH, HeaderValue::from(length));
        }

        let mut warnings = Vec::new();
        let timeout = resolve_timeout(timeout_ms, &mut warnings);

        let transport = match transport {
            Some(transport) => transport,
            None => TransportPolicy::shared(tls)?,
        };

        debug!("Prepared {} {} (tls={:?}, timeout={:?})", method, url, tls, timeout);
        Ok(Self {
            method,
            url,
            target,
            body,
            headers: header_map,
            tls,
            timeout,
            warnings,
            transport,
        })
    }

    /// Positional form of [`Request::new`].
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] describing the first check that failed.
    pub fn build(
        url: &str,
        method: &str,
        body: Option<&[u8]>,
        headers: &HeaderSet,
        skip_tls_verification: bool,
        timeout_ms: i64,
    ) -> Result<Self, RequestError> {
        let mut spec = RequestSpec::new(url, method)
            .headers(headers.clone())
            .skip_tls_verification(skip_tls_verification)
            .timeout_ms(timeout_ms);
        spec.body = body.map(Bytes::copy_from_slice);
        Self::new(spec)
    }

    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// URL as validated, before parsing normalised it. See [`Request::target`]
    /// for what goes on the wire.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Parsed URL the request is sent to.
    #[must_use]
    pub const fn target(&self) -> &Url {
        &self.target
    }

    #[must_use]
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub const fn tls(&self) -> TlsPolicy {
        self.tls
    }

    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    #[must_use]
    pub fn warnings(&self) -> &[RequestWarning] {
        &self.warnings
    }

    pub(crate) fn transport(&self) -> &dyn HttpTransport {
        self.transport.as_ref()
    }

    /// Materialises a fresh wire request; the descriptor itself is untouched.
    pub(crate) fn to_wire(&self) -> reqwest::Request {
        let mut request = reqwest::Request::new(self.method.to_reqwest(), self.target.clone());
        *request.headers_mut() = self.headers.clone();
        if let Some(body) = self.body.as_ref() {
            *request.body_mut() = Some(reqwest::Body::from(body.clone()));
        }
        *request.timeout_mut() = self.timeout;
        request
    }
}

fn apply_headers(headers: &HeaderSet) -> Result<HeaderMap, RequestError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (key, value) in headers.iter() {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|err| {
            RequestError::InvalidHeaderName {
                name: key.to_owned(),
                source: err,
            }
        })?;
        let val = HeaderValue::from_str(value).map_err(|err| RequestError::InvalidHeaderValue {
            name: key.to_owned(),
            source: err,
        })?;
        // Authorization accumulates so several schemes can be sent together.
        if name == AUTHORIZATION {
            map.append(name, val);
        } else {
            map.insert(name, val);
        }
    }
    Ok(map)
}

fn resolve_timeout(timeout_ms: i64, warnings: &mut Vec<RequestWarning>) -> Option<Duration> {
    if timeout_ms < 0 {
        warn!(
            "Negative timeout {}ms, using {}ms instead.",
            timeout_ms,
            timeout_ms.unsigned_abs()
        );
        warnings.push(RequestWarning::NegativeTimeout {
            requested_ms: timeout_ms,
        });
    }
    match timeout_ms.unsigned_abs() {
        0 => None,
        millis => Some(Duration::from_millis(millis)),
    }
}
