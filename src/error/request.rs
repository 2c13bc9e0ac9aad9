use thiserror::Error;

/// Errors raised while building a [`crate::Request`].
///
/// A request that fails any of these checks is never constructed.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("URL '{url}' does not start with http:// or https://.")]
    InvalidUrlPrefix { url: String },
    #[error("Unsupported HTTP method '{method}'. Use GET, POST, PUT, DELETE, HEAD, or OPTIONS.")]
    UnsupportedMethod { method: String },
    #[error("Header list must contain key/value pairs, got {len} entries.")]
    MalformedHeaderList { len: usize },
    #[error("Invalid header line '{line}'. Expected 'Key: Value'.")]
    InvalidHeaderLine { line: String },
    #[error("Invalid header name '{name}': {source}")]
    InvalidHeaderName {
        name: String,
        #[source]
        source: http::header::InvalidHeaderName,
    },
    #[error("Invalid header value for '{name}': {source}")]
    InvalidHeaderValue {
        name: String,
        #[source]
        source: http::header::InvalidHeaderValue,
    },
    #[error("GET body must be a UTF-8 query string: {source}")]
    QueryNotUtf8 {
        #[source]
        source: std::string::FromUtf8Error,
    },
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Failed to build HTTP transport: {source}")]
    BuildTransport {
        #[source]
        source: reqwest::Error,
    },
}
