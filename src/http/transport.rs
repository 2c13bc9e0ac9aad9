use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use reqwest::Client;
use tracing::{debug, error};

use crate::error::RequestError;

pub const DEFAULT_USER_AGENT: &str = concat!("batchreq/", env!("CARGO_PKG_VERSION"));

/// Anything able to send one HTTP request and hand back the response.
///
/// Implementations must be safe to share across tasks; the dispatcher calls
/// `execute` from many tasks at once.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response, reqwest::Error>;
}

#[async_trait]
impl HttpTransport for Client {
    async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response, reqwest::Error> {
        Client::execute(self, request).await
    }
}

/// Certificate verification policy of a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TlsPolicy {
    #[default]
    Verify,
    AcceptInvalidCerts,
}

impl TlsPolicy {
    #[must_use]
    pub const fn from_skip_verification(skip: bool) -> Self {
        if skip {
            TlsPolicy::AcceptInvalidCerts
        } else {
            TlsPolicy::Verify
        }
    }

    #[must_use]
    pub const fn skips_verification(self) -> bool {
        matches!(self, TlsPolicy::AcceptInvalidCerts)
    }
}

/// Connection parameters exposed by a transport.
#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub keep_alive: bool,
    pub pool_max_idle_per_host: Option<usize>,
    pub pool_idle_timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            keep_alive: true,
            pool_max_idle_per_host: None,
            pool_idle_timeout: None,
            connect_timeout: None,
            user_agent: Some(DEFAULT_USER_AGENT.to_owned()),
        }
    }
}

/// Resolves a [`TlsPolicy`] into a ready transport.
pub struct TransportPolicy;

static VERIFYING: OnceCell<Arc<dyn HttpTransport>> = OnceCell::new();
static ACCEPTING: OnceCell<Arc<dyn HttpTransport>> = OnceCell::new();

impl TransportPolicy {
    /// Returns the shared transport for the given verification mode.
    ///
    /// Each mode owns its own client, built once with default settings and
    /// never changed afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying HTTP client cannot be built.
    pub fn resolve(skip_tls_verification: bool) -> Result<Arc<dyn HttpTransport>, RequestError> {
        Self::shared(TlsPolicy::from_skip_verification(skip_tls_verification))
    }

    /// # Errors
    ///
    /// Returns an error when the underlying HTTP client cannot be built.
    pub fn shared(policy: TlsPolicy) -> Result<Arc<dyn HttpTransport>, RequestError> {
        let cell = match policy {
            TlsPolicy::Verify => &VERIFYING,
            TlsPolicy::AcceptInvalidCerts => &ACCEPTING,
        };
        cell.get_or_try_init(|| {
            let client = Self::build(policy, &TransportSettings::default())?;
            Ok::<Arc<dyn HttpTransport>, RequestError>(Arc::new(client))
        })
        .map(Arc::clone)
    }

    /// Builds a dedicated client that is not shared with any other request.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying HTTP client cannot be built.
    pub fn build(policy: TlsPolicy, settings: &TransportSettings) -> Result<Client, RequestError> {
        let mut builder = Client::builder();

        if let Some(agent) = settings.user_agent.as_deref() {
            builder = builder.user_agent(agent);
        }
        if let Some(connect_timeout) = settings.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        if !settings.keep_alive {
            builder = builder
                .pool_max_idle_per_host(0)
                .pool_idle_timeout(Some(Duration::from_secs(0)));
        }
        if let Some(max_idle) = settings.pool_max_idle_per_host {
            builder = builder.pool_max_idle_per_host(max_idle);
        }
        if let Some(idle_timeout) = settings.pool_idle_timeout {
            builder = builder.pool_idle_timeout(Some(idle_timeout));
        }
        if policy.skips_verification() {
            builder = builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }

        debug!(
            "Building transport (tls={:?}, keep_alive={})",
            policy, settings.keep_alive
        );
        builder.build().map_err(|err| {
            error!("Failed to build HTTP client: {}", err);
            RequestError::BuildTransport { source: err }
        })
    }
}

impl fmt::Debug for dyn HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HttpTransport")
    }
}
