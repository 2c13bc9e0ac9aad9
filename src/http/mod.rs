//! Request descriptors, transports and single-request execution.
//!
//! A [`Request`] is validated once at construction and never changes
//! afterwards; [`execute`] may run it any number of times.
mod execute;
mod headers;
mod method;
mod outcome;
mod query;
mod request;
mod transport;

pub use execute::{execute, execute_with, send_request};
pub use headers::HeaderSet;
pub use method::Method;
pub use outcome::{Cookie, HEADER_VALUE_SEPARATOR, Outcome, Reply};
pub use request::{Request, RequestSpec, RequestWarning};
pub use transport::{
    DEFAULT_USER_AGENT, HttpTransport, TlsPolicy, TransportPolicy, TransportSettings,
};
