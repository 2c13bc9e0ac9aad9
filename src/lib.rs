//! Core library for the `batchreq` CLI.
//!
//! Builds validated HTTP request descriptors and runs batches of them with a
//! bounded number in flight. Outcomes come back in submission order, and a
//! failing request never affects its siblings. The `batchreq` binary is a
//! thin driver over plan files; the library is usable on its own.
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod logger;

pub use dispatch::{Dispatch, DispatchSettings, Dispatcher, dispatch, dispatch_blocking};
pub use error::{AppError, AppResult, ConfigError, ExecError, RequestError};
pub use http::{
    HeaderSet, Method, Outcome, Reply, Request, RequestSpec, TlsPolicy, TransportPolicy, execute,
    send_request,
};
