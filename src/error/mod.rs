mod app;
mod config;
mod execute;
mod request;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use execute::ExecError;
pub use request::RequestError;
