//! Client side of the markslip entry app: the backend protocol, an HTTP
//! transport, and the controller that drives the page state.

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod protocol;

pub use backend::Backend;
pub use config::BackendConfig;
pub use controller::MarkslipController;
pub use error::ApiError;
pub use http::HttpBackend;
pub use protocol::{Action, ApiRequest, SmartCheckOutcome, WriteOutcome};
