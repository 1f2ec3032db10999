//! Client for the Lambda runtime protocol.
//!
//! A long-lived process polls the control endpoint for invocations, hands each
//! one to a user handler, and reports the handler's outcome before polling
//! again.
//!
//! ```no_run
//! use aws_lambda_runtime_client::{InvocationRequest, InvocationResponse, run};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), aws_lambda_runtime_client::RuntimeError> {
//!     aws_lambda_runtime_client::logging::init_default_subscriber();
//!     run(|request: InvocationRequest| async move {
//!         InvocationResponse::success(request.payload, "application/json")
//!     })
//!     .await
//! }
//! ```

pub mod client;
pub mod config;
pub mod handler;
pub mod http;
pub mod logging;
pub mod models;
pub mod runtime;
pub mod utils;

pub use client::{Endpoints, RuntimeClient};
pub use config::RuntimeConfig;
pub use handler::{Handler, IntoInvocationResponse};
pub use models::{
    Diagnostic, InvocationRequest, InvocationResponse, NextOutcome, PostOutcome, ResponseCode,
    RuntimeError, StackElement, XRAY_ERROR_CAUSE_MAX_HEADER_SIZE, XRayErrorCause, XRayException,
};
pub use runtime::{MAX_RETRIES, run, run_handler};
