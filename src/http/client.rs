use reqwest::Client;
use std::time::Duration;

use crate::models::RuntimeError;

/// Connect timeout for every exchange with the control endpoint.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Builds the single connection-pooling client shared by every exchange.
///
/// No total timeout is set: a poll stays outstanding for as long as the
/// execution environment is frozen.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn build_client() -> Result<Client, RuntimeError> {
    Ok(Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .no_proxy()
        .http1_only()
        .tcp_nodelay(true)
        .build()?)
}
