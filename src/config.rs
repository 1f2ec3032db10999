//! Process configuration, read once from the environment at startup.

use crate::client::default_user_agent;
use crate::models::RuntimeError;

/// `host:port` of the control endpoint.
pub const RUNTIME_API_ENV: &str = "AWS_LAMBDA_RUNTIME_API";
/// Optional override of the `User-Agent` sent with every request.
pub const USER_AGENT_ENV: &str = "AWS_LAMBDA_RUNTIME_USER_AGENT";
/// Path prefix of the runtime protocol on the control endpoint.
pub const API_PATH: &str = "/2018-06-01/runtime";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Address of the control endpoint, with scheme.
    pub runtime_api: String,
    pub user_agent: String,
}

impl RuntimeConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `AWS_LAMBDA_RUNTIME_API` is unset or empty.
    pub fn from_env() -> Result<Self, RuntimeError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime API address is missing or empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RuntimeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let address = lookup(RUNTIME_API_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| RuntimeError::Config(format!("{RUNTIME_API_ENV} is not set")))?;

        let runtime_api = if address.contains("://") {
            address
        } else {
            format!("http://{address}")
        };

        let user_agent = lookup(USER_AGENT_ENV)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(default_user_agent);

        Ok(Self {
            runtime_api,
            user_agent,
        })
    }

    /// The base all protocol URLs are derived from.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("{}{API_PATH}", self.runtime_api.trim_end_matches('/'))
    }
}
