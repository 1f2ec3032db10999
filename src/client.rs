//! Runtime protocol client.
//!
//! Implements the protocol verbs against the control endpoint: poll for the
//! next invocation, report success or failure, and the init and restore
//! reports. Expected
//! failures never surface as errors; they come back as [`ResponseCode`]s so the
//! caller decides whether to retry or stop.

use bytes::Bytes;
use chrono::{TimeDelta, Utc};
use reqwest::header::HeaderValue;
use tracing::{debug, error, info, warn};

use crate::http::{ReqwestTransport, Transport};
use crate::models::{
    InvocationRequest, InvocationResponse, NextOutcome, PostOutcome, ResponseCode, RuntimeError,
    WireRequest, WireResponse, XRayErrorCause,
};
use crate::utils::parse_leading_millis;

pub const REQUEST_ID_HEADER: &str = "lambda-runtime-aws-request-id";
pub const TRACE_ID_HEADER: &str = "lambda-runtime-trace-id";
pub const CLIENT_CONTEXT_HEADER: &str = "lambda-runtime-client-context";
pub const COGNITO_IDENTITY_HEADER: &str = "lambda-runtime-cognito-identity";
pub const DEADLINE_MS_HEADER: &str = "lambda-runtime-deadline-ms";
pub const FUNCTION_ARN_HEADER: &str = "lambda-runtime-invoked-function-arn";
pub const ERROR_TYPE_HEADER: &str = "lambda-runtime-function-error-type";
pub const XRAY_ERROR_CAUSE_HEADER: &str = "lambda-runtime-function-xray-error-cause";

/// Content type used when a response does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html";

/// User agent sent with every request unless overridden.
#[must_use]
pub fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// The protocol URLs, derived once from the base address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    init_error: String,
    next: String,
    invocation: String,
    restore_next: String,
    restore_error: String,
}

impl Endpoints {
    /// `base` is the full runtime API prefix, e.g.
    /// `http://127.0.0.1:9001/2018-06-01/runtime`.
    #[must_use]
    pub fn new(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            init_error: format!("{base}/init/error"),
            next: format!("{base}/invocation/next"),
            invocation: format!("{base}/invocation/"),
            restore_next: format!("{base}/restore/next"),
            restore_error: format!("{base}/restore/error"),
        }
    }

    #[must_use]
    pub fn init_error(&self) -> &str {
        &self.init_error
    }

    #[must_use]
    pub fn next(&self) -> &str {
        &self.next
    }

    #[must_use]
    pub fn restore_next(&self) -> &str {
        &self.restore_next
    }

    #[must_use]
    pub fn restore_error(&self) -> &str {
        &self.restore_error
    }

    #[must_use]
    pub fn response(&self, request_id: &str) -> String {
        format!("{}{request_id}/response", self.invocation)
    }

    #[must_use]
    pub fn error(&self, request_id: &str) -> String {
        format!("{}{request_id}/error", self.invocation)
    }
}

/// Client for the runtime protocol. Owns the transport exclusively and uses
/// it for one exchange at a time.
pub struct RuntimeClient<T = ReqwestTransport> {
    transport: T,
    user_agent: String,
    endpoints: Endpoints,
}

impl RuntimeClient<ReqwestTransport> {
    /// Creates a client for `base` with the default user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base: &str) -> Result<Self, RuntimeError> {
        Self::with_user_agent(base, &default_user_agent())
    }

    /// Creates a client for `base` that identifies itself as `user_agent`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_user_agent(base: &str, user_agent: &str) -> Result<Self, RuntimeError> {
        Ok(Self::with_transport(
            ReqwestTransport::with_defaults()?,
            base,
            user_agent,
        ))
    }
}

impl<T: Transport> RuntimeClient<T> {
    #[must_use]
    pub fn with_transport(transport: T, base: &str, user_agent: &str) -> Self {
        Self {
            transport,
            user_agent: user_agent.to_string(),
            endpoints: Endpoints::new(base),
        }
    }

    #[must_use]
    pub const fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Polls for the next invocation. Blocks until the control endpoint
    /// hands out work.
    pub async fn get_next(&self) -> NextOutcome {
        let url = self.endpoints.next();
        let request = WireRequest::get(url).header("user-agent", self.user_agent.as_str());

        debug!("Making request to {}", url);
        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "Transport returned an error");
                error!("Failed to get next invocation. No Response from endpoint");
                return Err(ResponseCode::RequestNotMade);
            }
        };
        debug!("Completed request to {}", url);

        if !response.is_success() {
            error!(
                status = response.status,
                "Failed to get next invocation. Http Response code: {}", response.status
            );
            return Err(ResponseCode::Status(response.status));
        }
        let received_at = Utc::now();

        invocation_from_response(response, received_at)
    }

    /// Reports a successful handler outcome for `request_id`.
    pub async fn post_success(&self, request_id: &str, response: &InvocationResponse) -> PostOutcome {
        let url = self.endpoints.response(request_id);
        self.do_post(url, request_id, response).await
    }

    /// Reports a failed handler outcome for `request_id`.
    pub async fn post_failure(&self, request_id: &str, response: &InvocationResponse) -> PostOutcome {
        let url = self.endpoints.error(request_id);
        self.do_post(url, request_id, response).await
    }

    /// Reports a failure that happened before the first poll.
    pub async fn post_init_error(&self, response: &InvocationResponse) -> PostOutcome {
        let url = self.endpoints.init_error().to_string();
        self.do_post(url, "init", response).await
    }

    /// Signals that the snapshot restore finished and waits until the
    /// control endpoint lets the runtime continue.
    pub async fn restore_next(&self) -> PostOutcome {
        let url = self.endpoints.restore_next();
        let request = WireRequest::get(url).header("user-agent", self.user_agent.as_str());

        debug!("Making request to {}", url);
        let reply = match self.transport.execute(request).await {
            Ok(reply) => reply,
            Err(e) => {
                debug!(error = %e, "Transport returned an error");
                error!("Failed to signal restore completion. No Response from endpoint");
                return Err(ResponseCode::RequestNotMade);
            }
        };

        if reply.status != 200 {
            error!(
                status = reply.status,
                "Failed to signal restore completion. Http Response code: {}", reply.status
            );
            return Err(ResponseCode::Status(reply.status));
        }

        Ok(())
    }

    /// Reports a failure raised while restoring from a snapshot.
    pub async fn post_restore_error(&self, response: &InvocationResponse) -> PostOutcome {
        let url = self.endpoints.restore_error().to_string();
        self.do_post(url, "restore", response).await
    }

    async fn do_post(&self, url: String, request_id: &str, response: &InvocationResponse) -> PostOutcome {
        info!(request_id = %request_id, "Making request to {}", url);

        let content_type = if response.content_type().is_empty() {
            DEFAULT_CONTENT_TYPE
        } else {
            response.content_type()
        };
        let payload: Bytes = response.payload().clone();
        debug!("calculating content length... content-length: {}", payload.len());

        let mut request = WireRequest::post(url, payload.clone())
            .header("content-type", content_type)
            .header("user-agent", self.user_agent.as_str())
            .header("content-length", payload.len().to_string());
        if let Some(error_type) = response.error_type() {
            request = with_valid_header(request, ERROR_TYPE_HEADER, error_type);
        }
        if !response.is_success()
            && let Some(cause) = response.xray_cause().and_then(XRayErrorCause::to_header_value)
        {
            request = with_valid_header(request, XRAY_ERROR_CAUSE_HEADER, &cause);
        }

        let reply = match self.transport.execute(request).await {
            Ok(reply) => reply,
            Err(e) => {
                debug!(error = %e, request_id = %request_id, "Transport returned an error");
                return Err(ResponseCode::RequestNotMade);
            }
        };

        if !reply.is_success() {
            error!(
                status = reply.status,
                "Failed to post handler response. Http response code: {}", reply.status
            );
            return Err(ResponseCode::Status(reply.status));
        }

        Ok(())
    }
}

/// Adds an optional header, leaving it out when `value` cannot be sent as a
/// header value. The report itself must still go out.
fn with_valid_header(request: WireRequest, key: &str, value: &str) -> WireRequest {
    if HeaderValue::from_str(value).is_ok() {
        request.header(key, value)
    } else {
        warn!(header = key, "Omitting header with characters not allowed in a header value");
        request
    }
}

/// Builds an invocation from a successful poll response received at
/// `received_at`.
fn invocation_from_response(
    response: WireResponse,
    received_at: chrono::DateTime<Utc>,
) -> NextOutcome {
    if !response.has_header(REQUEST_ID_HEADER) {
        error!("Failed to find header {} in response", REQUEST_ID_HEADER);
        return Err(ResponseCode::RequestNotMade);
    }

    let optional = |key: &str| response.header(key).map(str::to_string);
    let request_id = optional(REQUEST_ID_HEADER).unwrap_or_default();
    let xray_trace_id = optional(TRACE_ID_HEADER);
    let client_context = optional(CLIENT_CONTEXT_HEADER);
    let cognito_identity = optional(COGNITO_IDENTITY_HEADER);
    let function_arn = optional(FUNCTION_ARN_HEADER);
    let deadline_ms = optional(DEADLINE_MS_HEADER);

    let mut request = InvocationRequest::new(request_id, response.into_body());
    request.xray_trace_id = xray_trace_id;
    request.client_context = client_context;
    request.cognito_identity = cognito_identity;
    request.function_arn = function_arn;

    if let Some(deadline_ms) = deadline_ms {
        let ms = i64::try_from(parse_leading_millis(&deadline_ms)).unwrap_or(i64::MAX);
        request.deadline = TimeDelta::try_milliseconds(ms)
            .and_then(|offset| received_at.checked_add_signed(offset))
            .unwrap_or(chrono::DateTime::<Utc>::MAX_UTC);
        info!(
            request_id = %request.request_id,
            "Received payload: {}\nTime remaining: {}",
            String::from_utf8_lossy(&request.payload),
            request.time_remaining().num_milliseconds()
        );
    }

    Ok(request)
}
