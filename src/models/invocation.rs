//! Invocation request/response value types.

use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};

use crate::models::context::{ClientContext, CognitoIdentity};
use crate::models::xray::XRayErrorCause;
use crate::utils::json_escape;

/// Content type of every failure payload.
pub const ERROR_CONTENT_TYPE: &str = "application/json";

/// One unit of work polled from the control endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    /// The caller's payload, interpreted by the handler.
    pub payload: Bytes,
    /// Identifier of this invocation, used to address the report endpoints.
    pub request_id: String,
    /// X-Ray tracing id.
    pub xray_trace_id: Option<String>,
    /// Client application and device information, sent by the AWS Mobile SDK.
    pub client_context: Option<String>,
    /// Amazon Cognito identity provider information, sent by the AWS Mobile SDK.
    pub cognito_identity: Option<String>,
    /// The ARN that was invoked. May differ between invocations of the same version.
    pub function_arn: Option<String>,
    /// Absolute time after which the host terminates the execution.
    pub deadline: DateTime<Utc>,
}

impl InvocationRequest {
    #[must_use]
    pub fn new(request_id: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            request_id: request_id.into(),
            xray_trace_id: None,
            client_context: None,
            cognito_identity: None,
            function_arn: None,
            deadline: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// Time left before the deadline. Negative once the deadline has passed.
    #[must_use]
    pub fn time_remaining(&self) -> TimeDelta {
        self.deadline - Utc::now()
    }

    /// The payload as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not valid UTF-8.
    pub fn payload_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.payload)
    }

    /// Parses the client context header, if one was sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is not a valid client context document.
    pub fn client_context_json(&self) -> Result<Option<ClientContext>, serde_json::Error> {
        self.client_context
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
    }

    /// Parses the cognito identity header, if one was sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is not a valid cognito identity document.
    pub fn cognito_identity_json(&self) -> Result<Option<CognitoIdentity>, serde_json::Error> {
        self.cognito_identity
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
    }
}

/// Whether a response is reported to the success or the error endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Success,
    Failure,
}

/// The result of one handler call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResponse {
    payload: Bytes,
    content_type: String,
    kind: OutcomeKind,
    error_type: Option<String>,
    xray_cause: Option<XRayErrorCause>,
}

impl InvocationResponse {
    /// Creates a response with an arbitrary payload. Use this when the handler
    /// needs full control over the error body, e.g. to include a stack trace.
    #[must_use]
    pub fn new(payload: impl Into<Bytes>, content_type: impl Into<String>, success: bool) -> Self {
        Self {
            payload: payload.into(),
            content_type: content_type.into(),
            kind: if success {
                OutcomeKind::Success
            } else {
                OutcomeKind::Failure
            },
            error_type: None,
            xray_cause: None,
        }
    }

    #[must_use]
    pub fn success(payload: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self::new(payload, content_type, true)
    }

    /// Creates a failure response whose payload is the JSON error envelope.
    #[must_use]
    pub fn failure(error_message: &str, error_type: &str) -> Self {
        let payload = format!(
            r#"{{"errorMessage":"{}","errorType":"{}", "stackTrace":[]}}"#,
            json_escape(error_message),
            json_escape(error_type)
        );
        Self {
            payload: Bytes::from(payload),
            content_type: ERROR_CONTENT_TYPE.to_string(),
            kind: OutcomeKind::Failure,
            error_type: Some(error_type.to_string()),
            xray_cause: None,
        }
    }

    /// Attaches an X-Ray error cause, sent alongside failure reports.
    #[must_use]
    pub fn with_xray_cause(mut self, cause: XRayErrorCause) -> Self {
        self.xray_cause = Some(cause);
        self
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.kind, OutcomeKind::Success)
    }

    #[must_use]
    pub const fn kind(&self) -> OutcomeKind {
        self.kind
    }

    #[must_use]
    pub const fn payload(&self) -> &Bytes {
        &self.payload
    }

    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The error type of a response built with [`InvocationResponse::failure`].
    #[must_use]
    pub fn error_type(&self) -> Option<&str> {
        self.error_type.as_deref()
    }

    #[must_use]
    pub const fn xray_cause(&self) -> Option<&XRayErrorCause> {
        self.xray_cause.as_ref()
    }
}

/// A structured handler failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub error_type: String,
    pub error_message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn new(error_type: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.into(),
            error_message: error_message.into(),
        }
    }
}

impl From<Diagnostic> for InvocationResponse {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::failure(&diagnostic.error_message, &diagnostic.error_type)
    }
}

impl From<anyhow::Error> for Diagnostic {
    fn from(error: anyhow::Error) -> Self {
        Self {
            error_type: "Runtime.HandlerError".to_string(),
            // {:#} keeps the full context chain
            error_message: format!("{error:#}"),
        }
    }
}
