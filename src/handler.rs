use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures::FutureExt;
use tracing::{error, info};

use crate::models::{Diagnostic, InvocationRequest, InvocationResponse};

/// Error type reported when a handler panics.
pub const PANIC_ERROR_TYPE: &str = "Runtime.HandlerPanic";

/// A user function that turns one invocation into one response.
///
/// Any async closure `Fn(InvocationRequest) -> impl Future<Output = R>` is a
/// handler, where `R` is either an [`InvocationResponse`] or a
/// `Result<InvocationResponse, E>` with `E: Into<Diagnostic>`.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, request: InvocationRequest) -> InvocationResponse;
}

/// Values a handler may return.
pub trait IntoInvocationResponse {
    fn into_invocation_response(self) -> InvocationResponse;
}

impl IntoInvocationResponse for InvocationResponse {
    fn into_invocation_response(self) -> InvocationResponse {
        self
    }
}

impl<E> IntoInvocationResponse for Result<InvocationResponse, E>
where
    E: Into<Diagnostic>,
{
    fn into_invocation_response(self) -> InvocationResponse {
        self.unwrap_or_else(|e| {
            let diagnostic: Diagnostic = e.into();
            error!(
                error_type = %diagnostic.error_type,
                error = %diagnostic.error_message,
                "Handler returned an error"
            );
            diagnostic.into()
        })
    }
}

#[async_trait]
impl<F, Fut, R> Handler for F
where
    F: Fn(InvocationRequest) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoInvocationResponse + Send + 'static,
{
    async fn call(&self, request: InvocationRequest) -> InvocationResponse {
        (self)(request).await.into_invocation_response()
    }
}

/// Calls the handler. A panic is caught and turned into a failure response.
pub async fn invoke<H>(handler: &H, request: InvocationRequest) -> InvocationResponse
where
    H: Handler + ?Sized,
{
    info!("Invoking user handler");
    let response = match AssertUnwindSafe(handler.call(request)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!(error = %message, "User handler panicked");
            InvocationResponse::failure(&message, PANIC_ERROR_TYPE)
        }
    };
    info!("Invoking user handler completed.");
    response
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}
