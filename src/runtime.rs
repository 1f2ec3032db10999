//! Polling loop: fetch an invocation, run the handler, report the outcome.

use tracing::{error, info};

use crate::client::RuntimeClient;
use crate::config::RuntimeConfig;
use crate::handler::{Handler, invoke};
use crate::http::Transport;
use crate::models::{PostOutcome, ResponseCode, RuntimeError};

/// Consecutive poll failures tolerated before the loop gives up.
pub const MAX_RETRIES: usize = 3;

/// Runs `handler` against the control endpoint named by the environment.
///
/// Only returns on a fault the host is expected to recover from by
/// restarting the process.
///
/// # Errors
///
/// Returns an error if the configuration is missing, polling failed
/// [`MAX_RETRIES`] times in a row, or an outcome could not be reported.
pub async fn run<H: Handler>(handler: H) -> Result<(), RuntimeError> {
    let config = RuntimeConfig::from_env()?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        endpoint = %config.runtime_api,
        "Initializing the Lambda runtime client"
    );
    let client = RuntimeClient::with_user_agent(&config.base_url(), &config.user_agent)?;
    run_handler(&client, &handler).await
}

/// Drives the poll, handle, report cycle until a terminal condition.
///
/// Invocations are processed strictly one at a time.
///
/// # Errors
///
/// Returns [`RuntimeError::RetriesExhausted`] after [`MAX_RETRIES`]
/// consecutive poll failures, or [`RuntimeError::ReportFailed`] as soon as an
/// outcome cannot be delivered. Reports are never retried.
pub async fn run_handler<T, H>(client: &RuntimeClient<T>, handler: &H) -> Result<(), RuntimeError>
where
    T: Transport,
    H: Handler + ?Sized,
{
    let mut retries = 0;

    while retries < MAX_RETRIES {
        let request = match client.get_next().await {
            Ok(request) => request,
            Err(ResponseCode::RequestNotMade) => {
                retries += 1;
                continue;
            }
            Err(code) => {
                info!("HTTP request was not successful. {}. Retrying..", code);
                retries += 1;
                continue;
            }
        };

        retries = 0;

        let request_id = request.request_id.clone();
        let response = invoke(handler, request).await;

        let outcome = if response.is_success() {
            client.post_success(&request_id, &response).await
        } else {
            client.post_failure(&request_id, &response).await
        };
        handle_post_outcome(outcome, &request_id)?;
    }

    error!("Exhausted all retries. Exiting!");
    Err(RuntimeError::RetriesExhausted(retries))
}

fn handle_post_outcome(outcome: PostOutcome, request_id: &str) -> Result<(), RuntimeError> {
    match outcome {
        Ok(()) => Ok(()),
        Err(code) => {
            match code.status() {
                None => {
                    error!(request_id = %request_id, "Failed to send HTTP request for invocation");
                }
                Some(status) => {
                    info!(
                        request_id = %request_id,
                        status,
                        "HTTP Request for invocation was not successful"
                    );
                }
            }
            // TODO: retry undeliverable reports once the control endpoint documents which failures are safe to resend
            Err(RuntimeError::ReportFailed {
                request_id: request_id.to_string(),
                code,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::http::MockTransport;
    use crate::models::{InvocationRequest, InvocationResponse, Method, WireRequest, WireResponse};
    use mockall::Sequence;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const BASE: &str = "http://127.0.0.1:9001/2018-06-01/runtime";

    fn poll_ok(
        request_id: &'static str,
    ) -> impl FnMut(WireRequest) -> Result<WireResponse, RuntimeError> + Send + 'static {
        move |_| {
            Ok(WireResponse::new(200)
                .with_header("lambda-runtime-aws-request-id", request_id)
                .with_body("hello"))
        }
    }

    fn connection_refused(_: WireRequest) -> Result<WireResponse, RuntimeError> {
        Err(RuntimeError::Transport("connection refused".to_string()))
    }

    fn counting_handler(
        calls: Arc<AtomicUsize>,
    ) -> impl Fn(InvocationRequest) -> futures::future::Ready<InvocationResponse> + Send + Sync {
        move |request| {
            calls.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(InvocationResponse::success(request.payload, "text/plain"))
        }
    }

    #[tokio::test]
    async fn three_poll_failures_end_the_loop_without_invoking_handler() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(MAX_RETRIES)
            .returning(connection_refused);

        let calls = Arc::new(AtomicUsize::new(0));
        let client = RuntimeClient::with_transport(transport, BASE, "test");
        let result = run_handler(&client, &counting_handler(calls.clone())).await;

        assert!(matches!(result, Err(RuntimeError::RetriesExhausted(3))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn status_failures_count_toward_the_bound() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(MAX_RETRIES)
            .returning(|_| Ok(WireResponse::new(500)));

        let client = RuntimeClient::with_transport(transport, BASE, "test");
        let result = run_handler(&client, &counting_handler(Arc::default())).await;
        assert!(matches!(result, Err(RuntimeError::RetriesExhausted(3))));
    }

    #[tokio::test]
    async fn success_resets_retry_counter() {
        let mut seq = Sequence::new();
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(2)
            .in_sequence(&mut seq)
            .returning(connection_refused);
        transport
            .expect_execute()
            .withf(|request| request.method == Method::Get)
            .times(1)
            .in_sequence(&mut seq)
            .returning(poll_ok("abc123"));
        transport
            .expect_execute()
            .withf(|request| {
                request.method == Method::Post
                    && request.url == format!("{BASE}/invocation/abc123/response")
                    && request.body.as_ref() == b"hello"
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(WireResponse::new(202)));
        // Without the reset the loop would stop after one more failure.
        transport
            .expect_execute()
            .times(MAX_RETRIES)
            .in_sequence(&mut seq)
            .returning(connection_refused);

        let calls = Arc::new(AtomicUsize::new(0));
        let client = RuntimeClient::with_transport(transport, BASE, "test");
        let result = run_handler(&client, &counting_handler(calls.clone())).await;

        assert!(matches!(result, Err(RuntimeError::RetriesExhausted(3))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failure_response_goes_to_error_endpoint() {
        let mut seq = Sequence::new();
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(poll_ok("abc123"));
        transport
            .expect_execute()
            .withf(|request| {
                request.url == format!("{BASE}/invocation/abc123/error")
                    && request.body.as_ref()
                        == br#"{"errorMessage":"bad input","errorType":"ValidationError", "stackTrace":[]}"#
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(WireResponse::new(202)));
        transport
            .expect_execute()
            .times(MAX_RETRIES)
            .in_sequence(&mut seq)
            .returning(connection_refused);

        let handler = |_request: InvocationRequest| async move {
            InvocationResponse::failure("bad input", "ValidationError")
        };
        let client = RuntimeClient::with_transport(transport, BASE, "test");
        let result = run_handler(&client, &handler).await;
        assert!(matches!(result, Err(RuntimeError::RetriesExhausted(_))));
    }

    #[tokio::test]
    async fn report_failure_ends_the_loop_immediately() {
        let mut seq = Sequence::new();
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(poll_ok("abc123"));
        transport
            .expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(WireResponse::new(413)));

        let client = RuntimeClient::with_transport(transport, BASE, "test");
        let result = run_handler(&client, &counting_handler(Arc::default())).await;

        match result {
            Err(RuntimeError::ReportFailed { request_id, code }) => {
                assert_eq!(request_id, "abc123");
                assert_eq!(code, ResponseCode::Status(413));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_report_ends_the_loop() {
        let mut seq = Sequence::new();
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(poll_ok("abc123"));
        transport
            .expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(connection_refused);

        let client = RuntimeClient::with_transport(transport, BASE, "test");
        let result = run_handler(&client, &counting_handler(Arc::default())).await;
        assert!(matches!(
            result,
            Err(RuntimeError::ReportFailed {
                code: ResponseCode::RequestNotMade,
                ..
            })
        ));
    }
}
