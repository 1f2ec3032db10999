pub mod context;
pub mod error;
pub mod invocation;
pub mod outcome;
pub mod wire;
pub mod xray;

pub use context::{ClientApplication, ClientContext, CognitoIdentity};
pub use error::RuntimeError;
pub use invocation::{Diagnostic, InvocationRequest, InvocationResponse, OutcomeKind};
pub use outcome::{NextOutcome, PostOutcome, ResponseCode};
pub use wire::{Method, WireRequest, WireResponse};
pub use xray::{StackElement, XRAY_ERROR_CAUSE_MAX_HEADER_SIZE, XRayErrorCause, XRayException};
