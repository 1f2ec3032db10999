//! X-Ray error cause attached to failure reports.

use serde::{Deserialize, Serialize};

/// Serialized causes of this size or larger are not sent.
pub const XRAY_ERROR_CAUSE_MAX_HEADER_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XRayErrorCause {
    pub working_directory: String,
    pub exceptions: Vec<XRayException>,
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XRayException {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
    pub stack: Vec<StackElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackElement {
    pub label: String,
    pub path: String,
    pub line: u32,
}

impl XRayErrorCause {
    /// The cause as compact JSON, or `None` when it cannot be serialized or
    /// reaches [`XRAY_ERROR_CAUSE_MAX_HEADER_SIZE`].
    #[must_use]
    pub fn to_header_value(&self) -> Option<String> {
        serde_json::to_string(self)
            .ok()
            .filter(|json| json.len() < XRAY_ERROR_CAUSE_MAX_HEADER_SIZE)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn header_value_uses_wire_field_names() {
        let cause = XRayErrorCause {
            working_directory: "/var/task".to_string(),
            exceptions: vec![XRayException {
                message: "bad input".to_string(),
                error_type: "ValidationError".to_string(),
                stack: vec![StackElement {
                    label: "handle".to_string(),
                    path: "src/main.rs".to_string(),
                    line: 42,
                }],
            }],
            paths: vec!["src/main.rs".to_string()],
        };

        assert_eq!(
            cause.to_header_value().unwrap(),
            r#"{"working_directory":"/var/task","exceptions":[{"message":"bad input","type":"ValidationError","stack":[{"label":"handle","path":"src/main.rs","line":42}]}],"paths":["src/main.rs"]}"#
        );
    }

    #[test]
    fn oversized_cause_has_no_header_value() {
        let cause = XRayErrorCause {
            working_directory: "x".repeat(XRAY_ERROR_CAUSE_MAX_HEADER_SIZE),
            ..XRayErrorCause::default()
        };
        assert_eq!(cause.to_header_value(), None);
    }
}
