//! Transaction status taxonomy and per-execution output.
//!
//! Every business transaction reports a signed status code: zero is success,
//! positive is a benign warning (the transaction stands, nothing is rolled
//! back), negative is a hard error (a rollback is expected and the execution
//! is error-counted). The engine classifies outcomes from this code alone.

use serde::Serialize;

/// Classification of a transaction's reported status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusKind {
    /// `status == 0`: the transaction committed cleanly.
    Success,
    /// `status > 0`: a benign condition; the transaction stands.
    Warning,
    /// `status < 0`: a business-rule violation; rollback expected.
    Error,
}

impl StatusKind {
    /// Classify a raw status code.
    pub fn from_code(status: i32) -> Self {
        match status {
            0 => Self::Success,
            s if s > 0 => Self::Warning,
            _ => Self::Error,
        }
    }
}

/// Result of one transaction execution.
///
/// Created per execution, recorded into the statistics aggregator, then
/// discarded. Never persisted. The payload is opaque to the engine; it only
/// exists so a transaction can hand intermediate results to a dependent
/// follow-up step.
pub struct TxOutput {
    /// Signed status code; see [`StatusKind`].
    pub status: i32,
    /// Human-readable status context, if any.
    pub message: Option<String>,
    /// Opaque business payload; never inspected by the engine.
    pub payload: Option<Box<dyn std::any::Any + Send>>,
}

impl std::fmt::Debug for TxOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxOutput")
            .field("status", &self.status)
            .field("message", &self.message)
            .field("has_payload", &self.payload.is_some())
            .finish()
    }
}

impl TxOutput {
    /// A clean success.
    pub fn ok() -> Self {
        Self {
            status: 0,
            message: None,
            payload: None,
        }
    }

    /// A benign warning. `code` must be positive.
    pub fn warning(code: i32, message: impl Into<String>) -> Self {
        debug_assert!(code > 0, "warning status codes are positive");
        Self {
            status: code,
            message: Some(message.into()),
            payload: None,
        }
    }

    /// A hard error. `code` must be negative.
    pub fn error(code: i32, message: impl Into<String>) -> Self {
        debug_assert!(code < 0, "error status codes are negative");
        Self {
            status: code,
            message: Some(message.into()),
            payload: None,
        }
    }

    /// Attach an opaque business payload.
    pub fn with_payload(mut self, payload: impl std::any::Any + Send) -> Self {
        self.payload = Some(Box::new(payload));
        self
    }

    /// Classification of this output's status code.
    pub fn kind(&self) -> StatusKind {
        StatusKind::from_code(self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(StatusKind::from_code(0), StatusKind::Success);
        assert_eq!(StatusKind::from_code(42), StatusKind::Warning);
        assert_eq!(StatusKind::from_code(-7), StatusKind::Error);
        assert_eq!(StatusKind::from_code(i32::MIN), StatusKind::Error);
    }

    #[test]
    fn test_constructors() {
        assert_eq!(TxOutput::ok().kind(), StatusKind::Success);
        let warn = TxOutput::warning(3, "no orders found");
        assert_eq!(warn.kind(), StatusKind::Warning);
        assert_eq!(warn.message.as_deref(), Some("no orders found"));
        assert_eq!(TxOutput::error(-1, "bad balance").kind(), StatusKind::Error);
    }

    #[test]
    fn test_payload_is_opaque_but_recoverable() {
        let out = TxOutput::ok().with_payload(vec![1u64, 2, 3]);
        let payload = out.payload.unwrap();
        let rows = payload.downcast_ref::<Vec<u64>>().unwrap();
        assert_eq!(rows.len(), 3);
    }
}
