//! Word-buffer and module-assembly error contracts.

use thiserror::Error;

/// Stable error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SpirvErrorKind {
    /// An operand is missing, misnamed or of the wrong kind for its opcode.
    #[error("schema error")]
    SchemaError,
    /// The opcode has no known schema or layout group.
    #[error("unknown opcode")]
    UnknownOpcode,
    /// A function was opened while another one was still open.
    #[error("unterminated function")]
    UnterminatedFunction,
    /// A function end was emitted with no function open.
    #[error("unopened function")]
    UnopenedFunction,
    /// A function-body instruction was emitted with no function open.
    #[error("no open function")]
    NoOpenFunction,
    /// Two functions were registered under the same name.
    #[error("duplicate function")]
    DuplicateFunction,
    /// A handle or cursor outlived a mutation that moved its words.
    #[error("stale view")]
    StaleView,
    /// The word stream is structurally corrupt.
    #[error("invariant violation")]
    InvariantViolation,
    /// An instruction does not fit the 16-bit word-count field.
    #[error("encoding overflow")]
    EncodingOverflow,
    /// The word pool could not provide backing storage.
    #[error("capacity exhausted")]
    CapacityExhausted,
    /// A configured resource limit was exceeded.
    #[error("limit exceeded")]
    LimitExceeded,
    /// Two merged buffers define the same result id.
    #[error("id collision")]
    IdCollision,
    /// The module header is missing or malformed.
    #[error("invalid header")]
    InvalidHeader,
}

/// Error payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}{}", render_detail(.detail))]
pub struct SpirvError {
    /// Error category.
    pub kind: SpirvErrorKind,
    /// Human-readable error summary.
    pub message: String,
    /// Optional additional detail.
    pub detail: Option<String>,
}

fn render_detail(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(" ({d})")).unwrap_or_default()
}

impl SpirvError {
    /// Creates an error.
    pub fn new(kind: SpirvErrorKind, message: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail,
        }
    }

    /// Creates a `SchemaError` error.
    pub fn schema(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(SpirvErrorKind::SchemaError, message, Some(detail.into()))
    }

    /// Creates an `UnknownOpcode` error.
    pub fn unknown_opcode(opcode: u16) -> Self {
        Self::new(
            SpirvErrorKind::UnknownOpcode,
            "opcode has no known schema",
            Some(format!("opcode {opcode}")),
        )
    }

    /// Creates a function sequencing error of the given kind.
    pub fn sequencing(kind: SpirvErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, message, None)
    }

    /// Creates a `StaleView` error.
    pub fn stale_view(expected: u64, actual: u64) -> Self {
        Self::new(
            SpirvErrorKind::StaleView,
            "buffer was mutated after the view was taken",
            Some(format!("view generation {expected}, buffer generation {actual}")),
        )
    }

    /// Creates an `InvariantViolation` error.
    pub fn invariant_violation(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(
            SpirvErrorKind::InvariantViolation,
            message,
            Some(detail.into()),
        )
    }

    /// Creates an `EncodingOverflow` error.
    pub fn encoding_overflow(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(SpirvErrorKind::EncodingOverflow, message, Some(detail.into()))
    }

    /// Creates a `CapacityExhausted` error.
    pub fn capacity_exhausted(requested_words: usize) -> Self {
        Self::new(
            SpirvErrorKind::CapacityExhausted,
            "word pool could not allocate backing storage",
            Some(format!("requested {requested_words} words")),
        )
    }

    /// Creates a `LimitExceeded` error.
    pub fn limit_exceeded(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(SpirvErrorKind::LimitExceeded, message, Some(detail.into()))
    }

    /// Creates an `IdCollision` error.
    pub fn id_collision(id: u32) -> Self {
        Self::new(
            SpirvErrorKind::IdCollision,
            "merged buffers define the same result id",
            Some(format!("id %{id}")),
        )
    }

    /// Creates an `InvalidHeader` error.
    pub fn invalid_header(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(SpirvErrorKind::InvalidHeader, message, Some(detail.into()))
    }
}
