//! Error taxonomy shared by every component of the crate
//!
//! Structural and precondition violations are reported through [`TssError`].
//! Failed cryptographic checks (signature verification, commitment checks of shares and partial signatures)
//! are not errors: they are returned as `false` so that a caller can exclude a signer and retry with another quorum.
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TssError {
    #[error("invalid length of {what}: expected {expected} bytes, got {actual}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    #[error("shares belong to different groups")]
    GroupMismatch,
    #[error("insufficient shares: {required} required, {actual} given")]
    InsufficientShares { required: u64, actual: usize },
    #[error("irrelevant shares: evaluation points differ")]
    IrrelevantShares,
    #[error("incorrect cipher text")]
    IncorrectCipherText,
    #[error("zero element is not invertible")]
    NotInvertible,
    #[error("bytes do not encode a valid curve point")]
    InvalidPoint,
    #[error("scalar belongs to a different field")]
    FieldMismatch,
}

impl TssError {
    pub(crate) fn length(what: &'static str, expected: usize, actual: usize) -> Self {
        TssError::InvalidLength {
            what,
            expected,
            actual,
        }
    }
}
