use thiserror::Error;

/// Errors produced while decoding or resolving opcode metadata.
///
/// All variants are fatal to the compile/decompile call that hit them; retry
/// of unresolvable hashes belongs to whatever feeds the `MetaStore`, not to
/// the core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetaError {
    /// Missing or empty opmeta input.
    #[error("expected op meta")]
    ExpectedOpMeta,

    /// The opmeta source string does not decode to bytes.
    #[error("Op Meta Error: op meta must be in valid bytes form")]
    InvalidBytes,

    /// The container's magic prefix is missing or wrong.
    #[error("incorrect header check")]
    IncorrectHeaderCheck,

    /// The payload is malformed or carries unrecognized trailing data.
    #[error("invalid op meta")]
    InvalidOpMeta,

    /// Declared operand-argument layout is internally inconsistent.
    #[error("Op Meta Error: invalid meta for call, reason: bad operand args order")]
    BadOperandArgsOrder,

    /// The store has no bytes for the requested hash.
    #[error("cannot resolve op meta for hash: {0}")]
    UnresolvedHash(String),

    /// The hash is not a well-formed 32-byte hex string.
    #[error("invalid meta hash: {0}")]
    InvalidHash(String),
}
