//! Compilation of rainlang text into an `ExpressionConfig`.

mod compiler;
mod config;

use rain_core::{Diagnostic, ErrorCode, Span};
use rain_meta::{MetaError, OpMeta, decode_opmeta, decode_opmeta_hex};

use crate::parse::parse;

pub use compiler::{READ_MEMORY, emit};
pub use config::{ConstantPool, ExpressionConfig};

/// A rejected compile call: one or more diagnostics, first-most-relevant
/// first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileError {
    pub problems: Vec<Diagnostic>,
}

impl CompileError {
    fn from_meta(err: MetaError) -> Self {
        let code = match err {
            MetaError::ExpectedOpMeta => ErrorCode::E200,
            MetaError::InvalidBytes => ErrorCode::E201,
            MetaError::IncorrectHeaderCheck => ErrorCode::E202,
            MetaError::InvalidOpMeta => ErrorCode::E203,
            MetaError::BadOperandArgsOrder => ErrorCode::E204,
            MetaError::UnresolvedHash(_) | MetaError::InvalidHash(_) => ErrorCode::E205,
        };
        Self {
            problems: vec![
                Diagnostic::error(code, Span::DUMMY)
                    .message(err.to_string())
                    .build(),
            ],
        }
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.problems.as_slice() {
            [] => write!(f, "compile failed"),
            [first] => write!(f, "{}", first.message()),
            [first, rest @ ..] => write!(f, "{} (+{} more problems)", first.message(), rest.len()),
        }
    }
}

impl std::error::Error for CompileError {}

/// Compile rainlang text against a hex-string opmeta source.
pub fn compile(text: &str, opmeta: &str) -> Result<ExpressionConfig, CompileError> {
    let meta = decode_opmeta_hex(opmeta).map_err(CompileError::from_meta)?;
    compile_with_meta(text, &meta)
}

/// Compile rainlang text against raw opmeta container bytes.
pub fn compile_from_bytes(text: &str, opmeta: &[u8]) -> Result<ExpressionConfig, CompileError> {
    let meta = decode_opmeta(opmeta).map_err(CompileError::from_meta)?;
    compile_with_meta(text, &meta)
}

/// Compile rainlang text against an already-decoded opmeta table.
pub fn compile_with_meta(text: &str, opmeta: &OpMeta) -> Result<ExpressionConfig, CompileError> {
    let trees = parse(text, opmeta).map_err(|problems| CompileError { problems })?;
    emit(&trees, opmeta).map_err(|problems| CompileError { problems })
}
