//! Decompilation of `ExpressionConfig` bytecode back into rainlang text.

mod decompiler;
mod document;

pub use decompiler::{DecompileError, ReplayState, decompile};
pub use document::{RainDocument, document_body};
