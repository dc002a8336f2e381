//! The rainlang compiler/decompiler engine.
//!
//! This crate provides the core language functionality:
//! - `analysis` - Tokenization with exact byte spans
//! - `parse` - Parse tree construction with LHS/RHS binding rules
//! - `operand` - Bit-packed operand encoding/decoding and the algebra solver
//! - `compile` - Bytecode emission into an `ExpressionConfig`
//! - `decompile` - Bytecode replay back into rainlang text

pub mod analysis;
pub mod compile;
pub mod decompile;
pub mod operand;
pub mod parse;

// Re-export commonly used types at crate root
pub use analysis::{Analysis, CommentSpan, Token, TokenKind, Tokenizer};
pub use compile::{CompileError, ExpressionConfig, compile, compile_from_bytes, compile_with_meta};
pub use decompile::{DecompileError, RainDocument, decompile, document_body};
pub use parse::{LhsItem, OpApplication, ParseTree, RhsNode, parse};
