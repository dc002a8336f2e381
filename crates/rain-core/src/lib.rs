//! Core types for the rainlang compiler.
//!
//! This crate provides foundational types used throughout the compiler and
//! decompiler:
//! - Source positions and spans
//! - The instruction-word codec (opcode + operand)
//! - Diagnostics and error codes

pub mod core;
pub mod error;

// Re-export commonly used types at crate root
pub use core::{
    Instr, Pos, Span, decode_source, encode_source, extract_opcode, extract_operand, make_instr,
};
pub use error::{Diagnostic, DiagnosticBuilder, ErrorCode, Severity};
