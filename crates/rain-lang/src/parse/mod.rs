//! Parsing of rainlang documents against an opmeta table.
//!
//! # Grammar
//!
//! ```text
//! document    = source ( source )*
//! source      = clause ( "," clause )* ";"
//! clause      = lhs-item* ":" term*
//! lhs-item    = alias | "_"
//! term        = call | literal | alias-ref
//! call        = name ( "<" operand-arg* ">" )? "(" term* ")"
//! literal     = decimal | "0x" hex | "max-uint256"
//! alias       = [a-zA-Z][a-zA-Z0-9-]*
//! ```
//!
//! Parsing is a pure function of (text, opmeta) to (trees, diagnostics);
//! diagnostics accumulate across sources and any error rejects the call.

mod parser;
mod tree;

pub use parser::parse;
pub use tree::{LhsItem, OpApplication, ParseTree, RhsNode, is_valid_alias};
