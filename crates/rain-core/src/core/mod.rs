mod instr;
mod span;

pub use instr::{Instr, decode_source, encode_source, extract_opcode, extract_operand, make_instr};
pub use span::{Pos, Span};
