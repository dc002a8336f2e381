use rain_core::{Diagnostic, ErrorCode, Instr, Span, encode_source, make_instr};
use rain_meta::OpMeta;

use crate::parse::{ParseTree, RhsNode};

use super::config::{ConstantPool, ExpressionConfig};

/// The implicit pseudo-opcode that pushes a constant or a stack
/// back-reference. Resolved by name from the opmeta table.
pub const READ_MEMORY: &str = "read-memory";

/// Walk resolved parse trees bottom-up and emit bytecode.
///
/// Sources come out in the left-to-right order of `;`-terminated blocks;
/// literals intern into the shared constants pool.
pub fn emit(trees: &[ParseTree], opmeta: &OpMeta) -> Result<ExpressionConfig, Vec<Diagnostic>> {
    let mut emitter = Emitter {
        opmeta,
        pool: ConstantPool::new(),
        diagnostics: Vec::new(),
    };

    let mut sources = Vec::with_capacity(trees.len());
    for tree in trees {
        let mut instrs = Vec::new();
        for node in &tree.tree {
            emitter.emit_node(node, &mut instrs);
        }
        sources.push(encode_source(&instrs));
    }

    if emitter.diagnostics.is_empty() {
        Ok(ExpressionConfig {
            sources,
            constants: emitter.pool.into_strings(),
        })
    } else {
        Err(emitter.diagnostics)
    }
}

struct Emitter<'a> {
    opmeta: &'a OpMeta,
    pool: ConstantPool,
    diagnostics: Vec<Diagnostic>,
}

impl Emitter<'_> {
    /// Postorder: children first, then the node's own instruction.
    fn emit_node(&mut self, node: &RhsNode, out: &mut Vec<Instr>) {
        match node {
            RhsNode::Literal { value, span } => {
                let index = self.pool.intern(*value);
                if let Some(opcode) = self.read_memory_opcode(*span) {
                    if let Some(operand) = memory_operand(index, true, *span, &mut self.diagnostics)
                    {
                        out.push(make_instr(opcode, operand));
                    }
                }
            }
            RhsNode::Alias { slot, span, .. } => {
                if let Some(opcode) = self.read_memory_opcode(*span) {
                    if let Some(operand) = memory_operand(*slot, false, *span, &mut self.diagnostics)
                    {
                        out.push(make_instr(opcode, operand));
                    }
                }
            }
            RhsNode::Op(op) => {
                for input in &op.inputs {
                    self.emit_node(input, out);
                }
                out.push(make_instr(op.opcode as u16, op.operand));
            }
        }
    }

    fn read_memory_opcode(&mut self, span: Span) -> Option<u16> {
        match self.opmeta.find(READ_MEMORY) {
            Some((index, _)) => Some(index as u16),
            None => {
                self.diagnostics.push(
                    Diagnostic::error(ErrorCode::E106, span)
                        .message(format!("unknown opcode: {READ_MEMORY}"))
                        .note("constants and alias references need a read-memory opcode in the op meta")
                        .build(),
                );
                None
            }
        }
    }
}

/// Pack a read-memory operand: `(index << 1) | type`, where type bit 1 means
/// constant and 0 means stack back-reference.
fn memory_operand(
    index: usize,
    constant: bool,
    span: Span,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<u16> {
    if index > 0x7FFF {
        diagnostics.push(
            Diagnostic::error(ErrorCode::E401, span)
                .message(format!(
                    "{} index {index} exceeds operand capacity",
                    if constant { "constant" } else { "stack" }
                ))
                .build(),
        );
        return None;
    }
    Some(((index as u16) << 1) | constant as u16)
}
