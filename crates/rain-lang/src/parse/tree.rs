use alloy_primitives::U256;
use rain_core::Span;

/// One LHS item: a bindable alias or the `_` placeholder for a discarded
/// value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LhsItem {
    pub name: String,
    pub span: Span,
}

impl LhsItem {
    /// Placeholders occupy a stack slot but are never bound.
    pub fn is_placeholder(&self) -> bool {
        self.name == "_"
    }
}

/// A resolved opcode application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpApplication {
    /// Index into the opmeta table.
    pub opcode: usize,
    /// The name the call was spelled with (may be an alias).
    pub name: String,
    /// Resolved surface operand-argument values, in declared order.
    pub operand_args: Vec<u64>,
    /// The packed 16-bit operand.
    pub operand: u16,
    /// Output arity under the packed operand.
    pub outputs: usize,
    /// Child nodes; the count is the resolved input arity.
    pub inputs: Vec<RhsNode>,
    pub span: Span,
}

/// One RHS term.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RhsNode {
    Op(OpApplication),
    Literal {
        value: U256,
        span: Span,
    },
    /// Reference to an alias bound by an earlier clause. `slot` is the stack
    /// position of the producing LHS item, resolved during parsing.
    Alias {
        name: String,
        slot: usize,
        span: Span,
    },
}

impl RhsNode {
    pub fn span(&self) -> Span {
        match self {
            RhsNode::Op(op) => op.span,
            RhsNode::Literal { span, .. } | RhsNode::Alias { span, .. } => *span,
        }
    }

    /// Stack values this node leaves behind as a top-level term.
    pub fn outputs(&self) -> usize {
        match self {
            RhsNode::Op(op) => op.outputs,
            RhsNode::Literal { .. } | RhsNode::Alias { .. } => 1,
        }
    }
}

/// Parse result for one `;`-terminated source expression, clauses flattened
/// in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseTree {
    pub span: Span,
    pub lhs: Vec<LhsItem>,
    pub tree: Vec<RhsNode>,
}

/// Check the alias pattern `[a-zA-Z][a-zA-Z0-9-]*`.
pub fn is_valid_alias(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}
