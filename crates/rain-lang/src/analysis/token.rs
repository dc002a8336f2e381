use rain_core::Span;

/// Kind of a raw lexical unit.
///
/// Words cover identifiers, opcode names, numeric/hex literals and the `_`
/// placeholder; classification happens in the parser, which has the opmeta
/// table and the position context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    /// `:` LHS/RHS separator
    Colon,
    /// `,` clause separator
    Comma,
    /// `;` source terminator
    Semi,
    /// `<` operand-args open
    LAngle,
    /// `>` operand-args close
    RAngle,
    /// `(` call open
    LParen,
    /// `)` call close
    RParen,
    /// `//` comment to end of line. Kept in the stream: where an LHS alias
    /// is expected this is an error, not trivia.
    LineComment,
}

/// A raw token with its exact byte span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// A skipped block comment, span preserved for position-accurate tooling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommentSpan {
    pub span: Span,
    /// True for the `/** ... */` doc form.
    pub doc: bool,
}
