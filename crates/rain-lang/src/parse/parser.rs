use std::collections::HashMap;

use alloy_primitives::U256;
use rain_core::{Diagnostic, ErrorCode, Span};
use rain_meta::{InputSpec, OpMeta};

use crate::analysis::{Token, TokenKind, Tokenizer};
use crate::operand::{self, OperandError};

use super::tree::{LhsItem, OpApplication, ParseTree, RhsNode, is_valid_alias};

/// Parse a rainlang document into one tree per `;`-terminated source.
///
/// Returns every collected diagnostic when any of them is an error; the
/// parser recovers where it can so one bad clause does not hide the next.
pub fn parse(text: &str, opmeta: &OpMeta) -> Result<Vec<ParseTree>, Vec<Diagnostic>> {
    let analysis = Tokenizer::new(text).tokenize();
    if analysis.has_errors() {
        return Err(analysis.diagnostics);
    }
    Parser {
        source: text,
        opmeta,
        tokens: analysis.tokens,
        diagnostics: Vec::new(),
    }
    .parse()
}

struct Parser<'a> {
    source: &'a str,
    opmeta: &'a OpMeta,
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
}

/// One `lhs : rhs` clause, before matching.
struct Clause {
    lhs: Vec<LhsItem>,
    rhs: Vec<RhsNode>,
    span: Span,
    /// False when the clause already produced diagnostics; matching is
    /// skipped to avoid cascading errors.
    ok: bool,
}

impl<'a> Parser<'a> {
    fn text(&self, token: &Token) -> &'a str {
        &self.source[token.span.start().offset() as usize..token.span.end().offset() as usize]
    }

    fn error(&mut self, code: ErrorCode, span: Span, message: String) {
        self.diagnostics.push(Diagnostic::error(code, span).message(message).build());
    }

    fn parse(mut self) -> Result<Vec<ParseTree>, Vec<Diagnostic>> {
        // Split the token stream into ;-terminated sources.
        let mut sources: Vec<(std::ops::Range<usize>, Span)> = Vec::new();
        let mut start = 0;
        for i in 0..self.tokens.len() {
            if self.tokens[i].kind == TokenKind::Semi {
                sources.push((start..i, self.tokens[i].span));
                start = i + 1;
            }
        }

        // Anything meaningful after the last semi, or a document with no
        // semi at all (the empty document included), is unterminated.
        let trailing: Vec<Token> = self.tokens[start..]
            .iter()
            .filter(|t| t.kind != TokenKind::LineComment)
            .copied()
            .collect();
        if !trailing.is_empty() || sources.is_empty() {
            let span = match (trailing.first(), trailing.last()) {
                (Some(first), Some(last)) => first.span.merge(last.span),
                _ => Span::of(0, self.source.len() as u32),
            };
            self.error(
                ErrorCode::E100,
                span,
                ErrorCode::E100.message(),
            );
        }

        let mut trees = Vec::new();
        for (range, semi_span) in sources {
            trees.push(self.parse_source(range, semi_span));
        }

        if self.diagnostics.iter().any(Diagnostic::is_error) {
            Err(self.diagnostics)
        } else {
            Ok(trees)
        }
    }

    fn parse_source(&mut self, range: std::ops::Range<usize>, semi_span: Span) -> ParseTree {
        let tokens: Vec<Token> = self.tokens[range].to_vec();
        let source_span = match tokens.first() {
            Some(first) => first.span.merge(semi_span),
            None => semi_span,
        };

        // Clause boundaries: top-level commas only.
        let mut clause_ranges: Vec<std::ops::Range<usize>> = Vec::new();
        let mut depth = 0i32;
        let mut start = 0;
        for (i, token) in tokens.iter().enumerate() {
            match token.kind {
                TokenKind::LParen | TokenKind::LAngle => depth += 1,
                TokenKind::RParen | TokenKind::RAngle => depth -= 1,
                TokenKind::Comma if depth == 0 => {
                    clause_ranges.push(start..i);
                    start = i + 1;
                }
                _ => {}
            }
        }
        clause_ranges.push(start..tokens.len());

        // The empty-expression special case needs to know up front whether
        // any clause carries RHS content.
        let source_has_rhs = clause_ranges.iter().any(|r| {
            let clause = &tokens[r.clone()];
            match top_level_colon(clause) {
                Some(c) => clause[c + 1..]
                    .iter()
                    .any(|t| t.kind != TokenKind::LineComment),
                None => false,
            }
        });

        let mut bindings: HashMap<String, usize> = HashMap::new();
        let mut stack_base = 0usize;
        let mut lhs_all = Vec::new();
        let mut tree_all = Vec::new();

        for clause_range in clause_ranges {
            let clause_tokens = &tokens[clause_range];
            let clause = self.parse_clause(clause_tokens, semi_span, &bindings);
            let Some(clause) = clause else { continue };

            // A mismatched clause has no reliable slot layout, so aliases
            // bind only when matching succeeds.
            if clause.ok {
                if let Some(produced) = self.match_clause(&clause, source_has_rhs) {
                    for (k, item) in clause.lhs.iter().enumerate() {
                        if !item.is_placeholder() {
                            bindings.insert(item.name.clone(), stack_base + k);
                        }
                    }
                    stack_base += produced;
                }
            }

            lhs_all.extend(clause.lhs);
            tree_all.extend(clause.rhs);
        }

        ParseTree {
            span: source_span,
            lhs: lhs_all,
            tree: tree_all,
        }
    }

    fn parse_clause(
        &mut self,
        tokens: &[Token],
        semi_span: Span,
        bindings: &HashMap<String, usize>,
    ) -> Option<Clause> {
        let clause_span = match (tokens.first(), tokens.last()) {
            (Some(first), Some(last)) => first.span.merge(last.span),
            _ => semi_span,
        };

        let Some(colon) = top_level_colon(tokens) else {
            // No LHS/RHS separator: nothing but separators or content that
            // cannot form a clause.
            self.error(
                ErrorCode::E101,
                clause_span,
                ErrorCode::E101.message(),
            );
            return None;
        };
        if let Some(extra) = top_level_colon(&tokens[colon + 1..]) {
            self.error(
                ErrorCode::E101,
                tokens[colon + 1 + extra].span,
                ErrorCode::E101.message(),
            );
            return None;
        }

        let before = self.diagnostics.len();

        let mut lhs = Vec::new();
        for token in &tokens[..colon] {
            let text = self.text(token);
            let valid = token.kind == TokenKind::Word && (text == "_" || is_valid_alias(text));
            if valid {
                lhs.push(LhsItem {
                    name: text.to_string(),
                    span: token.span,
                });
            } else {
                self.error(
                    ErrorCode::E104,
                    token.span,
                    format!("invalid LHS alias: {text}"),
                );
            }
        }

        let rhs = self.parse_terms(&tokens[colon + 1..], bindings);

        Some(Clause {
            lhs,
            rhs,
            span: clause_span,
            ok: self.diagnostics.len() == before,
        })
    }

    /// Enforce the structural invariant: LHS item count equals the summed
    /// output arity of the clause's top-level RHS nodes. Returns the number
    /// of stack slots the clause produced, or `None` on a mismatch.
    fn match_clause(&mut self, clause: &Clause, source_has_rhs: bool) -> Option<usize> {
        if clause.rhs.is_empty() {
            if !source_has_rhs && clause.lhs.iter().all(LhsItem::is_placeholder) {
                // `_:;` / `:;` style empty expression: the placeholders
                // discard nothing and occupy no slots.
                return Some(0);
            }
            if clause.lhs.is_empty() {
                self.error(ErrorCode::E101, clause.span, ErrorCode::E101.message());
                return None;
            }
            let item = clause
                .lhs
                .iter()
                .find(|i| !i.is_placeholder())
                .unwrap_or(&clause.lhs[0]);
            self.error(
                ErrorCode::E103,
                item.span,
                format!("no RHS item exists to match this LHS item: {}", item.name),
            );
            return None;
        }

        let mut produced = 0usize;
        for node in &clause.rhs {
            if produced + node.outputs() > clause.lhs.len() {
                self.error(ErrorCode::E102, node.span(), ErrorCode::E102.message());
                return None;
            }
            produced += node.outputs();
        }
        if produced < clause.lhs.len() {
            let item = &clause.lhs[produced];
            self.error(
                ErrorCode::E103,
                item.span,
                format!("no RHS item exists to match this LHS item: {}", item.name),
            );
            return None;
        }
        Some(produced)
    }

    fn parse_terms(&mut self, tokens: &[Token], bindings: &HashMap<String, usize>) -> Vec<RhsNode> {
        let mut nodes = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            match tokens[i].kind {
                TokenKind::LineComment => i += 1,
                TokenKind::Word => {
                    let next = tokens.get(i + 1).map(|t| t.kind);
                    if matches!(next, Some(TokenKind::LAngle) | Some(TokenKind::LParen)) {
                        if let Some(node) = self.parse_call(tokens, &mut i, bindings) {
                            nodes.push(node);
                        }
                    } else {
                        if let Some(node) = self.parse_value(&tokens[i], bindings) {
                            nodes.push(node);
                        }
                        i += 1;
                    }
                }
                _ => {
                    self.error(
                        ErrorCode::E101,
                        tokens[i].span,
                        ErrorCode::E101.message(),
                    );
                    i += 1;
                }
            }
        }
        nodes
    }

    /// A bare word: literal or alias reference.
    fn parse_value(&mut self, token: &Token, bindings: &HashMap<String, usize>) -> Option<RhsNode> {
        let text = self.text(token);
        if let Some(value) = self.parse_literal(token, text) {
            return value.map(|value| RhsNode::Literal {
                value,
                span: token.span,
            });
        }
        if is_valid_alias(text) {
            return match bindings.get(text) {
                Some(&slot) => Some(RhsNode::Alias {
                    name: text.to_string(),
                    slot,
                    span: token.span,
                }),
                None => {
                    self.error(
                        ErrorCode::E107,
                        token.span,
                        format!("undefined alias: {text}"),
                    );
                    None
                }
            };
        }
        self.error(
            ErrorCode::E001,
            token.span,
            format!("unrecognized token: {text}"),
        );
        None
    }

    /// Try to read a word as a literal. Outer `Option` is "was it literal
    /// shaped at all"; inner is the parse outcome.
    fn parse_literal(&mut self, token: &Token, text: &str) -> Option<Option<U256>> {
        let parsed = if text == "max-uint256" {
            Some(Ok(U256::MAX))
        } else if let Some(digits) = text.strip_prefix("0x") {
            (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit()))
                .then(|| U256::from_str_radix(digits, 16))
        } else if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            Some(U256::from_str_radix(text, 10))
        } else {
            None
        };
        match parsed? {
            Ok(value) => Some(Some(value)),
            Err(_) => {
                self.error(
                    ErrorCode::E101,
                    token.span,
                    format!("value greater than 32 bytes in size: {text}"),
                );
                Some(None)
            }
        }
    }

    /// An opcode call: `name ('<' args '>')? '(' inputs ')'`.
    fn parse_call(
        &mut self,
        tokens: &[Token],
        i: &mut usize,
        bindings: &HashMap<String, usize>,
    ) -> Option<RhsNode> {
        let name_token = tokens[*i];
        let name = self.text(&name_token);
        *i += 1;

        // Operand args section
        let mut values = Vec::new();
        let mut had_args = false;
        if tokens.get(*i).map(|t| t.kind) == Some(TokenKind::LAngle) {
            had_args = true;
            *i += 1;
            loop {
                match tokens.get(*i) {
                    Some(t) if t.kind == TokenKind::RAngle => {
                        *i += 1;
                        break;
                    }
                    Some(t) if t.kind == TokenKind::Word => {
                        let text = self.text(t);
                        match parse_operand_value(text) {
                            Some(value) => values.push(value),
                            None => self.error(
                                ErrorCode::E105,
                                t.span,
                                format!("invalid operand arg for opcode {name}: {text}"),
                            ),
                        }
                        *i += 1;
                    }
                    _ => {
                        self.error(
                            ErrorCode::E105,
                            name_token.span,
                            format!("expected \">\" for opcode {name} operand args"),
                        );
                        return None;
                    }
                }
            }
        }

        if tokens.get(*i).map(|t| t.kind) != Some(TokenKind::LParen) {
            self.error(
                ErrorCode::E101,
                name_token.span,
                format!("expected \"(\" for opcode {name}"),
            );
            return None;
        }

        // Find the matching close paren.
        let open = *i;
        let mut depth = 0i32;
        let mut close = None;
        for (k, token) in tokens.iter().enumerate().skip(open) {
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(k);
                        break;
                    }
                }
                _ => {}
            }
        }
        let Some(close) = close else {
            self.error(
                ErrorCode::E101,
                name_token.span,
                format!("expected \")\" for opcode {name}"),
            );
            *i = tokens.len();
            return None;
        };

        let inputs = self.parse_terms(&tokens[open + 1..close], bindings);
        *i = close + 1;
        let span = name_token.span.merge(tokens[close].span);

        let Some((opcode, desc)) = self.opmeta.find(name) else {
            self.error(ErrorCode::E106, name_token.span, format!("unknown opcode: {name}"));
            return None;
        };

        // Fixed-arity input checks; computed arities are validated by the
        // operand packing below.
        let expected = match &desc.inputs {
            InputSpec::Fixed(_) => Some(0),
            InputSpec::List { parameters } => Some(parameters.len()),
            InputSpec::Computed { .. } => None,
        };
        if let Some(expected) = expected {
            if inputs.len() != expected {
                self.error(
                    ErrorCode::E108,
                    span,
                    format!(
                        "invalid number of inputs for opcode {name}: expected {expected}, got {}",
                        inputs.len()
                    ),
                );
                return None;
            }
        }
        for input in &inputs {
            if input.outputs() != 1 {
                self.error(
                    ErrorCode::E108,
                    input.span(),
                    format!("invalid input for opcode {name}: must produce exactly 1 value"),
                );
                return None;
            }
        }

        let operand = match operand::encode_operand(desc, &values, inputs.len(), had_args) {
            Ok(operand) => operand,
            Err(err) => {
                self.operand_error(name, name_token.span, err);
                return None;
            }
        };
        let outputs = match operand::output_arity(desc, operand) {
            Ok(outputs) => outputs,
            Err(err) => {
                self.operand_error(name, name_token.span, err);
                return None;
            }
        };

        Some(RhsNode::Op(OpApplication {
            opcode,
            name: name.to_string(),
            operand_args: values,
            operand,
            outputs,
            inputs,
            span,
        }))
    }

    fn operand_error(&mut self, name: &str, span: Span, err: OperandError) {
        match err {
            OperandError::UnexpectedArgs => self.error(
                ErrorCode::E105,
                span,
                format!("unexpected operand args for opcode {name}"),
            ),
            OperandError::ArgCount { expected, got } => self.error(
                ErrorCode::E105,
                span,
                format!("invalid operand args for opcode {name}: expected {expected}, got {got}"),
            ),
            OperandError::OutOfRange { arg, value } => self.error(
                ErrorCode::E105,
                span,
                format!(
                    "out-of-range operand arg for opcode {name}: value {value} does not fit \"{arg}\""
                ),
            ),
            OperandError::Computation { .. } => self.error(
                ErrorCode::E300,
                span,
                format!("invalid/corrupt operand or operand arguments in opmeta: {name}"),
            ),
        }
    }
}

/// Find the first colon at paren/angle depth zero.
fn top_level_colon(tokens: &[Token]) -> Option<usize> {
    let mut depth = 0i32;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LParen | TokenKind::LAngle => depth += 1,
            TokenKind::RParen | TokenKind::RAngle => depth -= 1,
            TokenKind::Colon if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

/// Operand-arg values are plain unsigned integers, decimal or hex.
fn parse_operand_value(text: &str) -> Option<u64> {
    if let Some(digits) = text.strip_prefix("0x") {
        (!digits.is_empty()).then(|| u64::from_str_radix(digits, 16).ok())?
    } else {
        text.parse().ok()
    }
}
