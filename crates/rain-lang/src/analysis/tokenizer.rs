use rain_core::{Diagnostic, ErrorCode, Span};

use super::token::{CommentSpan, Token, TokenKind};

/// Result of tokenizing a rainlang document.
#[derive(Clone, Debug)]
pub struct Analysis {
    pub tokens: Vec<Token>,
    pub comments: Vec<CommentSpan>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Analysis {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Tokenizer for rainlang source text.
pub struct Tokenizer<'a> {
    source: &'a str,
    pos: usize,
    tokens: Vec<Token>,
    comments: Vec<CommentSpan>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            tokens: Vec::new(),
            comments: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Tokenize the entire document.
    pub fn tokenize(mut self) -> Analysis {
        let bytes = self.source.as_bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b if b.is_ascii_whitespace() => self.pos += 1,
                b'/' if bytes.get(self.pos + 1) == Some(&b'*') => self.block_comment(),
                b'/' if bytes.get(self.pos + 1) == Some(&b'/') => self.line_comment(),
                b':' => self.single(TokenKind::Colon),
                b',' => self.single(TokenKind::Comma),
                b';' => self.single(TokenKind::Semi),
                b'<' => self.single(TokenKind::LAngle),
                b'>' => self.single(TokenKind::RAngle),
                b'(' => self.single(TokenKind::LParen),
                b')' => self.single(TokenKind::RParen),
                _ => self.word(),
            }
        }
        Analysis {
            tokens: self.tokens,
            comments: self.comments,
            diagnostics: self.diagnostics,
        }
    }

    fn single(&mut self, kind: TokenKind) {
        let span = Span::of(self.pos as u32, self.pos as u32 + 1);
        self.tokens.push(Token::new(kind, span));
        self.pos += 1;
    }

    /// Skip a `/* ... */` comment, keeping its span. An unterminated comment
    /// is a fatal lex error.
    fn block_comment(&mut self) {
        let bytes = self.source.as_bytes();
        let start = self.pos;
        let doc = self.source[start..].starts_with("/**");
        self.pos += 2;
        while self.pos < bytes.len() {
            if bytes[self.pos] == b'*' && bytes.get(self.pos + 1) == Some(&b'/') {
                self.pos += 2;
                self.comments.push(CommentSpan {
                    span: Span::of(start as u32, self.pos as u32),
                    doc,
                });
                return;
            }
            self.pos += 1;
        }
        let span = Span::of(start as u32, self.pos as u32);
        self.diagnostics
            .push(Diagnostic::error(ErrorCode::E002, span).build());
    }

    /// A `//` comment runs to end of line and stays in the token stream.
    fn line_comment(&mut self) {
        let bytes = self.source.as_bytes();
        let start = self.pos;
        while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
            self.pos += 1;
        }
        self.tokens.push(Token::new(
            TokenKind::LineComment,
            Span::of(start as u32, self.pos as u32),
        ));
    }

    /// Read a word: a maximal run of non-separator characters. A `/` stays
    /// in the word unless it opens a comment, so alias-looking text such as
    /// `/foo` reaches the parser intact for diagnosis.
    fn word(&mut self) {
        let bytes = self.source.as_bytes();
        let start = self.pos;
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b if b.is_ascii_whitespace() => break,
                b':' | b',' | b';' | b'<' | b'>' | b'(' | b')' => break,
                b'/' if bytes.get(self.pos + 1) == Some(&b'*')
                    || bytes.get(self.pos + 1) == Some(&b'/') =>
                {
                    break;
                }
                _ => self.pos += 1,
            }
        }
        self.tokens.push(Token::new(
            TokenKind::Word,
            Span::of(start as u32, self.pos as u32),
        ));
    }
}
