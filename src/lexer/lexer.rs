//! Lexer (tokenizer) for finn source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed directly by
//! the interpreter. Unknown characters are reported as non-fatal diagnostics
//! and skipped; an unterminated string literal stops scanning immediately.

use super::token::{Literal, LiteralKind, SourceLocation, Token, TokenKind};
use std::sync::Arc;
use thiserror::Error;

/// What went wrong while scanning.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexErrorKind {
    #[error("Unexpected character \"{0}\"")]
    UnexpectedCharacter(char),

    #[error("Unterminated string")]
    UnterminatedString,

    #[error("Invalid number literal \"{0}\"")]
    InvalidNumber(String),
}

/// Lexer diagnostic with the location it refers to.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{location}: {kind}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub location: SourceLocation,
}

impl LexError {
    /// Only unterminated strings halt scanning.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind, LexErrorKind::UnterminatedString)
    }
}

/// Result of a successful scan.
#[derive(Debug, Clone)]
pub struct Lexed {
    /// Tokens in source order, always ending with [`TokenKind::Eof`]
    pub tokens: Vec<Token>,
    /// Number of tokens created, the end marker included
    pub count: usize,
    /// Non-fatal diagnostics, in the order they were found
    pub diagnostics: Vec<LexError>,
}

/// Tokenize `source`, attributing every token to `file`.
pub fn tokenize(source: &str, file: &str) -> Result<Lexed, LexError> {
    Lexer::new(source, file).tokenize()
}

/// Lexer for finn source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    file: Arc<str>,
    tokens: Vec<Token>,
    diagnostics: Vec<LexError>,
}

impl Lexer {
    pub fn new(input: &str, file: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            file: Arc::from(file),
            tokens: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(mut self) -> Result<Lexed, LexError> {
        loop {
            self.skip_whitespace_and_comments();

            if self.is_at_end() {
                let loc = self.current_location();
                self.tokens.push(Token::eof(loc));
                break;
            }

            self.scan_token()?;
        }

        let count = self.tokens.len();
        tracing::debug!(file = %self.file, count, "lexed source");
        Ok(Lexed {
            tokens: self.tokens,
            count,
            diagnostics: self.diagnostics,
        })
    }

    fn scan_token(&mut self) -> Result<(), LexError> {
        let loc = self.current_location();
        let ch = match self.advance() {
            Some(ch) => ch,
            None => return Ok(()),
        };

        use TokenKind::*;
        let kind = match ch {
            '"' => return self.string_literal(loc),
            '0'..='9' => {
                self.number_literal(ch, false, loc);
                return Ok(());
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                self.identifier_or_keyword(ch, loc);
                return Ok(());
            }

            '(' => self.pick(&[(')', Call)], LParen),
            ')' => RParen,
            '{' => LBrace,
            '}' => RBrace,
            ',' => Comma,
            '#' => Hash,
            '&' => Address,
            '%' => Percent,
            '.' => {
                if self.peek() == Some('.') && self.peek_ahead(1) == Some('.') {
                    self.advance();
                    self.advance();
                    GrabObject
                } else {
                    Dot
                }
            }
            ':' => self.pick(&[(':', ObjectAssign)], Colon),
            '|' => self.pick(&[('>', RBind)], Pipe),
            '-' => {
                if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    let first = self.advance().unwrap_or('0');
                    self.number_literal(first, true, loc);
                    return Ok(());
                }
                self.pick(&[('=', MinusEq), ('-', MinusMinus), ('>', Arrow)], Minus)
            }
            '+' => self.pick(&[('=', PlusEq), ('+', PlusPlus)], Plus),
            '*' => self.pick(&[('=', StarEq), ('*', StarStar)], Star),
            '/' => self.pick(&[('=', SlashEq)], Slash),
            '!' => self.pick(&[('=', BangEq)], Bang),
            '=' => self.pick(&[('=', EqEq)], Eq),
            '<' => self.pick(&[('=', LtEq), ('|', LBind), ('>', CallStruct)], Lt),
            '>' => self.pick(&[('=', GtEq)], Gt),

            _ => {
                self.diagnose(LexErrorKind::UnexpectedCharacter(ch), loc);
                return Ok(());
            }
        };

        let literal_kind = if kind == Call {
            LiteralKind::Intrinsic
        } else {
            LiteralKind::Operand
        };
        self.tokens.push(Token::new(kind, None, literal_kind, loc));
        Ok(())
    }

    /// Longest-match helper: consume the first matching follow character.
    fn pick(&mut self, follows: &[(char, TokenKind)], single: TokenKind) -> TokenKind {
        for &(next, kind) in follows {
            if self.peek() == Some(next) {
                self.advance();
                return kind;
            }
        }
        single
    }

    /// Parse string literal; the opening quote is already consumed
    fn string_literal(&mut self, loc: SourceLocation) -> Result<(), LexError> {
        let mut text = String::new();

        while let Some(ch) = self.peek() {
            if ch == '"' {
                self.advance(); // closing quote
                self.tokens.push(Token::new(
                    TokenKind::Push,
                    Some(Literal::Str(text)),
                    LiteralKind::String,
                    loc,
                ));
                return Ok(());
            }

            self.advance();
            if ch == '\\' {
                match self.peek() {
                    Some(escaped @ ('n' | 't' | 'r' | '0' | '\\' | '"')) => {
                        self.advance();
                        text.push(match escaped {
                            'n' => '\n',
                            't' => '\t',
                            'r' => '\r',
                            '0' => '\0',
                            other => other,
                        });
                    }
                    _ => text.push('\\'),
                }
            } else {
                text.push(ch);
            }
        }

        let error = LexError {
            kind: LexErrorKind::UnterminatedString,
            location: loc,
        };
        tracing::warn!(%error, "fatal lexer error");
        Err(error)
    }

    /// Parse numeric literal; `first_digit` is already consumed
    fn number_literal(&mut self, first_digit: char, negative: bool, loc: SourceLocation) {
        let mut text = String::new();
        if negative {
            text.push('-');
        }
        text.push(first_digit);
        self.take_digits(&mut text);

        let mut is_float = false;
        if self.peek() == Some('.') && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            text.push('.');
            self.advance();
            self.take_digits(&mut text);
        }

        let literal = if is_float {
            text.parse::<f64>().ok().map(Literal::Float)
        } else {
            text.parse::<i64>().ok().map(Literal::Int)
        };

        match literal {
            Some(literal) => self.tokens.push(Token::new(
                TokenKind::Push,
                Some(literal),
                LiteralKind::Number,
                loc,
            )),
            None => self.diagnose(LexErrorKind::InvalidNumber(text), loc),
        }
    }

    fn take_digits(&mut self, text: &mut String) {
        while let Some(ch) = self.peek() {
            if !ch.is_ascii_digit() {
                break;
            }
            text.push(ch);
            self.advance();
        }
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char, loc: SourceLocation) {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        use TokenKind::*;
        let (kind, literal, literal_kind) = match ident.as_str() {
            "true" => (True, Some(Literal::Bool(true)), LiteralKind::Bool),
            "false" => (False, Some(Literal::Bool(false)), LiteralKind::Bool),
            word => match keyword(word) {
                Some(kind) => (kind, None, LiteralKind::Intrinsic),
                None => (Push, Some(Literal::Ident(ident)), LiteralKind::Identifier),
            },
        };

        self.tokens.push(Token::new(kind, literal, literal_kind, loc));
    }

    /// Skip whitespace and `//` comments
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') if self.peek_ahead(1) == Some('/') => {
                    while let Some(ch) = self.peek() {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn diagnose(&mut self, kind: LexErrorKind, location: SourceLocation) {
        let error = LexError { kind, location };
        tracing::warn!(%error, "lexer diagnostic");
        self.diagnostics.push(error);
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character, keeping line/column in step
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(Arc::clone(&self.file), self.line, self.column)
    }
}

/// Keyword table; `true`/`false` are handled separately since they carry a payload.
fn keyword(word: &str) -> Option<TokenKind> {
    use TokenKind::*;
    let kind = match word {
        "proc" => Proc,
        "struct" => Struct,
        "macro" => Macro,
        "if" => If,
        "else" => Else,
        "end" => End,
        "include" => Include,
        "print" | "out" => Print,
        "dup" => Dup,
        "drop" => Drop,
        "swap" => Swap,
        "call" => Call,
        "exit" => Exit,
        "and" => And,
        "or" => Or,
        "not" => Not,
        "return" => Return,
        "pass" => Pass,
        "sizeof" => Sizeof,
        "deref" => Deref,
        "free" => Free,
        "int" => TypeInt,
        "float" => TypeFloat,
        "str" => TypeStr,
        "bool" => TypeBool,
        "ptr" => TypePtr,
        _ => return None,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source, "test.finn")
            .unwrap()
            .tokens
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_longest_match_punctuation() {
        use TokenKind::*;
        assert_eq!(
            kinds(":: : == = != ! -> - <> <| <= < >= > |> | ... . () ( ** *= += ++ -- -= /="),
            vec![
                ObjectAssign, Colon, EqEq, Eq, BangEq, Bang, Arrow, Minus, CallStruct, LBind,
                LtEq, Lt, GtEq, Gt, RBind, Pipe, GrabObject, Dot, Call, LParen, StarStar,
                StarEq, PlusEq, PlusPlus, MinusMinus, MinusEq, SlashEq, Eof
            ]
        );
    }

    #[test]
    fn test_negative_number_is_lexical() {
        let lexed = tokenize("10 -4 - 2", "t").unwrap();
        assert_eq!(lexed.tokens[0].literal, Some(Literal::Int(10)));
        assert_eq!(lexed.tokens[1].literal, Some(Literal::Int(-4)));
        assert_eq!(lexed.tokens[2].kind, TokenKind::Minus);
        assert_eq!(lexed.tokens[3].literal, Some(Literal::Int(2)));
        assert_eq!(lexed.count, 5);
    }

    #[test]
    fn test_float_needs_digit_after_dot() {
        let lexed = tokenize("3.25 7. -0.5", "t").unwrap();
        assert_eq!(lexed.tokens[0].literal, Some(Literal::Float(3.25)));
        assert_eq!(lexed.tokens[1].literal, Some(Literal::Int(7)));
        assert_eq!(lexed.tokens[2].kind, TokenKind::Dot);
        assert_eq!(lexed.tokens[3].literal, Some(Literal::Float(-0.5)));
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let lexed = tokenize("proc foo_1 out print true", "t").unwrap();
        assert_eq!(lexed.tokens[0].kind, TokenKind::Proc);
        assert_eq!(lexed.tokens[0].literal_kind, LiteralKind::Intrinsic);
        assert_eq!(lexed.tokens[1].ident(), Some("foo_1"));
        assert_eq!(lexed.tokens[1].literal_kind, LiteralKind::Identifier);
        assert_eq!(lexed.tokens[2].kind, TokenKind::Print);
        assert_eq!(lexed.tokens[3].kind, TokenKind::Print);
        assert_eq!(lexed.tokens[4].literal, Some(Literal::Bool(true)));
    }

    #[test]
    fn test_multiline_string_tracks_lines() {
        let lexed = tokenize("\"one\ntwo\" x", "t").unwrap();
        assert_eq!(
            lexed.tokens[0].literal,
            Some(Literal::Str("one\ntwo".to_string()))
        );
        assert_eq!(lexed.tokens[1].location.line, 2);
        assert_eq!(lexed.tokens[1].location.column, 6);
    }

    #[test]
    fn test_string_escapes() {
        let lexed = tokenize(r#""a\tb\n\q""#, "t").unwrap();
        assert_eq!(
            lexed.tokens[0].literal,
            Some(Literal::Str("a\tb\n\\q".to_string()))
        );
    }

    #[test]
    fn test_unterminated_string_is_fatal() {
        let err = tokenize("1 2 \"oops", "main.finn").unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "main.finn:1:5: Unterminated string");
    }

    #[test]
    fn test_unknown_character_is_not_fatal() {
        let lexed = tokenize("1 $ 2", "main.finn").unwrap();
        assert_eq!(lexed.diagnostics.len(), 1);
        assert_eq!(
            lexed.diagnostics[0].to_string(),
            "main.finn:1:3: Unexpected character \"$\""
        );
        assert_eq!(lexed.tokens.len(), 3);
    }

    #[test]
    fn test_comments_and_positions() {
        let lexed = tokenize("1 // ignored\n  dup", "t").unwrap();
        assert_eq!(lexed.tokens.len(), 3);
        assert_eq!(lexed.tokens[1].kind, TokenKind::Dup);
        assert_eq!(lexed.tokens[1].location.line, 2);
        assert_eq!(lexed.tokens[1].location.column, 3);
    }

    #[test]
    fn test_struct_definition_tokens() {
        use TokenKind::*;
        assert_eq!(
            kinds("Point :: struct x: int y: int end"),
            vec![Push, ObjectAssign, Struct, Push, Colon, TypeInt, Push, Colon, TypeInt, End, Eof]
        );
    }

    #[test]
    fn test_token_dump_shows_category() {
        use crate::lexer::TokenCategory;
        let lexed = tokenize("x 1 + print ( int", "t").unwrap();
        let categories: Vec<_> = lexed.tokens.iter().map(|t| t.kind.category()).collect();
        assert_eq!(
            categories,
            vec![
                TokenCategory::LiteralPush,
                TokenCategory::LiteralPush,
                TokenCategory::Operator,
                TokenCategory::Keyword,
                TokenCategory::Grouping,
                TokenCategory::TypeName,
                TokenCategory::EndMarker,
            ]
        );
        assert!(lexed.tokens[2].to_string().contains("│ operator │"));
    }
}
