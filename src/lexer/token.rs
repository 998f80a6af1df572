//! Token model shared by the lexer, the interpreter and the assembly emitter
//!
//! A [`Token`] is immutable once the lexer produces it. Captured procedure and
//! macro bodies are stored as [`TokenSeq`], a shared slice, so that pushing a
//! body onto the operand stack or recording it in a snapshot never copies the
//! tokens themselves.

use std::fmt;
use std::sync::Arc;

/// A shared, immutable run of tokens (a program, or a captured body).
pub type TokenSeq = Arc<[Token]>;

/// Position of a token in its source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file: Arc<str>,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(file: Arc<str>, line: usize, column: usize) -> Self {
        SourceLocation { file, line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// All token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Literal push: number, string or identifier
    Push,

    // Grouping
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,

    // Operators
    Plus,       // +
    PlusPlus,   // ++
    PlusEq,     // +=
    Minus,      // -
    MinusMinus, // --
    MinusEq,    // -=
    Star,       // *
    StarStar,   // **
    StarEq,     // *=
    Slash,      // /
    SlashEq,    // /=
    Percent,    // %
    Gt,         // >
    GtEq,       // >=
    Lt,         // <
    LtEq,       // <=
    Eq,         // =
    EqEq,       // ==
    Bang,       // !
    BangEq,     // !=
    Colon,      // :
    Dot,        // .
    Hash,       // #
    Pipe,       // |
    LBind,      // <|
    RBind,      // |>
    Arrow,      // ->
    Address,    // &
    CallStruct, // <>
    GrabObject, // ...
    ObjectAssign, // ::

    // Keywords / intrinsics
    Proc,
    Struct,
    Macro,
    If,
    Else,
    End,
    Include,
    Print,
    Dup,
    Drop,
    Swap,
    Call,
    Exit,
    True,
    False,
    And,
    Or,
    Not,
    Return,
    Pass,
    Sizeof,
    Deref,
    Free,

    // Type names
    TypeInt,
    TypeFloat,
    TypeStr,
    TypeBool,
    TypePtr,

    /// End of the token stream
    Eof,
}

/// Coarse classification of a [`TokenKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCategory {
    LiteralPush,
    Grouping,
    Operator,
    Keyword,
    TypeName,
    EndMarker,
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TokenCategory::LiteralPush => "push",
            TokenCategory::Grouping => "grouping",
            TokenCategory::Operator => "operator",
            TokenCategory::Keyword => "keyword",
            TokenCategory::TypeName => "type",
            TokenCategory::EndMarker => "end",
        };
        f.write_str(label)
    }
}

impl TokenKind {
    pub fn category(self) -> TokenCategory {
        use TokenKind::*;
        match self {
            Push | True | False => TokenCategory::LiteralPush,
            LParen | RParen | LBrace | RBrace | Comma => TokenCategory::Grouping,
            Proc | Struct | Macro | If | Else | End | Include | Print | Dup | Drop | Swap
            | Call | Exit | And | Or | Not | Return | Pass | Sizeof | Deref | Free => {
                TokenCategory::Keyword
            }
            TypeInt | TypeFloat | TypeStr | TypeBool | TypePtr => TokenCategory::TypeName,
            Eof => TokenCategory::EndMarker,
            _ => TokenCategory::Operator,
        }
    }

    /// Tokens that open a block closed by `end`.
    pub fn opens_block(self) -> bool {
        matches!(
            self,
            TokenKind::If | TokenKind::Proc | TokenKind::Macro | TokenKind::Struct
        )
    }

    /// Source spelling of the token, used in diagnostics.
    pub fn spelling(self) -> &'static str {
        use TokenKind::*;
        match self {
            Push => "literal",
            LParen => "(",
            RParen => ")",
            LBrace => "{",
            RBrace => "}",
            Comma => ",",
            Plus => "+",
            PlusPlus => "++",
            PlusEq => "+=",
            Minus => "-",
            MinusMinus => "--",
            MinusEq => "-=",
            Star => "*",
            StarStar => "**",
            StarEq => "*=",
            Slash => "/",
            SlashEq => "/=",
            Percent => "%",
            Gt => ">",
            GtEq => ">=",
            Lt => "<",
            LtEq => "<=",
            Eq => "=",
            EqEq => "==",
            Bang => "!",
            BangEq => "!=",
            Colon => ":",
            Dot => ".",
            Hash => "#",
            Pipe => "|",
            LBind => "<|",
            RBind => "|>",
            Arrow => "->",
            Address => "&",
            CallStruct => "<>",
            GrabObject => "...",
            ObjectAssign => "::",
            Proc => "proc",
            Struct => "struct",
            Macro => "macro",
            If => "if",
            Else => "else",
            End => "end",
            Include => "include",
            Print => "print",
            Dup => "dup",
            Drop => "drop",
            Swap => "swap",
            Call => "call",
            Exit => "exit",
            True => "true",
            False => "false",
            And => "and",
            Or => "or",
            Not => "not",
            Return => "return",
            Pass => "pass",
            Sizeof => "sizeof",
            Deref => "deref",
            Free => "free",
            TypeInt => "int",
            TypeFloat => "float",
            TypeStr => "str",
            TypeBool => "bool",
            TypePtr => "ptr",
            Eof => "end of file",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Debug spelling of the variant, upper-cased like the token dump expects
        let name = format!("{:?}", self);
        write!(f, "{}", name.to_uppercase())
    }
}

/// Literal payload carried by push tokens (and `true`/`false`).
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Ident(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(n) => write!(f, "{}", n),
            Literal::Float(x) => write!(f, "{}", x),
            Literal::Str(s) => write!(f, "\"{}\"", s),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Ident(name) => write!(f, "{}", name),
        }
    }
}

/// How the payload of a token should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Number,
    String,
    Identifier,
    Bool,
    Intrinsic,
    Operand,
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LiteralKind::Number => "NUMBER",
            LiteralKind::String => "STRING",
            LiteralKind::Identifier => "IDENTIFIER",
            LiteralKind::Bool => "BOOL",
            LiteralKind::Intrinsic => "INTRINSIC",
            LiteralKind::Operand => "OPERAND",
        };
        write!(f, "{}", name)
    }
}

/// A lexical unit with its kind, optional payload and location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: Option<Literal>,
    pub literal_kind: LiteralKind,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        literal: Option<Literal>,
        literal_kind: LiteralKind,
        location: SourceLocation,
    ) -> Self {
        Token {
            kind,
            literal,
            literal_kind,
            location,
        }
    }

    /// The end-of-stream marker at `location`.
    pub fn eof(location: SourceLocation) -> Self {
        Token::new(TokenKind::Eof, None, LiteralKind::Operand, location)
    }

    /// Identifier name, if this is an identifier push.
    pub fn ident(&self) -> Option<&str> {
        match (&self.kind, &self.literal) {
            (TokenKind::Push, Some(Literal::Ident(name))) => Some(name),
            _ => None,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    /// One-line dump used by the `-token` front-end mode.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let contents = self
            .literal
            .as_ref()
            .map(|lit| lit.to_string())
            .unwrap_or_else(|| "None".to_string());
        write!(
            f,
            "{:>4}:{:<3} {:<13}│ {:<8} │ Contents: {:<16}│ Type: {}",
            self.location.line,
            self.location.column,
            self.kind.to_string(),
            self.kind.category().to_string(),
            contents,
            self.literal_kind
        )
    }
}
