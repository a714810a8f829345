//! Token definitions for the script lexer.

use std::fmt;

/// A span in the source code, representing a range of bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the length of this span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if this span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Returns the 1-based line and column of the span start within `source`.
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let mut end = self.start.min(source.len());
        while !source.is_char_boundary(end) {
            end -= 1;
        }
        let prefix = &source[..end];
        let line = prefix.matches('\n').count() + 1;
        let col = prefix
            .rfind('\n')
            .map_or(prefix.chars().count(), |nl| prefix[nl + 1..].chars().count())
            + 1;
        (line, col)
    }
}

/// A token produced by the lexer.
///
/// Tokens carry no text of their own; the raw spelling is always recovered
/// from the source through [`Token::text`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The span in the source code
    pub span: Span,
    /// Whether a line terminator appeared between this token and the previous one
    pub newline_before: bool,
}

impl Token {
    /// Creates a new token.
    pub fn new(kind: TokenKind, span: Span, newline_before: bool) -> Self {
        Self {
            kind,
            span,
            newline_before,
        }
    }

    /// Returns the raw source text of this token.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.span.start..self.span.end]
    }
}

/// The different kinds of tokens in the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    /// Decimal numeric literal (integer, fraction or exponent form)
    Number,
    /// `0x` prefixed integer literal
    HexNumber,
    /// `0o` prefixed integer literal
    OctalNumber,
    /// `0b` prefixed integer literal
    BinaryNumber,
    /// Quoted string literal, quotes included in the span
    String,
    /// Boolean true
    True,
    /// Boolean false
    False,
    /// null
    Null,

    /// Identifier
    Identifier,

    // Keywords
    Const,
    Else,
    Function,
    If,
    Let,
    Return,
    Var,
    While,

    // Punctuation
    /// {
    LeftBrace,
    /// }
    RightBrace,
    /// (
    LeftParen,
    /// )
    RightParen,
    /// [
    LeftBracket,
    /// ]
    RightBracket,
    /// .
    Dot,
    /// ;
    Semicolon,
    /// ,
    Comma,
    /// <
    LessThan,
    /// >
    GreaterThan,
    /// <=
    LessThanEqual,
    /// >=
    GreaterThanEqual,
    /// ==
    EqualEqual,
    /// !=
    NotEqual,
    /// ===
    StrictEqual,
    /// !==
    StrictNotEqual,
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// **
    StarStar,
    /// ++
    PlusPlus,
    /// --
    MinusMinus,
    /// <<
    LeftShift,
    /// >>
    RightShift,
    /// >>>
    UnsignedRightShift,
    /// &
    Ampersand,
    /// |
    Pipe,
    /// ^
    Caret,
    /// !
    Bang,
    /// ~
    Tilde,
    /// &&
    AmpersandAmpersand,
    /// ||
    PipePipe,
    /// =
    Equal,
    /// +=
    PlusEqual,
    /// -=
    MinusEqual,
    /// *=
    StarEqual,
    /// /=
    SlashEqual,
    /// %=
    PercentEqual,
    /// **=
    StarStarEqual,
    /// <<=
    LeftShiftEqual,
    /// >>=
    RightShiftEqual,
    /// >>>=
    UnsignedRightShiftEqual,
    /// &=
    AmpersandEqual,
    /// |=
    PipeEqual,
    /// ^=
    CaretEqual,

    /// End of input
    Eof,
    /// Unrecognized or malformed input
    Invalid,
}

impl TokenKind {
    /// Returns true for the keyword tokens.
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Const
                | TokenKind::Else
                | TokenKind::Function
                | TokenKind::If
                | TokenKind::Let
                | TokenKind::Return
                | TokenKind::Var
                | TokenKind::While
        )
    }

    /// Returns true for `=` and every compound assignment operator.
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            TokenKind::Equal
                | TokenKind::PlusEqual
                | TokenKind::MinusEqual
                | TokenKind::StarEqual
                | TokenKind::SlashEqual
                | TokenKind::PercentEqual
                | TokenKind::StarStarEqual
                | TokenKind::LeftShiftEqual
                | TokenKind::RightShiftEqual
                | TokenKind::UnsignedRightShiftEqual
                | TokenKind::AmpersandEqual
                | TokenKind::PipeEqual
                | TokenKind::CaretEqual
        )
    }

    /// Returns true for the numeric literal kinds.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            TokenKind::Number
                | TokenKind::HexNumber
                | TokenKind::OctalNumber
                | TokenKind::BinaryNumber
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Number
            | TokenKind::HexNumber
            | TokenKind::OctalNumber
            | TokenKind::BinaryNumber => "number",
            TokenKind::String => "string",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::Identifier => "identifier",
            TokenKind::Const => "const",
            TokenKind::Else => "else",
            TokenKind::Function => "function",
            TokenKind::If => "if",
            TokenKind::Let => "let",
            TokenKind::Return => "return",
            TokenKind::Var => "var",
            TokenKind::While => "while",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBracket => "[",
            TokenKind::RightBracket => "]",
            TokenKind::Dot => ".",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::LessThan => "<",
            TokenKind::GreaterThan => ">",
            TokenKind::LessThanEqual => "<=",
            TokenKind::GreaterThanEqual => ">=",
            TokenKind::EqualEqual => "==",
            TokenKind::NotEqual => "!=",
            TokenKind::StrictEqual => "===",
            TokenKind::StrictNotEqual => "!==",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::StarStar => "**",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::LeftShift => "<<",
            TokenKind::RightShift => ">>",
            TokenKind::UnsignedRightShift => ">>>",
            TokenKind::Ampersand => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Bang => "!",
            TokenKind::Tilde => "~",
            TokenKind::AmpersandAmpersand => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::Equal => "=",
            TokenKind::PlusEqual => "+=",
            TokenKind::MinusEqual => "-=",
            TokenKind::StarEqual => "*=",
            TokenKind::SlashEqual => "/=",
            TokenKind::PercentEqual => "%=",
            TokenKind::StarStarEqual => "**=",
            TokenKind::LeftShiftEqual => "<<=",
            TokenKind::RightShiftEqual => ">>=",
            TokenKind::UnsignedRightShiftEqual => ">>>=",
            TokenKind::AmpersandEqual => "&=",
            TokenKind::PipeEqual => "|=",
            TokenKind::CaretEqual => "^=",
            TokenKind::Eof => "end of input",
            TokenKind::Invalid => "invalid token",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_line_col() {
        let source = "var a = 1;\nvar b = 2;";
        assert_eq!(Span::new(0, 3).line_col(source), (1, 1));
        assert_eq!(Span::new(15, 16).line_col(source), (2, 5));
    }

    #[test]
    fn test_span_line_col_inside_char() {
        let source = "'é'\nx";
        assert_eq!(Span::new(2, 3).line_col(source), (1, 2));
        assert_eq!(Span::new(40, 41).line_col(source), (2, 2));
    }

    #[test]
    fn test_span_to() {
        let joined = Span::new(4, 6).to(Span::new(1, 2));
        assert_eq!(joined, Span::new(1, 6));
        assert_eq!(joined.len(), 5);
    }

    #[test]
    fn test_assignment_kinds() {
        assert!(TokenKind::Equal.is_assignment());
        assert!(TokenKind::StarStarEqual.is_assignment());
        assert!(!TokenKind::EqualEqual.is_assignment());
    }
}
