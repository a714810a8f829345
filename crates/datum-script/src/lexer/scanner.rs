//! The scanner that produces tokens from source text.

use super::{Span, Token, TokenKind};

/// A scanner that tokenizes script source code.
pub struct Scanner<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    saw_newline: bool,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            saw_newline: false,
        }
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Token {
        self.saw_newline = false;
        self.skip_whitespace_and_comments();

        let start = self.current_pos;
        let newline_before = self.saw_newline;

        let Some((_pos, ch)) = self.advance() else {
            return Token::new(TokenKind::Eof, Span::new(start, start), newline_before);
        };

        let kind = match ch {
            // Single-character tokens
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '~' => TokenKind::Tilde,

            // Multi-character tokens
            '.' => self.scan_dot(),
            '+' => self.scan_plus(),
            '-' => self.scan_minus(),
            '*' => self.scan_star(),
            '/' => self.scan_slash(),
            '%' => self.scan_percent(),
            '<' => self.scan_less_than(),
            '>' => self.scan_greater_than(),
            '=' => self.scan_equal(),
            '!' => self.scan_bang(),
            '&' => self.scan_ampersand(),
            '|' => self.scan_pipe(),
            '^' => self.scan_caret(),

            // String literals
            '"' | '\'' => self.scan_string(ch),

            // Numbers
            '0'..='9' => self.scan_number(ch),

            // Identifiers and keywords
            _ if is_id_start(ch) => self.scan_identifier(start),

            _ => TokenKind::Invalid,
        };

        Token::new(kind, Span::new(start, self.current_pos), newline_before)
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        let result = self.chars.next();
        if let Some((pos, ch)) = result {
            self.current_pos = pos + ch.len_utf8();
        }
        result
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next().map(|(_, ch)| ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\u{feff}') => {
                    self.advance();
                }
                Some('\n' | '\r' | '\u{2028}' | '\u{2029}') => {
                    self.saw_newline = true;
                    self.advance();
                }
                Some('/') => match self.peek_next() {
                    Some('/') => {
                        self.advance();
                        self.advance();
                        while let Some(ch) = self.peek() {
                            if ch == '\n' || ch == '\r' {
                                break;
                            }
                            self.advance();
                        }
                    }
                    Some('*') => {
                        self.advance();
                        self.advance();
                        let mut prev = ' ';
                        while let Some((_, ch)) = self.advance() {
                            if ch == '\n' || ch == '\r' {
                                self.saw_newline = true;
                            }
                            if prev == '*' && ch == '/' {
                                break;
                            }
                            prev = ch;
                        }
                    }
                    _ => break, // division operator
                },
                _ => break,
            }
        }
    }

    fn scan_dot(&mut self) -> TokenKind {
        if matches!(self.peek(), Some('0'..='9')) {
            self.scan_digits();
            self.scan_exponent();
            TokenKind::Number
        } else {
            TokenKind::Dot
        }
    }

    fn scan_plus(&mut self) -> TokenKind {
        if self.eat('+') {
            TokenKind::PlusPlus
        } else if self.eat('=') {
            TokenKind::PlusEqual
        } else {
            TokenKind::Plus
        }
    }

    fn scan_minus(&mut self) -> TokenKind {
        if self.eat('-') {
            TokenKind::MinusMinus
        } else if self.eat('=') {
            TokenKind::MinusEqual
        } else {
            TokenKind::Minus
        }
    }

    fn scan_star(&mut self) -> TokenKind {
        if self.eat('*') {
            if self.eat('=') {
                TokenKind::StarStarEqual
            } else {
                TokenKind::StarStar
            }
        } else if self.eat('=') {
            TokenKind::StarEqual
        } else {
            TokenKind::Star
        }
    }

    fn scan_slash(&mut self) -> TokenKind {
        if self.eat('=') {
            TokenKind::SlashEqual
        } else {
            TokenKind::Slash
        }
    }

    fn scan_percent(&mut self) -> TokenKind {
        if self.eat('=') {
            TokenKind::PercentEqual
        } else {
            TokenKind::Percent
        }
    }

    fn scan_less_than(&mut self) -> TokenKind {
        if self.eat('<') {
            if self.eat('=') {
                TokenKind::LeftShiftEqual
            } else {
                TokenKind::LeftShift
            }
        } else if self.eat('=') {
            TokenKind::LessThanEqual
        } else {
            TokenKind::LessThan
        }
    }

    fn scan_greater_than(&mut self) -> TokenKind {
        if self.eat('>') {
            if self.eat('>') {
                if self.eat('=') {
                    TokenKind::UnsignedRightShiftEqual
                } else {
                    TokenKind::UnsignedRightShift
                }
            } else if self.eat('=') {
                TokenKind::RightShiftEqual
            } else {
                TokenKind::RightShift
            }
        } else if self.eat('=') {
            TokenKind::GreaterThanEqual
        } else {
            TokenKind::GreaterThan
        }
    }

    fn scan_equal(&mut self) -> TokenKind {
        if self.eat('=') {
            if self.eat('=') {
                TokenKind::StrictEqual
            } else {
                TokenKind::EqualEqual
            }
        } else {
            TokenKind::Equal
        }
    }

    fn scan_bang(&mut self) -> TokenKind {
        if self.eat('=') {
            if self.eat('=') {
                TokenKind::StrictNotEqual
            } else {
                TokenKind::NotEqual
            }
        } else {
            TokenKind::Bang
        }
    }

    fn scan_ampersand(&mut self) -> TokenKind {
        if self.eat('&') {
            TokenKind::AmpersandAmpersand
        } else if self.eat('=') {
            TokenKind::AmpersandEqual
        } else {
            TokenKind::Ampersand
        }
    }

    fn scan_pipe(&mut self) -> TokenKind {
        if self.eat('|') {
            TokenKind::PipePipe
        } else if self.eat('=') {
            TokenKind::PipeEqual
        } else {
            TokenKind::Pipe
        }
    }

    fn scan_caret(&mut self) -> TokenKind {
        if self.eat('=') {
            TokenKind::CaretEqual
        } else {
            TokenKind::Caret
        }
    }

    /// Scans a quoted string. Escapes are skipped over but left in the raw
    /// text; the span covers both quotes.
    fn scan_string(&mut self, quote: char) -> TokenKind {
        loop {
            match self.advance() {
                None | Some((_, '\n' | '\r')) => return TokenKind::Invalid,
                Some((_, ch)) if ch == quote => return TokenKind::String,
                Some((_, '\\')) => {
                    if self.advance().is_none() {
                        return TokenKind::Invalid;
                    }
                }
                Some(_) => {}
            }
        }
    }

    fn scan_number(&mut self, first: char) -> TokenKind {
        if first == '0' {
            match self.peek() {
                Some('x' | 'X') => return self.scan_radix(16, TokenKind::HexNumber),
                Some('o' | 'O') => return self.scan_radix(8, TokenKind::OctalNumber),
                Some('b' | 'B') => return self.scan_radix(2, TokenKind::BinaryNumber),
                _ => {}
            }
        }

        self.scan_digits();

        if self.peek() == Some('.') {
            self.advance();
            self.scan_digits();
        }

        self.scan_exponent();

        if self.peek().is_some_and(is_id_start) {
            // `3in`, `1n` and friends
            self.scan_digits_and_letters();
            return TokenKind::Invalid;
        }

        TokenKind::Number
    }

    fn scan_digits(&mut self) {
        while self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
            self.advance();
        }
    }

    fn scan_exponent(&mut self) {
        if !matches!(self.peek(), Some('e' | 'E')) {
            return;
        }
        let signed = matches!(self.peek_next(), Some('+' | '-'));
        let mut lookahead = self.chars.clone();
        lookahead.next();
        if signed {
            lookahead.next();
        }
        if !lookahead.peek().is_some_and(|(_, ch)| ch.is_ascii_digit()) {
            return;
        }
        self.advance();
        if signed {
            self.advance();
        }
        self.scan_digits();
    }

    fn scan_radix(&mut self, radix: u32, kind: TokenKind) -> TokenKind {
        self.advance(); // prefix letter
        let mut digits = 0;
        while self.peek().is_some_and(|ch| ch.is_digit(radix)) {
            self.advance();
            digits += 1;
        }
        if digits == 0 || self.peek().is_some_and(is_id_continue) {
            self.scan_digits_and_letters();
            return TokenKind::Invalid;
        }
        kind
    }

    fn scan_digits_and_letters(&mut self) {
        while self.peek().is_some_and(is_id_continue) {
            self.advance();
        }
    }

    fn scan_identifier(&mut self, start: usize) -> TokenKind {
        self.scan_digits_and_letters();
        keyword(&self.source[start..self.current_pos]).unwrap_or(TokenKind::Identifier)
    }
}

/// Maps an identifier spelling to its keyword token, if it is one.
fn keyword(name: &str) -> Option<TokenKind> {
    let kind = match name {
        "const" => TokenKind::Const,
        "else" => TokenKind::Else,
        "false" => TokenKind::False,
        "function" => TokenKind::Function,
        "if" => TokenKind::If,
        "let" => TokenKind::Let,
        "null" => TokenKind::Null,
        "return" => TokenKind::Return,
        "true" => TokenKind::True,
        "var" => TokenKind::Var,
        "while" => TokenKind::While,
        _ => return None,
    };
    Some(kind)
}

/// Checks if a character can start an identifier.
fn is_id_start(ch: char) -> bool {
    ch == '_' || ch == '$' || unicode_xid::UnicodeXID::is_xid_start(ch)
}

/// Checks if a character can continue an identifier.
fn is_id_continue(ch: char) -> bool {
    ch == '_' || ch == '$' || unicode_xid::UnicodeXID::is_xid_continue(ch)
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Scanner::new(source).map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_tokens() {
        let mut scanner = Scanner::new("{ } ( )");
        assert!(matches!(scanner.next_token().kind, TokenKind::LeftBrace));
        assert!(matches!(scanner.next_token().kind, TokenKind::RightBrace));
        assert!(matches!(scanner.next_token().kind, TokenKind::LeftParen));
        assert!(matches!(scanner.next_token().kind, TokenKind::RightParen));
    }

    #[test]
    fn test_numbers() {
        let source = "42 3.14 .5 1e10 0xff 0o17 0b1010";
        let texts: Vec<_> = Scanner::new(source)
            .map(|t| (t.kind, t.text(source)))
            .collect();
        assert_eq!(
            texts,
            vec![
                (TokenKind::Number, "42"),
                (TokenKind::Number, "3.14"),
                (TokenKind::Number, ".5"),
                (TokenKind::Number, "1e10"),
                (TokenKind::HexNumber, "0xff"),
                (TokenKind::OctalNumber, "0o17"),
                (TokenKind::BinaryNumber, "0b1010"),
            ]
        );
    }

    #[test]
    fn test_malformed_numbers() {
        assert_eq!(kinds("0x"), vec![TokenKind::Invalid]);
        assert_eq!(kinds("12abc"), vec![TokenKind::Invalid]);
    }

    #[test]
    fn test_strings_keep_raw_text() {
        let source = r#""hello" 'it\'s'"#;
        let mut scanner = Scanner::new(source);
        let first = scanner.next_token();
        let second = scanner.next_token();
        assert_eq!(first.kind, TokenKind::String);
        assert_eq!(first.text(source), "\"hello\"");
        assert_eq!(second.text(source), r"'it\'s'");
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(kinds("\"abc"), vec![TokenKind::Invalid]);
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("function var let const return if else while true false null"),
            vec![
                TokenKind::Function,
                TokenKind::Var,
                TokenKind::Let,
                TokenKind::Const,
                TokenKind::Return,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::While,
                TokenKind::True,
                TokenKind::False,
                TokenKind::Null,
            ]
        );
    }

    #[test]
    fn test_identifiers() {
        let source = "foo _bar $baz variable";
        let tokens: Vec<_> = Scanner::new(source).collect();
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Identifier));
        assert_eq!(tokens[3].text(source), "variable");
    }

    #[test]
    fn test_compound_operators() {
        assert_eq!(
            kinds("+= -= *= /= %= **= ++ -- ** === !=="),
            vec![
                TokenKind::PlusEqual,
                TokenKind::MinusEqual,
                TokenKind::StarEqual,
                TokenKind::SlashEqual,
                TokenKind::PercentEqual,
                TokenKind::StarStarEqual,
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
                TokenKind::StarStar,
                TokenKind::StrictEqual,
                TokenKind::StrictNotEqual,
            ]
        );
    }

    #[test]
    fn test_comments_and_newlines() {
        let mut scanner = Scanner::new("1 /* multi\nline */ 2 // tail\n3 4");
        assert!(!scanner.next_token().newline_before);
        assert!(scanner.next_token().newline_before);
        assert!(scanner.next_token().newline_before);
        assert!(!scanner.next_token().newline_before);
        assert_eq!(scanner.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn test_division_vs_comment() {
        assert_eq!(
            kinds("6 / 2"),
            vec![TokenKind::Number, TokenKind::Slash, TokenKind::Number]
        );
    }

    #[test]
    fn test_member_access() {
        assert_eq!(
            kinds("a.b"),
            vec![TokenKind::Identifier, TokenKind::Dot, TokenKind::Identifier]
        );
    }
}
