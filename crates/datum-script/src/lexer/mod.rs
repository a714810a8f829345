//! Lexical analysis (tokenization) for script source code.
//!
//! The lexer transforms source text into a stream of tokens that the CST
//! parser consumes. Tokens carry only a kind and a span; the raw spelling is
//! read back from the source, which keeps string and numeric literal text
//! exactly as written.
//!
//! ## Structure
//!
//! - `scanner.rs` - Main `Scanner` struct that produces tokens
//! - `token.rs` - `Token`, `TokenKind` and `Span` definitions
//!
//! ## Usage
//!
//! ```rust
//! use datum_script::lexer::{Scanner, TokenKind};
//!
//! let source = "var x = 42;";
//! let mut scanner = Scanner::new(source);
//!
//! loop {
//!     let token = scanner.next_token();
//!     if matches!(token.kind, TokenKind::Eof) {
//!         break;
//!     }
//!     println!("{:?} {:?}", token.kind, token.text(source));
//! }
//! ```

mod scanner;
mod token;

pub use scanner::Scanner;
pub use token::{Span, Token, TokenKind};
