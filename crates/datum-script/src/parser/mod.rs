//! Parser for script source code.
//!
//! Transforms a stream of tokens into a concrete syntax tree ([`CstNode`])
//! whose interior nodes follow the fixed grammar shapes documented in
//! [`crate::cst`].
//!
//! ## Usage
//!
//! ```rust
//! use datum_script::cst::SyntaxNode;
//! use datum_script::parser::Parser;
//!
//! let mut parser = Parser::new("var x = 1 + 2;");
//! let program = parser.parse_program().expect("Should parse");
//! assert_eq!(program.child_count(), 2);
//! ```
//!
//! [`CstNode`]: crate::cst::CstNode

mod parser;

pub use parser::Parser;
