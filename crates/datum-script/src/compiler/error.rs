//! Compilation errors.

use thiserror::Error;

use crate::lexer::Span;

/// A fatal error raised while lowering a syntax tree.
///
/// Every variant carries the span of the offending node. Compilation stops at
/// the first error and no partial program is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A rule appeared with a child count or operator the compiler does not handle.
    #[error("unsupported {rule} with {children} children: {detail}")]
    UnsupportedShape {
        /// Grammar rule name (or `token` for terminals)
        rule: &'static str,
        /// Child count of the offending node
        children: usize,
        /// What was found
        detail: String,
        /// Source range
        span: Span,
    },

    /// The tree or the compiler state broke a structural invariant.
    #[error("malformed {rule}: {message}")]
    Structure {
        /// Grammar rule name (or `token` for terminals)
        rule: &'static str,
        /// What went wrong
        message: String,
        /// Source range
        span: Span,
    },

    /// A literal whose text matched no supported numeric form.
    #[error("unimplemented literal `{text}`")]
    UnimplementedLiteral {
        /// Raw literal text
        text: String,
        /// Source range
        span: Span,
    },
}

impl CompileError {
    /// The span of the offending node.
    pub fn span(&self) -> Span {
        match self {
            CompileError::UnsupportedShape { span, .. }
            | CompileError::Structure { span, .. }
            | CompileError::UnimplementedLiteral { span, .. } => *span,
        }
    }

    /// Renders the error location as `line:col` followed by the offending
    /// source text, truncated to its first line.
    pub fn fragment(&self, source: &str) -> String {
        let span = self.span();
        let (line, col) = span.line_col(source);
        let text = source
            .get(span.start..span.end)
            .and_then(|s| s.lines().next())
            .unwrap_or("");
        format!("{}:{}: `{}`", line, col, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment() {
        let source = "var a = 1;\na <<= 2;";
        let err = CompileError::UnsupportedShape {
            rule: "singleExpression",
            children: 3,
            detail: "operator `<<=`".into(),
            span: Span::new(11, 18),
        };
        assert_eq!(err.fragment(source), "2:1: `a <<= 2`");
        assert_eq!(
            err.to_string(),
            "unsupported singleExpression with 3 children: operator `<<=`"
        );
    }

    #[test]
    fn test_fragment_multiline_span() {
        let source = "{\n  x;\n}";
        let err = CompileError::Structure {
            rule: "block",
            message: "bad".into(),
            span: Span::new(0, source.len()),
        };
        assert_eq!(err.fragment(source), "1:1: `{`");
    }

    #[test]
    fn test_fragment_with_foreign_source() {
        let err = CompileError::UnimplementedLiteral {
            text: "0xff".into(),
            span: Span::new(1, 3),
        };
        assert_eq!(err.fragment("é"), "1:1: ``");
        assert_eq!(err.fragment(""), "1:1: ``");
    }
}
