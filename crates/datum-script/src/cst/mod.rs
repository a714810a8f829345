//! Concrete syntax trees.
//!
//! The parser produces a generic tree: every interior node is tagged with a
//! grammar [`Rule`] and holds an ordered list of children, every leaf is a
//! terminal carrying its raw source text. The shape of each rule (how many
//! children, in what order) is fixed by the grammar; consumers navigate by
//! position instead of named fields.
//!
//! The compiler only sees trees through the [`SyntaxNode`] trait, so any
//! parser that reproduces these shapes can feed it.

use std::borrow::Cow;
use std::fmt;

use crate::lexer::Span;

/// Grammar productions that appear as interior CST nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Program,
    SourceElements,
    SourceElement,
    Statement,
    Block,
    StatementList,
    VariableStatement,
    VariableDeclarationList,
    VarModifier,
    VariableDeclaration,
    EmptyStatement,
    ExpressionStatement,
    IfStatement,
    IterationStatement,
    ReturnStatement,
    FunctionDeclaration,
    FormalParameterList,
    FormalParameterArg,
    FunctionBody,
    ArrayLiteral,
    ElementList,
    ArrayElement,
    Arguments,
    Argument,
    ExpressionSequence,
    SingleExpression,
    AssignmentOperator,
    Assignable,
    Literal,
    NumericLiteral,
    Identifier,
    IdentifierName,
    Eos,
}

impl Rule {
    /// The production name as written in the grammar.
    pub fn name(self) -> &'static str {
        match self {
            Rule::Program => "program",
            Rule::SourceElements => "sourceElements",
            Rule::SourceElement => "sourceElement",
            Rule::Statement => "statement",
            Rule::Block => "block",
            Rule::StatementList => "statementList",
            Rule::VariableStatement => "variableStatement",
            Rule::VariableDeclarationList => "variableDeclarationList",
            Rule::VarModifier => "varModifier",
            Rule::VariableDeclaration => "variableDeclaration",
            Rule::EmptyStatement => "emptyStatement_",
            Rule::ExpressionStatement => "expressionStatement",
            Rule::IfStatement => "ifStatement",
            Rule::IterationStatement => "iterationStatement",
            Rule::ReturnStatement => "returnStatement",
            Rule::FunctionDeclaration => "functionDeclaration",
            Rule::FormalParameterList => "formalParameterList",
            Rule::FormalParameterArg => "formalParameterArg",
            Rule::FunctionBody => "functionBody",
            Rule::ArrayLiteral => "arrayLiteral",
            Rule::ElementList => "elementList",
            Rule::ArrayElement => "arrayElement",
            Rule::Arguments => "arguments",
            Rule::Argument => "argument",
            Rule::ExpressionSequence => "expressionSequence",
            Rule::SingleExpression => "singleExpression",
            Rule::AssignmentOperator => "assignmentOperator",
            Rule::Assignable => "assignable",
            Rule::Literal => "literal",
            Rule::NumericLiteral => "numericLiteral",
            Rule::Identifier => "identifier",
            Rule::IdentifierName => "identifierName",
            Rule::Eos => "eos",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lexical categories of terminal nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    StringLiteral,
    NullLiteral,
    BooleanLiteral,
    DecimalLiteral,
    HexIntegerLiteral,
    OctalIntegerLiteral,
    BinaryIntegerLiteral,
    Identifier,
    Keyword,
    Punctuator,
    Eof,
}

/// Read-only view of a concrete syntax node.
///
/// Interior nodes report a [`Rule`]; terminals report a [`TokenType`].
/// `text` on an interior node is the concatenated text of its leaves with no
/// separating whitespace.
pub trait SyntaxNode {
    /// The grammar rule of an interior node, `None` for terminals.
    fn rule(&self) -> Option<Rule>;

    /// The token category of a terminal, `None` for interior nodes.
    fn token_type(&self) -> Option<TokenType>;

    /// Number of ordered children (zero for terminals).
    fn child_count(&self) -> usize;

    /// The child at `index`, if any.
    fn child(&self, index: usize) -> Option<&Self>;

    /// Raw text covered by this node.
    fn text(&self) -> Cow<'_, str>;

    /// Byte range in the source.
    fn span(&self) -> Span;

    /// Returns true for leaf nodes.
    fn is_terminal(&self) -> bool {
        self.rule().is_none()
    }

    /// Iterates over the children in order.
    fn children(&self) -> impl Iterator<Item = &Self> {
        (0..self.child_count()).filter_map(move |i| self.child(i))
    }
}

/// The concrete tree produced by [`crate::parser::Parser`].
#[derive(Debug, Clone, PartialEq)]
pub enum CstNode {
    /// Interior node
    Rule {
        /// Production that produced this node
        rule: Rule,
        /// Ordered children
        children: Vec<CstNode>,
        /// Source range
        span: Span,
    },
    /// Leaf node
    Terminal {
        /// Token category
        token: TokenType,
        /// Raw source text
        text: String,
        /// Source range
        span: Span,
    },
}

impl CstNode {
    /// Builds an interior node. An empty node is anchored at `at`.
    pub fn node(rule: Rule, children: Vec<CstNode>, at: usize) -> Self {
        let span = match (children.first(), children.last()) {
            (Some(first), Some(last)) => first.span().to(last.span()),
            _ => Span::new(at, at),
        };
        CstNode::Rule {
            rule,
            children,
            span,
        }
    }

    /// Builds a leaf node.
    pub fn terminal(token: TokenType, text: impl Into<String>, span: Span) -> Self {
        CstNode::Terminal {
            token,
            text: text.into(),
            span,
        }
    }

    fn write_text(&self, out: &mut String) {
        match self {
            CstNode::Rule { children, .. } => {
                for child in children {
                    child.write_text(out);
                }
            }
            CstNode::Terminal {
                token: TokenType::Eof,
                ..
            } => {}
            CstNode::Terminal { text, .. } => out.push_str(text),
        }
    }
}

impl SyntaxNode for CstNode {
    fn rule(&self) -> Option<Rule> {
        match self {
            CstNode::Rule { rule, .. } => Some(*rule),
            CstNode::Terminal { .. } => None,
        }
    }

    fn token_type(&self) -> Option<TokenType> {
        match self {
            CstNode::Rule { .. } => None,
            CstNode::Terminal { token, .. } => Some(*token),
        }
    }

    fn child_count(&self) -> usize {
        match self {
            CstNode::Rule { children, .. } => children.len(),
            CstNode::Terminal { .. } => 0,
        }
    }

    fn child(&self, index: usize) -> Option<&Self> {
        match self {
            CstNode::Rule { children, .. } => children.get(index),
            CstNode::Terminal { .. } => None,
        }
    }

    fn text(&self) -> Cow<'_, str> {
        match self {
            CstNode::Terminal { text, .. } => Cow::Borrowed(text),
            CstNode::Rule { .. } => {
                let mut out = String::new();
                self.write_text(&mut out);
                Cow::Owned(out)
            }
        }
    }

    fn span(&self) -> Span {
        match self {
            CstNode::Rule { span, .. } | CstNode::Terminal { span, .. } => *span,
        }
    }
}

/// LISP-style rendering: `(rule child child ...)`, terminals as raw text.
impl fmt::Display for CstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CstNode::Terminal {
                token: TokenType::Eof,
                ..
            } => f.write_str("<EOF>"),
            CstNode::Terminal { text, .. } => f.write_str(text),
            CstNode::Rule { rule, children, .. } => {
                if children.is_empty() {
                    return write!(f, "{}", rule);
                }
                write!(f, "({}", rule)?;
                for child in children {
                    write!(f, " {}", child)?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str, at: usize) -> CstNode {
        CstNode::node(
            Rule::Identifier,
            vec![CstNode::terminal(
                TokenType::Identifier,
                name,
                Span::new(at, at + name.len()),
            )],
            at,
        )
    }

    #[test]
    fn test_rule_text_concatenates_leaves() {
        let member = CstNode::node(
            Rule::SingleExpression,
            vec![
                ident("a", 0),
                CstNode::terminal(TokenType::Punctuator, ".", Span::new(2, 3)),
                ident("b", 4),
            ],
            0,
        );
        assert_eq!(member.text(), "a.b");
        assert_eq!(member.span(), Span::new(0, 5));
        assert_eq!(member.child_count(), 3);
        assert_eq!(member.child(1).map(|c| c.text().into_owned()), Some(".".into()));
        assert!(member.child(3).is_none());
    }

    #[test]
    fn test_terminal_has_no_rule() {
        let leaf = CstNode::terminal(TokenType::DecimalLiteral, "42", Span::new(0, 2));
        assert!(leaf.is_terminal());
        assert_eq!(leaf.rule(), None);
        assert_eq!(leaf.token_type(), Some(TokenType::DecimalLiteral));
        assert_eq!(leaf.children().count(), 0);
    }

    #[test]
    fn test_empty_rule_is_anchored() {
        let eos = CstNode::node(Rule::Eos, Vec::new(), 7);
        assert_eq!(eos.span(), Span::new(7, 7));
        assert_eq!(eos.text(), "");
    }

    #[test]
    fn test_display_tree() {
        let tree = CstNode::node(
            Rule::Program,
            vec![
                CstNode::node(Rule::SourceElements, Vec::new(), 0),
                CstNode::terminal(TokenType::Eof, "", Span::new(0, 0)),
            ],
            0,
        );
        assert_eq!(tree.to_string(), "(program sourceElements <EOF>)");
    }
}
