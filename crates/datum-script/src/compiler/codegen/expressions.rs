//! Expression lowering.
//!
//! `singleExpression` is overloaded; the child count selects the family and
//! the raw text of the punctuation children selects the form:
//!
//! | Children | Form | Node |
//! |----------|------|------|
//! | 1 | `x`, literal, `[..]` | `GetVariable`, `Literal`, `CreateList` |
//! | 2 | `++x`, `-x`, `f(..)`, `x++` | see `assign`, `Unary`, `Call` |
//! | 3 | `(e)`, `a.b`, `a = b`, `a += b`, `a + b` | inner, `GetMember`, see `assign`, `Binary` |
//! | 4 | `a[i]` | `GetIndex` |

use super::{
    Compiler, EvalMode, child, child_rule, expect_text, identifier_name, is_text, single_child,
    structure, unsupported,
};
use crate::ast::{BinaryOperator, Literal, Node, UnaryOperator};
use crate::compiler::CompileError;
use crate::cst::{Rule, SyntaxNode, TokenType};

impl Compiler {
    /// `expressionSequence: singleExpression (',' singleExpression)*`
    pub(super) fn expression_sequence<N: SyntaxNode>(&mut self, node: &N) -> Result<Node, CompileError> {
        if node.child_count() != 1 {
            return Err(unsupported(node, "comma sequences are not supported"));
        }
        self.expression(child(node, 0)?)
    }

    pub(super) fn single_expression<N: SyntaxNode>(&mut self, node: &N) -> Result<Node, CompileError> {
        if self.mode() == EvalMode::LValue {
            return Err(structure(node, "value expression compiled as an assignment target"));
        }

        match node.child_count() {
            1 => self.primary(child(node, 0)?),
            2 => self.unary_or_call(node),
            3 => self.ternary_shape(node),
            4 if is_text(node, 1, "[") && is_text(node, 3, "]") => {
                let object = self.expression(child(node, 0)?)?;
                let index = self.expression(child_rule(node, 2, Rule::ExpressionSequence)?)?;
                Ok(Node::GetIndex {
                    object: Box::new(object),
                    index: Box::new(index),
                })
            }
            _ => Err(unsupported(node, format!("`{}`", node.text()))),
        }
    }

    fn primary<N: SyntaxNode>(&mut self, inner: &N) -> Result<Node, CompileError> {
        match inner.rule() {
            Some(
                Rule::Identifier
                | Rule::Literal
                | Rule::ArrayLiteral
                | Rule::SingleExpression
                | Rule::ExpressionSequence,
            ) => self.expression(inner),
            Some(Rule::ExpressionStatement) => {
                self.expression(child_rule(inner, 0, Rule::ExpressionSequence)?)
            }
            _ => Err(unsupported(inner, format!("`{}` is not a value", inner.text()))),
        }
    }

    fn unary_or_call<N: SyntaxNode>(&mut self, node: &N) -> Result<Node, CompileError> {
        let first = child(node, 0)?;
        let second = child(node, 1)?;

        if first.is_terminal() {
            let op = first.text();
            return match &*op {
                "++" => self.pre_update(second, BinaryOperator::Add),
                "--" => self.pre_update(second, BinaryOperator::Sub),
                text => {
                    let operator = UnaryOperator::from_operator(text).ok_or_else(|| {
                        unsupported(node, format!("prefix operator `{}`", text))
                    })?;
                    let operand = self.expression(second)?;
                    Ok(Node::Unary {
                        operator,
                        operand: Box::new(operand),
                    })
                }
            };
        }

        if second.rule() == Some(Rule::Arguments) {
            return self.call(first, second);
        }

        if second.is_terminal() {
            return match &*second.text() {
                "++" => self.post_update(first, BinaryOperator::Add),
                "--" => self.post_update(first, BinaryOperator::Sub),
                text => Err(unsupported(node, format!("postfix operator `{}`", text))),
            };
        }

        Err(unsupported(node, format!("`{}`", node.text())))
    }

    fn ternary_shape<N: SyntaxNode>(&mut self, node: &N) -> Result<Node, CompileError> {
        if is_text(node, 0, "(") && is_text(node, 2, ")") {
            return self.expression(child_rule(node, 1, Rule::ExpressionSequence)?);
        }

        let left = child(node, 0)?;
        let op = child(node, 1)?;
        let right = child(node, 2)?;

        if op.rule() == Some(Rule::AssignmentOperator) {
            return self.compound_assignment(left, op, right);
        }
        if !op.is_terminal() {
            return Err(unsupported(node, format!("operator `{}`", op.text())));
        }

        match &*op.text() {
            "." => {
                let object = self.expression(left)?;
                Ok(Node::GetMember {
                    object: Box::new(object),
                    member: member_name(right)?,
                })
            }
            "=" => self.assignment(left, right),
            text => {
                let operator = BinaryOperator::from_operator(text)
                    .ok_or_else(|| unsupported(node, format!("operator `{}`", text)))?;
                let left = self.expression(left)?;
                let right = self.expression(right)?;
                Ok(Node::binary(operator, left, right))
            }
        }
    }

    /// `callee arguments`, where `arguments: '(' argument (',' argument)* ')'`
    fn call<N: SyntaxNode>(&mut self, callee: &N, arguments: &N) -> Result<Node, CompileError> {
        let callee = self.expression(callee)?;
        let count = arguments.child_count();
        if count < 2 {
            return Err(structure(arguments, "expected `(` and `)`"));
        }
        expect_text(arguments, 0, "(")?;
        expect_text(arguments, count - 1, ")")?;

        let mut args = Vec::new();
        for i in 1..count - 1 {
            let arg = child(arguments, i)?;
            if arg.is_terminal() {
                if arg.text() != "," {
                    return Err(structure(arg, "expected `,` between arguments"));
                }
                continue;
            }
            args.push(self.expression(arg)?);
        }

        Ok(Node::Call {
            callee: Box::new(callee),
            arguments: args,
        })
    }

    /// `arrayLiteral: '[' elementList ']'`
    pub(super) fn array_literal<N: SyntaxNode>(&mut self, node: &N) -> Result<Node, CompileError> {
        if node.child_count() != 3 {
            return Err(unsupported(node, "expected `[ elementList ]`"));
        }
        expect_text(node, 0, "[")?;
        expect_text(node, 2, "]")?;
        let list = child_rule(node, 1, Rule::ElementList)?;

        let mut elements = Vec::new();
        for element in list.children() {
            if element.is_terminal() {
                if element.text() != "," {
                    return Err(structure(element, "expected `,` between elements"));
                }
                continue;
            }
            elements.push(self.expression(element)?);
        }
        Ok(Node::CreateList { elements })
    }

    // ========================================================================
    // Literals
    // ========================================================================

    /// `literal: NullLiteral | BooleanLiteral | StringLiteral | numericLiteral`
    pub(super) fn literal<N: SyntaxNode>(&mut self, node: &N) -> Result<Node, CompileError> {
        let inner = single_child(node)?;
        if inner.rule() == Some(Rule::NumericLiteral) {
            return self.numeric_literal(inner);
        }

        let text = inner.text();
        let literal = match inner.token_type() {
            Some(TokenType::StringLiteral) => Literal::String(strip_quotes(inner, &text)?),
            Some(TokenType::NullLiteral) => Literal::Null,
            Some(TokenType::BooleanLiteral) => match &*text {
                "true" => Literal::Bool(true),
                "false" => Literal::Bool(false),
                other => return Err(structure(inner, format!("bad boolean `{}`", other))),
            },
            // Bare decimal token without a numericLiteral wrapper
            Some(TokenType::DecimalLiteral) => parse_short_decimal(&text)
                .ok_or_else(|| unimplemented_literal(inner))?,
            _ => return Err(unsupported(inner, format!("literal `{}`", text))),
        };
        Ok(Node::Literal(literal))
    }

    /// `numericLiteral: DecimalLiteral | HexIntegerLiteral | ...`
    pub(super) fn numeric_literal<N: SyntaxNode>(&mut self, node: &N) -> Result<Node, CompileError> {
        let token = single_child(node)?;
        match token.token_type() {
            Some(TokenType::DecimalLiteral) => parse_decimal(&token.text())
                .map(Node::Literal)
                .ok_or_else(|| unimplemented_literal(token)),
            _ => Err(unimplemented_literal(token)),
        }
    }
}

/// Parses decimal literal text, narrowest representation first: i32, i64,
/// then f32 and f64. The f32 attempt only succeeds for finite results.
pub fn parse_decimal(text: &str) -> Option<Literal> {
    if let Ok(v) = text.parse::<i32>() {
        return Some(Literal::Int(v));
    }
    if let Ok(v) = text.parse::<i64>() {
        return Some(Literal::Long(v));
    }
    if let Ok(v) = text.parse::<f32>().map_err(drop).and_then(finite_f32) {
        return Some(Literal::Float(v));
    }
    if let Ok(v) = text.parse::<f64>() {
        if v.is_finite() {
            return Some(Literal::Double(v));
        }
    }
    None
}

fn parse_short_decimal(text: &str) -> Option<Literal> {
    if let Ok(v) = text.parse::<i32>() {
        return Some(Literal::Int(v));
    }
    text.parse::<f32>()
        .map_err(drop)
        .and_then(finite_f32)
        .ok()
        .map(Literal::Float)
}

fn finite_f32(v: f32) -> Result<f32, ()> {
    if v.is_finite() { Ok(v) } else { Err(()) }
}

fn unimplemented_literal<N: SyntaxNode>(token: &N) -> CompileError {
    CompileError::UnimplementedLiteral {
        text: token.text().into_owned(),
        span: token.span(),
    }
}

/// Strips the surrounding quotes; escapes are kept as written.
fn strip_quotes<N: SyntaxNode>(token: &N, text: &str) -> Result<String, CompileError> {
    let bytes = text.as_bytes();
    let quoted = bytes.len() >= 2
        && matches!(bytes[0], b'"' | b'\'')
        && bytes[bytes.len() - 1] == bytes[0];
    if !quoted {
        return Err(structure(token, format!("unterminated string `{}`", text)));
    }
    Ok(text[1..text.len() - 1].to_string())
}

/// `identifierName: identifier | reservedWord`
fn member_name<N: SyntaxNode>(node: &N) -> Result<String, CompileError> {
    if node.rule() != Some(Rule::IdentifierName) {
        return Err(structure(node, "expected a member name"));
    }
    let inner = single_child(node)?;
    if inner.rule() == Some(Rule::Identifier) {
        return identifier_name(inner);
    }
    if inner.is_terminal() {
        return Ok(inner.text().into_owned());
    }
    Err(structure(inner, "expected a member name"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_order() {
        assert_eq!(parse_decimal("42"), Some(Literal::Int(42)));
        assert_eq!(parse_decimal("2147483648"), Some(Literal::Long(2_147_483_648)));
        assert_eq!(parse_decimal("1.5"), Some(Literal::Float(1.5)));
        assert_eq!(parse_decimal("1e300"), Some(Literal::Double(1e300)));
        assert_eq!(parse_decimal("1e999"), None);
    }

    #[test]
    fn test_parse_short_decimal() {
        assert_eq!(parse_short_decimal("7"), Some(Literal::Int(7)));
        assert_eq!(parse_short_decimal("2147483648"), Some(Literal::Float(2_147_483_648.0)));
        assert_eq!(parse_short_decimal("1e300"), None);
    }
}
