//! Statement lowering.
//!
//! | Statement | Emitted node |
//! |-----------|--------------|
//! | `var x = e;` | `SetVariable(x, e, CannotExist, declaration)` |
//! | `var x;` | `SetVariable(x, Literal(Null), CannotExist, declaration)` |
//! | `e;` | the node of `e` |
//! | `return e;` | `Return(e)` (`Return(Literal(Null))` without a value) |
//! | `function f(a) { .. }` | `SetVariable(f, FunctionDefinition, Unconstrained, declaration)` |
//! | `{ .. }` | `ScopeBlock` |
//! | `if (c) .. else ..` | `If` |

use std::sync::Arc;

use super::{
    Compiler, Destination, assignable_name, child, child_rule, expect_text, identifier_name,
    structure, unsupported,
};
use crate::ast::{FunctionDefinition, Literal, Node, ResolutionPolicy};
use crate::compiler::CompileError;
use crate::cst::{Rule, SyntaxNode};

impl Compiler {
    /// `variableStatement: variableDeclarationList eos`
    pub(super) fn variable_statement<N: SyntaxNode>(&mut self, node: &N) -> Result<(), CompileError> {
        if node.child_count() != 2 {
            return Err(unsupported(node, "expected `variableDeclarationList eos`"));
        }
        let list = child_rule(node, 0, Rule::VariableDeclarationList)?;
        child_rule(node, 1, Rule::Eos)?;

        let modifier = child_rule(list, 0, Rule::VarModifier)?;
        if modifier.text() != "var" {
            return Err(unsupported(
                modifier,
                format!("`{}` declarations are not supported", modifier.text()),
            ));
        }
        if list.child_count() != 2 {
            return Err(unsupported(list, "only one declarator per statement is supported"));
        }

        let declaration = child_rule(list, 1, Rule::VariableDeclaration)?;
        let name = assignable_name(child(declaration, 0)?)?;
        let value = match declaration.child_count() {
            1 => Node::Literal(Literal::Null),
            3 => {
                expect_text(declaration, 1, "=")?;
                self.expression(child(declaration, 2)?)?
            }
            _ => return Err(unsupported(declaration, "expected `name = value`")),
        };

        self.emit(
            Node::SetVariable {
                name,
                value: Box::new(value),
                policy: ResolutionPolicy::CannotExist,
                declaration: true,
            },
            node,
        )
    }

    /// `expressionStatement: expressionSequence eos`
    pub(super) fn expression_statement<N: SyntaxNode>(&mut self, node: &N) -> Result<(), CompileError> {
        if node.child_count() != 2 {
            return Err(unsupported(node, "expected `expressionSequence eos`"));
        }
        let value = self.expression(child_rule(node, 0, Rule::ExpressionSequence)?)?;
        self.emit(value, node)
    }

    /// `returnStatement: 'return' expressionSequence? eos`
    pub(super) fn return_statement<N: SyntaxNode>(&mut self, node: &N) -> Result<(), CompileError> {
        expect_text(node, 0, "return")?;
        let value = match node.child_count() {
            2 => Node::Literal(Literal::Null),
            3 => self.expression(child_rule(node, 1, Rule::ExpressionSequence)?)?,
            _ => return Err(unsupported(node, "expected `return value;`")),
        };
        self.emit(Node::Return(Box::new(value)), node)
    }

    /// `functionDeclaration: 'function' identifier '(' formalParameterList? ')' functionBody`
    pub(super) fn function_declaration<N: SyntaxNode>(&mut self, node: &N) -> Result<(), CompileError> {
        let count = node.child_count();
        if count != 5 && count != 6 {
            return Err(unsupported(node, "expected `function name(params) { body }`"));
        }
        expect_text(node, 0, "function")?;
        let name = identifier_name(child(node, 1)?)?;
        expect_text(node, 2, "(")?;
        expect_text(node, count - 2, ")")?;

        let params = if count == 6 {
            self.formal_parameters(child_rule(node, 3, Rule::FormalParameterList)?)?
        } else {
            Vec::new()
        };

        let body = child_rule(node, count - 1, Rule::FunctionBody)?;
        if body.child_count() != 3 {
            return Err(unsupported(body, "expected `{ sourceElements }`"));
        }
        expect_text(body, 0, "{")?;
        expect_text(body, 2, "}")?;
        let elements = child_rule(body, 1, Rule::SourceElements)?;
        let body = self.collect(Destination::Function, body, |c| c.visit(elements).map(|_| ()))?;

        let definition = FunctionDefinition {
            name: name.clone(),
            params,
            body,
        };
        self.emit(
            Node::SetVariable {
                name,
                value: Box::new(Node::FunctionDefinition(Arc::new(definition))),
                policy: ResolutionPolicy::Unconstrained,
                declaration: true,
            },
            node,
        )
    }

    /// `formalParameterList: formalParameterArg (',' formalParameterArg)*`
    fn formal_parameters<N: SyntaxNode>(&mut self, node: &N) -> Result<Vec<String>, CompileError> {
        let mut params: Vec<String> = Vec::new();
        for param in node.children() {
            if param.is_terminal() {
                if param.text() != "," {
                    return Err(structure(param, "expected `,` between parameters"));
                }
                continue;
            }
            if param.rule() != Some(Rule::FormalParameterArg) || param.child_count() != 1 {
                return Err(unsupported(param, "default and rest parameters are not supported"));
            }
            let name = assignable_name(child(param, 0)?)?;
            if params.contains(&name) {
                return Err(structure(param, format!("duplicate parameter `{}`", name)));
            }
            params.push(name);
        }
        Ok(params)
    }

    /// `block: '{' statementList '}'`
    pub(super) fn block<N: SyntaxNode>(&mut self, node: &N) -> Result<(), CompileError> {
        let body = self.block_body(node)?;
        self.emit(Node::ScopeBlock(body), node)
    }

    fn block_body<N: SyntaxNode>(&mut self, node: &N) -> Result<Vec<Node>, CompileError> {
        if node.child_count() != 3 {
            return Err(unsupported(node, "expected `{ statementList }`"));
        }
        expect_text(node, 0, "{")?;
        expect_text(node, 2, "}")?;
        let statements = child_rule(node, 1, Rule::StatementList)?;
        self.collect(Destination::Block, node, |c| c.visit(statements).map(|_| ()))
    }

    /// `ifStatement: 'if' '(' expressionSequence ')' statement ('else' statement)?`
    pub(super) fn if_statement<N: SyntaxNode>(&mut self, node: &N) -> Result<(), CompileError> {
        let count = node.child_count();
        if count != 5 && count != 7 {
            return Err(unsupported(node, "expected `if (condition) statement else statement`"));
        }
        expect_text(node, 0, "if")?;
        expect_text(node, 1, "(")?;
        expect_text(node, 3, ")")?;

        let condition = self.expression(child_rule(node, 2, Rule::ExpressionSequence)?)?;
        let then_branch = self.branch(child_rule(node, 4, Rule::Statement)?)?;
        let else_branch = if count == 7 {
            expect_text(node, 5, "else")?;
            Some(self.branch(child_rule(node, 6, Rule::Statement)?)?)
        } else {
            None
        };

        self.emit(
            Node::If {
                condition: Box::new(condition),
                then_branch,
                else_branch,
            },
            node,
        )
    }

    /// A branch body. A braced block contributes its statements directly.
    fn branch<N: SyntaxNode>(&mut self, statement: &N) -> Result<Vec<Node>, CompileError> {
        let inner = super::single_child(statement)?;
        if inner.rule() == Some(Rule::Block) {
            return self.block_body(inner);
        }
        self.collect(Destination::Block, statement, |c| c.visit(statement).map(|_| ()))
    }
}
