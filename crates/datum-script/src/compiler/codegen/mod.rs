//! Code generation from concrete syntax trees to operation nodes.
//!
//! The [`Compiler`] walks a tree through the [`SyntaxNode`] view only. Every
//! rule funnels through one dispatcher, [`Compiler::visit`], keyed by rule;
//! within a rule the handler inspects the child count and the raw text of
//! punctuation children to pick a lowering. Statements append to the
//! innermost open destination, expressions return their node to the caller.
//!
//! # Module Structure
//!
//! - `destination`: statement sinks for program, function and block bodies
//! - `statements`: variable, expression, return, function, block and `if`
//! - `expressions`: `singleExpression`, literals, calls and arrays
//! - `assign`: assignment targets, increments and compound assignment

mod assign;
mod destination;
mod expressions;
mod statements;


pub use destination::{Destination, DestinationError, DestinationStack};

use tracing::{debug, trace};

use crate::ast::{Node, Program};
use crate::compiler::CompileError;
use crate::cst::{Rule, SyntaxNode, TokenType};

/// Whether an expression is being compiled for its value or as a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalMode {
    /// Produce a value
    RValue,
    /// Resolve an assignment target
    LValue,
}

/// Compiles a concrete syntax tree into a [`Program`].
///
/// A compiler is single use: [`Compiler::compile`] consumes it.
#[derive(Debug)]
pub struct Compiler {
    destinations: DestinationStack,
    modes: Vec<EvalMode>,
}

impl Compiler {
    /// Creates a new compiler.
    pub fn new() -> Self {
        Self {
            destinations: DestinationStack::new(),
            modes: vec![EvalMode::RValue],
        }
    }

    /// Compiles a `program` root (`sourceElements EOF`).
    pub fn compile<N: SyntaxNode>(mut self, root: &N) -> Result<Program, CompileError> {
        if root.rule() != Some(Rule::Program) {
            return Err(structure(root, "expected a program root"));
        }
        if root.child_count() != 2 {
            return Err(unsupported(root, "program must be `sourceElements EOF`"));
        }
        let eof = child(root, 1)?;
        if eof.token_type() != Some(TokenType::Eof) {
            return Err(structure(eof, "expected end of input after source elements"));
        }

        debug!("compiling program");
        self.destinations.push(Destination::Program);
        self.visit(child(root, 0)?)?;
        let body = self.close(Destination::Program, root)?;

        if self.destinations.depth() != 0 || self.modes != [EvalMode::RValue] {
            return Err(structure(root, "compiler state not restored after program"));
        }

        let program = Program { body };
        debug!(
            statements = program.body.len(),
            nodes = program.body.iter().map(Node::count).sum::<usize>(),
            "compiled program"
        );
        Ok(program)
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Compiles any node. Statement rules append to the current destination
    /// and yield `None`; expression rules yield their node.
    pub(crate) fn visit<N: SyntaxNode>(&mut self, node: &N) -> Result<Option<Node>, CompileError> {
        let Some(rule) = node.rule() else {
            return Err(unsupported(node, format!("unexpected token `{}`", node.text())));
        };
        trace!(rule = rule.name(), children = node.child_count(), "visit");

        match rule {
            Rule::SourceElements | Rule::StatementList => {
                for element in node.children() {
                    self.visit(element)?;
                }
                Ok(None)
            }
            Rule::SourceElement | Rule::Statement => {
                let inner = single_child(node)?;
                self.visit(inner)?;
                Ok(None)
            }
            Rule::VariableStatement => self.variable_statement(node).map(|_| None),
            Rule::ExpressionStatement => self.expression_statement(node).map(|_| None),
            Rule::ReturnStatement => self.return_statement(node).map(|_| None),
            Rule::FunctionDeclaration => self.function_declaration(node).map(|_| None),
            Rule::Block => self.block(node).map(|_| None),
            Rule::IfStatement => self.if_statement(node).map(|_| None),
            Rule::EmptyStatement => Ok(None),

            Rule::ExpressionSequence => self.expression_sequence(node).map(Some),
            Rule::SingleExpression => self.single_expression(node).map(Some),
            Rule::Literal => self.literal(node).map(Some),
            Rule::NumericLiteral => self.numeric_literal(node).map(Some),
            Rule::ArrayLiteral => self.array_literal(node).map(Some),
            Rule::Identifier => Ok(Some(Node::get_variable(identifier_name(node)?))),
            Rule::Argument | Rule::ArrayElement => {
                let inner = single_child(node)?;
                self.expression(inner).map(Some)
            }

            _ => Err(unsupported(node, format!("`{}` is not supported here", rule))),
        }
    }

    /// Compiles a node that must produce a value.
    pub(crate) fn expression<N: SyntaxNode>(&mut self, node: &N) -> Result<Node, CompileError> {
        self.visit(node)?
            .ok_or_else(|| structure(node, "statement used where a value is required"))
    }

    /// Appends a compiled statement to the current destination.
    pub(crate) fn emit<N: SyntaxNode>(&mut self, node: Node, at: &N) -> Result<(), CompileError> {
        self.destinations
            .append(node)
            .map_err(|e| structure(at, e.to_string()))
    }

    /// Compiles `body` into a fresh destination of `kind` and returns its nodes.
    pub(crate) fn collect<N, F>(&mut self, kind: Destination, at: &N, body: F) -> Result<Vec<Node>, CompileError>
    where
        N: SyntaxNode,
        F: FnOnce(&mut Self) -> Result<(), CompileError>,
    {
        let depth = self.destinations.depth();
        self.destinations.push(kind);
        body(self)?;
        let nodes = self.close(kind, at)?;
        if self.destinations.depth() != depth {
            return Err(structure(at, "destination depth not restored"));
        }
        Ok(nodes)
    }

    fn close<N: SyntaxNode>(&mut self, kind: Destination, at: &N) -> Result<Vec<Node>, CompileError> {
        self.destinations
            .pop(kind)
            .map_err(|e| structure(at, e.to_string()))
    }

    // ========================================================================
    // Evaluation mode
    // ========================================================================

    pub(crate) fn mode(&self) -> EvalMode {
        self.modes.last().copied().unwrap_or(EvalMode::RValue)
    }

    /// Runs `f` with `mode` on top of the mode stack.
    pub(crate) fn with_mode<R>(
        &mut self,
        mode: EvalMode,
        f: impl FnOnce(&mut Self) -> Result<R, CompileError>,
    ) -> Result<R, CompileError> {
        self.modes.push(mode);
        let result = f(self);
        self.modes.pop();
        result
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Shape helpers
// ============================================================================

fn rule_name<N: SyntaxNode>(node: &N) -> &'static str {
    node.rule().map_or("token", Rule::name)
}

pub(crate) fn unsupported<N: SyntaxNode>(node: &N, detail: impl Into<String>) -> CompileError {
    CompileError::UnsupportedShape {
        rule: rule_name(node),
        children: node.child_count(),
        detail: detail.into(),
        span: node.span(),
    }
}

pub(crate) fn structure<N: SyntaxNode>(node: &N, message: impl Into<String>) -> CompileError {
    CompileError::Structure {
        rule: rule_name(node),
        message: message.into(),
        span: node.span(),
    }
}

/// The child at `index`, which the rule's shape guarantees exists.
pub(crate) fn child<N: SyntaxNode>(node: &N, index: usize) -> Result<&N, CompileError> {
    node.child(index)
        .ok_or_else(|| structure(node, format!("missing child {}", index)))
}

pub(crate) fn single_child<N: SyntaxNode>(node: &N) -> Result<&N, CompileError> {
    if node.child_count() != 1 {
        return Err(unsupported(node, "expected exactly one child"));
    }
    child(node, 0)
}

/// The child at `index`, which must be a node of `rule`.
pub(crate) fn child_rule<N: SyntaxNode>(node: &N, index: usize, rule: Rule) -> Result<&N, CompileError> {
    let found = child(node, index)?;
    if found.rule() != Some(rule) {
        return Err(structure(
            found,
            format!("expected {} at position {} of {}", rule, index, rule_name(node)),
        ));
    }
    Ok(found)
}

/// Checks that the child at `index` is the terminal `text`.
pub(crate) fn expect_text<N: SyntaxNode>(node: &N, index: usize, text: &str) -> Result<(), CompileError> {
    let found = child(node, index)?;
    if !found.is_terminal() || found.text() != text {
        return Err(structure(
            found,
            format!("expected `{}`, found `{}`", text, found.text()),
        ));
    }
    Ok(())
}

/// Whether the child at `index` is the terminal `text`.
pub(crate) fn is_text<N: SyntaxNode>(node: &N, index: usize, text: &str) -> bool {
    node.child(index)
        .is_some_and(|c| c.is_terminal() && c.text() == text)
}

/// The name held by an `identifier` node.
pub(crate) fn identifier_name<N: SyntaxNode>(node: &N) -> Result<String, CompileError> {
    if node.rule() != Some(Rule::Identifier) {
        return Err(structure(node, "expected an identifier"));
    }
    let token = single_child(node)?;
    if !token.is_terminal() {
        return Err(structure(token, "identifier must wrap a single token"));
    }
    Ok(token.text().into_owned())
}

/// The name held by an `assignable` node (only identifiers are bindable).
pub(crate) fn assignable_name<N: SyntaxNode>(node: &N) -> Result<String, CompileError> {
    if node.rule() != Some(Rule::Assignable) {
        return Err(structure(node, "expected an assignable"));
    }
    let inner = single_child(node)?;
    if inner.rule() != Some(Rule::Identifier) {
        return Err(unsupported(node, "destructuring targets are not supported"));
    }
    identifier_name(inner)
}
