//! Assignment targets and the operators that write through them.
//!
//! ```text
//! a = v        Set(a, v)                                           Unconstrained
//! a += v       Set(a, Binary(Add, Get(a), v))                      MustExist
//! ++a          Set(a, Binary(Add, Get(a), 1))                      MustExist
//! a++          StackPop(Set(a, Binary(Add, StackPush(Get(a)), 1)))  MustExist
//! ```
//!
//! The postfix form saves the old value with `StackPush` while computing the
//! new one, and `StackPop` restores it as the expression result. Member and
//! index targets evaluate their object (and index) expressions once per
//! occurrence in the expansion.

use super::{
    Compiler, EvalMode, child, child_rule, identifier_name, is_text, structure, unsupported,
};
use crate::ast::{BinaryOperator, Node, ResolutionPolicy};
use crate::compiler::CompileError;
use crate::cst::{Rule, SyntaxNode};

/// A resolved assignment target.
#[derive(Debug, Clone)]
enum Target {
    Variable(String),
    Member { object: Node, member: String },
    Index { object: Node, index: Node },
}

impl Target {
    /// The read of the current value.
    fn get(&self) -> Node {
        match self {
            Target::Variable(name) => Node::get_variable(name.clone()),
            Target::Member { object, member } => Node::GetMember {
                object: Box::new(object.clone()),
                member: member.clone(),
            },
            Target::Index { object, index } => Node::GetIndex {
                object: Box::new(object.clone()),
                index: Box::new(index.clone()),
            },
        }
    }

    /// The write of `value`. Only variables carry a resolution policy.
    fn set(self, value: Node, policy: ResolutionPolicy) -> Node {
        match self {
            Target::Variable(name) => Node::SetVariable {
                name,
                value: Box::new(value),
                policy,
                declaration: false,
            },
            Target::Member { object, member } => Node::SetMember {
                object: Box::new(object),
                member,
                value: Box::new(value),
            },
            Target::Index { object, index } => Node::SetIndex {
                object: Box::new(object),
                index: Box::new(index),
                value: Box::new(value),
            },
        }
    }
}

impl Compiler {
    /// `target '=' value`
    pub(super) fn assignment<N: SyntaxNode>(&mut self, target: &N, value: &N) -> Result<Node, CompileError> {
        let target = self.resolve_target(target)?;
        let value = self.expression(value)?;
        Ok(target.set(value, ResolutionPolicy::Unconstrained))
    }

    /// `target assignmentOperator value`
    pub(super) fn compound_assignment<N: SyntaxNode>(
        &mut self,
        target: &N,
        op: &N,
        value: &N,
    ) -> Result<Node, CompileError> {
        let text = op.text();
        let operator = BinaryOperator::from_compound(&text)
            .ok_or_else(|| unsupported(op, format!("compound assignment `{}`", text)))?;
        let target = self.resolve_target(target)?;
        let value = self.expression(value)?;
        let combined = Node::binary(operator, target.get(), value);
        Ok(target.set(combined, ResolutionPolicy::MustExist))
    }

    /// `++target` / `--target`
    pub(super) fn pre_update<N: SyntaxNode>(
        &mut self,
        target: &N,
        operator: BinaryOperator,
    ) -> Result<Node, CompileError> {
        let target = self.resolve_target(target)?;
        let updated = Node::binary(operator, target.get(), Node::int(1));
        Ok(target.set(updated, ResolutionPolicy::MustExist))
    }

    /// `target++` / `target--`
    pub(super) fn post_update<N: SyntaxNode>(
        &mut self,
        target: &N,
        operator: BinaryOperator,
    ) -> Result<Node, CompileError> {
        let target = self.resolve_target(target)?;
        let saved = Node::StackPush(Box::new(target.get()));
        let updated = Node::binary(operator, saved, Node::int(1));
        Ok(Node::StackPop(Box::new(
            target.set(updated, ResolutionPolicy::MustExist),
        )))
    }

    /// Resolves the shape of an assignment target in lvalue mode.
    fn resolve_target<N: SyntaxNode>(&mut self, node: &N) -> Result<Target, CompileError> {
        self.with_mode(EvalMode::LValue, |c| c.target_shape(node))
    }

    fn target_shape<N: SyntaxNode>(&mut self, node: &N) -> Result<Target, CompileError> {
        if self.mode() != EvalMode::LValue {
            return Err(structure(node, "assignment target resolved outside lvalue mode"));
        }
        if node.rule() != Some(Rule::SingleExpression) {
            return Err(unsupported(node, "invalid assignment target"));
        }

        match node.child_count() {
            1 => {
                let inner = child(node, 0)?;
                if inner.rule() != Some(Rule::Identifier) {
                    return Err(unsupported(
                        node,
                        format!("invalid assignment target `{}`", node.text()),
                    ));
                }
                Ok(Target::Variable(identifier_name(inner)?))
            }
            3 if is_text(node, 1, ".") => {
                let object = self.object_expression(child(node, 0)?)?;
                let name = child_rule(node, 2, Rule::IdentifierName)?;
                let member = match name.child(0) {
                    Some(inner) if inner.rule() == Some(Rule::Identifier) => identifier_name(inner)?,
                    _ => name.text().into_owned(),
                };
                Ok(Target::Member { object, member })
            }
            4 if is_text(node, 1, "[") && is_text(node, 3, "]") => {
                let object = self.object_expression(child(node, 0)?)?;
                let index = self.object_expression(child_rule(node, 2, Rule::ExpressionSequence)?)?;
                Ok(Target::Index { object, index })
            }
            _ => Err(unsupported(
                node,
                format!("invalid assignment target `{}`", node.text()),
            )),
        }
    }

    /// Sub-expressions of a target are ordinary values.
    fn object_expression<N: SyntaxNode>(&mut self, node: &N) -> Result<Node, CompileError> {
        self.with_mode(EvalMode::RValue, |c| c.expression(node))
    }
}
