//! Insertion destinations for compiled statements.

use std::fmt;

use thiserror::Error;

use crate::ast::Node;

/// The kind of container statements are currently appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Top-level program body
    Program,
    /// Function body
    Function,
    /// Nested block or conditional branch
    Block,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Program => f.write_str("program"),
            Destination::Function => f.write_str("function body"),
            Destination::Block => f.write_str("block"),
        }
    }
}

/// Misuse of the destination stack.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DestinationError {
    /// Append or pop with nothing on the stack.
    #[error("no open destination")]
    Empty,
    /// Pop of a different kind than the one on top.
    #[error("expected to close {expected}, but {found} is open")]
    Mismatch {
        /// Kind the caller tried to close
        expected: Destination,
        /// Kind actually on top
        found: Destination,
    },
}

/// A stack of statement sinks.
///
/// Compiling a statement appends its node to the innermost open sink.
/// Function bodies and blocks open their own sink and close it again when
/// done, so body statements never leak into the enclosing container.
#[derive(Debug, Default)]
pub struct DestinationStack {
    frames: Vec<(Destination, Vec<Node>)>,
}

impl DestinationStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Opens a new sink.
    pub fn push(&mut self, kind: Destination) {
        self.frames.push((kind, Vec::new()));
    }

    /// Appends a node to the innermost sink.
    pub fn append(&mut self, node: Node) -> Result<(), DestinationError> {
        let (_, nodes) = self.frames.last_mut().ok_or(DestinationError::Empty)?;
        nodes.push(node);
        Ok(())
    }

    /// Closes the innermost sink, which must be of kind `expected`, and
    /// returns what was appended to it.
    pub fn pop(&mut self, expected: Destination) -> Result<Vec<Node>, DestinationError> {
        match self.frames.last() {
            None => Err(DestinationError::Empty),
            Some((found, _)) if *found != expected => Err(DestinationError::Mismatch {
                expected,
                found: *found,
            }),
            Some(_) => Ok(self.frames.pop().map(|(_, nodes)| nodes).unwrap_or_default()),
        }
    }

    /// Number of open sinks.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Kind of the innermost sink.
    pub fn current(&self) -> Option<Destination> {
        self.frames.last().map(|(kind, _)| *kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_new() {
        let stack = DestinationStack::new();
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.current(), None);
    }

    #[test]
    fn test_push_append_pop() {
        let mut stack = DestinationStack::new();
        stack.push(Destination::Program);
        stack.append(Node::int(1)).unwrap();
        stack.push(Destination::Function);
        stack.append(Node::int(2)).unwrap();
        assert_eq!(stack.depth(), 2);

        assert_eq!(stack.pop(Destination::Function).unwrap(), vec![Node::int(2)]);
        assert_eq!(stack.pop(Destination::Program).unwrap(), vec![Node::int(1)]);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_pop_mismatch() {
        let mut stack = DestinationStack::new();
        stack.push(Destination::Block);
        let err = stack.pop(Destination::Function).unwrap_err();
        assert_eq!(
            err,
            DestinationError::Mismatch {
                expected: Destination::Function,
                found: Destination::Block,
            }
        );
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_empty_errors() {
        let mut stack = DestinationStack::new();
        assert_eq!(stack.append(Node::int(1)), Err(DestinationError::Empty));
        assert_eq!(stack.pop(Destination::Program), Err(DestinationError::Empty));
    }
}
