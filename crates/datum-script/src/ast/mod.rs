//! Operation-node definitions.
//!
//! The compiler lowers a concrete syntax tree into these nodes. Each node is
//! an executable instruction: the interpreter evaluates a [`Program`] by
//! walking its body in order. Nodes own their children exclusively; function
//! templates are shared behind an [`Arc`] so that closures created at runtime
//! can hold on to them without copying the body.

use std::fmt;
use std::sync::Arc;

/// A compiled program: the ordered top-level instructions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    /// The instructions in the program
    pub body: Vec<Node>,
}

/// How a `SetVariable` resolves its target binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionPolicy {
    /// The binding must already exist in the scope chain.
    MustExist,
    /// The binding must not exist yet in the current scope (declarations).
    CannotExist,
    /// Creates the binding if missing, otherwise updates it.
    Unconstrained,
}

/// A constant value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Boolean literal
    Bool(bool),
    /// 32-bit integer literal
    Int(i32),
    /// Integer literal too wide for 32 bits
    Long(i64),
    /// Single precision literal
    Float(f32),
    /// Double precision literal
    Double(f64),
    /// String literal (raw text between the quotes)
    String(String),
    /// null literal
    Null,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    // Comparison
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    // Logical
    And,
    Or,
    // Bitwise
    BitOr,
    BitAnd,
    BitXor,
}

impl BinaryOperator {
    /// Looks up an operator by its source spelling.
    pub fn from_operator(text: &str) -> Option<Self> {
        let op = match text {
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Sub,
            "*" => BinaryOperator::Mul,
            "/" => BinaryOperator::Div,
            "%" => BinaryOperator::Mod,
            "**" => BinaryOperator::Pow,
            "==" => BinaryOperator::Eq,
            "!=" => BinaryOperator::NotEq,
            "<" => BinaryOperator::Lt,
            ">" => BinaryOperator::Gt,
            "<=" => BinaryOperator::LtEq,
            ">=" => BinaryOperator::GtEq,
            "&&" => BinaryOperator::And,
            "||" => BinaryOperator::Or,
            "|" => BinaryOperator::BitOr,
            "&" => BinaryOperator::BitAnd,
            "^" => BinaryOperator::BitXor,
            _ => return None,
        };
        Some(op)
    }

    /// Looks up the arithmetic operator behind a compound assignment
    /// spelling such as `+=`.
    pub fn from_compound(text: &str) -> Option<Self> {
        let op = match text {
            "+=" => BinaryOperator::Add,
            "-=" => BinaryOperator::Sub,
            "*=" => BinaryOperator::Mul,
            "/=" => BinaryOperator::Div,
            "%=" => BinaryOperator::Mod,
            "**=" => BinaryOperator::Pow,
            _ => return None,
        };
        Some(op)
    }

    /// The source spelling of this operator.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Pow => "**",
            BinaryOperator::Eq => "==",
            BinaryOperator::NotEq => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Gt => ">",
            BinaryOperator::LtEq => "<=",
            BinaryOperator::GtEq => ">=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::BitXor => "^",
        }
    }
}

/// Prefix unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    /// -x
    Negate,
    /// +x
    Plus,
    /// !x
    Not,
    /// ~x
    BitNot,
}

impl UnaryOperator {
    /// Looks up an operator by its source spelling.
    pub fn from_operator(text: &str) -> Option<Self> {
        match text {
            "-" => Some(UnaryOperator::Negate),
            "+" => Some(UnaryOperator::Plus),
            "!" => Some(UnaryOperator::Not),
            "~" => Some(UnaryOperator::BitNot),
            _ => None,
        }
    }
}

/// A function template produced by a function declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    /// Declared name
    pub name: String,
    /// Parameter names in order
    pub params: Vec<String>,
    /// Compiled body
    pub body: Vec<Node>,
}

/// An executable operation node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Constant value
    Literal(Literal),
    /// Read a binding from the enclosing scope chain
    GetVariable {
        /// Variable name
        name: String,
    },
    /// Bind or assign a name
    SetVariable {
        /// Variable name
        name: String,
        /// Value to store
        value: Box<Node>,
        /// How the binding is resolved
        policy: ResolutionPolicy,
        /// Whether this binds in the current scope (`var`, `function`)
        declaration: bool,
    },
    /// Read a named member
    GetMember {
        /// Object expression
        object: Box<Node>,
        /// Member name
        member: String,
    },
    /// Write a named member
    SetMember {
        /// Object expression
        object: Box<Node>,
        /// Member name
        member: String,
        /// Value to store
        value: Box<Node>,
    },
    /// Indexed read
    GetIndex {
        /// Object expression
        object: Box<Node>,
        /// Index expression
        index: Box<Node>,
    },
    /// Indexed write
    SetIndex {
        /// Object expression
        object: Box<Node>,
        /// Index expression
        index: Box<Node>,
        /// Value to store
        value: Box<Node>,
    },
    /// Invocation
    Call {
        /// Callee expression
        callee: Box<Node>,
        /// Arguments, evaluated left to right
        arguments: Vec<Node>,
    },
    /// Array literal
    CreateList {
        /// Elements in order
        elements: Vec<Node>,
    },
    /// Binary operation
    Binary {
        /// Operator
        operator: BinaryOperator,
        /// Left operand
        left: Box<Node>,
        /// Right operand
        right: Box<Node>,
    },
    /// Prefix unary operation
    Unary {
        /// Operator
        operator: UnaryOperator,
        /// Operand
        operand: Box<Node>,
    },
    /// Evaluate, save the value on the value stack, yield it
    StackPush(Box<Node>),
    /// Evaluate, then restore and yield the most recently saved value
    StackPop(Box<Node>),
    /// Leave the current function (or program) with a value
    Return(Box<Node>),
    /// Function template
    FunctionDefinition(Arc<FunctionDefinition>),
    /// Conditional
    If {
        /// Condition expression
        condition: Box<Node>,
        /// Instructions run when the condition is truthy
        then_branch: Vec<Node>,
        /// Instructions run otherwise
        else_branch: Option<Vec<Node>>,
    },
    /// Nested instruction list
    ScopeBlock(Vec<Node>),
}

impl Node {
    /// Shorthand for a variable read.
    pub fn get_variable(name: impl Into<String>) -> Self {
        Node::GetVariable { name: name.into() }
    }

    /// Shorthand for an `Int` literal.
    pub fn int(value: i32) -> Self {
        Node::Literal(Literal::Int(value))
    }

    /// Shorthand for a binary node.
    pub fn binary(operator: BinaryOperator, left: Node, right: Node) -> Self {
        Node::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Counts this node and all nodes below it.
    pub fn count(&self) -> usize {
        1 + match self {
            Node::Literal(_) | Node::GetVariable { .. } => 0,
            Node::SetVariable { value, .. } => value.count(),
            Node::GetMember { object, .. } => object.count(),
            Node::SetMember { object, value, .. } => object.count() + value.count(),
            Node::GetIndex { object, index } => object.count() + index.count(),
            Node::SetIndex {
                object,
                index,
                value,
            } => object.count() + index.count() + value.count(),
            Node::Call { callee, arguments } => callee.count() + count_all(arguments),
            Node::CreateList { elements } => count_all(elements),
            Node::Binary { left, right, .. } => left.count() + right.count(),
            Node::Unary { operand, .. } => operand.count(),
            Node::StackPush(inner) | Node::StackPop(inner) | Node::Return(inner) => inner.count(),
            Node::FunctionDefinition(def) => count_all(&def.body),
            Node::If {
                condition,
                then_branch,
                else_branch,
            } => {
                condition.count()
                    + count_all(then_branch)
                    + else_branch.as_deref().map_or(0, count_all)
            }
            Node::ScopeBlock(body) => count_all(body),
        }
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        match self {
            Node::Literal(literal) => writeln!(f, "{pad}Literal {:?}", literal),
            Node::GetVariable { name } => writeln!(f, "{pad}GetVariable {name}"),
            Node::SetVariable {
                name,
                value,
                policy,
                declaration,
            } => {
                let decl = if *declaration { ", declaration" } else { "" };
                writeln!(f, "{pad}SetVariable {name} ({:?}{decl})", policy)?;
                value.write_tree(f, depth + 1)
            }
            Node::GetMember { object, member } => {
                writeln!(f, "{pad}GetMember .{member}")?;
                object.write_tree(f, depth + 1)
            }
            Node::SetMember {
                object,
                member,
                value,
            } => {
                writeln!(f, "{pad}SetMember .{member}")?;
                object.write_tree(f, depth + 1)?;
                value.write_tree(f, depth + 1)
            }
            Node::GetIndex { object, index } => {
                writeln!(f, "{pad}GetIndex")?;
                object.write_tree(f, depth + 1)?;
                index.write_tree(f, depth + 1)
            }
            Node::SetIndex {
                object,
                index,
                value,
            } => {
                writeln!(f, "{pad}SetIndex")?;
                object.write_tree(f, depth + 1)?;
                index.write_tree(f, depth + 1)?;
                value.write_tree(f, depth + 1)
            }
            Node::Call { callee, arguments } => {
                writeln!(f, "{pad}Call ({} args)", arguments.len())?;
                callee.write_tree(f, depth + 1)?;
                write_all(f, arguments, depth + 1)
            }
            Node::CreateList { elements } => {
                writeln!(f, "{pad}CreateList ({} elements)", elements.len())?;
                write_all(f, elements, depth + 1)
            }
            Node::Binary {
                operator,
                left,
                right,
            } => {
                writeln!(f, "{pad}Binary {:?} ({})", operator, operator.symbol())?;
                left.write_tree(f, depth + 1)?;
                right.write_tree(f, depth + 1)
            }
            Node::Unary { operator, operand } => {
                writeln!(f, "{pad}Unary {:?}", operator)?;
                operand.write_tree(f, depth + 1)
            }
            Node::StackPush(inner) => {
                writeln!(f, "{pad}StackPush")?;
                inner.write_tree(f, depth + 1)
            }
            Node::StackPop(inner) => {
                writeln!(f, "{pad}StackPop")?;
                inner.write_tree(f, depth + 1)
            }
            Node::Return(inner) => {
                writeln!(f, "{pad}Return")?;
                inner.write_tree(f, depth + 1)
            }
            Node::FunctionDefinition(def) => {
                writeln!(f, "{pad}FunctionDefinition {}({})", def.name, def.params.join(", "))?;
                write_all(f, &def.body, depth + 1)
            }
            Node::If {
                condition,
                then_branch,
                else_branch,
            } => {
                writeln!(f, "{pad}If")?;
                condition.write_tree(f, depth + 1)?;
                writeln!(f, "{pad}Then")?;
                write_all(f, then_branch, depth + 1)?;
                if let Some(else_branch) = else_branch {
                    writeln!(f, "{pad}Else")?;
                    write_all(f, else_branch, depth + 1)?;
                }
                Ok(())
            }
            Node::ScopeBlock(body) => {
                writeln!(f, "{pad}ScopeBlock")?;
                write_all(f, body, depth + 1)
            }
        }
    }
}

fn count_all(nodes: &[Node]) -> usize {
    nodes.iter().map(Node::count).sum()
}

fn write_all(f: &mut fmt::Formatter<'_>, nodes: &[Node], depth: usize) -> fmt::Result {
    nodes.iter().try_for_each(|node| node.write_tree(f, depth))
}

/// Indented tree, one node per line.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Program")?;
        write_all(f, &self.body, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_table() {
        assert_eq!(BinaryOperator::from_operator("^"), Some(BinaryOperator::BitXor));
        assert_eq!(BinaryOperator::from_operator("&"), Some(BinaryOperator::BitAnd));
        assert_eq!(BinaryOperator::from_operator("==="), None);
        assert_eq!(BinaryOperator::from_operator("<<"), None);
        assert_eq!(BinaryOperator::from_compound("**="), Some(BinaryOperator::Pow));
        assert_eq!(BinaryOperator::from_compound("<<="), None);
    }

    #[test]
    fn test_symbols_round_trip() {
        for text in [
            "+", "-", "*", "/", "%", "**", "==", "!=", "<", ">", "<=", ">=", "&&", "||", "|", "&",
            "^",
        ] {
            let op = BinaryOperator::from_operator(text).unwrap();
            assert_eq!(op.symbol(), text);
        }
    }

    #[test]
    fn test_node_count() {
        let node = Node::binary(BinaryOperator::Add, Node::int(1), Node::get_variable("x"));
        assert_eq!(node.count(), 3);
    }

    #[test]
    fn test_program_display() {
        let program = Program {
            body: vec![Node::SetVariable {
                name: "x".into(),
                value: Box::new(Node::int(5)),
                policy: ResolutionPolicy::CannotExist,
                declaration: true,
            }],
        };
        assert_eq!(
            program.to_string(),
            "Program\n  SetVariable x (CannotExist, declaration)\n    Literal Int(5)\n"
        );
    }
}
