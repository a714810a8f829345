//! The main parser implementation.

use crate::Error;
use crate::cst::{CstNode, Rule, TokenType};
use crate::lexer::{Scanner, Span, Token, TokenKind};

/// A recursive descent parser that builds a concrete syntax tree.
///
/// Binary operators are left-nested `singleExpression` nodes of three
/// children; precedence is encoded purely by nesting depth.
pub struct Parser<'a> {
    source: &'a str,
    scanner: Scanner<'a>,
    current: Token,
    previous: Token,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given source code.
    pub fn new(source: &'a str) -> Self {
        let mut scanner = Scanner::new(source);
        let current = scanner.next_token();
        Self {
            source,
            scanner,
            current,
            previous: Token::new(TokenKind::Eof, Span::new(0, 0), false),
        }
    }

    /// Parses the source code into a `program` node: `sourceElements EOF`.
    pub fn parse_program(&mut self) -> Result<CstNode, Error> {
        let elements = self.parse_source_elements()?;
        if !self.is_at_end() {
            return Err(self.unexpected());
        }
        let eof = self.bump();
        Ok(CstNode::node(Rule::Program, vec![elements, eof], 0))
    }

    fn parse_source_elements(&mut self) -> Result<CstNode, Error> {
        let at = self.current.span.start;
        let mut elements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            let statement = self.parse_statement()?;
            elements.push(CstNode::node(Rule::SourceElement, vec![statement], at));
        }
        Ok(CstNode::node(Rule::SourceElements, elements, at))
    }

    /// Parses a single `statement` node wrapping exactly one statement kind.
    pub fn parse_statement(&mut self) -> Result<CstNode, Error> {
        let at = self.current.span.start;
        let inner = match self.current.kind {
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                self.parse_variable_statement()?
            }
            TokenKind::Function => self.parse_function_declaration()?,
            TokenKind::If => self.parse_if_statement()?,
            TokenKind::While => self.parse_while_statement()?,
            TokenKind::Return => self.parse_return_statement()?,
            TokenKind::LeftBrace => self.parse_block()?,
            TokenKind::Semicolon => {
                let semi = self.bump();
                CstNode::node(Rule::EmptyStatement, vec![semi], at)
            }
            _ => self.parse_expression_statement()?,
        };
        Ok(CstNode::node(Rule::Statement, vec![inner], at))
    }

    fn parse_variable_statement(&mut self) -> Result<CstNode, Error> {
        let at = self.current.span.start;
        let modifier = self.bump();
        let mut list = vec![CstNode::node(Rule::VarModifier, vec![modifier], at)];

        loop {
            list.push(self.parse_variable_declaration()?);
            if !self.check(TokenKind::Comma) {
                break;
            }
            list.push(self.bump());
        }

        let list = CstNode::node(Rule::VariableDeclarationList, list, at);
        let eos = self.parse_eos()?;
        Ok(CstNode::node(Rule::VariableStatement, vec![list, eos], at))
    }

    fn parse_variable_declaration(&mut self) -> Result<CstNode, Error> {
        let at = self.current.span.start;
        let mut children = vec![self.parse_assignable()?];
        if self.check(TokenKind::Equal) {
            children.push(self.bump());
            children.push(self.parse_assignment()?);
        }
        Ok(CstNode::node(Rule::VariableDeclaration, children, at))
    }

    fn parse_assignable(&mut self) -> Result<CstNode, Error> {
        let at = self.current.span.start;
        let id = self.parse_identifier()?;
        Ok(CstNode::node(Rule::Assignable, vec![id], at))
    }

    fn parse_function_declaration(&mut self) -> Result<CstNode, Error> {
        let at = self.current.span.start;
        let mut children = vec![self.bump()]; // 'function'
        children.push(self.parse_identifier()?);
        children.push(self.expect(TokenKind::LeftParen)?);

        if !self.check(TokenKind::RightParen) {
            let list_at = self.current.span.start;
            let mut params = Vec::new();
            loop {
                let arg_at = self.current.span.start;
                let assignable = self.parse_assignable()?;
                params.push(CstNode::node(Rule::FormalParameterArg, vec![assignable], arg_at));
                if !self.check(TokenKind::Comma) {
                    break;
                }
                params.push(self.bump());
            }
            children.push(CstNode::node(Rule::FormalParameterList, params, list_at));
        }

        children.push(self.expect(TokenKind::RightParen)?);
        children.push(self.parse_function_body()?);
        Ok(CstNode::node(Rule::FunctionDeclaration, children, at))
    }

    fn parse_function_body(&mut self) -> Result<CstNode, Error> {
        let at = self.current.span.start;
        let open = self.expect(TokenKind::LeftBrace)?;
        let elements = self.parse_source_elements()?;
        let close = self.expect(TokenKind::RightBrace)?;
        Ok(CstNode::node(Rule::FunctionBody, vec![open, elements, close], at))
    }

    fn parse_block(&mut self) -> Result<CstNode, Error> {
        let at = self.current.span.start;
        let open = self.expect(TokenKind::LeftBrace)?;
        let list_at = self.current.span.start;
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }
        let list = CstNode::node(Rule::StatementList, statements, list_at);
        let close = self.expect(TokenKind::RightBrace)?;
        Ok(CstNode::node(Rule::Block, vec![open, list, close], at))
    }

    fn parse_if_statement(&mut self) -> Result<CstNode, Error> {
        let at = self.current.span.start;
        let mut children = vec![self.bump()]; // 'if'
        children.push(self.expect(TokenKind::LeftParen)?);
        children.push(self.parse_expression_sequence()?);
        children.push(self.expect(TokenKind::RightParen)?);
        children.push(self.parse_statement()?);
        if self.check(TokenKind::Else) {
            children.push(self.bump());
            children.push(self.parse_statement()?);
        }
        Ok(CstNode::node(Rule::IfStatement, children, at))
    }

    fn parse_while_statement(&mut self) -> Result<CstNode, Error> {
        let at = self.current.span.start;
        let mut children = vec![self.bump()]; // 'while'
        children.push(self.expect(TokenKind::LeftParen)?);
        children.push(self.parse_expression_sequence()?);
        children.push(self.expect(TokenKind::RightParen)?);
        children.push(self.parse_statement()?);
        Ok(CstNode::node(Rule::IterationStatement, children, at))
    }

    fn parse_return_statement(&mut self) -> Result<CstNode, Error> {
        let at = self.current.span.start;
        let mut children = vec![self.bump()]; // 'return'

        // No line terminator is allowed between `return` and its value
        if !self.check(TokenKind::Semicolon)
            && !self.check(TokenKind::RightBrace)
            && !self.is_at_end()
            && !self.current.newline_before
        {
            children.push(self.parse_expression_sequence()?);
        }

        children.push(self.parse_eos()?);
        Ok(CstNode::node(Rule::ReturnStatement, children, at))
    }

    fn parse_expression_statement(&mut self) -> Result<CstNode, Error> {
        let at = self.current.span.start;
        let expression = self.parse_expression_sequence()?;
        let eos = self.parse_eos()?;
        Ok(CstNode::node(Rule::ExpressionStatement, vec![expression, eos], at))
    }

    /// `';'`, or nothing before `}`, end of input or a line break.
    fn parse_eos(&mut self) -> Result<CstNode, Error> {
        let at = self.previous.span.end;
        if self.check(TokenKind::Semicolon) {
            let semi = self.bump();
            return Ok(CstNode::node(Rule::Eos, vec![semi], at));
        }
        if self.check(TokenKind::RightBrace) || self.is_at_end() || self.current.newline_before {
            return Ok(CstNode::node(Rule::Eos, Vec::new(), at));
        }
        Err(self.error(format!("Expected ';', found {}", self.describe_current())))
    }

    // ==================== Expressions ====================

    /// Parses an `expressionSequence`: comma-separated single expressions.
    pub fn parse_expression_sequence(&mut self) -> Result<CstNode, Error> {
        let at = self.current.span.start;
        let mut children = vec![self.parse_assignment()?];
        while self.check(TokenKind::Comma) {
            children.push(self.bump());
            children.push(self.parse_assignment()?);
        }
        Ok(CstNode::node(Rule::ExpressionSequence, children, at))
    }

    fn parse_assignment(&mut self) -> Result<CstNode, Error> {
        let target = self.parse_logical_or()?;

        if self.check(TokenKind::Equal) {
            let op = self.bump();
            let value = self.parse_assignment()?;
            return Ok(expression(vec![target, op, value]));
        }

        if self.current.kind.is_assignment() {
            let op_at = self.current.span.start;
            let op = self.bump();
            let op = CstNode::node(Rule::AssignmentOperator, vec![op], op_at);
            let value = self.parse_assignment()?;
            return Ok(expression(vec![target, op, value]));
        }

        Ok(target)
    }

    fn parse_logical_or(&mut self) -> Result<CstNode, Error> {
        self.parse_binary(&[TokenKind::PipePipe], Self::parse_logical_and)
    }

    fn parse_logical_and(&mut self) -> Result<CstNode, Error> {
        self.parse_binary(&[TokenKind::AmpersandAmpersand], Self::parse_bitwise_or)
    }

    fn parse_bitwise_or(&mut self) -> Result<CstNode, Error> {
        self.parse_binary(&[TokenKind::Pipe], Self::parse_bitwise_xor)
    }

    fn parse_bitwise_xor(&mut self) -> Result<CstNode, Error> {
        self.parse_binary(&[TokenKind::Caret], Self::parse_bitwise_and)
    }

    fn parse_bitwise_and(&mut self) -> Result<CstNode, Error> {
        self.parse_binary(&[TokenKind::Ampersand], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> Result<CstNode, Error> {
        self.parse_binary(
            &[
                TokenKind::EqualEqual,
                TokenKind::NotEqual,
                TokenKind::StrictEqual,
                TokenKind::StrictNotEqual,
            ],
            Self::parse_comparison,
        )
    }

    fn parse_comparison(&mut self) -> Result<CstNode, Error> {
        self.parse_binary(
            &[
                TokenKind::LessThan,
                TokenKind::GreaterThan,
                TokenKind::LessThanEqual,
                TokenKind::GreaterThanEqual,
            ],
            Self::parse_shift,
        )
    }

    fn parse_shift(&mut self) -> Result<CstNode, Error> {
        self.parse_binary(
            &[
                TokenKind::LeftShift,
                TokenKind::RightShift,
                TokenKind::UnsignedRightShift,
            ],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> Result<CstNode, Error> {
        self.parse_binary(&[TokenKind::Plus, TokenKind::Minus], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> Result<CstNode, Error> {
        self.parse_binary(
            &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
            Self::parse_exponent,
        )
    }

    /// Left-associative binary level.
    fn parse_binary(
        &mut self,
        operators: &[TokenKind],
        next: fn(&mut Self) -> Result<CstNode, Error>,
    ) -> Result<CstNode, Error> {
        let mut left = next(self)?;
        while operators.contains(&self.current.kind) {
            let op = self.bump();
            let right = next(self)?;
            left = expression(vec![left, op, right]);
        }
        Ok(left)
    }

    fn parse_exponent(&mut self) -> Result<CstNode, Error> {
        let base = self.parse_unary()?;
        if self.check(TokenKind::StarStar) {
            let op = self.bump();
            let exponent = self.parse_exponent()?;
            return Ok(expression(vec![base, op, exponent]));
        }
        Ok(base)
    }

    fn parse_unary(&mut self) -> Result<CstNode, Error> {
        match self.current.kind {
            TokenKind::PlusPlus
            | TokenKind::MinusMinus
            | TokenKind::Minus
            | TokenKind::Plus
            | TokenKind::Bang
            | TokenKind::Tilde => {
                let op = self.bump();
                let operand = self.parse_unary()?;
                Ok(expression(vec![op, operand]))
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<CstNode, Error> {
        let operand = self.parse_call()?;
        if matches!(self.current.kind, TokenKind::PlusPlus | TokenKind::MinusMinus)
            && !self.current.newline_before
        {
            let op = self.bump();
            return Ok(expression(vec![operand, op]));
        }
        Ok(operand)
    }

    fn parse_call(&mut self) -> Result<CstNode, Error> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.current.kind {
                TokenKind::Dot => {
                    let dot = self.bump();
                    let name = self.parse_identifier_name()?;
                    expr = expression(vec![expr, dot, name]);
                }
                TokenKind::LeftBracket => {
                    let open = self.bump();
                    let index = self.parse_expression_sequence()?;
                    let close = self.expect(TokenKind::RightBracket)?;
                    expr = expression(vec![expr, open, index, close]);
                }
                TokenKind::LeftParen => {
                    let args = self.parse_arguments()?;
                    expr = expression(vec![expr, args]);
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_arguments(&mut self) -> Result<CstNode, Error> {
        let at = self.current.span.start;
        let mut children = vec![self.expect(TokenKind::LeftParen)?];

        if !self.check(TokenKind::RightParen) {
            loop {
                let arg_at = self.current.span.start;
                let value = self.parse_assignment()?;
                children.push(CstNode::node(Rule::Argument, vec![value], arg_at));
                if !self.check(TokenKind::Comma) {
                    break;
                }
                children.push(self.bump());
            }
        }

        children.push(self.expect(TokenKind::RightParen)?);
        Ok(CstNode::node(Rule::Arguments, children, at))
    }

    fn parse_primary(&mut self) -> Result<CstNode, Error> {
        let at = self.current.span.start;
        match self.current.kind {
            TokenKind::Identifier => {
                let id = self.parse_identifier()?;
                Ok(expression(vec![id]))
            }
            TokenKind::Number
            | TokenKind::HexNumber
            | TokenKind::OctalNumber
            | TokenKind::BinaryNumber => {
                let token = self.bump();
                let numeric = CstNode::node(Rule::NumericLiteral, vec![token], at);
                let literal = CstNode::node(Rule::Literal, vec![numeric], at);
                Ok(expression(vec![literal]))
            }
            TokenKind::String | TokenKind::True | TokenKind::False | TokenKind::Null => {
                let token = self.bump();
                let literal = CstNode::node(Rule::Literal, vec![token], at);
                Ok(expression(vec![literal]))
            }
            TokenKind::LeftBracket => {
                let array = self.parse_array_literal()?;
                Ok(expression(vec![array]))
            }
            TokenKind::LeftParen => {
                let open = self.bump();
                let inner = self.parse_expression_sequence()?;
                let close = self.expect(TokenKind::RightParen)?;
                Ok(expression(vec![open, inner, close]))
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_array_literal(&mut self) -> Result<CstNode, Error> {
        let at = self.current.span.start;
        let open = self.expect(TokenKind::LeftBracket)?;

        let list_at = self.current.span.start;
        let mut elements = Vec::new();
        while !self.check(TokenKind::RightBracket) && !self.is_at_end() {
            if self.check(TokenKind::Comma) {
                elements.push(self.bump());
                continue;
            }
            let element_at = self.current.span.start;
            let value = self.parse_assignment()?;
            elements.push(CstNode::node(Rule::ArrayElement, vec![value], element_at));
            if !self.check(TokenKind::RightBracket) {
                elements.push(self.expect(TokenKind::Comma)?);
            }
        }
        let list = CstNode::node(Rule::ElementList, elements, list_at);

        let close = self.expect(TokenKind::RightBracket)?;
        Ok(CstNode::node(Rule::ArrayLiteral, vec![open, list, close], at))
    }

    fn parse_identifier(&mut self) -> Result<CstNode, Error> {
        let at = self.current.span.start;
        let id = self.expect(TokenKind::Identifier)?;
        Ok(CstNode::node(Rule::Identifier, vec![id], at))
    }

    /// Member names may be reserved words.
    fn parse_identifier_name(&mut self) -> Result<CstNode, Error> {
        let at = self.current.span.start;
        let kind = self.current.kind;
        let inner = if kind == TokenKind::Identifier {
            self.parse_identifier()?
        } else if kind.is_keyword()
            || matches!(kind, TokenKind::True | TokenKind::False | TokenKind::Null)
        {
            self.bump()
        } else {
            return Err(self.error(format!(
                "Expected property name, found {}",
                self.describe_current()
            )));
        };
        Ok(CstNode::node(Rule::IdentifierName, vec![inner], at))
    }

    // ==================== Token helpers ====================

    /// Turns the current token into a terminal node and advances.
    fn bump(&mut self) -> CstNode {
        let token = self.current;
        let node = if token.kind == TokenKind::Eof {
            CstNode::terminal(TokenType::Eof, "", token.span)
        } else {
            CstNode::terminal(token_type(token.kind), token.text(self.source), token.span)
        };
        self.advance();
        node
    }

    fn advance(&mut self) {
        if self.current.kind != TokenKind::Eof {
            self.previous = std::mem::replace(&mut self.current, self.scanner.next_token());
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn expect(&mut self, kind: TokenKind) -> Result<CstNode, Error> {
        if self.check(kind) {
            Ok(self.bump())
        } else {
            Err(self.error(format!(
                "Expected '{}', found {}",
                kind,
                self.describe_current()
            )))
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Eof)
    }

    fn describe_current(&self) -> String {
        match self.current.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("'{}'", self.current.text(self.source)),
        }
    }

    fn unexpected(&self) -> Error {
        self.error(format!("Unexpected token {}", self.describe_current()))
    }

    fn error(&self, message: String) -> Error {
        let (line, col) = self.current.span.line_col(self.source);
        Error::SyntaxError(format!("{} at {}:{}", message, line, col))
    }
}

fn expression(children: Vec<CstNode>) -> CstNode {
    CstNode::node(Rule::SingleExpression, children, 0)
}

fn token_type(kind: TokenKind) -> TokenType {
    match kind {
        TokenKind::Number => TokenType::DecimalLiteral,
        TokenKind::HexNumber => TokenType::HexIntegerLiteral,
        TokenKind::OctalNumber => TokenType::OctalIntegerLiteral,
        TokenKind::BinaryNumber => TokenType::BinaryIntegerLiteral,
        TokenKind::String => TokenType::StringLiteral,
        TokenKind::True | TokenKind::False => TokenType::BooleanLiteral,
        TokenKind::Null => TokenType::NullLiteral,
        TokenKind::Identifier => TokenType::Identifier,
        TokenKind::Eof => TokenType::Eof,
        kind if kind.is_keyword() => TokenType::Keyword,
        _ => TokenType::Punctuator,
    }
}
