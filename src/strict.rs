//! Strict single-expression parser.
//!
//! This parser is intentionally unforgiving: statements must end in a
//! semicolon and every malformed construct is an error. Recovery is the
//! job of [`crate::PartialParser::parse`], which reacts to failures here
//! by correcting the source and trying again. The grammar covers the
//! expression shapes that can trail a cursor, not all of PHP.

use crate::ast::{ArrayItem, MemberName, Node, NodeKind, Span};
use crate::token::{Keyword, Token, TokenKind, tokenize};

#[derive(Debug, Clone)]
pub(crate) struct ParseError {
    pub message: String,
    pub offset: usize,
}

/// Parses `code` as a sequence of expression statements.
pub(crate) fn parse_program(code: &str) -> Result<Vec<Node>, ParseError> {
    let mut parser = Parser::new(code);
    if parser.peek_kind() == Some(TokenKind::OpenTag) {
        parser.pos += 1;
    }
    let mut nodes = Vec::new();
    while parser.peek().is_some() {
        nodes.push(parser.parse_statement()?);
    }
    Ok(nodes)
}

struct Parser<'a> {
    code: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(code: &'a str) -> Self {
        let tokens = tokenize(code)
            .into_iter()
            .filter(|t| {
                !matches!(
                    t.kind,
                    TokenKind::Whitespace
                        | TokenKind::LineComment
                        | TokenKind::BlockComment
                        | TokenKind::DocComment
                )
            })
            .collect();
        Parser {
            code,
            tokens,
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn bump(&mut self) -> Result<Token, ParseError> {
        let token = *self
            .peek()
            .ok_or_else(|| self.error_at_end("unexpected end of input"))?;
        self.pos += 1;
        Ok(token)
    }

    fn text(&self, token: &Token) -> &'a str {
        token.text(self.code)
    }

    fn prev_end(&self) -> usize {
        self.tokens[self.pos - 1].end
    }

    fn at_punct(&self, b: u8) -> bool {
        self.peek().is_some_and(|t| {
            t.kind == TokenKind::Punctuation && self.code.as_bytes()[t.start] == b
        })
    }

    fn eat_punct(&mut self, b: u8) -> bool {
        if self.at_punct(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, b: u8) -> Result<(), ParseError> {
        if self.eat_punct(b) {
            Ok(())
        } else {
            Err(self.error(&format!("expected `{}`", b as char)))
        }
    }

    fn error(&self, message: &str) -> ParseError {
        ParseError {
            message: message.to_string(),
            offset: self.peek().map_or(self.code.len(), |t| t.start),
        }
    }

    fn error_at_end(&self, message: &str) -> ParseError {
        ParseError {
            message: message.to_string(),
            offset: self.code.len(),
        }
    }

    fn parse_statement(&mut self) -> Result<Node, ParseError> {
        let expression = self.parse_expression()?;
        self.expect_punct(b';')?;
        Ok(expression)
    }

    fn parse_expression(&mut self) -> Result<Node, ParseError> {
        let condition = self.parse_binary()?;
        if !self.eat_punct(b'?') {
            return Ok(condition);
        }
        let then = if self.at_punct(b':') {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect_punct(b':')?;
        let otherwise = self.parse_expression()?;
        let span = Span {
            start: condition.span.start,
            end: otherwise.span.end,
        };
        Ok(Node::new(
            NodeKind::Ternary {
                condition: Box::new(condition),
                then,
                otherwise: Box::new(otherwise),
            },
            span,
        ))
    }

    /// One flat left-associative binary layer. Operator precedence does
    /// not matter for recovery purposes; what matters is accepting the
    /// token sequences and rejecting everything else.
    fn parse_binary(&mut self) -> Result<Node, ParseError> {
        let mut left = self.parse_unary()?;
        while let Some(operator) = self.peek_binary_operator() {
            self.pos += 1;
            let right = self.parse_unary()?;
            let span = Span {
                start: left.span.start,
                end: right.span.end,
            };
            left = Node::new(
                NodeKind::Binary {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn peek_binary_operator(&self) -> Option<String> {
        let token = self.peek()?;
        let accepted = match token.kind {
            TokenKind::Punctuation => {
                matches!(
                    self.code.as_bytes()[token.start],
                    b'+' | b'-' | b'*' | b'/' | b'%' | b'.' | b'<' | b'>' | b'|' | b'&' | b'^'
                        | b'='
                )
            }
            TokenKind::Equal
            | TokenKind::NotEqual
            | TokenKind::Identical
            | TokenKind::NotIdentical
            | TokenKind::LessEqual
            | TokenKind::GreaterEqual
            | TokenKind::Spaceship
            | TokenKind::Coalesce
            | TokenKind::BooleanAnd
            | TokenKind::BooleanOr
            | TokenKind::ShiftLeft
            | TokenKind::ShiftRight
            | TokenKind::Pow
            | TokenKind::PlusAssign
            | TokenKind::MinusAssign
            | TokenKind::MulAssign
            | TokenKind::DivAssign
            | TokenKind::ModAssign
            | TokenKind::ConcatAssign
            | TokenKind::AndAssign
            | TokenKind::OrAssign
            | TokenKind::XorAssign
            | TokenKind::ShiftLeftAssign
            | TokenKind::ShiftRightAssign
            | TokenKind::PowAssign => true,
            TokenKind::Keyword(
                Keyword::LogicalAnd | Keyword::LogicalOr | Keyword::LogicalXor | Keyword::Instanceof,
            ) => true,
            _ => false,
        };
        accepted.then(|| self.text(token).to_string())
    }

    fn parse_unary(&mut self) -> Result<Node, ParseError> {
        let Some(token) = self.peek().copied() else {
            return Err(self.error_at_end("expected expression"));
        };

        let prefix = match token.kind {
            TokenKind::Punctuation
                if matches!(self.code.as_bytes()[token.start], b'!' | b'~' | b'@' | b'+' | b'-' | b'&') =>
            {
                Some(self.text(&token).to_string())
            }
            TokenKind::Inc | TokenKind::Dec | TokenKind::Ellipsis => {
                Some(self.text(&token).to_string())
            }
            TokenKind::Keyword(Keyword::Clone) => Some("clone".to_string()),
            _ => None,
        };

        if let Some(operator) = prefix {
            self.pos += 1;
            let operand = self.parse_unary()?;
            let span = Span {
                start: token.start,
                end: operand.span.end,
            };
            return Ok(Node::new(
                NodeKind::Unary {
                    operator,
                    operand: Box::new(operand),
                },
                span,
            ));
        }

        if token.kind == TokenKind::Cast {
            self.pos += 1;
            let operand = self.parse_unary()?;
            let span = Span {
                start: token.start,
                end: operand.span.end,
            };
            return Ok(Node::new(
                NodeKind::Cast {
                    cast: self.text(&token).to_string(),
                    operand: Box::new(operand),
                },
                span,
            ));
        }

        if token.kind == TokenKind::Keyword(Keyword::New) {
            return self.parse_new();
        }

        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    fn parse_new(&mut self) -> Result<Node, ParseError> {
        let new_token = self.bump()?;
        let class = self.parse_new_class_ref()?;
        let arguments = if self.at_punct(b'(') {
            Some(self.parse_argument_list()?)
        } else {
            None
        };
        let span = Span {
            start: new_token.start,
            end: self.prev_end(),
        };
        let node = Node::new(
            NodeKind::New {
                class: Box::new(class),
                arguments,
            },
            span,
        );
        self.parse_postfix(node)
    }

    fn parse_new_class_ref(&mut self) -> Result<Node, ParseError> {
        match self.peek_kind() {
            Some(TokenKind::Identifier | TokenKind::NamespaceSeparator) => {
                self.parse_qualified_name()
            }
            Some(TokenKind::Keyword(Keyword::Static)) => {
                let token = self.bump()?;
                Ok(Node::new(
                    NodeKind::StaticKeyword,
                    Span {
                        start: token.start,
                        end: token.end,
                    },
                ))
            }
            Some(TokenKind::Variable) => {
                let token = self.bump()?;
                let name = self.text(&token)[1..].to_string();
                Ok(Node::new(
                    NodeKind::Variable(name),
                    Span {
                        start: token.start,
                        end: token.end,
                    },
                ))
            }
            _ if self.at_punct(b'(') => {
                self.pos += 1;
                let inner = self.parse_expression()?;
                self.expect_punct(b')')?;
                Ok(inner)
            }
            _ => Err(self.error("expected class reference after `new`")),
        }
    }

    fn parse_qualified_name(&mut self) -> Result<Node, ParseError> {
        let start = self.peek().map_or(self.code.len(), |t| t.start);
        let mut name = String::new();
        while let Some(kind) = self.peek_kind() {
            match kind {
                TokenKind::Identifier | TokenKind::NamespaceSeparator => {
                    let token = self.bump()?;
                    name.push_str(self.text(&token));
                }
                _ => break,
            }
        }
        if name.is_empty() {
            return Err(self.error("expected name"));
        }
        Ok(Node::new(
            NodeKind::Identifier(name),
            Span {
                start,
                end: self.prev_end(),
            },
        ))
    }

    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        let Some(token) = self.peek().copied() else {
            return Err(self.error_at_end("expected expression"));
        };
        let span = Span {
            start: token.start,
            end: token.end,
        };

        match token.kind {
            TokenKind::Variable => {
                self.pos += 1;
                Ok(Node::new(
                    NodeKind::Variable(self.text(&token)[1..].to_string()),
                    span,
                ))
            }
            TokenKind::Identifier | TokenKind::NamespaceSeparator => self.parse_qualified_name(),
            TokenKind::Keyword(Keyword::Static) => {
                self.pos += 1;
                if self.peek_kind() == Some(TokenKind::Keyword(Keyword::Function)) {
                    // `static function () { ... }`; fold the modifier
                    // into the captured closure text.
                    let closure = self.parse_closure()?;
                    let full = Span {
                        start: token.start,
                        end: closure.span.end,
                    };
                    return Ok(Node::new(
                        NodeKind::Closure(self.code[full.start..full.end].to_string()),
                        full,
                    ));
                }
                Ok(Node::new(NodeKind::StaticKeyword, span))
            }
            TokenKind::Number => {
                self.pos += 1;
                Ok(Node::new(
                    NodeKind::NumberLiteral(self.text(&token).to_string()),
                    span,
                ))
            }
            TokenKind::StringLiteral => {
                self.pos += 1;
                Ok(Node::new(
                    NodeKind::StringLiteral(self.text(&token).to_string()),
                    span,
                ))
            }
            TokenKind::Keyword(Keyword::Function) => self.parse_closure(),
            TokenKind::Punctuation if self.at_punct(b'[') => self.parse_array_literal(),
            TokenKind::Punctuation if self.at_punct(b'(') => {
                self.pos += 1;
                let inner = self.parse_expression()?;
                self.expect_punct(b')')?;
                Ok(inner)
            }
            _ => Err(self.error("unexpected token in expression")),
        }
    }

    fn parse_array_literal(&mut self) -> Result<Node, ParseError> {
        let open = self.bump()?;
        let mut items = Vec::new();
        while !self.at_punct(b']') {
            let first = self.parse_expression()?;
            let item = if self.peek_kind() == Some(TokenKind::DoubleArrow) {
                self.pos += 1;
                let value = self.parse_expression()?;
                ArrayItem {
                    key: Some(first),
                    value,
                }
            } else {
                ArrayItem {
                    key: None,
                    value: first,
                }
            };
            items.push(item);
            if !self.eat_punct(b',') {
                break;
            }
        }
        self.expect_punct(b']')?;
        Ok(Node::new(
            NodeKind::ArrayLiteral(items),
            Span {
                start: open.start,
                end: self.prev_end(),
            },
        ))
    }

    /// Captures a closure as raw text, skipping its parameter list and
    /// body with bracket balancing instead of parsing them.
    fn parse_closure(&mut self) -> Result<Node, ParseError> {
        let function_token = self.bump()?;
        self.eat_punct(b'&');
        self.expect_punct(b'(')?;
        self.skip_balanced(b'(', b')')?;
        if self.peek_kind() == Some(TokenKind::Keyword(Keyword::Use)) {
            self.pos += 1;
            self.expect_punct(b'(')?;
            self.skip_balanced(b'(', b')')?;
        }
        if self.eat_punct(b':') {
            while !self.at_punct(b'{') {
                if self.peek().is_none() {
                    return Err(self.error_at_end("unterminated closure return type"));
                }
                self.pos += 1;
            }
        }
        self.expect_punct(b'{')?;
        self.skip_balanced(b'{', b'}')?;
        let span = Span {
            start: function_token.start,
            end: self.prev_end(),
        };
        Ok(Node::new(
            NodeKind::Closure(self.code[span.start..span.end].to_string()),
            span,
        ))
    }

    /// Consumes tokens until the already-opened `open` bracket closes.
    fn skip_balanced(&mut self, open: u8, close: u8) -> Result<(), ParseError> {
        let mut depth = 1usize;
        while depth > 0 {
            if self.at_punct(open) {
                depth += 1;
            } else if self.at_punct(close) {
                depth -= 1;
            }
            if self.peek().is_none() {
                return Err(self.error_at_end("unbalanced brackets"));
            }
            self.pos += 1;
        }
        Ok(())
    }

    fn parse_postfix(&mut self, mut node: Node) -> Result<Node, ParseError> {
        loop {
            match self.peek_kind() {
                Some(arrow @ (TokenKind::Arrow | TokenKind::NullsafeArrow)) => {
                    self.pos += 1;
                    let nullsafe = arrow == TokenKind::NullsafeArrow;
                    let name = self.parse_member_name()?;
                    let object = Box::new(node);
                    if self.at_punct(b'(') {
                        let arguments = self.parse_argument_list()?;
                        let span = Span {
                            start: object.span.start,
                            end: self.prev_end(),
                        };
                        node = Node::new(
                            NodeKind::MethodCall {
                                object,
                                name,
                                arguments,
                                nullsafe,
                            },
                            span,
                        );
                    } else {
                        let span = Span {
                            start: object.span.start,
                            end: self.prev_end(),
                        };
                        node = Node::new(
                            NodeKind::PropertyFetch {
                                object,
                                name,
                                nullsafe,
                            },
                            span,
                        );
                    }
                }
                Some(TokenKind::DoubleColon) => {
                    self.pos += 1;
                    node = self.parse_static_member(node)?;
                }
                Some(TokenKind::Punctuation) if self.at_punct(b'(') => {
                    let callee = Box::new(node);
                    let arguments = self.parse_argument_list()?;
                    let span = Span {
                        start: callee.span.start,
                        end: self.prev_end(),
                    };
                    node = Node::new(NodeKind::FunctionCall { callee, arguments }, span);
                }
                Some(TokenKind::Punctuation) if self.at_punct(b'[') => {
                    self.pos += 1;
                    let index = if self.at_punct(b']') {
                        None
                    } else {
                        Some(Box::new(self.parse_expression()?))
                    };
                    self.expect_punct(b']')?;
                    let target = Box::new(node);
                    let span = Span {
                        start: target.span.start,
                        end: self.prev_end(),
                    };
                    node = Node::new(NodeKind::IndexFetch { target, index }, span);
                }
                _ => break,
            }
        }
        Ok(node)
    }

    /// The name after `->` / `?->`. Reserved words are valid member
    /// names, so keywords are accepted verbatim.
    fn parse_member_name(&mut self) -> Result<MemberName, ParseError> {
        match self.peek_kind() {
            Some(TokenKind::Identifier | TokenKind::Keyword(_)) => {
                let token = self.bump()?;
                Ok(MemberName::Identifier(self.text(&token).to_string()))
            }
            Some(TokenKind::Variable) => {
                let token = self.bump()?;
                let node = Node::new(
                    NodeKind::Variable(self.text(&token)[1..].to_string()),
                    Span {
                        start: token.start,
                        end: token.end,
                    },
                );
                Ok(MemberName::Dynamic(Box::new(node)))
            }
            _ if self.at_punct(b'{') => {
                self.pos += 1;
                let inner = self.parse_expression()?;
                self.expect_punct(b'}')?;
                Ok(MemberName::Dynamic(Box::new(inner)))
            }
            _ => Err(self.error("expected member name")),
        }
    }

    fn parse_static_member(&mut self, class: Node) -> Result<Node, ParseError> {
        let class = Box::new(class);
        match self.peek_kind() {
            Some(TokenKind::Variable) => {
                let token = self.bump()?;
                let name = self.text(&token)[1..].to_string();
                if self.at_punct(b'(') {
                    // `Foo::$callback()` invokes the method named by the
                    // variable's value.
                    let variable = Node::new(
                        NodeKind::Variable(name),
                        Span {
                            start: token.start,
                            end: token.end,
                        },
                    );
                    let arguments = self.parse_argument_list()?;
                    let span = Span {
                        start: class.span.start,
                        end: self.prev_end(),
                    };
                    Ok(Node::new(
                        NodeKind::StaticCall {
                            class,
                            name: MemberName::Dynamic(Box::new(variable)),
                            arguments,
                        },
                        span,
                    ))
                } else {
                    let span = Span {
                        start: class.span.start,
                        end: self.prev_end(),
                    };
                    Ok(Node::new(NodeKind::StaticPropertyFetch { class, name }, span))
                }
            }
            Some(TokenKind::Identifier | TokenKind::Keyword(_)) => {
                let token = self.bump()?;
                let name = MemberName::Identifier(self.text(&token).to_string());
                if self.at_punct(b'(') {
                    let arguments = self.parse_argument_list()?;
                    let span = Span {
                        start: class.span.start,
                        end: self.prev_end(),
                    };
                    Ok(Node::new(
                        NodeKind::StaticCall {
                            class,
                            name,
                            arguments,
                        },
                        span,
                    ))
                } else {
                    let span = Span {
                        start: class.span.start,
                        end: self.prev_end(),
                    };
                    Ok(Node::new(NodeKind::ClassConstFetch { class, name }, span))
                }
            }
            _ if self.at_punct(b'{') => {
                self.pos += 1;
                let inner = self.parse_expression()?;
                self.expect_punct(b'}')?;
                let name = MemberName::Dynamic(Box::new(inner));
                if self.at_punct(b'(') {
                    let arguments = self.parse_argument_list()?;
                    let span = Span {
                        start: class.span.start,
                        end: self.prev_end(),
                    };
                    Ok(Node::new(
                        NodeKind::StaticCall {
                            class,
                            name,
                            arguments,
                        },
                        span,
                    ))
                } else {
                    let span = Span {
                        start: class.span.start,
                        end: self.prev_end(),
                    };
                    Ok(Node::new(NodeKind::ClassConstFetch { class, name }, span))
                }
            }
            _ => Err(self.error("expected member name after `::`")),
        }
    }

    fn parse_argument_list(&mut self) -> Result<Vec<Node>, ParseError> {
        self.expect_punct(b'(')?;
        let mut arguments = Vec::new();
        while !self.at_punct(b')') {
            arguments.push(self.parse_expression()?);
            if !self.eat_punct(b',') {
                break;
            }
        }
        self.expect_punct(b')')?;
        Ok(arguments)
    }
}
