//! Owned expression nodes produced by the recovering parser.
//!
//! The model covers the expression shapes that can trail a cursor in an
//! editor buffer, not the whole PHP grammar. Every node can be printed
//! back to source text, which is how dynamic member names and callee
//! expressions are reported.

/// Byte range of a node within the parsed fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// The name part of a member access. Dynamic names (`$obj->$name`,
/// `$obj->{$name}`) carry the expression that computes the name.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberName {
    Identifier(String),
    Dynamic(Box<Node>),
}

impl MemberName {
    pub fn print(&self) -> String {
        match self {
            MemberName::Identifier(name) => name.clone(),
            MemberName::Dynamic(node) => node.print(),
        }
    }
}

/// A key/value entry of an array literal; the key is absent for plain
/// list entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayItem {
    pub key: Option<Node>,
    pub value: Node,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// `$name`, stored without the sigil.
    Variable(String),
    /// A possibly qualified name: `strlen`, `Foo\Bar`, `\Foo\Bar`.
    Identifier(String),
    SelfKeyword,
    StaticKeyword,
    ParentKeyword,
    NumberLiteral(String),
    /// Raw literal text including quotes or heredoc introducer.
    StringLiteral(String),
    ArrayLiteral(Vec<ArrayItem>),
    /// `$object->name` / `$object?->name`; the name is empty when it was
    /// recovered from a dangling arrow.
    PropertyFetch {
        object: Box<Node>,
        name: MemberName,
        nullsafe: bool,
    },
    /// `Class::$property`, property name without the sigil.
    StaticPropertyFetch {
        class: Box<Node>,
        name: String,
    },
    /// `Class::NAME` or `Class::class`; the name is empty when it was
    /// recovered from a dangling double colon.
    ClassConstFetch {
        class: Box<Node>,
        name: MemberName,
    },
    MethodCall {
        object: Box<Node>,
        name: MemberName,
        arguments: Vec<Node>,
        nullsafe: bool,
    },
    StaticCall {
        class: Box<Node>,
        name: MemberName,
        arguments: Vec<Node>,
    },
    FunctionCall {
        callee: Box<Node>,
        arguments: Vec<Node>,
    },
    New {
        class: Box<Node>,
        arguments: Option<Vec<Node>>,
    },
    /// `$target[...]`; the index is absent for push syntax `$target[]`.
    IndexFetch {
        target: Box<Node>,
        index: Option<Box<Node>>,
    },
    /// `(int) $x` and friends; the cast text is kept verbatim.
    Cast {
        cast: String,
        operand: Box<Node>,
    },
    Unary {
        operator: String,
        operand: Box<Node>,
    },
    Binary {
        left: Box<Node>,
        operator: String,
        right: Box<Node>,
    },
    Ternary {
        condition: Box<Node>,
        then: Option<Box<Node>>,
        otherwise: Box<Node>,
    },
    /// A closure captured as raw source text; its body is skipped, not
    /// parsed.
    Closure(String),
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Node { kind, span }
    }

    /// Prints the node back to PHP source.
    pub fn print(&self) -> String {
        match &self.kind {
            NodeKind::Variable(name) => format!("${name}"),
            NodeKind::Identifier(name) => name.clone(),
            NodeKind::SelfKeyword => "self".to_string(),
            NodeKind::StaticKeyword => "static".to_string(),
            NodeKind::ParentKeyword => "parent".to_string(),
            NodeKind::NumberLiteral(text) | NodeKind::StringLiteral(text) => text.clone(),
            NodeKind::ArrayLiteral(items) => {
                let rendered: Vec<String> = items
                    .iter()
                    .map(|item| match &item.key {
                        Some(key) => format!("{} => {}", key.print(), item.value.print()),
                        None => item.value.print(),
                    })
                    .collect();
                format!("[{}]", rendered.join(", "))
            }
            NodeKind::PropertyFetch {
                object,
                name,
                nullsafe,
            } => {
                let arrow = if *nullsafe { "?->" } else { "->" };
                format!("{}{arrow}{}", object.print(), name.print())
            }
            NodeKind::StaticPropertyFetch { class, name } => {
                format!("{}::${name}", class.print())
            }
            NodeKind::ClassConstFetch { class, name } => {
                format!("{}::{}", class.print(), name.print())
            }
            NodeKind::MethodCall {
                object,
                name,
                arguments,
                nullsafe,
            } => {
                let arrow = if *nullsafe { "?->" } else { "->" };
                format!(
                    "{}{arrow}{}({})",
                    object.print(),
                    name.print(),
                    print_arguments(arguments)
                )
            }
            NodeKind::StaticCall {
                class,
                name,
                arguments,
            } => format!(
                "{}::{}({})",
                class.print(),
                name.print(),
                print_arguments(arguments)
            ),
            NodeKind::FunctionCall { callee, arguments } => {
                format!("{}({})", callee.print(), print_arguments(arguments))
            }
            NodeKind::New { class, arguments } => match arguments {
                Some(arguments) => {
                    format!("new {}({})", class.print(), print_arguments(arguments))
                }
                None => format!("new {}", class.print()),
            },
            NodeKind::IndexFetch { target, index } => match index {
                Some(index) => format!("{}[{}]", target.print(), index.print()),
                None => format!("{}[]", target.print()),
            },
            NodeKind::Cast { cast, operand } => format!("{cast} {}", operand.print()),
            NodeKind::Unary { operator, operand } => {
                if operator.ends_with(|c: char| c.is_alphabetic()) {
                    format!("{operator} {}", operand.print())
                } else {
                    format!("{operator}{}", operand.print())
                }
            }
            NodeKind::Binary {
                left,
                operator,
                right,
            } => format!("{} {operator} {}", left.print(), right.print()),
            NodeKind::Ternary {
                condition,
                then,
                otherwise,
            } => match then {
                Some(then) => format!(
                    "{} ? {} : {}",
                    condition.print(),
                    then.print(),
                    otherwise.print()
                ),
                None => format!("{} ?: {}", condition.print(), otherwise.print()),
            },
            NodeKind::Closure(text) => text.clone(),
        }
    }
}

fn print_arguments(arguments: &[Node]) -> String {
    arguments
        .iter()
        .map(Node::print)
        .collect::<Vec<_>>()
        .join(", ")
}
