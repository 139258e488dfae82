//! Call-tip extraction: which invocation is the cursor inside, and at
//! which argument.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::PartialParser;
use crate::ast::{Node, NodeKind};
use crate::error::Error;
use crate::token::{Keyword, Token, TokenKind, tokenize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationKind {
    Method,
    Function,
    Instantiation,
}

/// Description of the innermost invocation that is still open at the end
/// of the scanned source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationInfo {
    pub callee_name: String,
    /// The callee expression printed back to source.
    pub callee_expression: String,
    #[serde(rename = "type")]
    pub kind: InvocationKind,
    /// Zero-based index of the argument the cursor is located at.
    pub argument_index: usize,
    /// Byte offset of the invocation's opening parenthesis.
    pub offset: usize,
}

impl PartialParser {
    /// Scans backward for the function, method or constructor invocation
    /// the end of `code` is inside of. Returns `Ok(None)` when the
    /// position is not inside any open call.
    pub fn invocation_info_at(&self, code: &str) -> Result<Option<InvocationInfo>, Error> {
        let bytes = code.as_bytes();
        let tokens = tokenize(code);
        let mut token_index = tokens.len();

        let mut scopes_opened = 0usize;
        let mut scopes_closed = 0usize;
        let mut brackets_opened = 0usize;
        let mut brackets_closed = 0usize;
        let mut parens_opened = 0usize;
        let mut parens_closed = 0usize;

        let mut argument_index = 0usize;

        let mut i = code.len();
        while i > 0 {
            i -= 1;
            if token_index == tokens.len() || i < tokens[token_index].start {
                token_index -= 1;
            }
            let kind = tokens[token_index].kind;
            let b = bytes[i];

            if kind.is_skippable() {
                continue;
            } else if b == b'}' {
                scopes_closed += 1;
            } else if b == b'{' {
                scopes_opened += 1;

                if scopes_opened > scopes_closed {
                    // Start of a block; we can never be inside a call.
                    return Ok(None);
                }
            } else if b == b']' {
                brackets_closed += 1;
            } else if b == b'[' {
                brackets_opened += 1;

                if brackets_opened > brackets_closed {
                    // We were inside an array argument; its commas do
                    // not count, start over.
                    argument_index = 0;
                    brackets_opened -= 1;
                }
            } else if b == b')' {
                parens_closed += 1;
            } else if b == b'(' {
                parens_opened += 1;
            } else if scopes_opened == scopes_closed {
                if b == b';' {
                    // Crossed into the previous statement.
                    return Ok(None);
                } else if b == b',' {
                    if parens_opened == parens_closed + 1 {
                        // The cursor sits inside an argument that itself
                        // contains an unclosed parenthesis; pretend it
                        // was closed so this comma still counts.
                        parens_closed += 1;
                    }

                    if brackets_opened >= brackets_closed && parens_opened == parens_closed {
                        argument_index += 1;
                    }
                }
            }

            if scopes_opened == scopes_closed && parens_opened == parens_closed + 1 {
                if kind.is_expression_boundary(self.version) {
                    return Ok(None);
                }

                let Ok(node) = self.last_node_at(code, Some(i)) else {
                    // No expression precedes this position; keep walking
                    // out to an enclosing call.
                    continue;
                };
                trace!(offset = i, "recovered callee for open invocation");

                let kind = classify(&node, &tokens, token_index);
                let callee_name = callee_name(&node)?;

                return Ok(Some(InvocationInfo {
                    callee_name,
                    callee_expression: node.print(),
                    kind,
                    argument_index,
                    offset: i,
                }));
            }
        }

        Ok(None)
    }
}

fn classify(node: &Node, tokens: &[Token], token_index: usize) -> InvocationKind {
    match node.kind {
        NodeKind::PropertyFetch { .. }
        | NodeKind::StaticPropertyFetch { .. }
        | NodeKind::MethodCall { .. }
        | NodeKind::StaticCall { .. }
        | NodeKind::ClassConstFetch { .. } => InvocationKind::Method,
        _ => {
            // Walk back over the callee name looking for `new`.
            let mut j = token_index.wrapping_sub(2);
            while let Some(token) = tokens.get(j) {
                match token.kind {
                    TokenKind::Keyword(Keyword::New) => return InvocationKind::Instantiation,
                    TokenKind::Whitespace
                    | TokenKind::NamespaceSeparator
                    | TokenKind::Identifier => j = j.wrapping_sub(1),
                    _ => break,
                }
            }
            InvocationKind::Function
        }
    }
}

fn callee_name(node: &Node) -> Result<String, Error> {
    match &node.kind {
        NodeKind::PropertyFetch { name, .. }
        | NodeKind::ClassConstFetch { name, .. }
        | NodeKind::MethodCall { name, .. }
        | NodeKind::StaticCall { name, .. } => Ok(name.print()),
        NodeKind::StaticPropertyFetch { name, .. } => Ok(name.clone()),
        NodeKind::Identifier(name) => Ok(last_segment(name)),
        NodeKind::FunctionCall { callee, .. } => callee_name(callee),
        NodeKind::New { class, .. } => match &class.kind {
            NodeKind::Identifier(name) => Ok(last_segment(name)),
            _ => Ok(class.print()),
        },
        NodeKind::Closure(_) => Err(Error::UnsupportedConstruct {
            expression: node.print(),
        }),
        _ => Ok(node.print()),
    }
}

/// `\Foo\Bar` names a class by its last segment.
fn last_segment(name: &str) -> String {
    name.rsplit('\\').next().unwrap_or(name).to_string()
}
