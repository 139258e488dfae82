//! Recovery of a single expression node from incomplete source.

use tracing::debug;

use crate::PartialParser;
use crate::ast::{MemberName, Node, NodeKind, Span};
use crate::error::Error;
use crate::strict;

/// Member name inserted to complete a dangling `->` or `::`; blanked out
/// of the recovered node again afterwards.
const RECOVERY_MEMBER_NAME: &str = "____PLACEHOLDER____";

impl PartialParser {
    /// Recovers the node for the expression that ends at `offset` (or at
    /// the end of `source` when no offset is given).
    pub fn last_node_at(&self, source: &str, offset: Option<usize>) -> Result<Node, Error> {
        let source = match offset {
            Some(offset) => {
                let mut end = offset.min(source.len());
                while !source.is_char_boundary(end) {
                    end -= 1;
                }
                &source[..end]
            }
            None => source,
        };
        self.parse(source)
    }

    /// Recovers exactly one expression node from the trailing expression
    /// of `code`.
    ///
    /// The fragment is first parsed verbatim. On failure a fixed chain of
    /// corrections is attempted, in order: synthesizing a keyword node
    /// for a bare trailing `self`/`static`/`parent`, appending `;`,
    /// appending `;\n` (which is what completes a dangling heredoc), and
    /// finally appending a placeholder member name for a dangling arrow
    /// or double colon. The first correction that produces a parse wins;
    /// anything that still fails, or parses to more than one statement,
    /// is a [`Error::MalformedFragment`].
    pub fn parse(&self, code: &str) -> Result<Node, Error> {
        let boundary = self.start_of_expression(code);
        let fragment = code[boundary..].trim();

        if fragment.is_empty() {
            return Err(Error::MalformedFragment {
                fragment: String::new(),
            });
        }

        let mut nodes = try_parse(fragment);
        if nodes.is_none() {
            nodes = keyword_correction(fragment);
        }
        if nodes.is_none() {
            nodes = try_parse(&format!("{fragment};"));
        }
        if nodes.is_none() {
            nodes = try_parse(&format!("{fragment};\n"));
        }
        if nodes.is_none() {
            debug!(fragment, "falling back to placeholder member insertion");
            nodes = placeholder_insertion(fragment);
        }

        let Some(mut nodes) = nodes else {
            return Err(Error::MalformedFragment {
                fragment: fragment.to_string(),
            });
        };

        if nodes.len() == 1
            && let Some(node) = nodes.pop()
        {
            return Ok(node);
        }

        // A successful parse of more than one statement means the
        // boundary scan did not isolate a single expression after all.
        Err(Error::MalformedFragment {
            fragment: fragment.to_string(),
        })
    }
}

fn try_parse(code: &str) -> Option<Vec<Node>> {
    match strict::parse_program(code) {
        Ok(nodes) if !nodes.is_empty() => Some(nodes),
        _ => None,
    }
}

/// `self`, `static` and `parent` are not expressions on their own, so a
/// fragment ending in one of them gets a synthesized keyword node.
fn keyword_correction(fragment: &str) -> Option<Vec<Node>> {
    let candidates = [
        ("self", NodeKind::SelfKeyword),
        ("static", NodeKind::StaticKeyword),
        ("parent", NodeKind::ParentKeyword),
    ];

    for (keyword, kind) in candidates {
        if !fragment.ends_with(keyword) {
            continue;
        }
        let start = fragment.len() - keyword.len();
        let standalone = fragment[..start]
            .bytes()
            .next_back()
            .is_none_or(|b| !b.is_ascii_alphanumeric() && b != b'_' && b != b'$');
        if standalone {
            let span = Span {
                start,
                end: fragment.len(),
            };
            return Some(vec![Node::new(kind, span)]);
        }
    }

    None
}

fn placeholder_insertion(fragment: &str) -> Option<Vec<Node>> {
    let mut nodes = try_parse(&format!("{fragment}{RECOVERY_MEMBER_NAME};"))?;

    if let Some(node) = nodes.last_mut() {
        match &mut node.kind {
            NodeKind::PropertyFetch {
                name: MemberName::Identifier(name),
                ..
            }
            | NodeKind::ClassConstFetch {
                name: MemberName::Identifier(name),
                ..
            } if name == RECOVERY_MEMBER_NAME => name.clear(),
            _ => {}
        }
    }

    Some(nodes)
}
