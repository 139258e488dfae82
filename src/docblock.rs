//! Docblock handling: locating the comment that documents a node,
//! splitting it into short/long descriptions and resolving inheritDoc
//! markers against a parent's documentation.

use mago_span::HasSpan;
use mago_syntax::ast::{Trivia, TriviaKind};

/// The marker that pulls a parent's documentation into a child member.
pub const INHERITDOC: &str = "{@inheritDoc}";

/// Whether `text` consists of nothing but the inheritDoc marker.
pub fn is_inheritdoc_marker(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case(INHERITDOC)
}

/// Substitutes every inheritDoc marker (case-insensitively) in `text`
/// with the parent description. Absent text stays absent; an absent
/// parent description substitutes the empty string.
pub fn resolve_inherit_doc(text: Option<&str>, parent: Option<&str>) -> Option<String> {
    let text = text?;
    Some(replace_marker(text, parent.unwrap_or_default()))
}

fn replace_marker(text: &str, replacement: &str) -> String {
    let lowered = text.to_ascii_lowercase();
    let needle = INHERITDOC.to_ascii_lowercase();

    let mut result = String::with_capacity(text.len());
    let mut from = 0;
    while let Some(at) = lowered[from..].find(&needle) {
        let at = from + at;
        result.push_str(&text[from..at]);
        result.push_str(replacement);
        from = at + needle.len();
    }
    result.push_str(&text[from..]);
    result
}

/// Splits raw docblock text into a short and a long description.
///
/// The short description is the first paragraph, the long description is
/// everything between it and the first tag line. Either side is `None`
/// when empty.
pub fn split_descriptions(docblock: &str) -> (Option<String>, Option<String>) {
    let mut lines = Vec::new();
    for raw in docblock.lines() {
        let mut line = raw.trim();
        line = line.strip_prefix("/**").unwrap_or(line);
        line = line.strip_suffix("*/").unwrap_or(line);
        line = line.trim_start_matches('*').trim();
        if line.starts_with('@') {
            break;
        }
        lines.push(line.to_string());
    }

    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    let split = lines
        .iter()
        .position(|l| l.is_empty())
        .unwrap_or(lines.len());

    let short = lines[..split].join("\n");
    let long = lines
        .get(split..)
        .unwrap_or_default()
        .iter()
        .skip_while(|l| l.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join("\n");

    let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };
    (non_empty(short), non_empty(long))
}

/// Finds the docblock that documents `node`: the closest doc comment
/// above it with nothing but whitespace and ordinary comments in
/// between.
pub fn docblock_for_node<'a>(
    trivia: &'a [Trivia<'a>],
    content: &str,
    node: &impl HasSpan,
) -> Option<&'a str> {
    let node_start = node.span().start.offset;
    let above = trivia.partition_point(|t| t.span.start.offset < node_start);

    let bytes = content.as_bytes();
    let mut covered_from = node_start;

    for t in trivia[..above].iter().rev() {
        let gap = bytes
            .get(t.span.end.offset as usize..covered_from as usize)
            .unwrap_or(&[]);
        if !gap.iter().all(u8::is_ascii_whitespace) {
            return None;
        }

        match t.kind {
            TriviaKind::DocBlockComment => return Some(t.value),
            TriviaKind::WhiteSpace
            | TriviaKind::SingleLineComment
            | TriviaKind::MultiLineComment
            | TriviaKind::HashComment => {
                covered_from = t.span.start.offset;
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_short_and_long_descriptions() {
        let doc = "/**\n * Short line.\n *\n * Long part one.\n * Long part two.\n *\n * @param int $x\n */";
        let (short, long) = split_descriptions(doc);
        assert_eq!(short.as_deref(), Some("Short line."));
        assert_eq!(long.as_deref(), Some("Long part one.\nLong part two."));
    }

    #[test]
    fn tags_only_docblock_has_no_descriptions() {
        let (short, long) = split_descriptions("/**\n * @var int\n */");
        assert_eq!(short, None);
        assert_eq!(long, None);
    }

    #[test]
    fn marker_detection_is_case_insensitive() {
        assert!(is_inheritdoc_marker("  {@inheritdoc}  "));
        assert!(is_inheritdoc_marker("{@inheritDoc}"));
        assert!(!is_inheritdoc_marker("See {@inheritDoc} above"));
    }

    #[test]
    fn inherit_doc_substitution_keeps_surrounding_text() {
        let resolved = resolve_inherit_doc(
            Some("Before. {@inheritdoc} After."),
            Some("Parent words."),
        );
        assert_eq!(resolved.as_deref(), Some("Before. Parent words. After."));
    }

    #[test]
    fn absent_parent_substitutes_empty_text() {
        let resolved = resolve_inherit_doc(Some("{@inheritDoc}"), None);
        assert_eq!(resolved.as_deref(), Some(""));
    }
}
