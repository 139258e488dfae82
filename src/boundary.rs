//! Backward scan locating the start of the expression that ends at the
//! end of a source string.

use crate::PartialParser;
use crate::token::{TokenKind, tokenize};

/// Single-byte operators that terminate an expression at balanced
/// nesting. These only count when the byte forms a bare punctuation
/// token of its own, so the `-` of a `->` arrow does not qualify.
const BOUNDARY_BYTES: &[u8] = b".,?;=+-*/<>%|&^~!@";

impl PartialParser {
    /// Returns the byte offset at which the expression ending at the end
    /// of `code` starts. Scans backward, balancing parentheses, square
    /// brackets and curly braces as it goes; falling off the start of
    /// the input yields 0, so `&code[start..]` is always a valid slice.
    pub fn start_of_expression(&self, code: &str) -> usize {
        if code.is_empty() {
            return 0;
        }

        let bytes = code.as_bytes();
        let tokens = tokenize(code);
        let mut token_index = tokens.len();

        let mut parens_opened = 0usize;
        let mut parens_closed = 0usize;
        let mut squares_opened = 0usize;
        let mut squares_closed = 0usize;
        let mut braces_opened = 0usize;
        let mut braces_closed = 0usize;

        let mut in_static_name = false;

        let mut i = code.len();
        while i > 0 {
            i -= 1;
            if token_index == tokens.len() || i < tokens[token_index].start {
                token_index -= 1;
            }
            let kind = tokens[token_index].kind;
            let b = bytes[i];

            if kind.is_skippable() {
                // Strings, comments and identifiers occur freely inside
                // call stacks; keep walking.
            } else if b == b'(' {
                parens_opened += 1;

                // An opener that was never closed means the expression
                // cannot extend past it.
                if parens_opened > parens_closed {
                    return i + 1;
                }
            } else if b == b')' {
                if kind == TokenKind::Cast {
                    return i + 1;
                }
                parens_closed += 1;
            } else if b == b'[' {
                squares_opened += 1;
                if squares_opened > squares_closed {
                    return i + 1;
                }
            } else if b == b']' {
                squares_closed += 1;
            } else if b == b'{' {
                braces_opened += 1;
                if braces_opened > braces_closed {
                    return i + 1;
                }
            } else if b == b'}' {
                braces_closed += 1;

                if parens_opened == parens_closed && squares_opened == squares_closed {
                    // A brace subscope at balanced nesting is only part
                    // of the expression when it is a `{$var}` dynamic
                    // name; any other `}` means we crossed into an
                    // enclosing statement, such as the end of an if.
                    let preceding = token_index.checked_sub(1).map(|p| tokens[p].kind);
                    if preceding != Some(TokenKind::Variable) {
                        return i + 1;
                    }
                }
            } else if parens_opened == parens_closed
                && squares_opened == squares_closed
                && braces_opened == braces_closed
            {
                if kind.is_expression_boundary(self.version)
                    || (kind == TokenKind::Punctuation && BOUNDARY_BYTES.contains(&b))
                    || (b == b':' && kind != TokenKind::DoubleColon)
                {
                    return i + 1;
                } else if kind == TokenKind::DoubleColon {
                    // Static class names (including self and parent) sit
                    // at the start of a call stack, so once a `::` has
                    // been crossed only name-ish tokens may continue it.
                    in_static_name = true;
                }
            }

            if in_static_name && !kind.may_continue_static_name() {
                return i + 1;
            }
        }

        0
    }
}
