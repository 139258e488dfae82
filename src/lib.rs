//! Semantic backend for PHP editor tooling.
//!
//! The crate has two halves. [`PartialParser`] deals with source the user
//! is still typing: it finds where the trailing expression starts, recovers
//! a single AST node from the incomplete fragment and derives call-tip
//! information for the innermost open invocation. The snapshot half parses
//! whole files into per-classlike [`types::ClasslikeSnapshot`] values and
//! flattens inheritance hierarchies into them via [`inheritance`].

pub mod ast;
mod boundary;
pub mod docblock;
mod error;
pub mod inheritance;
mod invocation;
mod recovery;
pub mod snapshot;
mod strict;
pub mod token;
pub mod types;

pub use ast::{ArrayItem, MemberName, Node, NodeKind, Span};
pub use error::Error;
pub use invocation::{InvocationInfo, InvocationKind};
pub use token::PhpVersion;

/// Parses partial (incomplete) PHP code.
///
/// Incomplete expressions such as `$this->` are erroneous to a strict
/// parser, yet an editor needs a node for them to answer "what is being
/// accessed here". The parser recovers such fragments through a bounded
/// chain of source corrections; see [`PartialParser::parse`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialParser {
    version: PhpVersion,
}

impl PartialParser {
    pub fn new(version: PhpVersion) -> Self {
        PartialParser { version }
    }

    pub fn version(&self) -> PhpVersion {
        self.version
    }
}
