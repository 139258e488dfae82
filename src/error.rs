use thiserror::Error;

/// Failures surfaced by the partial parser and the invocation extractor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No single expression node could be recovered from the fragment,
    /// even after exhausting the fallback chain.
    #[error("could not recover an expression from fragment `{fragment}`")]
    MalformedFragment { fragment: String },

    /// The callee of an open invocation has a shape we cannot derive a
    /// name from (e.g. the result of a binary or ternary expression).
    #[error("no naming rule for callee expression `{expression}`")]
    UnsupportedConstruct { expression: String },
}
