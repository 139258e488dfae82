//! Hand-rolled PHP lexer used by the backward scanners and the strict
//! expression parser.
//!
//! The lexer is total: every byte of the input belongs to exactly one
//! token, in source order. That property is what lets the boundary and
//! invocation scanners walk the input byte by byte while consulting the
//! kind of the token that owns the current byte.

/// PHP grammar version, used to gate which token kinds count as
/// expression boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PhpVersion {
    Php54,
    Php55,
    Php56,
    Php70,
}

impl PhpVersion {
    pub const LATEST: PhpVersion = PhpVersion::Php70;
}

impl Default for PhpVersion {
    fn default() -> Self {
        PhpVersion::LATEST
    }
}

/// Alphabetic keywords that the lexer recognizes (case-insensitively).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Abstract,
    As,
    Break,
    Callable,
    Case,
    Catch,
    Class,
    Clone,
    Const,
    Continue,
    Declare,
    Default,
    Do,
    Echo,
    Else,
    Elseif,
    Enddeclare,
    Endfor,
    Endforeach,
    Endif,
    Endswitch,
    Endwhile,
    Exit,
    Extends,
    Final,
    Finally,
    For,
    Foreach,
    Function,
    Global,
    Goto,
    If,
    Implements,
    Include,
    IncludeOnce,
    Instanceof,
    Insteadof,
    Interface,
    LogicalAnd,
    LogicalOr,
    LogicalXor,
    Namespace,
    New,
    Print,
    Private,
    Protected,
    Public,
    Require,
    RequireOnce,
    Return,
    Static,
    Switch,
    Throw,
    Trait,
    Try,
    Use,
    Var,
    While,
    Yield,
}

fn keyword_from(lower: &str) -> Option<Keyword> {
    use Keyword::*;

    Some(match lower {
        "abstract" => Abstract,
        "as" => As,
        "break" => Break,
        "callable" => Callable,
        "case" => Case,
        "catch" => Catch,
        "class" => Class,
        "clone" => Clone,
        "const" => Const,
        "continue" => Continue,
        "declare" => Declare,
        "default" => Default,
        "do" => Do,
        "echo" => Echo,
        "else" => Else,
        "elseif" => Elseif,
        "enddeclare" => Enddeclare,
        "endfor" => Endfor,
        "endforeach" => Endforeach,
        "endif" => Endif,
        "endswitch" => Endswitch,
        "endwhile" => Endwhile,
        "exit" | "die" => Exit,
        "extends" => Extends,
        "final" => Final,
        "finally" => Finally,
        "for" => For,
        "foreach" => Foreach,
        "function" => Function,
        "global" => Global,
        "goto" => Goto,
        "if" => If,
        "implements" => Implements,
        "include" => Include,
        "include_once" => IncludeOnce,
        "instanceof" => Instanceof,
        "insteadof" => Insteadof,
        "interface" => Interface,
        "and" => LogicalAnd,
        "or" => LogicalOr,
        "xor" => LogicalXor,
        "namespace" => Namespace,
        "new" => New,
        "print" => Print,
        "private" => Private,
        "protected" => Protected,
        "public" => Public,
        "require" => Require,
        "require_once" => RequireOnce,
        "return" => Return,
        "static" => Static,
        "switch" => Switch,
        "throw" => Throw,
        "trait" => Trait,
        "try" => Try,
        "use" => Use,
        "var" => Var,
        "while" => While,
        "yield" => Yield,
        _ => return None,
    })
}

/// Closed token-kind enumeration. Category membership (skippable, cast,
/// expression boundary) is tested through the methods below rather than
/// through string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    OpenTag,
    CloseTag,
    Whitespace,
    LineComment,
    BlockComment,
    DocComment,
    Variable,
    Identifier,
    Number,
    StringLiteral,
    Keyword(Keyword),
    /// A full type cast such as `(int)` or `(array)`, lexed as one token.
    Cast,
    NamespaceSeparator,
    Arrow,
    NullsafeArrow,
    DoubleColon,
    DoubleArrow,
    Inc,
    Dec,
    Pow,
    Ellipsis,
    Coalesce,
    Spaceship,
    Equal,
    NotEqual,
    Identical,
    NotIdentical,
    LessEqual,
    GreaterEqual,
    BooleanAnd,
    BooleanOr,
    ShiftLeft,
    ShiftRight,
    PlusAssign,
    MinusAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    ConcatAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShiftLeftAssign,
    ShiftRightAssign,
    PowAssign,
    /// Any remaining single byte: `;`, `(`, `+`, `:`, ...
    Punctuation,
}

impl TokenKind {
    /// Tokens the backward scanners pass through without interpreting:
    /// comments, string literals (heredocs included) and identifiers.
    /// These occur freely inside call stacks.
    pub fn is_skippable(self) -> bool {
        matches!(
            self,
            TokenKind::LineComment
                | TokenKind::BlockComment
                | TokenKind::DocComment
                | TokenKind::StringLiteral
                | TokenKind::Identifier
        )
    }

    /// Token kinds that may keep a `Foo::...` static name going when the
    /// boundary scan has already crossed a `::`.
    pub fn may_continue_static_name(self) -> bool {
        matches!(
            self,
            TokenKind::DoubleColon
                | TokenKind::Identifier
                | TokenKind::NamespaceSeparator
                | TokenKind::Keyword(Keyword::Static)
        )
    }

    /// Whether this token kind terminates a trailing expression when it
    /// is met at balanced nesting during the backward boundary scan.
    /// Note that `static` and `::` are deliberately not boundaries.
    pub fn is_expression_boundary(self, version: PhpVersion) -> bool {
        use Keyword::*;

        match self {
            TokenKind::Keyword(keyword) => match keyword {
                Abstract | As | Break | Callable | Case | Catch | Clone | Const | Continue
                | Declare | Default | Do | Echo | Else | Elseif | Enddeclare | Endfor
                | Endforeach | Endif | Endswitch | Endwhile | Exit | Extends | Final | For
                | Foreach | Function | Global | Goto | If | Implements | Include
                | IncludeOnce | Instanceof | Insteadof | Interface | LogicalAnd | LogicalOr
                | LogicalXor | Namespace | New | Print | Private | Protected | Public
                | Require | RequireOnce | Return | Switch | Throw | Trait | Try | Use | Var
                | While => true,
                Finally | Yield => version >= PhpVersion::Php55,
                Class | Static => false,
            },
            TokenKind::OpenTag
            | TokenKind::CloseTag
            | TokenKind::DoubleArrow
            | TokenKind::Inc
            | TokenKind::Dec
            | TokenKind::Equal
            | TokenKind::NotEqual
            | TokenKind::Identical
            | TokenKind::NotIdentical
            | TokenKind::LessEqual
            | TokenKind::GreaterEqual
            | TokenKind::BooleanAnd
            | TokenKind::BooleanOr
            | TokenKind::ShiftLeft
            | TokenKind::ShiftRight
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
            | TokenKind::ShiftRightAssign => true,
            TokenKind::Ellipsis | TokenKind::Pow | TokenKind::PowAssign => {
                version >= PhpVersion::Php56
            }
            TokenKind::Spaceship | TokenKind::Coalesce => version >= PhpVersion::Php70,
            _ => false,
        }
    }
}

/// A lexed token; offsets are byte positions into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn text<'a>(&self, code: &'a str) -> &'a str {
        &code[self.start..self.end]
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

const CAST_NAMES: &[&str] = &[
    "int", "integer", "bool", "boolean", "float", "double", "real", "string", "binary", "array",
    "object", "unset",
];

struct Lexer<'a> {
    code: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(code: &'a str) -> Self {
        Lexer {
            code,
            bytes: code.as_bytes(),
            pos: 0,
        }
    }

    fn rest(&self) -> &'a str {
        &self.code[self.pos..]
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn next_token(&mut self) -> Option<Token> {
        let start = self.pos;
        let b = *self.bytes.get(self.pos)?;

        let kind = if self.rest().starts_with("<?php") {
            self.pos += 5;
            TokenKind::OpenTag
        } else if self.rest().starts_with("<?=") {
            self.pos += 3;
            TokenKind::OpenTag
        } else if b.is_ascii_whitespace() {
            while self.peek(0).is_some_and(|b| b.is_ascii_whitespace()) {
                self.pos += 1;
            }
            TokenKind::Whitespace
        } else if self.rest().starts_with("//") || b == b'#' {
            self.consume_line_comment()
        } else if self.rest().starts_with("/*") {
            self.consume_block_comment()
        } else if b == b'\'' || b == b'"' || b == b'`' {
            self.consume_quoted_string(b)
        } else if self.rest().starts_with("<<<") {
            self.consume_heredoc()
        } else if b == b'$' && self.peek(1).is_some_and(is_ident_start) {
            self.pos += 1;
            while self.peek(0).is_some_and(is_ident_byte) {
                self.pos += 1;
            }
            TokenKind::Variable
        } else if b.is_ascii_digit() || (b == b'.' && self.peek(1).is_some_and(|c| c.is_ascii_digit()))
        {
            self.consume_number()
        } else if is_ident_start(b) {
            while self.peek(0).is_some_and(is_ident_byte) {
                self.pos += 1;
            }
            let word = self.code[start..self.pos].to_ascii_lowercase();
            match keyword_from(&word) {
                Some(keyword) => TokenKind::Keyword(keyword),
                None => TokenKind::Identifier,
            }
        } else if b == b'(' && let Some(end) = self.cast_end() {
            self.pos = end;
            TokenKind::Cast
        } else {
            self.consume_operator()
        };

        Some(Token {
            kind,
            start,
            end: self.pos,
        })
    }

    fn consume_line_comment(&mut self) -> TokenKind {
        while let Some(b) = self.peek(0) {
            if b == b'\n' {
                break;
            }
            self.pos += 1;
        }
        TokenKind::LineComment
    }

    fn consume_block_comment(&mut self) -> TokenKind {
        let doc = self.rest().starts_with("/**") && !self.rest().starts_with("/**/");
        self.pos += 2;
        match self.rest().find("*/") {
            Some(at) => self.pos += at + 2,
            None => self.pos = self.code.len(),
        }
        if doc {
            TokenKind::DocComment
        } else {
            TokenKind::BlockComment
        }
    }

    fn consume_quoted_string(&mut self, quote: u8) -> TokenKind {
        self.pos += 1;
        while let Some(b) = self.peek(0) {
            self.pos += 1;
            if b == b'\\' {
                // Covers double-quote escapes as well as the \' and \\
                // forms allowed in single-quoted strings.
                self.pos += 1;
            } else if b == quote {
                break;
            }
        }
        self.pos = self.pos.min(self.code.len());
        TokenKind::StringLiteral
    }

    /// Heredoc and nowdoc bodies. The token runs through the terminating
    /// label; a label that is not followed by a newline on its line does
    /// not terminate the body, which is what makes `;\n` (rather than a
    /// bare `;`) the correction that completes a dangling heredoc.
    fn consume_heredoc(&mut self) -> TokenKind {
        self.pos += 3;
        while self.peek(0) == Some(b' ') || self.peek(0) == Some(b'\t') {
            self.pos += 1;
        }
        let quote = match self.peek(0) {
            Some(q @ (b'\'' | b'"')) => {
                self.pos += 1;
                Some(q)
            }
            _ => None,
        };
        let label_start = self.pos;
        while self.peek(0).is_some_and(is_ident_byte) {
            self.pos += 1;
        }
        let label = self.code[label_start..self.pos].to_string();
        if let Some(q) = quote
            && self.peek(0) == Some(q)
        {
            self.pos += 1;
        }
        if label.is_empty() {
            return TokenKind::StringLiteral;
        }

        // Skip to the start of the body.
        while let Some(b) = self.peek(0) {
            self.pos += 1;
            if b == b'\n' {
                break;
            }
        }

        let mut line_start = self.pos;
        for offset in memchr::memchr_iter(b'\n', &self.bytes[self.pos..]) {
            let line_end = self.pos + offset;
            if let Some(end) = terminator_end(&self.code[line_start..line_end], &label) {
                self.pos = line_start + end;
                return TokenKind::StringLiteral;
            }
            line_start = line_end + 1;
        }

        // Unterminated: the body swallows the rest of the input.
        self.pos = self.code.len();
        TokenKind::StringLiteral
    }

    fn consume_number(&mut self) -> TokenKind {
        if self.rest().starts_with("0x") || self.rest().starts_with("0X") {
            self.pos += 2;
            while self.peek(0).is_some_and(|b| b.is_ascii_hexdigit()) {
                self.pos += 1;
            }
            return TokenKind::Number;
        }
        while self.peek(0).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.peek(0) == Some(b'.') && self.peek(1).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
            while self.peek(0).is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(0), Some(b'e' | b'E')) {
            let mut ahead = 1;
            if matches!(self.peek(1), Some(b'+' | b'-')) {
                ahead = 2;
            }
            if self.peek(ahead).is_some_and(|b| b.is_ascii_digit()) {
                self.pos += ahead;
                while self.peek(0).is_some_and(|b| b.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
        }
        TokenKind::Number
    }

    /// Detects a cast at the current `(`; returns the position just past
    /// the closing parenthesis when the parenthesized word is one of the
    /// cast type names.
    fn cast_end(&self) -> Option<usize> {
        let mut at = self.pos + 1;
        while matches!(self.bytes.get(at), Some(b' ' | b'\t')) {
            at += 1;
        }
        let word_start = at;
        while self.bytes.get(at).copied().is_some_and(|b| b.is_ascii_alphabetic()) {
            at += 1;
        }
        let word = self.code[word_start..at].to_ascii_lowercase();
        while matches!(self.bytes.get(at), Some(b' ' | b'\t')) {
            at += 1;
        }
        if self.bytes.get(at) == Some(&b')') && CAST_NAMES.contains(&word.as_str()) {
            Some(at + 1)
        } else {
            None
        }
    }

    fn consume_operator(&mut self) -> TokenKind {
        const TABLE: &[(&str, TokenKind)] = &[
            ("===", TokenKind::Identical),
            ("!==", TokenKind::NotIdentical),
            ("<=>", TokenKind::Spaceship),
            ("**=", TokenKind::PowAssign),
            ("<<=", TokenKind::ShiftLeftAssign),
            (">>=", TokenKind::ShiftRightAssign),
            ("...", TokenKind::Ellipsis),
            ("?->", TokenKind::NullsafeArrow),
            ("==", TokenKind::Equal),
            ("!=", TokenKind::NotEqual),
            ("<>", TokenKind::NotEqual),
            ("<=", TokenKind::LessEqual),
            (">=", TokenKind::GreaterEqual),
            ("&&", TokenKind::BooleanAnd),
            ("||", TokenKind::BooleanOr),
            ("++", TokenKind::Inc),
            ("--", TokenKind::Dec),
            ("+=", TokenKind::PlusAssign),
            ("-=", TokenKind::MinusAssign),
            ("*=", TokenKind::MulAssign),
            ("/=", TokenKind::DivAssign),
            (".=", TokenKind::ConcatAssign),
            ("%=", TokenKind::ModAssign),
            ("&=", TokenKind::AndAssign),
            ("|=", TokenKind::OrAssign),
            ("^=", TokenKind::XorAssign),
            ("=>", TokenKind::DoubleArrow),
            ("->", TokenKind::Arrow),
            ("::", TokenKind::DoubleColon),
            ("<<", TokenKind::ShiftLeft),
            (">>", TokenKind::ShiftRight),
            ("**", TokenKind::Pow),
            ("??", TokenKind::Coalesce),
            ("?>", TokenKind::CloseTag),
        ];

        for (text, kind) in TABLE {
            if self.rest().starts_with(text) {
                self.pos += text.len();
                return *kind;
            }
        }
        let kind = if self.bytes[self.pos] == b'\\' {
            TokenKind::NamespaceSeparator
        } else {
            TokenKind::Punctuation
        };
        // Advance a full UTF-8 scalar so the token stream stays aligned
        // with character boundaries.
        self.pos += 1;
        while self.pos < self.bytes.len() && (self.bytes[self.pos] & 0xc0) == 0x80 {
            self.pos += 1;
        }
        kind
    }
}

fn terminator_end(line: &str, label: &str) -> Option<usize> {
    let trimmed_len = line.len() - line.trim_start_matches([' ', '\t']).len();
    let rest = &line[trimmed_len..];
    if !rest.starts_with(label) {
        return None;
    }
    let after = &rest[label.len()..];
    if after.bytes().next().is_some_and(is_ident_byte) {
        return None;
    }
    if after
        .bytes()
        .all(|b| matches!(b, b';' | b',' | b')' | b'.' | b' ' | b'\t' | b'\r'))
    {
        Some(trimmed_len + label.len())
    } else {
        None
    }
}

/// Lexes PHP source into a contiguous token stream covering every byte.
pub fn tokenize(code: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(code);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token() {
        tokens.push(token);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(code: &str) -> Vec<TokenKind> {
        tokenize(code).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokens_cover_every_byte() {
        let code = "<?php $a = foo(1, 'two') . \"three $x\"; // done";
        let tokens = tokenize(code);
        let mut at = 0;
        for token in &tokens {
            assert_eq!(token.start, at, "token stream has a gap at {at}");
            at = token.end;
        }
        assert_eq!(at, code.len());
    }

    #[test]
    fn casts_lex_as_single_tokens() {
        let tokens = tokenize("(int) $x");
        assert_eq!(tokens[0].kind, TokenKind::Cast);
        assert_eq!(tokens[0].end, 5);
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(kinds("NEW")[0], TokenKind::Keyword(Keyword::New));
        assert_eq!(kinds("Die")[0], TokenKind::Keyword(Keyword::Exit));
    }

    #[test]
    fn nullsafe_arrow_wins_over_ternary_parts() {
        assert_eq!(kinds("$a?->b")[1], TokenKind::NullsafeArrow);
    }

    #[test]
    fn heredoc_requires_newline_after_terminator() {
        let unterminated = tokenize("<<<EOT\nbody\nEOT");
        assert_eq!(unterminated.len(), 1);
        assert_eq!(unterminated[0].kind, TokenKind::StringLiteral);
        assert_eq!(unterminated[0].end, "<<<EOT\nbody\nEOT".len());

        let terminated = tokenize("<<<EOT\nbody\nEOT;\n");
        assert_eq!(terminated[0].kind, TokenKind::StringLiteral);
        assert_eq!(terminated[0].end, "<<<EOT\nbody\nEOT".len());
        assert!(terminated.len() > 1, "terminator tail should lex separately");
    }

    #[test]
    fn version_gates_expression_boundaries() {
        assert!(TokenKind::Spaceship.is_expression_boundary(PhpVersion::Php70));
        assert!(!TokenKind::Spaceship.is_expression_boundary(PhpVersion::Php56));
        assert!(TokenKind::Ellipsis.is_expression_boundary(PhpVersion::Php56));
        assert!(!TokenKind::Ellipsis.is_expression_boundary(PhpVersion::Php55));
        assert!(!TokenKind::Keyword(Keyword::Yield).is_expression_boundary(PhpVersion::Php54));
        assert!(!TokenKind::DoubleColon.is_expression_boundary(PhpVersion::Php70));
        assert!(!TokenKind::Keyword(Keyword::Static).is_expression_boundary(PhpVersion::Php70));
    }
}
