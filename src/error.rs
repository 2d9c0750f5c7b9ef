//! Errors reported while compiling or matching a pattern.

use thiserror::Error;

/// An error produced by [`crate::Regex`] and the [`crate::api`] functions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No pattern was given.
    #[error("null pattern")]
    NullPattern,

    /// The pattern is not well formed.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// Memory for the program or the thread lists could not be reserved.
    #[error("out of memory")]
    OutOfMemory,

    /// The compiled program would exceed the configured size limit.
    #[error("compiled program too large ({size} instructions, limit is {limit})")]
    TooLarge { size: usize, limit: usize },

    /// The code generator disagreed with itself. This is a bug in the
    /// engine, never in the pattern.
    #[error("internal compiler error: {0}")]
    InternalCompiler(String),
}

/// A syntax error together with the byte offset in the pattern where it
/// was detected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("syntax error at offset {offset}: {kind}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub offset: usize,
}

impl SyntaxError {
    pub(crate) fn new(kind: SyntaxErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    #[error("trailing backslash")]
    DanglingEscape,

    #[error("unexpected character {0:?} in repetition")]
    InvalidRepetitionChar(char),

    #[error("unexpected {0}")]
    Unexpected(&'static str),

    #[error("unclosed character class")]
    UnclosedBracket,

    #[error("unclosed group")]
    UnclosedParen,

    #[error("unopened group")]
    UnopenedParen,

    #[error("unclosed repetition")]
    UnclosedBrace,

    #[error("repetition operator without operand")]
    MissingOperand,

    #[error("invalid class range {0:?}-{1:?}")]
    InvalidRange(char, char),

    #[error("empty repetition")]
    EmptyRepetition,

    #[error("invalid repetition {{{0},{1}}}")]
    InvalidRepetition(u32, u32),

    #[error("repetition count exceeds {0}")]
    RepetitionTooLarge(u32),

    #[error("group nesting exceeds {0}")]
    NestTooDeep(u32),
}
