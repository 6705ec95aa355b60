//! Error types shared by the grammar engine and the turtle interpreter.

use crate::token::Token;
use thiserror::Error;

/// Everything that can go wrong while growing a grape cluster.
///
/// All variants are fatal for the current run. The one recoverable
/// condition (an unmatched `]`) is reported through
/// [`Interpretation::unmatched_pops`](crate::Interpretation::unmatched_pops) instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GrapeError {
    /// The symbol string could not be tokenized.
    #[error("Parse error at byte {offset}: {message}")]
    Parse { offset: usize, message: String },

    /// A parameter list contained something that is not a number.
    #[error("Invalid number '{text}' at byte {offset}")]
    InvalidNumber { offset: usize, text: String },

    /// A production received the wrong number of parameters.
    #[error("Rule '{symbol}' expects {expected} parameter(s), got {found}")]
    Arity {
        symbol: String,
        expected: usize,
        found: usize,
    },

    /// A non-terminal has no production registered in the grammar.
    #[error("No production registered for '{0}'")]
    UnknownRule(String),

    /// The rule constants are inconsistent (e.g. child-count table too short).
    #[error("Grammar configuration error: {0}")]
    Config(String),

    /// A non-terminal survived the final rewriting pass.
    #[error("Unreduced non-terminal '{token}' at token {index}")]
    Unreduced { index: usize, token: Token },

    /// Branch nesting exceeded the configured limit.
    #[error("Branch stack overflow at token {index}: depth limit {limit}")]
    StackOverflow { index: usize, limit: usize },
}

/// Result type for grape generation.
pub type GrapeResult<T> = Result<T, GrapeError>;

impl GrapeError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a parse error at `offset`.
    pub fn parse(offset: usize, msg: impl Into<String>) -> Self {
        Self::Parse {
            offset,
            message: msg.into(),
        }
    }

    /// Create an arity error for `symbol`.
    pub fn arity(symbol: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::Arity {
            symbol: symbol.into(),
            expected,
            found,
        }
    }
}
