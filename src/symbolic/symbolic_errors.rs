//! Error type shared by the factor, term and fraction layers.
//!
//! Parsing failures carry the offending piece of text so the caller can show it to the user.
//! Algebraic failures (division, rearrangement) are plain variants: the caller decides whether
//! to fall back or to report them.
use std::fmt;

/// Errors produced by the symbolic algebra engine
#[derive(Debug, Clone, PartialEq)]
pub enum AlgexError {
    /// malformed token sequence (operator with no operand, bad literal, empty input...)
    Syntax(String),
    /// power literal too large, or exponents that combine past the supported range
    Overflow(String),
    /// more '(' than ')' or the other way round
    UnbalancedParens(String),
    /// identifier uses the `_` prefix reserved for engine temporaries
    ReservedPrefix(String),
    /// one element of a comma separated list failed to parse
    BadListElement {
        index: usize,
        text: String,
        cause: Box<AlgexError>,
    },
    /// a list element is itself a comma list
    NestedList { index: usize, text: String },
    /// polynomial long division left something that is not an exact quotient
    NoExactDivision,
    /// expression has no term with positive order
    NoLeadingTerm,
    /// rearrangement found nothing it can isolate
    NoAnswer,
    /// two calls of the same function tie as the most complex term
    AmbiguousFunction,
    /// a fraction ended up with a zero denominator
    ZeroDenominator(String),
    /// substitution did not reach a fixed point
    Diverged { rounds: usize },
}

impl AlgexError {
    /// true for every variant that comes out of text parsing
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            AlgexError::Syntax(_)
                | AlgexError::Overflow(_)
                | AlgexError::UnbalancedParens(_)
                | AlgexError::ReservedPrefix(_)
                | AlgexError::BadListElement { .. }
                | AlgexError::NestedList { .. }
        )
    }
}

impl fmt::Display for AlgexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AlgexError::Syntax(text) => write!(f, "syntax problem in {:?}", text),
            AlgexError::Overflow(text) => write!(f, "exponent out of range in {:?}", text),
            AlgexError::UnbalancedParens(msg) => write!(f, "parsing error {}", msg),
            AlgexError::ReservedPrefix(text) => {
                write!(f, "invalid identifier {:?}: \"_\" prefix is reserved", text)
            }
            AlgexError::BadListElement { index, text, cause } => {
                write!(f, "list element[{}] = {:?}: {}", index, text, cause)
            }
            AlgexError::NestedList { index, text } => {
                write!(f, "unexpected sub-comma list element[{}]: {:?}", index, text)
            }
            AlgexError::NoExactDivision => write!(f, "no exact division"),
            AlgexError::NoLeadingTerm => write!(f, "no leading term"),
            AlgexError::NoAnswer => write!(f, "no valid answer"),
            AlgexError::AmbiguousFunction => write!(f, "ambiguous function"),
            AlgexError::ZeroDenominator(text) => write!(f, "zero denominator in {}", text),
            AlgexError::Diverged { rounds } => {
                write!(f, "substitution did not settle after {} rounds", rounds)
            }
        }
    }
}

impl std::error::Error for AlgexError {}
