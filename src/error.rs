//! Error types for the calculus kernel
//!
//! Only caller misuse and genuinely impossible requests are errors. Anything the
//! kernel cannot reduce (an undefined function, a declined derivative) degrades to an
//! unevaluated node instead.

use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, CalculusError>;

/// Errors raised by construction, differentiation, application and expansion
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculusError {
    /// A function was applied to the wrong number of arguments
    #[error("{name}() takes {expected} argument(s) ({got} given)")]
    Arity {
        name: String,
        expected: String,
        got: usize,
    },

    /// A lambda was applied to the wrong number of arguments
    #[error("lambda takes exactly {expected} argument(s) ({got} given)")]
    LambdaArity { expected: usize, got: usize },

    /// Differentiation variable is not a symbol, function application or derivative
    #[error("cannot differentiate with respect to {0}")]
    InvalidDifferentiationVariable(String),

    /// Malformed list of differentiation specifications
    #[error("invalid differentiation specification: {0}")]
    InvalidDiffSpec(String),

    #[error("Subs: {variables} variable(s) but {points} point value(s)")]
    SubsLengthMismatch { variables: usize, points: usize },

    /// A binder list repeats a variable
    #[error("variable {0} appears more than once")]
    DuplicateVariable(String),

    /// Lambda parameters must be symbols
    #[error("lambda parameter must be a symbol, got {0}")]
    InvalidParameter(String),

    /// Series expansion hit a non-removable singularity
    #[error("pole in {expr} at {var} = {point}")]
    Pole {
        expr: String,
        var: String,
        point: String,
    },

    /// Expression has no numeric value (free symbols, undefined functions, ...)
    #[error("cannot evaluate numerically: {0}")]
    NotNumeric(String),

    #[error("expression exceeds maximum depth")]
    MaxDepthExceeded,

    #[error("expression exceeds maximum node count")]
    MaxNodesExceeded,

    /// Application of something that is not a lambda
    #[error("{0} is not callable")]
    NotCallable(String),
}

impl CalculusError {
    /// Errors that correspond to malformed values (bad `Subs`/`Lambda` lists, bad specs)
    pub fn is_value_error(&self) -> bool {
        matches!(
            self,
            Self::SubsLengthMismatch { .. }
                | Self::DuplicateVariable(_)
                | Self::InvalidParameter(_)
                | Self::InvalidDifferentiationVariable(_)
                | Self::InvalidDiffSpec(_)
        )
    }

    /// Errors that correspond to calling something with the wrong signature
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            Self::Arity { .. } | Self::LambdaArity { .. } | Self::NotCallable(_)
        )
    }

    pub(crate) fn arity(name: &str, expected: impl ToString, got: usize) -> Self {
        Self::Arity {
            name: name.to_owned(),
            expected: expected.to_string(),
            got,
        }
    }
}
