//! Error types for parsing and evaluating filter expressions.

use thiserror::Error;

/// Errors that can occur while parsing, binding or evaluating a filter expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Malformed filter text
    #[error("Syntax error: {message}")]
    Syntax { message: String },

    /// Operator or function applied to incompatible value types
    #[error("Type error: {0}")]
    Type(String),

    /// Unknown table, unknown column or missing identifier field
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// Text could not be converted to the requested type
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Integer or decimal division by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Wrong number of function arguments
    #[error("Function {function} expects {expected} arguments, got {actual}")]
    FunctionArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Generic evaluation error
    #[error("Expression evaluation error: {0}")]
    Evaluation(String),
}

impl FilterError {
    pub fn syntax(message: impl Into<String>) -> Self {
        FilterError::Syntax {
            message: message.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        FilterError::Type(message.into())
    }

    pub fn resolution(message: impl Into<String>) -> Self {
        FilterError::Resolution(message.into())
    }

    pub fn conversion(message: impl Into<String>) -> Self {
        FilterError::Conversion(message.into())
    }

    pub fn evaluation(message: impl Into<String>) -> Self {
        FilterError::Evaluation(message.into())
    }
}

/// Result type for filter expression operations
pub type Result<T> = std::result::Result<T, FilterError>;
