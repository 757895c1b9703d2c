use crate::ast::operator::{BinaryOperator, UnaryOperator};
use thiserror::Error;

/// Failure to translate an expression tree into SQL text.
///
/// Each variant names the construct the walk stopped on; a failed
/// translation yields no usable clause.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("the method '{0}' is not supported")]
    UnsupportedMethod(String),

    #[error("the unary operator '{0}' is not supported")]
    UnsupportedUnaryOperator(UnaryOperator),

    #[error("the binary operator '{0}' is not supported")]
    UnsupportedBinaryOperator(BinaryOperator),

    #[error("the constant '{0}' is not supported")]
    UnsupportedConstant(String),

    #[error("the member '{0}' is not supported")]
    UnsupportedMember(String),
}

pub type Result<T> = std::result::Result<T, TranslateError>;
