use crate::types::Type;
use thiserror::Error;

#[derive(Error, Clone, Debug, PartialEq)]
pub enum TyckError {
    #[error("Expected {expected} but found {found}.")]
    Mismatch { expected: Type, found: Type },
    #[error("Expected {expected} arguments, but found {found} instead.")]
    ArityMismatch { expected: usize, found: usize },
    #[error("Could not resolve {name}. This expression must be wrapped in a type conversion, e.g. [\"string\", ...].")]
    Unresolved { name: &'static str },
}
