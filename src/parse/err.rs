use thiserror::Error;

#[derive(Error, Clone, Debug, PartialEq)]
pub enum ParseError {
    #[error("Expected an array with at least one element")]
    EmptyExpression,
    #[error("Expression name must be a string, but found {0} instead")]
    NonStringOp(&'static str),
    #[error("Unknown function {0}")]
    UnknownFunction(String),
    #[error("Expected a JSON array or primitive, but found {0} instead")]
    UnexpectedJson(&'static str),
    #[error("Match inputs must be literal primitive values or arrays of literal primitive values.")]
    NonLiteralMatchInput,
    #[error("Match input groups must contain at least one value")]
    EmptyMatchGroup,
    #[error("Expected an odd number of elements: an input, label/output pairs, and a default output")]
    MalformedMatch,
}

/// Rough kind of a JSON value, for error text.
pub fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value::*;
    match value {
        Null => "null",
        Bool(_) => "boolean",
        Number(_) => "number",
        String(_) => "string",
        Array(_) => "array",
        Object(_) => "object",
    }
}
