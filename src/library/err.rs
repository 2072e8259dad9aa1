use thiserror::Error;

/// Static errors raised by registry compile rules, after type checking but
/// before any evaluation.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum CompileError {
    #[error("Input/output pairs for \"curve\" expressions must be defined using literal numeric values (not computed expressions) for the input values.")]
    NonNumericCurveStop,
    #[error("\"curve\" expressions require at least one input/output pair.")]
    MissingCurveStops,
    #[error("Input/output pairs for \"curve\" expressions must be arranged with input values in strictly ascending order.")]
    NonAscendingCurveStops,
    #[error("Type {0} is not interpolatable; \"curve\" expressions with this output type must use the \"step\" interpolation.")]
    NonInterpolatableCurveOutput(String),
    #[error("The base of an \"exponential\" interpolation must be a literal number value.")]
    NonLiteralExponentialBase,
    #[error("Expected an interpolation type expression as the first argument to \"curve\".")]
    InvalidInterpolation,
    #[error("Expected {expected} arguments for \"match\", but found {found} instead.")]
    MatchArityMismatch { expected: usize, found: usize },
}
