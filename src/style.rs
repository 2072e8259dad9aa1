//! The stage-by-stage pipeline behind the one-call surface:
//! `raw json → parse → typecheck → compile → callable`.

use crate::dynamics::eval::Compile;
use crate::dynamics::syntax::{Compiled, EvalContext, EvalError, Feature, RtValue};
use crate::parse;
use crate::statics::tyck::TypeCheck;
use crate::syntax::Expr;
use crate::types::Type;
use crate::utils::key::Keyed;
use serde_json::Value;
use std::fmt::{self, Display};

/// A static error: the dot-joined JSON path of the offending node plus a
/// rendered message. Parse, typecheck, and registry-compile errors all
/// surface in this shape.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub key: String,
    pub error: String,
}

impl<T: Display> From<Keyed<T>> for Diagnostic {
    fn from(keyed: Keyed<T>) -> Self {
        Diagnostic { key: keyed.key.to_string(), error: keyed.item.to_string() }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.error)
    }
}

pub fn parse_expr(json: &Value) -> Result<Expr, Diagnostic> {
    parse::parse(json).map_err(Diagnostic::from)
}

pub fn typecheck_expr(expected: &Type, expr: &Expr) -> Result<Expr, Vec<Diagnostic>> {
    expr.check(expected)
        .map_err(|errors| errors.into_iter().map(Diagnostic::from).collect())
}

/// A successfully compiled expression, ready to evaluate against any
/// `(zoom, feature)` pair. Holds no mutable state.
pub struct CompiledExpr {
    compiled: Compiled,
    pub is_feature_constant: bool,
    pub is_zoom_constant: bool,
    pub expr: Expr,
    pub ty: Type,
}

impl CompiledExpr {
    /// Evaluate at a zoom level against a feature. A runtime result of null
    /// is reported as `None`; runtime failures propagate as errors.
    pub fn call(&self, zoom: f64, feature: &Feature) -> Result<Option<Value>, EvalError> {
        let ctx = EvalContext { zoom, feature };
        match (self.compiled.node)(&ctx)? {
            RtValue::Null => Ok(None),
            value => Ok(Some(value.to_json())),
        }
    }
}

/// Run the full pipeline. With no expected type, a call is checked against
/// its own declared signature, so expressions whose result type can only
/// come from context must be wrapped in a type conversion.
pub fn compile(json: &Value, expected: Option<Type>) -> Result<CompiledExpr, Vec<Diagnostic>> {
    let parsed = parse_expr(json).map_err(|d| vec![d])?;
    let expected = expected.unwrap_or_else(|| match &parsed {
        Expr::Call(call) => Type::Lambda(call.ty.clone()),
        Expr::Literal(lit) => lit.ty.clone(),
    });
    let checked = typecheck_expr(&expected, &parsed)?;
    let compiled = checked
        .compile()
        .map_err(|errors| errors.into_iter().map(Diagnostic::from).collect::<Vec<_>>())?;
    Ok(CompiledExpr {
        is_feature_constant: compiled.feature_constant,
        is_zoom_constant: compiled.zoom_constant,
        ty: checked.result_type(),
        expr: checked,
        compiled,
    })
}
