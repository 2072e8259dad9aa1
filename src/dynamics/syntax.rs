use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt::{self, Display};
use std::sync::Arc;
use thiserror::Error;

/* ------------------------------ Runtime values ----------------------------- */

/// Evaluation-time values. Scalars stay untagged; compound values carry the
/// tag consulted by `typeof` and by `match` lookup keys.
#[derive(Clone, Debug, PartialEq)]
pub enum RtValue {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    /// `[r, g, b, a]`, channels 0–255 and alpha 0–1.
    Color([f64; 4]),
    Object(Map<String, Value>),
    Items { tag: String, items: Vec<RtValue> },
}

impl RtValue {
    pub fn type_of(&self) -> String {
        match self {
            RtValue::Null => "Null".to_string(),
            RtValue::Boolean(_) => "Boolean".to_string(),
            RtValue::Number(_) => "Number".to_string(),
            RtValue::String(_) => "String".to_string(),
            RtValue::Color(_) => "Color".to_string(),
            RtValue::Object(_) => "Object".to_string(),
            RtValue::Items { tag, .. } => tag.clone(),
        }
    }

    /// Convert a JSON value (a feature property, an id) into a runtime
    /// value. Property arrays come in as `Vector<Value>`.
    pub fn from_json(value: &Value) -> RtValue {
        match value {
            Value::Null => RtValue::Null,
            Value::Bool(b) => RtValue::Boolean(*b),
            Value::Number(n) => RtValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => RtValue::String(s.clone()),
            Value::Array(items) => RtValue::Items {
                tag: "Vector<Value>".to_string(),
                items: items.iter().map(RtValue::from_json).collect(),
            },
            Value::Object(map) => RtValue::Object(map.clone()),
        }
    }

    /// Strip the tag for the top-level caller. Colors unwrap to their
    /// `[r, g, b, a]` components.
    pub fn to_json(&self) -> Value {
        match self {
            RtValue::Null => Value::Null,
            RtValue::Boolean(b) => Value::Bool(*b),
            RtValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            RtValue::String(s) => Value::String(s.clone()),
            RtValue::Color(c) => Value::Array(
                c.iter()
                    .map(|v| {
                        serde_json::Number::from_f64(*v)
                            .map(Value::Number)
                            .unwrap_or(Value::Null)
                    })
                    .collect(),
            ),
            RtValue::Object(map) => Value::Object(map.clone()),
            RtValue::Items { items, .. } => {
                Value::Array(items.iter().map(RtValue::to_json).collect())
            }
        }
    }

    pub fn as_number(&self) -> Result<f64, EvalError> {
        match self {
            RtValue::Number(n) => Ok(*n),
            other => Err(assertion("Number", other)),
        }
    }

    pub fn as_string(&self) -> Result<&str, EvalError> {
        match self {
            RtValue::String(s) => Ok(s),
            other => Err(assertion("String", other)),
        }
    }

    pub fn as_boolean(&self) -> Result<bool, EvalError> {
        match self {
            RtValue::Boolean(b) => Ok(*b),
            other => Err(assertion("Boolean", other)),
        }
    }

    pub fn as_color(&self) -> Result<[f64; 4], EvalError> {
        match self {
            RtValue::Color(c) => Ok(*c),
            other => Err(assertion("Color", other)),
        }
    }
}

fn assertion(expected: &str, found: &RtValue) -> EvalError {
    EvalError::TypeAssertion { expected: expected.to_string(), found: found.type_of() }
}

impl Display for RtValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RtValue::Null => f.write_str("null"),
            RtValue::Boolean(b) => write!(f, "{}", b),
            RtValue::Number(n) => write!(f, "{}", n),
            RtValue::String(s) => f.write_str(s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

/* ---------------------------------- Input ---------------------------------- */

/// The data side of an evaluation: one map feature.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub geometry_type: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
}

pub struct EvalContext<'a> {
    pub zoom: f64,
    pub feature: &'a Feature,
}

/* ------------------------------ Compiled nodes ----------------------------- */

/// One compiled node of the evaluator: a closure over the compiled
/// children. Invoking a node is also how a lazy branch is deferred, so
/// `case`/`match`/`coalesce`/`curve` simply hold their children uninvoked.
pub type Node = Arc<dyn Fn(&EvalContext) -> Result<RtValue, EvalError> + Send + Sync>;

#[derive(Clone)]
pub struct Compiled {
    pub node: Node,
    pub feature_constant: bool,
    pub zoom_constant: bool,
}

impl Compiled {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&EvalContext) -> Result<RtValue, EvalError> + Send + Sync + 'static,
    {
        Compiled { node: Arc::new(f), feature_constant: true, zoom_constant: true }
    }

    pub fn constant(value: RtValue) -> Self {
        Compiled::new(move |_| Ok(value.clone()))
    }

    pub fn feature_dependent(mut self) -> Self {
        self.feature_constant = false;
        self
    }

    pub fn zoom_dependent(mut self) -> Self {
        self.zoom_constant = false;
        self
    }
}

/* --------------------------------- Errors ---------------------------------- */

#[derive(Error, Clone, Debug, PartialEq)]
pub enum EvalError {
    #[error("Property \"{0}\" not found")]
    PropertyNotFound(String),
    #[error("Index {index} out of bounds for sequence of length {length}")]
    IndexOutOfBounds { index: f64, length: usize },
    #[error("Expected a value of type {expected}, but found {found} instead")]
    TypeAssertion { expected: String, found: String },
    #[error("Could not parse color from value \"{0}\"")]
    ColorParse(String),
    #[error("Unknown runtime type {0}")]
    UnknownRuntimeType(String),
}
