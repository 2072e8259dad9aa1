use crate::types::{Lambda, Prim, Type};
use crate::utils::key::Key;
use derive_more::From;
use serde_json::Value;
use std::fmt::{self, Display};
use std::sync::Arc;

/* ------------------------------- Expression ------------------------------- */

/// A node of the style expression AST: either a bare literal or a call to a
/// registry definition. The type checker replaces nodes wholesale; it never
/// mutates them in place.
#[derive(From, Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Call(Call),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Literal {
    pub value: Scalar,
    pub ty: Type,
    pub key: Key,
}

/// The literal kinds the JSON surface can express.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub name: &'static str,
    pub ty: Arc<Lambda>,
    pub args: Vec<Expr>,
    pub key: Key,
    /// `match` only: the label groups, parsed as literals. The group labels
    /// are deliberately not positional arguments.
    pub match_inputs: Option<Vec<Vec<Literal>>>,
}

impl Scalar {
    pub fn prim(&self) -> Prim {
        match self {
            Scalar::Null => Prim::Null,
            Scalar::Boolean(_) => Prim::Boolean,
            Scalar::Number(_) => Prim::Number,
            Scalar::String(_) => Prim::String,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Null => Value::Null,
            Scalar::Boolean(b) => Value::Bool(*b),
            Scalar::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Scalar::String(s) => Value::String(s.clone()),
        }
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Boolean(b) => write!(f, "{}", b),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

impl Literal {
    pub fn new(value: Scalar, key: Key) -> Self {
        let ty = Type::Prim(value.prim());
        Literal { value, ty, key }
    }
}

impl Expr {
    pub fn key(&self) -> &Key {
        match self {
            Expr::Literal(lit) => &lit.key,
            Expr::Call(call) => &call.key,
        }
    }

    /// The declared result type of this node. For calls this is the lambda
    /// result only; the checker matches against it without looking deeper.
    pub fn result_type(&self) -> Type {
        match self {
            Expr::Literal(lit) => lit.ty.clone(),
            Expr::Call(call) => call.ty.result.clone(),
        }
    }

    /// Reconstruct the source JSON form, including `match` label groups.
    pub fn to_json(&self) -> Value {
        match self {
            Expr::Literal(lit) => lit.value.to_json(),
            Expr::Call(call) => call.to_json(),
        }
    }
}

impl Call {
    fn to_json(&self) -> Value {
        let mut out = vec![Value::String(self.name.to_string())];
        match &self.match_inputs {
            None => out.extend(self.args.iter().map(Expr::to_json)),
            Some(groups) => {
                // arguments are [input, out₁, …, outₙ, otherwise]
                out.push(self.args[0].to_json());
                for (group, output) in groups.iter().zip(&self.args[1..]) {
                    if let [single] = group.as_slice() {
                        out.push(single.value.to_json());
                    } else {
                        out.push(Value::Array(
                            group.iter().map(|lit| lit.value.to_json()).collect(),
                        ));
                    }
                    out.push(output.to_json());
                }
                if let Some(otherwise) = self.args.last() {
                    out.push(otherwise.to_json());
                }
            }
        }
        Value::Array(out)
    }
}
