use super::err::CompileError;
use crate::dynamics::color::parse_color;
use crate::dynamics::curve::{Curve, Interpolation};
use crate::dynamics::syntax::{Compiled, EvalError, Node, RtValue};
use crate::syntax::{Call, Expr, Literal, Scalar};
use crate::types::{Prim, Type};
use crate::utils::key::Keyed;
use serde_json::{Map, Value};
use std::collections::HashMap;

type Out = Result<Compiled, Keyed<CompileError>>;

/* -------------------------------- Helpers --------------------------------- */

fn node_list(args: Vec<Compiled>) -> Vec<Node> {
    args.into_iter().map(|a| a.node).collect()
}

fn unary(args: Vec<Compiled>) -> Node {
    let mut nodes = node_list(args);
    match nodes.pop() {
        Some(node) if nodes.is_empty() => node,
        _ => unreachable!("arity is checked before compilation"),
    }
}

fn binary(args: Vec<Compiled>) -> (Node, Node) {
    let mut nodes = node_list(args);
    match (nodes.pop(), nodes.pop()) {
        (Some(b), Some(a)) if nodes.is_empty() => (a, b),
        _ => unreachable!("arity is checked before compilation"),
    }
}

fn lookup_property(map: &Map<String, Value>, key: &str) -> Result<RtValue, EvalError> {
    map.get(key)
        .map(RtValue::from_json)
        .ok_or_else(|| EvalError::PropertyNotFound(key.to_string()))
}

/* ------------------------------- Constants -------------------------------- */

macro_rules! constant_fn {
    ($name:ident, $value:expr) => {
        pub(super) fn $name(_call: &Call, _args: Vec<Compiled>) -> Out {
            Ok(Compiled::constant(RtValue::Number($value)))
        }
    };
}

constant_fn!(ln2, std::f64::consts::LN_2);
constant_fn!(pi, std::f64::consts::PI);
constant_fn!(e, std::f64::consts::E);

/* ------------------------------- Assertions ------------------------------- */

macro_rules! assert_fn {
    ($name:ident, $variant:ident, $expected:literal) => {
        pub(super) fn $name(_call: &Call, args: Vec<Compiled>) -> Out {
            let arg = unary(args);
            Ok(Compiled::new(move |ctx| match arg(ctx)? {
                v @ RtValue::$variant(..) => Ok(v),
                other => Err(EvalError::TypeAssertion {
                    expected: $expected.to_string(),
                    found: other.type_of(),
                }),
            }))
        }
    };
}

assert_fn!(assert_string, String, "String");
assert_fn!(assert_number, Number, "Number");
assert_fn!(assert_boolean, Boolean, "Boolean");
assert_fn!(assert_object, Object, "Object");

pub(super) fn assert_json_array(_call: &Call, args: Vec<Compiled>) -> Out {
    let arg = unary(args);
    Ok(Compiled::new(move |ctx| match arg(ctx)? {
        v @ RtValue::Items { .. } => Ok(v),
        other => Err(EvalError::TypeAssertion {
            expected: "Vector<Value>".to_string(),
            found: other.type_of(),
        }),
    }))
}

/* ----------------------------- Property access ----------------------------- */

pub(super) fn get(_call: &Call, args: Vec<Compiled>) -> Out {
    let mut nodes = node_list(args);
    if nodes.len() == 1 {
        let key = nodes.remove(0);
        Ok(Compiled::new(move |ctx| {
            let key = key(ctx)?;
            lookup_property(&ctx.feature.properties, key.as_string()?)
        })
        .feature_dependent())
    } else {
        let obj = nodes.remove(1);
        let key = nodes.remove(0);
        Ok(Compiled::new(move |ctx| {
            let key = key(ctx)?;
            let key = key.as_string()?;
            match obj(ctx)? {
                RtValue::Object(map) => lookup_property(&map, key),
                RtValue::Null => Err(EvalError::PropertyNotFound(key.to_string())),
                other => Err(EvalError::TypeAssertion {
                    expected: "Object".to_string(),
                    found: other.type_of(),
                }),
            }
        }))
    }
}

pub(super) fn has(_call: &Call, args: Vec<Compiled>) -> Out {
    let mut nodes = node_list(args);
    if nodes.len() == 1 {
        let key = nodes.remove(0);
        Ok(Compiled::new(move |ctx| {
            let key = key(ctx)?;
            Ok(RtValue::Boolean(ctx.feature.properties.contains_key(key.as_string()?)))
        })
        .feature_dependent())
    } else {
        let obj = nodes.remove(1);
        let key = nodes.remove(0);
        Ok(Compiled::new(move |ctx| {
            let key = key(ctx)?;
            let key = key.as_string()?;
            match obj(ctx)? {
                RtValue::Object(map) => Ok(RtValue::Boolean(map.contains_key(key))),
                RtValue::Null => Err(EvalError::PropertyNotFound(key.to_string())),
                other => Err(EvalError::TypeAssertion {
                    expected: "Object".to_string(),
                    found: other.type_of(),
                }),
            }
        }))
    }
}

pub(super) fn at(_call: &Call, args: Vec<Compiled>) -> Out {
    let (index, sequence) = binary(args);
    Ok(Compiled::new(move |ctx| {
        let index = index(ctx)?.as_number()?;
        match sequence(ctx)? {
            RtValue::Items { items, .. } => {
                if index < 0.0 || index.fract() != 0.0 || index as usize >= items.len() {
                    return Err(EvalError::IndexOutOfBounds { index, length: items.len() });
                }
                Ok(items[index as usize].clone())
            }
            RtValue::Null => Err(EvalError::PropertyNotFound(format!("{}", index))),
            other => Err(EvalError::TypeAssertion {
                expected: "Vector<Value>".to_string(),
                found: other.type_of(),
            }),
        }
    }))
}

pub(super) fn length(_call: &Call, args: Vec<Compiled>) -> Out {
    let arg = unary(args);
    Ok(Compiled::new(move |ctx| match arg(ctx)? {
        RtValue::Items { items, .. } => Ok(RtValue::Number(items.len() as f64)),
        RtValue::String(s) => Ok(RtValue::Number(s.chars().count() as f64)),
        RtValue::Null => Err(EvalError::PropertyNotFound("length".to_string())),
        other => Err(EvalError::TypeAssertion {
            expected: "Vector<Value>".to_string(),
            found: other.type_of(),
        }),
    }))
}

pub(super) fn type_of(_call: &Call, args: Vec<Compiled>) -> Out {
    let arg = unary(args);
    Ok(Compiled::new(move |ctx| Ok(RtValue::String(arg(ctx)?.type_of()))))
}

pub(super) fn properties(_call: &Call, _args: Vec<Compiled>) -> Out {
    Ok(Compiled::new(|ctx| Ok(RtValue::Object(ctx.feature.properties.clone())))
        .feature_dependent())
}

pub(super) fn geometry_type(_call: &Call, _args: Vec<Compiled>) -> Out {
    Ok(Compiled::new(|ctx| {
        Ok(match &ctx.feature.geometry_type {
            Some(kind) => RtValue::String(kind.clone()),
            None => RtValue::Null,
        })
    })
    .feature_dependent())
}

pub(super) fn id(_call: &Call, _args: Vec<Compiled>) -> Out {
    Ok(Compiled::new(|ctx| {
        Ok(match &ctx.feature.id {
            Some(id) => RtValue::from_json(id),
            None => RtValue::Null,
        })
    })
    .feature_dependent())
}

pub(super) fn zoom(_call: &Call, _args: Vec<Compiled>) -> Out {
    Ok(Compiled::new(|ctx| Ok(RtValue::Number(ctx.zoom))).zoom_dependent())
}

/* ---------------------------------- Math ----------------------------------- */

pub(super) fn add(_call: &Call, args: Vec<Compiled>) -> Out {
    let nodes = node_list(args);
    Ok(Compiled::new(move |ctx| {
        let mut acc = 0.0;
        for node in &nodes {
            acc += node(ctx)?.as_number()?;
        }
        Ok(RtValue::Number(acc))
    }))
}

pub(super) fn mul(_call: &Call, args: Vec<Compiled>) -> Out {
    let nodes = node_list(args);
    Ok(Compiled::new(move |ctx| {
        let mut acc = 1.0;
        for node in &nodes {
            acc *= node(ctx)?.as_number()?;
        }
        Ok(RtValue::Number(acc))
    }))
}

macro_rules! binary_math_fn {
    ($name:ident, |$a:ident, $b:ident| $body:expr) => {
        pub(super) fn $name(_call: &Call, args: Vec<Compiled>) -> Out {
            let (a, b) = binary(args);
            Ok(Compiled::new(move |ctx| {
                let $a = a(ctx)?.as_number()?;
                let $b = b(ctx)?.as_number()?;
                Ok(RtValue::Number($body))
            }))
        }
    };
}

binary_math_fn!(sub, |a, b| a - b);
binary_math_fn!(div, |a, b| a / b);
binary_math_fn!(rem, |a, b| a % b);
binary_math_fn!(pow, |a, b| a.powf(b));

macro_rules! unary_math_fn {
    ($name:ident, $method:ident) => {
        pub(super) fn $name(_call: &Call, args: Vec<Compiled>) -> Out {
            let arg = unary(args);
            Ok(Compiled::new(move |ctx| {
                Ok(RtValue::Number(arg(ctx)?.as_number()?.$method()))
            }))
        }
    };
}

unary_math_fn!(log10, log10);
unary_math_fn!(ln, ln);
unary_math_fn!(log2, log2);
unary_math_fn!(sin, sin);
unary_math_fn!(cos, cos);
unary_math_fn!(tan, tan);
unary_math_fn!(asin, asin);
unary_math_fn!(acos, acos);
unary_math_fn!(atan, atan);

/* ---------------------------------- Logic ---------------------------------- */

pub(super) fn eq(_call: &Call, args: Vec<Compiled>) -> Out {
    let (a, b) = binary(args);
    Ok(Compiled::new(move |ctx| Ok(RtValue::Boolean(a(ctx)? == b(ctx)?))))
}

pub(super) fn ne(_call: &Call, args: Vec<Compiled>) -> Out {
    let (a, b) = binary(args);
    Ok(Compiled::new(move |ctx| Ok(RtValue::Boolean(a(ctx)? != b(ctx)?))))
}

macro_rules! cmp_fn {
    ($name:ident, $op:tt) => {
        pub(super) fn $name(_call: &Call, args: Vec<Compiled>) -> Out {
            let (a, b) = binary(args);
            Ok(Compiled::new(move |ctx| {
                let out = match (a(ctx)?, b(ctx)?) {
                    (RtValue::Number(x), RtValue::Number(y)) => x $op y,
                    (RtValue::String(x), RtValue::String(y)) => x $op y,
                    (x, _) => {
                        return Err(EvalError::TypeAssertion {
                            expected: "Number".to_string(),
                            found: x.type_of(),
                        })
                    }
                };
                Ok(RtValue::Boolean(out))
            }))
        }
    };
}

cmp_fn!(gt, >);
cmp_fn!(lt, <);
cmp_fn!(ge, >=);
cmp_fn!(le, <=);

pub(super) fn and(_call: &Call, args: Vec<Compiled>) -> Out {
    let nodes = node_list(args);
    Ok(Compiled::new(move |ctx| {
        let mut out = true;
        for node in &nodes {
            out &= node(ctx)?.as_boolean()?;
        }
        Ok(RtValue::Boolean(out))
    }))
}

pub(super) fn or(_call: &Call, args: Vec<Compiled>) -> Out {
    let nodes = node_list(args);
    Ok(Compiled::new(move |ctx| {
        let mut out = false;
        for node in &nodes {
            out |= node(ctx)?.as_boolean()?;
        }
        Ok(RtValue::Boolean(out))
    }))
}

pub(super) fn not(_call: &Call, args: Vec<Compiled>) -> Out {
    let arg = unary(args);
    Ok(Compiled::new(move |ctx| Ok(RtValue::Boolean(!arg(ctx)?.as_boolean()?))))
}

/* --------------------------------- Strings --------------------------------- */

pub(super) fn upcase(_call: &Call, args: Vec<Compiled>) -> Out {
    let arg = unary(args);
    Ok(Compiled::new(move |ctx| {
        Ok(RtValue::String(arg(ctx)?.as_string()?.to_uppercase()))
    }))
}

pub(super) fn downcase(_call: &Call, args: Vec<Compiled>) -> Out {
    let arg = unary(args);
    Ok(Compiled::new(move |ctx| {
        Ok(RtValue::String(arg(ctx)?.as_string()?.to_lowercase()))
    }))
}

pub(super) fn concat(_call: &Call, args: Vec<Compiled>) -> Out {
    let nodes = node_list(args);
    Ok(Compiled::new(move |ctx| {
        let mut out = String::new();
        for node in &nodes {
            out.push_str(&format!("{}", node(ctx)?));
        }
        Ok(RtValue::String(out))
    }))
}

/* ---------------------------------- Color ---------------------------------- */

pub(super) fn color_from_string(_call: &Call, args: Vec<Compiled>) -> Out {
    let arg = unary(args);
    Ok(Compiled::new(move |ctx| {
        let value = arg(ctx)?;
        let s = value.as_string()?;
        parse_color(s)
            .map(RtValue::Color)
            .ok_or_else(|| EvalError::ColorParse(s.to_string()))
    }))
}

fn channel(x: f64) -> Result<f64, EvalError> {
    if (0.0..=255.0).contains(&x) {
        Ok(x)
    } else {
        Err(EvalError::ColorParse(format!("{}", x)))
    }
}

pub(super) fn rgb(_call: &Call, args: Vec<Compiled>) -> Out {
    let nodes = node_list(args);
    Ok(Compiled::new(move |ctx| {
        let r = channel(nodes[0](ctx)?.as_number()?)?;
        let g = channel(nodes[1](ctx)?.as_number()?)?;
        let b = channel(nodes[2](ctx)?.as_number()?)?;
        Ok(RtValue::Color([r, g, b, 1.0]))
    }))
}

pub(super) fn rgba(_call: &Call, args: Vec<Compiled>) -> Out {
    let nodes = node_list(args);
    Ok(Compiled::new(move |ctx| {
        let r = channel(nodes[0](ctx)?.as_number()?)?;
        let g = channel(nodes[1](ctx)?.as_number()?)?;
        let b = channel(nodes[2](ctx)?.as_number()?)?;
        let a = nodes[3](ctx)?.as_number()?;
        if !(0.0..=1.0).contains(&a) {
            return Err(EvalError::ColorParse(format!("{}", a)));
        }
        Ok(RtValue::Color([r, g, b, a]))
    }))
}

pub(super) fn color_to_array(_call: &Call, args: Vec<Compiled>) -> Out {
    let arg = unary(args);
    Ok(Compiled::new(move |ctx| {
        let [r, g, b, a] = arg(ctx)?.as_color()?;
        Ok(RtValue::Items {
            tag: "Array<Number, 4>".to_string(),
            items: vec![
                RtValue::Number(r),
                RtValue::Number(g),
                RtValue::Number(b),
                RtValue::Number(a),
            ],
        })
    }))
}

/* -------------------------------- Containers -------------------------------- */

pub(super) fn array_ctor(call: &Call, args: Vec<Compiled>) -> Out {
    let tag = call.ty.result.to_string();
    let nodes = node_list(args);
    Ok(Compiled::new(move |ctx| {
        let items = nodes.iter().map(|n| n(ctx)).collect::<Result<Vec<_>, _>>()?;
        Ok(RtValue::Items { tag: tag.clone(), items })
    }))
}

pub(super) fn vector_ctor(call: &Call, args: Vec<Compiled>) -> Out {
    array_ctor(call, args)
}

pub(super) fn coalesce(_call: &Call, args: Vec<Compiled>) -> Out {
    let nodes = node_list(args);
    Ok(Compiled::new(move |ctx| {
        let last = nodes.len().saturating_sub(1);
        for (i, node) in nodes.iter().enumerate() {
            match node(ctx) {
                Ok(RtValue::Null) => continue,
                Ok(value) => return Ok(value),
                // a failing alternative is consumed unless it is the last
                Err(e) if i == last => return Err(e),
                Err(_) => continue,
            }
        }
        Ok(RtValue::Null)
    }))
}

/* --------------------------------- Control ---------------------------------- */

pub(super) fn case(_call: &Call, args: Vec<Compiled>) -> Out {
    let nodes = node_list(args);
    Ok(Compiled::new(move |ctx| {
        let mut i = 0;
        while i + 1 < nodes.len() {
            if nodes[i](ctx)?.as_boolean()? {
                return nodes[i + 1](ctx);
            }
            i += 2;
        }
        nodes[nodes.len() - 1](ctx)
    }))
}

pub(super) fn match_op(call: &Call, args: Vec<Compiled>) -> Out {
    let Some(groups) = &call.match_inputs else {
        unreachable!("match calls carry their input groups")
    };
    let expected = groups.len() + 2;
    if args.len() != expected {
        return Err(call
            .key
            .make(CompileError::MatchArityMismatch { expected, found: args.len() }));
    }

    // the type tag keeps 0 and "0" apart
    let mut table: HashMap<String, usize> = HashMap::new();
    for (gi, group) in groups.iter().enumerate() {
        for label in group {
            table.entry(format!("{}-{}", label.ty, label.value)).or_insert(gi + 1);
        }
    }

    let nodes = node_list(args);
    Ok(Compiled::new(move |ctx| {
        let input = nodes[0](ctx)?;
        let key = format!("{}-{}", input.type_of(), input);
        let index = table.get(&key).copied().unwrap_or(nodes.len() - 1);
        nodes[index](ctx)
    }))
}

pub(super) fn curve(call: &Call, args: Vec<Compiled>) -> Out {
    let interpolation = parse_interpolation(&call.args[0])?;

    let mut stop_inputs = Vec::new();
    let mut i = 2;
    while i < call.args.len() {
        let stop = &call.args[i];
        let Expr::Literal(Literal { value: Scalar::Number(x), .. }) = stop else {
            return Err(stop.key().make(CompileError::NonNumericCurveStop));
        };
        if stop_inputs.last().is_some_and(|last| x <= last) {
            return Err(stop.key().make(CompileError::NonAscendingCurveStops));
        }
        stop_inputs.push(*x);
        i += 2;
    }
    if stop_inputs.is_empty() {
        return Err(call.key.make(CompileError::MissingCurveStops));
    }

    let out_ty = &call.ty.result;
    let interpolatable = matches!(out_ty, Type::Prim(Prim::Number) | Type::Prim(Prim::Color))
        || matches!(out_ty, Type::Array(item, _) if **item == Type::Prim(Prim::Number));
    if !interpolatable && !matches!(interpolation, Interpolation::Step) {
        return Err(call
            .key
            .make(CompileError::NonInterpolatableCurveOutput(out_ty.to_string())));
    }

    let nodes = node_list(args);
    let input = nodes[1].clone();
    let outputs: Vec<Node> = nodes.iter().skip(3).step_by(2).cloned().collect();
    let curve = Curve { interpolation, stop_inputs, outputs };
    Ok(Compiled::new(move |ctx| {
        curve.evaluate(input(ctx)?.as_number()?, ctx)
    }))
}

fn parse_interpolation(arg: &Expr) -> Result<Interpolation, Keyed<CompileError>> {
    let Expr::Call(call) = arg else {
        return Err(arg.key().make(CompileError::InvalidInterpolation));
    };
    match call.name {
        "step" => Ok(Interpolation::Step),
        "linear" => Ok(Interpolation::Linear),
        "exponential" => match call.args.first() {
            Some(Expr::Literal(Literal { value: Scalar::Number(base), .. })) => {
                Ok(Interpolation::Exponential { base: *base })
            }
            Some(other) => Err(other.key().make(CompileError::NonLiteralExponentialBase)),
            None => Err(call.key.make(CompileError::NonLiteralExponentialBase)),
        },
        _ => Err(arg.key().make(CompileError::InvalidInterpolation)),
    }
}

/// Interpolation markers never evaluate on their own; `curve` consumes them
/// at compile time.
pub(super) fn marker(call: &Call, _args: Vec<Compiled>) -> Out {
    let name = call.name;
    Ok(Compiled::new(move |_| {
        Err(EvalError::UnknownRuntimeType(name.to_string()))
    }))
}
