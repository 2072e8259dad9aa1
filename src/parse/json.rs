use super::err::{json_kind, ParseError};
use crate::library::builtins;
use crate::library::syntax::Definition;
use crate::syntax::{Call, Expr, Literal, Scalar};
use crate::types::{ctor, Lambda};
use crate::utils::key::{Key, Keyed};
use serde_json::Value;
use std::sync::Arc;

/// Parse a JSON expression tree into an untyped AST. Each call carries the
/// declaration-site signature from the registry verbatim; no inference
/// happens here.
pub fn parse(json: &Value) -> Result<Expr, Keyed<ParseError>> {
    parse_at(json, &Key::root())
}

fn parse_at(json: &Value, key: &Key) -> Result<Expr, Keyed<ParseError>> {
    match json {
        Value::Null => Ok(Literal::new(Scalar::Null, key.clone()).into()),
        Value::Bool(b) => Ok(Literal::new(Scalar::Boolean(*b), key.clone()).into()),
        Value::Number(n) => {
            let n = n
                .as_f64()
                .ok_or_else(|| key.make(ParseError::UnexpectedJson("number")))?;
            Ok(Literal::new(Scalar::Number(n), key.clone()).into())
        }
        Value::String(s) => Ok(Literal::new(Scalar::String(s.clone()), key.clone()).into()),
        Value::Array(items) => parse_call(items, key),
        Value::Object(_) => Err(key.make(ParseError::UnexpectedJson("object"))),
    }
}

fn parse_call(items: &[Value], key: &Key) -> Result<Expr, Keyed<ParseError>> {
    let Some(head) = items.first() else {
        return Err(key.make(ParseError::EmptyExpression));
    };
    let Value::String(op) = head else {
        return Err(key.child(0).make(ParseError::NonStringOp(json_kind(head))));
    };
    let Some(def) = builtins::lookup(op) else {
        return Err(key.child(0).make(ParseError::UnknownFunction(op.clone())));
    };
    if def.name == "match" {
        return parse_match(def, items, key);
    }

    let mut args = Vec::with_capacity(items.len() - 1);
    for (i, item) in items.iter().enumerate().skip(1) {
        args.push(parse_at(item, &key.child(i))?);
    }

    // `array` declares its output length from its argument count.
    let ty = if def.name == "array" {
        Arc::new(Lambda {
            result: ctor::array(ctor::typename("T"), args.len()),
            params: vec![ctor::nargs(vec![ctor::typename("T")], None)],
        })
    } else {
        def.ty.clone()
    };

    Ok(Call { name: def.name, ty, args, key: key.clone(), match_inputs: None }.into())
}

/// `["match", input, label₁, out₁, …, otherwise]`. Labels are literal
/// groups, not positional arguments; the argument list of the parsed call
/// is `[input, out₁, …, outₙ, otherwise]`.
fn parse_match(def: &Definition, items: &[Value], key: &Key) -> Result<Expr, Keyed<ParseError>> {
    if items.len() < 3 || items.len() % 2 == 0 {
        return Err(key.make(ParseError::MalformedMatch));
    }

    let input = parse_at(&items[1], &key.child(1))?;
    let mut groups = Vec::new();
    let mut args = vec![input];

    let mut i = 2;
    while i < items.len() - 1 {
        groups.push(parse_group(&items[i], &key.child(i))?);
        args.push(parse_at(&items[i + 1], &key.child(i + 1))?);
        i += 2;
    }
    let last = items.len() - 1;
    args.push(parse_at(&items[last], &key.child(last))?);

    Ok(Call {
        name: def.name,
        ty: def.ty.clone(),
        args,
        key: key.clone(),
        match_inputs: Some(groups),
    }
    .into())
}

fn parse_group(label: &Value, key: &Key) -> Result<Vec<Literal>, Keyed<ParseError>> {
    match label {
        // An array label that parses as an expression is a computed input,
        // which `match` rejects; one that does not is a group of literals.
        Value::Array(elements) => {
            if parse_at(label, key).is_ok() {
                return Err(key.make(ParseError::NonLiteralMatchInput));
            }
            if elements.is_empty() {
                return Err(key.make(ParseError::EmptyMatchGroup));
            }
            let mut group = Vec::with_capacity(elements.len());
            for (i, element) in elements.iter().enumerate() {
                group.push(parse_label(element, &key.child(i))?);
            }
            Ok(group)
        }
        single => Ok(vec![parse_label(single, key)?]),
    }
}

fn parse_label(label: &Value, key: &Key) -> Result<Literal, Keyed<ParseError>> {
    match parse_at(label, key) {
        Ok(Expr::Literal(lit)) => Ok(lit),
        _ => Err(key.make(ParseError::NonLiteralMatchInput)),
    }
}
