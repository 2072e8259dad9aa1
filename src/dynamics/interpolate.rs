use super::syntax::{EvalError, RtValue};

pub fn number(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

pub fn color(a: &[f64; 4], b: &[f64; 4], t: f64) -> [f64; 4] {
    [
        number(a[0], b[0], t),
        number(a[1], b[1], t),
        number(a[2], b[2], t),
        number(a[3], b[3], t),
    ]
}

pub fn array(a: &[RtValue], b: &[RtValue], t: f64) -> Result<Vec<RtValue>, EvalError> {
    if a.len() != b.len() {
        return Err(EvalError::TypeAssertion {
            expected: format!("Array<Number, {}>", a.len()),
            found: format!("Array<Number, {}>", b.len()),
        });
    }
    a.iter()
        .zip(b)
        .map(|(x, y)| Ok(RtValue::Number(number(x.as_number()?, y.as_number()?, t))))
        .collect()
}

/// Blend two curve outputs; the output type restriction at compile time
/// guarantees these are numbers, colors, or numeric arrays.
pub fn values(lower: &RtValue, upper: &RtValue, t: f64) -> Result<RtValue, EvalError> {
    match (lower, upper) {
        (RtValue::Number(a), RtValue::Number(b)) => Ok(RtValue::Number(number(*a, *b, t))),
        (RtValue::Color(a), RtValue::Color(b)) => Ok(RtValue::Color(color(a, b, t))),
        (RtValue::Items { tag, items: a }, RtValue::Items { items: b, .. }) => {
            Ok(RtValue::Items { tag: tag.clone(), items: array(a, b, t)? })
        }
        (a, b) => Err(EvalError::TypeAssertion { expected: a.type_of(), found: b.type_of() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_blend_linearly() {
        assert_eq!(number(0.0, 100.0, 0.25), 25.0);
        assert_eq!(number(10.0, 20.0, 0.0), 10.0);
        assert_eq!(number(10.0, 20.0, 1.0), 20.0);
    }

    #[test]
    fn colors_blend_componentwise() {
        let a = [0.0, 0.0, 0.0, 0.0];
        let b = [255.0, 100.0, 50.0, 1.0];
        assert_eq!(color(&a, &b, 0.5), [127.5, 50.0, 25.0, 0.5]);
    }

    #[test]
    fn arrays_require_matching_lengths() {
        let a = vec![RtValue::Number(0.0)];
        let b = vec![RtValue::Number(1.0), RtValue::Number(2.0)];
        assert!(array(&a, &b, 0.5).is_err());
    }
}
