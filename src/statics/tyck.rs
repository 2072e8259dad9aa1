use super::err::TyckError;
use crate::syntax::{Call, Expr, Literal};
use crate::types::{Bindings, Lambda, Prim, Type};
use crate::utils::key::Keyed;
use std::sync::Arc;

type Errors = Vec<Keyed<TyckError>>;

/// Analysis-mode type checking: the caller establishes the expected type
/// and checking pushes it down the tree. On success a fully-resolved copy
/// of the node is returned; the input is never mutated.
pub trait TypeCheck: Sized {
    fn check(&self, expected: &Type) -> Result<Self, Errors>;
}

impl TypeCheck for Expr {
    fn check(&self, expected: &Type) -> Result<Self, Errors> {
        match self {
            Expr::Literal(lit) => lit.check(expected).map(Expr::Literal),
            Expr::Call(call) => call.check(expected).map(Expr::Call),
        }
    }
}

impl TypeCheck for Literal {
    fn check(&self, expected: &Type) -> Result<Self, Errors> {
        let mut expected_bindings = Bindings::new();
        let mut actual_bindings = Bindings::new();
        match_types(expected, &self.ty, &mut expected_bindings, &mut actual_bindings)
            .map_err(|e| vec![self.key.make(e)])?;
        Ok(self.clone())
    }
}

impl TypeCheck for Call {
    fn check(&self, expected: &Type) -> Result<Self, Errors> {
        let mut typenames = Bindings::new();
        let mut errors: Errors = Vec::new();

        // Unify the result types. Bindings for this call's own typenames
        // land on the actual side; a bare expected type drives the rest of
        // the check through the call's declared signature.
        let lambda: Arc<Lambda> = match expected {
            Type::Lambda(l) => {
                let mut scratch = Bindings::new();
                match_types(&l.result, &self.ty.result, &mut scratch, &mut typenames)
                    .map_err(|e| vec![self.key.make(e)])?;
                l.clone()
            }
            other => {
                let mut scratch = Bindings::new();
                match_types(other, &self.ty.result, &mut scratch, &mut typenames)
                    .map_err(|e| vec![self.key.make(e)])?;
                self.ty.clone()
            }
        };

        // Unroll NArgs groups against the actual argument count.
        let params = expand_params(&lambda.params, self.args.len());
        if params.len() != self.args.len() {
            return Err(vec![self.key.make(TyckError::ArityMismatch {
                expected: params.len(),
                found: self.args.len(),
            })]);
        }

        // Shallow matching: each parameter against the argument's declared
        // result type only, binding this call's typenames left to right.
        let mut matched = vec![true; self.args.len()];
        for (i, (param, arg)) in params.iter().zip(&self.args).enumerate() {
            let param = param.resolve(&typenames);
            let mut arg_bindings = Bindings::new();
            if let Err(e) =
                match_types(&param, &arg.result_type(), &mut typenames, &mut arg_bindings)
            {
                errors.push(arg.key().make(e));
                matched[i] = false;
            }
        }

        let result = lambda.result.resolve(&typenames);
        if result.is_generic() {
            errors.push(self.key.make(TyckError::Unresolved { name: self.name }));
            return Err(errors);
        }

        // Recurse with the resolved parameter types. Arguments that already
        // failed the shallow match are skipped so a mismatch is reported
        // once.
        let mut checked_args = Vec::with_capacity(self.args.len());
        for (i, (param, arg)) in params.iter().zip(&self.args).enumerate() {
            if !matched[i] {
                continue;
            }
            match arg.check(&param.resolve(&typenames)) {
                Ok(checked) => checked_args.push(checked),
                Err(es) => errors.extend(es),
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        // Label groups are rechecked against the input's resolved type.
        if let Some(groups) = &self.match_inputs {
            let input_ty = checked_args[0].result_type();
            for group in groups {
                for label in group {
                    let mut expected_bindings = Bindings::new();
                    let mut actual_bindings = Bindings::new();
                    if let Err(e) = match_types(
                        &input_ty,
                        &label.ty,
                        &mut expected_bindings,
                        &mut actual_bindings,
                    ) {
                        errors.push(label.key.make(e));
                    }
                }
            }
            if !errors.is_empty() {
                return Err(errors);
            }
        }

        Ok(Call {
            name: self.name,
            ty: Arc::new(Lambda {
                result,
                params: params.iter().map(|p| p.resolve(&typenames)).collect(),
            }),
            args: checked_args,
            key: self.key.clone(),
            match_inputs: self.match_inputs.clone(),
        })
    }
}

/// Unroll each `NArgs` group so the expanded list lines up with `argc`
/// arguments: the group's tuple of types is repeated
/// `min(max, ⌈(argc - fixed) / tuple⌉)` times.
pub fn expand_params(params: &[Type], argc: usize) -> Vec<Type> {
    let mut expanded = Vec::with_capacity(argc);
    for param in params {
        match param {
            Type::NArgs(nargs) => {
                let slots = argc.saturating_sub(params.len() - 1);
                let tuple = nargs.types.len().max(1);
                let mut repeat = (slots + tuple - 1) / tuple;
                if let Some(max) = nargs.max {
                    repeat = repeat.min(max);
                }
                for _ in 0..repeat {
                    expanded.extend(nargs.types.iter().cloned());
                }
            }
            p => expanded.push(p.clone()),
        }
    }
    expanded
}

/// Match an expected type against an actual one, accumulating typename
/// bindings on both sides. Lambdas in argument position stand for their
/// results; null is bottom; variant alternatives are tried in declaration
/// order on copied binding maps, merged back on the first success.
pub fn match_types(
    expected: &Type,
    actual: &Type,
    expected_bindings: &mut Bindings,
    actual_bindings: &mut Bindings,
) -> Result<(), TyckError> {
    let actual = match actual {
        Type::Lambda(l) => &l.result,
        t => t,
    };

    if expected == actual {
        return Ok(());
    }

    if let Type::Name(name) = expected {
        if !expected_bindings.contains_key(name)
            && !actual.is_generic()
            && *actual != Type::Prim(Prim::Null)
        {
            expected_bindings.insert(*name, actual.clone());
        }
        return Ok(());
    }

    if let Type::Name(name) = actual {
        if expected.is_generic() {
            return Err(mismatch(expected, actual));
        }
        if !actual_bindings.contains_key(name) && *expected != Type::Prim(Prim::Null) {
            actual_bindings.insert(*name, expected.clone());
        }
        // t rewrites to the expected type, which trivially matches it.
        return Ok(());
    }

    if *actual == Type::Prim(Prim::Null) {
        return Ok(());
    }

    // An actual variant matches only if every one of its members does.
    if let Type::Variant(v) = actual {
        for member in v.members() {
            match_types(expected, member, expected_bindings, actual_bindings)?;
        }
        return Ok(());
    }

    match (expected, actual) {
        (Type::Prim(a), Type::Prim(b)) if a == b => Ok(()),
        (Type::Vector(e), Type::Vector(a)) => {
            match_types(e, a, expected_bindings, actual_bindings)
                .map_err(|_| mismatch(expected, actual))
        }
        (Type::Array(e, n), Type::Array(a, m)) if n == m => {
            match_types(e, a, expected_bindings, actual_bindings)
                .map_err(|_| mismatch(expected, actual))
        }
        (Type::AnyArray(e), Type::Array(a, _)) => {
            match_types(e, a, expected_bindings, actual_bindings)
                .map_err(|_| mismatch(expected, actual))
        }
        (Type::Variant(v), _) => {
            for member in v.members() {
                let mut e2 = expected_bindings.clone();
                let mut a2 = actual_bindings.clone();
                if match_types(member, actual, &mut e2, &mut a2).is_ok() {
                    *expected_bindings = e2;
                    *actual_bindings = a2;
                    return Ok(());
                }
            }
            Err(mismatch(expected, actual))
        }
        _ => Err(mismatch(expected, actual)),
    }
}

fn mismatch(expected: &Type, found: &Type) -> TyckError {
    TyckError::Mismatch { expected: expected.clone(), found: found.clone() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ctor::*;

    fn ok(expected: &Type, actual: &Type) -> bool {
        let mut e = Bindings::new();
        let mut a = Bindings::new();
        match_types(expected, actual, &mut e, &mut a).is_ok()
    }

    #[test]
    fn null_is_bottom() {
        assert!(ok(&number(), &null()));
        assert!(ok(&vector(string()), &null()));
        assert!(!ok(&null(), &number()));
    }

    #[test]
    fn primitives_match_by_identity() {
        assert!(ok(&number(), &number()));
        assert!(!ok(&number(), &string()));
    }

    #[test]
    fn arrays_require_equal_length() {
        assert!(ok(&array(number(), 3), &array(number(), 3)));
        assert!(!ok(&array(number(), 3), &array(number(), 4)));
        assert!(ok(&any_array(number()), &array(number(), 7)));
    }

    #[test]
    fn expected_typename_binds_first_concrete() {
        let mut e = Bindings::new();
        let mut a = Bindings::new();
        match_types(&typename("T"), &number(), &mut e, &mut a).unwrap();
        assert_eq!(e.get("T"), Some(&number()));
        // an already-bound name is not rebound
        match_types(&typename("T"), &string(), &mut e, &mut a).unwrap();
        assert_eq!(e.get("T"), Some(&number()));
    }

    #[test]
    fn typename_does_not_bind_null() {
        let mut e = Bindings::new();
        let mut a = Bindings::new();
        match_types(&typename("T"), &null(), &mut e, &mut a).unwrap();
        assert!(e.get("T").is_none());
    }

    #[test]
    fn variant_members_tried_in_order() {
        let v = variant(vec![number(), string()]);
        assert!(ok(&v, &string()));
        assert!(!ok(&v, &boolean()));
        // first success wins and only its bindings merge
        let v = variant(vec![vector(typename("T")), typename("T")]);
        let mut e = Bindings::new();
        let mut a = Bindings::new();
        match_types(&v, &vector(number()), &mut e, &mut a).unwrap();
        assert_eq!(e.get("T"), Some(&number()));
    }

    #[test]
    fn value_accepts_number_before_vector() {
        assert!(ok(&value(), &number()));
        assert!(ok(&value(), &vector(value())));
        assert!(ok(&value(), &value()));
    }

    #[test]
    fn actual_variant_needs_every_member() {
        // Value as an actual does not fit a bare String expectation.
        assert!(!ok(&string(), &value()));
    }

    #[test]
    fn expansion_unrolls_nargs() {
        let params = vec![nargs(vec![boolean(), typename("T")], None), typename("T")];
        assert_eq!(expand_params(&params, 5).len(), 5);
        // even argument counts cannot line up for case-shaped signatures
        assert_eq!(expand_params(&params, 4).len(), 5);

        let params = vec![string(), nargs(vec![object()], Some(1))];
        assert_eq!(expand_params(&params, 1).len(), 1);
        assert_eq!(expand_params(&params, 2).len(), 2);
        assert_eq!(expand_params(&params, 3).len(), 2);
    }
}
