use once_cell::sync::{Lazy, OnceCell};
use std::fmt::{self, Display};
use std::sync::Arc;

/// Typename bindings accumulated while matching one lambda invocation.
/// Variant alternatives are tried on clones and merged back on success, so
/// cheap persistent clones matter here.
pub type Bindings = im::HashMap<&'static str, Type>;

/* ------------------------------- Primitives ------------------------------- */

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Prim {
    Null,
    Number,
    String,
    Boolean,
    Color,
    Object,
    Interpolation,
}

impl Prim {
    pub fn name(self) -> &'static str {
        match self {
            Prim::Null => "Null",
            Prim::Number => "Number",
            Prim::String => "String",
            Prim::Boolean => "Boolean",
            Prim::Color => "Color",
            Prim::Object => "Object",
            Prim::Interpolation => "Interpolation",
        }
    }
}

/* --------------------------------- Types ---------------------------------- */

/// The type algebra of the expression language.
///
/// `Variant` members are kept behind a `OnceCell` so a recursive variant can
/// be formed first and have its members patched in afterwards; equality of
/// variants is by node identity, not structure.
#[derive(Clone, Debug)]
pub enum Type {
    Prim(Prim),
    /// A generic placeholder scoped to one lambda signature.
    Name(&'static str),
    Variant(Arc<Variant>),
    Vector(Arc<Type>),
    Array(Arc<Type>, usize),
    /// Matches an `Array` of any length; parameter positions only.
    AnyArray(Arc<Type>),
    /// Parameter-list macro: repeat the tuple of types up to `max` times
    /// (`None` means unbounded). Eliminated during parameter expansion.
    NArgs(NArgs),
    Lambda(Arc<Lambda>),
}

#[derive(Debug, Default)]
pub struct Variant {
    members: OnceCell<Vec<Type>>,
    /// Display label for well-known variants such as `Value`; unlabeled
    /// variants print their members structurally.
    label: Option<&'static str>,
}

impl Variant {
    pub fn members(&self) -> &[Type] {
        self.members.get().map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NArgs {
    pub types: Vec<Type>,
    pub max: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Lambda {
    pub result: Type,
    pub params: Vec<Type>,
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Prim(a), Type::Prim(b)) => a == b,
            (Type::Name(a), Type::Name(b)) => a == b,
            (Type::Variant(a), Type::Variant(b)) => Arc::ptr_eq(a, b),
            (Type::Vector(a), Type::Vector(b)) => a == b,
            (Type::Array(a, n), Type::Array(b, m)) => n == m && a == b,
            (Type::AnyArray(a), Type::AnyArray(b)) => a == b,
            (Type::NArgs(a), Type::NArgs(b)) => a == b,
            (Type::Lambda(a), Type::Lambda(b)) => a == b,
            _ => false,
        }
    }
}

impl Type {
    /// Form a variant whose members may refer back to the variant itself.
    /// The closure receives the variant being formed; its member list is
    /// patched in once the closure returns.
    pub fn recursive_variant<F>(label: Option<&'static str>, f: F) -> Type
    where
        F: FnOnce(&Type) -> Vec<Type>,
    {
        let forming = Arc::new(Variant { members: OnceCell::new(), label });
        let ty = Type::Variant(forming.clone());
        let members = f(&ty);
        let _ = forming.members.set(members);
        ty
    }

    /// True iff some reachable subterm is a `Name`. Terminates on recursive
    /// variants by tracking visited variant nodes.
    pub fn is_generic(&self) -> bool {
        self.is_generic_inner(&mut Vec::new())
    }

    fn is_generic_inner(&self, visited: &mut Vec<*const Variant>) -> bool {
        match self {
            Type::Prim(_) => false,
            Type::Name(_) => true,
            Type::Variant(v) => {
                let node = Arc::as_ptr(v);
                if visited.contains(&node) {
                    return false;
                }
                visited.push(node);
                let generic = v.members().iter().any(|m| m.is_generic_inner(visited));
                visited.pop();
                generic
            }
            Type::Vector(item) | Type::AnyArray(item) | Type::Array(item, _) => {
                item.is_generic_inner(visited)
            }
            Type::NArgs(nargs) => nargs.types.iter().any(|t| t.is_generic_inner(visited)),
            Type::Lambda(l) => {
                l.result.is_generic_inner(visited)
                    || l.params.iter().any(|p| p.is_generic_inner(visited))
            }
        }
    }

    /// Substitute bound typenames, recursing into compound types. A type
    /// with no generic subterm is returned as-is, which both preserves
    /// variant identity and terminates on recursive variants.
    pub fn resolve(&self, bindings: &Bindings) -> Type {
        if !self.is_generic() {
            return self.clone();
        }
        match self {
            Type::Prim(_) => self.clone(),
            Type::Name(name) => bindings.get(name).cloned().unwrap_or_else(|| self.clone()),
            Type::Variant(v) => {
                ctor::variant(v.members().iter().map(|m| m.resolve(bindings)).collect())
            }
            Type::Vector(item) => Type::Vector(Arc::new(item.resolve(bindings))),
            Type::Array(item, len) => Type::Array(Arc::new(item.resolve(bindings)), *len),
            Type::AnyArray(item) => Type::AnyArray(Arc::new(item.resolve(bindings))),
            Type::NArgs(nargs) => Type::NArgs(NArgs {
                types: nargs.types.iter().map(|t| t.resolve(bindings)).collect(),
                max: nargs.max,
            }),
            Type::Lambda(l) => Type::Lambda(Arc::new(Lambda {
                result: l.result.resolve(bindings),
                params: l.params.iter().map(|p| p.resolve(bindings)).collect(),
            })),
        }
    }

    fn write_name(&self, f: &mut fmt::Formatter<'_>, visited: &mut Vec<*const Variant>) -> fmt::Result {
        match self {
            Type::Prim(p) => f.write_str(p.name()),
            Type::Name(name) => f.write_str(name),
            Type::Variant(v) => {
                if let Some(label) = v.label {
                    return f.write_str(label);
                }
                let node = Arc::as_ptr(v);
                if visited.contains(&node) {
                    return f.write_str("...");
                }
                visited.push(node);
                for (i, member) in v.members().iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    member.write_name(f, visited)?;
                }
                visited.pop();
                Ok(())
            }
            Type::Vector(item) => {
                f.write_str("Vector<")?;
                item.write_name(f, visited)?;
                f.write_str(">")
            }
            Type::Array(item, len) => {
                f.write_str("Array<")?;
                item.write_name(f, visited)?;
                write!(f, ", {}>", len)
            }
            Type::AnyArray(item) => {
                f.write_str("Array<")?;
                item.write_name(f, visited)?;
                f.write_str(">")
            }
            Type::NArgs(nargs) => {
                for (i, t) in nargs.types.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    t.write_name(f, visited)?;
                }
                f.write_str(", ...")
            }
            Type::Lambda(l) => {
                f.write_str("(")?;
                for (i, p) in l.params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    p.write_name(f, visited)?;
                }
                f.write_str(") => ")?;
                l.result.write_name(f, visited)
            }
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_name(f, &mut Vec::new())
    }
}

/* ------------------------------ Constructors ------------------------------ */

/// Constructors for signature tables. The `Value` variant is built once and
/// shared so the identity fast-path in matching holds across all uses.
pub mod ctor {
    use super::*;

    pub fn null() -> Type {
        Type::Prim(Prim::Null)
    }
    pub fn number() -> Type {
        Type::Prim(Prim::Number)
    }
    pub fn string() -> Type {
        Type::Prim(Prim::String)
    }
    pub fn boolean() -> Type {
        Type::Prim(Prim::Boolean)
    }
    pub fn color() -> Type {
        Type::Prim(Prim::Color)
    }
    pub fn object() -> Type {
        Type::Prim(Prim::Object)
    }
    pub fn interpolation() -> Type {
        Type::Prim(Prim::Interpolation)
    }

    pub fn typename(name: &'static str) -> Type {
        Type::Name(name)
    }

    pub fn vector(item: Type) -> Type {
        Type::Vector(Arc::new(item))
    }

    pub fn array(item: Type, len: usize) -> Type {
        Type::Array(Arc::new(item), len)
    }

    pub fn any_array(item: Type) -> Type {
        Type::AnyArray(Arc::new(item))
    }

    pub fn variant(members: Vec<Type>) -> Type {
        Type::recursive_variant(None, |_| members)
    }

    pub fn nargs(types: Vec<Type>, max: Option<usize>) -> Type {
        Type::NArgs(NArgs { types, max })
    }

    pub fn lambda(result: Type, params: Vec<Type>) -> Arc<Lambda> {
        Arc::new(Lambda { result, params })
    }

    static VALUE: Lazy<Type> = Lazy::new(|| {
        Type::recursive_variant(Some("Value"), |value| {
            vec![
                null(),
                number(),
                string(),
                boolean(),
                color(),
                object(),
                vector(value.clone()),
            ]
        })
    });

    /// The recursive runtime value type:
    /// `Null | Number | String | Boolean | Color | Object | Vector<Value>`.
    pub fn value() -> Type {
        VALUE.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::ctor::*;
    use super::*;

    #[test]
    fn value_is_not_generic() {
        assert!(!value().is_generic());
    }

    #[test]
    fn generic_reaches_through_compounds() {
        assert!(vector(typename("T")).is_generic());
        assert!(array(typename("T"), 3).is_generic());
        assert!(!vector(number()).is_generic());
        assert!(Type::Lambda(lambda(typename("T"), vec![number()])).is_generic());
    }

    #[test]
    fn variant_equality_is_by_identity() {
        let a = variant(vec![number(), string()]);
        let b = variant(vec![number(), string()]);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_eq!(value(), value());
    }

    #[test]
    fn resolve_substitutes_bound_names() {
        let mut bindings = Bindings::new();
        bindings.insert("T", number());
        assert_eq!(vector(typename("T")).resolve(&bindings), vector(number()));
        assert_eq!(typename("U").resolve(&bindings), typename("U"));
    }

    #[test]
    fn resolve_keeps_concrete_variant_identity() {
        let bindings = Bindings::new();
        assert_eq!(value().resolve(&bindings), value());
    }

    #[test]
    fn printing() {
        assert_eq!(number().to_string(), "Number");
        assert_eq!(vector(number()).to_string(), "Vector<Number>");
        assert_eq!(array(number(), 4).to_string(), "Array<Number, 4>");
        // unlabeled variants print structurally; Value keeps its label so
        // tags and messages stay readable
        assert_eq!(variant(vec![number(), string()]).to_string(), "Number | String");
        assert_eq!(value().to_string(), "Value");
        assert_eq!(vector(value()).to_string(), "Vector<Value>");
    }
}
