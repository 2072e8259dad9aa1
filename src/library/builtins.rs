use super::impls;
use super::syntax::Definition;
use crate::types::ctor::*;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The static table of builtin definitions. To add an operator, declare its
/// signature here and provide a compile rule in `impls`.
static DEFINITIONS: Lazy<HashMap<&'static str, Definition>> = Lazy::new(|| {
    [
        // constants
        Definition::new("ln2", lambda(number(), vec![]), impls::ln2),
        Definition::new("pi", lambda(number(), vec![]), impls::pi),
        Definition::new("e", lambda(number(), vec![]), impls::e),
        // assertions
        Definition::new("string", lambda(string(), vec![value()]), impls::assert_string),
        Definition::new("number", lambda(number(), vec![value()]), impls::assert_number),
        Definition::new("boolean", lambda(boolean(), vec![value()]), impls::assert_boolean),
        Definition::new("object", lambda(object(), vec![value()]), impls::assert_object),
        Definition::new(
            "json_array",
            lambda(vector(value()), vec![value()]),
            impls::assert_json_array,
        ),
        // property access
        Definition::new(
            "get",
            lambda(typename("T"), vec![string(), nargs(vec![object()], Some(1))]),
            impls::get,
        ),
        Definition::new(
            "has",
            lambda(boolean(), vec![string(), nargs(vec![object()], Some(1))]),
            impls::has,
        ),
        Definition::new(
            "at",
            lambda(
                typename("T"),
                vec![
                    number(),
                    variant(vec![vector(typename("T")), any_array(typename("T"))]),
                ],
            ),
            impls::at,
        ),
        Definition::new(
            "length",
            lambda(number(), vec![variant(vec![vector(typename("T")), string()])]),
            impls::length,
        ),
        Definition::new("typeof", lambda(string(), vec![value()]), impls::type_of),
        Definition::new("properties", lambda(object(), vec![]), impls::properties),
        Definition::new("geometry_type", lambda(string(), vec![]), impls::geometry_type),
        Definition::new("id", lambda(value(), vec![]), impls::id),
        Definition::new("zoom", lambda(number(), vec![]), impls::zoom),
        // math
        Definition::new("+", lambda(number(), vec![nargs(vec![number()], None)]), impls::add),
        Definition::new("*", lambda(number(), vec![nargs(vec![number()], None)]), impls::mul),
        Definition::new("-", lambda(number(), vec![number(), number()]), impls::sub),
        Definition::new("/", lambda(number(), vec![number(), number()]), impls::div),
        Definition::new("%", lambda(number(), vec![number(), number()]), impls::rem),
        Definition::new("^", lambda(number(), vec![number(), number()]), impls::pow),
        Definition::new("log10", lambda(number(), vec![number()]), impls::log10),
        Definition::new("ln", lambda(number(), vec![number()]), impls::ln),
        Definition::new("log2", lambda(number(), vec![number()]), impls::log2),
        Definition::new("sin", lambda(number(), vec![number()]), impls::sin),
        Definition::new("cos", lambda(number(), vec![number()]), impls::cos),
        Definition::new("tan", lambda(number(), vec![number()]), impls::tan),
        Definition::new("asin", lambda(number(), vec![number()]), impls::asin),
        Definition::new("acos", lambda(number(), vec![number()]), impls::acos),
        Definition::new("atan", lambda(number(), vec![number()]), impls::atan),
        // logic
        Definition::new(
            "==",
            lambda(boolean(), vec![typename("T"), typename("T")]),
            impls::eq,
        ),
        Definition::new(
            "!=",
            lambda(boolean(), vec![typename("T"), typename("T")]),
            impls::ne,
        ),
        Definition::new(
            ">",
            lambda(boolean(), vec![typename("T"), typename("T")]),
            impls::gt,
        ),
        Definition::new(
            "<",
            lambda(boolean(), vec![typename("T"), typename("T")]),
            impls::lt,
        ),
        Definition::new(
            ">=",
            lambda(boolean(), vec![typename("T"), typename("T")]),
            impls::ge,
        ),
        Definition::new(
            "<=",
            lambda(boolean(), vec![typename("T"), typename("T")]),
            impls::le,
        ),
        Definition::new(
            "&&",
            lambda(boolean(), vec![nargs(vec![boolean()], None)]),
            impls::and,
        ),
        Definition::new(
            "||",
            lambda(boolean(), vec![nargs(vec![boolean()], None)]),
            impls::or,
        ),
        Definition::new("!", lambda(boolean(), vec![boolean()]), impls::not),
        // strings
        Definition::new("upcase", lambda(string(), vec![string()]), impls::upcase),
        Definition::new("downcase", lambda(string(), vec![string()]), impls::downcase),
        Definition::new(
            "concat",
            lambda(string(), vec![nargs(vec![value()], None)]),
            impls::concat,
        ),
        // color
        Definition::new("color", lambda(color(), vec![string()]), impls::color_from_string),
        Definition::new("rgb", lambda(color(), vec![number(), number(), number()]), impls::rgb),
        Definition::new(
            "rgba",
            lambda(color(), vec![number(), number(), number(), number()]),
            impls::rgba,
        ),
        Definition::new(
            "color_to_array",
            lambda(array(number(), 4), vec![color()]),
            impls::color_to_array,
        ),
        // containers
        // the parser overrides `array`'s output length per call site
        Definition::new(
            "array",
            lambda(array(typename("T"), 0), vec![nargs(vec![typename("T")], None)]),
            impls::array_ctor,
        ),
        Definition::new(
            "vector",
            lambda(vector(typename("T")), vec![nargs(vec![typename("T")], None)]),
            impls::vector_ctor,
        ),
        Definition::new(
            "coalesce",
            lambda(typename("T"), vec![nargs(vec![typename("T")], None)]),
            impls::coalesce,
        ),
        // control
        Definition::new(
            "case",
            lambda(
                typename("T"),
                vec![nargs(vec![boolean(), typename("T")], None), typename("T")],
            ),
            impls::case,
        ),
        Definition::new(
            "match",
            lambda(
                typename("T"),
                vec![value(), nargs(vec![typename("T")], None), typename("T")],
            ),
            impls::match_op,
        ),
        Definition::new(
            "curve",
            lambda(
                typename("T"),
                vec![
                    interpolation(),
                    number(),
                    nargs(vec![number(), typename("T")], None),
                ],
            ),
            impls::curve,
        ),
        // interpolation markers; meaningful only as `curve`'s first argument
        Definition::new("step", lambda(interpolation(), vec![]), impls::marker),
        Definition::new("linear", lambda(interpolation(), vec![]), impls::marker),
        Definition::new("exponential", lambda(interpolation(), vec![number()]), impls::marker),
    ]
    .into_iter()
    .map(|def| (def.name, def))
    .collect()
});

pub fn lookup(name: &str) -> Option<&'static Definition> {
    DEFINITIONS.get(name)
}
