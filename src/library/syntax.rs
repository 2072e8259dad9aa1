use super::err::CompileError;
use crate::dynamics::syntax::Compiled;
use crate::syntax::Call;
use crate::types::Lambda;
use crate::utils::key::Keyed;
use std::sync::Arc;

/// Turn a checked call and its compiled arguments into an evaluable node.
/// The argument order mirrors `Call::args`; lazy operators simply keep the
/// nodes they received uninvoked until evaluation picks a branch.
pub type CompileFn = fn(&Call, Vec<Compiled>) -> Result<Compiled, Keyed<CompileError>>;

/// One builtin: a declared signature plus its compile rule.
pub struct Definition {
    pub name: &'static str,
    pub ty: Arc<Lambda>,
    pub compile: CompileFn,
}

impl Definition {
    pub fn new(name: &'static str, ty: Arc<Lambda>, compile: CompileFn) -> Self {
        Definition { name, ty, compile }
    }
}
