use super::syntax::{Compiled, RtValue};
use crate::library::builtins;
use crate::library::err::CompileError;
use crate::syntax::{Call, Expr, Literal, Scalar};
use crate::utils::key::Keyed;

type Errors = Vec<Keyed<CompileError>>;

/// Walk a resolved AST and produce an evaluable closure tree. Purity flags
/// start true at literals, are conjoined across children, then conjoined
/// with whatever the registry rule reports for the node itself.
pub trait Compile {
    fn compile(&self) -> Result<Compiled, Errors>;
}

impl Compile for Expr {
    fn compile(&self) -> Result<Compiled, Errors> {
        match self {
            Expr::Literal(lit) => lit.compile(),
            Expr::Call(call) => call.compile(),
        }
    }
}

impl Compile for Literal {
    fn compile(&self) -> Result<Compiled, Errors> {
        let value = match &self.value {
            Scalar::Null => RtValue::Null,
            Scalar::Boolean(b) => RtValue::Boolean(*b),
            Scalar::Number(n) => RtValue::Number(*n),
            Scalar::String(s) => RtValue::String(s.clone()),
        };
        Ok(Compiled::constant(value))
    }
}

impl Compile for Call {
    fn compile(&self) -> Result<Compiled, Errors> {
        let mut errors: Errors = Vec::new();
        let mut children = Vec::with_capacity(self.args.len());
        for arg in &self.args {
            match arg.compile() {
                Ok(compiled) => children.push(compiled),
                Err(es) => errors.extend(es),
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let feature_constant = children.iter().all(|c| c.feature_constant);
        let zoom_constant = children.iter().all(|c| c.zoom_constant);

        let def = match builtins::lookup(self.name) {
            Some(def) => def,
            None => unreachable!("the parser only admits registry names"),
        };
        let mut out = (def.compile)(self, children).map_err(|e| vec![e])?;
        out.feature_constant &= feature_constant;
        out.zoom_constant &= zoom_constant;
        Ok(out)
    }
}
