pub mod types;
pub mod syntax;

pub mod parse {
    pub mod json;
    pub mod err;

    pub use json::parse;
}

pub mod statics {
    pub mod tyck;
    pub mod err;

    pub use tyck::TypeCheck;
}

pub mod library {
    pub mod syntax;
    pub mod err;
    pub mod builtins;
    mod impls;
}

pub mod dynamics {
    pub mod syntax;
    pub mod eval;
    pub mod curve;
    pub mod interpolate;
    pub mod color;

    pub use eval::Compile;
}

pub mod utils {
    pub mod key;
}

pub mod prelude {
    pub use crate::dynamics::syntax::{EvalError, Feature};
    pub use crate::style::{compile, Diagnostic};
    pub use crate::types::Type;
    pub use crate::utils::key::{Key, Keyed};
}

pub mod style;
