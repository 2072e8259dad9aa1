use super::interpolate;
use super::syntax::{EvalContext, EvalError, Node, RtValue};

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Interpolation {
    Step,
    Linear,
    Exponential { base: f64 },
}

/// A validated curve: stop inputs are literal, strictly ascending numbers;
/// outputs stay as uninvoked nodes so only the chosen branch evaluates.
pub struct Curve {
    pub interpolation: Interpolation,
    pub stop_inputs: Vec<f64>,
    pub outputs: Vec<Node>,
}

impl Curve {
    pub fn evaluate(&self, x: f64, ctx: &EvalContext) -> Result<RtValue, EvalError> {
        let n = self.stop_inputs.len();
        if n == 1 || x <= self.stop_inputs[0] {
            return (self.outputs[0])(ctx);
        }
        if x >= self.stop_inputs[n - 1] {
            return (self.outputs[n - 1])(ctx);
        }
        let i = greatest_stop_index(&self.stop_inputs, x);
        match self.interpolation {
            Interpolation::Step => (self.outputs[i])(ctx),
            Interpolation::Linear | Interpolation::Exponential { .. } => {
                let base = match self.interpolation {
                    Interpolation::Exponential { base } => base,
                    _ => 1.0,
                };
                let t =
                    interpolation_factor(x, base, self.stop_inputs[i], self.stop_inputs[i + 1]);
                let lower = (self.outputs[i])(ctx)?;
                let upper = (self.outputs[i + 1])(ctx)?;
                interpolate::values(&lower, &upper, t)
            }
        }
    }
}

/// Greatest index with `stops[i] <= x`, clamped to `[0, n-2]`.
pub fn greatest_stop_index(stops: &[f64], x: f64) -> usize {
    let mut lo = 0;
    let mut hi = stops.len() - 1;
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if stops[mid] <= x {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    lo.min(stops.len().saturating_sub(2))
}

/// Position of `x` between two stops: linear for base 1, otherwise the
/// exponential ramp `(base^(x-x₀) - 1) / (base^(x₁-x₀) - 1)`.
pub fn interpolation_factor(x: f64, base: f64, lower: f64, upper: f64) -> f64 {
    let difference = upper - lower;
    let progress = x - lower;
    if base == 1.0 {
        progress / difference
    } else {
        (base.powf(progress) - 1.0) / (base.powf(difference) - 1.0)
    }
}
