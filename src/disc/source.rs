use std::f64::consts::PI;

use super::equation_of_state::{E, FlowParameters, RHO, State, VX, VY};
use crate::error::{SolverError, SolverResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// Forcing that turns the advected sine wave into an exact solution.
    ManufacturedSine,
}
impl TryFrom<usize> for SourceKind {
    type Error = SolverError;
    fn try_from(id: usize) -> SolverResult<Self> {
        match id {
            1 => Ok(Self::ManufacturedSine),
            _ => Err(SolverError::UnknownSourceFunction(id)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SourceTerm {
    pub kind: SourceKind,
    flow: FlowParameters,
}
impl SourceTerm {
    pub fn new(kind: SourceKind, flow: &FlowParameters) -> Self {
        Self {
            kind,
            flow: flow.clone(),
        }
    }
    /// Pointwise source density in conservative variables.
    pub fn evaluate(&self, x: [f64; 2], time: f64) -> State {
        match self.kind {
            SourceKind::ManufacturedSine => {
                let hcr = self.flow.hcr;
                let (amplitude, omega, a) = (0.1, PI, 2.0 * PI);
                let phase = omega * (x[0] + x[1]) - a * time;
                let (cos1, sin1, sin2) = (phase.cos(), phase.sin(), (2.0 * phase).sin());
                let mut source = [0.0; 4];
                source[RHO] = (2.0 * omega - a) * cos1;
                source[VX] = (omega * (3.0 * hcr - 1.0) - a) * cos1
                    + amplitude * omega * (hcr - 1.0) * sin2;
                source[VY] = source[VX];
                source[E] = ((2.0 + 6.0 * hcr) * omega - 4.0 * a) * cos1
                    + amplitude * (2.0 * omega * hcr - a) * sin2
                    + 2.0 * self.flow.mu * hcr * omega * omega / self.flow.prandtl * sin1;
                source.map(|s| s * amplitude)
            }
        }
    }
    /// Integral of the source over an element, given its quadrature points and
    /// area-scaled weights.
    pub fn integrate(&self, points: &[[f64; 2]], weights: &[f64], time: f64) -> State {
        let mut total = [0.0; 4];
        for (x, w) in points.iter().zip(weights) {
            let s = self.evaluate(*x, time);
            for (t, s) in total.iter_mut().zip(s) {
                *t += s * w;
            }
        }
        total
    }
}
