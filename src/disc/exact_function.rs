use std::f64::consts::PI;

use super::{
    equation_of_state::{E, P, RHO, State, VX, VY, cons_prim, sound_speed},
    riemann_solver::exact::RiemannProblem,
};
use crate::error::{SolverError, SolverResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExactFunctionKind {
    RichtmyerMeshkov,
    GaussianPulse,
    SineWave,
    DoubleMach,
    RiemannProblem1d,
    AcousticWave,
}
impl TryFrom<usize> for ExactFunctionKind {
    type Error = SolverError;
    fn try_from(id: usize) -> SolverResult<Self> {
        match id {
            1 => Ok(Self::RichtmyerMeshkov),
            2 => Ok(Self::GaussianPulse),
            3 => Ok(Self::SineWave),
            4 => Ok(Self::DoubleMach),
            5 => Ok(Self::RiemannProblem1d),
            6 => Ok(Self::AcousticWave),
            _ => Err(SolverError::UnknownExactFunction(id)),
        }
    }
}

/// Bounding box and reference cell size of the computational domain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Domain {
    pub x_min: [f64; 2],
    pub x_max: [f64; 2],
    pub dx_ref: f64,
}
impl Domain {
    fn length(&self, dim: usize) -> f64 {
        self.x_max[dim] - self.x_min[dim]
    }
}

/// Left/right primitive states and interface position of a shock tube.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShockTube {
    pub left: State,
    pub right: State,
    pub interface: f64,
}

#[derive(Clone, Debug)]
pub struct ExactFunction {
    pub kind: ExactFunctionKind,
    pub domain: Domain,
    pub shock_tube: Option<ShockTube>,
    hcr: f64,
}
impl ExactFunction {
    pub fn new(
        kind: ExactFunctionKind,
        domain: Domain,
        shock_tube: Option<ShockTube>,
        hcr: f64,
    ) -> SolverResult<Self> {
        if kind == ExactFunctionKind::RiemannProblem1d && shock_tube.is_none() {
            return Err(SolverError::invalid_parameter(
                "exact function 5 needs left and right shock tube states",
            ));
        }
        Ok(Self {
            kind,
            domain,
            shock_tube,
            hcr,
        })
    }
    /// Primitive state at `x` and `time`.
    pub fn evaluate(&self, x: [f64; 2], time: f64) -> State {
        let hcr = self.hcr;
        match self.kind {
            ExactFunctionKind::RichtmyerMeshkov => {
                let x_len = self.domain.length(0);
                let y_len = self.domain.length(1);
                let mut prim = [1.0, 0.0, 0.0, 1.0];
                if x[0] >= 0.3 * x_len + x_len / 30.0 * (2.0 * PI * 3.0 / y_len * x[1]).cos() {
                    prim[RHO] = 0.25;
                }
                if x[0] <= 0.1 * x_len && x[0] >= x_len / 30.0 {
                    prim[RHO] = 4.22;
                    prim[P] = 4.9;
                }
                prim
            }
            ExactFunctionKind::GaussianPulse => {
                let half_width = self.domain.length(0).min(self.domain.length(1)) * 0.06;
                let peak = [
                    self.domain.x_min[0] + 0.5 * self.domain.length(0),
                    self.domain.x_min[1] + 0.5 * self.domain.length(1),
                ];
                let dr2 = (x[0] - peak[0]).powi(2) + (x[1] - peak[1]).powi(2);
                [1.0, 0.0, 0.0, 1.0 + 0.5f64.powf(dr2 / (half_width * half_width))]
            }
            ExactFunctionKind::SineWave => {
                let (amplitude, omega, a) = (0.1, PI, 2.0 * PI);
                let q = 2.0 + amplitude * (omega * (x[0] + x[1]) - a * time).sin();
                cons_prim(&[q, q, q, q * q], hcr)
            }
            ExactFunctionKind::DoubleMach => {
                let factor = PI / (0.2 * self.domain.dx_ref);
                let c_sum = [9.4, 57.157676649772950686, -33.0, 566.0];
                let c_diff = [6.6, 57.157676649772950686, -33.0, 561.0];
                let front = x[0] - (1.0 / 6.0 + (20.0 * time + x[1]) / 3f64.sqrt());
                let t = (front * factor).tanh();
                let cons: State = std::array::from_fn(|i| 0.5 * (c_sum[i] - c_diff[i] * t));
                cons_prim(&cons, hcr)
            }
            ExactFunctionKind::RiemannProblem1d => {
                let Some(tube) = self.shock_tube else {
                    return [1.0, 0.0, 0.0, 1.0];
                };
                if time == 0.0 {
                    let side = if x[0] <= tube.interface { tube.left } else { tube.right };
                    return [side[RHO], side[VX], 0.0, side[P]];
                }
                let w = RiemannProblem::new(&tube.left, &tube.right, hcr)
                    .sample((x[0] - tube.interface) / time);
                [w.rho, w.u, 0.0, w.p]
            }
            ExactFunctionKind::AcousticWave => {
                let (amplitude, omega) = (1e-5, PI);
                let cons0 = [1.0, 0.1, 0.0, 1.0];
                let prim0 = cons_prim(&cons0, hcr);
                let c0 = sound_speed(&prim0, hcr);
                let h0 = (cons0[E] + prim0[P]) / prim0[RHO];
                let eigenvector = [1.0, prim0[VX] + c0, prim0[VY], h0 + prim0[VX] * c0];
                let wave = amplitude * (omega * (x[0] - (c0 + prim0[VX]) * time)).sin();
                let cons: State = std::array::from_fn(|i| cons0[i] + eigenvector[i] * wave);
                cons_prim(&cons, hcr)
            }
        }
    }
}
