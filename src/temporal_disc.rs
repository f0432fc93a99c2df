pub mod gmres;
pub mod lusgs;
pub mod newton;
pub mod runge_kutta;

use crate::{
    disc::{
        equation_of_state::State,
        finite_volume::{FlowField, SpatialResidualOperator},
    },
    error::SolverResult,
};

pub use newton::{ImplicitSolver, NewtonParameters};
pub use runge_kutta::RungeKutta;

/// Advances a flow field by one time step and reports the area-weighted L2
/// norm of the residual per conservative variable.
pub trait TimeIntegrator {
    fn step(
        &mut self,
        operator: &SpatialResidualOperator,
        field: &mut FlowField,
        time: f64,
        dt: f64,
    ) -> SolverResult<State>;
    fn name(&self) -> String;
}

pub enum TimeScheme {
    Explicit(RungeKutta),
    Implicit(Box<ImplicitSolver>),
}
impl TimeScheme {
    pub fn integrator(&mut self) -> &mut dyn TimeIntegrator {
        match self {
            TimeScheme::Explicit(rk) => rk,
            TimeScheme::Implicit(newton) => newton.as_mut(),
        }
    }
    pub fn is_implicit(&self) -> bool {
        matches!(self, TimeScheme::Implicit(_))
    }
}
