//! Numerical flux functions for the 2-D Euler equations.
//!
//! Every scheme takes the left and right primitive states already rotated
//! into the face frame (normal velocity in `VX`) and returns the normal flux
//! in that frame. All schemes are consistent: `flux(s, s)` equals the
//! physical flux of `s`.
pub mod ausm;
pub mod central;
pub mod exact;
pub mod hll;
pub mod roe;
pub mod splitting;

use crate::error::{SolverError, SolverResult};

use super::equation_of_state::State;

/// Constant of the Harten entropy fix used by the Roe scheme.
pub const ENTROPY_FIX: f64 = 0.1;

pub type NumericalFlux = fn(&State, &State, f64) -> State;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RiemannSolverKind {
    Godunov,
    Roe,
    Hll,
    Hlle,
    Hllc,
    LaxFriedrichs,
    StegerWarming,
    Central,
    Ausmd,
    Ausmdv,
    VanLeer,
}
impl RiemannSolverKind {
    pub const ALL: [RiemannSolverKind; 11] = [
        Self::Godunov,
        Self::Roe,
        Self::Hll,
        Self::Hlle,
        Self::Hllc,
        Self::LaxFriedrichs,
        Self::StegerWarming,
        Self::Central,
        Self::Ausmd,
        Self::Ausmdv,
        Self::VanLeer,
    ];
    pub fn flux_function(self) -> NumericalFlux {
        match self {
            Self::Godunov => exact::godunov,
            Self::Roe => roe::roe,
            Self::Hll => hll::hll,
            Self::Hlle => hll::hlle,
            Self::Hllc => hll::hllc,
            Self::LaxFriedrichs => central::lax_friedrichs,
            Self::StegerWarming => splitting::steger_warming,
            Self::Central => central::central,
            Self::Ausmd => ausm::ausmd,
            Self::Ausmdv => ausm::ausmdv,
            Self::VanLeer => splitting::van_leer,
        }
    }
    pub fn name(self) -> &'static str {
        match self {
            Self::Godunov => "Godunov",
            Self::Roe => "Roe",
            Self::Hll => "HLL",
            Self::Hlle => "HLLE",
            Self::Hllc => "HLLC",
            Self::LaxFriedrichs => "Lax-Friedrichs",
            Self::StegerWarming => "Steger-Warming",
            Self::Central => "central",
            Self::Ausmd => "AUSMD",
            Self::Ausmdv => "AUSMDV",
            Self::VanLeer => "van Leer",
        }
    }
}
impl TryFrom<usize> for RiemannSolverKind {
    type Error = SolverError;
    fn try_from(id: usize) -> SolverResult<Self> {
        id.checked_sub(1)
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(SolverError::UnknownFluxFunction(id))
    }
}
