use hashbrown::HashMap;

use super::{
    equation_of_state::{MY, P, RHO, State, VX, VY, char_cons, cons_char, cons_prim, prim_cons, sound_speed},
    exact_function::ExactFunction,
    flux::{back_rotate, rotate},
    mesh::{Mesh2d, PeriodicConnection},
};
use crate::error::{SolverError, SolverResult};

/// Boundary type encoded in the hundreds digit of a boundary code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryType {
    SlipWall,
    ViscousWall,
    Inflow,
    Outflow,
    Characteristic,
    ExactSolution,
    Periodic,
    PressureOutlet,
}
impl BoundaryType {
    pub fn from_code(code: usize) -> SolverResult<Self> {
        match code / 100 {
            1 => Ok(Self::SlipWall),
            2 => Ok(Self::ViscousWall),
            3 => Ok(Self::Inflow),
            4 => Ok(Self::Outflow),
            5 => Ok(Self::Characteristic),
            6 => Ok(Self::ExactSolution),
            7 => Ok(Self::Periodic),
            8 => Ok(Self::PressureOutlet),
            _ => Err(SolverError::UnknownBoundaryType(code)),
        }
    }
}

/// Thermal condition of a no-slip wall.
///
/// Only the velocity of the ghost state depends on the wall type; the
/// temperature and heat flux values are carried for a viscous flux and are
/// not read by the inviscid residual.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WallHeat {
    Adiabatic,
    Temperature(f64),
    HeatFlux(f64),
}

#[derive(Clone, Debug)]
pub enum BoundaryKind {
    SlipWall,
    ViscousWall(WallHeat),
    Inflow(State), // reservoir primitive state
    Outflow,
    Characteristic(State),
    ExactSolution(ExactFunction),
    Periodic([f64; 2]), // connection vector
    PressureOutlet(f64),
}

#[derive(Clone, Debug)]
pub struct BoundaryCondition {
    pub code: usize,
    pub kind: BoundaryKind,
}
impl BoundaryCondition {
    pub fn new(code: usize, kind: BoundaryKind) -> Self {
        Self { code, kind }
    }
    pub fn name(&self) -> &'static str {
        match self.kind {
            BoundaryKind::SlipWall => "slip wall",
            BoundaryKind::ViscousWall(_) => "no-slip wall",
            BoundaryKind::Inflow(_) => "inflow",
            BoundaryKind::Outflow => "outflow",
            BoundaryKind::Characteristic(_) => "characteristic",
            BoundaryKind::ExactSolution(_) => "exact solution",
            BoundaryKind::Periodic(_) => "periodic",
            BoundaryKind::PressureOutlet(_) => "pressure outlet",
        }
    }
    /// Exterior primitive state behind a face with unit normal `n` pointing
    /// out of the domain. `x` is where the state is needed.
    pub fn ghost_state(&self, inner: &State, n: [f64; 2], x: [f64; 2], time: f64, hcr: f64, mu: f64) -> State {
        match &self.kind {
            BoundaryKind::SlipWall => mirror_velocity(inner, n, false),
            BoundaryKind::ViscousWall(_) => mirror_velocity(inner, n, mu > 0.0),
            BoundaryKind::Inflow(reservoir) => *reservoir,
            BoundaryKind::Outflow => *inner,
            BoundaryKind::Characteristic(reservoir) => characteristic(inner, reservoir, n, hcr),
            BoundaryKind::ExactSolution(exact) => exact.evaluate(x, time),
            // glued to an interior face when the mesh is built
            BoundaryKind::Periodic(_) => *inner,
            BoundaryKind::PressureOutlet(pressure) => {
                let c = sound_speed(inner, hcr);
                let vn = n[0] * inner[VX] + n[1] * inner[VY];
                let p = if vn / c < 1.0 { *pressure } else { inner[P] };
                [inner[RHO] * p / inner[P], inner[VX], inner[VY], p]
            }
        }
    }
}

/// Mirrors the normal velocity, and the tangential one for no-slip walls.
fn mirror_velocity(inner: &State, n: [f64; 2], no_slip: bool) -> State {
    let mut local = rotate(inner, n);
    local[VX] = -local[VX];
    if no_slip {
        local[VY] = -local[VY];
    }
    back_rotate(&local, n)
}

/// Far-field state built from the interior characteristics on outgoing waves
/// and the reservoir characteristics on incoming waves.
fn characteristic(inner: &State, reservoir: &State, n: [f64; 2], hcr: f64) -> State {
    let c = sound_speed(reservoir, hcr);
    let v = n[0] * reservoir[VX] + n[1] * reservoir[VY];
    let inner_local = rotate(inner, n);
    let inner_cons = prim_cons(&inner_local, hcr);
    let mut ghost_cons = prim_cons(&rotate(reservoir, n), hcr);
    let inner_char = cons_char(&inner_cons, &inner_local, hcr);
    let mut ghost_char = cons_char(&ghost_cons, &inner_local, hcr);
    if v + c > 0.0 {
        ghost_char[2] = inner_char[2];
    }
    if v > 0.0 {
        ghost_char[1] = inner_char[1];
    }
    if v - c > 0.0 {
        ghost_char[0] = inner_char[0];
    }
    char_cons(&ghost_char, &inner_local, hcr, &mut ghost_cons);
    if v > 0.0 {
        ghost_cons[MY] = inner_cons[MY];
    }
    back_rotate(&cons_prim(&ghost_cons, hcr), n)
}

/// Boundary conditions of a run, resolved against the ghost cells of a mesh.
#[derive(Clone, Debug)]
pub struct BoundaryConditions {
    pub conditions: Vec<BoundaryCondition>,
    ghost_condition: Vec<usize>, // per ghost cell, index into `conditions`
    hcr: f64,
    mu: f64,
}
impl BoundaryConditions {
    pub fn new(conditions: Vec<BoundaryCondition>, mesh: &Mesh2d, hcr: f64, mu: f64) -> SolverResult<Self> {
        let mut by_code: HashMap<usize, usize> = HashMap::new();
        for (ibc, bc) in conditions.iter().enumerate() {
            if by_code.insert(bc.code, ibc).is_some() {
                return Err(SolverError::invalid_parameter(format!(
                    "boundary code {} defined twice",
                    bc.code
                )));
            }
        }
        let ghost_condition = mesh
            .ghosts
            .iter()
            .map(|ghost| {
                by_code
                    .get(&ghost.code)
                    .copied()
                    .ok_or(SolverError::UnknownBoundaryType(ghost.code))
            })
            .collect::<SolverResult<Vec<_>>>()?;
        Ok(Self {
            conditions,
            ghost_condition,
            hcr,
            mu,
        })
    }
    pub fn condition(&self, ighost: usize) -> &BoundaryCondition {
        &self.conditions[self.ghost_condition[ighost]]
    }
    pub fn ghost_state(&self, ighost: usize, inner: &State, n: [f64; 2], x: [f64; 2], time: f64) -> State {
        self.condition(ighost).ghost_state(inner, n, x, time, self.hcr, self.mu)
    }
}

/// Connection vectors of all periodic conditions, for gluing the mesh.
pub fn periodic_connections(conditions: &[BoundaryCondition]) -> Vec<PeriodicConnection> {
    conditions
        .iter()
        .filter_map(|bc| match bc.kind {
            BoundaryKind::Periodic(connection) => Some(PeriodicConnection {
                code: bc.code,
                connection,
            }),
            _ => None,
        })
        .collect()
}
