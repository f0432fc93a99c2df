use ndarray::{Array2, Zip};

use super::TimeIntegrator;
use crate::{
    analyze::global_residual,
    disc::{
        equation_of_state::{NVAR, State},
        finite_volume::{FlowField, SpatialResidualOperator},
    },
    error::{SolverError, SolverResult},
};

/// Stage coefficients of the low-storage schemes, indexed by stage count and
/// formal order.
fn stage_coefficients(stages: usize, order: usize) -> Option<Vec<f64>> {
    let alpha = match (stages, order) {
        (1, 1) => vec![1.0],
        (3, 1) => vec![0.1481, 0.4, 1.0],
        (3, 2) => vec![0.1918, 0.4929, 1.0],
        (3, 3) => vec![1.0 / 3.0, 0.5, 1.0],
        (4, 1) => vec![0.0833, 0.2069, 0.4265, 1.0],
        (4, 2) => vec![0.1084, 0.2602, 0.5052, 1.0],
        (4, 3) => vec![0.25, 1.0 / 3.0, 0.5, 1.0],
        (5, 1) => vec![0.0533, 0.1263, 0.2375, 0.4414, 1.0],
        (5, 2) => vec![0.0695, 0.1602, 0.2898, 0.5060, 1.0],
        (5, 3) => vec![0.2, 0.25, 1.0 / 3.0, 0.5, 1.0],
        _ => return None,
    };
    Some(alpha)
}

/// Explicit multistage scheme `U_k = U_0 + alpha_k dt R(U_{k-1})`.
pub struct RungeKutta {
    pub stages: usize,
    pub order: usize,
    alpha: Vec<f64>,
    c: Vec<f64>, // stage times as fractions of dt
    snapshot: Array2<f64>,
}
impl RungeKutta {
    pub fn new(stages: usize, order: usize, elem_num: usize) -> SolverResult<Self> {
        let alpha =
            stage_coefficients(stages, order).ok_or(SolverError::UnsupportedRungeKutta { stages, order })?;
        let c = std::iter::once(0.0)
            .chain(alpha[..stages - 1].iter().copied())
            .collect();
        Ok(Self {
            stages,
            order,
            alpha,
            c,
            snapshot: Array2::zeros((elem_num, NVAR)),
        })
    }
}
impl TimeIntegrator for RungeKutta {
    fn step(
        &mut self,
        operator: &SpatialResidualOperator,
        field: &mut FlowField,
        time: f64,
        dt: f64,
    ) -> SolverResult<State> {
        let hcr = operator.flow.hcr;
        self.snapshot.assign(&field.cvar);
        let mut residual = [0.0; NVAR];
        for (istage, (&alpha, &c)) in self.alpha.iter().zip(self.c.iter()).enumerate() {
            operator.compute_residual(field, time + c * dt);
            if istage == 0 {
                residual = global_residual(operator.mesh, &field.u_t);
            }
            Zip::from(&mut field.cvar)
                .and(&self.snapshot)
                .and(&field.u_t)
                .par_for_each(|u, &u0, &u_t| *u = u0 + alpha * dt * u_t);
            field.cons_to_prim(hcr);
        }
        Ok(residual)
    }
    fn name(&self) -> String {
        format!("explicit Runge-Kutta, {} stages, order {}", self.stages, self.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disc::{
        boundary::{BoundaryCondition, BoundaryConditions, BoundaryKind, periodic_connections},
        equation_of_state::FlowParameters,
        finite_volume::store_state,
        gauss_points::GaussPointsTriangle,
        mesh::{Mesh2d, cartesian::CartesianMesh},
        reconstruction::{LimiterKind, Reconstruction},
        riemann_solver::RiemannSolverKind,
    };
    use approx::assert_relative_eq;

    #[test]
    fn coefficient_table() {
        for (stages, order) in [(1, 1), (3, 1), (3, 2), (3, 3), (4, 1), (4, 2), (4, 3), (5, 1), (5, 2), (5, 3)] {
            let rk = RungeKutta::new(stages, order, 1).unwrap();
            assert_eq!(rk.alpha.len(), stages);
            assert_eq!(rk.alpha[stages - 1], 1.0);
            assert_eq!(rk.c[0], 0.0);
        }
        let rk = RungeKutta::new(4, 3, 1).unwrap();
        assert_eq!(rk.c, vec![0.0, 0.25, 1.0 / 3.0, 0.5]);
    }

    #[test]
    fn unsupported_pairs_are_rejected() {
        for (stages, order) in [(2, 1), (1, 2), (3, 4), (6, 3)] {
            assert!(matches!(
                RungeKutta::new(stages, order, 1),
                Err(SolverError::UnsupportedRungeKutta { .. })
            ));
        }
    }

    fn periodic_strip() -> (Mesh2d, BoundaryConditions) {
        let cartesian = CartesianMesh::uniform([0.0, 0.0], [2.0, 1.0], [2, 1], [701, 702, 703, 704]);
        let conditions = vec![
            BoundaryCondition::new(701, BoundaryKind::Periodic([0.0, 1.0])),
            BoundaryCondition::new(702, BoundaryKind::Periodic([-2.0, 0.0])),
            BoundaryCondition::new(703, BoundaryKind::Periodic([0.0, -1.0])),
            BoundaryCondition::new(704, BoundaryKind::Periodic([2.0, 0.0])),
        ];
        let mesh = cartesian
            .build(&periodic_connections(&conditions), &GaussPointsTriangle::new(3).unwrap())
            .unwrap();
        let boundaries = BoundaryConditions::new(conditions, &mesh, 1.4, 0.0).unwrap();
        (mesh, boundaries)
    }

    #[test]
    fn uniform_periodic_state_is_stationary() {
        let (mesh, boundaries) = periodic_strip();
        let flow = FlowParameters::default();
        let reconstruction = Reconstruction::new(1, LimiterKind::BarthJespersen, 1.0, &mesh).unwrap();
        let operator =
            SpatialResidualOperator::new(&mesh, &boundaries, &flow, &reconstruction, None, RiemannSolverKind::Roe);
        let mut field = FlowField::new(&mesh);
        for ielem in 0..mesh.elem_num {
            store_state(&mut field.pvar, ielem, &[1.0, 0.3, 0.2, 1.0]);
        }
        field.prim_to_cons(flow.hcr);
        let before = field.cvar.clone();
        let mut rk = RungeKutta::new(1, 1, mesh.elem_num).unwrap();
        let residual = rk.step(&operator, &mut field, 0.0, 0.1).unwrap();
        for k in 0..4 {
            assert_relative_eq!(residual[k], 0.0, epsilon = 1e-14);
        }
        for (a, b) in field.cvar.iter().zip(before.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-14);
        }
    }

    #[test]
    fn multistage_step_conserves_totals() {
        let (mesh, boundaries) = periodic_strip();
        let flow = FlowParameters::default();
        let reconstruction = Reconstruction::new(1, LimiterKind::BarthJespersen, 1.0, &mesh).unwrap();
        let operator =
            SpatialResidualOperator::new(&mesh, &boundaries, &flow, &reconstruction, None, RiemannSolverKind::Hllc);
        let mut field = FlowField::new(&mesh);
        store_state(&mut field.pvar, 0, &[1.0, 0.1, 0.0, 1.0]);
        store_state(&mut field.pvar, 1, &[0.5, -0.1, 0.0, 0.4]);
        field.prim_to_cons(flow.hcr);
        let total = |field: &FlowField| -> State { std::array::from_fn(|k| field.cvar.column(k).sum()) };
        let before = total(&field);
        let mut rk = RungeKutta::new(3, 3, mesh.elem_num).unwrap();
        rk.step(&operator, &mut field, 0.0, 0.05).unwrap();
        let after = total(&field);
        for k in 0..4 {
            assert_relative_eq!(after[k], before[k], epsilon = 1e-13);
        }
    }
}
