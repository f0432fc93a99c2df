use ndarray::{ArrayView2, ArrayViewMut2, Axis, Zip};

use super::{
    equation_of_state::{NVAR, State},
    finite_volume::load_state,
    mesh::{Element, Mesh2d},
};
use crate::error::{SolverError, SolverResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LimiterKind {
    BarthJespersen,
    Venkatakrishnan,
}
impl TryFrom<usize> for LimiterKind {
    type Error = SolverError;
    fn try_from(id: usize) -> SolverResult<Self> {
        match id {
            1 => Ok(Self::BarthJespersen),
            2 => Ok(Self::Venkatakrishnan),
            _ => Err(SolverError::UnknownLimiter(id)),
        }
    }
}

/// Piecewise constant (order 1) or limited piecewise linear (order 2)
/// reconstruction of the primitive variables.
#[derive(Clone, Debug)]
pub struct Reconstruction {
    pub order: usize,
    pub limiter: LimiterKind,
    venk_eps_sq: Vec<f64>, // per element
}
impl Reconstruction {
    pub fn new(order: usize, limiter: LimiterKind, venk_k: f64, mesh: &Mesh2d) -> SolverResult<Self> {
        if !(1..=2).contains(&order) {
            return Err(SolverError::invalid_parameter(format!(
                "spatial order must be 1 or 2, got {order}"
            )));
        }
        let venk_eps_sq = mesh
            .elements
            .iter()
            .map(|elem| (venk_k * elem.area.sqrt()).powi(3))
            .collect();
        Ok(Self {
            order,
            limiter,
            venk_eps_sq,
        })
    }
    pub fn is_second_order(&self) -> bool {
        self.order == 2
    }
    /// Limited least-squares gradients of every element. `pvar` holds all
    /// cells, ghosts included, and must have current ghost barycenter states.
    pub fn compute_gradients(
        &self,
        mesh: &Mesh2d,
        pvar: ArrayView2<f64>,
        mut grad_x: ArrayViewMut2<f64>,
        mut grad_y: ArrayViewMut2<f64>,
    ) {
        if !self.is_second_order() {
            grad_x.fill(0.0);
            grad_y.fill(0.0);
            return;
        }
        Zip::indexed(grad_x.axis_iter_mut(Axis(0)))
            .and(grad_y.axis_iter_mut(Axis(0)))
            .par_for_each(|ielem, mut gx, mut gy| {
                let elem = &mesh.elements[ielem];
                let (ux, uy) = self.limited_gradient(elem, ielem, &pvar);
                for ivar in 0..NVAR {
                    gx[ivar] = ux[ivar];
                    gy[ivar] = uy[ivar];
                }
            });
    }
    fn limited_gradient(&self, elem: &Element, ielem: usize, pvar: &ArrayView2<f64>) -> (State, State) {
        let own = load_state(pvar, ielem);
        let mut ux = [0.0; NVAR];
        let mut uy = [0.0; NVAR];
        let mut max_diff = [0.0; NVAR];
        let mut min_diff = [0.0; NVAR];
        for side in elem.sides.iter() {
            let neighbor = load_state(pvar, side.ineighbor);
            for ivar in 0..NVAR {
                let diff = neighbor[ivar] - own[ivar];
                ux[ivar] += side.weight[0] * diff;
                uy[ivar] += side.weight[1] * diff;
                max_diff[ivar] = f64::max(max_diff[ivar], diff);
                min_diff[ivar] = f64::min(min_diff[ivar], diff);
            }
        }
        let eps_sq = self.venk_eps_sq[ielem];
        let mut phi = [1.0; NVAR];
        for side in elem.sides.iter() {
            let [dx, dy] = side.face_offset;
            for ivar in 0..NVAR {
                let du = ux[ivar] * dx + uy[ivar] * dy;
                let bound = if du > 0.0 {
                    max_diff[ivar]
                } else if du < 0.0 {
                    min_diff[ivar]
                } else {
                    continue;
                };
                let phi_loc = match self.limiter {
                    LimiterKind::BarthJespersen => f64::min(1.0, bound / du),
                    LimiterKind::Venkatakrishnan => venkatakrishnan(bound, du, eps_sq),
                };
                phi[ivar] = f64::min(phi[ivar], phi_loc);
            }
        }
        (
            std::array::from_fn(|i| ux[i] * phi[i]),
            std::array::from_fn(|i| uy[i] * phi[i]),
        )
    }
}

/// Smooth limiter function; `bound` and `du` have the same sign.
fn venkatakrishnan(bound: f64, du: f64, eps_sq: f64) -> f64 {
    let bound_sq = bound * bound;
    let du_sq = du * du;
    (bound_sq + eps_sq + 2.0 * du * bound) / (bound_sq + 2.0 * du_sq + du * bound + eps_sq)
}

/// Extrapolates a cell average to `offset` from the barycenter.
pub fn face_state(mean: &State, grad_x: &State, grad_y: &State, offset: [f64; 2]) -> State {
    std::array::from_fn(|i| mean[i] + offset[0] * grad_x[i] + offset[1] * grad_y[i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disc::{gauss_points::GaussPointsTriangle, mesh::cartesian::CartesianMesh};
    use approx::assert_relative_eq;
    use ndarray::Array2;

    fn mesh() -> Mesh2d {
        let mut cartesian = CartesianMesh::uniform([0.0, 0.0], [1.0, 1.0], [4, 4], [401; 4]);
        cartesian.split_triangles = true;
        cartesian.build(&[], &GaussPointsTriangle::new(3).unwrap()).unwrap()
    }

    /// Cell field with ghosts copied from their owners.
    fn field(mesh: &Mesh2d, f: impl Fn([f64; 2]) -> f64) -> Array2<f64> {
        let mut pvar = Array2::zeros((mesh.cell_num(), NVAR));
        for (ielem, elem) in mesh.elements.iter().enumerate() {
            let value = f(elem.bary);
            pvar.row_mut(ielem).assign(&ndarray::arr1(&[1.0 + value, value, -value, 2.0 + value]));
        }
        for (ighost, ghost) in mesh.ghosts.iter().enumerate() {
            let owner = pvar.row(ghost.owner).to_owned();
            pvar.row_mut(mesh.elem_num + ighost).assign(&owner);
        }
        pvar
    }

    fn reconstruct(limiter: LimiterKind, venk_k: f64, mesh: &Mesh2d, pvar: &Array2<f64>) -> (Array2<f64>, Array2<f64>) {
        let reconstruction = Reconstruction::new(2, limiter, venk_k, mesh).unwrap();
        let mut gx = Array2::zeros((mesh.elem_num, NVAR));
        let mut gy = Array2::zeros((mesh.elem_num, NVAR));
        reconstruction.compute_gradients(mesh, pvar.view(), gx.view_mut(), gy.view_mut());
        (gx, gy)
    }

    #[test]
    fn unknown_limiter_is_rejected() {
        assert!(matches!(LimiterKind::try_from(3), Err(SolverError::UnknownLimiter(3))));
        assert!(Reconstruction::new(3, LimiterKind::BarthJespersen, 1.0, &mesh()).is_err());
    }

    #[test]
    fn limited_face_values_stay_within_neighbor_bounds() {
        let mesh = mesh();
        let pvar = field(&mesh, |x| (if x[0] + 0.3 * x[1] < 0.55 { 1.0 } else { 0.1 }) + x[1] * x[1]);
        for limiter in [LimiterKind::BarthJespersen, LimiterKind::Venkatakrishnan] {
            let (gx, gy) = reconstruct(limiter, 0.0, &mesh, &pvar);
            for (ielem, elem) in mesh.elements.iter().enumerate() {
                let own = load_state(&pvar, ielem);
                let mut lo = own;
                let mut hi = own;
                for side in elem.sides.iter() {
                    let nb = load_state(&pvar, side.ineighbor);
                    for i in 0..NVAR {
                        lo[i] = lo[i].min(nb[i]);
                        hi[i] = hi[i].max(nb[i]);
                    }
                }
                for side in elem.sides.iter() {
                    let face = face_state(&own, &load_state(&gx, ielem), &load_state(&gy, ielem), side.face_offset);
                    for i in 0..NVAR {
                        assert!(face[i] >= lo[i] - 1e-12 && face[i] <= hi[i] + 1e-12);
                    }
                }
            }
        }
    }

    #[test]
    fn limiter_factor_is_within_unit_interval() {
        let mesh = mesh();
        let pvar = field(&mesh, |x| (6.0 * x[0]).sin() * (4.0 * x[1]).cos());
        for limiter in [LimiterKind::BarthJespersen, LimiterKind::Venkatakrishnan] {
            let (gx, gy) = reconstruct(limiter, 1.0, &mesh, &pvar);
            for (ielem, elem) in mesh.elements.iter().enumerate() {
                let own = load_state(&pvar, ielem);
                let mut raw = [[0.0; NVAR]; 2];
                for side in elem.sides.iter() {
                    let nb = load_state(&pvar, side.ineighbor);
                    for i in 0..NVAR {
                        raw[0][i] += side.weight[0] * (nb[i] - own[i]);
                        raw[1][i] += side.weight[1] * (nb[i] - own[i]);
                    }
                }
                for i in 0..NVAR {
                    let norm = raw[0][i].hypot(raw[1][i]);
                    if norm > 1e-12 {
                        let phi = gx[[ielem, i]].hypot(gy[[ielem, i]]) / norm;
                        assert!((0.0..=1.0 + 1e-12).contains(&phi));
                    }
                }
            }
        }
    }

    #[test]
    fn linear_field_is_not_limited_on_interior_quads() {
        let mesh = CartesianMesh::uniform([0.0, 0.0], [1.0, 1.0], [4, 4], [401; 4])
            .build(&[], &GaussPointsTriangle::new(3).unwrap())
            .unwrap();
        let pvar = field(&mesh, |x| 2.0 * x[0] - x[1]);
        for limiter in [LimiterKind::BarthJespersen, LimiterKind::Venkatakrishnan] {
            let (gx, gy) = reconstruct(limiter, 1.0, &mesh, &pvar);
            for (ielem, elem) in mesh.elements.iter().enumerate() {
                if elem.sides.iter().any(|side| mesh.is_ghost(side.ineighbor)) {
                    continue;
                }
                assert_relative_eq!(gx[[ielem, 1]], 2.0, epsilon = 1e-10);
                assert_relative_eq!(gy[[ielem, 1]], -1.0, epsilon = 1e-10);
            }
        }
    }
}
