use nalgebra::{Matrix4, Vector4};
use ndarray::Array2;
use rayon::prelude::*;

use super::gmres::Preconditioner;
use crate::{
    disc::{
        equation_of_state::{State, cons_prim, floor_state, prim_cons},
        finite_difference::FiniteDifference,
        finite_volume::{SpatialResidualOperator, load_state, store_state},
        flux::{back_rotate, rotate},
    },
    error::{SolverError, SolverResult},
};

/// Block lower-upper symmetric Gauss-Seidel approximation of
/// `I - dt dR/dU` built from first-order face flux Jacobians.
pub struct LuSgs {
    diag_inv: Vec<Matrix4<f64>>,
    off_diag: Vec<Vec<(usize, Matrix4<f64>)>>, // per element: neighbor and coupling block
    fd: FiniteDifference,
}
impl LuSgs {
    pub fn new(elem_num: usize) -> Self {
        Self {
            diag_inv: vec![Matrix4::identity(); elem_num],
            off_diag: vec![Vec::new(); elem_num],
            fd: FiniteDifference::new(),
        }
    }
    /// Assembles and inverts the blocks around the conservative state `cvar`.
    pub fn assemble(
        &mut self,
        operator: &SpatialResidualOperator,
        cvar: &Array2<f64>,
        dt: f64,
        time: f64,
    ) -> SolverResult<()> {
        let mesh = operator.mesh;
        let hcr = operator.flow.hcr;
        let flux_fn = operator.flux_function();
        // first-order flux from `u_i` to `u_j` through a face with normal `n`
        let outgoing_flux = |u_i: &State, u_j: &State, n: [f64; 2]| -> State {
            let mut left = cons_prim(u_i, hcr);
            let mut right = cons_prim(u_j, hcr);
            floor_state(&mut left);
            floor_state(&mut right);
            back_rotate(&flux_fn(&rotate(&left, n), &rotate(&right, n), hcr), n)
        };
        let fd = self.fd;

        let blocks: Vec<(Matrix4<f64>, Vec<(usize, Matrix4<f64>)>)> = (0..mesh.elem_num)
            .into_par_iter()
            .map(|ielem| {
                let elem = &mesh.elements[ielem];
                let u_i = load_state(cvar, ielem);
                let scale = dt / elem.area;
                let mut diag = Matrix4::identity();
                let mut off = Vec::with_capacity(elem.sides.len());
                for side in elem.sides.iter() {
                    let face = &mesh.faces[side.iface];
                    let n = [side.sign * face.normal[0], side.sign * face.normal[1]];
                    let factor = scale * face.length;
                    if mesh.is_ghost(side.ineighbor) {
                        let ighost = side.ineighbor - mesh.elem_num;
                        let with_ghost = |u: &State| {
                            let inner = cons_prim(u, hcr);
                            let outer = operator.boundaries.ghost_state(ighost, &inner, n, face.midpoint, time);
                            outgoing_flux(u, &prim_cons(&outer, hcr), n)
                        };
                        diag += fd.jacobian(with_ghost, &u_i) * factor;
                        continue;
                    }
                    let u_j = load_state(cvar, side.ineighbor);
                    diag += fd.jacobian(|u| outgoing_flux(u, &u_j, n), &u_i) * factor;
                    let coupling = fd.jacobian(|u| outgoing_flux(&u_i, u, n), &u_j) * factor;
                    if side.ineighbor == ielem {
                        diag += coupling;
                    } else {
                        off.push((side.ineighbor, coupling));
                    }
                }
                (diag, off)
            })
            .collect();

        let (diag, off_diag): (Vec<_>, Vec<_>) = blocks.into_iter().unzip();
        self.diag_inv = invert_blocks(diag)?;
        self.off_diag = off_diag;
        Ok(())
    }
}

fn invert_blocks(diag: Vec<Matrix4<f64>>) -> SolverResult<Vec<Matrix4<f64>>> {
    diag.into_iter()
        .enumerate()
        .map(|(elem, block)| block.try_inverse().ok_or(SolverError::SingularBlock { elem }))
        .collect()
}

impl Preconditioner for LuSgs {
    /// One forward and one backward sweep in element order.
    fn apply(&self, v: &Array2<f64>, out: &mut Array2<f64>) -> SolverResult<()> {
        let elem_num = self.diag_inv.len();
        for ielem in 0..elem_num {
            let mut rhs = Vector4::from(load_state(v, ielem));
            for (jelem, block) in self.off_diag[ielem].iter().filter(|(j, _)| *j < ielem) {
                rhs -= block * Vector4::from(load_state(out, *jelem));
            }
            let y = self.diag_inv[ielem] * rhs;
            store_state(out, ielem, &y.into());
        }
        for ielem in (0..elem_num).rev() {
            let mut upper = Vector4::zeros();
            for (jelem, block) in self.off_diag[ielem].iter().filter(|(j, _)| *j > ielem) {
                upper += block * Vector4::from(load_state(out, *jelem));
            }
            let x = Vector4::from(load_state(out, ielem)) - self.diag_inv[ielem] * upper;
            store_state(out, ielem, &x.into());
        }
        Ok(())
    }
}
