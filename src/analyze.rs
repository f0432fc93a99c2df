use ndarray::Array2;
use rayon::prelude::*;

use crate::disc::{
    equation_of_state::{NVAR, State},
    exact_function::ExactFunction,
    finite_volume::load_state,
    mesh::Mesh2d,
};

fn add(a: State, b: State) -> State {
    std::array::from_fn(|k| a[k] + b[k])
}

/// Area-weighted L2 norm of an element field, per variable.
pub fn global_residual(mesh: &Mesh2d, u_t: &Array2<f64>) -> State {
    let sum = (0..mesh.elem_num)
        .into_par_iter()
        .map(|ielem| {
            let area = mesh.elements[ielem].area;
            let u = load_state(u_t, ielem);
            std::array::from_fn(|k| area * u[k] * u[k])
        })
        .reduce(|| [0.0; NVAR], add);
    let total_area = mesh.total_area();
    sum.map(|s| (s / total_area).sqrt())
}

#[derive(Clone, Copy, Debug)]
pub struct ErrorNorms {
    pub l1: State,
    pub l2: State,
    pub linf: State,
}

/// Errors of the primitive cell averages against the exact solution at the
/// barycenters.
pub fn error_norms(mesh: &Mesh2d, pvar: &Array2<f64>, exact: &ExactFunction, time: f64) -> ErrorNorms {
    let (l1, l2, linf) = (0..mesh.elem_num)
        .into_par_iter()
        .map(|ielem| {
            let elem = &mesh.elements[ielem];
            let reference = exact.evaluate(elem.bary, time);
            let state = load_state(pvar, ielem);
            let err: State = std::array::from_fn(|k| (state[k] - reference[k]).abs());
            (
                err.map(|e| elem.area * e),
                err.map(|e| elem.area * e * e),
                err,
            )
        })
        .reduce(
            || ([0.0; NVAR], [0.0; NVAR], [0.0; NVAR]),
            |a, b| (add(a.0, b.0), add(a.1, b.1), std::array::from_fn(|k| a.2[k].max(b.2[k]))),
        );
    let total_area = mesh.total_area();
    ErrorNorms {
        l1: l1.map(|e| e / total_area),
        l2: l2.map(|e| (e / total_area).sqrt()),
        linf,
    }
}
