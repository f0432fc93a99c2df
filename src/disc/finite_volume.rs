use ndarray::{Array1, Array2, ArrayBase, Axis, Data, DataMut, Ix2, Zip, s};
use ndarray_stats::QuantileExt;

use super::{
    boundary::BoundaryConditions,
    equation_of_state::{FlowParameters, NVAR, P, RHO, State, VX, VY, cons_prim, floor_state, prim_cons, sound_speed},
    flux::{back_rotate, rotate},
    mesh::Mesh2d,
    reconstruction::{Reconstruction, face_state},
    riemann_solver::{NumericalFlux, RiemannSolverKind},
    source::SourceTerm,
};
use crate::error::{SolverError, SolverResult};

pub fn load_state<S: Data<Elem = f64>>(array: &ArrayBase<S, Ix2>, i: usize) -> State {
    std::array::from_fn(|k| array[[i, k]])
}

pub fn store_state<S: DataMut<Elem = f64>>(array: &mut ArrayBase<S, Ix2>, i: usize, state: &State) {
    for (k, value) in state.iter().enumerate() {
        array[[i, k]] = *value;
    }
}

/// Cell, face and element arrays of the discrete flow field.
#[derive(Clone, Debug)]
pub struct FlowField {
    pub pvar: Array2<f64>,   // primitive state of elements, then ghosts
    pub cvar: Array2<f64>,   // conservative state of elements
    pub grad_x: Array2<f64>, // limited primitive gradients
    pub grad_y: Array2<f64>,
    pub u_t: Array2<f64>,    // conservative time derivative
    pub source: Array2<f64>, // integrated source per element
    pub flux: Array2<f64>,   // numerical flux per unit face length, owner to neighbor
    pub dt_loc: Array1<f64>,
}
impl FlowField {
    pub fn new(mesh: &Mesh2d) -> Self {
        let elem_num = mesh.elem_num;
        Self {
            pvar: Array2::zeros((mesh.cell_num(), NVAR)),
            cvar: Array2::zeros((elem_num, NVAR)),
            grad_x: Array2::zeros((elem_num, NVAR)),
            grad_y: Array2::zeros((elem_num, NVAR)),
            u_t: Array2::zeros((elem_num, NVAR)),
            source: Array2::zeros((elem_num, NVAR)),
            flux: Array2::zeros((mesh.face_num, NVAR)),
            dt_loc: Array1::zeros(elem_num),
        }
    }
    pub fn elem_num(&self) -> usize {
        self.cvar.nrows()
    }
    /// Updates the element primitive states from the conservative ones.
    pub fn cons_to_prim(&mut self, hcr: f64) {
        let elem_num = self.elem_num();
        let mut pvar = self.pvar.slice_mut(s![..elem_num, ..]);
        Zip::from(pvar.axis_iter_mut(Axis(0)))
            .and(self.cvar.axis_iter(Axis(0)))
            .par_for_each(|mut prim, cons| {
                let state = cons_prim(&[cons[0], cons[1], cons[2], cons[3]], hcr);
                for k in 0..NVAR {
                    prim[k] = state[k];
                }
            });
    }
    /// Updates the conservative states from the element primitive ones.
    pub fn prim_to_cons(&mut self, hcr: f64) {
        let elem_num = self.elem_num();
        let pvar = self.pvar.slice(s![..elem_num, ..]);
        Zip::from(self.cvar.axis_iter_mut(Axis(0)))
            .and(pvar.axis_iter(Axis(0)))
            .par_for_each(|mut cons, prim| {
                let state = prim_cons(&[prim[0], prim[1], prim[2], prim[3]], hcr);
                for k in 0..NVAR {
                    cons[k] = state[k];
                }
            });
    }
}

/// Finite-volume discretisation of the Euler equations: reconstruction,
/// boundary states, numerical fluxes and sources assembled into the time
/// derivative of every element.
pub struct SpatialResidualOperator<'a> {
    pub mesh: &'a Mesh2d,
    pub boundaries: &'a BoundaryConditions,
    pub flow: &'a FlowParameters,
    pub reconstruction: &'a Reconstruction,
    pub source: Option<&'a SourceTerm>,
    pub riemann_solver: RiemannSolverKind,
    flux_fn: NumericalFlux,
}
impl<'a> SpatialResidualOperator<'a> {
    pub fn new(
        mesh: &'a Mesh2d,
        boundaries: &'a BoundaryConditions,
        flow: &'a FlowParameters,
        reconstruction: &'a Reconstruction,
        source: Option<&'a SourceTerm>,
        riemann_solver: RiemannSolverKind,
    ) -> Self {
        Self {
            mesh,
            boundaries,
            flow,
            reconstruction,
            source,
            riemann_solver,
            flux_fn: riemann_solver.flux_function(),
        }
    }
    pub fn flux_function(&self) -> NumericalFlux {
        self.flux_fn
    }
    /// Evaluates `u_t` from the element primitive states in `field.pvar`.
    pub fn compute_residual(&self, field: &mut FlowField, time: f64) {
        let mesh = self.mesh;
        let hcr = self.flow.hcr;
        let second_order = self.reconstruction.is_second_order();
        let FlowField {
            pvar,
            grad_x,
            grad_y,
            u_t,
            source,
            flux,
            ..
        } = field;

        if second_order {
            self.set_ghost_barycenter_states(pvar, time);
            self.reconstruction
                .compute_gradients(mesh, pvar.view(), grad_x.view_mut(), grad_y.view_mut());
        }

        let pvar = pvar.view();
        let (grad_x, grad_y) = (grad_x.view(), grad_y.view());
        let extrapolate = |ielem: usize, offset: [f64; 2]| {
            let mean = load_state(&pvar, ielem);
            if !second_order {
                return mean;
            }
            let mut state = face_state(&mean, &load_state(&grad_x, ielem), &load_state(&grad_y, ielem), offset);
            floor_state(&mut state);
            state
        };
        let flux_fn = self.flux_fn;
        Zip::indexed(flux.axis_iter_mut(Axis(0))).par_for_each(|iface, mut face_flux| {
            let face = &mesh.faces[iface];
            let owner = &mesh.elements[face.owner];
            let left = extrapolate(face.owner, owner.sides[face.owner_side].face_offset);
            let right = match face.neighbor_side {
                Some(k) => extrapolate(face.neighbor, mesh.elements[face.neighbor].sides[k].face_offset),
                None => self.boundaries.ghost_state(
                    face.neighbor - mesh.elem_num,
                    &left,
                    face.normal,
                    face.midpoint,
                    time,
                ),
            };
            let f = flux_fn(&rotate(&left, face.normal), &rotate(&right, face.normal), hcr);
            let f = back_rotate(&f, face.normal);
            for k in 0..NVAR {
                face_flux[k] = f[k];
            }
        });

        if let Some(source_term) = self.source {
            Zip::indexed(source.axis_iter_mut(Axis(0))).par_for_each(|ielem, mut s| {
                let elem = &mesh.elements[ielem];
                let integral = source_term.integrate(&elem.quad_points, &elem.quad_weights, time);
                for k in 0..NVAR {
                    s[k] = integral[k];
                }
            });
        }

        let flux = flux.view();
        let source = source.view();
        Zip::indexed(u_t.axis_iter_mut(Axis(0))).par_for_each(|ielem, mut u| {
            let elem = &mesh.elements[ielem];
            let mut sum = load_state(&source, ielem);
            for side in elem.sides.iter() {
                let length = mesh.faces[side.iface].length;
                for k in 0..NVAR {
                    sum[k] -= side.sign * flux[[side.iface, k]] * length;
                }
            }
            for k in 0..NVAR {
                u[k] = sum[k] / elem.area;
            }
        });
    }
    /// Ghost states at the mirrored barycenters, from the owner averages.
    fn set_ghost_barycenter_states(&self, pvar: &mut Array2<f64>, time: f64) {
        let mesh = self.mesh;
        let (elements, mut ghosts) = pvar.view_mut().split_at(Axis(0), mesh.elem_num);
        let elements = elements.view();
        Zip::indexed(ghosts.axis_iter_mut(Axis(0))).par_for_each(|ighost, mut state| {
            let ghost = &mesh.ghosts[ighost];
            let inner = load_state(&elements, ghost.owner);
            let normal = mesh.faces[ghost.iface].normal;
            let outer = self.boundaries.ghost_state(ighost, &inner, normal, ghost.bary, time);
            for k in 0..NVAR {
                state[k] = outer[k];
            }
        });
    }
    /// Local convective time steps and their minimum.
    pub fn compute_time_step(&self, field: &mut FlowField, cfl: f64) -> SolverResult<f64> {
        let mesh = self.mesh;
        let hcr = self.flow.hcr;
        let pvar = field.pvar.view();
        Zip::indexed(&mut field.dt_loc).par_for_each(|ielem, dt| {
            let elem = &mesh.elements[ielem];
            let prim = load_state(&pvar, ielem);
            let c = sound_speed(&prim, hcr);
            *dt = cfl * elem.area / (elem.sx * (prim[VX].abs() + c) + elem.sy * (prim[VY].abs() + c));
        });
        if let Some(elem) = field.dt_loc.iter().position(|dt| !dt.is_finite() || *dt <= 0.0) {
            let prim = load_state(&field.pvar, elem);
            log::error!(
                "time step in element {elem} is {} (rho = {}, p = {})",
                field.dt_loc[elem],
                prim[RHO],
                prim[P]
            );
            return Err(SolverError::NonFiniteTimeStep { elem });
        }
        field
            .dt_loc
            .min()
            .copied()
            .map_err(|_| SolverError::invalid_mesh("no elements to take a time step on"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disc::{
        boundary::{BoundaryCondition, BoundaryKind},
        gauss_points::GaussPointsTriangle,
        mesh::{PeriodicConnection, cartesian::CartesianMesh},
        reconstruction::LimiterKind,
    };
    use approx::assert_abs_diff_eq;

    fn periodic_box(split_triangles: bool) -> (Mesh2d, BoundaryConditions) {
        let mut cartesian = CartesianMesh::uniform([0.0, 0.0], [1.0, 1.0], [5, 4], [701, 702, 703, 704]);
        cartesian.split_triangles = split_triangles;
        let connections = [[0.0, 1.0], [-1.0, 0.0], [0.0, -1.0], [1.0, 0.0]];
        let conditions: Vec<BoundaryCondition> = (0..4)
            .map(|i| BoundaryCondition::new(701 + i, BoundaryKind::Periodic(connections[i])))
            .collect();
        let periodic: Vec<PeriodicConnection> = crate::disc::boundary::periodic_connections(&conditions);
        let mesh = cartesian.build(&periodic, &GaussPointsTriangle::new(3).unwrap()).unwrap();
        let boundaries = BoundaryConditions::new(conditions, &mesh, 1.4, 0.0).unwrap();
        (mesh, boundaries)
    }

    fn smooth_field(mesh: &Mesh2d, hcr: f64) -> FlowField {
        let mut field = FlowField::new(mesh);
        for (ielem, elem) in mesh.elements.iter().enumerate() {
            let [x, y] = elem.bary;
            let prim = [
                1.0 + 0.2 * (6.0 * x).sin(),
                0.3 + 0.1 * (4.0 * y).cos(),
                -0.2 * x,
                1.0 + 0.1 * (x * y),
            ];
            store_state(&mut field.pvar, ielem, &prim);
        }
        field.prim_to_cons(hcr);
        field
    }

    #[test]
    fn periodic_domain_conserves_all_variables() {
        let flow = FlowParameters::default();
        for split in [false, true] {
            let (mesh, boundaries) = periodic_box(split);
            for order in [1, 2] {
                let reconstruction = Reconstruction::new(order, LimiterKind::Venkatakrishnan, 1.0, &mesh).unwrap();
                for kind in RiemannSolverKind::ALL {
                    let operator = SpatialResidualOperator::new(&mesh, &boundaries, &flow, &reconstruction, None, kind);
                    let mut field = smooth_field(&mesh, flow.hcr);
                    operator.compute_residual(&mut field, 0.0);
                    for k in 0..NVAR {
                        let total: f64 = mesh
                            .elements
                            .iter()
                            .enumerate()
                            .map(|(ielem, elem)| elem.area * field.u_t[[ielem, k]])
                            .sum();
                        assert_abs_diff_eq!(total, 0.0, epsilon = 1e-12);
                    }
                }
            }
        }
    }

    #[test]
    fn conversions_round_trip() {
        let (mesh, _) = periodic_box(false);
        let mut field = smooth_field(&mesh, 1.4);
        let before = field.pvar.clone();
        field.pvar.fill(0.0);
        field.cons_to_prim(1.4);
        for (a, b) in field.pvar.iter().zip(before.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-13);
        }
    }

    #[test]
    fn time_step_follows_cfl_condition() {
        let (mesh, boundaries) = periodic_box(false);
        let flow = FlowParameters::default();
        let reconstruction = Reconstruction::new(1, LimiterKind::BarthJespersen, 1.0, &mesh).unwrap();
        let operator =
            SpatialResidualOperator::new(&mesh, &boundaries, &flow, &reconstruction, None, RiemannSolverKind::Roe);
        let mut field = FlowField::new(&mesh);
        for ielem in 0..mesh.elem_num {
            store_state(&mut field.pvar, ielem, &[1.4, 0.5, 0.0, 1.0]);
        }
        let dt = operator.compute_time_step(&mut field, 0.5).unwrap();
        // c = 1, dx = 0.2, dy = 0.25
        let expected = 0.5 * 0.05 / (0.25 * 1.5 + 0.2 * 1.0);
        assert_abs_diff_eq!(dt, expected, epsilon = 1e-14);

        store_state(&mut field.pvar, 3, &[0.0, 0.0, 0.0, 1.0]);
        assert!(matches!(
            operator.compute_time_step(&mut field, 0.5),
            Err(SolverError::NonFiniteTimeStep { elem: 3 })
        ));
    }
}
