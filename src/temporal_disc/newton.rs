use log::{debug, warn};
use ndarray::{Array2, Zip};
use serde::Deserialize;

use super::{
    TimeIntegrator,
    gmres::{Gmres, IdentityPreconditioner, LinearOperator, norm},
    lusgs::LuSgs,
};
use crate::{
    analyze::global_residual,
    disc::{
        equation_of_state::{NVAR, State},
        finite_difference::FiniteDifference,
        finite_volume::{FlowField, SpatialResidualOperator},
        mesh::Mesh2d,
    },
    error::{SolverError, SolverResult},
};

const MAX_FORCING: f64 = 0.999;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct NewtonParameters {
    pub eps_newton: f64,
    pub eps_gmres: f64,
    pub n_newton_iter: usize,
    pub gamma_ew: f64, // Eisenstat-Walker gamma
    pub n_kdim: usize,
    pub n_gmres_restarts: usize,
    pub precond: bool,
}
impl Default for NewtonParameters {
    fn default() -> Self {
        Self {
            eps_newton: 1e-3,
            eps_gmres: 1e-3,
            n_newton_iter: 20,
            gamma_ew: 0.9,
            n_kdim: 5,
            n_gmres_restarts: 0,
            precond: false,
        }
    }
}

/// Matrix-free `J v = v - dt (R(x + h v) - R(x)) / h`.
struct JacobianOperator<'a, 'b> {
    operator: &'a SpatialResidualOperator<'b>,
    cvar: &'a Array2<f64>,
    u_t: &'a Array2<f64>,
    scratch: &'a mut FlowField,
    fd: FiniteDifference,
    dt: f64,
    time: f64,
}
impl LinearOperator for JacobianOperator<'_, '_> {
    fn apply(&mut self, v: &Array2<f64>, out: &mut Array2<f64>) -> SolverResult<()> {
        let v_norm = norm(v);
        if v_norm == 0.0 {
            out.fill(0.0);
            return Ok(());
        }
        let h = self.fd.directional_step(v_norm);
        Zip::from(&mut self.scratch.cvar)
            .and(self.cvar)
            .and(v)
            .par_for_each(|u, &x, &v| *u = x + h * v);
        self.scratch.cons_to_prim(self.operator.flow.hcr);
        self.operator.compute_residual(self.scratch, self.time);
        let dt = self.dt;
        Zip::from(out)
            .and(v)
            .and(&self.scratch.u_t)
            .and(self.u_t)
            .par_for_each(|o, &v, &r_h, &r| *o = v - dt * (r_h - r) / h);
        Ok(())
    }
}

/// Backward Euler step solved by an inexact Newton method with matrix-free
/// GMRES and an optional LU-SGS preconditioner.
pub struct ImplicitSolver {
    pub params: NewtonParameters,
    gmres: Gmres,
    lusgs: Option<LuSgs>,
    fd: FiniteDifference,
    x0: Array2<f64>,
    f: Array2<f64>, // F(x) = x - x0 - dt R(x)
    rhs: Array2<f64>,
    delta: Array2<f64>,
    scratch: FlowField,
}
impl ImplicitSolver {
    pub fn new(params: NewtonParameters, mesh: &Mesh2d) -> Self {
        let shape = (mesh.elem_num, NVAR);
        Self {
            gmres: Gmres::new(params.n_kdim, params.n_gmres_restarts, shape),
            lusgs: params.precond.then(|| LuSgs::new(mesh.elem_num)),
            params,
            fd: FiniteDifference::new(),
            x0: Array2::zeros(shape),
            f: Array2::zeros(shape),
            rhs: Array2::zeros(shape),
            delta: Array2::zeros(shape),
            scratch: FlowField::new(mesh),
        }
    }
    /// Evaluates `F` at the state in `field` and returns `|F|`.
    fn newton_function(
        &mut self,
        operator: &SpatialResidualOperator,
        field: &mut FlowField,
        time: f64,
        dt: f64,
    ) -> f64 {
        operator.compute_residual(field, time);
        Zip::from(&mut self.f)
            .and(&field.cvar)
            .and(&self.x0)
            .and(&field.u_t)
            .par_for_each(|f, &x, &x0, &r| *f = x - x0 - dt * r);
        norm(&self.f)
    }
    /// Eisenstat-Walker forcing term for the next linear solve.
    fn forcing_term(&self, eta: f64, f_norm: f64, f_prev_norm: f64, f0_norm: f64) -> f64 {
        let gamma = self.params.gamma_ew;
        let mut eta_new = gamma * (f_norm / f_prev_norm).powi(2);
        let safeguard = gamma * eta * eta;
        if safeguard > 0.1 {
            eta_new = eta_new.max(safeguard);
        }
        eta_new = eta_new.max(0.5 * self.params.eps_newton * f0_norm / f_norm);
        if eta_new > MAX_FORCING {
            warn!("forcing term {eta_new:.3e} clamped to {MAX_FORCING}");
            eta_new = MAX_FORCING;
        }
        eta_new
    }
}
impl TimeIntegrator for ImplicitSolver {
    fn step(
        &mut self,
        operator: &SpatialResidualOperator,
        field: &mut FlowField,
        time: f64,
        dt: f64,
    ) -> SolverResult<State> {
        let hcr = operator.flow.hcr;
        let t_new = time + dt;
        self.x0.assign(&field.cvar);
        let f0_norm = self.newton_function(operator, field, t_new, dt);
        if f0_norm == 0.0 {
            return Ok(global_residual(operator.mesh, &field.u_t));
        }
        if let Some(lusgs) = self.lusgs.as_mut() {
            lusgs.assemble(operator, &self.x0, dt, t_new)?;
        }
        let eps_sq = self.params.eps_newton * self.params.eps_newton;
        let mut f_norm = f0_norm;
        let mut eta = self.params.eps_gmres;
        for iter in 1..=self.params.n_newton_iter {
            self.rhs.assign(&self.f);
            self.rhs.mapv_inplace(|f| -f);
            self.delta.fill(0.0);
            let mut jacobian = JacobianOperator {
                operator,
                cvar: &field.cvar,
                u_t: &field.u_t,
                scratch: &mut self.scratch,
                fd: self.fd,
                dt,
                time: t_new,
            };
            let outcome = match self.lusgs.as_ref() {
                Some(lusgs) => self.gmres.solve(&mut jacobian, lusgs, &self.rhs, &mut self.delta, eta)?,
                None => self
                    .gmres
                    .solve(&mut jacobian, &IdentityPreconditioner, &self.rhs, &mut self.delta, eta)?,
            };
            field.cvar += &self.delta;
            field.cons_to_prim(hcr);

            let f_prev_norm = f_norm;
            f_norm = self.newton_function(operator, field, t_new, dt);
            debug!(
                "Newton iteration {iter}: |F|/|F0| = {:.3e}, eta = {eta:.3e}, {} GMRES iterations",
                f_norm / f0_norm,
                outcome.iterations
            );
            if f_norm * f_norm <= eps_sq * f0_norm * f0_norm {
                return Ok(global_residual(operator.mesh, &field.u_t));
            }
            eta = self.forcing_term(eta, f_norm, f_prev_norm, f0_norm);
        }
        Err(SolverError::NewtonNotConverged {
            iterations: self.params.n_newton_iter,
            ratio: f_norm / f0_norm,
        })
    }
    fn name(&self) -> String {
        format!(
            "implicit Newton-GMRES({}){}",
            self.params.n_kdim,
            if self.lusgs.is_some() { " with LU-SGS" } else { "" }
        )
    }
}
