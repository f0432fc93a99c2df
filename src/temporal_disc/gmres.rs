use log::debug;
use ndarray::{Array1, Array2, Zip};

use crate::error::{SolverError, SolverResult};

/// Linear map on element fields of shape `(elem_num, NVAR)`.
pub trait LinearOperator {
    fn apply(&mut self, v: &Array2<f64>, out: &mut Array2<f64>) -> SolverResult<()>;
}

/// Approximate inverse applied from the right: `out = M^-1 v`.
pub trait Preconditioner {
    fn apply(&self, v: &Array2<f64>, out: &mut Array2<f64>) -> SolverResult<()>;
}

pub struct IdentityPreconditioner;
impl Preconditioner for IdentityPreconditioner {
    fn apply(&self, v: &Array2<f64>, out: &mut Array2<f64>) -> SolverResult<()> {
        out.assign(v);
        Ok(())
    }
}

pub fn dot(a: &Array2<f64>, b: &Array2<f64>) -> f64 {
    Zip::from(a)
        .and(b)
        .par_fold(|| 0.0, |acc, &x, &y| acc + x * y, |s1, s2| s1 + s2)
}

pub fn norm(a: &Array2<f64>) -> f64 {
    dot(a, a).sqrt()
}

/// `y += alpha x`
fn axpy(y: &mut Array2<f64>, alpha: f64, x: &Array2<f64>) {
    Zip::from(y).and(x).par_for_each(|y, &x| *y += alpha * x);
}

#[derive(Clone, Copy, Debug)]
pub struct GmresOutcome {
    pub iterations: usize,
    pub residual: f64, // estimated |b - A x|
}

/// Restarted, right-preconditioned GMRES(m) with modified Gram-Schmidt and
/// incrementally applied Givens rotations.
pub struct Gmres {
    pub krylov_dim: usize,
    pub max_restarts: usize,
    v: Vec<Array2<f64>>, // orthonormal Krylov basis
    z: Vec<Array2<f64>>, // preconditioned basis vectors
    w: Array2<f64>,
    hessenberg: Array2<f64>,
    cs: Array1<f64>,
    sn: Array1<f64>,
    gamma: Array1<f64>,
    pub history: Vec<f64>, // residual estimate after every inner iteration
}
impl Gmres {
    pub fn new(krylov_dim: usize, max_restarts: usize, shape: (usize, usize)) -> Self {
        let krylov_dim = krylov_dim.max(1);
        Self {
            krylov_dim,
            max_restarts,
            v: (0..=krylov_dim).map(|_| Array2::zeros(shape)).collect(),
            z: (0..krylov_dim).map(|_| Array2::zeros(shape)).collect(),
            w: Array2::zeros(shape),
            hessenberg: Array2::zeros((krylov_dim + 1, krylov_dim)),
            cs: Array1::zeros(krylov_dim),
            sn: Array1::zeros(krylov_dim),
            gamma: Array1::zeros(krylov_dim + 1),
            history: Vec::new(),
        }
    }
    /// Solves `A x = b` to `|b - A x| <= rel_tol |b|`, starting from the
    /// given `x`.
    pub fn solve<A, M>(
        &mut self,
        a: &mut A,
        precond: &M,
        b: &Array2<f64>,
        x: &mut Array2<f64>,
        rel_tol: f64,
    ) -> SolverResult<GmresOutcome>
    where
        A: LinearOperator,
        M: Preconditioner,
    {
        self.history.clear();
        let b_norm = norm(b);
        if b_norm == 0.0 {
            x.fill(0.0);
            return Ok(GmresOutcome {
                iterations: 0,
                residual: 0.0,
            });
        }
        let tol = rel_tol * b_norm;
        let m = self.krylov_dim;
        let mut iterations = 0;
        let mut residual = b_norm;

        for restart in 0..=self.max_restarts {
            // r = b - A x
            a.apply(x, &mut self.w)?;
            Zip::from(&mut self.v[0])
                .and(b)
                .and(&self.w)
                .par_for_each(|r, &b, &ax| *r = b - ax);
            let beta = norm(&self.v[0]);
            residual = beta;
            if beta <= tol {
                return Ok(GmresOutcome { iterations, residual });
            }
            self.v[0].mapv_inplace(|r| r / beta);
            self.gamma.fill(0.0);
            self.gamma[0] = beta;
            self.hessenberg.fill(0.0);

            let mut krylov_size = 0;
            let mut converged = false;
            for j in 0..m {
                precond.apply(&self.v[j], &mut self.z[j])?;
                a.apply(&self.z[j], &mut self.w)?;
                for i in 0..=j {
                    let h = dot(&self.w, &self.v[i]);
                    self.hessenberg[[i, j]] = h;
                    axpy(&mut self.w, -h, &self.v[i]);
                }
                let h_next = norm(&self.w);
                self.hessenberg[[j + 1, j]] = h_next;

                for i in 0..j {
                    let (h_i, h_ip) = (self.hessenberg[[i, j]], self.hessenberg[[i + 1, j]]);
                    self.hessenberg[[i, j]] = self.cs[i] * h_i + self.sn[i] * h_ip;
                    self.hessenberg[[i + 1, j]] = -self.sn[i] * h_i + self.cs[i] * h_ip;
                }
                let (h_jj, h_j1) = (self.hessenberg[[j, j]], self.hessenberg[[j + 1, j]]);
                let denom = h_jj.hypot(h_j1);
                self.cs[j] = h_jj / denom;
                self.sn[j] = h_j1 / denom;
                self.hessenberg[[j, j]] = denom;
                self.hessenberg[[j + 1, j]] = 0.0;
                self.gamma[j + 1] = -self.sn[j] * self.gamma[j];
                self.gamma[j] *= self.cs[j];

                residual = self.gamma[j + 1].abs();
                self.history.push(residual);
                iterations += 1;
                krylov_size = j + 1;
                debug!("GMRES cycle {restart} iteration {iterations}: |r| = {residual:.3e}");

                // a vanishing h_next means the Krylov space is invariant
                if residual <= tol || h_next <= f64::EPSILON * beta {
                    converged = true;
                    break;
                }
                let v_next = &mut self.v[j + 1];
                v_next.assign(&self.w);
                v_next.mapv_inplace(|w| w / h_next);
            }

            self.update_solution(x, krylov_size);
            if converged {
                return Ok(GmresOutcome { iterations, residual });
            }
        }
        Err(SolverError::GmresNotConverged {
            iterations,
            ratio: residual / b_norm,
            tolerance: rel_tol,
        })
    }
    /// Back substitution of the rotated Hessenberg system and `x += Z y`.
    fn update_solution(&self, x: &mut Array2<f64>, krylov_size: usize) {
        let mut y = vec![0.0; krylov_size];
        for i in (0..krylov_size).rev() {
            let mut sum = self.gamma[i];
            for k in i + 1..krylov_size {
                sum -= self.hessenberg[[i, k]] * y[k];
            }
            y[i] = sum / self.hessenberg[[i, i]];
        }
        for (yi, zi) in y.iter().zip(self.z.iter()) {
            axpy(x, *yi, zi);
        }
    }
}
