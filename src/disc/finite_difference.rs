use nalgebra::Matrix4;

use super::equation_of_state::{NVAR, State};

/// Finite difference step control shared by the block Jacobians of the
/// preconditioner and the matrix-free Jacobian-vector product.
#[derive(Clone, Copy, Debug)]
pub struct FiniteDifference {
    epsilon_sqrt: f64,
}

impl Default for FiniteDifference {
    fn default() -> Self {
        Self {
            epsilon_sqrt: f64::EPSILON.sqrt(),
        }
    }
}

impl FiniteDifference {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step size for perturbing a variable of magnitude `x`.
    pub fn compute_step_size(&self, x: f64) -> f64 {
        let scale = x.abs().max(1.0);
        scale * self.epsilon_sqrt
    }

    /// Step along a direction of norm `norm`, so that the perturbation has
    /// size `sqrt(eps)`. Zero directions get the bare `sqrt(eps)`.
    pub fn directional_step(&self, norm: f64) -> f64 {
        if norm > 0.0 {
            self.epsilon_sqrt / norm
        } else {
            self.epsilon_sqrt
        }
    }

    /// Jacobian of a state-to-state map by central differences.
    pub fn jacobian<F>(&self, f: F, x: &State) -> Matrix4<f64>
    where
        F: Fn(&State) -> State,
    {
        let mut jac = Matrix4::zeros();
        let mut x_perturbed = *x;
        for j in 0..NVAR {
            let h = self.compute_step_size(x[j]);
            let x_orig = x[j];

            x_perturbed[j] = x_orig + h;
            let f_plus = f(&x_perturbed);

            x_perturbed[j] = x_orig - h;
            let f_minus = f(&x_perturbed);

            x_perturbed[j] = x_orig;

            for i in 0..NVAR {
                jac[(i, j)] = (f_plus[i] - f_minus[i]) / (2.0 * h);
            }
        }
        jac
    }
}
