use super::ENTROPY_FIX;
use crate::disc::{
    equation_of_state::{RHO, State, VX, VY, prim_cons, total_enthalpy},
    flux::flux2d,
};

/// Harten's entropy fix for the acoustic eigenvalues.
fn harten(lambda: f64, delta: f64) -> f64 {
    if lambda.abs() < delta {
        (lambda * lambda + delta * delta) / (2.0 * delta)
    } else {
        lambda.abs()
    }
}

/// Roe flux with the wave strengths of the linearised problem.
pub fn roe(left: &State, right: &State, hcr: f64) -> State {
    let ul = prim_cons(left, hcr);
    let ur = prim_cons(right, hcr);
    let hl = total_enthalpy(left, hcr);
    let hr = total_enthalpy(right, hcr);

    let sq_l = left[RHO].sqrt();
    let sq_r = right[RHO].sqrt();
    let inv_sum = 1.0 / (sq_l + sq_r);
    let u = (sq_r * right[VX] + sq_l * left[VX]) * inv_sum;
    let v = (sq_r * right[VY] + sq_l * left[VY]) * inv_sum;
    let h = (sq_r * hr + sq_l * hl) * inv_sum;
    let q2 = u * u + v * v;
    let c = ((hcr - 1.0) * (h - 0.5 * q2)).sqrt();

    let delta = ENTROPY_FIX * (u.abs() + c);
    let lambda = [
        harten(u - c, delta),
        u.abs(),
        u.abs(),
        harten(u + c, delta),
    ];
    let r = [
        [1.0, u - c, v, h - u * c],
        [1.0, u, v, 0.5 * q2],
        [0.0, 0.0, 1.0, v],
        [1.0, u + c, v, h + u * c],
    ];

    let d_rho = ur[0] - ul[0];
    let d_mx = ur[1] - ul[1];
    let d_my = ur[2] - ul[2];
    let d_e = ur[3] - ul[3] - (d_my - v * d_rho) * v;
    let a2 = (hcr - 1.0) / (c * c) * (d_rho * (h - u * u) + u * d_mx - d_e);
    let a1 = 0.5 / c * (d_rho * (u + c) - d_mx) - 0.5 * a2;
    let a4 = d_rho - a1 - a2;
    let a3 = d_my - v * d_rho;
    let strength = [a1, a2, a3, a4];

    let fl = flux2d(left, hcr);
    let fr = flux2d(right, hcr);
    std::array::from_fn(|i| {
        let dissipation: f64 = (0..4).map(|k| strength[k] * lambda[k] * r[k][i]).sum();
        0.5 * (fl[i] + fr[i] - dissipation)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disc::equation_of_state::NVAR;
    use approx::assert_relative_eq;

    #[test]
    fn moving_contact_is_upwinded() {
        let hcr = 1.4;
        let left = [1.0, 0.5, 0.1, 1.0];
        let right = [0.3, 0.5, 0.1, 1.0];
        let f = roe(&left, &right, hcr);
        // a contact moving right is upwinded from the left state
        let fl = flux2d(&left, hcr);
        for i in 0..NVAR {
            assert_relative_eq!(f[i], fl[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn entropy_fix_is_continuous() {
        let delta = 0.2;
        assert_relative_eq!(harten(delta, delta), delta, epsilon = 1e-15);
        assert_relative_eq!(harten(0.0, delta), 0.5 * delta, epsilon = 1e-15);
        assert_eq!(harten(-0.7, delta), 0.7);
    }
}
