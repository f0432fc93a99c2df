use super::equation_of_state::{P, RHO, State, VX, VY};

/// Analytic Euler flux in x-direction of a primitive state.
pub fn flux2d(prim: &State, hcr: f64) -> State {
    let mx = prim[RHO] * prim[VX];
    let e = prim[P] / (hcr - 1.0) + 0.5 * prim[RHO] * (prim[VX] * prim[VX] + prim[VY] * prim[VY]);
    [
        mx,
        mx * prim[VX] + prim[P],
        mx * prim[VY],
        prim[VX] * (e + prim[P]),
    ]
}

/// Rotates the velocity of a primitive state into the frame `(n, t)` with
/// `t = (-n_y, n_x)`.
pub fn rotate(prim: &State, n: [f64; 2]) -> State {
    [
        prim[RHO],
        n[0] * prim[VX] + n[1] * prim[VY],
        -n[1] * prim[VX] + n[0] * prim[VY],
        prim[P],
    ]
}

/// Inverse of [`rotate`], applicable to fluxes as well as states.
pub fn back_rotate(q: &State, n: [f64; 2]) -> State {
    [
        q[0],
        n[0] * q[1] - n[1] * q[2],
        n[1] * q[1] + n[0] * q[2],
        q[3],
    ]
}
