use crate::disc::{
    equation_of_state::{RHO, State, VX, VY, sound_speed},
    flux::flux2d,
};

/// Part of the Steger-Warming split flux carried by the eigenvalues `lambda`.
fn steger_warming_part(prim: &State, lambda: [f64; 4], hcr: f64) -> State {
    let (rho, u, v) = (prim[RHO], prim[VX], prim[VY]);
    let c = sound_speed(prim, hcr);
    let q = 0.5 / hcr;
    let f0 = rho * q * (2.0 * (hcr - 1.0) * lambda[1] + lambda[0] + lambda[3]);
    [
        f0,
        f0 * u + (lambda[3] - lambda[0]) * rho * c * q,
        f0 * v,
        f0 * 0.5 * (u * u + v * v)
            + (lambda[3] - lambda[0]) * rho * c * u * q
            + (lambda[3] + lambda[0]) * rho * c * c * q / (hcr - 1.0),
    ]
}

/// Steger-Warming flux vector splitting.
pub fn steger_warming(left: &State, right: &State, hcr: f64) -> State {
    let eigenvalues = |prim: &State| {
        let c = sound_speed(prim, hcr);
        [prim[VX] - c, prim[VX], prim[VX], prim[VX] + c]
    };
    let positive = eigenvalues(left).map(|l| l.max(0.0));
    let negative = eigenvalues(right).map(|l| l.min(0.0));
    let fp = steger_warming_part(left, positive, hcr);
    let fm = steger_warming_part(right, negative, hcr);
    std::array::from_fn(|i| fp[i] + fm[i])
}

/// Van Leer's subsonic split flux; `sign = 1` gives F+, `sign = -1` gives F-.
fn van_leer_part(prim: &State, sign: f64, hcr: f64) -> State {
    let c = sound_speed(prim, hcr);
    let mach = prim[VX] / c;
    if sign * mach >= 1.0 {
        return flux2d(prim, hcr);
    }
    if sign * mach <= -1.0 {
        return [0.0; 4];
    }
    let cx = (hcr - 1.0) * prim[VX] + sign * 2.0 * c;
    let f0 = sign * 0.25 * prim[RHO] * c * (mach + sign) * (mach + sign);
    let f1 = f0 * cx / hcr;
    let f2 = f0 * prim[VY];
    [
        f0,
        f1,
        f2,
        0.5 * (f1 * cx * hcr / (hcr * hcr - 1.0) + f2 * prim[VY]),
    ]
}

/// Van Leer flux vector splitting.
pub fn van_leer(left: &State, right: &State, hcr: f64) -> State {
    let fp = van_leer_part(left, 1.0, hcr);
    let fm = van_leer_part(right, -1.0, hcr);
    std::array::from_fn(|i| fp[i] + fm[i])
}
