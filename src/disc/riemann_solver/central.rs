use crate::disc::{
    equation_of_state::{State, VX, prim_cons, sound_speed},
    flux::flux2d,
};

/// Local Lax-Friedrichs (Rusanov) flux.
pub fn lax_friedrichs(left: &State, right: &State, hcr: f64) -> State {
    let a = (left[VX].abs() + sound_speed(left, hcr)).max(right[VX].abs() + sound_speed(right, hcr));
    let fl = flux2d(left, hcr);
    let fr = flux2d(right, hcr);
    let ul = prim_cons(left, hcr);
    let ur = prim_cons(right, hcr);
    std::array::from_fn(|i| 0.5 * (fl[i] + fr[i]) - 0.5 * a * (ur[i] - ul[i]))
}

/// Arithmetic mean of the physical fluxes, without dissipation.
pub fn central(left: &State, right: &State, hcr: f64) -> State {
    let fl = flux2d(left, hcr);
    let fr = flux2d(right, hcr);
    std::array::from_fn(|i| 0.5 * (fl[i] + fr[i]))
}
