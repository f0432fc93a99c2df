use crate::disc::{
    equation_of_state::{E, P, RHO, State, VX, VY, prim_cons, sound_speed, total_enthalpy},
    flux::flux2d,
};

/// Roe-averaged normal velocity and sound speed.
fn roe_average(left: &State, right: &State, hcr: f64) -> (f64, f64) {
    let sq_l = left[RHO].sqrt();
    let sq_r = right[RHO].sqrt();
    let inv_sum = 1.0 / (sq_l + sq_r);
    let u = (sq_r * right[VX] + sq_l * left[VX]) * inv_sum;
    let v = (sq_r * right[VY] + sq_l * left[VY]) * inv_sum;
    let h = (sq_r * total_enthalpy(right, hcr) + sq_l * total_enthalpy(left, hcr)) * inv_sum;
    (u, ((hcr - 1.0) * (h - 0.5 * (u * u + v * v))).sqrt())
}

/// Two-wave flux for given signal speeds `sl < sr`.
fn two_wave_flux(left: &State, right: &State, sl: f64, sr: f64, hcr: f64) -> State {
    let fl = flux2d(left, hcr);
    if sl > 0.0 {
        return fl;
    }
    let fr = flux2d(right, hcr);
    if sr < 0.0 {
        return fr;
    }
    let ul = prim_cons(left, hcr);
    let ur = prim_cons(right, hcr);
    let inv = 1.0 / (sr - sl);
    std::array::from_fn(|i| (sr * fl[i] - sl * fr[i]) * inv + sr * sl * inv * (ur[i] - ul[i]))
}

/// HLL flux with Davis/Roe signal speed estimates.
pub fn hll(left: &State, right: &State, hcr: f64) -> State {
    let (u, c) = roe_average(left, right, hcr);
    let sl = (left[VX] - sound_speed(left, hcr)).min(u - c);
    let sr = (right[VX] + sound_speed(right, hcr)).max(u + c);
    two_wave_flux(left, right, sl, sr, hcr)
}

/// HLLE flux with the signal speeds of Einfeldt.
pub fn hlle(left: &State, right: &State, hcr: f64) -> State {
    let cl = sound_speed(left, hcr);
    let cr = sound_speed(right, hcr);
    let sq_l = left[RHO].sqrt();
    let sq_r = right[RHO].sqrt();
    let inv_sum = 1.0 / (sq_l + sq_r);
    let u = (sq_r * right[VX] + sq_l * left[VX]) * inv_sum;
    let eta2 = 0.5 * sq_l * sq_r * inv_sum * inv_sum;
    let du = right[VX] - left[VX];
    let d = ((sq_r * cr * cr + sq_l * cl * cl) * inv_sum + eta2 * du * du).sqrt();
    let sl = (left[VX] - cl).min(u - d);
    let sr = (right[VX] + cr).max(u + d);
    two_wave_flux(left, right, sl, sr, hcr)
}

/// HLLC flux, restoring the contact wave inside the HLL fan.
pub fn hllc(left: &State, right: &State, hcr: f64) -> State {
    let (u, c) = roe_average(left, right, hcr);
    let sl = (left[VX] - sound_speed(left, hcr)).min(u - c);
    let sr = (right[VX] + sound_speed(right, hcr)).max(u + c);
    if sl > 0.0 {
        return flux2d(left, hcr);
    }
    if sr < 0.0 {
        return flux2d(right, hcr);
    }
    let ml = left[RHO] * (sl - left[VX]);
    let mr = right[RHO] * (sr - right[VX]);
    let s_star = (right[P] - left[P] + left[RHO] * left[VX] * (sl - left[VX])
        - right[RHO] * right[VX] * (sr - right[VX]))
        / (ml - mr);
    let star_flux = |prim: &State, s: f64, m: f64| -> State {
        let q = prim_cons(prim, hcr);
        let f = flux2d(prim, hcr);
        let fac = m / (s - s_star);
        let star = [
            fac,
            fac * s_star,
            fac * prim[VY],
            fac * (q[E] / prim[RHO] + (s_star - prim[VX]) * (s_star + prim[P] / m)),
        ];
        std::array::from_fn(|i| f[i] + s * (star[i] - q[i]))
    };
    if s_star >= 0.0 {
        star_flux(left, sl, ml)
    } else {
        star_flux(right, sr, mr)
    }
}
