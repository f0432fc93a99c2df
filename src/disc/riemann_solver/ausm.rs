use crate::disc::equation_of_state::{P, RHO, State, VX, VY, sound_speed, total_enthalpy};

/// Blending weight of the AUSMD/AUSMV momentum fluxes.
const AUSMDV_K: f64 = 10.0;

struct SplitTerms {
    u_plus: f64,
    u_minus: f64,
    p_plus: f64,
    p_minus: f64,
}

/// Split velocities and pressures of Wada and Liou with the common speed of
/// sound `cm`.
fn split_terms(left: &State, right: &State, cm: f64) -> SplitTerms {
    let (ul, ur) = (left[VX], right[VX]);
    let theta_l = left[P] / left[RHO];
    let theta_r = right[P] / right[RHO];
    let alpha_l = 2.0 * theta_l / (theta_l + theta_r);
    let alpha_r = 2.0 * theta_r / (theta_l + theta_r);

    let (u_plus, p_plus) = if ul.abs() < cm {
        (
            0.25 * alpha_l * (ul + cm) * (ul + cm) / cm + 0.5 * (1.0 - alpha_l) * (ul + ul.abs()),
            0.25 * left[P] * (ul + cm) * (ul + cm) / (cm * cm) * (2.0 - ul / cm),
        )
    } else if ul > 0.0 {
        (ul, left[P])
    } else {
        (0.0, 0.0)
    };
    let (u_minus, p_minus) = if ur.abs() < cm {
        (
            -0.25 * alpha_r * (ur - cm) * (ur - cm) / cm + 0.5 * (1.0 - alpha_r) * (ur - ur.abs()),
            0.25 * right[P] * (ur - cm) * (ur - cm) / (cm * cm) * (2.0 + ur / cm),
        )
    } else if ur < 0.0 {
        (ur, right[P])
    } else {
        (0.0, 0.0)
    };
    SplitTerms {
        u_plus,
        u_minus,
        p_plus,
        p_minus,
    }
}

/// Upwinded transport of `phi` by the interface mass flux.
fn upwind(mass_flux: f64, phi_l: f64, phi_r: f64) -> f64 {
    0.5 * (mass_flux * (phi_r + phi_l) - mass_flux.abs() * (phi_r - phi_l))
}

pub fn ausmd(left: &State, right: &State, hcr: f64) -> State {
    let cm = sound_speed(left, hcr).max(sound_speed(right, hcr));
    let split = split_terms(left, right, cm);
    let mass_flux = split.u_plus * left[RHO] + split.u_minus * right[RHO];
    [
        mass_flux,
        upwind(mass_flux, left[VX], right[VX]) + split.p_plus + split.p_minus,
        upwind(mass_flux, left[VY], right[VY]),
        upwind(mass_flux, total_enthalpy(left, hcr), total_enthalpy(right, hcr)),
    ]
}

/// AUSMDV: AUSMD blended with the AUSMV momentum flux, plus an entropy fix
/// at sonic expansions.
pub fn ausmdv(left: &State, right: &State, hcr: f64) -> State {
    let cl = sound_speed(left, hcr);
    let cr = sound_speed(right, hcr);
    let cm = cl.max(cr);
    let split = split_terms(left, right, cm);
    let hl = total_enthalpy(left, hcr);
    let hr = total_enthalpy(right, hcr);
    let (ul, ur) = (left[VX], right[VX]);
    let mass_flux = split.u_plus * left[RHO] + split.u_minus * right[RHO];

    let s = (AUSMDV_K * (right[P] - left[P]).abs() / right[P].min(left[P])).min(1.0);
    let momentum_v = left[RHO] * ul * split.u_plus + right[RHO] * ur * split.u_minus;
    let momentum_d = upwind(mass_flux, ul, ur);
    let mut flux = [
        mass_flux,
        0.5 * (1.0 + s) * momentum_v + 0.5 * (1.0 - s) * momentum_d + split.p_plus + split.p_minus,
        upwind(mass_flux, left[VY], right[VY]),
        upwind(mass_flux, hl, hr),
    ];

    let left_expansion = ul - cl < 0.0 && ur - cr > 0.0;
    let right_expansion = ul + cl < 0.0 && ur + cr > 0.0;
    let dlambda = match (left_expansion, right_expansion) {
        (true, false) => Some((ur - cr) - (ul - cl)),
        (false, true) => Some((ur + cr) - (ul + cl)),
        _ => None,
    };
    if let Some(dlambda) = dlambda {
        let psi_l = [1.0, ul, left[VY], hl];
        let psi_r = [1.0, ur, right[VY], hr];
        for i in 0..4 {
            flux[i] -= 0.125 * dlambda * (right[RHO] * psi_r[i] - left[RHO] * psi_l[i]);
        }
    }
    flux
}
