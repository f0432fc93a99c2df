use serde::Deserialize;

pub const NVAR: usize = 4;
pub const RHO: usize = 0;
pub const VX: usize = 1;
pub const VY: usize = 2;
pub const P: usize = 3;
pub const MX: usize = 1;
pub const MY: usize = 2;
pub const E: usize = 3;

/// Primitive `(rho, vx, vy, p)` or conservative `(rho, mx, my, E)` state.
pub type State = [f64; NVAR];

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FlowParameters {
    pub hcr: f64, // heat capacity ratio
    pub gas_constant: f64,
    pub mu: f64,
    pub prandtl: f64,
}
impl Default for FlowParameters {
    fn default() -> Self {
        Self {
            hcr: 1.4,
            gas_constant: 287.0,
            mu: 0.0,
            prandtl: 0.72,
        }
    }
}

pub fn prim_cons(prim: &State, hcr: f64) -> State {
    let mx = prim[RHO] * prim[VX];
    let my = prim[RHO] * prim[VY];
    [
        prim[RHO],
        mx,
        my,
        prim[P] / (hcr - 1.0) + 0.5 * (mx * prim[VX] + my * prim[VY]),
    ]
}

pub fn cons_prim(cons: &State, hcr: f64) -> State {
    let vx = cons[MX] / cons[RHO];
    let vy = cons[MY] / cons[RHO];
    [
        cons[RHO],
        vx,
        vy,
        (hcr - 1.0) * (cons[E] - 0.5 * (cons[MX] * vx + cons[MY] * vy)),
    ]
}

/// Floors density and pressure of an extrapolated primitive state.
pub fn floor_state(prim: &mut State) {
    prim[RHO] = prim[RHO].max(f64::EPSILON);
    prim[P] = prim[P].max(f64::EPSILON);
}

pub fn sound_speed(prim: &State, hcr: f64) -> f64 {
    (hcr * prim[P] / prim[RHO]).sqrt()
}

pub fn total_enthalpy(prim: &State, hcr: f64) -> f64 {
    hcr / (hcr - 1.0) * prim[P] / prim[RHO] + 0.5 * (prim[VX] * prim[VX] + prim[VY] * prim[VY])
}

pub fn temperature(prim: &State, gas_constant: f64) -> f64 {
    prim[P] / (prim[RHO] * gas_constant)
}

/// Builds a primitive state from density, Mach number, flow angle in degrees
/// and pressure.
pub fn reservoir_state(rho: f64, mach: f64, alpha_deg: f64, pressure: f64, hcr: f64) -> State {
    let c = (hcr * pressure / rho).sqrt();
    let v = mach * c;
    let alpha = alpha_deg.to_radians();
    [rho, v * alpha.cos(), v * alpha.sin(), pressure]
}

/// Projects the 1-D part `(rho, m_n, E)` of a conservative state, given in the
/// face-normal frame, onto the left eigenvectors of the Euler equations
/// linearised about `prim_ref`.
pub fn cons_char(cons: &State, prim_ref: &State, hcr: f64) -> [f64; 3] {
    let c = sound_speed(prim_ref, hcr);
    let u = prim_ref[VX];
    let h = c * c / (hcr - 1.0) + 0.5 * u * u;
    let phi = u * u - 2.0 * h;
    let a1 = 1.0 / (2.0 * c * phi);
    let a2 = 1.0 / phi;
    let a3 = u * c;
    let k = [
        [a1 * u * (phi - a3), -a1 * (phi - 2.0 * a3), -a2],
        [a2 * (u * u + phi), -2.0 * u * a2, 2.0 * a2],
        [-a1 * u * (a3 + phi), a1 * (phi + 2.0 * a3), -a2],
    ];
    let q = [cons[RHO], cons[MX], cons[E]];
    std::array::from_fn(|i| k[i][0] * q[0] + k[i][1] * q[1] + k[i][2] * q[2])
}

/// Inverse of [`cons_char`]. Only `rho`, `m_n` and `E` of `cons` are written.
pub fn char_cons(charac: &[f64; 3], prim_ref: &State, hcr: f64, cons: &mut State) {
    let c = sound_speed(prim_ref, hcr);
    let u = prim_ref[VX];
    let h = c * c / (hcr - 1.0) + 0.5 * u * u;
    let r = [
        [1.0, 1.0, 1.0],
        [u - c, u, u + c],
        [h - u * c, 0.5 * u * u, h + u * c],
    ];
    let q: [f64; 3] =
        std::array::from_fn(|i| r[i][0] * charac[0] + r[i][1] * charac[1] + r[i][2] * charac[2]);
    cons[RHO] = q[0];
    cons[MX] = q[1];
    cons[E] = q[2];
}
