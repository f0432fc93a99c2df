use crate::disc::equation_of_state::{P, RHO, State, VX, VY};

const NEWTON_TOL: f64 = 1e-12;
const NEWTON_MAX_ITER: usize = 100;

/// Left and right states of a 1-D Riemann problem.
#[derive(Clone, Copy, Debug)]
pub struct RiemannProblem {
    pub rho: [f64; 2],
    pub u: [f64; 2],
    pub p: [f64; 2],
    pub hcr: f64,
}

/// Density, velocity and pressure sampled from the exact solution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampledState {
    pub rho: f64,
    pub u: f64,
    pub p: f64,
}

impl RiemannProblem {
    pub fn new(left: &State, right: &State, hcr: f64) -> Self {
        Self {
            rho: [left[RHO], right[RHO]],
            u: [left[VX], right[VX]],
            p: [left[P], right[P]],
            hcr,
        }
    }
    fn sound_speed(&self, k: usize) -> f64 {
        (self.hcr * self.p[k] / self.rho[k]).sqrt()
    }
    fn generates_vacuum(&self) -> bool {
        2.0 / (self.hcr - 1.0) * (self.sound_speed(0) + self.sound_speed(1))
            <= self.u[1] - self.u[0]
    }
    /// Pressure function `f_k(p)` across the wave facing side `k` and its
    /// derivative.
    pub fn pressure_function(&self, p: f64, k: usize) -> (f64, f64) {
        let hcr = self.hcr;
        let (rho_k, p_k) = (self.rho[k], self.p[k]);
        if p > p_k {
            let a = 2.0 / ((hcr + 1.0) * rho_k);
            let b = (hcr - 1.0) / (hcr + 1.0) * p_k;
            let q = (a / (p + b)).sqrt();
            ((p - p_k) * q, q * (1.0 - 0.5 * (p - p_k) / (b + p)))
        } else {
            let c_k = self.sound_speed(k);
            let ratio = p / p_k;
            (
                2.0 * c_k / (hcr - 1.0) * (ratio.powf((hcr - 1.0) / (2.0 * hcr)) - 1.0),
                ratio.powf(-(hcr + 1.0) / (2.0 * hcr)) / (rho_k * c_k),
            )
        }
    }
    fn initial_guess(&self) -> f64 {
        let hcr = self.hcr;
        let (cl, cr) = (self.sound_speed(0), self.sound_speed(1));
        let (pl, pr) = (self.p[0], self.p[1]);
        let du = self.u[1] - self.u[0];
        let cup = 0.25 * (self.rho[0] + self.rho[1]) * (cl + cr);
        let ppv = (0.5 * (pl + pr) - 0.5 * du * cup).max(0.0);
        let pmin = pl.min(pr);
        let pmax = pl.max(pr);
        if pmax / pmin <= 2.0 && (pmin..=pmax).contains(&ppv) {
            ppv
        } else if ppv < pmin {
            // two rarefactions
            let z = (hcr - 1.0) / (2.0 * hcr);
            ((cl + cr - 0.5 * (hcr - 1.0) * du) / (cl / pl.powf(z) + cr / pr.powf(z))).powf(1.0 / z)
        } else {
            // two shocks
            let g = |rho: f64, p: f64| {
                (2.0 / ((hcr + 1.0) * rho) / ((hcr - 1.0) / (hcr + 1.0) * p + ppv)).sqrt()
            };
            let gl = g(self.rho[0], pl);
            let gr = g(self.rho[1], pr);
            ((gl * pl + gr * pr - du) / (gl + gr)).max(NEWTON_TOL)
        }
    }
    /// Star-region pressure and velocity by Newton iteration on
    /// `f_L(p) + f_R(p) + u_R - u_L = 0`.
    pub fn star_state(&self) -> (f64, f64) {
        let du = self.u[1] - self.u[0];
        let mut p_old = self.initial_guess();
        let mut p = p_old;
        for _ in 0..NEWTON_MAX_ITER {
            let (fl, dfl) = self.pressure_function(p_old, 0);
            let (fr, dfr) = self.pressure_function(p_old, 1);
            p = (p_old - (fl + fr + du) / (dfl + dfr)).max(NEWTON_TOL);
            let change = 2.0 * (p - p_old).abs() / (p + p_old);
            p_old = p;
            if change <= NEWTON_TOL {
                break;
            }
        }
        let (fl, _) = self.pressure_function(p, 0);
        let (fr, _) = self.pressure_function(p, 1);
        (p, 0.5 * (self.u[0] + self.u[1]) + 0.5 * (fr - fl))
    }
    /// Exact solution on the ray `x / t = s`.
    pub fn sample(&self, s: f64) -> SampledState {
        if self.generates_vacuum() {
            return self.sample_vacuum(s);
        }
        let (p_star, u_star) = self.star_state();
        if s <= u_star {
            self.sample_side(s, p_star, u_star, 0)
        } else {
            self.sample_side(s, p_star, u_star, 1)
        }
    }
    /// Samples the waves of side `k`; right-hand waves are mapped onto the
    /// left-hand formulas by reflection of all velocities.
    fn sample_side(&self, s: f64, p_star: f64, u_star: f64, k: usize) -> SampledState {
        let hcr = self.hcr;
        let sign = if k == 0 { 1.0 } else { -1.0 };
        let (rho_k, p_k, c_k) = (self.rho[k], self.p[k], self.sound_speed(k));
        let (u_k, u_star, s) = (sign * self.u[k], sign * u_star, sign * s);
        let side_state = SampledState {
            rho: rho_k,
            u: sign * u_k,
            p: p_k,
        };
        let result = if p_star > p_k {
            let ratio = p_star / p_k;
            let shock_speed = u_k
                - c_k * ((hcr + 1.0) / (2.0 * hcr) * ratio + (hcr - 1.0) / (2.0 * hcr)).sqrt();
            if s <= shock_speed {
                return side_state;
            }
            let g6 = (hcr - 1.0) / (hcr + 1.0);
            SampledState {
                rho: rho_k * (ratio + g6) / (ratio * g6 + 1.0),
                u: u_star,
                p: p_star,
            }
        } else {
            let head = u_k - c_k;
            if s <= head {
                return side_state;
            }
            let c_star = c_k * (p_star / p_k).powf((hcr - 1.0) / (2.0 * hcr));
            if s > u_star - c_star {
                SampledState {
                    rho: rho_k * (p_star / p_k).powf(1.0 / hcr),
                    u: u_star,
                    p: p_star,
                }
            } else {
                self.fan_state(s, rho_k, u_k, p_k, c_k)
            }
        };
        SampledState {
            u: sign * result.u,
            ..result
        }
    }
    /// State inside a left-facing rarefaction fan.
    fn fan_state(&self, s: f64, rho_k: f64, u_k: f64, p_k: f64, c_k: f64) -> SampledState {
        let hcr = self.hcr;
        let c = 2.0 / (hcr + 1.0) * (c_k + 0.5 * (hcr - 1.0) * (u_k - s));
        SampledState {
            rho: rho_k * (c / c_k).powf(2.0 / (hcr - 1.0)),
            u: 2.0 / (hcr + 1.0) * (c_k + 0.5 * (hcr - 1.0) * u_k + s),
            p: p_k * (c / c_k).powf(2.0 * hcr / (hcr - 1.0)),
        }
    }
    fn sample_vacuum(&self, s: f64) -> SampledState {
        let hcr = self.hcr;
        let (cl, cr) = (self.sound_speed(0), self.sound_speed(1));
        let front_left = self.u[0] + 2.0 * cl / (hcr - 1.0);
        let front_right = self.u[1] - 2.0 * cr / (hcr - 1.0);
        if s <= self.u[0] - cl {
            SampledState {
                rho: self.rho[0],
                u: self.u[0],
                p: self.p[0],
            }
        } else if s < front_left {
            self.fan_state(s, self.rho[0], self.u[0], self.p[0], cl)
        } else if s <= front_right {
            SampledState {
                rho: 0.0,
                u: s,
                p: 0.0,
            }
        } else if s < self.u[1] + cr {
            let fan = self.fan_state(-s, self.rho[1], -self.u[1], self.p[1], cr);
            SampledState { u: -fan.u, ..fan }
        } else {
            SampledState {
                rho: self.rho[1],
                u: self.u[1],
                p: self.p[1],
            }
        }
    }
}

/// Godunov flux from the exact Riemann solution sampled at `x / t = 0`.
pub fn godunov(left: &State, right: &State, hcr: f64) -> State {
    let w = RiemannProblem::new(left, right, hcr).sample(0.0);
    let vy = if w.u > 0.0 { left[VY] } else { right[VY] };
    let mx = w.rho * w.u;
    [
        mx,
        mx * w.u + w.p,
        mx * vy,
        w.u * (hcr / (hcr - 1.0) * w.p + 0.5 * w.rho * (w.u * w.u + vy * vy)),
    ]
}
