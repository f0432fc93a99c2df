use std::{fs, path::Path};

use serde::Deserialize;

use crate::{
    disc::{
        equation_of_state::FlowParameters,
        mesh::{BoundaryEdge, Node, PeriodicConnection, cartesian::CartesianMesh},
    },
    error::{SolverError, SolverResult},
    temporal_disc::NewtonParameters,
};

/// Explicit node list and connectivity; node indices are 0-based.
#[derive(Clone, Debug, Deserialize)]
pub struct UnstructuredMesh {
    pub nodes: Vec<[f64; 2]>,
    pub cells: Vec<Vec<usize>>,
    #[serde(default)]
    pub domains: Option<Vec<usize>>,
    pub boundary_edges: Vec<BoundaryEdgeParser>,
}
impl UnstructuredMesh {
    pub fn nodes(&self) -> Vec<Node> {
        self.nodes.iter().map(|&[x, y]| Node { x, y }).collect()
    }
    pub fn boundary_edges(&self) -> Vec<BoundaryEdge> {
        self.boundary_edges
            .iter()
            .map(|edge| BoundaryEdge {
                inodes: edge.nodes,
                code: edge.code,
            })
            .collect()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct BoundaryEdgeParser {
    pub nodes: [usize; 2],
    pub code: usize,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshParser {
    Cartesian(CartesianMesh),
    Unstructured(UnstructuredMesh),
}

/// Reservoir given as density, Mach number, flow angle in degrees and
/// pressure.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ReservoirParser {
    #[serde(default = "default_domain")]
    pub domain: usize,
    pub rho: f64,
    pub mach: f64,
    #[serde(default)]
    pub alpha: f64,
    pub pressure: f64,
}
fn default_domain() -> usize {
    1
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct BoundaryParser {
    pub code: usize,
    pub rho: Option<f64>,
    pub mach: Option<f64>,
    pub alpha: Option<f64>,
    pub pressure: Option<f64>,
    pub adiabatic: Option<bool>,
    pub wall_temperature: Option<f64>,
    pub wall_heat_flux: Option<f64>,
    pub exact_function: Option<usize>,
    pub connection: Option<[f64; 2]>,
}
impl BoundaryParser {
    fn missing(&self, key: &str) -> SolverError {
        SolverError::invalid_parameter(format!("boundary {} needs `{key}`", self.code))
    }
    /// Reservoir quantities `(rho, mach, alpha, pressure)`.
    pub fn reservoir(&self) -> SolverResult<(f64, f64, f64, f64)> {
        Ok((
            self.rho.ok_or_else(|| self.missing("rho"))?,
            self.mach.ok_or_else(|| self.missing("mach"))?,
            self.alpha.unwrap_or(0.0),
            self.pressure.ok_or_else(|| self.missing("pressure"))?,
        ))
    }
    pub fn outlet_pressure(&self) -> SolverResult<f64> {
        self.pressure.ok_or_else(|| self.missing("pressure"))
    }
    pub fn periodic_connection(&self) -> SolverResult<[f64; 2]> {
        self.connection.ok_or_else(|| self.missing("connection"))
    }
}

/// Left and right `(rho, u, p)` of a one-dimensional Riemann problem.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct ShockTubeParser {
    pub left: [f64; 3],
    pub right: [f64; 3],
    pub interface: f64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DiscretizationParser {
    pub flux_function: usize,
    pub spatial_order: usize,
    pub limiter: usize,
    pub venk_k: f64,
}
impl Default for DiscretizationParser {
    fn default() -> Self {
        Self {
            flux_function: 2,
            spatial_order: 1,
            limiter: 1,
            venk_k: 1.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TimeParser {
    pub implicit: bool,
    pub rk_stages: usize,
    pub time_order: usize,
    pub cfl: f64,
    pub start_time: f64,
    pub stop_time: f64,
    pub max_iter: usize,
    pub stationary: bool,
    pub abort_residual: f64,
}
impl Default for TimeParser {
    fn default() -> Self {
        Self {
            implicit: false,
            rk_stages: 1,
            time_order: 1,
            cfl: 0.9,
            start_time: 0.0,
            stop_time: 1.0,
            max_iter: usize::MAX,
            stationary: false,
            abort_residual: 1e-10,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct OutputParser {
    pub name: String,
    pub directory: String,
    pub print_interval: usize,
    pub io_interval: usize,
    pub vtu: bool,
}
impl Default for OutputParser {
    fn default() -> Self {
        Self {
            name: "solution".to_string(),
            directory: "outputs".to_string(),
            print_interval: 10,
            io_interval: 100,
            vtu: false,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ParamParser {
    #[serde(default)]
    pub flow: FlowParameters,
    pub mesh: MeshParser,
    pub boundaries: Vec<BoundaryParser>,
    #[serde(default)]
    pub discretization: DiscretizationParser,
    #[serde(default)]
    pub time: TimeParser,
    #[serde(default)]
    pub newton: NewtonParameters,
    #[serde(default = "default_ic_type")]
    pub ic_type: usize,
    #[serde(default)]
    pub initial_states: Vec<ReservoirParser>,
    #[serde(default)]
    pub exact_function: Option<usize>,
    #[serde(default)]
    pub shock_tube: Option<ShockTubeParser>,
    #[serde(default)]
    pub source_function: Option<usize>,
    #[serde(default)]
    pub source_points: Option<usize>, // triangle rule for source terms
    #[serde(default)]
    pub num_threads: usize,
    #[serde(default)]
    pub output: OutputParser,
}
fn default_ic_type() -> usize {
    1
}
impl ParamParser {
    pub fn parse(file_path: impl AsRef<Path>) -> SolverResult<Self> {
        let file_content = fs::read_to_string(file_path)?;
        Self::from_json(&file_content)
    }
    pub fn from_json(content: &str) -> SolverResult<Self> {
        let params: ParamParser = serde_json::from_str(content)?;
        Ok(params)
    }
    /// Connections of all periodic boundaries (type 7).
    pub fn periodic_connections(&self) -> SolverResult<Vec<PeriodicConnection>> {
        self.boundaries
            .iter()
            .filter(|bc| bc.code / 100 == 7)
            .map(|bc| {
                Ok(PeriodicConnection {
                    code: bc.code,
                    connection: bc.periodic_connection()?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: &str = r#"{
        "mesh": {
            "cartesian": {
                "x_min": [0.0, 0.0], "x_max": [1.0, 1.0], "elem_num": [8, 4],
                "bottom": [{"code": 101, "range": [1, 8]}],
                "right": [{"code": 401, "range": [1, 4]}],
                "top": [{"code": 101, "range": [1, 8]}],
                "left": [{"code": 301, "range": [1, 4]}]
            }
        },
        "boundaries": [
            {"code": 101},
            {"code": 301, "rho": 1.0, "mach": 2.0, "pressure": 0.7142857},
            {"code": 401}
        ],
        "discretization": {"flux_function": 5, "spatial_order": 2},
        "newton": {"n_kdim": 30},
        "initial_states": [{"rho": 1.0, "mach": 2.0, "pressure": 0.7142857}]
    }"#;

    #[test]
    fn defaults_are_filled_in() {
        let params = ParamParser::from_json(PARAMS).unwrap();
        assert_eq!(params.flow.hcr, 1.4);
        assert_eq!(params.flow.gas_constant, 287.0);
        assert_eq!(params.discretization.flux_function, 5);
        assert_eq!(params.discretization.limiter, 1);
        assert_eq!(params.discretization.venk_k, 1.0);
        assert_eq!(params.newton.n_kdim, 30);
        assert_eq!(params.newton.n_newton_iter, 20);
        assert_eq!(params.newton.eps_newton, 1e-3);
        assert_eq!(params.newton.gamma_ew, 0.9);
        assert!(!params.newton.precond);
        assert_eq!(params.time.rk_stages, 1);
        assert_eq!(params.time.cfl, 0.9);
        assert_eq!(params.ic_type, 1);
        assert_eq!(params.initial_states[0].domain, 1);
        assert!(matches!(params.mesh, MeshParser::Cartesian(_)));
    }

    #[test]
    fn boundary_quantities_are_checked() {
        let params = ParamParser::from_json(PARAMS).unwrap();
        assert!(params.boundaries[0].reservoir().is_err());
        let (rho, mach, alpha, _) = params.boundaries[1].reservoir().unwrap();
        assert_eq!((rho, mach, alpha), (1.0, 2.0, 0.0));
        assert!(params.periodic_connections().unwrap().is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(ParamParser::from_json("{"), Err(SolverError::Json(_))));
        assert!(matches!(
            ParamParser::parse("does/not/exist.json"),
            Err(SolverError::Io(_))
        ));
    }
}
