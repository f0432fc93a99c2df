use thiserror::Error;

/// Every failure the solver can report. All of them are fatal to a run.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("unknown flux function id {0} (expected 1..=11)")]
    UnknownFluxFunction(usize),

    #[error("unknown limiter id {0} (expected 1 = Barth-Jespersen, 2 = Venkatakrishnan)")]
    UnknownLimiter(usize),

    #[error("unknown boundary condition code {0}")]
    UnknownBoundaryType(usize),

    #[error("unknown exact function id {0}")]
    UnknownExactFunction(usize),

    #[error("unknown source function id {0}")]
    UnknownSourceFunction(usize),

    #[error("no Runge-Kutta scheme with {stages} stages of order {order}")]
    UnsupportedRungeKutta { stages: usize, order: usize },

    #[error("periodic face {face} at ({x}, {y}) has no partner for boundary condition {code}")]
    UnmatchedPeriodicFace { face: usize, code: usize, x: f64, y: f64 },

    #[error("singular LU-SGS diagonal block in element {elem}")]
    SingularBlock { elem: usize },

    #[error(
        "GMRES did not converge after {iterations} iterations: |r|/|r0| = {ratio:.3e}, required {tolerance:.3e}"
    )]
    GmresNotConverged {
        iterations: usize,
        ratio: f64,
        tolerance: f64,
    },

    #[error("Newton iteration did not converge after {iterations} iterations: |F|/|F0| = {ratio:.3e}")]
    NewtonNotConverged { iterations: usize, ratio: f64 },

    #[error("non-finite time step in element {elem}")]
    NonFiniteTimeStep { elem: usize },

    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("failed to write VTU output: {0}")]
    Vtk(#[from] vtkio::Error),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl SolverError {
    pub fn invalid_mesh(msg: impl Into<String>) -> Self {
        Self::InvalidMesh(msg.into())
    }
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}
