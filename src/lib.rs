//! Cell-centred finite-volume solver for the 2-D Euler equations on
//! unstructured triangle and quadrilateral meshes.
pub mod analyze;
pub mod disc;
pub mod error;
pub mod initialization;
pub mod io;
pub mod solver;
pub mod temporal_disc;

pub use error::{SolverError, SolverResult};
