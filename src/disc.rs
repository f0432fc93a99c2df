pub mod boundary;
pub mod equation_of_state;
pub mod exact_function;
pub mod finite_difference;
pub mod finite_volume;
pub mod flux;
pub mod gauss_points;
pub mod mesh;
pub mod reconstruction;
pub mod riemann_solver;
pub mod source;
