use ndarray::{Array, Ix1, Ix2, array};

use crate::error::{SolverError, SolverResult};

/// Symmetric quadrature rules on the reference triangle. Points are
/// barycentric coordinates, weights sum to one.
pub fn get_triangle_points(
    points_num: usize,
) -> SolverResult<(Array<f64, Ix2>, Array<f64, Ix1>)> {
    let rule = match points_num {
        1 => {
            let points = array![[1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0]];
            let weights = array![1.0];
            (points, weights)
        }
        3 => {
            let points = array![
                [2.0 / 3.0, 1.0 / 6.0, 1.0 / 6.0],
                [1.0 / 6.0, 2.0 / 3.0, 1.0 / 6.0],
                [1.0 / 6.0, 1.0 / 6.0, 2.0 / 3.0]
            ];
            let weights = array![1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0];
            (points, weights)
        }
        6 => {
            let a = 0.445948490915965;
            let b = 0.091576213509771;
            let points = array![
                [1.0 - 2.0 * a, a, a],
                [a, 1.0 - 2.0 * a, a],
                [a, a, 1.0 - 2.0 * a],
                [1.0 - 2.0 * b, b, b],
                [b, 1.0 - 2.0 * b, b],
                [b, b, 1.0 - 2.0 * b]
            ];
            let weights = array![
                0.223381589678011,
                0.223381589678011,
                0.223381589678011,
                0.109951743655322,
                0.109951743655322,
                0.109951743655322
            ];
            (points, weights)
        }
        _ => {
            return Err(SolverError::invalid_parameter(format!(
                "no triangle quadrature rule with {points_num} points"
            )));
        }
    };
    Ok(rule)
}
