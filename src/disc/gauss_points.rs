use ndarray::{Array, Ix1, Ix2};

use crate::error::SolverResult;

pub mod triangle_points;

pub struct GaussPointsTriangle {
    pub points: Array<f64, Ix2>, // barycentric coordinates, one row per point
    pub weights: Array<f64, Ix1>,
}
impl GaussPointsTriangle {
    pub fn new(points_num: usize) -> SolverResult<Self> {
        let (points, weights) = triangle_points::get_triangle_points(points_num)?;
        Ok(Self { points, weights })
    }
    /// Physical points and area-scaled weights on the triangle `vertices`,
    /// appended to `points` and `weights`.
    pub fn map_to(
        &self,
        vertices: [[f64; 2]; 3],
        points: &mut Vec<[f64; 2]>,
        weights: &mut Vec<f64>,
    ) {
        let [a, b, c] = vertices;
        let area = 0.5 * ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1])).abs();
        for (lambda, &w) in self.points.rows().into_iter().zip(self.weights.iter()) {
            points.push(std::array::from_fn(|d| {
                lambda[0] * a[d] + lambda[1] * b[d] + lambda[2] * c[d]
            }));
            weights.push(w * area);
        }
    }
}
