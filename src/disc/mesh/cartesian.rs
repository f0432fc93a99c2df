use serde::Deserialize;

use super::{BoundaryEdge, Mesh2d, Node, PeriodicConnection};
use crate::{
    disc::gauss_points::GaussPointsTriangle,
    error::{SolverError, SolverResult},
};

/// Boundary code applied to the edges `range[0]..=range[1]` (1-based) of one
/// side of the box.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct BoundarySegment {
    pub code: usize,
    pub range: [usize; 2],
}

/// Structured `nx` x `ny` grid on a rectangle.
#[derive(Clone, Debug, Deserialize)]
pub struct CartesianMesh {
    pub x_min: [f64; 2],
    pub x_max: [f64; 2],
    pub elem_num: [usize; 2],
    #[serde(default)]
    pub split_triangles: bool,
    pub bottom: Vec<BoundarySegment>,
    pub right: Vec<BoundarySegment>,
    pub top: Vec<BoundarySegment>,
    pub left: Vec<BoundarySegment>,
}
impl CartesianMesh {
    /// Single boundary code on every side.
    pub fn uniform(x_min: [f64; 2], x_max: [f64; 2], elem_num: [usize; 2], codes: [usize; 4]) -> Self {
        let segment = |code: usize, n: usize| vec![BoundarySegment { code, range: [1, n] }];
        Self {
            x_min,
            x_max,
            elem_num,
            split_triangles: false,
            bottom: segment(codes[0], elem_num[0]),
            right: segment(codes[1], elem_num[1]),
            top: segment(codes[2], elem_num[0]),
            left: segment(codes[3], elem_num[1]),
        }
    }
    pub fn build(
        &self,
        periodic: &[PeriodicConnection],
        quadrature: &GaussPointsTriangle,
    ) -> SolverResult<Mesh2d> {
        let [nx, ny] = self.elem_num;
        if nx == 0 || ny == 0 {
            return Err(SolverError::invalid_mesh("cartesian mesh needs at least one element per direction"));
        }
        let dx = (self.x_max[0] - self.x_min[0]) / nx as f64;
        let dy = (self.x_max[1] - self.x_min[1]) / ny as f64;
        let mut nodes = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..=ny {
            for i in 0..=nx {
                nodes.push(Node {
                    x: self.x_min[0] + i as f64 * dx,
                    y: self.x_min[1] + j as f64 * dy,
                });
            }
        }
        let node = |i: usize, j: usize| j * (nx + 1) + i;

        let mut cells = Vec::new();
        for j in 0..ny {
            for i in 0..nx {
                let quad = [node(i, j), node(i + 1, j), node(i + 1, j + 1), node(i, j + 1)];
                if self.split_triangles {
                    cells.push(vec![quad[0], quad[1], quad[2]]);
                    cells.push(vec![quad[0], quad[2], quad[3]]);
                } else {
                    cells.push(quad.to_vec());
                }
            }
        }
        let domains = vec![1; cells.len()];

        let mut boundary_edges = Vec::with_capacity(2 * (nx + ny));
        let sides: [(&[BoundarySegment], usize, &dyn Fn(usize) -> [usize; 2]); 4] = [
            (self.bottom.as_slice(), nx, &|i: usize| [node(i, 0), node(i + 1, 0)]),
            (self.right.as_slice(), ny, &|j: usize| [node(nx, j), node(nx, j + 1)]),
            (self.top.as_slice(), nx, &|i: usize| [node(i, ny), node(i + 1, ny)]),
            (self.left.as_slice(), ny, &|j: usize| [node(0, j), node(0, j + 1)]),
        ];
        for (segments, len, edge) in sides {
            for segment in segments {
                let [first, last] = segment.range;
                if first == 0 || last < first || last > len {
                    return Err(SolverError::invalid_mesh(format!(
                        "boundary range {first}..={last} outside 1..={len}"
                    )));
                }
                for k in first - 1..last {
                    boundary_edges.push(BoundaryEdge {
                        inodes: edge(k),
                        code: segment.code,
                    });
                }
            }
        }
        Mesh2d::new(nodes, cells, domains, &boundary_edges, periodic, quadrature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn quads_and_triangles_cover_the_box() {
        let quadrature = GaussPointsTriangle::new(3).unwrap();
        let mut cartesian = CartesianMesh::uniform([0.0, -1.0], [2.0, 1.0], [4, 3], [101; 4]);
        let quads = cartesian.build(&[], &quadrature).unwrap();
        assert_eq!(quads.elem_num, 12);
        assert_eq!(quads.ghost_num, 14);
        assert_eq!(quads.face_num, 31);
        assert_relative_eq!(quads.total_area(), 4.0, epsilon = 1e-12);
        assert_relative_eq!(quads.domain.dx_ref, (4.0f64 / 12.0).sqrt(), epsilon = 1e-12);

        cartesian.split_triangles = true;
        let triangles = cartesian.build(&[], &quadrature).unwrap();
        assert_eq!(triangles.elem_num, 24);
        assert_eq!(triangles.face_num, 43);
        assert_relative_eq!(triangles.total_area(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn doubly_periodic_box_has_no_ghosts() {
        let quadrature = GaussPointsTriangle::new(3).unwrap();
        let cartesian = CartesianMesh::uniform([0.0, 0.0], [1.0, 1.0], [3, 2], [701, 702, 703, 704]);
        let periodic = [
            PeriodicConnection { code: 701, connection: [0.0, 1.0] },
            PeriodicConnection { code: 702, connection: [-1.0, 0.0] },
            PeriodicConnection { code: 703, connection: [0.0, -1.0] },
            PeriodicConnection { code: 704, connection: [1.0, 0.0] },
        ];
        let mesh = cartesian.build(&periodic, &quadrature).unwrap();
        assert_eq!(mesh.ghost_num, 0);
        assert_eq!(mesh.face_num, 12);
        assert!(mesh.elements.iter().all(|elem| elem.sides.len() == 4));
    }

    #[test]
    fn bad_segment_range_is_rejected() {
        let quadrature = GaussPointsTriangle::new(3).unwrap();
        let mut cartesian = CartesianMesh::uniform([0.0, 0.0], [1.0, 1.0], [2, 2], [101; 4]);
        cartesian.top[0].range = [1, 3];
        assert!(cartesian.build(&[], &quadrature).is_err());
    }
}
