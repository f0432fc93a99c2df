use hashbrown::HashMap;
use log::debug;

use super::{BoundaryEdge, Element, ElementSide, Face, GhostCell, Node, PeriodicConnection};
use crate::{
    disc::{exact_function::Domain, gauss_points::GaussPointsTriangle},
    error::{SolverError, SolverResult},
};

#[derive(Clone, Debug)]
pub struct Mesh2d {
    pub nodes: Vec<Node>,
    pub elements: Vec<Element>,
    pub faces: Vec<Face>,
    pub ghosts: Vec<GhostCell>,
    pub elem_num: usize,
    pub face_num: usize,
    pub ghost_num: usize,
    pub domain: Domain,
}

/// Edge collected from element connectivity before boundary handling.
struct RawFace {
    owner: (usize, usize), // (element, local side)
    neighbor: Option<(usize, usize)>,
    code: Option<usize>,
    merged: bool,
}

fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

/// Lookup of edge midpoints on a uniform grid of spacing `tol`.
struct MidpointGrid {
    tol: f64,
    cells: HashMap<(i64, i64), Vec<usize>>,
}
impl MidpointGrid {
    fn new(tol: f64) -> Self {
        Self {
            tol,
            cells: HashMap::new(),
        }
    }
    fn key(&self, x: [f64; 2]) -> (i64, i64) {
        ((x[0] / self.tol).round() as i64, (x[1] / self.tol).round() as i64)
    }
    fn insert(&mut self, x: [f64; 2], id: usize) {
        let key = self.key(x);
        self.cells.entry(key).or_default().push(id);
    }
    /// Ids stored within `tol` of `x` (checked against `points`).
    fn find(&self, x: [f64; 2], points: &[[f64; 2]]) -> Vec<usize> {
        let (i, j) = self.key(x);
        let mut found = Vec::new();
        for di in -1..=1 {
            for dj in -1..=1 {
                if let Some(ids) = self.cells.get(&(i + di, j + dj)) {
                    for &id in ids {
                        let p = points[id];
                        if (p[0] - x[0]).hypot(p[1] - x[1]) < self.tol {
                            found.push(id);
                        }
                    }
                }
            }
        }
        found
    }
}

impl Mesh2d {
    /// Builds the mesh from counter-clockwise (or clockwise, which is
    /// reversed) triangles and quadrilaterals and tagged boundary edges.
    /// Boundary edges whose code appears in `periodic` are glued to their
    /// translated partner and become interior faces.
    pub fn new(
        nodes: Vec<Node>,
        cells: Vec<Vec<usize>>,
        domains: Vec<usize>,
        boundary_edges: &[BoundaryEdge],
        periodic: &[PeriodicConnection],
        quadrature: &GaussPointsTriangle,
    ) -> SolverResult<Self> {
        if cells.is_empty() {
            return Err(SolverError::invalid_mesh("mesh has no elements"));
        }
        if domains.len() != cells.len() {
            return Err(SolverError::invalid_mesh(format!(
                "{} domain ids given for {} elements",
                domains.len(),
                cells.len()
            )));
        }
        let mut elements = cells
            .into_iter()
            .zip(domains)
            .enumerate()
            .map(|(ielem, (inodes, domain))| Self::build_element(&nodes, ielem, inodes, domain, quadrature))
            .collect::<SolverResult<Vec<_>>>()?;
        let elem_num = elements.len();

        let mut raw_faces: Vec<RawFace> = Vec::new();
        let mut edge_map: HashMap<(usize, usize), usize> = HashMap::new();
        for (ielem, elem) in elements.iter().enumerate() {
            let n = elem.inodes.len();
            for k in 0..n {
                let key = edge_key(elem.inodes[k], elem.inodes[(k + 1) % n]);
                match edge_map.get(&key) {
                    Some(&iraw) => {
                        let raw = &mut raw_faces[iraw];
                        if raw.neighbor.is_some() {
                            return Err(SolverError::invalid_mesh(format!(
                                "edge ({}, {}) is shared by more than two elements",
                                key.0, key.1
                            )));
                        }
                        raw.neighbor = Some((ielem, k));
                    }
                    None => {
                        edge_map.insert(key, raw_faces.len());
                        raw_faces.push(RawFace {
                            owner: (ielem, k),
                            neighbor: None,
                            code: None,
                            merged: false,
                        });
                    }
                }
            }
        }

        let codes: HashMap<(usize, usize), usize> = boundary_edges
            .iter()
            .map(|edge| (edge_key(edge.inodes[0], edge.inodes[1]), edge.code))
            .collect();
        for raw in raw_faces.iter_mut().filter(|raw| raw.neighbor.is_none()) {
            let (a, b) = Self::side_nodes(&elements[raw.owner.0], raw.owner.1);
            match codes.get(&edge_key(a, b)) {
                Some(&code) => raw.code = Some(code),
                None => {
                    return Err(SolverError::invalid_mesh(format!(
                        "boundary edge ({a}, {b}) has no boundary condition"
                    )));
                }
            }
        }

        Self::merge_periodic_faces(&nodes, &elements, &mut raw_faces, periodic)?;

        let mut faces = Vec::new();
        let mut ghosts = Vec::new();
        let mut side_faces: Vec<Vec<usize>> =
            elements.iter().map(|elem| vec![usize::MAX; elem.inodes.len()]).collect();
        for raw in raw_faces.iter().filter(|raw| !raw.merged) {
            let iface = faces.len();
            let (ielem, k) = raw.owner;
            let owner = &elements[ielem];
            let (a, b) = Self::side_nodes(owner, k);
            let (normal, length, midpoint) = Self::edge_geometry(&nodes, a, b);
            let (neighbor, neighbor_side) = match (raw.neighbor, raw.code) {
                (Some((jelem, l)), _) => {
                    side_faces[jelem][l] = iface;
                    (jelem, Some(l))
                }
                (None, Some(code)) => {
                    let offset = [midpoint[0] - owner.bary[0], midpoint[1] - owner.bary[1]];
                    let dist = offset[0] * normal[0] + offset[1] * normal[1];
                    ghosts.push(GhostCell {
                        iface,
                        owner: ielem,
                        bary: [
                            owner.bary[0] + 2.0 * dist * normal[0],
                            owner.bary[1] + 2.0 * dist * normal[1],
                        ],
                        code,
                    });
                    (elem_num + ghosts.len() - 1, None)
                }
                (None, None) => {
                    return Err(SolverError::invalid_mesh(format!(
                        "edge ({a}, {b}) has neither a neighbor nor a boundary condition"
                    )));
                }
            };
            side_faces[ielem][k] = iface;
            faces.push(Face {
                inodes: [a, b],
                owner: ielem,
                neighbor,
                owner_side: k,
                neighbor_side,
                normal,
                length,
                midpoint,
            });
        }

        for ielem in 0..elem_num {
            let sides = (0..elements[ielem].inodes.len())
                .map(|k| {
                    let iface = side_faces[ielem][k];
                    let face = &faces[iface];
                    let is_owner = face.owner == ielem && face.owner_side == k;
                    let face_offset = Self::side_offset(&nodes, &elements[ielem], k);
                    let (ineighbor, sign) = if is_owner {
                        (face.neighbor, 1.0)
                    } else {
                        (face.owner, -1.0)
                    };
                    let to_neighbor = match (is_owner, face.neighbor_side) {
                        (true, None) => {
                            let dist = face_offset[0] * face.normal[0] + face_offset[1] * face.normal[1];
                            [2.0 * dist * face.normal[0], 2.0 * dist * face.normal[1]]
                        }
                        (true, Some(l)) => {
                            let other = Self::side_offset(&nodes, &elements[face.neighbor], l);
                            [face_offset[0] - other[0], face_offset[1] - other[1]]
                        }
                        (false, _) => {
                            let other = Self::side_offset(&nodes, &elements[face.owner], face.owner_side);
                            [face_offset[0] - other[0], face_offset[1] - other[1]]
                        }
                    };
                    ElementSide {
                        iface,
                        ineighbor,
                        sign,
                        face_offset,
                        to_neighbor,
                        weight: [0.0; 2],
                    }
                })
                .collect();
            elements[ielem].sides = sides;
            Self::compute_lsq_weights(&mut elements[ielem], ielem)?;
        }

        let total_area: f64 = elements.iter().map(|elem| elem.area).sum();
        let mut x_min = [f64::INFINITY; 2];
        let mut x_max = [f64::NEG_INFINITY; 2];
        for node in nodes.iter() {
            x_min = [x_min[0].min(node.x), x_min[1].min(node.y)];
            x_max = [x_max[0].max(node.x), x_max[1].max(node.y)];
        }
        let domain = Domain {
            x_min,
            x_max,
            dx_ref: (total_area / elem_num as f64).sqrt(),
        };
        let face_num = faces.len();
        let ghost_num = ghosts.len();
        debug!("mesh assembled: {elem_num} elements, {face_num} faces, {ghost_num} ghost cells");
        Ok(Self {
            nodes,
            elements,
            faces,
            ghosts,
            elem_num,
            face_num,
            ghost_num,
            domain,
        })
    }
    /// Number of elements plus ghost cells.
    pub fn cell_num(&self) -> usize {
        self.elem_num + self.ghost_num
    }
    pub fn is_ghost(&self, icell: usize) -> bool {
        icell >= self.elem_num
    }
    pub fn total_area(&self) -> f64 {
        self.elements.iter().map(|elem| elem.area).sum()
    }
    fn build_element(
        nodes: &[Node],
        ielem: usize,
        mut inodes: Vec<usize>,
        domain: usize,
        quadrature: &GaussPointsTriangle,
    ) -> SolverResult<Element> {
        if !(3..=4).contains(&inodes.len()) {
            return Err(SolverError::invalid_mesh(format!(
                "element {ielem} has {} vertices, only triangles and quadrilaterals are supported",
                inodes.len()
            )));
        }
        if let Some(&bad) = inodes.iter().find(|&&inode| inode >= nodes.len()) {
            return Err(SolverError::invalid_mesh(format!(
                "element {ielem} references missing node {bad}"
            )));
        }
        let signed_area = |inodes: &[usize]| {
            let n = inodes.len();
            (0..n)
                .map(|k| {
                    let (p, q) = (nodes[inodes[k]], nodes[inodes[(k + 1) % n]]);
                    p.x * q.y - q.x * p.y
                })
                .sum::<f64>()
                * 0.5
        };
        let mut area = signed_area(&inodes);
        if area < 0.0 {
            inodes.reverse();
            area = -area;
        }
        if area <= f64::EPSILON * f64::EPSILON {
            return Err(SolverError::invalid_mesh(format!("element {ielem} has zero area")));
        }
        let n = inodes.len();
        let mut bary = [0.0; 2];
        let (mut sx, mut sy) = (0.0, 0.0);
        for k in 0..n {
            let (p, q) = (nodes[inodes[k]], nodes[inodes[(k + 1) % n]]);
            let cross = p.x * q.y - q.x * p.y;
            bary[0] += (p.x + q.x) * cross;
            bary[1] += (p.y + q.y) * cross;
            sx += 0.5 * (q.y - p.y).abs();
            sy += 0.5 * (q.x - p.x).abs();
        }
        bary = bary.map(|c| c / (6.0 * area));

        let (mut quad_points, mut quad_weights) = (Vec::new(), Vec::new());
        let vertex = |k: usize| [nodes[inodes[k]].x, nodes[inodes[k]].y];
        quadrature.map_to([vertex(0), vertex(1), vertex(2)], &mut quad_points, &mut quad_weights);
        if n == 4 {
            quadrature.map_to([vertex(0), vertex(2), vertex(3)], &mut quad_points, &mut quad_weights);
        }
        Ok(Element {
            inodes,
            sides: Vec::new(),
            bary,
            area,
            sx,
            sy,
            domain,
            quad_points,
            quad_weights,
        })
    }
    fn side_nodes(elem: &Element, k: usize) -> (usize, usize) {
        (elem.inodes[k], elem.inodes[(k + 1) % elem.inodes.len()])
    }
    fn side_offset(nodes: &[Node], elem: &Element, k: usize) -> [f64; 2] {
        let (a, b) = Self::side_nodes(elem, k);
        [
            0.5 * (nodes[a].x + nodes[b].x) - elem.bary[0],
            0.5 * (nodes[a].y + nodes[b].y) - elem.bary[1],
        ]
    }
    /// Outward normal (for a counter-clockwise traversal a -> b), length and
    /// midpoint of an edge.
    fn edge_geometry(nodes: &[Node], a: usize, b: usize) -> ([f64; 2], f64, [f64; 2]) {
        let dx = nodes[b].x - nodes[a].x;
        let dy = nodes[b].y - nodes[a].y;
        let length = dx.hypot(dy);
        (
            [dy / length, -dx / length],
            length,
            [0.5 * (nodes[a].x + nodes[b].x), 0.5 * (nodes[a].y + nodes[b].y)],
        )
    }
    fn merge_periodic_faces(
        nodes: &[Node],
        elements: &[Element],
        raw_faces: &mut [RawFace],
        periodic: &[PeriodicConnection],
    ) -> SolverResult<()> {
        let connections: HashMap<usize, [f64; 2]> =
            periodic.iter().map(|p| (p.code, p.connection)).collect();
        let candidates: Vec<usize> = raw_faces
            .iter()
            .enumerate()
            .filter(|(_, raw)| raw.code.is_some_and(|code| connections.contains_key(&code)))
            .map(|(iraw, _)| iraw)
            .collect();
        if candidates.is_empty() {
            return Ok(());
        }
        let mut midpoints = Vec::with_capacity(candidates.len());
        let mut min_length = f64::INFINITY;
        for &iraw in candidates.iter() {
            let (ielem, k) = raw_faces[iraw].owner;
            let (a, b) = Self::side_nodes(&elements[ielem], k);
            let (_, length, midpoint) = Self::edge_geometry(nodes, a, b);
            midpoints.push(midpoint);
            min_length = min_length.min(length);
        }
        let tol = 1e-4 * min_length;
        let mut grid = MidpointGrid::new(tol);
        for (icand, midpoint) in midpoints.iter().enumerate() {
            grid.insert(*midpoint, icand);
        }
        let codes: Vec<usize> = candidates
            .iter()
            .map(|&iraw| raw_faces[iraw].code.unwrap_or_default())
            .collect();
        let mut paired = vec![false; candidates.len()];
        for icand in 0..candidates.len() {
            if paired[icand] {
                continue;
            }
            let iraw = candidates[icand];
            let code = codes[icand];
            let connection = connections[&code];
            let mid = midpoints[icand];
            // the partner's connection has to lead back to this face
            let reverses = |jcand: usize| {
                let back = connections[&codes[jcand]];
                (back[0] + connection[0]).hypot(back[1] + connection[1]) < tol
            };
            let partner = [1.0, -1.0].iter().find_map(|&sign| {
                let target = [mid[0] + sign * connection[0], mid[1] + sign * connection[1]];
                grid.find(target, &midpoints)
                    .into_iter()
                    .find(|&jcand| jcand != icand && !paired[jcand] && reverses(jcand))
            });
            let Some(jcand) = partner else {
                return Err(SolverError::UnmatchedPeriodicFace {
                    face: iraw,
                    code,
                    x: mid[0],
                    y: mid[1],
                });
            };
            paired[icand] = true;
            paired[jcand] = true;
            let jraw = candidates[jcand];
            let partner_owner = raw_faces[jraw].owner;
            raw_faces[jraw].merged = true;
            raw_faces[iraw].neighbor = Some(partner_owner);
            raw_faces[iraw].code = None;
        }
        Ok(())
    }
    /// Least-squares gradient weights by Gram-Schmidt orthogonalisation of
    /// the barycenter-to-neighbor vectors.
    fn compute_lsq_weights(elem: &mut Element, ielem: usize) -> SolverResult<()> {
        let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
        for side in elem.sides.iter() {
            let [dx, dy] = side.to_neighbor;
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }
        let r11 = sxx.sqrt();
        if r11 <= f64::EPSILON {
            return Err(SolverError::invalid_mesh(format!(
                "element {ielem} has degenerate neighbor stencil"
            )));
        }
        let r12 = sxy / r11;
        let r22_sq = syy - r12 * r12;
        if r22_sq <= f64::EPSILON * syy.max(sxx) {
            return Err(SolverError::invalid_mesh(format!(
                "element {ielem} has collinear neighbor stencil"
            )));
        }
        let r22 = r22_sq.sqrt();
        for side in elem.sides.iter_mut() {
            let [dx, dy] = side.to_neighbor;
            let alpha1 = dx / (r11 * r11);
            let alpha2 = (dy - r12 / r11 * dx) / (r22 * r22);
            side.weight = [alpha1 - r12 / r11 * alpha2, alpha2];
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quadrature() -> GaussPointsTriangle {
        GaussPointsTriangle::new(3).unwrap()
    }

    fn unit_square_nodes() -> Vec<Node> {
        [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.5, 0.4)]
            .iter()
            .map(|&(x, y)| Node { x, y })
            .collect()
    }

    fn fan_mesh() -> Mesh2d {
        let walls: Vec<BoundaryEdge> = [[0, 1], [1, 2], [2, 3], [3, 0]]
            .iter()
            .map(|&inodes| BoundaryEdge { inodes, code: 101 })
            .collect();
        Mesh2d::new(
            unit_square_nodes(),
            vec![vec![0, 1, 4], vec![1, 2, 4], vec![2, 3, 4], vec![4, 3, 0]],
            vec![1; 4],
            &walls,
            &[],
            &quadrature(),
        )
        .unwrap()
    }

    #[test]
    fn geometry_of_triangle_fan() {
        let mesh = fan_mesh();
        assert_eq!(mesh.elem_num, 4);
        assert_eq!(mesh.face_num, 8);
        assert_eq!(mesh.ghost_num, 4);
        assert_relative_eq!(mesh.total_area(), 1.0, epsilon = 1e-14);
        let first = &mesh.elements[0];
        assert_relative_eq!(first.area, 0.2, epsilon = 1e-14);
        assert_relative_eq!(first.bary[0], 0.5, epsilon = 1e-14);
        assert_relative_eq!(first.bary[1], 0.4 / 3.0, epsilon = 1e-14);
        let quad_area: f64 = first.quad_weights.iter().sum();
        assert_relative_eq!(quad_area, first.area, epsilon = 1e-14);
    }

    #[test]
    fn side_normals_close_each_element() {
        let mesh = fan_mesh();
        for elem in mesh.elements.iter() {
            let mut closure = [0.0; 2];
            for side in elem.sides.iter() {
                let face = &mesh.faces[side.iface];
                closure[0] += side.sign * face.normal[0] * face.length;
                closure[1] += side.sign * face.normal[1] * face.length;
                // outward normals point away from the barycenter
                let n = [side.sign * face.normal[0], side.sign * face.normal[1]];
                assert!(n[0] * side.face_offset[0] + n[1] * side.face_offset[1] > 0.0);
            }
            assert_relative_eq!(closure[0], 0.0, epsilon = 1e-14);
            assert_relative_eq!(closure[1], 0.0, epsilon = 1e-14);
        }
    }

    #[test]
    fn least_squares_weights_reproduce_linear_fields() {
        let mesh = fan_mesh();
        let field = |x: [f64; 2]| 3.0 * x[0] - 2.0 * x[1] + 0.5;
        let bary = |icell: usize| {
            if mesh.is_ghost(icell) {
                mesh.ghosts[icell - mesh.elem_num].bary
            } else {
                mesh.elements[icell].bary
            }
        };
        for elem in mesh.elements.iter() {
            let mut grad = [0.0; 2];
            for side in elem.sides.iter() {
                let du = field(bary(side.ineighbor)) - field(elem.bary);
                grad[0] += side.weight[0] * du;
                grad[1] += side.weight[1] * du;
            }
            assert_relative_eq!(grad[0], 3.0, epsilon = 1e-12);
            assert_relative_eq!(grad[1], -2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn clockwise_elements_are_reoriented() {
        let walls: Vec<BoundaryEdge> = [[0, 1], [1, 2], [2, 3], [3, 0]]
            .iter()
            .map(|&inodes| BoundaryEdge { inodes, code: 101 })
            .collect();
        let mesh = Mesh2d::new(
            unit_square_nodes(),
            vec![vec![0, 3, 2, 1]],
            vec![1],
            &walls,
            &[],
            &quadrature(),
        )
        .unwrap();
        assert_relative_eq!(mesh.elements[0].area, 1.0, epsilon = 1e-14);
        assert_relative_eq!(mesh.elements[0].sx, 1.0, epsilon = 1e-14);
        assert_relative_eq!(mesh.elements[0].sy, 1.0, epsilon = 1e-14);
    }

    #[test]
    fn missing_boundary_code_is_rejected() {
        let result = Mesh2d::new(
            unit_square_nodes(),
            vec![vec![0, 1, 2, 3]],
            vec![1],
            &[BoundaryEdge { inodes: [0, 1], code: 101 }],
            &[],
            &quadrature(),
        );
        assert!(matches!(result, Err(SolverError::InvalidMesh(_))));
    }

    #[test]
    fn periodic_faces_are_glued() {
        let nodes: Vec<Node> = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 1.0), (1.0, 1.0), (2.0, 1.0)]
            .iter()
            .map(|&(x, y)| Node { x, y })
            .collect();
        let edges = vec![
            BoundaryEdge { inodes: [0, 1], code: 101 },
            BoundaryEdge { inodes: [1, 2], code: 101 },
            BoundaryEdge { inodes: [5, 4], code: 101 },
            BoundaryEdge { inodes: [4, 3], code: 101 },
            BoundaryEdge { inodes: [2, 5], code: 701 },
            BoundaryEdge { inodes: [3, 0], code: 702 },
        ];
        let periodic = [
            PeriodicConnection { code: 701, connection: [-2.0, 0.0] },
            PeriodicConnection { code: 702, connection: [2.0, 0.0] },
        ];
        let mesh = Mesh2d::new(
            nodes,
            vec![vec![0, 1, 4, 3], vec![1, 2, 5, 4]],
            vec![1, 1],
            &edges,
            &periodic,
            &quadrature(),
        )
        .unwrap();
        assert_eq!(mesh.face_num, 6);
        assert_eq!(mesh.ghost_num, 4);
        let interior: Vec<&Face> = mesh.faces.iter().filter(|f| f.neighbor < mesh.elem_num).collect();
        assert_eq!(interior.len(), 2);
        for elem in mesh.elements.iter() {
            let to_x: Vec<f64> = elem
                .sides
                .iter()
                .filter(|side| side.ineighbor < mesh.elem_num)
                .map(|side| side.to_neighbor[0])
                .collect();
            assert_eq!(to_x.len(), 2);
            assert_relative_eq!(to_x.iter().map(|d| d.abs()).sum::<f64>(), 2.0, epsilon = 1e-14);
        }
    }

    #[test]
    fn unmatched_periodic_face_is_reported() {
        let edges: Vec<BoundaryEdge> = [[0, 1], [1, 2], [2, 3]]
            .iter()
            .map(|&inodes| BoundaryEdge { inodes, code: 101 })
            .chain(std::iter::once(BoundaryEdge { inodes: [3, 0], code: 701 }))
            .collect();
        let result = Mesh2d::new(
            unit_square_nodes(),
            vec![vec![0, 1, 2, 3]],
            vec![1],
            &edges,
            &[PeriodicConnection { code: 701, connection: [1.0, 0.0] }],
            &quadrature(),
        );
        assert!(matches!(result, Err(SolverError::UnmatchedPeriodicFace { code: 701, .. })));
    }

    #[test]
    fn periodic_partners_need_opposite_connections() {
        let edges = |left: usize, right: usize| {
            vec![
                BoundaryEdge { inodes: [0, 1], code: 101 },
                BoundaryEdge { inodes: [1, 2], code: right },
                BoundaryEdge { inodes: [2, 3], code: 101 },
                BoundaryEdge { inodes: [3, 0], code: left },
            ]
        };
        let build = |edges: &[BoundaryEdge], periodic: &[PeriodicConnection]| {
            Mesh2d::new(unit_square_nodes(), vec![vec![0, 1, 2, 3]], vec![1], edges, periodic, &quadrature())
        };
        let matched = [
            PeriodicConnection { code: 701, connection: [1.0, 0.0] },
            PeriodicConnection { code: 702, connection: [-1.0, 0.0] },
        ];
        let mesh = build(&edges(701, 702), &matched).unwrap();
        assert_eq!(mesh.ghost_num, 2);

        let same_direction = [
            PeriodicConnection { code: 701, connection: [1.0, 0.0] },
            PeriodicConnection { code: 702, connection: [1.0, 0.0] },
        ];
        assert!(matches!(
            build(&edges(701, 702), &same_direction),
            Err(SolverError::UnmatchedPeriodicFace { .. })
        ));
        // one code on both sides cannot map each face onto the other
        assert!(matches!(
            build(&edges(701, 701), &matched[..1]),
            Err(SolverError::UnmatchedPeriodicFace { code: 701, .. })
        ));
    }
}
