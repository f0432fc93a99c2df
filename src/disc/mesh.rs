//! Unstructured 2-D mesh stored as contiguous arenas.
//!
//! Cells are addressed by one index space: `0..elem_num` are elements,
//! `elem_num..elem_num + ghost_num` are ghost cells behind boundary faces.
pub mod cartesian;
pub mod mesh2d;

pub use mesh2d::Mesh2d;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    pub x: f64,
    pub y: f64,
}

/// Boundary edge of the input connectivity, tagged with a boundary code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundaryEdge {
    pub inodes: [usize; 2],
    pub code: usize,
}

/// Translation between the two halves of a periodic boundary code.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeriodicConnection {
    pub code: usize,
    pub connection: [f64; 2],
}

/// One side of an element as seen from that element.
#[derive(Clone, Debug)]
pub struct ElementSide {
    pub iface: usize,
    pub ineighbor: usize,     // cell index, ghosts start at elem_num
    pub sign: f64,            // +1 if the face normal points out of this element
    pub face_offset: [f64; 2], // edge midpoint minus barycenter
    pub to_neighbor: [f64; 2], // neighbor barycenter minus own, periodic shift included
    pub weight: [f64; 2],      // least-squares gradient weights
}

#[derive(Clone, Debug)]
pub struct Element {
    pub inodes: Vec<usize>,
    pub sides: Vec<ElementSide>,
    pub bary: [f64; 2],
    pub area: f64,
    pub sx: f64, // projected extent normal to x
    pub sy: f64,
    pub domain: usize,
    pub quad_points: Vec<[f64; 2]>,
    pub quad_weights: Vec<f64>, // scaled by the area
}

#[derive(Clone, Debug)]
pub struct Face {
    pub inodes: [usize; 2],
    pub owner: usize,
    pub neighbor: usize,
    pub owner_side: usize,
    pub neighbor_side: Option<usize>, // None behind a ghost
    pub normal: [f64; 2],             // unit normal pointing out of the owner
    pub length: f64,
    pub midpoint: [f64; 2],
}

#[derive(Clone, Debug)]
pub struct GhostCell {
    pub iface: usize,
    pub owner: usize,
    pub bary: [f64; 2], // owner barycenter mirrored across the face
    pub code: usize,
}
