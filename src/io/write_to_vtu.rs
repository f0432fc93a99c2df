use std::{
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use ndarray::Array2;
use once_cell::sync::Lazy;
use vtkio::{
    Vtk,
    model::{
        Attribute, Attributes, ByteOrder, CellType, Cells, DataArray, DataSet, ElementType, IOBuffer,
        UnstructuredGridPiece, Version, VertexNumbers,
    },
};

use crate::{
    disc::{
        equation_of_state::{P, RHO, VX, VY, sound_speed},
        mesh::Mesh2d,
    },
    error::SolverResult,
};

/// Start time of this run, shared by every output file it writes.
static RUN_STAMP: Lazy<u64> = Lazy::new(|| {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
});

/// `<directory>/<name>_<run stamp>`, created on demand.
pub fn run_directory(directory: &str, name: &str) -> SolverResult<PathBuf> {
    let dir = Path::new(directory).join(format!("{name}_{}", *RUN_STAMP));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn scalar(name: &str, data: Vec<f64>) -> Attribute {
    Attribute::DataArray(DataArray {
        name: name.to_string(),
        elem: ElementType::Scalars {
            num_comp: 1,
            lookup_table: None,
        },
        data: IOBuffer::F64(data),
    })
}

/// Primitive cell averages on the mesh as an XML unstructured grid.
pub fn write_average(pvar: &Array2<f64>, mesh: &Mesh2d, hcr: f64, filename: &Path) -> SolverResult<()> {
    let points: Vec<f64> = mesh.nodes.iter().flat_map(|node| [node.x, node.y, 0.0]).collect();

    let mut connectivity = Vec::new();
    let mut offsets = Vec::with_capacity(mesh.elem_num);
    let mut types = Vec::with_capacity(mesh.elem_num);
    for elem in mesh.elements.iter() {
        connectivity.extend(elem.inodes.iter().map(|&inode| inode as u64));
        offsets.push(connectivity.len() as u64);
        types.push(if elem.inodes.len() == 3 {
            CellType::Triangle
        } else {
            CellType::Quad
        });
    }

    let column = |k: usize| pvar.column(k).iter().take(mesh.elem_num).copied().collect::<Vec<_>>();
    let mach = (0..mesh.elem_num)
        .map(|ielem| {
            let prim = [pvar[[ielem, RHO]], pvar[[ielem, VX]], pvar[[ielem, VY]], pvar[[ielem, P]]];
            prim[VX].hypot(prim[VY]) / sound_speed(&prim, hcr)
        })
        .collect();

    let vtk_file = Vtk {
        version: Version::XML { major: 1, minor: 0 },
        title: "Cell Averages".into(),
        byte_order: ByteOrder::native(),
        data: DataSet::inline(UnstructuredGridPiece {
            points: IOBuffer::F64(points),
            cells: Cells {
                cell_verts: VertexNumbers::XML { connectivity, offsets },
                types,
            },
            data: Attributes {
                point: vec![],
                cell: vec![
                    scalar("Density", column(RHO)),
                    scalar("VelocityX", column(VX)),
                    scalar("VelocityY", column(VY)),
                    scalar("Pressure", column(P)),
                    scalar("Mach", mach),
                ],
            },
        }),
        file_path: None,
    };
    vtk_file.export(filename)?;
    Ok(())
}
