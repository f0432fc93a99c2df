use std::{fs::OpenOptions, path::Path};

use csv::{Writer, WriterBuilder};
use ndarray::Array2;
use serde::Serialize;

use crate::{
    disc::{
        equation_of_state::{P, RHO, State, VX, VY},
        mesh::Mesh2d,
    },
    error::SolverResult,
};

#[derive(Serialize)]
struct CellData {
    x: f64,
    y: f64,
    rho: f64,
    vx: f64,
    vy: f64,
    p: f64,
}

/// Primitive cell averages at the element barycenters.
pub fn write_to_csv(pvar: &Array2<f64>, mesh: &Mesh2d, filename: &Path) -> SolverResult<()> {
    let mut writer = Writer::from_path(filename)?;
    for (ielem, elem) in mesh.elements.iter().enumerate() {
        let data = CellData {
            x: elem.bary[0],
            y: elem.bary[1],
            rho: pvar[[ielem, RHO]],
            vx: pvar[[ielem, VX]],
            vy: pvar[[ielem, VY]],
            p: pvar[[ielem, P]],
        };
        writer.serialize(data)?;
    }
    writer.flush()?;
    Ok(())
}

const RESIDUAL_HEADER: [&str; 6] = [
    "Iter",
    "Time",
    "Residual(RHO)",
    "Residual(VX)",
    "Residual(VY)",
    "Residual(E)",
];

/// Appends rows of `iter, time, residuals` to a history file, writing the
/// header when the file is created.
pub struct ResidualHistory {
    writer: Writer<std::fs::File>,
}
impl ResidualHistory {
    pub fn create(filename: &Path) -> SolverResult<Self> {
        let file = OpenOptions::new().create(true).write(true).truncate(true).open(filename)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(RESIDUAL_HEADER)?;
        Ok(Self { writer })
    }
    pub fn record(&mut self, iter: usize, time: f64, residual: &State) -> SolverResult<()> {
        self.writer
            .serialize((iter, time, residual[0], residual[1], residual[2], residual[3]))?;
        self.writer.flush()?;
        Ok(())
    }
}
