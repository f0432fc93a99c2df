use std::path::PathBuf;

use log::{info, warn};

use crate::{
    analyze::{ErrorNorms, error_norms},
    disc::{
        equation_of_state::{E, MX, MY, RHO, State},
        exact_function::ExactFunction,
        finite_volume::{FlowField, SpatialResidualOperator},
    },
    error::SolverResult,
    initialization::Problem,
    io::{
        param_parser::ParamParser,
        write_to_csv::{ResidualHistory, write_to_csv},
        write_to_vtu::{run_directory, write_average},
    },
    temporal_disc::TimeScheme,
};

/// Where and what to write; `None` in `SolverParameters::output` disables
/// all files.
#[derive(Clone, Debug)]
pub struct OutputTarget {
    pub directory: PathBuf,
    pub name: String,
    pub vtu: bool,
}

#[derive(Clone, Debug)]
pub struct SolverParameters {
    pub cfl: f64,
    pub start_time: f64,
    pub stop_time: f64,
    pub max_iter: usize,
    pub stationary: bool,
    pub abort_residual: f64,
    pub print_interval: usize,
    pub io_interval: usize,
    pub output: Option<OutputTarget>,
}
impl SolverParameters {
    /// Driver settings of a parameter file; creates the output directory.
    pub fn from_parser(params: &ParamParser) -> SolverResult<Self> {
        let time = &params.time;
        let output = &params.output;
        Ok(Self {
            cfl: time.cfl,
            start_time: time.start_time,
            stop_time: time.stop_time,
            max_iter: time.max_iter,
            stationary: time.stationary,
            abort_residual: time.abort_residual,
            print_interval: output.print_interval,
            io_interval: output.io_interval,
            output: Some(OutputTarget {
                directory: run_directory(&output.directory, &output.name)?,
                name: output.name.clone(),
                vtu: output.vtu,
            }),
        })
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SolveSummary {
    pub iterations: usize,
    pub time: f64,
    pub residual: State,
    pub errors: Option<ErrorNorms>,
}

pub struct Solver<'a> {
    pub field: FlowField,
    pub operator: SpatialResidualOperator<'a>,
    pub scheme: TimeScheme,
    pub solver_params: SolverParameters,
    exact: Option<&'a ExactFunction>,
}
impl<'a> Solver<'a> {
    pub fn new(problem: &'a Problem, scheme: TimeScheme, field: FlowField, solver_params: SolverParameters) -> Self {
        let operator = SpatialResidualOperator::new(
            &problem.mesh,
            &problem.boundaries,
            &problem.flow,
            &problem.reconstruction,
            problem.source.as_ref(),
            problem.riemann_solver,
        );
        Self {
            field,
            operator,
            scheme,
            solver_params,
            exact: problem.exact.as_ref(),
        }
    }
    /// Marches until the stop time, the iteration limit or, for stationary
    /// runs, until the density residual drops below `abort_residual`.
    pub fn solve(&mut self) -> SolverResult<SolveSummary> {
        let params = self.solver_params.clone();
        let mut history = match &params.output {
            Some(target) => Some(ResidualHistory::create(
                &target.directory.join(format!("{}_residuals.csv", target.name)),
            )?),
            None => None,
        };
        info!("time integration: {}", self.scheme.integrator().name());

        let mut time = params.start_time;
        let mut iter = 0;
        let mut residual = [0.0; 4];
        loop {
            if !params.stationary && time >= params.stop_time {
                break;
            }
            if iter >= params.max_iter {
                if !params.stationary {
                    warn!("reached max_iter = {} at t = {time:.6e} before stop_time", params.max_iter);
                }
                break;
            }
            let mut dt = self.operator.compute_time_step(&mut self.field, params.cfl)?;
            let mut next_time = time + dt;
            if !params.stationary && next_time >= params.stop_time {
                dt = params.stop_time - time;
                next_time = params.stop_time;
            }
            residual = self
                .scheme
                .integrator()
                .step(&self.operator, &mut self.field, time, dt)?;
            time = next_time;
            iter += 1;

            if let Some(history) = history.as_mut() {
                history.record(iter, time, &residual)?;
            }
            if params.print_interval > 0 && iter % params.print_interval == 0 {
                info!(
                    "iter {iter:>7}  t = {time:.6e}  dt = {dt:.3e}  res = [{:.3e}, {:.3e}, {:.3e}, {:.3e}]",
                    residual[RHO], residual[MX], residual[MY], residual[E]
                );
            }
            if params.io_interval > 0 && iter % params.io_interval == 0 {
                self.write_output(iter)?;
            }
            if params.stationary && residual[RHO] < params.abort_residual {
                info!("density residual {:.3e} below {:.3e}", residual[RHO], params.abort_residual);
                break;
            }
        }
        self.write_output(iter)?;

        let errors = self
            .exact
            .map(|exact| error_norms(self.operator.mesh, &self.field.pvar, exact, time));
        if let Some(errors) = errors.as_ref() {
            info!("L1 errors: {:?}", errors.l1);
            info!("L2 errors: {:?}", errors.l2);
            info!("Linf errors: {:?}", errors.linf);
        }
        info!("finished after {iter} iterations at t = {time:.6e}");
        Ok(SolveSummary {
            iterations: iter,
            time,
            residual,
            errors,
        })
    }
    fn write_output(&self, iter: usize) -> SolverResult<()> {
        let Some(target) = self.solver_params.output.as_ref() else {
            return Ok(());
        };
        let mesh = self.operator.mesh;
        let stem = format!("{}_{iter:07}", target.name);
        write_to_csv(&self.field.pvar, mesh, &target.directory.join(format!("{stem}.csv")))?;
        if target.vtu {
            write_average(
                &self.field.pvar,
                mesh,
                self.operator.flow.hcr,
                &target.directory.join(format!("{stem}.vtu")),
            )?;
        }
        Ok(())
    }
}
