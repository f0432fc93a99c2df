use std::{io::Write, process::ExitCode};

use clap::Parser;
use env_logger::{Builder, Target};
use log::{LevelFilter, error, info};

use fv_euler_2d::{
    SolverResult,
    disc::finite_volume::FlowField,
    initialization::{initialize_params_by_file, initialize_problem, initialize_solution, initialize_time_scheme},
    solver::{Solver, SolverParameters},
};

#[derive(Parser)]
#[command(name = "fv-euler-2d")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Finite-volume solver for the 2-D Euler equations", long_about = None)]
struct Cli {
    /// JSON parameter file
    #[arg(default_value = "inputs/solverparam.json")]
    params: String,

    /// Log level (trace, debug, info, warn, error); falls back to RUST_LOG
    #[arg(short, long)]
    log_level: Option<String>,
}

fn init_logging(level: Option<&str>) {
    let log_level = level
        .and_then(|l| l.parse::<LevelFilter>().ok())
        .or_else(|| {
            std::env::var("RUST_LOG")
                .ok()
                .and_then(|v| v.parse::<LevelFilter>().ok())
        })
        .unwrap_or(LevelFilter::Info);

    Builder::new()
        .filter_level(log_level)
        .target(Target::Stdout)
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();
}

fn run(cli: &Cli) -> SolverResult<()> {
    let params = initialize_params_by_file(&cli.params)?;
    rayon::ThreadPoolBuilder::new()
        .num_threads(params.num_threads)
        .build_global()?;
    info!("parameters read from {} ({} threads)", cli.params, rayon::current_num_threads());

    let solver_params = SolverParameters::from_parser(&params)?;
    let problem = initialize_problem(params)?;
    let mut field = FlowField::new(&problem.mesh);
    initialize_solution(&problem, &mut field)?;
    let scheme = initialize_time_scheme(&problem.params, &problem.mesh)?;
    let mut solver = Solver::new(&problem, scheme, field, solver_params);
    solver.solve()?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
