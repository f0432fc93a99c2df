use log::{info, warn};

use crate::{
    disc::{
        boundary::{BoundaryCondition, BoundaryConditions, BoundaryKind, BoundaryType, WallHeat},
        equation_of_state::{FlowParameters, reservoir_state},
        exact_function::{Domain, ExactFunction, ExactFunctionKind, ShockTube},
        finite_volume::{FlowField, store_state},
        gauss_points::GaussPointsTriangle,
        mesh::Mesh2d,
        reconstruction::{LimiterKind, Reconstruction},
        riemann_solver::RiemannSolverKind,
        source::{SourceKind, SourceTerm},
    },
    error::{SolverError, SolverResult},
    io::param_parser::{BoundaryParser, MeshParser, ParamParser},
    temporal_disc::{ImplicitSolver, RungeKutta, TimeScheme},
};

/// Everything a run needs besides the time integrator and the flow field.
pub struct Problem {
    pub params: ParamParser,
    pub flow: FlowParameters,
    pub mesh: Mesh2d,
    pub boundaries: BoundaryConditions,
    pub reconstruction: Reconstruction,
    pub riemann_solver: RiemannSolverKind,
    pub source: Option<SourceTerm>,
    pub exact: Option<ExactFunction>,
}

pub fn initialize_params_by_file(path: &str) -> SolverResult<ParamParser> {
    ParamParser::parse(path)
}

pub fn initialize_mesh(params: &ParamParser) -> SolverResult<Mesh2d> {
    let quadrature = GaussPointsTriangle::new(params.source_points.unwrap_or(3))?;
    let periodic = params.periodic_connections()?;
    let mesh = match &params.mesh {
        MeshParser::Cartesian(cartesian) => cartesian.build(&periodic, &quadrature)?,
        MeshParser::Unstructured(unstructured) => {
            let domains = unstructured
                .domains
                .clone()
                .unwrap_or_else(|| vec![1; unstructured.cells.len()]);
            Mesh2d::new(
                unstructured.nodes(),
                unstructured.cells.clone(),
                domains,
                &unstructured.boundary_edges(),
                &periodic,
                &quadrature,
            )?
        }
    };
    info!(
        "mesh: {} elements, {} faces, {} ghost cells, area {:.6}",
        mesh.elem_num,
        mesh.face_num,
        mesh.ghost_num,
        mesh.total_area()
    );
    Ok(mesh)
}

fn shock_tube(params: &ParamParser) -> Option<ShockTube> {
    params.shock_tube.map(|tube| ShockTube {
        left: [tube.left[0], tube.left[1], 0.0, tube.left[2]],
        right: [tube.right[0], tube.right[1], 0.0, tube.right[2]],
        interface: tube.interface,
    })
}

pub fn initialize_exact_function(
    params: &ParamParser,
    id: usize,
    domain: Domain,
) -> SolverResult<ExactFunction> {
    let kind = ExactFunctionKind::try_from(id)?;
    ExactFunction::new(kind, domain, shock_tube(params), params.flow.hcr)
}

fn initialize_boundary(
    params: &ParamParser,
    bc: &BoundaryParser,
    domain: Domain,
) -> SolverResult<BoundaryCondition> {
    let hcr = params.flow.hcr;
    let reservoir = || -> SolverResult<_> {
        let (rho, mach, alpha, pressure) = bc.reservoir()?;
        Ok(reservoir_state(rho, mach, alpha, pressure, hcr))
    };
    let kind = match BoundaryType::from_code(bc.code)? {
        BoundaryType::SlipWall => BoundaryKind::SlipWall,
        BoundaryType::ViscousWall => {
            let heat = match (bc.adiabatic, bc.wall_temperature, bc.wall_heat_flux) {
                (Some(true), _, _) | (None, None, None) => WallHeat::Adiabatic,
                (_, Some(temperature), _) => WallHeat::Temperature(temperature),
                (_, None, Some(flux)) => WallHeat::HeatFlux(flux),
                (Some(false), None, None) => {
                    return Err(SolverError::invalid_parameter(format!(
                        "non-adiabatic wall {} needs `wall_temperature` or `wall_heat_flux`",
                        bc.code
                    )));
                }
            };
            if heat != WallHeat::Adiabatic {
                warn!("boundary {}: {heat:?} has no effect on inviscid fluxes", bc.code);
            }
            BoundaryKind::ViscousWall(heat)
        }
        BoundaryType::Inflow => BoundaryKind::Inflow(reservoir()?),
        BoundaryType::Outflow => BoundaryKind::Outflow,
        BoundaryType::Characteristic => BoundaryKind::Characteristic(reservoir()?),
        BoundaryType::ExactSolution => {
            let id = bc.exact_function.or(params.exact_function).ok_or_else(|| {
                SolverError::invalid_parameter(format!("boundary {} needs `exact_function`", bc.code))
            })?;
            BoundaryKind::ExactSolution(initialize_exact_function(params, id, domain)?)
        }
        BoundaryType::Periodic => BoundaryKind::Periodic(bc.periodic_connection()?),
        BoundaryType::PressureOutlet => BoundaryKind::PressureOutlet(bc.outlet_pressure()?),
    };
    Ok(BoundaryCondition::new(bc.code, kind))
}

pub fn initialize_boundaries(params: &ParamParser, mesh: &Mesh2d) -> SolverResult<BoundaryConditions> {
    let conditions = params
        .boundaries
        .iter()
        .map(|bc| initialize_boundary(params, bc, mesh.domain))
        .collect::<SolverResult<Vec<_>>>()?;
    for bc in conditions.iter() {
        info!("boundary {}: {}", bc.code, bc.name());
    }
    BoundaryConditions::new(conditions, mesh, params.flow.hcr, params.flow.mu)
}

pub fn initialize_problem(params: ParamParser) -> SolverResult<Problem> {
    let mesh = initialize_mesh(&params)?;
    let boundaries = initialize_boundaries(&params, &mesh)?;
    let disc = &params.discretization;
    let riemann_solver = RiemannSolverKind::try_from(disc.flux_function)?;
    let limiter = LimiterKind::try_from(disc.limiter)?;
    let reconstruction = Reconstruction::new(disc.spatial_order, limiter, disc.venk_k, &mesh)?;
    let source = params
        .source_function
        .map(|id| SourceKind::try_from(id).map(|kind| SourceTerm::new(kind, &params.flow)))
        .transpose()?;
    let exact = params
        .exact_function
        .map(|id| initialize_exact_function(&params, id, mesh.domain))
        .transpose()?;
    info!(
        "flux function: {}, spatial order {}, limiter {:?}",
        riemann_solver.name(),
        reconstruction.order,
        reconstruction.limiter
    );
    Ok(Problem {
        flow: params.flow.clone(),
        params,
        mesh,
        boundaries,
        reconstruction,
        riemann_solver,
        source,
        exact,
    })
}

/// Fills the element states of `field` from the configured initial condition.
pub fn initialize_solution(problem: &Problem, field: &mut FlowField) -> SolverResult<()> {
    let params = &problem.params;
    let hcr = problem.flow.hcr;
    match params.ic_type {
        1 => {
            for (ielem, elem) in problem.mesh.elements.iter().enumerate() {
                let state = params
                    .initial_states
                    .iter()
                    .find(|s| s.domain == elem.domain)
                    .ok_or_else(|| {
                        SolverError::invalid_parameter(format!("no initial state for domain {}", elem.domain))
                    })?;
                let prim = reservoir_state(state.rho, state.mach, state.alpha, state.pressure, hcr);
                store_state(&mut field.pvar, ielem, &prim);
            }
        }
        2 => {
            let exact = problem
                .exact
                .as_ref()
                .ok_or_else(|| SolverError::invalid_parameter("initial condition 2 needs `exact_function`"))?;
            for (ielem, elem) in problem.mesh.elements.iter().enumerate() {
                store_state(&mut field.pvar, ielem, &exact.evaluate(elem.bary, params.time.start_time));
            }
        }
        other => {
            return Err(SolverError::invalid_parameter(format!("unknown initial condition type {other}")));
        }
    }
    field.prim_to_cons(hcr);
    Ok(())
}

pub fn initialize_time_scheme(params: &ParamParser, mesh: &Mesh2d) -> SolverResult<TimeScheme> {
    let scheme = if params.time.implicit {
        TimeScheme::Implicit(Box::new(ImplicitSolver::new(params.newton.clone(), mesh)))
    } else {
        TimeScheme::Explicit(RungeKutta::new(params.time.rk_stages, params.time.time_order, mesh.elem_num)?)
    };
    Ok(scheme)
}
