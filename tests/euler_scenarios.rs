use approx::assert_abs_diff_eq;
use fv_euler_2d::{
    SolverError,
    analyze::global_residual,
    disc::{
        equation_of_state::{E, MX, MY, RHO},
        finite_volume::{FlowField, SpatialResidualOperator},
        riemann_solver::exact::RiemannProblem,
    },
    initialization::{Problem, initialize_problem, initialize_solution, initialize_time_scheme},
    io::param_parser::ParamParser,
    solver::{Solver, SolverParameters},
};

const PERIODIC_BOUNDARIES: &str = r#"
    "boundaries": [
        {"code": 701, "connection": [0.0, 1.0]},
        {"code": 702, "connection": [-1.0, 0.0]},
        {"code": 703, "connection": [0.0, -1.0]},
        {"code": 704, "connection": [1.0, 0.0]}
    ]"#;

fn box_mesh(nx: usize, ny: usize, codes: [usize; 4], split: bool) -> String {
    format!(
        r#""mesh": {{"cartesian": {{
            "x_min": [0.0, 0.0], "x_max": [1.0, 1.0], "elem_num": [{nx}, {ny}],
            "split_triangles": {split},
            "bottom": [{{"code": {}, "range": [1, {nx}]}}],
            "right": [{{"code": {}, "range": [1, {ny}]}}],
            "top": [{{"code": {}, "range": [1, {nx}]}}],
            "left": [{{"code": {}, "range": [1, {ny}]}}]
        }}}}"#,
        codes[0], codes[1], codes[2], codes[3]
    )
}

fn problem(json: String) -> Problem {
    initialize_problem(ParamParser::from_json(&json).unwrap()).unwrap()
}

fn initial_field(problem: &Problem) -> FlowField {
    let mut field = FlowField::new(&problem.mesh);
    initialize_solution(problem, &mut field).unwrap();
    field
}

fn operator(problem: &Problem) -> SpatialResidualOperator<'_> {
    SpatialResidualOperator::new(
        &problem.mesh,
        &problem.boundaries,
        &problem.flow,
        &problem.reconstruction,
        problem.source.as_ref(),
        problem.riemann_solver,
    )
}

fn totals(problem: &Problem, field: &FlowField) -> [f64; 4] {
    let mut total = [0.0; 4];
    for (ielem, elem) in problem.mesh.elements.iter().enumerate() {
        for (k, t) in total.iter_mut().enumerate() {
            *t += elem.area * field.cvar[[ielem, k]];
        }
    }
    total
}

fn quiet_parameters(cfl: f64, stop_time: f64) -> SolverParameters {
    SolverParameters {
        cfl,
        start_time: 0.0,
        stop_time,
        max_iter: 10_000,
        stationary: false,
        abort_residual: 0.0,
        print_interval: 0,
        io_interval: 0,
        output: None,
    }
}

#[test]
fn fluid_at_rest_in_a_closed_box_stays_at_rest() {
    for order in [1, 2] {
        for flux in [1, 2, 5, 7, 10] {
            let problem = problem(format!(
                r#"{{ {}, "boundaries": [{{"code": 101}}],
                    "discretization": {{"flux_function": {}, "spatial_order": {order}, "limiter": 2}},
                    "initial_states": [{{"rho": 1.3, "mach": 0.0, "pressure": 2.0}}] }}"#,
                box_mesh(4, 3, [101; 4], true),
                flux
            ));
            let mut field = initial_field(&problem);
            operator(&problem).compute_residual(&mut field, 0.0);
            let residual = global_residual(&problem.mesh, &field.u_t);
            for r in residual {
                assert_abs_diff_eq!(r, 0.0, epsilon = 1e-12);
            }
        }
    }
}

#[test]
fn periodic_advection_conserves_totals() {
    let problem = problem(format!(
        r#"{{ {}, {PERIODIC_BOUNDARIES},
            "discretization": {{"flux_function": 5, "spatial_order": 2, "limiter": 2}},
            "time": {{"rk_stages": 3, "time_order": 3}},
            "ic_type": 2, "exact_function": 2 }}"#,
        box_mesh(6, 6, [701, 702, 703, 704], true)
    ));
    let field = initial_field(&problem);
    let before = totals(&problem, &field);
    let scheme = initialize_time_scheme(&problem.params, &problem.mesh).unwrap();
    let mut solver = Solver::new(&problem, scheme, field, quiet_parameters(0.5, 0.05));
    let summary = solver.solve().unwrap();
    assert!(summary.iterations > 1);
    assert_abs_diff_eq!(summary.time, 0.05, epsilon = 1e-14);
    let after = totals(&problem, &solver.field);
    for k in [RHO, MX, MY, E] {
        assert_abs_diff_eq!(after[k], before[k], epsilon = 1e-11);
    }
}

#[test]
fn two_triangles_periodic_in_both_directions() {
    let problem = problem(format!(
        r#"{{ {}, {PERIODIC_BOUNDARIES},
            "time": {{"stop_time": 0.2}},
            "initial_states": [{{"rho": 0.8, "mach": 0.6, "alpha": 30.0, "pressure": 1.1}}] }}"#,
        box_mesh(1, 1, [701, 702, 703, 704], true)
    ));
    assert_eq!(problem.mesh.elem_num, 2);
    let field = initial_field(&problem);
    let initial = field.cvar.clone();
    let scheme = initialize_time_scheme(&problem.params, &problem.mesh).unwrap();
    let mut solver = Solver::new(&problem, scheme, field, quiet_parameters(0.9, 0.2));
    let summary = solver.solve().unwrap();
    for r in summary.residual {
        assert_abs_diff_eq!(r, 0.0, epsilon = 1e-12);
    }
    for (a, b) in solver.field.cvar.iter().zip(initial.iter()) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-12);
    }
}

#[test]
fn implicit_manufactured_solution_tracks_exact_solution() {
    let params = ParamParser::from_json(&format!(
        r#"{{
            "mesh": {{"cartesian": {{
                "x_min": [0.0, 0.0], "x_max": [2.0, 2.0], "elem_num": [16, 16],
                "bottom": [{{"code": 701, "range": [1, 16]}}],
                "right": [{{"code": 702, "range": [1, 16]}}],
                "top": [{{"code": 703, "range": [1, 16]}}],
                "left": [{{"code": 704, "range": [1, 16]}}]
            }}}},
            "boundaries": [
                {{"code": 701, "connection": [0.0, 2.0]}},
                {{"code": 702, "connection": [-2.0, 0.0]}},
                {{"code": 703, "connection": [0.0, -2.0]}},
                {{"code": 704, "connection": [2.0, 0.0]}}
            ],
            "discretization": {{"flux_function": 5}},
            "time": {{"implicit": true, "cfl": 1.0, "stop_time": 0.1}},
            "newton": {{"precond": true, "n_kdim": 30, "n_gmres_restarts": 2, "eps_newton": 1e-4}},
            "ic_type": 2, "exact_function": 3, "source_function": 1
        }}"#
    ))
    .unwrap();
    let problem = initialize_problem(params).unwrap();
    let field = initial_field(&problem);
    let scheme = initialize_time_scheme(&problem.params, &problem.mesh).unwrap();
    assert!(scheme.is_implicit());
    let mut solver = Solver::new(&problem, scheme, field, quiet_parameters(1.0, 0.1));
    let summary = solver.solve().unwrap();
    assert_abs_diff_eq!(summary.time, 0.1, epsilon = 1e-14);
    let errors = summary.errors.unwrap();
    assert!(errors.linf[RHO] < 0.05, "density error {:?}", errors.linf);
    assert!(errors.l1[RHO] <= errors.linf[RHO]);
}

#[test]
fn sod_star_state() {
    let sampled = RiemannProblem::new(&[1.0, 0.0, 0.0, 1.0], &[0.125, 0.0, 0.0, 0.1], 1.4).sample(0.5);
    assert_abs_diff_eq!(sampled.p, 0.30313, epsilon = 1e-4);
    assert_abs_diff_eq!(sampled.u, 0.92745, epsilon = 1e-4);
    assert_abs_diff_eq!(sampled.rho, 0.42632, epsilon = 1e-4);
}

#[test]
fn unknown_identifiers_are_rejected() {
    let json = |extra: &str| {
        format!(
            r#"{{ {}, "boundaries": [{{"code": 101}}],
                "initial_states": [{{"rho": 1.0, "mach": 0.0, "pressure": 1.0}}] {extra} }}"#,
            box_mesh(2, 2, [101; 4], false)
        )
    };
    let attempt = |extra: &str| initialize_problem(ParamParser::from_json(&json(extra)).unwrap());
    assert!(matches!(
        attempt(r#", "exact_function": 9"#),
        Err(SolverError::UnknownExactFunction(9))
    ));
    assert!(matches!(
        attempt(r#", "discretization": {"flux_function": 0}"#),
        Err(SolverError::UnknownFluxFunction(0))
    ));
    assert!(matches!(
        attempt(r#", "source_function": 2"#),
        Err(SolverError::UnknownSourceFunction(2))
    ));
    let unmapped = ParamParser::from_json(&format!(
        r#"{{ {}, "boundaries": [{{"code": 101}}] }}"#,
        box_mesh(2, 2, [101, 101, 101, 901], false)
    ))
    .unwrap();
    assert!(matches!(
        initialize_problem(unmapped),
        Err(SolverError::UnknownBoundaryType(901))
    ));
}
