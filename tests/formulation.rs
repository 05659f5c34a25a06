//! End-to-end model construction scenarios.

use u_aircraft_routing::data::{Matrix, ProblemData, ProblemSize};
use u_aircraft_routing::formulation::{FormulationConfig, RoutingFormulation};
use u_aircraft_routing::milp::{Direction, LpModel, Sense, VarKind, Violation};
use u_aircraft_routing::RoutingError;

fn rows(values: Vec<Vec<f64>>) -> Matrix {
    Matrix::from_rows(values).unwrap()
}

/// S=3, G=1, F=2, M=1, 2 aircraft.
fn small_instance() -> ProblemData {
    let size = ProblemSize {
        strings: 3,
        ground_arcs: 1,
        flight_legs: 2,
        maint_locations: 1,
        available_aircraft: 2,
    };
    ProblemData::new(size)
        .with_cover(rows(vec![vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 1.0]]))
        .with_count(
            Matrix::row_vector(vec![1.0, 1.0, 1.0]),
            Matrix::row_vector(vec![1.0]),
        )
        .with_prop_delay(Matrix::row_vector(vec![5.0, 3.0, 4.0]))
        .with_robust_cover(rows(vec![vec![-1.0, 0.0, 0.0], vec![0.0, 0.0, 0.0]]))
}

fn build(data: &ProblemData, config: FormulationConfig) -> (LpModel, RoutingFormulation<LpModel>) {
    let mut model = LpModel::new("routing");
    let mut formulation = RoutingFormulation::new(config).unwrap();
    formulation.build(&mut model, data).unwrap();
    (model, formulation)
}

#[test]
fn test_round_trip_counts() {
    let data = small_instance();
    let (model, formulation) = build(&data, FormulationConfig::nominal());

    assert_eq!(model.constraints_named("cover_").count(), 2);
    assert_eq!(model.constraints_named("maint_in_").count(), 1);
    assert_eq!(model.constraints_named("maint_out_").count(), 1);
    assert_eq!(model.constraints_named("fleet_count").count(), 1);
    assert_eq!(model.constraint_count(), 5);

    assert_eq!(model.variable_count(), 4);
    assert_eq!(formulation.string_variables().len(), 3);
    let obj = model.objective().unwrap();
    assert_eq!(obj.direction, Direction::Minimize);
}

#[test]
fn test_nominal_solution_feasibility() {
    let data = small_instance();
    let (model, formulation) = build(&data, FormulationConfig::nominal());

    // x = [0, 0, 1], y = 0: string 2 covers both legs.
    let values = [0.0, 0.0, 1.0, 0.0];
    assert!(model.is_feasible(&values, 1e-9).unwrap());
    assert_eq!(model.objective_value(&values).unwrap(), Some(4.0));
    assert_eq!(formulation.selected_strings(|x| values[x.index()]), vec![2]);

    // Covering leg 0 twice breaks the exact cover.
    let values = [1.0, 0.0, 1.0, 0.0];
    let violations = model.check(&values, 1e-9).unwrap();
    assert!(violations.iter().any(|v| matches!(
        v,
        Violation::Constraint { name, .. } if name == "cover_0"
    )));
}

#[test]
fn test_zero_ground_arcs_flow_rows_use_strings_only() {
    let size = ProblemSize {
        strings: 2,
        ground_arcs: 0,
        flight_legs: 1,
        maint_locations: 2,
        available_aircraft: 1,
    };
    let data = ProblemData::new(size)
        .with_cover(rows(vec![vec![1.0, 1.0]]))
        .with_maint_in(rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]), rows(vec![]))
        .with_maint_out(rows(vec![vec![0.0, -1.0], vec![-1.0, 0.0]]), rows(vec![vec![], vec![]]))
        .with_count(Matrix::row_vector(vec![1.0, 1.0]), rows(vec![]))
        .with_prop_delay(Matrix::row_vector(vec![0.0, 0.0]));

    let (model, formulation) = build(&data, FormulationConfig::nominal());
    let strings = formulation.string_variables();

    let flow: Vec<_> = model
        .constraints()
        .iter()
        .filter(|c| c.name.starts_with("maint_"))
        .collect();
    assert_eq!(flow.len(), 4);
    for row in flow {
        assert_eq!(row.rhs, 0.0);
        assert!(row
            .expr
            .terms()
            .iter()
            .all(|(v, _)| strings.contains(v)));
    }
    assert_eq!(model.variable_count(), 2);
}

#[test]
fn test_swapping_in_and_out_swaps_families() {
    let size = ProblemSize {
        strings: 2,
        ground_arcs: 1,
        flight_legs: 1,
        maint_locations: 1,
        available_aircraft: 2,
    };
    let inbound = (rows(vec![vec![1.0, 0.0]]), rows(vec![vec![-1.0]]));
    let outbound = (rows(vec![vec![0.0, 2.0]]), rows(vec![vec![3.0]]));
    let base = ProblemData::new(size)
        .with_cover(rows(vec![vec![1.0, 1.0]]))
        .with_prop_delay(Matrix::row_vector(vec![1.0, 1.0]));

    let data = base
        .clone()
        .with_maint_in(inbound.0.clone(), inbound.1.clone())
        .with_maint_out(outbound.0.clone(), outbound.1.clone());
    let swapped = base
        .with_maint_in(outbound.0, outbound.1)
        .with_maint_out(inbound.0, inbound.1);

    let (model, f) = build(&data, FormulationConfig::nominal());
    let (swapped_model, g) = build(&swapped, FormulationConfig::nominal());

    let x1 = f.string_variables()[1];
    assert_eq!(model.constraint("maint_in_0").unwrap().expr.coefficient(x1), 0.0);
    assert_eq!(model.constraint("maint_out_0").unwrap().expr.coefficient(x1), 2.0);

    let x1 = g.string_variables()[1];
    assert_eq!(swapped_model.constraint("maint_in_0").unwrap().expr.coefficient(x1), 2.0);
    assert_eq!(swapped_model.constraint("maint_out_0").unwrap().expr.coefficient(x1), 0.0);
}

#[test]
fn test_fleet_count_once_regardless_of_locations() {
    for maint_locations in [0i64, 1, 5] {
        let size = ProblemSize {
            strings: 2,
            ground_arcs: 1,
            flight_legs: 1,
            maint_locations,
            available_aircraft: 7,
        };
        let data = ProblemData::new(size)
            .with_cover(rows(vec![vec![1.0, 1.0]]))
            .with_prop_delay(Matrix::row_vector(vec![1.0, 1.0]));
        let (model, _) = build(&data, FormulationConfig::nominal());

        let count: Vec<_> = model.constraints_named("fleet_count").collect();
        assert_eq!(count.len(), 1);
        assert_eq!(count[0].sense, Sense::LessOrEqual);
        assert_eq!(count[0].rhs, 7.0);
    }
}

#[test]
fn test_robust_model_shape() {
    let data = small_instance();
    let (model, formulation) = build(&data, FormulationConfig::robust());

    assert_eq!(model.variable_count(), 3 + 1 + 2);
    assert_eq!(model.constraints_named("robust_shortfall_").count(), 2);
    assert_eq!(model.constraints_named("robust_budget_").count(), 2);
    assert_eq!(model.constraint_count(), 2 + 2 + 1 + 4);

    let z = formulation.variables().unwrap().violations.clone().unwrap();
    for &zi in &z {
        let v = model.variable(zi).unwrap();
        assert_eq!(v.kind, VarKind::Integer);
        assert_eq!((v.lower, v.upper), (-1.0, 0.0));
    }
    let obj = model.objective().unwrap();
    assert_eq!(obj.direction, Direction::Maximize);
    assert!(obj.expr.terms().iter().all(|&(_, c)| c == 0.0));
}

#[test]
fn test_gamma_controls_tolerated_violation() {
    let data = small_instance();
    // x = [1, 0, 1], y = 0, z = [-1, 0]: leg 0 covered twice, absorbed by z_0.
    let values = [1.0, 0.0, 1.0, 0.0, -1.0, 0.0];

    let (model, _) = build(&data, FormulationConfig::robust());
    assert!(model.is_feasible(&values, 1e-9).unwrap());

    let (strict, _) = build(&data, FormulationConfig::robust().with_gamma(0.0));
    let violations = strict.check(&values, 1e-9).unwrap();
    assert_eq!(violations.len(), 1);
    assert!(matches!(
        &violations[0],
        Violation::Constraint { name, .. } if name == "robust_budget_0"
    ));
}

/// Every integer assignment the checker accepts satisfies `z_i >= -gamma`
/// and the shortfall inequality.
#[test]
fn test_feasible_assignments_respect_budget() {
    let data = small_instance();
    for gamma in [0.0, 0.5, 3.0] {
        let (model, formulation) = build(&data, FormulationConfig::robust().with_gamma(gamma));
        let z = formulation.variables().unwrap().violations.clone().unwrap();
        let strings = formulation.string_variables().to_vec();
        let robust = data.robust_cover.as_ref().unwrap();

        let mut feasible = 0;
        for mask in 0..(1u32 << 3) {
            for y in [0.0, 1.0] {
                for z0 in [-1.0, 0.0] {
                    for z1 in [-1.0, 0.0] {
                        let x: Vec<f64> = (0..3).map(|j| f64::from((mask >> j) & 1)).collect();
                        let values = [x[0], x[1], x[2], y, z0, z1];
                        if !model.is_feasible(&values, 1e-9).unwrap() {
                            continue;
                        }
                        feasible += 1;
                        for (i, &zi) in z.iter().enumerate() {
                            let zv = values[zi.index()];
                            assert!(zv >= -gamma - 1e-9);
                            let worst: f64 = strings
                                .iter()
                                .enumerate()
                                .map(|(j, xj)| robust.get(i, j) * values[xj.index()])
                                .sum();
                            assert!(zv - worst >= -1e-9);
                        }
                    }
                }
            }
        }
        assert!(feasible > 0, "gamma {gamma}: no feasible assignment");
    }
}

#[test]
fn test_second_build_constraints_fails_without_duplicates() {
    let data = small_instance();
    let (mut model, mut formulation) = build(&data, FormulationConfig::nominal());
    let before = model.constraint_count();

    let err = formulation.build_constraints(&mut model, &data).unwrap_err();
    assert!(matches!(err, RoutingError::BuildOrder { .. }));
    assert_eq!(model.constraint_count(), before);
}

#[test]
fn test_fixed_strings_extension() {
    let data = small_instance();
    let mut model = LpModel::new("routing");
    let mut formulation = RoutingFormulation::new(FormulationConfig::nominal())
        .unwrap()
        .with_fixed_strings(|j| j == 2);
    let summary = formulation.build(&mut model, &data).unwrap();

    assert_eq!(summary.fixed_strings, 1);
    assert_eq!(summary.total(), model.constraint_count());
    // The only single-string cover is now pinned off.
    assert!(!model.is_feasible(&[0.0, 0.0, 1.0, 0.0], 1e-9).unwrap());
    assert!(model.is_feasible(&[1.0, 1.0, 0.0, 0.0], 1e-9).unwrap());
}

#[test]
fn test_lp_export_of_built_model() {
    let data = small_instance();
    let (model, _) = build(&data, FormulationConfig::robust());
    let lp = model.to_lp_string();

    assert!(lp.contains("Maximize\n"));
    assert!(lp.contains(" cover_0: + x_0 + x_2 + z_0 = 1\n"));
    assert!(lp.contains(" robust_shortfall_0: + z_0 + x_0 >= 0\n"));
    assert!(lp.contains(" robust_budget_1: + z_1 >= -3\n"));
    assert!(lp.contains(" fleet_count: + x_0 + x_1 + x_2 + y_0 <= 2\n"));
    assert!(lp.contains("Binaries\n x_0\n x_1\n x_2\n"));
}
