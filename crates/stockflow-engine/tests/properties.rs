//! Integration tests for the Euler engine's observable behavior.
//!
//! Each test builds a small graph through the public API and checks a
//! property of the resulting table: row count and spacing, floors, zero
//! flows, determinism, and definition-time error reporting.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use std::sync::Arc;

use stockflow_engine::{
    GraphBuilder, MAX_ROWS, ModelError, ParameterSet, RunSpec, TIME_COLUMN, VariableGraph,
    guard_denominator, run,
};

const TOLERANCE: f64 = 1e-9;

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "length mismatch: {actual:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < TOLERANCE, "{actual:?} != {expected:?}");
    }
}

/// Pipeline feeding a capacity stock, with an auxiliary ratio.
fn pipeline_graph() -> VariableGraph {
    let mut builder = GraphBuilder::new();
    builder
        .declare_parameters(&["capex", "lag", "life"])
        .unwrap()
        .add_stock("pipeline", 400.0)
        .unwrap()
        .add_stock("capacity", 500.0)
        .unwrap()
        .register_computed("new_capex", &["capex"], |i| i.get("capex"))
        .unwrap()
        .register_computed("deployed", &["pipeline", "lag"], |i| {
            i.get("pipeline") / i.get("lag")
        })
        .unwrap()
        .register_computed("retired", &["capacity", "life"], |i| {
            i.get("capacity") / i.get("life")
        })
        .unwrap()
        .register_computed("utilization", &["deployed", "capacity"], |i| {
            i.get("deployed") / guard_denominator(i.get("capacity"))
        })
        .unwrap()
        .connect("pipeline", &["new_capex"], &["deployed"])
        .unwrap()
        .connect("capacity", &["deployed"], &["retired"])
        .unwrap();
    builder.build().unwrap()
}

fn pipeline_params() -> ParameterSet {
    ParameterSet::new()
        .with("capex", 200.0)
        .with("lag", 4.0)
        .with("life", 8.0)
}

#[test]
fn half_step_over_twenty_years_yields_41_rows() {
    let table = run(&pipeline_graph(), &pipeline_params(), &RunSpec::new(0.5, 20.0)).unwrap();
    assert_eq!(table.len(), 41);
    assert_eq!(table.rows().first().unwrap().time, 0.0);
    assert!((table.last().unwrap().time - 20.0).abs() < TOLERANCE);
}

#[test]
fn consecutive_times_differ_by_step() {
    for dt in [0.1, 0.25, 0.5, 1.0] {
        let table = run(&pipeline_graph(), &pipeline_params(), &RunSpec::new(dt, 10.0)).unwrap();
        let times = table.column(TIME_COLUMN).unwrap();
        for pair in times.windows(2) {
            if let [a, b] = pair {
                assert!(b > a, "times must ascend");
                assert!((b - a - dt).abs() < 1e-6, "step {dt}: {a} -> {b}");
            }
        }
    }
}

#[test]
fn zero_final_time_yields_single_initial_row() {
    let table = run(&pipeline_graph(), &pipeline_params(), &RunSpec::new(1.0, 0.0)).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.value(0, "pipeline").unwrap(), Some(400.0));
    // Computed variables are evaluated for the single row too.
    assert_eq!(table.value(0, "deployed").unwrap(), Some(100.0));
}

#[test]
fn linear_growth() {
    let mut builder = GraphBuilder::new();
    builder.add_stock("x", 10.0).unwrap();
    builder.register_computed("inflow", &[], |_| 2.0).unwrap();
    builder.connect("x", &["inflow"], &[]).unwrap();
    let graph = builder.build().unwrap();

    let table = run(&graph, &ParameterSet::new(), &RunSpec::new(1.0, 5.0)).unwrap();
    assert_close(
        &table.column("x").unwrap(),
        &[10.0, 12.0, 14.0, 16.0, 18.0, 20.0],
    );
}

#[test]
fn floor_clamping() {
    let mut builder = GraphBuilder::new();
    builder.register_stock("y", 5.0, 0.0).unwrap();
    builder.register_computed("drain", &[], |_| 10.0).unwrap();
    builder.connect("y", &[], &["drain"]).unwrap();
    let graph = builder.build().unwrap();

    let table = run(&graph, &ParameterSet::new(), &RunSpec::new(1.0, 3.0)).unwrap();
    assert_close(&table.column("y").unwrap(), &[5.0, 0.0, 0.0, 0.0]);
}

#[test]
fn non_zero_floor_holds_in_every_row() {
    let mut builder = GraphBuilder::new();
    builder.register_stock("price", 30.0, 5.0).unwrap();
    builder
        .register_computed("crash", &["price"], |i| i.get("price") * 2.0)
        .unwrap();
    builder.connect("price", &[], &["crash"]).unwrap();
    let graph = builder.build().unwrap();

    let table = run(&graph, &ParameterSet::new(), &RunSpec::new(0.5, 10.0)).unwrap();
    for value in table.column("price").unwrap() {
        assert!(value >= 5.0, "price {value} fell below floor");
    }
    assert_eq!(table.last().unwrap().get(0), Some(5.0));
}

#[test]
fn stocks_never_drop_below_floor_in_pipeline() {
    let params = pipeline_params().with("capex", 0.0).with("life", 0.2);
    let table = run(&pipeline_graph(), &params, &RunSpec::new(0.5, 20.0)).unwrap();
    for stock in ["pipeline", "capacity"] {
        assert!(table.column(stock).unwrap().iter().all(|v| *v >= 0.0));
    }
}

#[test]
fn stock_with_zero_flows_keeps_initial_value() {
    let mut builder = GraphBuilder::new();
    builder.add_stock("idle", 42.0).unwrap();
    builder.add_stock("unconnected", 7.0).unwrap();
    builder.register_computed("zero_in", &[], |_| 0.0).unwrap();
    builder.register_computed("zero_out", &[], |_| 0.0).unwrap();
    builder.connect("idle", &["zero_in"], &["zero_out"]).unwrap();
    let graph = builder.build().unwrap();

    let table = run(&graph, &ParameterSet::new(), &RunSpec::new(0.25, 5.0)).unwrap();
    assert!(table.column("idle").unwrap().iter().all(|v| *v == 42.0));
    assert!(table.column("unconnected").unwrap().iter().all(|v| *v == 7.0));
}

#[test]
fn identical_inputs_produce_identical_tables() {
    let graph = pipeline_graph();
    let spec = RunSpec::new(0.5, 20.0).with_initial("pipeline", 250.0);
    let first = run(&graph, &pipeline_params(), &spec).unwrap();
    let second = run(&graph, &pipeline_params(), &spec).unwrap();

    assert_eq!(first, second);
    let first_bits: Vec<u64> = first
        .rows()
        .iter()
        .flat_map(|row| row.values.iter().map(|v| v.to_bits()))
        .collect();
    let second_bits: Vec<u64> = second
        .rows()
        .iter()
        .flat_map(|row| row.values.iter().map(|v| v.to_bits()))
        .collect();
    assert_eq!(first_bits, second_bits);
}

#[test]
fn evaluation_is_independent_of_registration_order() {
    let spec = RunSpec::new(1.0, 2.0);
    let params = ParameterSet::new().with("param", 3.0);

    let mut forward = GraphBuilder::new();
    forward.declare_parameter("param").unwrap();
    forward
        .register_computed("a", &["param"], |i| i.get("param") * 2.0)
        .unwrap();
    forward
        .register_computed("b", &["a"], |i| i.get("a") + 1.0)
        .unwrap();
    let forward = run(&forward.build().unwrap(), &params, &spec).unwrap();

    let mut reversed = GraphBuilder::new();
    reversed.declare_parameter("param").unwrap();
    reversed.declare_computed("a").unwrap();
    reversed
        .register_computed("b", &["a"], |i| i.get("a") + 1.0)
        .unwrap();
    reversed
        .register_computed("a", &["param"], |i| i.get("param") * 2.0)
        .unwrap();
    let reversed = run(&reversed.build().unwrap(), &params, &spec).unwrap();

    for table in [&forward, &reversed] {
        assert_close(&table.column("a").unwrap(), &[6.0, 6.0, 6.0]);
        assert_close(&table.column("b").unwrap(), &[7.0, 7.0, 7.0]);
    }
}

#[test]
fn mutual_dependency_fails_at_registration() {
    let mut builder = GraphBuilder::new();
    builder.declare_computed("a").unwrap();
    builder
        .register_computed("b", &["a"], |i| i.get("a"))
        .unwrap();
    let err = builder
        .register_computed("a", &["b"], |i| i.get("b"))
        .unwrap_err();
    assert!(matches!(err, ModelError::CyclicDependency { .. }));
}

#[test]
fn missing_parameter_fails_before_first_step() {
    let params = ParameterSet::new().with("capex", 200.0);
    let err = run(&pipeline_graph(), &params, &RunSpec::new(0.5, 20.0)).unwrap_err();
    assert_eq!(
        err,
        ModelError::MissingParameter {
            name: "lag".to_owned()
        }
    );
}

#[test]
fn non_finite_parameter_fails_before_first_step() {
    let mut builder = GraphBuilder::new();
    builder.declare_parameter("r").unwrap();
    builder.register_stock("x", 1.0, 0.0).unwrap();
    builder.register_computed("rate", &["r"], |i| i.get("r")).unwrap();
    builder.set_net_rate("x", "rate").unwrap();
    let graph = builder.build().unwrap();

    for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let params = ParameterSet::new().with("r", value);
        let err = run(&graph, &params, &RunSpec::new(1.0, 2.0)).unwrap_err();
        assert!(
            matches!(err, ModelError::NonFinite { ref name, .. } if name == "r"),
            "{err:?}"
        );
    }

    let table = run(&graph, &ParameterSet::new().with("r", -5.0), &RunSpec::new(1.0, 2.0)).unwrap();
    assert_close(&table.column("x").unwrap(), &[1.0, 0.0, 0.0]);
}

#[test]
fn unreferenced_and_unknown_parameters_are_tolerated() {
    let mut builder = GraphBuilder::new();
    builder.declare_parameter("display_only").unwrap();
    builder.add_stock("x", 1.0).unwrap();
    let graph = builder.build().unwrap();

    let params = ParameterSet::new().with("not_in_model", 9.0);
    let table = run(&graph, &params, &RunSpec::new(1.0, 1.0)).unwrap();
    assert_eq!(table.len(), 2);
}

#[test]
fn invalid_time_controls_are_rejected() {
    let graph = pipeline_graph();
    let params = pipeline_params();
    for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            run(&graph, &params, &RunSpec::new(dt, 10.0)),
            Err(ModelError::InvalidTimeStep { .. })
        ));
    }
    for t_end in [-0.5, f64::NAN] {
        assert!(matches!(
            run(&graph, &params, &RunSpec::new(1.0, t_end)),
            Err(ModelError::InvalidFinalTime { .. })
        ));
    }
}

#[test]
fn oversized_runs_are_rejected_up_front() {
    let err = run(&pipeline_graph(), &pipeline_params(), &RunSpec::new(1e-9, 100.0)).unwrap_err();
    assert!(matches!(
        err,
        ModelError::TooManySteps {
            limit: MAX_ROWS,
            ..
        }
    ));
    assert!(RunSpec::new(0.001, 1000.0).validate().is_ok());
}

#[test]
fn initial_overrides_are_validated_and_applied() {
    let graph = pipeline_graph();
    let params = pipeline_params();

    let table = run(
        &graph,
        &params,
        &RunSpec::new(1.0, 1.0).with_initial("capacity", 10.0),
    )
    .unwrap();
    assert_eq!(table.value(0, "capacity").unwrap(), Some(10.0));

    assert!(matches!(
        run(&graph, &params, &RunSpec::new(1.0, 1.0).with_initial("deployed", 1.0)),
        Err(ModelError::UnknownStock { .. })
    ));
    assert!(matches!(
        run(&graph, &params, &RunSpec::new(1.0, 1.0).with_initial("capacity", -1.0)),
        Err(ModelError::InitialBelowFloor { .. })
    ));
}

#[test]
fn unknown_column_is_an_error() {
    let table = run(&pipeline_graph(), &pipeline_params(), &RunSpec::new(1.0, 2.0)).unwrap();
    assert!(matches!(
        table.column("capex"),
        Err(ModelError::UnknownColumn { .. })
    ));
}

#[test]
fn rows_hold_pre_update_values() {
    let table = run(&pipeline_graph(), &pipeline_params(), &RunSpec::new(1.0, 1.0)).unwrap();
    // Row 0: pipeline 400, deployed 400/4 = 100, new_capex 200.
    assert_eq!(table.value(0, "deployed").unwrap(), Some(100.0));
    // Row 1: pipeline 400 + 1 * (200 - 100) = 500.
    assert_eq!(table.value(1, "pipeline").unwrap(), Some(500.0));
    // Capacity: 500 + (100 - 62.5) = 537.5.
    assert_eq!(table.value(1, "capacity").unwrap(), Some(537.5));
}

#[test]
fn graph_is_shared_across_threads() {
    let graph = Arc::new(pipeline_graph());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let graph = Arc::clone(&graph);
            std::thread::spawn(move || {
                let params = pipeline_params().with("capex", f64::from(i) * 50.0);
                run(&graph, &params, &RunSpec::new(0.5, 20.0)).unwrap()
            })
        })
        .collect();

    for handle in handles {
        let table = handle.join().unwrap();
        assert_eq!(table.len(), 41);
    }
}
