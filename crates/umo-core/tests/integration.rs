#![allow(clippy::float_cmp)]

use umo_core::{
    ErrorKind, Expression, Model, ModelError, Parameters, SharedModel, SolutionStatus, Value,
    ValueType,
};

/// Test: constants keep their kind and value
#[test]
fn test_constants() {
    let model = SharedModel::new();
    let f = model.constant(false).unwrap();
    let t = model.constant(true).unwrap();
    let i = model.constant(2).unwrap();
    let x = model.constant(-3.9).unwrap();

    assert_eq!(f.value().unwrap(), Value::Bool(false));
    assert_eq!(t.value().unwrap(), Value::Bool(true));
    assert_eq!(i.value().unwrap(), Value::Int(2));
    assert_eq!(x.value().unwrap(), Value::Float(-3.9));
    assert_eq!(i.value_type(), ValueType::Int);
    assert_eq!(x.value_type(), ValueType::Float);

    let err = model.constant(f64::NAN).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Domain);
    assert_eq!(model.borrow().num_nodes(), 4);
}

/// Test: decision variables read back what was assigned
#[test]
fn test_decisions() {
    let model = SharedModel::new();
    let b = model.bool_var().unwrap();
    let i = model.int_var(-4, 2).unwrap();
    let x = model.float_var(0.5, 2.0).unwrap();

    for value in [false, true] {
        b.set_value(value).unwrap();
        assert_eq!(b.value().unwrap(), Value::Bool(value));
    }
    for value in [1, -2] {
        i.set_value(value).unwrap();
        assert_eq!(i.value().unwrap(), Value::Int(value));
    }
    for value in [1.0, 1.83] {
        x.set_value(value).unwrap();
        assert_eq!(x.value().unwrap(), Value::Float(value));
    }

    assert_eq!(i.set_value(5).unwrap_err().kind(), ErrorKind::Domain);
    assert_eq!(i.value().unwrap(), Value::Int(-2));
}

/// Test: float arithmetic follows reassignment
#[test]
fn test_float_compute() {
    let model = SharedModel::new();
    let a = model.float_var(0.0, 10.0).unwrap();
    let b = model.float_var(0.0, 10.0).unwrap();
    let sum = a.add(&b).unwrap();
    let diff = a.sub(&b).unwrap();
    let prod = a.mul(&b).unwrap();
    let quot = a.div(&b).unwrap();

    for (x, y) in [(1.0, 2.0), (7.25, 0.5), (3.3, 9.9)] {
        a.set_value(x).unwrap();
        b.set_value(y).unwrap();
        assert_eq!(sum.value().unwrap(), Value::Float(x + y));
        assert_eq!(diff.value().unwrap(), Value::Float(x - y));
        assert_eq!(prod.value().unwrap(), Value::Float(x * y));
        assert_eq!(quot.value().unwrap(), Value::Float(x / y));
    }
}

/// Test: integer division floors and modulo takes the divisor's sign
#[test]
fn test_int_compute() {
    let model = SharedModel::new();
    let a = model.int_var(-20, 20).unwrap();
    let b = model.int_var(-20, 20).unwrap();
    let quotient = a.floor_div(&b).unwrap();
    let remainder = a.rem(&b).unwrap();
    let check = quotient.mul(&b).unwrap().add(&remainder).unwrap();

    for x in [-20, -7, -1, 0, 1, 7, 20] {
        for y in [-20, -3, -1, 1, 3, 20] {
            a.set_value(x).unwrap();
            b.set_value(y).unwrap();
            let q = quotient.value().unwrap().as_int().unwrap();
            let r = remainder.value().unwrap().as_int().unwrap();
            assert_eq!(q, (x as f64 / y as f64).floor() as i64);
            assert!(r == 0 || (r < 0) == (y < 0));
            assert_eq!(check.value().unwrap(), Value::Int(x));
        }
    }

    b.set_value(0).unwrap();
    assert_eq!(quotient.value().unwrap_err().kind(), ErrorKind::Arithmetic);
}

/// Test: comparison truth table over three assignments
#[test]
fn test_comparisons() {
    let model = SharedModel::new();
    let a = model.int_var(0, 10).unwrap();
    let b = model.int_var(0, 10).unwrap();
    let ops = [
        a.eq(&b).unwrap(),
        a.ne(&b).unwrap(),
        a.le(&b).unwrap(),
        a.ge(&b).unwrap(),
        a.lt(&b).unwrap(),
        a.gt(&b).unwrap(),
    ];

    let cases = [
        (5, 5, [true, false, true, true, false, false]),
        (3, 7, [false, true, true, false, true, false]),
        (9, 2, [false, true, false, true, false, true]),
    ];
    for (x, y, expected) in cases {
        a.set_value(x).unwrap();
        b.set_value(y).unwrap();
        let actual: Vec<bool> = ops
            .iter()
            .map(|op| op.value().unwrap().as_bool().unwrap())
            .collect();
        assert_eq!(actual, expected);
    }
}

/// Test: status follows a single bool constraint
#[test]
fn test_status() {
    let model = SharedModel::new();
    let flag = model.bool_var().unwrap();
    model.register_constraint(&flag).unwrap();

    assert_eq!(model.status().unwrap(), SolutionStatus::Invalid);
    flag.set_value(true).unwrap();
    assert_eq!(model.status().unwrap(), SolutionStatus::Valid);

    let count = model.int_var(0, 3).unwrap();
    assert_eq!(
        model.register_constraint(&count).unwrap_err().kind(),
        ErrorKind::Type
    );
}

/// Test: expressions keep the model alive
#[test]
fn test_expression_outlives_model_handle() {
    let x = {
        let model = SharedModel::new();
        let x = model.int_var(0, 9).unwrap();
        x.set_value(4).unwrap();
        x
    };

    let squared = x.square().unwrap();
    assert_eq!(squared.value().unwrap(), Value::Int(16));

    let model = x.model();
    let positive = x.gt(0).unwrap();
    model.register_constraint(&positive).unwrap();
    assert!(model.status().unwrap().is_valid());
    assert!(model.check().is_ok());
    assert_eq!(model.handle_count(), 4);
}

/// Test: identical operator requests return the same node
#[test]
fn test_structural_sharing_through_handles() {
    let model = SharedModel::new();
    let x = model.float_var(-1.0, 1.0).unwrap();
    let y = model.float_var(-1.0, 1.0).unwrap();
    let first: Expression = x.add(&y).unwrap();
    let nodes = model.borrow().num_nodes();

    assert_eq!(x.add(&y).unwrap(), first);
    assert_eq!(model.borrow().num_nodes(), nodes);
    assert_ne!(y.add(&x).unwrap(), first);
}

/// Test: mixing two models is rejected
#[test]
fn test_models_do_not_mix() {
    let left = SharedModel::new();
    let right = SharedModel::new();
    let x = left.bool_var().unwrap();
    let y = right.bool_var().unwrap();

    let err = x.and(&y).unwrap_err();
    assert!(matches!(err, ModelError::ForeignExpression(_)));
    assert_eq!(err.kind(), ErrorKind::Consistency);
}

/// Test: parameter store defaults and overrides
#[test]
fn test_parameters() {
    let model = SharedModel::with_parameters(
        Parameters::new()
            .with_float("gap", 0.01)
            .with_string("solver", "local"),
    )
    .unwrap();

    assert_eq!(model.time_limit(), f64::INFINITY);
    model.set_time_limit(10.0).unwrap();
    assert_eq!(model.get_param("time_limit").unwrap(), 10.0);
    assert_eq!(model.get_param("gap").unwrap(), 0.01);
    assert_eq!(model.get_string_param("solver").unwrap(), "local");
    assert_eq!(model.get_param("unset").unwrap_err().kind(), ErrorKind::Key);
}

/// Test: transcendental functions on floats
#[test]
fn test_transcendental_functions() {
    let model = SharedModel::new();
    let x = model.float_var(-10.0, 10.0).unwrap();
    let exp = x.exp().unwrap();
    let log = exp.log().unwrap();
    let pow = x.pow(2).unwrap();
    x.set_value(1.5).unwrap();

    assert_eq!(exp.value().unwrap(), Value::Float(1.5_f64.exp()));
    assert!((log.value().unwrap().as_f64() - 1.5).abs() < 1e-12);
    assert_eq!(pow.value_type(), ValueType::Float);
    assert_eq!(pow.value().unwrap(), Value::Float(1.5_f64.powf(2.0)));

    let i = model.int_var(0, 3).unwrap();
    assert_eq!(i.sin().unwrap_err().kind(), ErrorKind::Type);
}

/// Test: a plain model can be shared and recovered
#[test]
fn test_shared_model_round_trip() {
    let mut plain = Model::new();
    let x = plain.int_var(0, 5).unwrap();
    plain.assign(x, 3).unwrap();

    let shared = SharedModel::from(plain);
    let handle = shared.expression(x).unwrap();
    assert_eq!(handle.value().unwrap(), Value::Int(3));
    drop(handle);

    let plain = shared.try_into_model().unwrap();
    assert_eq!(plain.read(x).unwrap(), Value::Int(3));
}
