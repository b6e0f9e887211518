use umo_expr::ExprId;

use crate::model::Model;

/// Two integer variables over a symmetric range.
pub(super) fn int_pair(model: &mut Model, bound: i64) -> (ExprId, ExprId) {
    let a = model.int_var(-bound, bound).unwrap();
    let b = model.int_var(-bound, bound).unwrap();
    (a, b)
}

/// Comparisons of `a` against `b` in the order `==, !=, <=, >=, <, >`.
pub(super) fn comparisons(model: &mut Model, a: ExprId, b: ExprId) -> [ExprId; 6] {
    [
        model.eq(a, b).unwrap(),
        model.ne(a, b).unwrap(),
        model.le(a, b).unwrap(),
        model.ge(a, b).unwrap(),
        model.lt(a, b).unwrap(),
        model.gt(a, b).unwrap(),
    ]
}

/// Booleans that `ids` evaluate to under the current assignment.
pub(super) fn truth(model: &Model, ids: &[ExprId]) -> Vec<bool> {
    ids.iter()
        .map(|id| model.evaluate(*id).unwrap().as_bool().unwrap())
        .collect()
}
