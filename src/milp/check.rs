//! Feasibility checking of candidate assignments.

use super::backend::{Sense, VarKind};
use super::model::{LinearConstraint, LpModel, ModelError, VarId};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A way in which an assignment fails the model.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// Value outside the variable's bounds.
    Bound { var: VarId, value: f64 },
    /// Non-integral value for an integer variable.
    Integrality { var: VarId, value: f64 },
    /// Constraint not satisfied; `lhs` is the expression value.
    Constraint {
        index: usize,
        name: String,
        lhs: f64,
        sense: Sense,
        rhs: f64,
    },
}

impl LpModel {
    /// Checks `values` (one per variable, indexed by [`VarId::index`])
    /// against bounds, integrality and every constraint.
    ///
    /// Returns all violations found; an empty vector means the assignment
    /// is feasible within `tolerance`. With the `parallel` feature the
    /// constraint rows are evaluated on the rayon pool.
    pub fn check(&self, values: &[f64], tolerance: f64) -> Result<Vec<Violation>, ModelError> {
        self.ensure_assignment(values)?;

        let mut violations: Vec<Violation> = Vec::new();
        for (i, (var, &value)) in self.variables().iter().zip(values).enumerate() {
            let id = VarId::from_index(i);
            if value < var.lower - tolerance || value > var.upper + tolerance || value.is_nan() {
                violations.push(Violation::Bound { var: id, value });
            }
            if var.kind == VarKind::Integer && (value - value.round()).abs() > tolerance {
                violations.push(Violation::Integrality { var: id, value });
            }
        }

        #[cfg(feature = "parallel")]
        let rows: Vec<Violation> = self
            .constraints()
            .par_iter()
            .enumerate()
            .filter_map(|(i, c)| check_row(i, c, values, tolerance))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let rows: Vec<Violation> = self
            .constraints()
            .iter()
            .enumerate()
            .filter_map(|(i, c)| check_row(i, c, values, tolerance))
            .collect();

        violations.extend(rows);
        Ok(violations)
    }

    /// Whether `values` satisfies the model within `tolerance`.
    pub fn is_feasible(&self, values: &[f64], tolerance: f64) -> Result<bool, ModelError> {
        Ok(self.check(values, tolerance)?.is_empty())
    }
}

fn check_row(
    index: usize,
    constraint: &LinearConstraint,
    values: &[f64],
    tolerance: f64,
) -> Option<Violation> {
    let lhs = constraint.expr.evaluate(values);
    let ok = match constraint.sense {
        Sense::Equal => (lhs - constraint.rhs).abs() <= tolerance,
        Sense::LessOrEqual => lhs <= constraint.rhs + tolerance,
        Sense::GreaterOrEqual => lhs >= constraint.rhs - tolerance,
    };
    if ok {
        return None;
    }
    Some(Violation::Constraint {
        index,
        name: constraint.name.clone(),
        lhs,
        sense: constraint.sense,
        rhs: constraint.rhs,
    })
}
