use crate::solver::{CType, LinearExpression, MilpAssignment, MilpBackend, MilpError, MilpModel, MilpVar};

const FEASIBILITY_EPSILON: f64 = 1e-9;

/// A reference [`MilpBackend`] which solves binary programs by exhaustive
/// enumeration of all assignments.
///
/// This backend is exact and fully deterministic (among equally good
/// assignments the one that comes first in ascending assignment order wins),
/// but exponential in the number of variables. It is meant for small
/// instances and tests; production deployments should plug a real MIP solver
/// in through the [`MilpBackend`] trait. Models exceeding the variable limit
/// are rejected with [`MilpError::External`].
///
/// # Example
///
/// Basic usage:
/// ```
/// # use ontodiag::solver::{CType, EnumerativeBackend, LinearExpression, MilpBackend, MilpModel};
/// let backend = EnumerativeBackend::new();
/// let mut model = backend.create_model("example");
/// let x = model.binary_variable("x");
/// let y = model.binary_variable("y");
/// model.add_constraint(LinearExpression::sum_of([x, y]), CType::Ge, 1.0);
/// model.minimize(LinearExpression::sum_of([x, y]));
///
/// let assignment = model.solve().unwrap();
/// assert_eq!(assignment.ones().count(), 1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnumerativeBackend {
    variable_limit: usize,
}

impl EnumerativeBackend {
    /// Creates a backend with the default variable limit of 24.
    pub const fn new() -> Self {
        Self { variable_limit: 24 }
    }

    /// Creates a backend accepting models with up to `limit` variables.
    /// Limits above 63 are not supported.
    pub const fn with_variable_limit(limit: usize) -> Self {
        assert!(limit < 64, "The enumerative backend supports at most 63 variables.");
        Self { variable_limit: limit }
    }
}

impl Default for EnumerativeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MilpBackend for EnumerativeBackend {
    type Model = EnumerativeModel;

    fn create_model(&self, name: &str) -> EnumerativeModel {
        EnumerativeModel {
            name: name.to_string(),
            variable_limit: self.variable_limit,
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: None,
        }
    }
}

/// A binary program held in memory by the [`EnumerativeBackend`].
pub struct EnumerativeModel {
    name: String,
    variable_limit: usize,
    variables: Vec<String>,
    constraints: Vec<(LinearExpression, CType, f64)>,
    objective: Option<LinearExpression>,
}

impl MilpModel for EnumerativeModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn binary_variable(&mut self, name: &str) -> MilpVar {
        let handle = self.variables.len();
        self.variables.push(name.to_string());
        handle
    }

    fn add_constraint(&mut self, lhs: LinearExpression, comparator: CType, rhs: f64) {
        self.constraints.push((lhs, comparator, rhs));
    }

    fn minimize(&mut self, objective: LinearExpression) {
        self.objective = Some(objective);
    }

    fn solve(&mut self) -> Result<MilpAssignment, MilpError> {
        let count = self.variables.len();
        if count > self.variable_limit {
            return Err(MilpError::External(format!(
                "the enumerative backend accepts at most {} variables, the model has {count}",
                self.variable_limit
            )));
        }

        let mut best: Option<(f64, u64)> = None;
        for mask in 0..(1_u64 << count) {
            let value_of = |var: MilpVar| (mask >> var) & 1 == 1;
            let feasible = self.constraints.iter().all(|(lhs, comparator, rhs)| {
                let value = lhs.evaluate(value_of);
                match comparator {
                    CType::Ge => value >= rhs - FEASIBILITY_EPSILON,
                    CType::Le => value <= rhs + FEASIBILITY_EPSILON,
                }
            });
            if !feasible {
                continue;
            }
            let objective_value = self.objective.as_ref().map_or(0.0, |objective| objective.evaluate(value_of));
            if best.map_or(true, |(best_value, _)| objective_value < best_value) {
                best = Some((objective_value, mask));
            }
        }

        best.map_or(Err(MilpError::Infeasible), |(_, mask)| {
            Ok((0..count).map(|var| (mask >> var) & 1 == 1).collect())
        })
    }

    fn variable_count(&self) -> usize {
        self.variables.len()
    }

    fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}
