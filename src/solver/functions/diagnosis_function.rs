use itertools::Itertools;
use std::fmt::{Display, Formatter};

use crate::explanations::{ConflictSet, CreditWeights};
use crate::formulas::{FormulaId, FormulaStore};
use crate::handlers::{ComputationHandler, DiagComputation, DiagEvent};
use crate::solver::{CType, LinearExpression, MilpBackend, MilpError, MilpModel, MilpVar};

/// A diagnosis: a set of formulas whose retraction intersects every conflict
/// set, together with the size of the binary program that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnosis {
    /// The formulas to retract, in ascending identifier order.
    pub formula_ids: Vec<FormulaId>,
    /// Number of decision variables of the solved program.
    pub variable_count: usize,
    /// Number of constraints of the solved program.
    pub constraint_count: usize,
}

impl Diagnosis {
    /// Returns the number of retracted formulas.
    pub fn cardinality(&self) -> usize {
        self.formula_ids.len()
    }

    /// Returns `true` if the diagnosis intersects every given conflict set.
    pub fn covers(&self, conflict_sets: &[ConflictSet]) -> bool {
        conflict_sets.iter().all(|set| self.formula_ids.iter().any(|&id| set.contains(id)))
    }
}

impl Display for Diagnosis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "Diagnosis of cardinality {}: [{}]",
            self.cardinality(),
            self.formula_ids.iter().join(", ")
        ))
    }
}

/// Stores different types of errors that can happen while computing a
/// diagnosis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagnosisError {
    /// The binary program has no feasible assignment. With well-formed input
    /// (no empty conflict set) this cannot happen, but it is surfaced rather
    /// than swallowed.
    Infeasible,
    /// The computation was aborted by its handler; the aborting event is
    /// attached.
    Canceled(DiagEvent),
    /// The solver backend failed or timed out.
    Solver(MilpError),
}

impl Display for DiagnosisError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Infeasible => f.write_str("No diagnosis exists: the covering program is infeasible."),
            Self::Canceled(event) => f.write_fmt(format_args!("The diagnosis was canceled by its handler. {event}")),
            Self::Solver(error) => f.write_fmt(format_args!("The solver backend failed: {error}")),
        }
    }
}

impl std::error::Error for DiagnosisError {}

/// Computes a minimum-cardinality diagnosis: a smallest set of formulas
/// intersecting every conflict set.
///
/// The program has one binary variable per formula of the store, one
/// covering constraint (`sum of members >= 1`) per conflict set, and
/// minimizes the number of selected formulas.
///
/// # Example
///
/// Basic usage:
/// ```
/// # use std::collections::BTreeSet;
/// # use ontodiag::explanations::index_conflict_sets;
/// # use ontodiag::formulas::FormulaStore;
/// # use ontodiag::handlers::NopHandler;
/// # use ontodiag::solver::{minimum_cardinality_diagnosis, EnumerativeBackend};
/// let mut store = FormulaStore::new();
/// for text in ["p", "q", "r"] {
///     store.intern(text);
/// }
/// let raw: Vec<BTreeSet<String>> = vec![
///     ["p", "q"].iter().map(ToString::to_string).collect(),
///     ["p", "r"].iter().map(ToString::to_string).collect(),
/// ];
/// let conflict_sets = index_conflict_sets(&raw, &store).unwrap();
///
/// let diagnosis =
///     minimum_cardinality_diagnosis(&EnumerativeBackend::new(), &store, &conflict_sets, &mut NopHandler).unwrap();
/// assert_eq!(diagnosis.formula_ids, vec![0]);
/// ```
pub fn minimum_cardinality_diagnosis<B: MilpBackend>(
    backend: &B,
    store: &FormulaStore,
    conflict_sets: &[ConflictSet],
    handler: &mut dyn ComputationHandler,
) -> Result<Diagnosis, DiagnosisError> {
    let started = DiagEvent::ComputationStarted(DiagComputation::CardinalityDiagnosis);
    if !handler.should_resume(started.clone()) {
        return Err(DiagnosisError::Canceled(started));
    }

    let mut model = backend.create_model("cardinality-diagnosis");
    let variables = declare_formula_variables(&mut model, store);
    add_covering_constraints(&mut model, &variables, conflict_sets);
    model.minimize(LinearExpression::sum_of(variables.iter().copied()));

    let diagnosis = solve_for_diagnosis(model, &variables, handler)?;
    let _ = handler.should_resume(DiagEvent::ComputationFinished(DiagComputation::CardinalityDiagnosis));
    Ok(diagnosis)
}

/// Computes the credit-weighted refinement of a minimum-cardinality
/// diagnosis.
///
/// The program repeats the covering constraints, bounds the selection size
/// by the cardinality of the given stage-one diagnosis and minimizes the
/// negated sum of credit weights — it maximizes the accumulated credit
/// among all hitting sets of minimum cardinality. Stage one and stage two
/// use separate, freshly built models; the stage-one result enters only
/// through the cardinality bound.
///
/// Credit weights are rounded to two decimal digits when they become
/// objective coefficients (see
/// [`CreditWeights::objective_coefficient`]).
#[allow(clippy::cast_precision_loss)]
pub fn credit_weighted_diagnosis<B: MilpBackend>(
    backend: &B,
    store: &FormulaStore,
    conflict_sets: &[ConflictSet],
    weights: &CreditWeights,
    cardinal: &Diagnosis,
    handler: &mut dyn ComputationHandler,
) -> Result<Diagnosis, DiagnosisError> {
    let started = DiagEvent::ComputationStarted(DiagComputation::WeightedDiagnosis);
    if !handler.should_resume(started.clone()) {
        return Err(DiagnosisError::Canceled(started));
    }

    let mut model = backend.create_model("credit-weighted-diagnosis");
    let variables = declare_formula_variables(&mut model, store);
    add_covering_constraints(&mut model, &variables, conflict_sets);
    model.add_constraint(
        LinearExpression::sum_of(variables.iter().copied()),
        CType::Le,
        cardinal.cardinality() as f64,
    );

    let mut objective = LinearExpression::new();
    for id in store.ids() {
        objective.add_term(-weights.objective_coefficient(id), variables[id]);
    }
    model.minimize(objective);

    let diagnosis = solve_for_diagnosis(model, &variables, handler)?;
    let _ = handler.should_resume(DiagEvent::ComputationFinished(DiagComputation::WeightedDiagnosis));
    Ok(diagnosis)
}

/// Declares one binary variable per formula of the store, named by the
/// formula identifier. The returned vector is indexed by [`FormulaId`].
fn declare_formula_variables<M: MilpModel>(model: &mut M, store: &FormulaStore) -> Vec<MilpVar> {
    store.ids().map(|id| model.binary_variable(&id.to_string())).collect()
}

/// Adds one covering constraint per conflict set: at least one member
/// formula has to be selected for retraction.
fn add_covering_constraints<M: MilpModel>(model: &mut M, variables: &[MilpVar], conflict_sets: &[ConflictSet]) {
    for conflict_set in conflict_sets {
        let lhs = LinearExpression::sum_of(conflict_set.ids().map(|id| variables[id]));
        model.add_constraint(lhs, CType::Ge, 1.0);
    }
}

fn solve_for_diagnosis<M: MilpModel>(
    mut model: M,
    variables: &[MilpVar],
    handler: &mut dyn ComputationHandler,
) -> Result<Diagnosis, DiagnosisError> {
    let variable_count = model.variable_count();
    let constraint_count = model.constraint_count();
    let built = DiagEvent::ModelBuilt { variables: variable_count, constraints: constraint_count };
    if !handler.should_resume(built.clone()) {
        return Err(DiagnosisError::Canceled(built));
    }

    let assignment = match model.solve() {
        Ok(assignment) => assignment,
        Err(MilpError::Infeasible) => return Err(DiagnosisError::Infeasible),
        Err(error) => return Err(DiagnosisError::Solver(error)),
    };

    let formula_ids: Vec<FormulaId> = variables
        .iter()
        .enumerate()
        .filter(|&(_, &variable)| assignment.value_of(variable))
        .map(|(id, _)| id)
        .collect();
    let _ = handler.should_resume(DiagEvent::OptimumFound(formula_ids.len()));
    Ok(Diagnosis { formula_ids, variable_count, constraint_count })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::time::Duration;

    use crate::explanations::{credit_weights, index_conflict_sets};
    use crate::graphs::RelationGraph;
    use crate::handlers::{DiagEvent, NopHandler, TimeoutHandler, Timer};
    use crate::solver::{EnumerativeBackend, MilpBackend, MilpModel};
    use crate::util::test_util::{conflict_set, store_with};

    use super::{credit_weighted_diagnosis, minimum_cardinality_diagnosis, DiagnosisError};

    #[test]
    fn test_shared_formula_is_the_minimum_diagnosis() {
        let store = store_with(3);
        let sets = vec![conflict_set(&[0, 1], &store), conflict_set(&[0, 2], &store)];
        let backend = EnumerativeBackend::new();

        let diagnosis = minimum_cardinality_diagnosis(&backend, &store, &sets, &mut NopHandler).unwrap();
        assert_eq!(diagnosis.formula_ids, vec![0]);
        assert_eq!(diagnosis.cardinality(), 1);
        assert_eq!(diagnosis.variable_count, 3);
        assert_eq!(diagnosis.constraint_count, 2);
        assert!(diagnosis.covers(&sets));
        assert_eq!(diagnosis.to_string(), "Diagnosis of cardinality 1: [0]");
    }

    #[test]
    fn test_disjoint_conflict_sets_need_one_formula_each() {
        let store = store_with(4);
        let sets = vec![conflict_set(&[0, 1], &store), conflict_set(&[2, 3], &store)];
        let backend = EnumerativeBackend::new();

        let diagnosis = minimum_cardinality_diagnosis(&backend, &store, &sets, &mut NopHandler).unwrap();
        assert_eq!(diagnosis.cardinality(), 2);
        assert!(diagnosis.covers(&sets));

        // No smaller hitting set exists: check all singletons.
        for id in 0..4 {
            let covers_both = sets.iter().all(|set| set.contains(id));
            assert!(!covers_both);
        }
    }

    #[test]
    fn test_weighted_diagnosis_prefers_high_credit_formulas() {
        let store = store_with(3);
        let sets = vec![conflict_set(&[0, 1, 2], &store)];
        // Formulas 0 and 1 are strongly connected and share their credit;
        // formula 2 keeps its full component share.
        let mut graph = RelationGraph::with_nodes(3);
        graph.add_edge(0, 1);
        graph.add_edge(1, 0);
        let weights = credit_weights(&graph, &sets, &store);

        let backend = EnumerativeBackend::new();
        let cardinal = minimum_cardinality_diagnosis(&backend, &store, &sets, &mut NopHandler).unwrap();
        assert_eq!(cardinal.formula_ids, vec![0]);

        let weighted =
            credit_weighted_diagnosis(&backend, &store, &sets, &weights, &cardinal, &mut NopHandler).unwrap();
        assert_eq!(weighted.formula_ids, vec![2]);
        assert_eq!(weighted.cardinality(), cardinal.cardinality());
        assert!(weighted.covers(&sets));
        // The weighted program carries the covering constraints plus the
        // cardinality bound.
        assert_eq!(weighted.constraint_count, cardinal.constraint_count + 1);
    }

    #[test]
    fn test_weighted_diagnosis_keeps_minimum_cardinality() {
        let store = store_with(5);
        let sets = vec![
            conflict_set(&[0, 1, 2], &store),
            conflict_set(&[1, 3], &store),
            conflict_set(&[2, 4], &store),
        ];
        let mut graph = RelationGraph::with_nodes(5);
        graph.add_edge(1, 3);
        graph.add_edge(3, 1);
        let weights = credit_weights(&graph, &sets, &store);

        let backend = EnumerativeBackend::new();
        let cardinal = minimum_cardinality_diagnosis(&backend, &store, &sets, &mut NopHandler).unwrap();
        let weighted =
            credit_weighted_diagnosis(&backend, &store, &sets, &weights, &cardinal, &mut NopHandler).unwrap();

        assert_eq!(weighted.cardinality(), cardinal.cardinality());
        assert!(weighted.covers(&sets));
    }

    #[test]
    fn test_empty_conflict_set_makes_the_program_infeasible() {
        let mut store = store_with(1);
        store.intern("unused");
        let raw: Vec<BTreeSet<String>> = vec![BTreeSet::new()];
        let sets = index_conflict_sets(&raw, &store).unwrap();

        let backend = EnumerativeBackend::new();
        let result = minimum_cardinality_diagnosis(&backend, &store, &sets, &mut NopHandler);
        assert_eq!(result.unwrap_err(), DiagnosisError::Infeasible);
    }

    #[test]
    fn test_expired_handler_cancels_before_solving() {
        let store = store_with(2);
        let sets = vec![conflict_set(&[0, 1], &store)];
        let backend = EnumerativeBackend::new();
        let mut handler = TimeoutHandler::new(Timer::SingleTimeout(Duration::ZERO));

        let result = minimum_cardinality_diagnosis(&backend, &store, &sets, &mut handler);
        assert!(matches!(result.unwrap_err(), DiagnosisError::Canceled(DiagEvent::ComputationStarted(_))));
    }

    #[test]
    fn test_solver_failure_is_surfaced() {
        let store = store_with(3);
        let sets = vec![conflict_set(&[0, 1, 2], &store)];
        let backend = EnumerativeBackend::with_variable_limit(2);

        let result = minimum_cardinality_diagnosis(&backend, &store, &sets, &mut NopHandler);
        assert!(matches!(result.unwrap_err(), DiagnosisError::Solver(_)));
    }

    #[test]
    fn test_reported_counts_match_the_model() {
        let store = store_with(4);
        let sets = vec![conflict_set(&[0, 1], &store), conflict_set(&[2, 3], &store)];
        let backend = EnumerativeBackend::new();

        let mut model = backend.create_model("probe");
        assert_eq!(model.variable_count(), 0);
        assert_eq!(model.constraint_count(), 0);
        drop(model);

        let diagnosis = minimum_cardinality_diagnosis(&backend, &store, &sets, &mut NopHandler).unwrap();
        assert_eq!(diagnosis.variable_count, 4);
        assert_eq!(diagnosis.constraint_count, 2);
    }
}
