use std::fmt::Display;

/// Events emitted during a diagnosis computation.
///
/// Events are passed to the [`ComputationHandler`](super::ComputationHandler)
/// registered for the computation. A handler can use them for progress
/// reporting or to abort the computation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagEvent {
    /// No event happened. Used when a computation is aborted without a
    /// specific cause.
    NoEvent,
    /// A computation was started.
    ComputationStarted(DiagComputation),
    /// A computation finished regularly.
    ComputationFinished(DiagComputation),
    /// A binary program was built and is about to be submitted to the
    /// solver backend.
    ModelBuilt {
        /// Number of decision variables of the program.
        variables: usize,
        /// Number of constraints of the program.
        constraints: usize,
    },
    /// The solver returned an optimal diagnosis of the given cardinality.
    OptimumFound(usize),
}

impl Display for DiagEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Event: ")?;
        match self {
            Self::NoEvent => f.write_str("No event"),
            Self::ComputationStarted(computation) => {
                f.write_fmt(format_args!("Started computation: {computation}"))
            }
            Self::ComputationFinished(computation) => {
                f.write_fmt(format_args!("Finished computation: {computation}"))
            }
            Self::ModelBuilt { variables, constraints } => {
                f.write_fmt(format_args!("Built binary program with {variables} variables and {constraints} constraints"))
            }
            Self::OptimumFound(cardinality) => {
                f.write_fmt(format_args!("Found optimal diagnosis of cardinality {cardinality}"))
            }
        }
    }
}

/// The kinds of computations which report events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagComputation {
    /// The minimum-cardinality hitting-set diagnosis.
    CardinalityDiagnosis,
    /// The credit-weighted refinement of the cardinality diagnosis.
    WeightedDiagnosis,
    /// A full diagnosis run over one report.
    DiagnosisRun,
}

impl Display for DiagComputation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::CardinalityDiagnosis => "Cardinality Diagnosis",
            Self::WeightedDiagnosis => "Weighted Diagnosis",
            Self::DiagnosisRun => "Diagnosis Run",
        })
    }
}
