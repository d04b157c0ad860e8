use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::Path;

use crate::explanations::{credit_weights, index_conflict_sets, IndexingError};
use crate::formulas::{FormulaId, FormulaStore};
use crate::graphs::{generate_relation_graph, RelationGraph, RelationGraphConfig};
use crate::handlers::{ComputationHandler, DiagComputation, DiagEvent};
use crate::io::read_conflict_report;
use crate::solver::{
    credit_weighted_diagnosis, minimum_cardinality_diagnosis, Diagnosis, DiagnosisError, MilpBackend,
};

/// A configuration for batch runs.
///
/// The following things can be configured:
/// - the seed count -- each ontology is diagnosed once per seed in
///   `0..seed_count`
/// - the density of the generated relation graphs
///
/// # Example
///
/// Basic usage:
/// ```
/// # use ontodiag::batch::BatchConfig;
/// let config = BatchConfig::default().seed_count(5).density(0.2);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BatchConfig {
    pub(crate) seed_count: u64,
    pub(crate) density: f64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { seed_count: 30, density: 0.15 }
    }
}

impl BatchConfig {
    /// Updates the number of relation-graph seeds per ontology.
    #[must_use]
    pub const fn seed_count(mut self, seed_count: u64) -> Self {
        self.seed_count = seed_count;
        self
    }

    /// Updates the density of the generated relation graphs.
    #[must_use]
    pub const fn density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }
}

/// Error of a single diagnosis run.
#[derive(Debug)]
pub enum RunError {
    /// The conflict-set report could not be read.
    Io(io::Error),
    /// The report and its conflict sets are inconsistent.
    Indexing(IndexingError),
    /// A diagnosis could not be computed.
    Diagnosis(DiagnosisError),
}

impl Display for RunError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => f.write_fmt(format_args!("Could not read the conflict-set report: {error}")),
            Self::Indexing(error) => f.write_fmt(format_args!("{error}")),
            Self::Diagnosis(error) => f.write_fmt(format_args!("{error}")),
        }
    }
}

impl From<io::Error> for RunError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<IndexingError> for RunError {
    fn from(error: IndexingError) -> Self {
        Self::Indexing(error)
    }
}

impl From<DiagnosisError> for RunError {
    fn from(error: DiagnosisError) -> Self {
        Self::Diagnosis(error)
    }
}

impl std::error::Error for RunError {}

/// The results of one diagnosis run over one conflict-set report.
#[derive(Clone, Debug, PartialEq)]
pub struct RunMetrics {
    /// Number of distinct formulas in the report.
    pub formula_count: usize,
    /// Number of distinct conflict sets in the report.
    pub conflict_set_count: usize,
    /// Number of edges of the generated relation graph.
    pub graph_edge_count: usize,
    /// The minimum-cardinality diagnosis.
    pub cardinal: Diagnosis,
    /// The credit-weighted diagnosis.
    pub weighted: Diagnosis,
    /// Percentage of relation-graph edges removed by the cardinal diagnosis.
    pub cardinal_reduction: f64,
    /// Percentage of relation-graph edges removed by the weighted diagnosis.
    pub weighted_reduction: f64,
}

/// Aggregated metrics for one ontology over all its seeds.
#[derive(Debug, Default)]
pub struct OntologyMetrics {
    /// The ontology name (its directory name under the data root).
    pub name: String,
    /// Edge-reduction percentages of the cardinal diagnoses, one per
    /// successful seed.
    pub cardinal_reductions: Vec<f64>,
    /// Edge-reduction percentages of the weighted diagnoses, one per
    /// successful seed.
    pub weighted_reductions: Vec<f64>,
    /// The failure that stopped this ontology's runs, if any.
    pub failure: Option<(u64, RunError)>,
}

impl OntologyMetrics {
    /// Returns the mean cardinal reduction percentage over all successful
    /// seeds, or `None` if there was none.
    pub fn mean_cardinal_reduction(&self) -> Option<f64> {
        mean(&self.cardinal_reductions)
    }

    /// Returns the mean weighted reduction percentage over all successful
    /// seeds, or `None` if there was none.
    pub fn mean_weighted_reduction(&self) -> Option<f64> {
        mean(&self.weighted_reductions)
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Returns the names of all ontologies under the data root: its
/// subdirectory names in ascending order.
pub fn scan_ontology_names(data_root: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(data_root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names.into_iter().sorted().collect())
}

/// Returns the percentage of relation-graph edges that disappear when the
/// given formulas are retracted. A graph without edges yields `0.0`.
#[allow(clippy::cast_precision_loss)]
pub fn edge_reduction_percentage(graph: &RelationGraph, retracted: &[FormulaId]) -> f64 {
    let total = graph.edge_count();
    if total == 0 {
        return 0.0;
    }
    let remaining = graph.without_nodes(retracted).edge_count();
    (total - remaining) as f64 / total as f64 * 100.0
}

/// Executes one full diagnosis run over the conflict-set report at the
/// given path: load, index, generate the relation graph, allocate credit,
/// compute both diagnoses and evaluate the edge reduction.
pub fn run_ontology<B: MilpBackend>(
    report_path: &str,
    graph_config: &RelationGraphConfig,
    backend: &B,
    handler: &mut dyn ComputationHandler,
) -> Result<RunMetrics, RunError> {
    let started = DiagEvent::ComputationStarted(DiagComputation::DiagnosisRun);
    if !handler.should_resume(started.clone()) {
        return Err(DiagnosisError::Canceled(started).into());
    }

    let mut store = FormulaStore::new();
    let raw_sets = read_conflict_report(report_path, &mut store)?;
    let conflict_sets = index_conflict_sets(&raw_sets, &store)?;

    let graph = generate_relation_graph(&store, &conflict_sets, graph_config);
    let weights = credit_weights(&graph, &conflict_sets, &store);

    let cardinal = minimum_cardinality_diagnosis(backend, &store, &conflict_sets, handler)?;
    let weighted = credit_weighted_diagnosis(backend, &store, &conflict_sets, &weights, &cardinal, handler)?;

    let cardinal_reduction = edge_reduction_percentage(&graph, &cardinal.formula_ids);
    let weighted_reduction = edge_reduction_percentage(&graph, &weighted.formula_ids);
    let _ = handler.should_resume(DiagEvent::ComputationFinished(DiagComputation::DiagnosisRun));

    Ok(RunMetrics {
        formula_count: store.len(),
        conflict_set_count: conflict_sets.len(),
        graph_edge_count: graph.edge_count(),
        cardinal,
        weighted,
        cardinal_reduction,
        weighted_reduction,
    })
}

/// Runs the diagnosis over every ontology under the data root, once per
/// seed.
///
/// The data root is expected to hold one directory per ontology with the
/// conflict-set report at `<data_root>/<name>/res.txt`. A failing run stops
/// the remaining seeds of its ontology and is recorded in that ontology's
/// metrics; the other ontologies are not affected.
pub fn run_batch<B: MilpBackend>(
    data_root: &str,
    config: &BatchConfig,
    backend: &B,
    handler: &mut dyn ComputationHandler,
) -> io::Result<Vec<OntologyMetrics>> {
    let names = scan_ontology_names(Path::new(data_root))?;
    let mut result = Vec::with_capacity(names.len());
    for name in names {
        let report_path = Path::new(data_root).join(&name).join("res.txt");
        let report_path = report_path.to_string_lossy();
        let mut metrics = OntologyMetrics { name, ..OntologyMetrics::default() };

        for seed in 0..config.seed_count {
            let graph_config = RelationGraphConfig::default().seed(seed).density(config.density);
            match run_ontology(&report_path, &graph_config, backend, handler) {
                Ok(run) => {
                    metrics.cardinal_reductions.push(run.cardinal_reduction);
                    metrics.weighted_reductions.push(run.weighted_reduction);
                }
                Err(error) => {
                    metrics.failure = Some((seed, error));
                    break;
                }
            }
        }
        result.push(metrics);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::{Path, PathBuf};

    use crate::graphs::{RelationGraph, RelationGraphConfig};
    use crate::handlers::NopHandler;
    use crate::solver::EnumerativeBackend;

    use super::{edge_reduction_percentage, run_batch, run_ontology, scan_ontology_names, BatchConfig, OntologyMetrics};

    fn temp_root(label: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("ontodiag-batch-{label}-{}", std::process::id()));
        if root.exists() {
            fs::remove_dir_all(&root).unwrap();
        }
        fs::create_dir_all(&root).unwrap();
        root
    }

    #[test]
    fn test_run_ontology_on_university_report() {
        let backend = EnumerativeBackend::new();
        let config = RelationGraphConfig::default().seed(30);
        let run = run_ontology("resources/mups/university/res.txt", &config, &backend, &mut NopHandler).unwrap();

        assert_eq!(run.formula_count, 5);
        assert_eq!(run.conflict_set_count, 2);
        // The shared subsumption axiom is the unique minimum hitting set.
        assert_eq!(run.cardinal.formula_ids, vec![1]);
        assert_eq!(run.weighted.cardinality(), run.cardinal.cardinality());
        assert!((0.0..=100.0).contains(&run.cardinal_reduction));
        assert!((0.0..=100.0).contains(&run.weighted_reduction));
    }

    #[test]
    fn test_scan_ontology_names_is_sorted() {
        let names = scan_ontology_names(Path::new("resources/mups")).unwrap();
        assert_eq!(names, vec!["pizza".to_string(), "university".to_string()]);
    }

    #[test]
    fn test_run_batch_over_fixture_reports() {
        let backend = EnumerativeBackend::new();
        let config = BatchConfig::default().seed_count(2);
        let metrics = run_batch("resources/mups", &config, &backend, &mut NopHandler).unwrap();

        assert_eq!(metrics.len(), 2);
        for ontology in &metrics {
            assert!(ontology.failure.is_none(), "unexpected failure in {}", ontology.name);
            assert_eq!(ontology.cardinal_reductions.len(), 2);
            assert_eq!(ontology.weighted_reductions.len(), 2);
            assert!(ontology.mean_cardinal_reduction().is_some());
        }
    }

    #[test]
    fn test_run_batch_isolates_failing_ontologies() {
        let root = temp_root("isolation");
        fs::create_dir_all(root.join("broken")).unwrap();
        fs::create_dir_all(root.join("working")).unwrap();
        fs::write(
            root.join("working/res.txt"),
            "Found explanation <http://e#0>\n[1] SubClassOf(A, B)\n[2] DisjointClasses(A, B)\n\n",
        )
        .unwrap();

        let backend = EnumerativeBackend::new();
        let config = BatchConfig::default().seed_count(2);
        let metrics = run_batch(&root.to_string_lossy(), &config, &backend, &mut NopHandler).unwrap();

        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].name, "broken");
        assert!(metrics[0].failure.is_some());
        assert!(metrics[0].cardinal_reductions.is_empty());
        assert_eq!(metrics[1].name, "working");
        assert!(metrics[1].failure.is_none());
        assert_eq!(metrics[1].cardinal_reductions.len(), 2);

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_edge_reduction_percentage() {
        let mut graph = RelationGraph::with_nodes(3);
        graph.add_edge(0, 1);
        graph.add_edge(1, 0);
        graph.add_edge(1, 2);
        graph.add_edge(2, 1);

        assert_eq!(edge_reduction_percentage(&graph, &[]), 0.0);
        assert_eq!(edge_reduction_percentage(&graph, &[0]), 50.0);
        assert_eq!(edge_reduction_percentage(&graph, &[1]), 100.0);
        assert_eq!(edge_reduction_percentage(&RelationGraph::new(), &[0]), 0.0);
    }

    #[test]
    fn test_mean_reductions() {
        let metrics = OntologyMetrics {
            name: "m".to_string(),
            cardinal_reductions: vec![40.0, 60.0],
            weighted_reductions: vec![100.0],
            failure: None,
        };
        assert_eq!(metrics.mean_cardinal_reduction(), Some(50.0));
        assert_eq!(metrics.mean_weighted_reduction(), Some(100.0));
        assert_eq!(OntologyMetrics::default().mean_cardinal_reduction(), None);
    }
}

