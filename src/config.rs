//! Paths and settings of a pipeline run

use std::path::{Path, PathBuf};

use crate::catalog::SelectionKind;
use crate::DEFAULT_MIN_SAMPLES;

/// Name of the frequency table before annotation
pub const FREQUENCY_TABLE: &str = "gene-level-cnv-consensus-mut-freq.tsv";

/// Name of the annotated frequency table
pub const ANNOTATED_TABLE: &str = "gene-level-cnv-consensus-annotated-mut-freq.tsv";

/// Name of the JSON Lines export of the annotated table
pub const ANNOTATED_JSONL: &str = "gene-level-cnv-consensus-annotated-mut-freq.jsonl";

/// Name of the file that receives the annotator output
pub const ANNOTATOR_LOG: &str = "annotator.log";

/// Locations of all input tables of a run
///
/// # Examples
///
/// ```
/// use cnv_frequencies::{InputFiles, SelectionKind};
///
/// let inputs = InputFiles::new(
///     "histologies.tsv",
///     "consensus_wgs_plus_cnvkit_wxs.tsv.gz",
///     "all-cohorts-primary.tsv",
///     "all-cohorts-relapse.tsv",
///     "each-cohort-primary.tsv",
///     "each-cohort-relapse.tsv",
/// );
/// assert_eq!(
///     inputs.selection(SelectionKind::EachCohortRelapse).to_str(),
///     Some("each-cohort-relapse.tsv")
/// );
/// ```
#[derive(Debug, Clone)]
pub struct InputFiles {
    histology: PathBuf,
    cnv_consensus: PathBuf,
    selections: [PathBuf; 4],
}

impl InputFiles {
    /// Constructs a new [`InputFiles`]
    pub fn new<P: Into<PathBuf>>(
        histology: P,
        cnv_consensus: P,
        all_cohorts_primary: P,
        all_cohorts_relapse: P,
        each_cohort_primary: P,
        each_cohort_relapse: P,
    ) -> Self {
        Self {
            histology: histology.into(),
            cnv_consensus: cnv_consensus.into(),
            selections: [
                all_cohorts_primary.into(),
                all_cohorts_relapse.into(),
                each_cohort_primary.into(),
                each_cohort_relapse.into(),
            ],
        }
    }

    /// The histology table
    pub fn histology(&self) -> &Path {
        &self.histology
    }

    /// The consensus CNV table, optionally gzip compressed
    pub fn cnv_consensus(&self) -> &Path {
        &self.cnv_consensus
    }

    /// The independent specimen list of the given kind
    pub fn selection(&self, kind: SelectionKind) -> &Path {
        &self.selections[kind as usize]
    }
}

/// Settings of a pipeline run
///
/// The defaults reproduce the layout of the OpenPedCan analysis module:
/// outputs go to `results/` and the annotator lives in a sibling module.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    results_dir: PathBuf,
    min_samples: usize,
    annotator_script: PathBuf,
    annotation_columns: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            min_samples: DEFAULT_MIN_SAMPLES,
            annotator_script: PathBuf::from(
                "../long-format-table-utils/annotator/annotator-cli.R",
            ),
            annotation_columns: [
                "Gene_full_name",
                "OncoKB_cancer_gene",
                "OncoKB_oncogene_TSG",
                "EFO",
                "MONDO",
            ]
            .iter()
            .map(|column| column.to_string())
            .collect(),
        }
    }
}

impl PipelineConfig {
    /// Directory that receives all output files
    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Sets the output directory
    pub fn with_results_dir<P: Into<PathBuf>>(mut self, results_dir: P) -> Self {
        self.results_dir = results_dir.into();
        self
    }

    /// Strata must contain more than this number of samples to be reported
    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Sets the minimum number of samples
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    /// Path to the R annotator CLI
    pub fn annotator_script(&self) -> &Path {
        &self.annotator_script
    }

    /// Sets the path of the R annotator CLI
    pub fn with_annotator_script<P: Into<PathBuf>>(mut self, script: P) -> Self {
        self.annotator_script = script.into();
        self
    }

    /// Columns that the annotator adds
    pub fn annotation_columns(&self) -> &[String] {
        &self.annotation_columns
    }

    /// Path of the frequency table before annotation
    pub fn frequency_table(&self) -> PathBuf {
        self.results_dir.join(FREQUENCY_TABLE)
    }

    /// Path of the annotated frequency table
    pub fn annotated_table(&self) -> PathBuf {
        self.results_dir.join(ANNOTATED_TABLE)
    }

    /// Path of the JSON Lines export
    pub fn annotated_jsonl(&self) -> PathBuf {
        self.results_dir.join(ANNOTATED_JSONL)
    }

    /// Path of the annotator log
    pub fn annotator_log(&self) -> PathBuf {
        self.results_dir.join(ANNOTATOR_LOG)
    }
}
