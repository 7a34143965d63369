//! End-to-end computation of the CNV frequency tables

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::annotator::{Annotator, RscriptAnnotator};
use crate::catalog::SampleCatalog;
use crate::config::{InputFiles, PipelineConfig};
use crate::merge::{merge_views, MergedRow};
use crate::output::{finalize_annotated, write_frequency_table_file, Table};
use crate::parser::{self, cnv_consensus};
use crate::stats::aggregate;
use crate::stratum::plan_strata;
use crate::variant::{join_variants, CnvCall};
use crate::CnvResult;

/// Computes the merged frequency table from sample metadata and CNV calls
///
/// Joins the calls to the metadata, plans the strata, computes the frequencies
/// of all three views for every stratum with more than `min_samples` samples
/// and merges the views into one row per gene, variant type and stratum.
///
/// # Errors
///
/// See [`join_variants`]
pub fn compute_frequencies<I: IntoIterator<Item = CnvCall>>(
    catalog: &SampleCatalog,
    calls: I,
    min_samples: usize,
) -> CnvResult<Vec<MergedRow>> {
    let records = join_variants(calls, catalog)?;
    let strata = plan_strata(&records);
    info!(
        "{} variant records in {} strata",
        records.len(),
        strata.len()
    );
    let frequencies = aggregate(&records, &strata, catalog, min_samples);
    Ok(merge_views(&frequencies))
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Runs the whole workflow from the input tables to the annotated output
///
/// ```mermaid
/// flowchart LR
///     H[histologies.tsv] --> C[SampleCatalog]
///     S[independent specimens] --> C
///     V[consensus CNV calls] --> J[join_variants]
///     C --> J
///     J --> P[plan_strata]
///     P --> A[aggregate]
///     A --> M[merge_views]
///     M --> T[mut-freq.tsv]
///     T --> N[Annotator]
///     N --> F[annotated-mut-freq.tsv]
///     F --> L[annotated-mut-freq.jsonl]
/// ```
///
/// All inputs are read before any output is written. The pre-annotation table
/// is kept if the annotation fails.
///
/// # Examples
///
/// ```no_run
/// use cnv_frequencies::{InputFiles, Pipeline, PipelineConfig};
///
/// let inputs = InputFiles::new(
///     "data/histologies.tsv",
///     "data/consensus_wgs_plus_cnvkit_wxs.tsv.gz",
///     "data/independent-specimens.wgswxspanel.primary.prefer.wgs.tsv",
///     "data/independent-specimens.wgswxspanel.relapse.prefer.wgs.tsv",
///     "data/independent-specimens.wgswxspanel.primary.eachcohort.prefer.wgs.tsv",
///     "data/independent-specimens.wgswxspanel.relapse.eachcohort.prefer.wgs.tsv",
/// );
/// let pipeline = Pipeline::new(PipelineConfig::default());
/// pipeline.run(&inputs).unwrap();
/// ```
#[derive(Debug)]
pub struct Pipeline<A> {
    config: PipelineConfig,
    annotator: A,
}

impl Pipeline<RscriptAnnotator> {
    /// Constructs a [`Pipeline`] that annotates with the R annotator of the config
    pub fn new(config: PipelineConfig) -> Self {
        let annotator = RscriptAnnotator::new(
            config.annotator_script().to_path_buf(),
            config.annotation_columns(),
            config.annotator_log(),
        );
        Self { config, annotator }
    }
}

impl<A: Annotator> Pipeline<A> {
    /// Constructs a [`Pipeline`] with a custom [`Annotator`]
    pub fn with_annotator(config: PipelineConfig, annotator: A) -> Self {
        Self { config, annotator }
    }

    /// The settings of the pipeline
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Reads all inputs and writes the frequency tables to the results directory
    ///
    /// Returns the merged rows of the pre-annotation table.
    ///
    /// # Errors
    ///
    /// - Any parsing error of the input files
    /// - Any error of [`compute_frequencies`]
    /// - [`CnvError::AnnotationFailed`](crate::CnvError::AnnotationFailed) if the annotator fails
    /// - [`CnvError::MissingColumn`](crate::CnvError::MissingColumn) if the annotated table lacks a column
    /// - [`CnvError::Io`](crate::CnvError::Io) if an output cannot be written
    pub fn run(&self, inputs: &InputFiles) -> CnvResult<Vec<MergedRow>> {
        let catalog = parser::load_catalog(inputs)?;
        info!("Loaded metadata of {} biospecimens", catalog.len());
        let calls = cnv_consensus::read(inputs.cnv_consensus())?;
        info!("Loaded {} CNV calls", calls.len());

        let rows = compute_frequencies(&catalog, calls, self.config.min_samples())?;

        fs::create_dir_all(self.config.results_dir())?;
        let frequency_table = self.config.frequency_table();
        write_frequency_table_file(&rows, &frequency_table)?;
        info!(
            "Wrote {} rows to {}",
            rows.len(),
            frequency_table.display()
        );

        let annotated = self.config.annotated_table();
        let jsonl = self.config.annotated_jsonl();
        remove_outputs(&[annotated.as_path(), jsonl.as_path()])?;

        match self.annotate(&frequency_table, &annotated, &jsonl) {
            Ok(n_rows) => {
                info!("Wrote {} annotated rows to {}", n_rows, jsonl.display());
                Ok(rows)
            }
            Err(err) => {
                remove_outputs(&[annotated.as_path(), jsonl.as_path()])?;
                Err(err)
            }
        }
    }

    /// Annotates the frequency table and writes the annotated TSV and JSONL
    ///
    /// Returns the number of annotated rows
    fn annotate(&self, input: &Path, annotated: &Path, jsonl: &Path) -> CnvResult<usize> {
        self.annotator.annotate(input, annotated)?;

        let source = annotated.display().to_string();
        let mut table = Table::read(annotated)?;
        finalize_annotated(&mut table, &source)?;
        table.write_tsv_file(annotated)?;
        table.write_jsonl_file(jsonl)?;
        Ok(table.len())
    }
}

/// Removes stale or incomplete annotated outputs
fn remove_outputs(paths: &[&Path]) -> CnvResult<()> {
    for path in paths {
        if path.exists() {
            warn!("Removing {}", path.display());
            fs::remove_file(path)?;
        }
    }
    Ok(())
}
