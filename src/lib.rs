//! Gene-level copy number variant (CNV) alteration frequencies
//!
//! `cnv_frequencies` takes the consensus CNV calls of a pediatric cancer cohort,
//! joins them to the sample metadata and reports, for every gene and variant type,
//! how often the alteration occurs within each cancer group and cohort.
//!
//! Frequencies are computed over three sample populations:
//!
//! - the overall dataset (counted in participants)
//! - independent primary tumors (counted in biospecimens)
//! - independent relapse tumors (counted in biospecimens)
//!
//! Every cancer group that spans more than one cohort is additionally reported
//! in the synthetic [`Cohort::AllCohorts`] cohort.
//!
//! The main entry points are [`Pipeline`] to run everything from input files to
//! the annotated output and [`compute_frequencies`] for the in-memory core.
//!
//! # Examples
//!
//! ```
//! use cnv_frequencies::{compute_frequencies, CnvCall, SampleCatalog, SampleMetadata, SelectionSets};
//!
//! let mut samples = Vec::new();
//! let mut calls = Vec::new();
//! for i in 0..4 {
//!     let bs_id = format!("BS_{i}");
//!     samples.push(SampleMetadata::new(&bs_id, &format!("PT_{i}"), "PBTA", "Neuroblastoma", "Tumor"));
//!     calls.push(CnvCall::new(&bs_id, "MYCN", "ENSG00000134323", "amplification"));
//! }
//!
//! let catalog = SampleCatalog::new(samples, SelectionSets::default());
//! let rows = compute_frequencies(&catalog, calls, 3).unwrap();
//!
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows[0].overall().to_string(), "4/4");
//! assert_eq!(rows[0].overall().percentage(), "100.00%");
//! assert_eq!(rows[0].primary().to_string(), "0/0");
//! ```
#![warn(missing_docs)]
use thiserror::Error;

pub mod annotator;
pub mod catalog;
pub mod config;
pub mod merge;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod stats;
pub mod stratum;
pub mod variant;
mod utils;

pub use catalog::{SampleCatalog, SampleMetadata, SelectionKind, SelectionSet, SelectionSets};
pub use config::{InputFiles, PipelineConfig};
pub use merge::{merge_views, MergedRow};
pub use pipeline::{compute_frequencies, Pipeline};
pub use stats::{aggregate, Fraction, FrequencyRow, View, ViewFrequencies};
pub use stratum::{plan_strata, Cohort, Stratum};
pub use variant::{join_variants, CnvCall, VariantRecord, VariantStatus};

/// Strata must contain more than this many distinct biospecimens to be reported
pub const DEFAULT_MIN_SAMPLES: usize = 3;

/// The only `sample_type` that may appear in the variant calls
pub const TUMOR_SAMPLE_TYPE: &str = "Tumor";

/// Literal marker of a specimen without a known cancer group
pub const UNKNOWN_CANCER_GROUP: &str = "NA";

/// Label of the synthetic cohort that spans all real cohorts of a cancer group
pub const ALL_COHORTS: &str = "all_cohorts";

/// Main Error type for this crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CnvError {
    /// A required input file is absent or cannot be read
    #[error("unable to open file {0}")]
    CannotOpenFile(String),
    /// A required column is missing from the header of an input file
    #[error("column {column} is missing in {file}")]
    MissingColumn {
        /// The input file
        file: String,
        /// The name of the missing column
        column: String,
    },
    /// Input data that cannot be parsed
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A variant call refers to a biospecimen without sample metadata
    #[error("biospecimen {0} is not present in the sample metadata")]
    MissingMetadata(String),
    /// A variant call belongs to a non-tumor specimen
    #[error("variant calls contain non tumor sample {biospecimen} ({sample_type})")]
    NonTumorSample {
        /// The offending biospecimen
        biospecimen: String,
        /// Its sample type
        sample_type: String,
    },
    /// No tumor variant call is left after joining calls and metadata
    #[error("no tumor variant calls with a known cancer group")]
    NoVariants,
    /// The external annotation step failed
    #[error("annotation failed: {0}")]
    AnnotationFailed(String),
    /// Reading or writing files failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// A delimited file could not be read or written
    #[error(transparent)]
    Csv(#[from] csv::Error),
    /// A JSON record could not be serialized
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Shortcut for `Result<T, CnvError>`
pub type CnvResult<T> = Result<T, CnvError>;
