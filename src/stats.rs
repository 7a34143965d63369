//! Alteration frequencies per stratum and view
//!
//! The frequency of a gene alteration is always relative to a sample population.
//! This module computes it for three populations, called [`View`]s:
//!
//! | View | Population | Counting unit |
//! | --- | --- | --- |
//! | [`View::Overall`] | all tumor specimens of the stratum | participants |
//! | [`View::Primary`] | independent primary tumors of the stratum | biospecimens |
//! | [`View::Relapse`] | independent relapse tumors of the stratum | biospecimens |
//!
//! The independent tumor selection depends on the cohort of the stratum:
//! strata of the synthetic [`Cohort::AllCohorts`] use the selections that are
//! deduplicated across all cohorts, strata of real cohorts use the selections
//! that are deduplicated within each cohort.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::catalog::{SampleCatalog, SelectionKind};
use crate::stratum::{Cohort, Stratum};
use crate::variant::VariantRecord;

mod fraction;
mod frequency;
pub use fraction::Fraction;
pub use frequency::FrequencyRow;

/// One of the three sample populations that frequencies are computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum View {
    /// All tumor specimens
    Overall,
    /// Independent primary tumor specimens
    Primary,
    /// Independent relapse tumor specimens
    Relapse,
}

impl View {
    /// All views
    pub const ALL: [View; 3] = [View::Overall, View::Primary, View::Relapse];

    /// Returns the independent sample selection that applies to a stratum of `cohort`
    ///
    /// [`View::Overall`] is not restricted to any selection and returns `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cnv_frequencies::{Cohort, SelectionKind, View};
    ///
    /// assert_eq!(View::Overall.selection(&Cohort::AllCohorts), None);
    /// assert_eq!(
    ///     View::Primary.selection(&Cohort::AllCohorts),
    ///     Some(SelectionKind::AllCohortsPrimary)
    /// );
    /// assert_eq!(
    ///     View::Relapse.selection(&Cohort::real("PBTA")),
    ///     Some(SelectionKind::EachCohortRelapse)
    /// );
    /// ```
    pub fn selection(&self, cohort: &Cohort) -> Option<SelectionKind> {
        match (self, cohort.is_all_cohorts()) {
            (View::Overall, _) => None,
            (View::Primary, true) => Some(SelectionKind::AllCohortsPrimary),
            (View::Relapse, true) => Some(SelectionKind::AllCohortsRelapse),
            (View::Primary, false) => Some(SelectionKind::EachCohortPrimary),
            (View::Relapse, false) => Some(SelectionKind::EachCohortRelapse),
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// The subject a record is counted as: the participant in the overall
    /// view, the biospecimen otherwise
    pub fn subject<'a>(&self, record: &'a VariantRecord) -> &'a str {
        match self {
            View::Overall => record.participant_id(),
            View::Primary | View::Relapse => record.biospecimen_id(),
        }
    }
}

/// The [`FrequencyRow`]s of all three views
#[derive(Debug, Default, Clone)]
pub struct ViewFrequencies {
    overall: Vec<FrequencyRow>,
    primary: Vec<FrequencyRow>,
    relapse: Vec<FrequencyRow>,
}

impl ViewFrequencies {
    /// The rows of one view
    pub fn get(&self, view: View) -> &[FrequencyRow] {
        match view {
            View::Overall => &self.overall,
            View::Primary => &self.primary,
            View::Relapse => &self.relapse,
        }
    }

    fn get_mut(&mut self, view: View) -> &mut Vec<FrequencyRow> {
        match view {
            View::Overall => &mut self.overall,
            View::Primary => &mut self.primary,
            View::Relapse => &mut self.relapse,
        }
    }

    /// Appends rows to a view
    pub fn extend<I: IntoIterator<Item = FrequencyRow>>(&mut self, view: View, rows: I) {
        self.get_mut(view).extend(rows);
    }

    /// Appends all rows of `other`, view by view
    pub fn append(&mut self, other: ViewFrequencies) {
        self.overall.extend(other.overall);
        self.primary.extend(other.primary);
        self.relapse.extend(other.relapse);
    }

    /// The total number of rows of all views
    pub fn len(&self) -> usize {
        self.overall.len() + self.primary.len() + self.relapse.len()
    }

    /// Returns `true` if no view contains any row
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Computes all frequencies of a single stratum
///
/// The stratum is not checked against the sample-count gate.
pub(crate) fn stratum_frequencies(
    records: &[VariantRecord],
    stratum: &Stratum,
    catalog: &SampleCatalog,
) -> ViewFrequencies {
    let mut frequencies = ViewFrequencies::default();
    for view in View::ALL {
        let selection = view
            .selection(stratum.cohort())
            .map(|kind| catalog.selection(kind));
        let rows = frequency::view_frequencies(records, stratum, view, selection);
        debug!(
            "{} / {}: {} {:?} rows",
            stratum.cancer_group(),
            stratum.cohort(),
            rows.len(),
            view
        );
        frequencies.extend(view, rows);
    }
    frequencies
}

/// Computes the frequencies of every reportable stratum in all three views
///
/// Strata with `min_samples` or fewer biospecimens are skipped. The strata are
/// processed in parallel, the rows are returned in the order of `strata`.
///
/// # Examples
///
/// ```
/// use cnv_frequencies::{aggregate, join_variants, plan_strata, View};
/// use cnv_frequencies::{CnvCall, SampleCatalog, SampleMetadata, SelectionSets};
///
/// let mut samples = Vec::new();
/// let mut calls = Vec::new();
/// for i in 0..4 {
///     let bs_id = format!("BS_{i}");
///     samples.push(SampleMetadata::new(&bs_id, &format!("PT_{i}"), "PBTA", "Ependymoma", "Tumor"));
///     let status = if i == 0 { "deep deletion" } else { "neutral" };
///     calls.push(CnvCall::new(&bs_id, "CDKN2A", "ENSG00000147889", status));
/// }
/// let catalog = SampleCatalog::new(samples, SelectionSets::default());
/// let records = join_variants(calls, &catalog).unwrap();
/// let strata = plan_strata(&records);
///
/// let frequencies = aggregate(&records, &strata, &catalog, 3);
/// let overall = frequencies.get(View::Overall);
/// assert_eq!(overall.len(), 2);
/// assert_eq!(overall[0].fraction().to_string(), "3/4");
/// assert_eq!(overall[1].fraction().to_string(), "1/4");
///
/// // no independent specimens were provided
/// assert!(frequencies.get(View::Primary).is_empty());
/// ```
pub fn aggregate(
    records: &[VariantRecord],
    strata: &[Stratum],
    catalog: &SampleCatalog,
    min_samples: usize,
) -> ViewFrequencies {
    let reportable: Vec<&Stratum> = strata
        .iter()
        .filter(|stratum| stratum.is_reportable(min_samples))
        .collect();
    debug!(
        "Skipping {} strata with {} or fewer samples",
        strata.len() - reportable.len(),
        min_samples
    );

    let per_stratum: Vec<ViewFrequencies> = reportable
        .par_iter()
        .map(|stratum| stratum_frequencies(records, stratum, catalog))
        .collect();

    let mut frequencies = ViewFrequencies::default();
    for part in per_stratum {
        frequencies.append(part);
    }
    info!(
        "Computed frequencies for {} strata: {} overall, {} primary, {} relapse rows",
        reportable.len(),
        frequencies.overall.len(),
        frequencies.primary.len(),
        frequencies.relapse.len()
    );
    frequencies
}
