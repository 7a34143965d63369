//! Reporting units of the frequency table
//!
//! Frequencies are reported per [`Stratum`], a combination of cancer group and
//! [`Cohort`]. Besides every real cohort, a cancer group that was observed in
//! more than one cohort is also reported across all of them in the synthetic
//! [`Cohort::AllCohorts`].

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt::Display;

use tracing::debug;

use crate::variant::VariantRecord;
use crate::ALL_COHORTS;

/// The cohort part of a [`Stratum`]
///
/// Ordering puts all real cohorts (alphabetically) before [`Cohort::AllCohorts`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cohort {
    /// A real cohort (study) of the dataset
    Real(String),
    /// The union of all cohorts of a cancer group
    AllCohorts,
}

impl Cohort {
    /// Constructs a [`Cohort::Real`]
    pub fn real(name: &str) -> Self {
        Cohort::Real(name.to_string())
    }

    /// Returns `true` for the synthetic [`Cohort::AllCohorts`]
    pub fn is_all_cohorts(&self) -> bool {
        matches!(self, Cohort::AllCohorts)
    }

    /// Returns `true` if a specimen of the given real cohort belongs to `self`
    ///
    /// [`Cohort::AllCohorts`] includes every cohort.
    pub fn includes(&self, cohort: &str) -> bool {
        match self {
            Cohort::Real(name) => name == cohort,
            Cohort::AllCohorts => true,
        }
    }

    /// The label used in the `Dataset` column
    pub fn label(&self) -> &str {
        match self {
            Cohort::Real(name) => name,
            Cohort::AllCohorts => ALL_COHORTS,
        }
    }
}

impl Display for Cohort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A (cancer group, cohort) reporting unit
///
/// `num_samples` is the number of distinct biospecimens of the stratum in the
/// overall dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Stratum {
    cancer_group: String,
    cohort: Cohort,
    num_samples: usize,
}

impl Stratum {
    /// Constructs a new [`Stratum`]
    pub fn new(cancer_group: &str, cohort: Cohort, num_samples: usize) -> Self {
        Self {
            cancer_group: cancer_group.to_string(),
            cohort,
            num_samples,
        }
    }

    /// The cancer group (disease) of the stratum
    pub fn cancer_group(&self) -> &str {
        &self.cancer_group
    }

    /// The cohort of the stratum
    pub fn cohort(&self) -> &Cohort {
        &self.cohort
    }

    /// The number of distinct biospecimens in the stratum
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Returns `true` if the stratum has more than `min_samples` biospecimens
    pub fn is_reportable(&self, min_samples: usize) -> bool {
        self.num_samples > min_samples
    }

    /// Returns `true` if the record belongs to the stratum
    pub fn includes(&self, record: &VariantRecord) -> bool {
        record.cancer_group() == self.cancer_group && self.cohort.includes(record.cohort())
    }
}

/// Derives all strata from the variant records
///
/// Every observed (cancer group, cohort) pair becomes a stratum. A cancer group
/// that occurs in more than one cohort additionally gets a
/// [`Cohort::AllCohorts`] stratum, counting the biospecimens of all its cohorts.
///
/// The result is sorted by cancer group and cohort and contains every stratum
/// only once. No sample-count gate is applied here, see [`Stratum::is_reportable`].
///
/// # Examples
///
/// ```
/// use cnv_frequencies::{plan_strata, Cohort};
/// # use cnv_frequencies::{join_variants, CnvCall, SampleCatalog, SampleMetadata, SelectionSets};
/// # let catalog = SampleCatalog::new(
/// #     [
/// #         SampleMetadata::new("BS_1", "PT_1", "PBTA", "Ependymoma", "Tumor"),
/// #         SampleMetadata::new("BS_2", "PT_2", "GMKF", "Ependymoma", "Tumor"),
/// #     ],
/// #     SelectionSets::default(),
/// # );
/// # let calls = vec![
/// #     CnvCall::new("BS_1", "CDKN2A", "ENSG00000147889", "loss"),
/// #     CnvCall::new("BS_2", "CDKN2A", "ENSG00000147889", "loss"),
/// # ];
/// # let records = join_variants(calls, &catalog).unwrap();
///
/// // one Ependymoma specimen in each of the cohorts GMKF and PBTA
/// let strata = plan_strata(&records);
/// assert_eq!(strata.len(), 3);
/// assert_eq!(strata[0].cohort(), &Cohort::real("GMKF"));
/// assert_eq!(strata[1].cohort(), &Cohort::real("PBTA"));
/// assert_eq!(strata[2].cohort(), &Cohort::AllCohorts);
/// assert_eq!(strata[2].num_samples(), 2);
/// ```
pub fn plan_strata(records: &[VariantRecord]) -> Vec<Stratum> {
    let mut per_cohort: BTreeMap<(&str, &str), HashSet<&str>> = BTreeMap::new();
    let mut per_cancer_group: BTreeMap<&str, (BTreeSet<&str>, HashSet<&str>)> = BTreeMap::new();

    for record in records {
        per_cohort
            .entry((record.cancer_group(), record.cohort()))
            .or_default()
            .insert(record.biospecimen_id());

        let (cohorts, samples) = per_cancer_group.entry(record.cancer_group()).or_default();
        cohorts.insert(record.cohort());
        samples.insert(record.biospecimen_id());
    }

    let mut strata: BTreeMap<(&str, Cohort), usize> = BTreeMap::new();
    for ((cancer_group, cohort), samples) in per_cohort {
        strata.insert((cancer_group, Cohort::real(cohort)), samples.len());
    }

    for (cancer_group, (cohorts, samples)) in per_cancer_group {
        let mut cohorts = cohorts.iter();
        let cohort = match (cohorts.next(), cohorts.next()) {
            (Some(single), None) => Cohort::real(single),
            _ => Cohort::AllCohorts,
        };
        // a single-cohort cancer group coincides with its real stratum
        strata.insert((cancer_group, cohort), samples.len());
    }

    debug!("Planned {} strata", strata.len());
    strata
        .into_iter()
        .map(|((cancer_group, cohort), num_samples)| Stratum::new(cancer_group, cohort, num_samples))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::catalog::{SampleCatalog, SampleMetadata, SelectionSets};
    use crate::variant::{join_variants, CnvCall};

    fn records(samples: &[(&str, &str, &str)]) -> Vec<VariantRecord> {
        let metadata = samples
            .iter()
            .map(|(bs, cohort, group)| SampleMetadata::new(bs, &format!("PT{bs}"), cohort, group, "Tumor"));
        let catalog = SampleCatalog::new(metadata, SelectionSets::default());
        let calls = samples.iter().flat_map(|(bs, _, _)| {
            [
                CnvCall::new(bs, "MYCN", "ENSG00000134323", "gain"),
                CnvCall::new(bs, "CDKN2A", "ENSG00000147889", "loss"),
            ]
        });
        join_variants(calls, &catalog).unwrap()
    }

    #[test]
    fn single_cohort_is_not_duplicated() {
        let strata = plan_strata(&records(&[
            ("BS_1", "PBTA", "Ependymoma"),
            ("BS_2", "PBTA", "Ependymoma"),
        ]));
        assert_eq!(strata, vec![Stratum::new("Ependymoma", Cohort::real("PBTA"), 2)]);
    }

    #[test]
    fn multi_cohort_adds_all_cohorts() {
        let strata = plan_strata(&records(&[
            ("BS_1", "PBTA", "Ependymoma"),
            ("BS_2", "PBTA", "Ependymoma"),
            ("BS_3", "GMKF", "Ependymoma"),
            ("BS_4", "GMKF", "Neuroblastoma"),
        ]));
        assert_eq!(
            strata,
            vec![
                Stratum::new("Ependymoma", Cohort::real("GMKF"), 1),
                Stratum::new("Ependymoma", Cohort::real("PBTA"), 2),
                Stratum::new("Ependymoma", Cohort::AllCohorts, 3),
                Stratum::new("Neuroblastoma", Cohort::real("GMKF"), 1),
            ]
        );
    }

    #[test]
    fn counts_distinct_biospecimens() {
        // every biospecimen has two calls
        let strata = plan_strata(&records(&[
            ("BS_1", "PBTA", "Ependymoma"),
            ("BS_2", "PBTA", "Ependymoma"),
            ("BS_3", "PBTA", "Ependymoma"),
        ]));
        assert_eq!(strata[0].num_samples(), 3);
    }

    #[test]
    fn cohort_named_all_cohorts_stays_real() {
        let strata = plan_strata(&records(&[
            ("BS_1", "all_cohorts", "Ependymoma"),
            ("BS_2", "PBTA", "Ependymoma"),
        ]));
        assert_eq!(strata.len(), 3);
        assert_eq!(strata[0].cohort(), &Cohort::real("PBTA"));
        assert_eq!(strata[1].cohort(), &Cohort::real("all_cohorts"));
        assert!(strata[2].cohort().is_all_cohorts());
    }

    #[test]
    fn reportable_threshold() {
        let stratum = Stratum::new("Ependymoma", Cohort::real("PBTA"), 3);
        assert!(!stratum.is_reportable(3));
        let stratum = Stratum::new("Ependymoma", Cohort::real("PBTA"), 4);
        assert!(stratum.is_reportable(3));
    }

    #[test]
    fn cohort_inclusion() {
        assert!(Cohort::AllCohorts.includes("PBTA"));
        assert!(Cohort::real("PBTA").includes("PBTA"));
        assert!(!Cohort::real("PBTA").includes("GMKF"));
        assert_eq!(Cohort::AllCohorts.to_string(), "all_cohorts");
        assert_eq!(Cohort::real("GMKF").label(), "GMKF");
    }
}
