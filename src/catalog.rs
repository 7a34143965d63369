//! Per-biospecimen sample metadata and the independent sample selections
//!
//! The [`SampleCatalog`] is the lookup table that every variant call is joined
//! against. It also holds the four [`SelectionSet`]s of independent tumor
//! specimens that define the primary and relapse populations.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::warn;

mod selection;
pub use selection::{SelectionKind, SelectionSet, SelectionSets};

/// Metadata of a single biospecimen
///
/// All values are taken verbatim from the histology file. In particular the
/// `cancer_group` may hold the literal unknown marker
/// [`UNKNOWN_CANCER_GROUP`](crate::UNKNOWN_CANCER_GROUP).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleMetadata {
    biospecimen_id: String,
    participant_id: String,
    cohort: String,
    cancer_group: String,
    sample_type: String,
}

impl SampleMetadata {
    /// Constructs a new [`SampleMetadata`]
    pub fn new(
        biospecimen_id: &str,
        participant_id: &str,
        cohort: &str,
        cancer_group: &str,
        sample_type: &str,
    ) -> Self {
        Self {
            biospecimen_id: biospecimen_id.to_string(),
            participant_id: participant_id.to_string(),
            cohort: cohort.to_string(),
            cancer_group: cancer_group.to_string(),
            sample_type: sample_type.to_string(),
        }
    }

    /// The Kids First biospecimen ID
    pub fn biospecimen_id(&self) -> &str {
        &self.biospecimen_id
    }

    /// The Kids First participant ID
    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    /// The cohort (study) the specimen belongs to
    pub fn cohort(&self) -> &str {
        &self.cohort
    }

    /// The cancer group (disease) of the specimen
    pub fn cancer_group(&self) -> &str {
        &self.cancer_group
    }

    /// The sample type, e.g. `Tumor` or `Normal`
    pub fn sample_type(&self) -> &str {
        &self.sample_type
    }
}

/// Lookup of [`SampleMetadata`] by biospecimen ID plus the independent sample selections
///
/// # Examples
///
/// ```
/// use cnv_frequencies::{SampleCatalog, SampleMetadata, SelectionKind, SelectionSet, SelectionSets};
///
/// let mut selections = SelectionSets::default();
/// selections.insert(SelectionSet::new(SelectionKind::EachCohortPrimary, ["BS_1"]));
///
/// let catalog = SampleCatalog::new(
///     [SampleMetadata::new("BS_1", "PT_1", "PBTA", "Medulloblastoma", "Tumor")],
///     selections,
/// );
///
/// assert_eq!(catalog.get("BS_1").unwrap().cohort(), "PBTA");
/// assert!(catalog.get("BS_2").is_none());
/// assert!(catalog.selection(SelectionKind::EachCohortPrimary).contains("BS_1"));
/// ```
#[derive(Debug, Default)]
pub struct SampleCatalog {
    samples: HashMap<String, SampleMetadata>,
    selections: SelectionSets,
}

impl SampleCatalog {
    /// Constructs a new [`SampleCatalog`]
    ///
    /// If a biospecimen appears more than once, the first record is kept.
    pub fn new<I: IntoIterator<Item = SampleMetadata>>(
        samples: I,
        selections: SelectionSets,
    ) -> Self {
        let mut lookup = HashMap::new();
        for sample in samples {
            match lookup.entry(sample.biospecimen_id.clone()) {
                Entry::Occupied(_) => {
                    warn!(
                        "Duplicate metadata for biospecimen {}, keeping the first record",
                        sample.biospecimen_id
                    );
                }
                Entry::Vacant(entry) => {
                    entry.insert(sample);
                }
            }
        }
        Self {
            samples: lookup,
            selections,
        }
    }

    /// Returns the metadata of the biospecimen or `None` if it is not known
    pub fn get(&self, biospecimen_id: &str) -> Option<&SampleMetadata> {
        self.samples.get(biospecimen_id)
    }

    /// Returns the independent sample selection of the given kind
    pub fn selection(&self, kind: SelectionKind) -> &SelectionSet {
        self.selections.get(kind)
    }

    /// All four independent sample selections
    pub fn selections(&self) -> &SelectionSets {
        &self.selections
    }

    /// The number of biospecimens with metadata
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if the catalog does not contain any biospecimen
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
