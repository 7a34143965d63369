//! Copy number calls and their join to the sample metadata
//!
//! A raw [`CnvCall`] is one row of the consensus CNV file. [`join_variants`]
//! combines the calls with the [`SampleCatalog`] and produces the canonical
//! set of [`VariantRecord`]s that all frequencies are computed from.

use tracing::{debug, info};

use crate::catalog::SampleCatalog;
use crate::{CnvError, CnvResult, ALL_COHORTS, TUMOR_SAMPLE_TYPE, UNKNOWN_CANCER_GROUP};

mod status;
pub use status::VariantStatus;

/// A single copy number call of one gene in one biospecimen
///
/// Gene symbol and Ensembl gene ID are optional, since the consensus file
/// contains calls without gene annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CnvCall {
    biospecimen_id: String,
    gene_symbol: Option<String>,
    gene_id: Option<String>,
    status: String,
    copy_number: String,
    ploidy: String,
}

impl CnvCall {
    /// Constructs a new [`CnvCall`] without copy number and ploidy
    pub fn new(biospecimen_id: &str, gene_symbol: &str, gene_id: &str, status: &str) -> Self {
        Self {
            biospecimen_id: biospecimen_id.to_string(),
            gene_symbol: Some(gene_symbol.to_string()),
            gene_id: Some(gene_id.to_string()),
            status: status.to_string(),
            copy_number: String::new(),
            ploidy: String::new(),
        }
    }

    /// Constructs a new [`CnvCall`] from all of its parts
    pub fn from_parts(
        biospecimen_id: String,
        gene_symbol: Option<String>,
        gene_id: Option<String>,
        status: String,
        copy_number: String,
        ploidy: String,
    ) -> Self {
        Self {
            biospecimen_id,
            gene_symbol,
            gene_id,
            status,
            copy_number,
            ploidy,
        }
    }

    /// The biospecimen the call was made in
    pub fn biospecimen_id(&self) -> &str {
        &self.biospecimen_id
    }

    /// The raw copy number status
    pub fn status(&self) -> &str {
        &self.status
    }
}

/// A qualifying copy number call of a tumor specimen with known cancer group
///
/// Records are only created by [`join_variants`] and never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRecord {
    biospecimen_id: String,
    participant_id: String,
    cohort: String,
    cancer_group: String,
    gene_symbol: Option<String>,
    gene_id: Option<String>,
    status: VariantStatus,
    copy_number: String,
    ploidy: String,
}

impl VariantRecord {
    /// The Kids First biospecimen ID
    pub fn biospecimen_id(&self) -> &str {
        &self.biospecimen_id
    }

    /// The Kids First participant ID
    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    /// The cohort of the biospecimen
    pub fn cohort(&self) -> &str {
        &self.cohort
    }

    /// The cancer group of the biospecimen
    pub fn cancer_group(&self) -> &str {
        &self.cancer_group
    }

    /// The gene symbol, if the call is annotated
    pub fn gene_symbol(&self) -> Option<&str> {
        self.gene_symbol.as_deref()
    }

    /// The Ensembl gene ID, if the call is annotated
    pub fn gene_id(&self) -> Option<&str> {
        self.gene_id.as_deref()
    }

    /// The copy number status
    pub fn status(&self) -> VariantStatus {
        self.status
    }

    /// The absolute copy number, as provided in the consensus file
    pub fn copy_number(&self) -> &str {
        &self.copy_number
    }

    /// The ploidy of the specimen, as provided in the consensus file
    pub fn ploidy(&self) -> &str {
        &self.ploidy
    }
}

/// Joins copy number calls to the sample metadata
///
/// - Calls with a status other than the five [`VariantStatus`] values are discarded
/// - Every remaining call must belong to a tumor specimen of the catalog
/// - Calls of specimens with the unknown cancer group marker `NA` are dropped
///
/// # Errors
///
/// - [`CnvError::MissingMetadata`]: A call refers to an unknown biospecimen
/// - [`CnvError::NonTumorSample`]: A call belongs to a non-tumor specimen
/// - [`CnvError::InvalidInput`]: A specimen has an empty cancer group, or its
///   cohort is named like the synthetic `all_cohorts` cohort
/// - [`CnvError::NoVariants`]: No call is left after the join
///
/// # Examples
///
/// ```
/// use cnv_frequencies::{join_variants, CnvCall, SampleCatalog, SampleMetadata, SelectionSets};
///
/// let catalog = SampleCatalog::new(
///     [
///         SampleMetadata::new("BS_1", "PT_1", "PBTA", "Ependymoma", "Tumor"),
///         SampleMetadata::new("BS_2", "PT_2", "PBTA", "NA", "Tumor"),
///     ],
///     SelectionSets::default(),
/// );
/// let calls = vec![
///     CnvCall::new("BS_1", "CDKN2A", "ENSG00000147889", "deep deletion"),
///     CnvCall::new("BS_1", "MYC", "ENSG00000136997", "NA"),
///     CnvCall::new("BS_2", "CDKN2A", "ENSG00000147889", "loss"),
/// ];
///
/// let records = join_variants(calls, &catalog).unwrap();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].participant_id(), "PT_1");
/// ```
pub fn join_variants<I: IntoIterator<Item = CnvCall>>(
    calls: I,
    catalog: &SampleCatalog,
) -> CnvResult<Vec<VariantRecord>> {
    let mut records = Vec::new();
    let mut non_qualifying = 0usize;
    let mut unknown_cancer_group = 0usize;

    for call in calls {
        let Ok(status) = VariantStatus::try_from(call.status.as_str()) else {
            non_qualifying += 1;
            continue;
        };

        let Some(sample) = catalog.get(&call.biospecimen_id) else {
            return Err(CnvError::MissingMetadata(call.biospecimen_id));
        };

        if sample.sample_type() != TUMOR_SAMPLE_TYPE {
            return Err(CnvError::NonTumorSample {
                biospecimen: call.biospecimen_id,
                sample_type: sample.sample_type().to_string(),
            });
        }

        if sample.cancer_group() == UNKNOWN_CANCER_GROUP {
            unknown_cancer_group += 1;
            continue;
        }

        if sample.cancer_group().is_empty() {
            return Err(CnvError::InvalidInput(format!(
                "biospecimen {} has an empty cancer_group",
                call.biospecimen_id
            )));
        }

        if sample.cohort() == ALL_COHORTS {
            return Err(CnvError::InvalidInput(format!(
                "biospecimen {} belongs to cohort {}, which is reserved",
                call.biospecimen_id, ALL_COHORTS
            )));
        }

        records.push(VariantRecord {
            participant_id: sample.participant_id().to_string(),
            cohort: sample.cohort().to_string(),
            cancer_group: sample.cancer_group().to_string(),
            biospecimen_id: call.biospecimen_id,
            gene_symbol: call.gene_symbol,
            gene_id: call.gene_id,
            status,
            copy_number: call.copy_number,
            ploidy: call.ploidy,
        });
    }

    debug!(
        "Discarded {} calls with non-qualifying status and {} calls of unknown cancer group",
        non_qualifying, unknown_cancer_group
    );

    if records.is_empty() {
        return Err(CnvError::NoVariants);
    }
    info!("Joined {} variant records", records.len());
    Ok(records)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::catalog::{SampleMetadata, SelectionSets};

    fn catalog() -> SampleCatalog {
        SampleCatalog::new(
            [
                SampleMetadata::new("BS_1", "PT_1", "PBTA", "Ependymoma", "Tumor"),
                SampleMetadata::new("BS_2", "PT_2", "GMKF", "Neuroblastoma", "Tumor"),
                SampleMetadata::new("BS_3", "PT_3", "PBTA", "NA", "Tumor"),
                SampleMetadata::new("BS_4", "PT_4", "PBTA", "", "Tumor"),
                SampleMetadata::new("BS_N", "PT_1", "PBTA", "Ependymoma", "Normal"),
                SampleMetadata::new("BS_A", "PT_A", "all_cohorts", "Ependymoma", "Tumor"),
            ],
            SelectionSets::default(),
        )
    }

    #[test]
    fn joins_metadata() {
        let calls = vec![
            CnvCall::from_parts(
                "BS_2".to_string(),
                Some("MYCN".to_string()),
                Some("ENSG00000134323".to_string()),
                "amplification".to_string(),
                "12".to_string(),
                "2".to_string(),
            ),
            CnvCall::new("BS_1", "CDKN2A", "ENSG00000147889", "loss"),
        ];
        let records = join_variants(calls, &catalog()).unwrap();
        assert_eq!(records.len(), 2);

        let mycn = &records[0];
        assert_eq!(mycn.biospecimen_id(), "BS_2");
        assert_eq!(mycn.participant_id(), "PT_2");
        assert_eq!(mycn.cohort(), "GMKF");
        assert_eq!(mycn.cancer_group(), "Neuroblastoma");
        assert_eq!(mycn.gene_symbol(), Some("MYCN"));
        assert_eq!(mycn.gene_id(), Some("ENSG00000134323"));
        assert_eq!(mycn.status(), VariantStatus::Amplification);
        assert_eq!(mycn.copy_number(), "12");
        assert_eq!(mycn.ploidy(), "2");
    }

    #[test]
    fn drops_unknown_cancer_group() {
        let calls = vec![
            CnvCall::new("BS_1", "CDKN2A", "ENSG00000147889", "loss"),
            CnvCall::new("BS_3", "CDKN2A", "ENSG00000147889", "loss"),
        ];
        let records = join_variants(calls, &catalog()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].biospecimen_id(), "BS_1");
    }

    #[test]
    fn empty_cancer_group_is_fatal() {
        let calls = vec![
            CnvCall::new("BS_1", "CDKN2A", "ENSG00000147889", "loss"),
            CnvCall::new("BS_4", "CDKN2A", "ENSG00000147889", "loss"),
        ];
        match join_variants(calls, &catalog()) {
            Err(CnvError::InvalidInput(msg)) => assert!(msg.contains("BS_4")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn reserved_cohort_name_is_fatal() {
        let calls = vec![CnvCall::new("BS_A", "CDKN2A", "ENSG00000147889", "loss")];
        match join_variants(calls, &catalog()) {
            Err(CnvError::InvalidInput(msg)) => {
                assert!(msg.contains("BS_A"));
                assert!(msg.contains("all_cohorts"));
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn drops_non_qualifying_status() {
        let calls = vec![
            CnvCall::new("BS_1", "CDKN2A", "ENSG00000147889", "NA"),
            CnvCall::new("BS_1", "CDKN2A", "ENSG00000147889", "gain"),
        ];
        let records = join_variants(calls, &catalog()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status(), VariantStatus::Gain);
    }

    #[test]
    fn non_tumor_sample_is_fatal() {
        let calls = vec![
            CnvCall::new("BS_1", "CDKN2A", "ENSG00000147889", "loss"),
            CnvCall::new("BS_N", "CDKN2A", "ENSG00000147889", "loss"),
        ];
        match join_variants(calls, &catalog()) {
            Err(CnvError::NonTumorSample {
                biospecimen,
                sample_type,
            }) => {
                assert_eq!(biospecimen, "BS_N");
                assert_eq!(sample_type, "Normal");
            }
            other => panic!("expected NonTumorSample, got {other:?}"),
        }
    }

    #[test]
    fn non_tumor_sample_with_non_qualifying_status_is_ignored() {
        let calls = vec![
            CnvCall::new("BS_1", "CDKN2A", "ENSG00000147889", "loss"),
            CnvCall::new("BS_N", "CDKN2A", "ENSG00000147889", "NA"),
        ];
        assert!(join_variants(calls, &catalog()).is_ok());
    }

    #[test]
    fn unknown_biospecimen_is_fatal() {
        let calls = vec![CnvCall::new("BS_X", "CDKN2A", "ENSG00000147889", "loss")];
        assert!(matches!(
            join_variants(calls, &catalog()),
            Err(CnvError::MissingMetadata(id)) if id == "BS_X"
        ));
    }

    #[test]
    fn empty_join_is_fatal() {
        let calls = vec![CnvCall::new("BS_3", "CDKN2A", "ENSG00000147889", "loss")];
        assert!(matches!(
            join_variants(calls, &catalog()),
            Err(CnvError::NoVariants)
        ));
    }
}
