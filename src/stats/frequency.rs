use std::collections::{BTreeMap, HashSet};

use smallvec::SmallVec;

use crate::catalog::SelectionSet;
use crate::stats::{Fraction, View};
use crate::stratum::{Cohort, Stratum};
use crate::variant::{VariantRecord, VariantStatus};

/// The alteration frequency of one gene and variant type in one stratum and view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyRow {
    gene_symbol: String,
    gene_id: String,
    variant_type: VariantStatus,
    dataset: Cohort,
    disease: String,
    fraction: Fraction,
}

impl FrequencyRow {
    /// Constructs a new [`FrequencyRow`]
    pub fn new(
        gene_symbol: &str,
        gene_id: &str,
        variant_type: VariantStatus,
        dataset: Cohort,
        disease: &str,
        fraction: Fraction,
    ) -> Self {
        Self {
            gene_symbol: gene_symbol.to_string(),
            gene_id: gene_id.to_string(),
            variant_type,
            dataset,
            disease: disease.to_string(),
            fraction,
        }
    }

    /// Comma separated list of all gene symbols of the gene ID
    pub fn gene_symbol(&self) -> &str {
        &self.gene_symbol
    }

    /// The Ensembl gene ID
    pub fn gene_id(&self) -> &str {
        &self.gene_id
    }

    /// The copy number status
    pub fn variant_type(&self) -> VariantStatus {
        self.variant_type
    }

    /// The cohort of the stratum
    pub fn dataset(&self) -> &Cohort {
        &self.dataset
    }

    /// The cancer group of the stratum
    pub fn disease(&self) -> &str {
        &self.disease
    }

    /// Altered subjects over all subjects of the view
    pub fn fraction(&self) -> Fraction {
        self.fraction
    }

    /// The formatted percentage of altered subjects
    pub fn percentage(&self) -> String {
        self.fraction.percentage()
    }
}

/// Symbols and altered subjects of one (gene ID, variant type) group
#[derive(Default)]
struct GeneGroup<'a> {
    symbols: SmallVec<[&'a str; 2]>,
    subjects: HashSet<&'a str>,
}

impl<'a> GeneGroup<'a> {
    fn add(&mut self, symbol: Option<&'a str>, subject: &'a str) {
        if let Some(symbol) = symbol {
            if !self.symbols.contains(&symbol) {
                self.symbols.push(symbol);
            }
        }
        self.subjects.insert(subject);
    }

    fn symbols(mut self) -> String {
        self.symbols.sort_unstable();
        self.symbols.join(",")
    }
}

/// Computes the frequencies of a single stratum in a single view
///
/// `selection` restricts the records to the biospecimens of an independent
/// sample selection, `None` uses all records of the stratum.
///
/// Returns an empty `Vec` if no record is left after subsetting. Records without
/// gene ID count towards the denominator, but are not reported as a row.
pub(crate) fn view_frequencies(
    records: &[VariantRecord],
    stratum: &Stratum,
    view: View,
    selection: Option<&SelectionSet>,
) -> Vec<FrequencyRow> {
    let subset: Vec<&VariantRecord> = records
        .iter()
        .filter(|record| stratum.includes(record))
        .filter(|record| selection.map_or(true, |set| set.contains(record.biospecimen_id())))
        .collect();

    if subset.is_empty() {
        return Vec::new();
    }

    let denominator = subset
        .iter()
        .map(|record| view.subject(record))
        .collect::<HashSet<&str>>()
        .len();

    let mut groups: BTreeMap<(&str, VariantStatus), GeneGroup> = BTreeMap::new();
    for &record in &subset {
        let Some(gene_id) = record.gene_id() else {
            continue;
        };
        groups
            .entry((gene_id, record.status()))
            .or_default()
            .add(record.gene_symbol(), view.subject(record));
    }

    groups
        .into_iter()
        .map(|((gene_id, variant_type), group)| {
            let numerator = group.subjects.len();
            FrequencyRow {
                gene_symbol: group.symbols(),
                gene_id: gene_id.to_string(),
                variant_type,
                dataset: stratum.cohort().clone(),
                disease: stratum.cancer_group().to_string(),
                fraction: Fraction::new(numerator, denominator),
            }
        })
        .collect()
}
