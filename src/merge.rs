//! Reconciliation of the three frequency views into one table
//!
//! [`merge_views`] performs a full outer join of the overall, primary and relapse
//! rows on (gene, variant type, dataset, disease). A view without a row for a key
//! is zero-filled against the population size of that view in the stratum.
//!
//! # Population size
//!
//! The population size of a view is recovered as the maximum denominator of all
//! rows of the view that share dataset and disease. This relies on every row of a
//! (dataset, disease, view) being computed over the same sample population, which
//! holds as long as all variant types of a stratum are counted against the same
//! specimens.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use crate::stats::{Fraction, View, ViewFrequencies};
use crate::stratum::Cohort;
use crate::variant::VariantStatus;

/// One line of the frequency table with the fractions of all three views
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRow {
    gene_symbol: String,
    gene_id: String,
    variant_type: VariantStatus,
    dataset: Cohort,
    disease: String,
    fractions: [Fraction; 3],
}

impl MergedRow {
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

    /// The fraction of altered subjects in the given view
    pub fn fraction(&self, view: View) -> Fraction {
        self.fractions[view.index()]
    }

    /// Altered participants over all participants of the stratum
    pub fn overall(&self) -> Fraction {
        self.fraction(View::Overall)
    }

    /// Altered over all independent primary tumors of the stratum
    pub fn primary(&self) -> Fraction {
        self.fraction(View::Primary)
    }

    /// Altered over all independent relapse tumors of the stratum
    pub fn relapse(&self) -> Fraction {
        self.fraction(View::Relapse)
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct MergeKey<'a> {
    disease: &'a str,
    dataset: &'a Cohort,
    gene_id: &'a str,
    variant_type: VariantStatus,
}

#[derive(Default)]
struct PartialRow<'a> {
    symbols: BTreeSet<&'a str>,
    fractions: [Option<Fraction>; 3],
}

/// Outer-joins the frequency views into one row per gene, variant type and stratum
///
/// - The gene symbol is the sorted union of the symbols reported in any view
/// - A fraction that is missing in a view is replaced by `0/n`, where `n` is the
///   largest denominator of that view within the same dataset and disease
///   (`0` if the view has no row for the stratum at all)
/// - Every key is reported exactly once. If a view holds the same key more
///   than once, the first row wins
///
/// Rows are sorted by disease, dataset, gene ID and variant type.
///
/// # Examples
///
/// ```
/// use cnv_frequencies::{merge_views, Cohort, Fraction, FrequencyRow, View, ViewFrequencies};
/// use cnv_frequencies::VariantStatus;
///
/// let row = |gene: &str, fraction: Fraction| {
///     FrequencyRow::new(gene, gene, VariantStatus::Loss, Cohort::real("PBTA"), "Ependymoma", fraction)
/// };
///
/// let mut frequencies = ViewFrequencies::default();
/// frequencies.extend(View::Overall, [row("A", Fraction::new(2, 12)), row("B", Fraction::new(1, 12))]);
/// frequencies.extend(View::Primary, [row("A", Fraction::new(2, 10))]);
///
/// let merged = merge_views(&frequencies);
/// assert_eq!(merged.len(), 2);
/// assert_eq!(merged[1].gene_id(), "B");
/// assert_eq!(merged[1].primary().to_string(), "0/10");
/// assert_eq!(merged[1].primary().percentage(), "0.00%");
/// assert_eq!(merged[1].relapse().to_string(), "0/0");
/// ```
pub fn merge_views(frequencies: &ViewFrequencies) -> Vec<MergedRow> {
    let mut rows: BTreeMap<MergeKey, PartialRow> = BTreeMap::new();
    let mut max_denominators: HashMap<(&Cohort, &str), [usize; 3]> = HashMap::new();
    let mut duplicates = 0usize;

    for view in View::ALL {
        let idx = view.index();
        for row in frequencies.get(view) {
            let key = MergeKey {
                disease: row.disease(),
                dataset: row.dataset(),
                gene_id: row.gene_id(),
                variant_type: row.variant_type(),
            };
            let partial = rows.entry(key).or_default();
            partial.symbols.extend(
                row.gene_symbol()
                    .split(',')
                    .filter(|symbol| !symbol.is_empty()),
            );
            if partial.fractions[idx].is_some() {
                duplicates += 1;
            } else {
                partial.fractions[idx] = Some(row.fraction());
            }

            let max = max_denominators
                .entry((row.dataset(), row.disease()))
                .or_default();
            max[idx] = max[idx].max(row.fraction().denominator());
        }
    }

    if duplicates > 0 {
        debug!("Discarded {} duplicate frequency rows", duplicates);
    }

    rows.into_iter()
        .map(|(key, partial)| {
            let max = max_denominators
                .get(&(key.dataset, key.disease))
                .copied()
                .unwrap_or_default();
            let mut fractions = [Fraction::default(); 3];
            for (idx, fraction) in partial.fractions.into_iter().enumerate() {
                fractions[idx] = fraction.unwrap_or_else(|| Fraction::zero(max[idx]));
            }
            MergedRow {
                gene_symbol: partial.symbols.into_iter().collect::<Vec<_>>().join(","),
                gene_id: key.gene_id.to_string(),
                variant_type: key.variant_type,
                dataset: key.dataset.clone(),
                disease: key.disease.to_string(),
                fractions,
            }
        })
        .collect()
}
