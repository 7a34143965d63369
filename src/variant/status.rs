use std::convert::TryFrom;
use std::fmt::Display;

use crate::CnvError;

/// The copy number status of a gene in a biospecimen
///
/// Only these five values are considered qualifying calls. Every other status
/// in the consensus file (e.g. missing values) is discarded during the join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VariantStatus {
    /// Copy number above ploidy
    Gain,
    /// Copy number equal to ploidy
    Neutral,
    /// Copy number below ploidy
    Loss,
    /// Homozygous deletion
    DeepDeletion,
    /// High level copy number gain
    Amplification,
}

impl VariantStatus {
    /// All qualifying statuses
    pub const ALL: [VariantStatus; 5] = [
        VariantStatus::Gain,
        VariantStatus::Neutral,
        VariantStatus::Loss,
        VariantStatus::DeepDeletion,
        VariantStatus::Amplification,
    ];

    /// The status as written in the consensus file
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantStatus::Gain => "gain",
            VariantStatus::Neutral => "neutral",
            VariantStatus::Loss => "loss",
            VariantStatus::DeepDeletion => "deep deletion",
            VariantStatus::Amplification => "amplification",
        }
    }
}

impl TryFrom<&str> for VariantStatus {
    type Error = CnvError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "gain" => Ok(VariantStatus::Gain),
            "neutral" => Ok(VariantStatus::Neutral),
            "loss" => Ok(VariantStatus::Loss),
            "deep deletion" => Ok(VariantStatus::DeepDeletion),
            "amplification" => Ok(VariantStatus::Amplification),
            _ => Err(CnvError::InvalidInput(format!(
                "unknown copy number status {value}"
            ))),
        }
    }
}

impl Display for VariantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
