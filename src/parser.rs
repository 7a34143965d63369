//! Parsing the OpenPedCan input tables
//!
//! All inputs are tab-separated files with a header row. Columns that are not
//! needed are ignored, but every required column must be present.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::catalog::{SampleCatalog, SelectionKind, SelectionSets};
use crate::config::InputFiles;
use crate::utils;
use crate::{CnvError, CnvResult};

/// Opens a file for reading, decompressing it if the name ends in `.gz`
fn open<P: AsRef<Path>>(path: P) -> CnvResult<Box<dyn Read>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|_| CnvError::CannotOpenFile(path.display().to_string()))?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(MultiGzDecoder::new(BufReader::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Creates a TSV reader and checks that the header contains all `required` columns
///
/// `source` is only used in error messages.
fn tsv_reader<R: Read>(reader: R, source: &str, required: &[&str]) -> CnvResult<csv::Reader<R>> {
    let mut reader = utils::tsv_reader(reader);

    let headers = reader.headers()?;
    for column in required {
        if !headers.iter().any(|header| header == *column) {
            return Err(CnvError::MissingColumn {
                file: source.to_string(),
                column: (*column).to_string(),
            });
        }
    }
    Ok(reader)
}

/// Module to parse the histology file (`histologies.tsv`)
///
/// ```text
/// Kids_First_Biospecimen_ID  Kids_First_Participant_ID  sample_type  cohort  cancer_group  ...
/// BS_00005DAY                PT_SRG8TGE4                Tumor        PBTA    Ependymoma    ...
/// ```
///
/// Values are kept verbatim, `NA` is not treated as a missing value.
pub mod histology {
    use std::io::Read;
    use std::path::Path;

    use serde::Deserialize;

    use crate::catalog::SampleMetadata;
    use crate::CnvResult;

    const REQUIRED: [&str; 5] = [
        "Kids_First_Biospecimen_ID",
        "Kids_First_Participant_ID",
        "cohort",
        "cancer_group",
        "sample_type",
    ];

    #[derive(Deserialize)]
    struct Row {
        #[serde(rename = "Kids_First_Biospecimen_ID")]
        biospecimen_id: String,
        #[serde(rename = "Kids_First_Participant_ID")]
        participant_id: String,
        cohort: String,
        cancer_group: String,
        sample_type: String,
    }

    /// Parses the histology data from any reader
    ///
    /// # Errors
    ///
    /// - [`CnvError::MissingColumn`](crate::CnvError::MissingColumn): A required column is missing
    /// - [`CnvError::Csv`](crate::CnvError::Csv): A row cannot be parsed
    pub fn from_reader<R: Read>(reader: R, source: &str) -> CnvResult<Vec<SampleMetadata>> {
        let mut reader = super::tsv_reader(reader, source, &REQUIRED)?;
        let mut samples = Vec::new();
        for row in reader.deserialize() {
            let row: Row = row?;
            samples.push(SampleMetadata::new(
                &row.biospecimen_id,
                &row.participant_id,
                &row.cohort,
                &row.cancer_group,
                &row.sample_type,
            ));
        }
        Ok(samples)
    }

    /// Parses the histology file
    ///
    /// # Errors
    ///
    /// - [`CnvError::CannotOpenFile`](crate::CnvError::CannotOpenFile): The file is not present or can't be opened
    /// - see [`from_reader`]
    pub fn read<P: AsRef<Path>>(path: P) -> CnvResult<Vec<SampleMetadata>> {
        let source = path.as_ref().display().to_string();
        from_reader(super::open(path)?, &source)
    }

}

/// Module to parse the consensus CNV file (`consensus_wgs_plus_cnvkit_wxs.tsv.gz`)
///
/// ```text
/// biospecimen_id  status  copy_number  ploidy  ensembl          gene_symbol  cytoband
/// BS_00005DAY     loss    1            2       ENSG00000147889  CDKN2A       9p21.3
/// ```
///
/// `NA` or empty values in `ensembl` and `gene_symbol` are missing values.
pub mod cnv_consensus {
    use std::io::Read;
    use std::path::Path;

    use serde::Deserialize;

    use crate::variant::CnvCall;
    use crate::CnvResult;

    const REQUIRED: [&str; 6] = [
        "biospecimen_id",
        "gene_symbol",
        "ensembl",
        "status",
        "copy_number",
        "ploidy",
    ];

    #[derive(Deserialize)]
    struct Row {
        biospecimen_id: String,
        gene_symbol: String,
        ensembl: String,
        status: String,
        copy_number: String,
        ploidy: String,
    }

    fn optional(value: String) -> Option<String> {
        if value.is_empty() || value == "NA" {
            None
        } else {
            Some(value)
        }
    }

    /// Parses the consensus CNV calls from any reader
    ///
    /// # Errors
    ///
    /// - [`CnvError::MissingColumn`](crate::CnvError::MissingColumn): A required column is missing
    /// - [`CnvError::Csv`](crate::CnvError::Csv): A row cannot be parsed
    pub fn from_reader<R: Read>(reader: R, source: &str) -> CnvResult<Vec<CnvCall>> {
        let mut reader = super::tsv_reader(reader, source, &REQUIRED)?;
        let mut calls = Vec::new();
        for row in reader.deserialize() {
            let row: Row = row?;
            calls.push(CnvCall::from_parts(
                row.biospecimen_id,
                optional(row.gene_symbol),
                optional(row.ensembl),
                row.status,
                row.copy_number,
                row.ploidy,
            ));
        }
        Ok(calls)
    }

    /// Parses the consensus CNV file, gzip compressed or plain
    ///
    /// # Errors
    ///
    /// - [`CnvError::CannotOpenFile`](crate::CnvError::CannotOpenFile): The file is not present or can't be opened
    /// - see [`from_reader`]
    pub fn read<P: AsRef<Path>>(path: P) -> CnvResult<Vec<CnvCall>> {
        let source = path.as_ref().display().to_string();
        from_reader(super::open(path)?, &source)
    }

}

/// Module to parse the independent specimen lists
///
/// ```text
/// Kids_First_Participant_ID  Kids_First_Biospecimen_ID  cohort  ...
/// PT_SRG8TGE4                BS_00005DAY                PBTA    ...
/// ```
pub mod independent_specimens {
    use std::io::Read;
    use std::path::Path;

    use crate::catalog::{SelectionKind, SelectionSet};
    use crate::{CnvError, CnvResult};

    const BIOSPECIMEN_COLUMN: &str = "Kids_First_Biospecimen_ID";

    /// Parses an independent specimen list from any reader
    ///
    /// # Errors
    ///
    /// - [`CnvError::MissingColumn`](crate::CnvError::MissingColumn): The biospecimen column is missing
    /// - [`CnvError::Csv`](crate::CnvError::Csv): A row cannot be parsed
    pub fn from_reader<R: Read>(
        reader: R,
        source: &str,
        kind: SelectionKind,
    ) -> CnvResult<SelectionSet> {
        let mut reader = super::tsv_reader(reader, source, &[BIOSPECIMEN_COLUMN])?;
        let idx = reader
            .headers()?
            .iter()
            .position(|header| header == BIOSPECIMEN_COLUMN)
            .ok_or_else(|| CnvError::MissingColumn {
                file: source.to_string(),
                column: BIOSPECIMEN_COLUMN.to_string(),
            })?;

        let mut ids = Vec::new();
        for record in reader.records() {
            let record = record?;
            if let Some(id) = record.get(idx) {
                ids.push(id.to_string());
            }
        }
        Ok(SelectionSet::new(kind, ids))
    }

    /// Parses an independent specimen file
    ///
    /// # Errors
    ///
    /// - [`CnvError::CannotOpenFile`](crate::CnvError::CannotOpenFile): The file is not present or can't be opened
    /// - see [`from_reader`]
    pub fn read<P: AsRef<Path>>(path: P, kind: SelectionKind) -> CnvResult<SelectionSet> {
        let source = path.as_ref().display().to_string();
        from_reader(super::open(path)?, &source, kind)
    }

}

/// Loads the histology file and the four independent specimen lists into a [`SampleCatalog`]
///
/// # Errors
///
/// Any error of [`histology::read`] or [`independent_specimens::read`]
pub fn load_catalog(inputs: &InputFiles) -> CnvResult<SampleCatalog> {
    let samples = histology::read(inputs.histology())?;
    let mut selections = SelectionSets::default();
    for kind in SelectionKind::ALL {
        selections.insert(independent_specimens::read(inputs.selection(kind), kind)?);
    }
    Ok(SampleCatalog::new(samples, selections))
}
