//! Writing the frequency tables
//!
//! The pipeline writes three files:
//!
//! 1. The merged frequency table, before annotation ([`write_frequency_table`])
//! 2. The annotated table, rewritten for the Open Targets schema ([`finalize_annotated`])
//! 3. A JSON Lines copy of the annotated table ([`Table::write_jsonl`])

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;
use uuid::Uuid;

use crate::merge::MergedRow;
use crate::utils::{tsv_reader, tsv_writer};
use crate::{CnvError, CnvResult, ALL_COHORTS};

/// Columns of the frequency table before annotation
pub const FREQUENCY_COLUMNS: [&str; 12] = [
    "Gene_symbol",
    "Gene_Ensembl_ID",
    "Variant_type",
    "Variant_category",
    "Dataset",
    "Disease",
    "Total_alterations_over_subjects_in_dataset",
    "Frequency_in_overall_dataset",
    "Total_primary_tumors_mutated_over_primary_tumors_in_dataset",
    "Frequency_in_primary_tumors",
    "Total_relapse_tumors_mutated_over_relapse_tumors_in_dataset",
    "Frequency_in_relapse_tumors",
];

/// Display label of the synthetic cohort in the annotated table
pub const ALL_COHORTS_LABEL: &str = "All Cohorts";

/// Writes `contents` to a sibling temporary file and moves it to `path`
fn write_atomic<P, F>(path: P, contents: F) -> CnvResult<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<File>) -> CnvResult<()>,
{
    let path = path.as_ref();
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let result = File::create(&tmp)
        .map_err(CnvError::from)
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            contents(&mut writer)?;
            writer.flush()?;
            Ok(())
        })
        .and_then(|()| fs::rename(&tmp, path).map_err(CnvError::from));

    if result.is_err() {
        // the temporary file may not exist
        let _ = fs::remove_file(&tmp);
    }
    result
}

/// Writes the merged rows as the pre-annotation frequency table
///
/// `Variant_category` is written as an empty column, it is filled by the annotator.
///
/// # Examples
///
/// ```
/// use cnv_frequencies::output::write_frequency_table;
/// use cnv_frequencies::{compute_frequencies, CnvCall, SampleCatalog, SampleMetadata, SelectionSets};
///
/// let mut samples = Vec::new();
/// let mut calls = Vec::new();
/// for i in 0..4 {
///     let bs_id = format!("BS_{i}");
///     samples.push(SampleMetadata::new(&bs_id, &format!("PT_{i}"), "PBTA", "Neuroblastoma", "Tumor"));
///     calls.push(CnvCall::new(&bs_id, "MYCN", "ENSG00000134323", "amplification"));
/// }
/// let catalog = SampleCatalog::new(samples, SelectionSets::default());
/// let rows = compute_frequencies(&catalog, calls, 3).unwrap();
///
/// let mut buffer = Vec::new();
/// write_frequency_table(&rows, &mut buffer).unwrap();
/// let table = String::from_utf8(buffer).unwrap();
/// assert_eq!(
///     table.lines().nth(1).unwrap(),
///     "MYCN\tENSG00000134323\tamplification\t\tPBTA\tNeuroblastoma\t4/4\t100.00%\t0/0\t0.00%\t0/0\t0.00%"
/// );
/// ```
///
/// # Errors
///
/// [`CnvError::Csv`] if the output cannot be written
pub fn write_frequency_table<W: Write>(rows: &[MergedRow], writer: W) -> CnvResult<()> {
    let mut writer = tsv_writer(writer);
    writer.write_record(FREQUENCY_COLUMNS)?;
    for row in rows {
        let mut record: Vec<String> = vec![
            row.gene_symbol().to_string(),
            row.gene_id().to_string(),
            row.variant_type().to_string(),
            String::new(),
            row.dataset().to_string(),
            row.disease().to_string(),
        ];
        for fraction in [row.overall(), row.primary(), row.relapse()] {
            record.push(fraction.to_string());
            record.push(fraction.percentage());
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the pre-annotation frequency table to `path`
///
/// # Errors
///
/// [`CnvError::Io`] or [`CnvError::Csv`] if the file cannot be written
pub fn write_frequency_table_file<P: AsRef<Path>>(rows: &[MergedRow], path: P) -> CnvResult<()> {
    write_atomic(&path, |writer| write_frequency_table(rows, writer))?;
    debug!("Wrote {} rows to {}", rows.len(), path.as_ref().display());
    Ok(())
}

/// A tab separated table with a header, all cells kept as text
///
/// # Examples
///
/// ```
/// use cnv_frequencies::output::Table;
///
/// let mut table = Table::from_reader("A\tB\n1\t2\n".as_bytes(), "input").unwrap();
/// table.rename_column("A", "C");
/// table.append_column("D", |_| "x".to_string());
///
/// assert_eq!(table.headers(), ["C", "B", "D"]);
/// assert_eq!(table.cell(0, "D"), Some("x"));
///
/// let mut jsonl = Vec::new();
/// table.write_jsonl(&mut jsonl).unwrap();
/// assert_eq!(String::from_utf8(jsonl).unwrap(), "{\"C\":\"1\",\"B\":\"2\",\"D\":\"x\"}\n");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Parses a table from any reader
    ///
    /// `source` is only used in error messages.
    ///
    /// # Errors
    ///
    /// - [`CnvError::InvalidInput`]: The input does not contain a header
    /// - [`CnvError::Csv`]: A row cannot be parsed or has the wrong number of cells
    pub fn from_reader<R: Read>(reader: R, source: &str) -> CnvResult<Self> {
        let mut reader = tsv_reader(reader);
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() {
            return Err(CnvError::InvalidInput(format!("{source} has no header")));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok(Self { headers, rows })
    }

    /// Reads a table from a file
    ///
    /// # Errors
    ///
    /// - [`CnvError::CannotOpenFile`]: The file is not present or can't be opened
    /// - see [`Table::from_reader`]
    pub fn read<P: AsRef<Path>>(path: P) -> CnvResult<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).map_err(|_| CnvError::CannotOpenFile(path.display().to_string()))?;
        Self::from_reader(file, &path.display().to_string())
    }

    /// The column names
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// All rows
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows, without the header
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The index of the column `name`
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// The value of column `name` in row `row`
    pub fn cell(&self, row: usize, name: &str) -> Option<&str> {
        let idx = self.column(name)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }

    /// Renames the column `from` to `to`
    ///
    /// Returns `false` if there is no column `from`.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.column(from) {
            Some(idx) => {
                self.headers[idx] = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Adds a column at the end, `value` is called with the index of every row
    pub fn append_column<F: FnMut(usize) -> String>(&mut self, name: &str, mut value: F) {
        self.headers.push(name.to_string());
        for (idx, row) in self.rows.iter_mut().enumerate() {
            row.push(value(idx));
        }
    }

    /// Replaces every cell of `column` that equals `from` by `to`
    ///
    /// Returns the number of replaced cells, `None` if there is no column `column`.
    pub fn replace_values(&mut self, column: &str, from: &str, to: &str) -> Option<usize> {
        let idx = self.column(column)?;
        let mut replaced = 0;
        for row in &mut self.rows {
            if let Some(cell) = row.get_mut(idx) {
                if cell == from {
                    *cell = to.to_string();
                    replaced += 1;
                }
            }
        }
        Some(replaced)
    }

    /// Writes the table as TSV
    ///
    /// # Errors
    ///
    /// [`CnvError::Csv`] if the output cannot be written
    pub fn write_tsv<W: Write>(&self, writer: W) -> CnvResult<()> {
        let mut writer = tsv_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Writes every row as one JSON object per line, keys in column order
    ///
    /// # Errors
    ///
    /// [`CnvError::Json`] or [`CnvError::Io`] if the output cannot be written
    pub fn write_jsonl<W: Write>(&self, mut writer: W) -> CnvResult<()> {
        for row in &self.rows {
            serde_json::to_writer(
                &mut writer,
                &JsonRow {
                    headers: &self.headers,
                    cells: row,
                },
            )?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Writes the table as TSV to `path`
    ///
    /// # Errors
    ///
    /// [`CnvError::Io`] or [`CnvError::Csv`] if the file cannot be written
    pub fn write_tsv_file<P: AsRef<Path>>(&self, path: P) -> CnvResult<()> {
        write_atomic(path, |writer| self.write_tsv(writer))
    }

    /// Writes the table as JSON Lines to `path`
    ///
    /// # Errors
    ///
    /// [`CnvError::Io`] or [`CnvError::Json`] if the file cannot be written
    pub fn write_jsonl_file<P: AsRef<Path>>(&self, path: P) -> CnvResult<()> {
        write_atomic(path, |writer| self.write_jsonl(writer))
    }
}

/// One table row, serialized as a map in column order
struct JsonRow<'a> {
    headers: &'a [String],
    cells: &'a [String],
}

impl Serialize for JsonRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.headers.len()))?;
        for (header, cell) in self.headers.iter().zip(self.cells) {
            map.serialize_entry(header, cell)?;
        }
        map.end()
    }
}

/// Rewrites the annotated table for the Open Targets schema
///
/// - `Gene_Ensembl_ID` is renamed to `targetFromSourceId`
/// - `EFO` is renamed to `diseaseFromSourceMappedId`
/// - `datatypeId`, `chop_uuid` and `datasourceId` are appended, in that order.
///   Every row receives a new random UUID
/// - `all_cohorts` in `Dataset` is relabeled to `All Cohorts`
///
/// # Errors
///
/// [`CnvError::MissingColumn`] if the table does not contain one of the
/// columns `Gene_Ensembl_ID`, `EFO` or `Dataset`
pub fn finalize_annotated(table: &mut Table, source: &str) -> CnvResult<()> {
    for column in ["Gene_Ensembl_ID", "EFO", "Dataset"] {
        if table.column(column).is_none() {
            return Err(CnvError::MissingColumn {
                file: source.to_string(),
                column: column.to_string(),
            });
        }
    }

    table.rename_column("Gene_Ensembl_ID", "targetFromSourceId");
    table.rename_column("EFO", "diseaseFromSourceMappedId");
    table.append_column("datatypeId", |_| "somatic_mutation".to_string());
    table.append_column("chop_uuid", |_| Uuid::new_v4().to_string());
    table.append_column("datasourceId", |_| "chop_gene_level_cnv".to_string());
    let relabeled = table
        .replace_values("Dataset", ALL_COHORTS, ALL_COHORTS_LABEL)
        .unwrap_or_default();
    debug!("Relabeled {} {} rows", relabeled, ALL_COHORTS);
    Ok(())
}
