use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

use cnv_frequencies::annotator::Annotator;
use cnv_frequencies::{CnvError, CnvResult, InputFiles, Pipeline, PipelineConfig};

const HISTOLOGY: &str = "Kids_First_Biospecimen_ID\tKids_First_Participant_ID\tsample_type\tcohort\tcancer_group\tbroad_histology\n\
BS_1\tPT_1\tTumor\tPBTA\tNeuroblastoma\tEmbryonal tumor\n\
BS_2\tPT_2\tTumor\tPBTA\tNeuroblastoma\tEmbryonal tumor\n\
BS_3\tPT_3\tTumor\tPBTA\tNeuroblastoma\tEmbryonal tumor\n\
BS_4\tPT_4\tTumor\tPBTA\tNeuroblastoma\tEmbryonal tumor\n\
BS_5\tPT_5\tTumor\tGMKF\tNeuroblastoma\tEmbryonal tumor\n\
BS_6\tPT_6\tTumor\tGMKF\tNeuroblastoma\tEmbryonal tumor\n\
BS_7\tPT_7\tTumor\tPBTA\tEpendymoma\tEpendymal tumor\n\
BS_8\tPT_8\tTumor\tPBTA\tEpendymoma\tEpendymal tumor\n\
BS_9\tPT_9\tTumor\tPBTA\tEpendymoma\tEpendymal tumor\n\
BS_10\tPT_10\tTumor\tPBTA\tNA\tNA\n\
BS_N\tPT_1\tNormal\tPBTA\tNA\tNormal\n";

const CNV: &str = "biospecimen_id\tstatus\tcopy_number\tploidy\tensembl\tgene_symbol\tcytoband\n\
BS_1\tamplification\t12\t2\tENSG00000134323\tMYCN\t2p24.3\n\
BS_2\tamplification\t10\t2\tENSG00000134323\tMYCN\t2p24.3\n\
BS_5\tamplification\t9\t2\tENSG00000134323\tMYCN\t2p24.3\n\
BS_3\tgain\t3\t2\tENSG00000134323\tMYCN\t2p24.3\n\
BS_4\tloss\t1\t2\tENSG00000147889\tCDKN2A\t9p21.3\n\
BS_6\tloss\t1\t2\tENSG00000147889\tCDKN2A\t9p21.3\n\
BS_7\tloss\t1\t2\tENSG00000147889\tCDKN2A\t9p21.3\n\
BS_8\tloss\t1\t2\tENSG00000147889\tCDKN2A\t9p21.3\n\
BS_9\tloss\t1\t2\tENSG00000147889\tCDKN2A\t9p21.3\n\
BS_10\tloss\t1\t2\tENSG00000147889\tCDKN2A\t9p21.3\n";

const ALL_COHORTS_PRIMARY: &str = "Kids_First_Participant_ID\tKids_First_Biospecimen_ID\n\
PT_1\tBS_1\nPT_3\tBS_3\nPT_5\tBS_5\nPT_7\tBS_7\n";
const ALL_COHORTS_RELAPSE: &str = "Kids_First_Participant_ID\tKids_First_Biospecimen_ID\n\
PT_2\tBS_2\n";
const EACH_COHORT_PRIMARY: &str = "Kids_First_Participant_ID\tKids_First_Biospecimen_ID\n\
PT_1\tBS_1\nPT_3\tBS_3\nPT_5\tBS_5\nPT_6\tBS_6\nPT_7\tBS_7\n";
const EACH_COHORT_RELAPSE: &str = "Kids_First_Participant_ID\tKids_First_Biospecimen_ID\n\
PT_2\tBS_2\n";

/// Appends fixed annotation columns to every row
struct StubAnnotator;

impl Annotator for StubAnnotator {
    fn annotate(&self, input: &Path, output: &Path) -> CnvResult<()> {
        let table = fs::read_to_string(input)?;
        let mut annotated = String::new();
        for (idx, line) in table.lines().enumerate() {
            annotated.push_str(line);
            if idx == 0 {
                annotated.push_str("\tGene_full_name\tEFO\tMONDO\n");
            } else {
                annotated.push_str("\tfull name\tEFO_0000621\tMONDO_0005072\n");
            }
        }
        fs::write(output, annotated)?;
        Ok(())
    }
}

/// Leaves a partial output behind and fails
struct FailingAnnotator;

impl Annotator for FailingAnnotator {
    fn annotate(&self, _input: &Path, output: &Path) -> CnvResult<()> {
        fs::write(output, "Gene_symbol\n")?;
        Err(CnvError::AnnotationFailed("annotator exited with 1".to_string()))
    }
}

/// Copies the table without adding any annotation columns
struct CopyAnnotator;

impl Annotator for CopyAnnotator {
    fn annotate(&self, input: &Path, output: &Path) -> CnvResult<()> {
        fs::copy(input, output)?;
        Ok(())
    }
}

fn write_inputs(dir: &Path, cnv: &str) -> InputFiles {
    let path = |name: &str| -> PathBuf { dir.join(name) };
    fs::write(path("histologies.tsv"), HISTOLOGY).unwrap();
    fs::write(path("cnv.tsv"), cnv).unwrap();
    fs::write(path("acp.tsv"), ALL_COHORTS_PRIMARY).unwrap();
    fs::write(path("acr.tsv"), ALL_COHORTS_RELAPSE).unwrap();
    fs::write(path("ecp.tsv"), EACH_COHORT_PRIMARY).unwrap();
    fs::write(path("ecr.tsv"), EACH_COHORT_RELAPSE).unwrap();
    InputFiles::new(
        path("histologies.tsv"),
        path("cnv.tsv"),
        path("acp.tsv"),
        path("acr.tsv"),
        path("ecp.tsv"),
        path("ecr.tsv"),
    )
}

fn pipeline<A: Annotator>(dir: &Path, annotator: A) -> Pipeline<A> {
    let config = PipelineConfig::default().with_results_dir(dir.join("results"));
    Pipeline::with_annotator(config, annotator)
}

#[test]
fn frequency_table() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(dir.path(), CNV);
    let pipeline = pipeline(dir.path(), StubAnnotator);
    let rows = pipeline.run(&inputs).unwrap();
    assert_eq!(rows.len(), 6);

    let table = fs::read_to_string(pipeline.config().frequency_table()).unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 7);
    assert_eq!(
        lines[1..],
        [
            "MYCN\tENSG00000134323\tgain\t\tPBTA\tNeuroblastoma\t1/4\t25.00%\t1/2\t50.00%\t0/1\t0.00%",
            "MYCN\tENSG00000134323\tamplification\t\tPBTA\tNeuroblastoma\t2/4\t50.00%\t1/2\t50.00%\t1/1\t100.00%",
            "CDKN2A\tENSG00000147889\tloss\t\tPBTA\tNeuroblastoma\t1/4\t25.00%\t0/2\t0.00%\t0/1\t0.00%",
            "MYCN\tENSG00000134323\tgain\t\tall_cohorts\tNeuroblastoma\t1/6\t16.67%\t1/3\t33.33%\t0/1\t0.00%",
            "MYCN\tENSG00000134323\tamplification\t\tall_cohorts\tNeuroblastoma\t3/6\t50.00%\t2/3\t66.67%\t1/1\t100.00%",
            "CDKN2A\tENSG00000147889\tloss\t\tall_cohorts\tNeuroblastoma\t2/6\t33.33%\t0/3\t0.00%\t0/1\t0.00%",
        ]
    );
}

#[test]
fn small_strata_are_not_reported() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(dir.path(), CNV);
    let rows = pipeline(dir.path(), StubAnnotator).run(&inputs).unwrap();

    // Ependymoma has 3 samples, GMKF Neuroblastoma 2, unknown cancer groups are dropped
    assert!(rows.iter().all(|row| row.disease() == "Neuroblastoma"));
    assert!(rows.iter().all(|row| row.dataset().label() != "GMKF"));
}

#[test]
fn annotated_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(dir.path(), CNV);
    let pipeline = pipeline(dir.path(), StubAnnotator);
    pipeline.run(&inputs).unwrap();

    let annotated = fs::read_to_string(pipeline.config().annotated_table()).unwrap();
    let header: Vec<&str> = annotated.lines().next().unwrap().split('\t').collect();
    assert_eq!(header[1], "targetFromSourceId");
    assert_eq!(header[13], "diseaseFromSourceMappedId");
    assert_eq!(&header[15..], ["datatypeId", "chop_uuid", "datasourceId"]);
    assert_eq!(
        annotated.lines().filter(|line| line.contains("\tAll Cohorts\t")).count(),
        3
    );
    assert!(!annotated.contains("all_cohorts"));

    let jsonl = fs::read_to_string(pipeline.config().annotated_jsonl()).unwrap();
    let lines: Vec<&str> = jsonl.lines().collect();
    assert_eq!(lines.len(), 6);
    assert!(lines[0].starts_with("{\"Gene_symbol\":\"MYCN\",\"targetFromSourceId\":\"ENSG00000134323\""));
    let last: serde_json::Value = serde_json::from_str(lines[5]).unwrap();
    assert_eq!(last["Dataset"], "All Cohorts");
    assert_eq!(last["datasourceId"], "chop_gene_level_cnv");
    assert_eq!(last["Total_alterations_over_subjects_in_dataset"], "2/6");
}

#[test]
fn pre_annotation_table_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(dir.path(), CNV);
    let pipeline = pipeline(dir.path(), StubAnnotator);

    pipeline.run(&inputs).unwrap();
    let first = fs::read(pipeline.config().frequency_table()).unwrap();
    pipeline.run(&inputs).unwrap();
    let second = fs::read(pipeline.config().frequency_table()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn non_tumor_calls_are_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let cnv = format!("{CNV}BS_N\tloss\t1\t2\tENSG00000147889\tCDKN2A\t9p21.3\n");
    let inputs = write_inputs(dir.path(), &cnv);
    let pipeline = pipeline(dir.path(), StubAnnotator);

    match pipeline.run(&inputs) {
        Err(CnvError::NonTumorSample {
            biospecimen,
            sample_type,
        }) => {
            assert_eq!(biospecimen, "BS_N");
            assert_eq!(sample_type, "Normal");
        }
        other => panic!("expected NonTumorSample, got {other:?}"),
    }
    assert!(!pipeline.config().frequency_table().exists());
}

#[test]
fn unknown_biospecimen_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let cnv = format!("{CNV}BS_X\tloss\t1\t2\tENSG00000147889\tCDKN2A\t9p21.3\n");
    let inputs = write_inputs(dir.path(), &cnv);
    assert!(matches!(
        pipeline(dir.path(), StubAnnotator).run(&inputs),
        Err(CnvError::MissingMetadata(id)) if id == "BS_X"
    ));
}

#[test]
fn failed_annotation_keeps_frequency_table() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(dir.path(), CNV);
    let pipeline = pipeline(dir.path(), FailingAnnotator);

    assert!(matches!(
        pipeline.run(&inputs),
        Err(CnvError::AnnotationFailed(_))
    ));
    assert!(pipeline.config().frequency_table().exists());
    assert!(!pipeline.config().annotated_table().exists());
    assert!(!pipeline.config().annotated_jsonl().exists());
}

#[test]
fn incomplete_annotation_removes_annotated_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(dir.path(), CNV);
    let pipeline = pipeline(dir.path(), CopyAnnotator);

    match pipeline.run(&inputs) {
        Err(CnvError::MissingColumn { column, .. }) => assert_eq!(column, "EFO"),
        other => panic!("expected MissingColumn, got {other:?}"),
    }
    assert!(pipeline.config().frequency_table().exists());
    assert!(!pipeline.config().annotated_table().exists());
    assert!(!pipeline.config().annotated_jsonl().exists());
}

#[test]
fn failed_annotation_removes_previous_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(dir.path(), CNV);

    let previous = pipeline(dir.path(), StubAnnotator);
    previous.run(&inputs).unwrap();
    assert!(previous.config().annotated_table().exists());
    assert!(previous.config().annotated_jsonl().exists());

    let pipeline = pipeline(dir.path(), FailingAnnotator);
    assert!(matches!(
        pipeline.run(&inputs),
        Err(CnvError::AnnotationFailed(_))
    ));
    assert!(pipeline.config().frequency_table().exists());
    assert!(!pipeline.config().annotated_table().exists());
    assert!(!pipeline.config().annotated_jsonl().exists());
}

#[test]
fn duplicated_input_rows_are_counted_once() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(dir.path(), CNV);
    let expected = pipeline(dir.path(), StubAnnotator).run(&inputs).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let mut cnv = CNV.to_string();
    cnv.push_str("BS_1\tamplification\t12\t2\tENSG00000134323\tMYCN\t2p24.3\n");
    cnv.push_str("BS_4\tloss\t1\t2\tENSG00000147889\tCDKN2A\t9p21.3\n");
    let inputs = write_inputs(dir.path(), &cnv);
    let mut histology = HISTOLOGY.to_string();
    histology.push_str("BS_2\tPT_2\tTumor\tPBTA\tNeuroblastoma\tEmbryonal tumor\n");
    fs::write(inputs.histology(), histology).unwrap();

    let pipeline = pipeline(dir.path(), StubAnnotator);
    let rows = pipeline.run(&inputs).unwrap();
    assert_eq!(rows, expected);

    let table = fs::read_to_string(pipeline.config().frequency_table()).unwrap();
    assert_eq!(table.lines().count(), 7);
    assert!(table.contains("\tamplification\t\tPBTA\tNeuroblastoma\t2/4\t50.00%\t"));
    assert!(table.contains("\tloss\t\tall_cohorts\tNeuroblastoma\t2/6\t33.33%\t"));
}

#[test]
fn missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(dir.path(), CNV);
    fs::remove_file(dir.path().join("ecr.tsv")).unwrap();
    let pipeline = pipeline(dir.path(), StubAnnotator);
    assert!(matches!(
        pipeline.run(&inputs),
        Err(CnvError::CannotOpenFile(_))
    ));
    assert!(!pipeline.config().results_dir().exists());
}

#[test]
fn gzip_compressed_calls() {
    let dir = tempfile::tempdir().unwrap();
    let plain = write_inputs(dir.path(), CNV);

    let gz_path = dir.path().join("cnv.tsv.gz");
    let mut encoder = GzEncoder::new(fs::File::create(&gz_path).unwrap(), Compression::default());
    encoder.write_all(CNV.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let inputs = InputFiles::new(
        plain.histology().to_path_buf(),
        gz_path,
        dir.path().join("acp.tsv"),
        dir.path().join("acr.tsv"),
        dir.path().join("ecp.tsv"),
        dir.path().join("ecr.tsv"),
    );
    let rows = pipeline(dir.path(), StubAnnotator).run(&inputs).unwrap();
    assert_eq!(rows.len(), 6);
}
