//! Integration tests for the full decode -> assemble -> project -> write
//! pipeline, driving the library the way the CLI does.

use hl7v2_processor::assembler::parse_messages;
use hl7v2_processor::codec::{decode_field, encode_field};
use hl7v2_processor::models::{FieldValue, SegmentGroup};
use hl7v2_processor::processor::BatchProcessor;
use hl7v2_processor::projector::{Projector, SegmentSchema};

use polars::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const BLOB: &str = "MSH|^~\\&|SendApp|SendFac|RecvApp|RecvFac|202401011200||ADT^A01|MSG001|P|2.5\r\n\
                    EVN|A01|202401011200\r\n\
                    PID|1||12345^^^HospitalA||Doe^John||19800101|M\r\n\
                    PV1|1|I|ICU^101^1^HospitalA~ER^102^2^HospitalB\r\n\
                    OBX|1|NM|GLU^Glucose^LN||98|mg/dL\r\n\
                    OBX|2|NM|HGB^Hemoglobin^LN||13.2|g/dL\r\n\
                    MSH|^~\\&|SendApp|SendFac|RecvApp|RecvFac|202401011230||ORU^R01|MSG002|P|2.5\r\n\
                    PID|1||67890^^^HospitalB||Smith^Jane\r\n\
                    OBX|1|ST|DX^ICD&250.00&I9||Diabetes";

const SCHEMA_JSON: &str = r#"{
    "MSH": ["9", "10"],
    "PID": ["3", "5", "7", "8"],
    "PV1": ["2", "3"],
    "OBX": ["2", "3", "5"]
}"#;

fn write_fixture(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let input = dir.join("messages");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("batch.hl7"), BLOB).unwrap();

    let schema = dir.join("hl7_segment_schema.json");
    fs::write(&schema, SCHEMA_JSON).unwrap();

    (input, schema)
}

fn read_table(output: &Path, segment: &str) -> DataFrame {
    let partition = output.join(format!("segment={}", segment));
    let file = fs::read_dir(partition)
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();
    // Polars' collect blocks on its own tokio runtime, which panics when
    // invoked from inside the #[tokio::test] runtime; read on a plain
    // OS thread instead.
    std::thread::scope(|scope| {
        scope
            .spawn(|| {
                LazyFrame::scan_parquet(&file, Default::default())
                    .unwrap()
                    .collect()
                    .unwrap()
            })
            .join()
            .unwrap()
    })
}

fn str_cell(df: &DataFrame, column: &str, row: usize) -> Option<String> {
    df.column(column)
        .unwrap()
        .str()
        .unwrap()
        .get(row)
        .map(str::to_string)
}

#[test]
fn test_blob_parses_into_structured_messages() {
    let messages = parse_messages(BLOB);
    assert_eq!(messages.len(), 2);

    // First message: two OBX occurrences stay an ordered sequence.
    match messages[0].get("OBX") {
        Some(SegmentGroup::Many(segments)) => assert_eq!(segments.len(), 2),
        other => panic!("expected two OBX segments, got {:?}", other),
    }

    // Second message: one OBX occurrence collapses to a bare segment.
    match messages[1].get("OBX") {
        Some(SegmentGroup::One(_)) => {}
        other => panic!("expected single OBX segment, got {:?}", other),
    }

    // Header offset: MSH-1 is the field separator, MSH-2 the encoding
    // characters verbatim, MSH-3 the first real token.
    let msh = &messages[0].get("MSH").unwrap().normalize()[0];
    assert_eq!(msh.field("1"), Some(&FieldValue::Scalar("|".to_string())));
    assert_eq!(
        msh.field("2"),
        Some(&FieldValue::Scalar("^~\\&".to_string()))
    );
    assert_eq!(
        msh.field("3"),
        Some(&FieldValue::Scalar("SendApp".to_string()))
    );
}

#[test]
fn test_every_field_in_blob_round_trips() {
    for line in BLOB.split("\r\n") {
        let tokens: Vec<&str> = line.split('|').collect();
        let start = if tokens[0] == "MSH" { 2 } else { 1 };
        for token in &tokens[start..] {
            assert_eq!(
                encode_field(&decode_field(token)),
                *token,
                "round trip failed for {token:?}"
            );
        }
    }
}

#[test]
fn test_projection_correlates_rows_per_message() {
    let schema: SegmentSchema = serde_json::from_str(SCHEMA_JSON).unwrap();
    let projector = Projector::new(schema);
    let tables = projector.project(&parse_messages(BLOB));

    // EVN is not in the schema: no table, no error.
    assert!(!tables.contains_key("EVN"));

    let obx_keys: Vec<&str> = tables["OBX"]
        .iter()
        .map(|row| row.message_control_id.as_str())
        .collect();
    assert_eq!(obx_keys, vec!["MSG001", "MSG001", "MSG002"]);
}

#[tokio::test]
async fn test_end_to_end_parquet_output() {
    let work_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let (input, schema_path) = write_fixture(work_dir.path());

    let schema = SegmentSchema::from_file(&schema_path).unwrap();
    let processor = BatchProcessor::new(input, output_dir.path().to_path_buf(), schema).unwrap();

    let stats = processor.process(&CancellationToken::new()).await.unwrap();

    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.messages_parsed, 2);
    assert_eq!(stats.tables_written, 4);
    // MSH x2, PID x2, PV1 x1, OBX x3.
    assert_eq!(stats.rows_written, 8);

    // Correlation keys tie rows back to their source messages.
    let pid = read_table(output_dir.path(), "PID");
    assert_eq!(pid.height(), 2);
    assert_eq!(
        str_cell(&pid, "message_control_id", 0).as_deref(),
        Some("MSG001")
    );
    assert_eq!(
        str_cell(&pid, "message_control_id", 1).as_deref(),
        Some("MSG002")
    );

    // Compound cells hold JSON nested-array text.
    assert_eq!(
        str_cell(&pid, "PID-5", 0).as_deref(),
        Some(r#"["Doe","John"]"#)
    );

    // Columns present in only one message are null for the other.
    assert_eq!(str_cell(&pid, "PID-7", 0).as_deref(), Some("19800101"));
    assert_eq!(str_cell(&pid, "PID-7", 1), None);

    // Repeated PV1-3 serializes both repetitions.
    let pv1 = read_table(output_dir.path(), "PV1");
    let cell = str_cell(&pv1, "PV1-3", 0).unwrap();
    assert_eq!(
        cell,
        r#"[["ICU","101","1","HospitalA"],["ER","102","2","HospitalB"]]"#
    );

    // Sub-components nest one level deeper.
    let obx = read_table(output_dir.path(), "OBX");
    let dx_row = (0..obx.height())
        .find(|&i| str_cell(&obx, "message_control_id", i).as_deref() == Some("MSG002"))
        .unwrap();
    assert_eq!(
        str_cell(&obx, "OBX-3", dx_row).unwrap(),
        r#"["DX",["ICD","250.00","I9"]]"#
    );

    // MSH rows carry the synthetic positions from the header offset.
    let msh = read_table(output_dir.path(), "MSH");
    assert_eq!(str_cell(&msh, "MSH-1", 0).as_deref(), Some("|"));
    assert_eq!(str_cell(&msh, "MSH-2", 0).as_deref(), Some("^~\\&"));
}
