// Parse module tests.

use super::*;
use crate::config::DocType;
use strum::IntoEnumIterator;

const SNOMED_LINE: &str =
    "101013\t20020131\t1\t900000000000207008\t126813005\ten\t900000000000013009\tNeoplasm of anterior aspect of epiglottis\t900000000000020002";

fn snomed_parser() -> RecordParser {
    RecordParser::new(
        &SNOMED_CT_DESCRIPTION,
        '\t',
        "snomed-ct",
        "snomed-ct-description",
    )
}

#[test]
fn test_parse_snomed_description() {
    let doc = parse_line(SNOMED_LINE, &snomed_parser()).expect("line should parse");
    assert_eq!(doc.id, "snomed-ct-description-101013-20020131");
    assert_eq!(doc.code, "126813005");
    assert_eq!(doc.display, "Neoplasm of anterior aspect of epiglottis");
    assert_eq!(doc.context, "snomed-ct");
    assert_eq!(doc.metadata.len(), 9);
    assert_eq!(doc.metadata.get("languageCode"), Some("en"));
    assert_eq!(
        doc.metadata.get("caseSignificanceId"),
        Some("900000000000020002")
    );
}

#[test]
fn test_metadata_preserves_column_order() {
    let doc = parse_line(SNOMED_LINE, &snomed_parser()).expect("line should parse");
    let names: Vec<&str> = doc.metadata.iter().map(|(name, _)| name).collect();
    assert_eq!(names, SNOMED_CT_DESCRIPTION.columns);
}

#[test]
fn test_short_line_is_skipped() {
    let parser = snomed_parser();
    assert_eq!(
        parser.parse("101013\t20020131\t1"),
        Parsed::Skip { fields: 3 }
    );
    assert!(parse_line("", &parser).is_none());
    assert_eq!(parser.parse(""), Parsed::Skip { fields: 1 });
}

#[test]
fn test_extra_fields_are_ignored() {
    let line = format!("{SNOMED_LINE}\textra\tcolumns");
    let doc = parse_line(&line, &snomed_parser()).expect("line should parse");
    assert_eq!(doc.metadata.len(), 9);
    assert_eq!(doc.metadata.get("caseSignificanceId"), Some("900000000000020002"));
}

#[test]
fn test_empty_fields_are_kept_verbatim() {
    let line = "1\t2\t\t\t\t\t\t\t";
    let doc = parse_line(line, &snomed_parser()).expect("nine empty-ish fields still parse");
    assert_eq!(doc.id, "snomed-ct-description-1-2");
    assert_eq!(doc.code, "");
    assert_eq!(doc.display, "");
}

#[test]
fn test_parse_with_custom_delimiter() {
    let parser = RecordParser::new(&SNOMED_CT_DESCRIPTION, '|', "snomed-ct", "sct");
    let line = SNOMED_LINE.replace('\t', "|");
    let doc = parse_line(&line, &parser).expect("pipe-delimited line should parse");
    assert_eq!(doc.id, "sct-101013-20020131");
    // A tab-delimited line is a single field for a pipe parser
    assert_eq!(parser.parse(SNOMED_LINE), Parsed::Skip { fields: 1 });
}

#[test]
fn test_parse_icd_10_gm_code() {
    let fields = [
        "4", "T", "X", "02", "C00", "C00.0", "C00.0", "C000", "Lippenaußenseite",
        "Bösartige Neubildung der Lippe", "Lippenaußenseite", "", "C00.0", "C00.0", "1-002",
        "2-010", "3-010", "4-002", "6-016", "9", "9", "9999", "9999", "9", "N", "J", "N", "N",
    ];
    let line = fields.join(";");
    let parser = RecordParser::new(&ICD_10_GM_CODE, ';', "icd-10-gm", "icd-10-gm-code");
    let doc = parse_line(&line, &parser).expect("ICD line should parse");
    assert_eq!(doc.id, "icd-10-gm-code-C000");
    assert_eq!(doc.code, "C00.0");
    assert_eq!(doc.display, "Lippenaußenseite");
    assert_eq!(doc.context, "icd-10-gm");
    assert_eq!(doc.metadata.len(), 28);
    assert_eq!(doc.metadata.get("mortalityList4"), Some("4-002"));
    assert_eq!(doc.metadata.get("ifsgLabor"), Some("N"));
}

#[test]
fn test_layout_lookup() {
    let snomed = RecordLayout::for_doc_type(DocType::SnomedCtDescription);
    assert_eq!(snomed.min_fields(), 9);
    assert_eq!(snomed.index_of("term"), Some(7));
    assert_eq!(snomed.index_of("conceptId"), Some(4));

    let icd = RecordLayout::for_doc_type(DocType::Icd10GmCode);
    assert_eq!(icd.min_fields(), 28);
    assert_eq!(icd.index_of("codeNoDot"), Some(7));
    assert_eq!(icd.index_of("title"), Some(8));
}

#[test]
fn test_layout_columns_are_unique() {
    for doc_type in DocType::iter() {
        let layout = RecordLayout::for_doc_type(doc_type);
        assert_eq!(layout.doc_type, doc_type);
        let mut names: Vec<&str> = layout.columns.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), layout.columns.len(), "{}", layout.doc_type);
        for name in layout.id_columns {
            assert!(layout.index_of(name).is_some());
        }
        assert!(layout.index_of(layout.code_column).is_some());
        assert!(layout.index_of(layout.display_column).is_some());
    }
}
