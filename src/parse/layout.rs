//! Positional column layouts of the supported terminology exports.

use crate::config::DocType;

/// Static column table for one export format.
///
/// Column names are the keys stored in each document's metadata, in file
/// order. A line must carry at least `columns.len()` fields to be parsed.
#[derive(Debug)]
pub struct RecordLayout {
    pub doc_type: DocType,
    pub columns: &'static [&'static str],
    /// Columns whose values, joined with `-`, follow the id prefix.
    pub id_columns: &'static [&'static str],
    pub code_column: &'static str,
    pub display_column: &'static str,
}

impl RecordLayout {
    pub fn for_doc_type(doc_type: DocType) -> &'static RecordLayout {
        match doc_type {
            DocType::SnomedCtDescription => &SNOMED_CT_DESCRIPTION,
            DocType::Icd10GmCode => &ICD_10_GM_CODE,
        }
    }

    pub fn min_fields(&self) -> usize {
        self.columns.len()
    }

    /// Position of `name` in the layout.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| *column == name)
    }
}

/// SNOMED CT RF2 description file (`sct2_Description_*.txt`).
pub static SNOMED_CT_DESCRIPTION: RecordLayout = RecordLayout {
    doc_type: DocType::SnomedCtDescription,
    columns: &[
        "id",
        "effectiveTime",
        "active",
        "moduleId",
        "conceptId",
        "languageCode",
        "typeId",
        "term",
        "caseSignificanceId",
    ],
    id_columns: &["id", "effectiveTime"],
    code_column: "conceptId",
    display_column: "term",
};

/// ICD-10-GM systematic code file (`icd10gm*syst_kodes.txt`).
pub static ICD_10_GM_CODE: RecordLayout = RecordLayout {
    doc_type: DocType::Icd10GmCode,
    columns: &[
        "level",
        "isTerminal",
        "codeType",
        "chapterNumber",
        "groupFrom",
        "code",
        "normalizedCode",
        "codeNoDot",
        "title",
        "threeDigitTitle",
        "fourDigitTitle",
        "fiveDigitTitle",
        "use295",
        "use301",
        "mortalityList1",
        "mortalityList2",
        "mortalityList3",
        "mortalityList4",
        "morbidityList",
        "sexCode",
        "sexErrorType",
        "ageFrom",
        "ageTo",
        "ageErrorType",
        "exotic",
        "occupied",
        "ifsgMeldung",
        "ifsgLabor",
    ],
    id_columns: &["codeNoDot"],
    code_column: "code",
    display_column: "title",
};
