//! Conversion of one delimited line into a [`Document`].

use crate::models::{Document, Metadata};

use super::layout::RecordLayout;

/// Result of parsing a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Record(Document),
    /// The line has fewer fields than the layout requires.
    Skip { fields: usize },
}

/// Turns raw lines into documents according to a fixed column layout.
///
/// Holds no mutable state; parsing is a pure function of the line.
#[derive(Debug, Clone)]
pub struct RecordParser {
    layout: &'static RecordLayout,
    delimiter: char,
    context: String,
    id_prefix: String,
}

impl RecordParser {
    pub fn new(
        layout: &'static RecordLayout,
        delimiter: char,
        context: impl Into<String>,
        id_prefix: impl Into<String>,
    ) -> Self {
        Self {
            layout,
            delimiter,
            context: context.into(),
            id_prefix: id_prefix.into(),
        }
    }

    pub fn layout(&self) -> &'static RecordLayout {
        self.layout
    }

    pub fn parse(&self, line: &str) -> Parsed {
        let fields: Vec<&str> = line.split(self.delimiter).collect();
        if fields.len() < self.layout.min_fields() {
            return Parsed::Skip {
                fields: fields.len(),
            };
        }

        let mut metadata = Metadata::with_capacity(self.layout.columns.len());
        for (&name, &value) in self.layout.columns.iter().zip(fields.iter()) {
            metadata.push(name, value);
        }

        let column = |name: &str| metadata.get(name).unwrap_or_default().to_string();

        let mut id = self.id_prefix.clone();
        for name in self.layout.id_columns {
            id.push('-');
            id.push_str(metadata.get(name).unwrap_or_default());
        }

        let code = column(self.layout.code_column);
        let display = column(self.layout.display_column);

        Parsed::Record(Document {
            id,
            code,
            display,
            context: self.context.clone(),
            metadata,
        })
    }
}

/// Parses `line`, returning `None` for lines that are skipped.
pub fn parse_line(line: &str, parser: &RecordParser) -> Option<Document> {
    match parser.parse(line) {
        Parsed::Record(doc) => Some(doc),
        Parsed::Skip { .. } => None,
    }
}
