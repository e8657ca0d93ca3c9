//! Export-sink helpers: plain CSV and pretty-printed JSON documents.
//!
//! Serialization only; the caller decides filenames and transport.

use std::borrow::Cow;

use serde::Serialize;

/// Build a CSV document from a header row and data rows.
///
/// Fields containing commas, double quotes, or newlines are quoted;
/// embedded quotes are doubled. Rows are joined with `\n` and the
/// document ends with a trailing newline.
#[must_use]
pub fn csv_document(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    push_row(&mut out, header.iter().copied());
    for row in rows {
        push_row(&mut out, row.iter().map(String::as_str));
    }
    out
}

fn push_row<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        first = false;
        out.push_str(&csv_field(field));
    }
    out.push('\n');
}

fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Serialize a value as a pretty-printed JSON document.
///
/// # Errors
///
/// Returns [`serde_json::Error`] if the value cannot be serialized.
pub fn json_document<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_stay_unquoted() {
        let doc = csv_document(
            &["id", "rating"],
            &[vec!["r-1".to_string(), "5".to_string()]],
        );
        assert_eq!(doc, "id,rating\nr-1,5\n");
    }

    #[test]
    fn comma_field_is_quoted() {
        let doc = csv_document(&["content"], &[vec!["good, not great".to_string()]]);
        assert_eq!(doc, "content\n\"good, not great\"\n");
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        let doc = csv_document(&["content"], &[vec!["they said \"wow\"".to_string()]]);
        assert_eq!(doc, "content\n\"they said \"\"wow\"\"\"\n");
    }

    #[test]
    fn newline_field_is_quoted() {
        let doc = csv_document(&["content"], &[vec!["line one\nline two".to_string()]]);
        assert_eq!(doc, "content\n\"line one\nline two\"\n");
    }

    #[test]
    fn empty_rows_yield_header_only() {
        let doc = csv_document(&["a", "b"], &[]);
        assert_eq!(doc, "a,b\n");
    }

    #[test]
    fn json_document_pretty_prints() {
        #[derive(Serialize)]
        struct Row {
            id: &'static str,
        }
        let doc = json_document(&vec![Row { id: "r-1" }]).expect("serialize");
        assert!(doc.contains('\n'), "expected pretty output, got {doc}");
        assert!(doc.contains("\"id\": \"r-1\""));
    }
}
