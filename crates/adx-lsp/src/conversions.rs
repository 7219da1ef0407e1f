//! Type conversion functions between LSP types and the core's types.
//!
//! The core works in byte offsets; LSP wants 0-indexed line/UTF-16
//! positions. Conversions therefore need the target file's text (via its
//! [`LineIndex`]) — including for related-information entries, which may
//! point into other files.

use adx_json::{LineIndex, OffsetRange};
use adx_template::{Diagnostic, FileId, Severity};
use lsp_types::{DiagnosticRelatedInformation, Location, NumberOrString, Position, Range, Uri};

/// Convert a byte range to an LSP range using the file's line index.
#[must_use]
pub fn convert_range(index: &LineIndex, range: OffsetRange) -> Range {
    let start = index.position(range.start);
    let end = index.position(range.end);
    Range {
        start: Position::new(start.line, start.character),
        end: Position::new(end.line, end.character),
    }
}

/// Convert an LSP position to a byte offset.
#[must_use]
pub fn convert_position(index: &LineIndex, position: Position) -> Option<usize> {
    index.offset(adx_json::Position::new(position.line, position.character))
}

/// Convert a severity level.
#[must_use]
pub const fn convert_severity(severity: Severity) -> lsp_types::DiagnosticSeverity {
    match severity {
        Severity::Error => lsp_types::DiagnosticSeverity::ERROR,
        Severity::Warning => lsp_types::DiagnosticSeverity::WARNING,
        Severity::Information => lsp_types::DiagnosticSeverity::INFORMATION,
        Severity::Hint => lsp_types::DiagnosticSeverity::HINT,
    }
}

/// `file://` URI for a filesystem path string.
#[must_use]
pub fn uri_for_path(path: &str) -> Option<Uri> {
    format!("file://{path}").parse().ok()
}

/// Convert a core diagnostic to an LSP diagnostic.
///
/// `related_indexes` supplies line indexes for the files that
/// related-information entries point into; entries whose file has no
/// index are dropped rather than published with bogus positions.
#[must_use]
pub fn convert_diagnostic(
    index: &LineIndex,
    diag: &Diagnostic,
    related_indexes: &dyn Fn(&FileId) -> Option<LineIndex>,
) -> lsp_types::Diagnostic {
    let related_information: Vec<DiagnosticRelatedInformation> = diag
        .related_info
        .iter()
        .filter_map(|info| {
            let other_index = related_indexes(&info.location.file)?;
            let uri = uri_for_path(info.location.file.as_str())?;
            Some(DiagnosticRelatedInformation {
                location: Location {
                    uri,
                    range: convert_range(&other_index, info.location.range),
                },
                message: info.message.clone(),
            })
        })
        .collect();

    lsp_types::Diagnostic {
        range: convert_range(index, diag.range),
        severity: Some(convert_severity(diag.severity)),
        code: Some(NumberOrString::String(diag.code.clone())),
        code_description: None,
        source: Some(diag.source.clone()),
        message: diag.message.clone(),
        related_information: (!related_information.is_empty()).then_some(related_information),
        tags: None,
        // Structured args ride along for the code-action provider.
        data: diag
            .args
            .as_ref()
            .map(|args| serde_json::Value::Object(args.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adx_template::codes;

    #[test]
    fn test_convert_range() {
        let index = LineIndex::new("{\n  \"a\": 1\n}");
        let range = convert_range(&index, OffsetRange::new(4, 7));
        assert_eq!(range.start, Position::new(1, 2));
        assert_eq!(range.end, Position::new(1, 5));
    }

    #[test]
    fn test_convert_diagnostic_carries_code_and_args() {
        let index = LineIndex::new("{\"name\": \"badvar\"}");
        let diag = Diagnostic::for_code(codes::PAGE_UNKNOWN_VARIABLE, OffsetRange::new(9, 17))
            .with_message("Cannot find variable 'badvar', did you mean 'var1'?")
            .with_arg("name", "badvar")
            .with_arg("match", "var1");

        let lsp = convert_diagnostic(&index, &diag, &|_| None);
        assert_eq!(
            lsp.code,
            Some(NumberOrString::String(codes::PAGE_UNKNOWN_VARIABLE.to_string()))
        );
        let data = lsp.data.unwrap();
        assert_eq!(data["match"], "var1");
    }
}
