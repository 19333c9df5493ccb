//! Diagnostic rendering for parse errors.

use std::ops::Range;

use ariadne::{Color, Label, Report, ReportKind, Source};
use ssys_machine::{Direction, ParseError, ParseErrorKind};

/// Render a parse error with ariadne.
///
/// Returns the formatted report with source context.
pub fn render(error: &ParseError, filename: &str, source: &str) -> String {
    let mut output = Vec::new();
    if write_report(error, filename, source, &mut output).is_err() {
        return error.to_string();
    }
    String::from_utf8(output).unwrap_or_else(|_| error.to_string())
}

/// Write the error report to a writer.
pub fn write_report<W: std::io::Write>(
    error: &ParseError,
    filename: &str,
    source: &str,
    writer: W,
) -> std::io::Result<()> {
    build_report(error, filename, source)
        .finish()
        .write((filename, Source::from(source)), writer)
}

fn build_report<'a>(
    error: &ParseError,
    filename: &'a str,
    source: &str,
) -> ariadne::ReportBuilder<'static, (&'a str, Range<usize>)> {
    // Errors without a span happened at the end of the document.
    let range: Range<usize> = match error.span {
        Some(span) => span.into(),
        None => source.len()..source.len(),
    };
    let report = Report::build(ReportKind::Error, (filename, range.clone()));
    let label = |message: String| {
        Label::new((filename, range.clone()))
            .with_message(message)
            .with_color(Color::Red)
    };

    match &error.kind {
        ParseErrorKind::InvalidTrigger {
            trigger,
            state,
            direction: Direction::Enter,
        } => report
            .with_message(format!("unexpected element `<{trigger}>`"))
            .with_label(label(format!("not allowed in {state}")))
            .with_help("check the element name and where it is nested"),

        ParseErrorKind::InvalidTrigger {
            trigger,
            state,
            direction: Direction::Leave,
        } => report
            .with_message(format!("unexpected closing tag `</{trigger}>`"))
            .with_label(label(format!("{state} is still open"))),

        ParseErrorKind::DeadEnd { state } => report
            .with_message("transition table has a dead end")
            .with_label(label(format!("leads to undeclared state {state}"))),

        ParseErrorKind::MalformedContent { text, expected } => report
            .with_message(format!("malformed {expected}"))
            .with_label(label(format!("{:?} is not a valid {expected}", text.trim()))),

        ParseErrorKind::TrailingContent { trigger } => report
            .with_message(format!("unexpected element `<{trigger}>` after the document root"))
            .with_label(label("a document has exactly one root element".into())),

        ParseErrorKind::PrematureEnd { state } => report
            .with_message("document ended early")
            .with_label(label(format!("still inside {state}"))),

        ParseErrorKind::MissingKey { key } => report
            .with_message(format!("incomplete element: no `{key}` given"))
            .with_label(label("element closed here".into())),

        ParseErrorKind::MissingAttribute { name } => report
            .with_message(format!("missing attribute `{name}`"))
            .with_label(label(format!("needs a `{name}` attribute"))),

        ParseErrorKind::Source(message) => report
            .with_message("malformed XML")
            .with_label(label(message.clone())),

        other => report
            .with_message(other.to_string())
            .with_label(label(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, parse_ssys};
    use facet_testhelpers::test;

    fn render_stripped(source: &str) -> String {
        let Err(Error::Parse(err)) = parse_ssys(source) else {
            panic!("expected a parse error");
        };
        strip_ansi_escapes::strip_str(render(&err, "Ogat.xml", source))
    }

    #[test]
    fn test_unexpected_element() {
        let report = render_stripped(
            "<ssys name=\"Ogat\">\n <general>\n  <moons>3</moons>\n </general>\n</ssys>",
        );
        assert!(report.contains("unexpected element `<moons>`"), "{report}");
        assert!(report.contains("not allowed in general"), "{report}");
        assert!(report.contains("Ogat.xml"), "{report}");
    }

    #[test]
    fn test_malformed_number() {
        let report = render_stripped(
            "<ssys name=\"Ogat\"><general><radius>small</radius></general></ssys>",
        );
        assert!(report.contains("malformed real"), "{report}");
        assert!(report.contains("\"small\" is not a valid real"), "{report}");
    }

    #[test]
    fn test_premature_end_points_at_end() {
        let events = vec![
            Ok(ssys_machine::Event::enter_with("ssys", [("name", "Ogat")])),
            Ok(ssys_machine::Event::enter("jumps")),
        ];
        let err = crate::ssys_machine().unwrap().parse(events).unwrap_err();
        assert_eq!(err.span, None);
        let source = "<ssys name=\"Ogat\"><jumps>";
        let report = strip_ansi_escapes::strip_str(render(&err, "Ogat.xml", source));
        assert!(report.contains("document ended early"), "{report}");
        assert!(report.contains("still inside jumps"), "{report}");
    }
}
