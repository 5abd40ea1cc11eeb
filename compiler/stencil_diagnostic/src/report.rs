//! Terminal rendering of diagnostics through `ariadne`.

use ariadne::{Config, IndexType, Label as ReportLabel, Report, ReportKind, Source};

use crate::{Diagnostic, Severity};

/// Options for [`render`].
#[derive(Copy, Clone, Debug, Default)]
pub struct ReportOptions {
    /// Emit ANSI colors.
    pub color: bool,
}

fn report_kind(severity: Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
        Severity::Note => ReportKind::Advice,
    }
}

impl Diagnostic {
    fn to_report(&self, source_len: usize, options: ReportOptions) -> Report<'static> {
        let clamp = |span: stencil_ir::Span| {
            let range = span.to_range();
            range.start.min(source_len)..range.end.min(source_len)
        };
        let primary = self.primary_span().map_or(0..0, clamp);

        let mut builder = Report::build(report_kind(self.severity), primary)
            .with_config(
                Config::default()
                    .with_color(options.color)
                    .with_index_type(IndexType::Byte),
            )
            .with_code(self.code)
            .with_message(&self.message);

        for label in &self.labels {
            builder = builder
                .with_label(ReportLabel::new(clamp(label.span)).with_message(&label.message));
        }
        for note in &self.notes {
            builder = builder.with_note(note);
        }
        builder.finish()
    }

    /// Render this diagnostic as an annotated source excerpt.
    pub fn render(&self, source: &str) -> String {
        render(std::slice::from_ref(self), source, ReportOptions::default())
    }
}

/// Render a batch of diagnostics against the same source.
pub fn render(diagnostics: &[Diagnostic], source: &str, options: ReportOptions) -> String {
    let mut buf = Vec::new();
    for diagnostic in diagnostics {
        let report = diagnostic.to_report(source.len(), options);
        if report.write(Source::from(source), &mut buf).is_err() {
            // Writing into a Vec only fails on formatting bugs; fall back to Display.
            buf.extend_from_slice(diagnostic.to_string().as_bytes());
            buf.push(b'\n');
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}
