//! Assemble scanned spans into the consolidated report.
//!
//! The builder consumes log files one at a time, in the caller's order,
//! and turns their spans into HTML fragments: new leaks, grown leaks,
//! errors and unmatched-output warnings. Repeated leaks are suppressed
//! through the run-wide [`LeakLedger`]. Files sharing an application name
//! are grouped into one collapsible section; a section that never emits
//! anything collapses to a single OK indicator instead.

use crate::dedup::{LeakLedger, LeakVerdict};
use crate::naming::{LogName, TestCase};
use crate::page;
use crate::scan::{LeakKind, LogScanner, SpanKind};
use serde::Serialize;
use std::io::Write;
use thiserror::Error;
use tracing::{debug, warn};

/// Unmatched residue above this many bytes per file is surfaced as a
/// warning block. Small gaps (stray lines the pattern does not account
/// for) stay silent.
pub const UNMATCHED_WARNING_LIMIT: usize = 500;

/// Errors that can occur while writing a report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;

/// Machine-readable run totals.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub files: usize,
    pub new_leaks: usize,
    pub grown_leaks: usize,
    pub errors: usize,
    pub warnings: usize,
    pub applications: Vec<AppSummary>,
}

/// Per-application outcome.
#[derive(Debug, Clone, Serialize)]
pub struct AppSummary {
    pub name: String,
    /// Number of fragments emitted into the section.
    pub fragments: u32,
    pub clean: bool,
}

/// State of the application section currently being written.
struct Section {
    name: String,
    fragments: u32,
    /// Whether the collapsible region has been rendered. Sections open
    /// lazily on their first fragment so clean applications never render
    /// an empty panel.
    opened: bool,
}

/// Builds the report body from a sequence of log files.
///
/// Files must be fed in a fixed order (the driver sorts them by name);
/// leak classification depends on the exact history of earlier files.
pub struct ReportBuilder {
    scanner: LogScanner,
    ledger: LeakLedger,
    body: String,
    section: Option<Section>,
    finished_apps: Vec<AppSummary>,
    files: usize,
    new_leaks: usize,
    grown_leaks: usize,
    errors: usize,
    warnings: usize,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self {
            scanner: LogScanner::new(),
            ledger: LeakLedger::new(),
            body: String::new(),
            section: None,
            finished_apps: Vec::new(),
            files: 0,
            new_leaks: 0,
            grown_leaks: 0,
            errors: 0,
            warnings: 0,
        }
    }

    /// Process one log file.
    pub fn add_file(&mut self, file_name: &str, text: &str) {
        let name = LogName::parse(file_name);
        if name.case == TestCase::Unrecognized {
            warn!(file = file_name, "log file name matches no recognized pattern");
        }
        self.enter_application(&name.application);
        self.files += 1;

        let spans = self.scanner.scan(text);
        debug!(file = file_name, spans = spans.len(), "scanned log file");

        let mut header_pending = true;
        let mut residue = String::new();
        let mut cursor = 0;

        for span in spans {
            residue.push_str(&text[cursor..span.range.start]);
            cursor = span.range.end;

            match span.kind {
                SpanKind::Leak(report) => match self.ledger.observe(&report) {
                    LeakVerdict::New => {
                        self.new_leaks += 1;
                        let class = match report.kind {
                            LeakKind::Direct => " class=\"direct\"",
                            LeakKind::Indirect => "",
                        };
                        let fragment = format!(
                            "<pre{}>{} leak of {} byte(s) in {} object(s) allocated from:\n{}</pre>\n",
                            class,
                            report.kind.as_str(),
                            report.bytes,
                            report.objects,
                            page::escape(&report.stack),
                        );
                        self.emit(&name, &mut header_pending, &fragment);
                    }
                    LeakVerdict::Repeat => {}
                    LeakVerdict::Grown {
                        byte_delta,
                        object_delta,
                    } => {
                        self.grown_leaks += 1;
                        let fragment = format!(
                            "<pre class=\"grown\">More leaked: {:+} byte(s), {:+} object(s); {} leak now {} byte(s) in {} object(s) allocated from:\n{}</pre>\n",
                            byte_delta,
                            object_delta,
                            report.kind.as_str(),
                            report.bytes,
                            report.objects,
                            page::escape(&report.stack),
                        );
                        self.emit(&name, &mut header_pending, &fragment);
                    }
                },
                SpanKind::Error(body) => {
                    // Errors are never deduplicated; a repeat may be a
                    // distinct nondeterministic fault.
                    self.errors += 1;
                    let fragment =
                        format!("<pre class=\"error\">{}</pre>\n", page::escape(&body));
                    self.emit(&name, &mut header_pending, &fragment);
                }
                SpanKind::LeakedObjects | SpanKind::Delimiter | SpanKind::Blank => {}
            }
        }
        residue.push_str(&text[cursor..]);

        if residue.len() > UNMATCHED_WARNING_LIMIT {
            warn!(
                file = file_name,
                bytes = residue.len(),
                "unmatched log content"
            );
            self.warnings += 1;
            let fragment = format!(
                "<pre class=\"warning\">Unmatched output in {}:\n{}</pre>\n",
                page::escape(file_name),
                page::escape(&residue),
            );
            self.emit(&name, &mut header_pending, &fragment);
        }
    }

    /// Close the last open section and return the finished report.
    pub fn finish(mut self) -> Report {
        self.close_section();
        Report {
            body: self.body,
            summary: RunSummary {
                files: self.files,
                new_leaks: self.new_leaks,
                grown_leaks: self.grown_leaks,
                errors: self.errors,
                warnings: self.warnings,
                applications: self.finished_apps,
            },
        }
    }

    fn enter_application(&mut self, application: &str) {
        if self
            .section
            .as_ref()
            .is_some_and(|s| s.name == application)
        {
            return;
        }
        self.close_section();
        self.section = Some(Section {
            name: application.to_string(),
            fragments: 0,
            opened: false,
        });
    }

    fn close_section(&mut self) {
        let Some(section) = self.section.take() else {
            return;
        };
        if section.fragments == 0 {
            self.body.push_str(&format!(
                "<p class=\"ok\">{}: OK</p>\n",
                page::escape(&section.name)
            ));
        } else {
            self.body.push_str("</div>\n");
        }
        self.finished_apps.push(AppSummary {
            clean: section.fragments == 0,
            name: section.name,
            fragments: section.fragments,
        });
    }

    /// Append one fragment, opening the section and writing the per-file
    /// header first when this is their first content.
    fn emit(&mut self, name: &LogName, header_pending: &mut bool, fragment: &str) {
        let Some(section) = self.section.as_mut() else {
            return;
        };
        if !section.opened {
            section.opened = true;
            self.body.push_str(&format!(
                "<button type=\"button\" class=\"collapsible\">{}</button>\n<div class=\"content\">\n",
                page::escape(&section.name)
            ));
        }
        if *header_pending {
            *header_pending = false;
            self.body
                .push_str(&format!("<h4>{}</h4>\n", page::escape(&name.header())));
        }
        self.body.push_str(fragment);
        section.fragments += 1;
    }
}

/// A finished report, ready to be written out.
pub struct Report {
    body: String,
    pub summary: RunSummary,
}

impl Report {
    /// Assembled fragments without the page boilerplate.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Write the full HTML page.
    pub fn write_html<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(page::PAGE_HEADER.as_bytes())?;
        writer.write_all(self.body.as_bytes())?;
        writer.write_all(page::page_footer().as_bytes())?;
        Ok(())
    }

    /// Write the machine-readable summary as JSON.
    pub fn write_json<W: Write>(&self, mut writer: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, &self.summary)?;
        writeln!(writer)?;
        Ok(())
    }
}
