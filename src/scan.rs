//! Segment sanitizer log text into typed spans.
//!
//! A log file produced under AddressSanitizer is mostly free-form test
//! output with structured sub-reports embedded in it. The scanner walks the
//! raw text and classifies those sub-reports into [`Span`]s: leak reports,
//! error reports, leaked-object listings, section delimiter lines and blank
//! lines. Bytes between spans are left to the caller as unmatched residue;
//! nothing is silently dropped.
//!
//! The pattern is compiled once per [`LogScanner`] and reused across files.
//! Files are scanned independently of each other.

use regex::Regex;
use std::ops::Range;

/// Combined span pattern. Alternatives are listed in priority order; the
/// regex engine picks the earliest match position, and at equal positions
/// the first listed alternative.
///
/// The error alternative only matches the head line. Its body runs until
/// the next line starting with `==` or `--`, which the `regex` crate cannot
/// express without lookahead, so the span end is extended by a line walk in
/// [`LogScanner::scan`].
const SPAN_PATTERN: &str = r"(?m)(?P<leak>^(?P<leak_kind>Direct|Indirect) leak of (?P<leak_bytes>[0-9]+) byte\(s\) in (?P<leak_objects>[0-9]+) object\(s\) allocated from:\n(?P<leak_stack>(?:[ \t]*#[0-9]+[^\n]*\n?)+))|(?P<error>^==ERROR: AddressSanitizer:[^\n]*(?:\n|$))|(?P<objects>^Objects leaked above:\n(?:0x[^\n]*\n?)+)|(?P<delim>^[=-]+(?:\n|$))|(?P<blank>^[ \t]*\n)";

/// Classification of a leak report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeakKind {
    Direct,
    Indirect,
}

impl LeakKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeakKind::Direct => "Direct",
            LeakKind::Indirect => "Indirect",
        }
    }
}

/// A single leak report extracted from a log file.
///
/// `stack` is the frame block exactly as it appeared in the log, including
/// indentation and newlines. Two leaks are only ever treated as the same
/// leak when their stacks are byte-for-byte identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeakReport {
    pub kind: LeakKind,
    pub bytes: u64,
    pub objects: u64,
    pub stack: String,
}

/// What a recognized region of the log contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanKind {
    /// A leak report with its classification, counts and call stack.
    Leak(LeakReport),
    /// An AddressSanitizer error report, body verbatim without the
    /// terminating `==`/`--` line.
    Error(String),
    /// An `Objects leaked above:` listing. Consumed, never rendered.
    LeakedObjects,
    /// A sanitizer section delimiter line (`====...` or `----...`).
    Delimiter,
    /// A blank line.
    Blank,
}

/// A classified region of a log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Byte range of the region within the scanned text.
    pub range: Range<usize>,
    pub kind: SpanKind,
}

/// Scanner for sanitizer log text.
pub struct LogScanner {
    pattern: Regex,
}

impl LogScanner {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(SPAN_PATTERN).unwrap(),
        }
    }

    /// Scan one file's text into an ordered sequence of spans.
    ///
    /// Spans never overlap and appear in file order. Bytes not covered by
    /// any span are unmatched residue; callers recover them from the gaps
    /// between consecutive `range`s.
    pub fn scan(&self, text: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut pos = 0;

        while pos < text.len() {
            let Some(caps) = self.pattern.captures_at(text, pos) else {
                break;
            };
            let matched = caps.get(0).expect("whole-pattern group");
            let start = matched.start();
            let mut end = matched.end();

            let kind = if caps.name("leak").is_some() {
                SpanKind::Leak(LeakReport {
                    kind: if &caps["leak_kind"] == "Direct" {
                        LeakKind::Direct
                    } else {
                        LeakKind::Indirect
                    },
                    bytes: caps["leak_bytes"].parse().unwrap_or_default(),
                    objects: caps["leak_objects"].parse().unwrap_or_default(),
                    stack: caps["leak_stack"].to_string(),
                })
            } else if caps.name("error").is_some() {
                end = error_body_end(text, end);
                SpanKind::Error(text[start..end].to_string())
            } else if caps.name("objects").is_some() {
                SpanKind::LeakedObjects
            } else if caps.name("delim").is_some() {
                SpanKind::Delimiter
            } else {
                SpanKind::Blank
            };

            spans.push(Span {
                range: start..end,
                kind,
            });
            pos = end;
        }

        spans
    }
}

/// Extend an error span past its head line. The body runs up to (exclusive)
/// the next line beginning with `==` or `--`, or to end of input.
fn error_body_end(text: &str, mut end: usize) -> usize {
    while end < text.len() {
        let rest = &text[end..];
        if rest.starts_with("==") || rest.starts_with("--") {
            break;
        }
        match rest.find('\n') {
            Some(i) => end += i + 1,
            None => {
                end = text.len();
                break;
            }
        }
    }
    end
}
