//! Consolidated reporting for AddressSanitizer test logs.
//!
//! This crate ingests a directory of sanitizer log files produced by
//! automated test runs and builds a single HTML report summarizing the
//! errors and memory leaks found across all runs. Leak reports that repeat
//! an already-seen leak (same classification, same call stack, same counts)
//! are suppressed; leaks that grow are reported with their deltas.
//!
//! # Components
//!
//! - [`scan`] - Segment raw log text into typed spans
//! - [`dedup`] - Cross-file leak deduplication by call-stack identity
//! - [`naming`] - Derive application and test case from log file names
//! - [`report`] - Assemble scanned spans into report fragments
//! - [`page`] - HTML page boilerplate around the assembled fragments
//!
//! # Example
//!
//! ```no_run
//! use asan_report::report::ReportBuilder;
//! use std::fs::File;
//! use std::io::BufWriter;
//!
//! let mut builder = ReportBuilder::new();
//! builder.add_file("x-app1-tc-1-mod-foo.log", "Direct leak of 10 byte(s) \
//!     in 1 object(s) allocated from:\n    #0 0x1 in main\n");
//! let report = builder.finish();
//!
//! let output = BufWriter::new(File::create("asan_summary.html").unwrap());
//! report.write_html(output).unwrap();
//! ```

pub mod dedup;
pub mod naming;
pub mod page;
pub mod report;
pub mod scan;
