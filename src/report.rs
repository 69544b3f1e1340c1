//! Diagnostic records and sinks.
//!
//! Engine-level errors raised while fuzzing are the tool's positive findings,
//! so they are captured as structured records rather than printed fields: a
//! [`EngineFailure`] carries the error code, message, and the exact template
//! that triggered it.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One engine-level failure observed during dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineFailure {
    /// SQLSTATE code, when the server reported one.
    pub code: Option<String>,
    pub message: String,
    /// The rendered template whose fuzz run raised the error.
    pub template: String,
}

/// End-of-run counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Candidate functions processed.
    pub functions: usize,
    /// (function, position) pairs with an eligible fuzz target.
    pub fuzz_targets: usize,
    /// Pairs abandoned because a co-parameter type is unregistered.
    pub skipped_pairs: usize,
    /// Templates built (and printed).
    pub templates_built: usize,
    /// Templates actually handed to the fuzz primitive.
    pub templates_dispatched: usize,
    /// Engine failures reported.
    pub failures: usize,
}

/// Sink for per-template diagnostics. Dispatch continues regardless of what
/// the sink does with them.
pub trait Reporter {
    /// Called with every rendered template before its dispatch, so a crashed
    /// run still shows what was about to execute.
    fn template_generated(&mut self, query: &str);

    /// Called for every engine failure.
    fn engine_failure(&mut self, failure: &EngineFailure);

    /// Called once after the run.
    fn run_finished(&mut self, summary: &RunSummary);
}

/// Console sink: templates on stdout, failures and the summary on stderr,
/// with an optional JSONL file carrying the structured failure records.
pub struct ConsoleReporter {
    failures_jsonl: Option<BufWriter<File>>,
}

impl ConsoleReporter {
    pub fn new(failures_jsonl: Option<&Path>) -> Result<Self> {
        let failures_jsonl = match failures_jsonl {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("create {}", path.display()))?;
                Some(BufWriter::new(file))
            }
            None => None,
        };
        Ok(Self { failures_jsonl })
    }
}

impl Reporter for ConsoleReporter {
    fn template_generated(&mut self, query: &str) {
        println!("{query}");
    }

    fn engine_failure(&mut self, failure: &EngineFailure) {
        eprintln!(
            "fuzz error [{}]: {}",
            failure.code.as_deref().unwrap_or("none"),
            failure.message
        );
        eprintln!("  template: {}", failure.template);

        if let Some(writer) = self.failures_jsonl.as_mut() {
            let write = serde_json::to_writer(&mut *writer, failure)
                .map_err(std::io::Error::from)
                .and_then(|()| writer.write_all(b"\n"));
            if let Err(e) = write {
                warn!("failed to append failure record: {e}");
            }
        }
    }

    fn run_finished(&mut self, summary: &RunSummary) {
        if let Some(writer) = self.failures_jsonl.as_mut() {
            if let Err(e) = writer.flush() {
                warn!("failed to flush failure records: {e}");
            }
        }
        eprintln!(
            "fuzz done: functions={} targets={} built={} dispatched={} skipped_pairs={} failures={}",
            summary.functions,
            summary.fuzz_targets,
            summary.templates_built,
            summary.templates_dispatched,
            summary.skipped_pairs,
            summary.failures
        );
    }
}
