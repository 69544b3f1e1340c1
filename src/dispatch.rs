//! Backend seam and the sequential dispatch loop.
//!
//! The dispatcher never holds two sessions open: the fuzz primitive runs
//! once per session, so every template gets a freshly opened session that is
//! dropped on every exit path. Engine errors are findings, not failures of
//! the run — they are reported and the loop continues.

use anyhow::Result;
use tracing::debug;

use crate::catalog::{eligible_positions, FunctionSignature};
use crate::policy::FuzzPolicy;
use crate::report::{EngineFailure, Reporter, RunSummary};
use crate::template::build_templates;

/// An error the engine reported through the normal error channel while
/// fuzzing: the target function crashed, overflowed, hit the stack guard.
#[derive(Debug, Clone)]
pub struct EngineError {
    /// SQLSTATE code, when available.
    pub code: Option<String>,
    pub message: String,
}

/// One isolated session. The fuzz primitive is usable exactly once per
/// session; dropping the session releases the connection.
pub trait FuzzSession {
    /// Bound native recursion before fuzzing so a runaway recursive function
    /// cannot take the backend process down.
    fn set_max_stack_depth(&mut self, kilobytes: u32) -> Result<(), EngineError>;

    /// Invoke `fuzz(iterations, query)` and block until it returns or the
    /// engine raises.
    fn run_fuzz(&mut self, iterations: u32, query: &str) -> Result<(), EngineError>;
}

/// The database behind the harness. Catalog access failure is fatal;
/// everything after a successful catalog read is recoverable.
pub trait Backend {
    fn load_catalog(&mut self, policy: &FuzzPolicy) -> Result<Vec<FunctionSignature>>;

    fn open_session(&mut self) -> Result<Box<dyn FuzzSession>>;
}

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Iterations passed to the fuzz primitive per template.
    pub iterations: u32,
    /// max_stack_depth applied to each session, in kilobytes.
    pub max_stack_depth_kb: u32,
    /// Build and print templates but open no sessions.
    pub dry_run: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            iterations: 100_000,
            max_stack_depth_kb: 7680,
            dry_run: false,
        }
    }
}

/// Sequential dispatcher: one (function, position) pair at a time, one
/// template at a time, one session per template.
pub struct Dispatcher<'a> {
    backend: &'a mut dyn Backend,
    reporter: &'a mut dyn Reporter,
    config: DispatchConfig,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        backend: &'a mut dyn Backend,
        reporter: &'a mut dyn Reporter,
        config: DispatchConfig,
    ) -> Self {
        Self {
            backend,
            reporter,
            config,
        }
    }

    /// Fuzz every eligible position of every candidate.
    pub fn run(&mut self, candidates: &[FunctionSignature], policy: &FuzzPolicy) -> Result<RunSummary> {
        let mut summary = RunSummary {
            functions: candidates.len(),
            ..RunSummary::default()
        };

        for sig in candidates {
            for position in eligible_positions(sig, policy) {
                summary.fuzz_targets += 1;

                let templates = build_templates(sig, position, policy);
                if templates.is_empty() {
                    // A co-parameter type has no registered dummy value.
                    // Expected and common; not a failure.
                    debug!(function = %sig.name, position, "skipping pair: unregistered co-parameter type");
                    summary.skipped_pairs += 1;
                    continue;
                }

                for template in &templates {
                    let query = template.render();
                    summary.templates_built += 1;
                    self.reporter.template_generated(&query);

                    if self.config.dry_run {
                        continue;
                    }
                    summary.templates_dispatched += 1;
                    if let Err(e) = self.dispatch_one(&query) {
                        summary.failures += 1;
                        self.reporter.engine_failure(&EngineFailure {
                            code: e.code,
                            message: e.message,
                            template: query,
                        });
                    }
                }
            }
        }

        self.reporter.run_finished(&summary);
        Ok(summary)
    }

    /// One fuzz invocation in its own session. The session is dropped on
    /// every exit path.
    fn dispatch_one(&mut self, query: &str) -> Result<(), EngineError> {
        let mut session = self.backend.open_session().map_err(|e| EngineError {
            code: None,
            message: format!("open session: {e:#}"),
        })?;
        session.set_max_stack_depth(self.config.max_stack_depth_kb)?;
        session.run_fuzz(self.config.iterations, query)
    }
}
