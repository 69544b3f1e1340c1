//! Catalog-driven fuzz harness CLI.
//!
//! **Default mode**: read candidate functions from the live `pg_proc`
//! catalog, then fuzz every eligible argument position of every candidate,
//! one fresh session per template.
//!
//! **Other modes**
//! - Offline template review: `--catalog-json snapshot.json --dry-run`
//! - Candidate set export: `--emit-catalog-json snapshot.json`
//! - Structured findings: `--failures-jsonl findings.jsonl`
//!
//! **Guardrails**
//! - Catalog access failure aborts the run; everything after a successful
//!   catalog read only ever skips or reports.
//! - `--dry-run` opens no database sessions at all when paired with
//!   `--catalog-json`.

use anyhow::{anyhow, Result};
use clap::Parser;

use pgfuzz::args::Args;
use pgfuzz::backend::PgBackend;
use pgfuzz::catalog::{apply_policy, load_snapshot, save_snapshot};
use pgfuzz::dispatch::{Backend, DispatchConfig, Dispatcher};
use pgfuzz::policy::FuzzPolicy;
use pgfuzz::report::ConsoleReporter;

fn main() -> Result<()> {
    let args = Args::parse();
    if let Err(msg) = args.validate() {
        return Err(anyhow!(msg));
    }

    let mut policy = FuzzPolicy::default();
    for name in &args.exclude {
        policy.exclude(name);
    }

    let mut backend = PgBackend::new(&args.conninfo);

    // Catalog access failure is fatal; there is no meaningful partial work
    // without the candidate list.
    let mut candidates = match &args.catalog_json {
        Some(path) => apply_policy(load_snapshot(path)?, &policy),
        None => backend.load_catalog(&policy)?,
    };

    if let Some(n) = args.max_functions {
        candidates.truncate(n);
    }

    if let Some(path) = &args.emit_catalog_json {
        save_snapshot(path, &candidates)?;
        eprintln!("catalog snapshot: {} functions -> {}", candidates.len(), path.display());
    }

    let mut reporter = ConsoleReporter::new(args.failures_jsonl.as_deref())?;
    let config = DispatchConfig {
        iterations: args.iterations,
        max_stack_depth_kb: args.max_stack_depth_kb,
        dry_run: args.dry_run,
    };

    Dispatcher::new(&mut backend, &mut reporter, config).run(&candidates, &policy)?;
    Ok(())
}
