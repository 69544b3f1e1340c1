//! Live PostgreSQL backend.
//!
//! Thin implementation of the [`Backend`] seam over a blocking client. One
//! connection serves the catalog read; every fuzz invocation gets its own
//! connection, opened and dropped inside the dispatcher.

use anyhow::{Context, Result};
use postgres::{Client, NoTls};
use tracing::debug;

use crate::catalog::{apply_policy, catalog_query, FunctionSignature};
use crate::dispatch::{Backend, EngineError, FuzzSession};
use crate::policy::FuzzPolicy;
use crate::template::fuzz_call_sql;

/// Connects with a libpq-style conninfo string. Fuzzing normally targets a
/// throwaway server on a local socket, hence the `host=/tmp` CLI default.
pub struct PgBackend {
    conninfo: String,
}

impl PgBackend {
    pub fn new(conninfo: impl Into<String>) -> Self {
        Self {
            conninfo: conninfo.into(),
        }
    }

    fn connect(&self) -> Result<Client> {
        Client::connect(&self.conninfo, NoTls)
            .with_context(|| format!("connect to '{}'", self.conninfo))
    }
}

impl Backend for PgBackend {
    fn load_catalog(&mut self, policy: &FuzzPolicy) -> Result<Vec<FunctionSignature>> {
        let mut client = self.connect().context("catalog connection")?;
        let rows = client
            .query(&catalog_query(policy), &[])
            .context("query pg_proc for candidate functions")?;

        let raw: Vec<FunctionSignature> = rows
            .iter()
            .map(|row| FunctionSignature {
                name: row.get(0),
                arg_types: row.get(1),
            })
            .collect();
        debug!(candidates = raw.len(), "catalog loaded");
        Ok(apply_policy(raw, policy))
    }

    fn open_session(&mut self) -> Result<Box<dyn FuzzSession>> {
        let client = self.connect().context("fuzz session connection")?;
        Ok(Box::new(PgSession { client }))
    }
}

struct PgSession {
    client: Client,
}

impl FuzzSession for PgSession {
    fn set_max_stack_depth(&mut self, kilobytes: u32) -> Result<(), EngineError> {
        self.client
            .batch_execute(&format!("set max_stack_depth='{kilobytes}kB'"))
            .map_err(engine_error)
    }

    fn run_fuzz(&mut self, iterations: u32, query: &str) -> Result<(), EngineError> {
        self.client
            .batch_execute(&fuzz_call_sql(iterations, query))
            .map_err(engine_error)
    }
}

/// Map a driver error onto the structured record the reporter carries.
/// Connection-level errors (backend crashed mid-fuzz) have no SQLSTATE.
fn engine_error(e: postgres::Error) -> EngineError {
    match e.as_db_error() {
        Some(db) => EngineError {
            code: Some(db.code().code().to_string()),
            message: db.message().to_string(),
        },
        None => EngineError {
            code: None,
            message: e.to_string(),
        },
    }
}
