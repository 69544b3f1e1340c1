//! Candidate function selection.
//!
//! A candidate is any catalog function that is immutable or stable, takes at
//! least one fuzz-eligible argument, takes no `internal` argument, is not
//! variadic, and is neither an aggregate nor a window function. Volatility
//! and kind are filtered server-side by [`catalog_query`]; the signature
//! level filters are re-applied in [`apply_policy`] so that snapshots and
//! live catalogs go through the same gate, and so excluded names can never
//! reach template construction.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::policy::FuzzPolicy;

/// One catalog function. Overloads are distinct signatures: identity is the
/// name plus the full argument type sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    pub arg_types: Vec<String>,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>, arg_types: Vec<String>) -> Self {
        Self {
            name: name.into(),
            arg_types,
        }
    }
}

/// The `pg_proc` query for candidate functions.
///
/// `prokind = 'f'` excludes aggregates and window functions (the pre-v11
/// `proisagg`/`proiswindow` flags folded into one column).
pub fn catalog_query(policy: &FuzzPolicy) -> String {
    let eligible = policy
        .eligible_types()
        .map(|t| format!("'{t}'"))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "SELECT proname, proargtypes::regtype[]::text[] \
           FROM pg_proc \
          WHERE provolatile IN ('i', 's') \
            AND proargtypes::regtype[] && array[{eligible}]::regtype[] \
            AND NOT proargtypes::regtype[] && array['internal']::regtype[] \
            AND provariadic = 0 \
            AND prokind = 'f'"
    )
}

/// Apply the signature-level filters: at least one eligible argument type,
/// no `internal` argument, and not on the exclusion list.
pub fn apply_policy(raw: Vec<FunctionSignature>, policy: &FuzzPolicy) -> Vec<FunctionSignature> {
    raw.into_iter()
        .filter(|sig| !policy.is_excluded(&sig.name))
        .filter(|sig| sig.arg_types.iter().any(|t| policy.is_eligible(t)))
        .filter(|sig| sig.arg_types.iter().all(|t| t != "internal"))
        .collect()
}

/// Zero-based argument positions of `sig` whose type is a fuzz target.
/// A function with two eligible positions yields two independent fuzz runs.
pub fn eligible_positions(sig: &FunctionSignature, policy: &FuzzPolicy) -> Vec<usize> {
    sig.arg_types
        .iter()
        .enumerate()
        .filter(|(_, t)| policy.is_eligible(t))
        .map(|(i, _)| i)
        .collect()
}

/// Load a candidate snapshot written by [`save_snapshot`].
pub fn load_snapshot(path: &Path) -> Result<Vec<FunctionSignature>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("read catalog snapshot {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("parse catalog snapshot {}", path.display()))
}

/// Write the candidate set as a JSON snapshot for offline review or replay.
pub fn save_snapshot(path: &Path, candidates: &[FunctionSignature]) -> Result<()> {
    let json = serde_json::to_string_pretty(candidates).context("serialize catalog snapshot")?;
    fs::write(path, json).with_context(|| format!("write catalog snapshot {}", path.display()))
}
