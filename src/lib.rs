//! Catalog-driven fuzz harness for PostgreSQL functions.
//!
//! Walks the server's `pg_proc` catalog for side-effect-free functions that
//! take string-like or semi-structured arguments, builds one fuzz-target
//! query per (function, argument position) pair, and hands each query to the
//! engine-side `fuzz(iterations, query)` primitive in its own session.
//!
//! # Architecture
//!
//! - [`policy`]: Injected configuration — fuzz-eligible types, dummy-value
//!   registry, curated exclusion list
//! - [`catalog`]: Candidate function selection and JSON snapshots
//! - [`template`]: Structured query templates and the argument-matrix builder
//! - [`dispatch`]: Backend/session seam and the sequential dispatch loop
//! - [`report`]: Structured failure records and diagnostic sinks
//! - [`backend`]: Live PostgreSQL implementation of the backend seam

pub mod args;
pub mod backend;
pub mod catalog;
pub mod dispatch;
pub mod policy;
pub mod report;
pub mod template;
