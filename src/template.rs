//! Structured query templates and the argument-matrix builder.
//!
//! A template is a function call with exactly one argument slot holding the
//! fuzz placeholder and every other slot holding a registered dummy literal,
//! all cast to their declared types. Templates are an AST rather than a
//! format string so quoting and escaping are applied mechanically.

use serde::{Deserialize, Serialize};

use crate::catalog::FunctionSignature;
use crate::policy::FuzzPolicy;

/// One argument slot in a query template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "slot")]
pub enum ArgSlot {
    /// The fuzz target: rendered as `$1::<type>` for the fuzz primitive to
    /// fill with randomized values.
    Placeholder { type_name: String },
    /// A fixed dummy value: rendered as `'<value>'::<type>`.
    Literal { value: String, type_name: String },
}

/// A fully-formed fuzz-target invocation for one function. Constructed fresh
/// per (function, position, dummy combination), never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryTemplate {
    pub function: String,
    pub slots: Vec<ArgSlot>,
}

impl QueryTemplate {
    /// Render the call expression, e.g.
    /// `select "lpad"($1::text, '0'::integer, ''::text)`.
    pub fn render(&self) -> String {
        let args = self
            .slots
            .iter()
            .map(|slot| match slot {
                ArgSlot::Placeholder { type_name } => format!("$1::{type_name}"),
                ArgSlot::Literal { value, type_name } => {
                    format!("{}::{type_name}", quote_literal(value))
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("select {}({args})", quote_ident(&self.function))
    }

    /// Position of the placeholder slot.
    pub fn fuzz_position(&self) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| matches!(s, ArgSlot::Placeholder { .. }))
    }
}

/// Quote an identifier, doubling embedded double quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a literal, doubling embedded single quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", escape_quotes(value))
}

/// Double every single quote so `s` survives embedding in a SQL string
/// literal.
pub fn escape_quotes(s: &str) -> String {
    s.replace('\'', "''")
}

/// The statement that hands a rendered template to the engine fuzz
/// primitive.
pub fn fuzz_call_sql(iterations: u32, query: &str) -> String {
    format!("select fuzz({iterations}, '{}')", escape_quotes(query))
}

/// Build every template for fuzzing `sig` at `fuzz_position`.
///
/// Each non-fuzzed position contributes all of its registered literals; the
/// result is the Cartesian product across positions. Returns an empty Vec if
/// any non-fuzzed type is unregistered — the pair is not fuzzable with the
/// current registry, which is an expected outcome, not an error. Zero
/// non-fuzzed positions produce exactly one template.
pub fn build_templates(
    sig: &FunctionSignature,
    fuzz_position: usize,
    policy: &FuzzPolicy,
) -> Vec<QueryTemplate> {
    debug_assert!(fuzz_position < sig.arg_types.len());

    let mut per_position: Vec<Vec<ArgSlot>> = Vec::with_capacity(sig.arg_types.len());
    for (i, type_name) in sig.arg_types.iter().enumerate() {
        if i == fuzz_position {
            per_position.push(vec![ArgSlot::Placeholder {
                type_name: type_name.clone(),
            }]);
        } else {
            let Some(literals) = policy.dummy_literals(type_name) else {
                return Vec::new();
            };
            per_position.push(
                literals
                    .iter()
                    .map(|value| ArgSlot::Literal {
                        value: value.clone(),
                        type_name: type_name.clone(),
                    })
                    .collect(),
            );
        }
    }

    // Cartesian product, positions left to right. The empty product is one
    // empty combination, which covers single-argument functions.
    let mut combos: Vec<Vec<ArgSlot>> = vec![Vec::new()];
    for slots in &per_position {
        let mut next = Vec::with_capacity(combos.len() * slots.len());
        for combo in &combos {
            for slot in slots {
                let mut extended = combo.clone();
                extended.push(slot.clone());
                next.push(extended);
            }
        }
        combos = next;
    }

    combos
        .into_iter()
        .map(|slots| QueryTemplate {
            function: sig.name.clone(),
            slots,
        })
        .collect()
}
