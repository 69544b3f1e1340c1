//! Fuzzing policy: which types are fuzz targets, which literals fill the
//! remaining argument positions, and which functions are never touched.
//!
//! The policy is plain injected data. The selector and the matrix builder
//! both take a reference to it, so tests can substitute alternate registries
//! without touching any core logic.

use std::collections::{BTreeMap, BTreeSet};

/// Configuration for one fuzz run.
///
/// Type names are the opaque strings the catalog reports
/// (`proargtypes::regtype[]::text[]`); matching is exact.
#[derive(Debug, Clone)]
pub struct FuzzPolicy {
    eligible_types: BTreeSet<String>,
    dummy_values: BTreeMap<String, Vec<String>>,
    excluded_functions: BTreeSet<String>,
}

/// Types whose content is interesting to fuzz with randomized bytes/text.
/// xml would qualify but requires a server built with xml support.
const ELIGIBLE_TYPES: &[&str] = &["text", "cstring", "bytea", "name", "json", "jsonb"];

/// Known-valid minimal literals per catalog type. A position whose type is
/// absent here cannot be filled, which abandons the whole (function,
/// position) pair.
const DUMMY_VALUES: &[(&str, &[&str])] = &[
    ("abstime", &["0"]),
    ("bigint", &["0"]),
    ("boolean", &["f"]),
    ("bytea", &[""]),
    ("character", &[""]),
    ("date", &["2000-01-01"]),
    ("double precision", &["0.0"]),
    ("integer", &["0"]),
    ("interval", &["1 second"]),
    ("json", &["{}"]),
    ("jsonb", &["{}"]),
    ("name", &[""]),
    ("numeric", &["0"]),
    ("oid", &["23"]),
    ("real", &["0.0"]),
    ("regclass", &["pg_proc"]),
    ("regconfig", &["3748"]),
    ("regdictionary", &["37650"]),
    ("reltime", &["0"]),
    ("smallint", &["0"]),
    ("text", &[""]),
    ("text[]", &["{}"]),
    ("time with time zone", &["12:00:00"]),
    ("time without time zone", &["12:00:00"]),
    ("timestamp with time zone", &["2000-01-01 12:00:00"]),
    ("timestamp without time zone", &["2000-01-01 12:00:00"]),
    ("tsquery", &[""]),
    ("tsvector", &[""]),
];

/// Functions that are too slow or pathological to fuzz. Mostly the regex
/// family: the fuzzer ends up exercising the regex engine, not the function.
const EXCLUDED_FUNCTIONS: &[&str] = &[
    "ts_debug",
    "database_to_xmlschema",
    "database_to_xml",
    "database_to_xml_and_xmlschema",
    "nameregexeq",
    "nameregexne",
    "textregexeq",
    "textregexne",
    "texticregexeq",
    "texticregexne",
    "nameicregexeq",
    "nameicregexne",
    "bpcharicregexeq",
    "bpcharicregexne",
    "bpcharregexeq",
    "bpcharregexne",
    "regexp_replace",
    "regexp_match",
    "regexp_matches",
    "regexp_split_to_table",
    "regexp_split_to_array",
    "regexeqsel",
    "icregexeqsel",
    "regexnesel",
    "icregexnesel",
    "regexeqjoinsel",
    "icregexeqjoinsel",
    "regexnejoinsel",
    "icregexnejoinsel",
];

impl Default for FuzzPolicy {
    fn default() -> Self {
        Self {
            eligible_types: ELIGIBLE_TYPES.iter().map(|t| t.to_string()).collect(),
            dummy_values: DUMMY_VALUES
                .iter()
                .map(|(t, vs)| (t.to_string(), vs.iter().map(|v| v.to_string()).collect()))
                .collect(),
            excluded_functions: EXCLUDED_FUNCTIONS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl FuzzPolicy {
    /// An empty policy, for tests that build theirs from scratch.
    pub fn empty() -> Self {
        Self {
            eligible_types: BTreeSet::new(),
            dummy_values: BTreeMap::new(),
            excluded_functions: BTreeSet::new(),
        }
    }

    /// Whether a parameter of this type is a fuzz target.
    pub fn is_eligible(&self, type_name: &str) -> bool {
        self.eligible_types.contains(type_name)
    }

    pub fn eligible_types(&self) -> impl Iterator<Item = &str> {
        self.eligible_types.iter().map(|t| t.as_str())
    }

    /// Registered literals for a type, or `None` if the type cannot be
    /// filled as a co-parameter.
    pub fn dummy_literals(&self, type_name: &str) -> Option<&[String]> {
        self.dummy_values.get(type_name).map(|v| v.as_slice())
    }

    pub fn is_excluded(&self, function_name: &str) -> bool {
        self.excluded_functions.contains(function_name)
    }

    /// Add a function name to the exclusion list.
    pub fn exclude(&mut self, function_name: impl Into<String>) {
        self.excluded_functions.insert(function_name.into());
    }

    /// Mark a type as a fuzz target.
    pub fn add_eligible_type(&mut self, type_name: impl Into<String>) {
        self.eligible_types.insert(type_name.into());
    }

    /// Register dummy literals for a type, replacing any existing entry.
    pub fn register_dummy(&mut self, type_name: impl Into<String>, literals: Vec<String>) {
        self.dummy_values.insert(type_name.into(), literals);
    }
}
