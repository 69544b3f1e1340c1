use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// libpq-style connection string for the target server.
    #[arg(long, default_value = "host=/tmp")]
    pub conninfo: String,

    /// Iterations the engine fuzz primitive runs per template.
    #[arg(long, default_value_t = 100_000)]
    pub iterations: u32,

    /// max_stack_depth (kB) applied to every fuzz session before fuzzing.
    #[arg(long, default_value_t = 7680)]
    pub max_stack_depth_kb: u32,

    /// Load candidate signatures from a JSON snapshot instead of the live
    /// catalog. The exclusion list is still applied to the snapshot.
    #[arg(long, value_name = "PATH")]
    pub catalog_json: Option<PathBuf>,

    /// Write the selected candidate signatures to a JSON snapshot.
    #[arg(long, value_name = "PATH")]
    pub emit_catalog_json: Option<PathBuf>,

    /// Build and print query templates without opening any fuzz session.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Stop after this many candidate functions.
    #[arg(long, value_name = "N")]
    pub max_functions: Option<usize>,

    /// Additional function name to exclude. Can be provided multiple times.
    #[arg(long, value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Write engine failures as JSONL records.
    #[arg(long, value_name = "PATH")]
    pub failures_jsonl: Option<PathBuf>,
}

impl Args {
    /// Validate CLI arguments for conflicts and requirements.
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.dry_run && self.failures_jsonl.is_some() {
            return Err("--failures-jsonl is meaningless with --dry-run".to_string());
        }

        if self.iterations == 0 {
            return Err("--iterations must be at least 1".to_string());
        }

        if self.max_stack_depth_kb == 0 {
            return Err("--max-stack-depth-kb must be at least 1".to_string());
        }

        Ok(())
    }
}
