use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the ptrsafe binary.
#[derive(Parser, Debug)]
#[command(
    name = "ptrsafe",
    version,
    about = "Infer checked pointer categories for a whole C program"
)]
pub struct CliArgs {
    /// Translation units, as JSON written by the front end.
    #[arg(value_name = "UNIT", required = true)]
    pub units: Vec<PathBuf>,

    /// JSON file with inference options (camelCase keys).
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Do not equate bodiless declarations of the same function.
    #[arg(long = "no-merge-decls")]
    pub no_merge_decls: bool,

    /// Treat a bodiless extern as safe. May be repeated; adds to the
    /// configured list.
    #[arg(long = "allow-extern", value_name = "NAME")]
    pub allow_extern: Vec<String>,

    /// Upper bound on solve/repair rounds.
    #[arg(long = "max-repair-iterations", value_name = "N")]
    pub max_repair_iterations: Option<u32>,

    /// Write the assignment here instead of stdout.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pub pretty: bool,
}
