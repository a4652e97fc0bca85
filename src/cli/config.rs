//! Inference options from a JSON file and the command line.

use anyhow::{Context, Result};
use ptrsafe_infer::InferOptions;
use std::path::Path;

use crate::cli::args::CliArgs;

/// Parse an options document. Missing keys keep their defaults.
pub fn parse_options(source: &str) -> Result<InferOptions> {
    serde_json::from_str(source).context("invalid inference options")
}

pub fn load_options(path: &Path) -> Result<InferOptions> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    parse_options(&source).with_context(|| format!("failed to parse config: {}", path.display()))
}

/// Options for a run: the config file (or defaults) with command-line
/// overrides applied on top.
pub fn resolve_options(args: &CliArgs) -> Result<InferOptions> {
    let mut options = match &args.config {
        Some(path) => load_options(path)?,
        None => InferOptions::default(),
    };
    if args.no_merge_decls {
        options.merge_multiple_func_decls = false;
    }
    for name in &args.allow_extern {
        if !options.is_extern_allowed(name) {
            options.extern_allow_list.push(name.clone());
        }
    }
    if let Some(n) = args.max_repair_iterations {
        options.max_repair_iterations = n;
    }
    Ok(options)
}
