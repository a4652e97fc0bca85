use anyhow::{Context, Result};
use ptrsafe_ast::{TranslationUnit, load_unit};
use ptrsafe_common::UnitId;
use std::io::Write;
use std::path::Path;
use tracing::debug;

use crate::cli::args::CliArgs;
use crate::cli::config::resolve_options;
use crate::pipeline::{Outcome, Pipeline};

/// Load every unit, numbering them in command-line order.
pub fn load_units(paths: &[impl AsRef<Path>]) -> Result<Vec<TranslationUnit>> {
    paths
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let path = path.as_ref();
            let mut unit =
                load_unit(path).with_context(|| format!("failed to load {}", path.display()))?;
            unit.id = UnitId(i as u32);
            Ok(unit)
        })
        .collect()
}

/// Run the whole analysis described by `args` and write the assignment.
pub fn run(args: &CliArgs) -> Result<Outcome> {
    let options = resolve_options(args)?;
    let units = load_units(args.units.as_slice())?;
    debug!(units = units.len(), ?options, "starting analysis");

    let outcome = Pipeline::new(options).run(&units);
    write_assignment(args, &outcome)?;
    Ok(outcome)
}

fn write_assignment(args: &CliArgs, outcome: &Outcome) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(&outcome.assignment)
    } else {
        serde_json::to_string(&outcome.assignment)
    }
    .context("failed to serialize assignment")?;

    match &args.output {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context("failed to write to stdout")
        }
    }
}
