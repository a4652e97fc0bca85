#![allow(clippy::print_stderr)]

use anyhow::Result;
use clap::Parser;

use ptrsafe::cli::args::CliArgs;
use ptrsafe::cli::driver;

fn main() -> Result<()> {
    // PTRSAFE_LOG / RUST_LOG enable tracing; PTRSAFE_LOG_FORMAT=tree|json|text.
    ptrsafe::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let outcome = driver::run(&args)?;
    if !outcome.converged {
        eprintln!(
            "warning: repair did not settle within {} rounds; categories may be too safe",
            outcome.rounds
        );
    }
    Ok(())
}
