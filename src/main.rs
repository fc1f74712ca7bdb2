use std::ffi::OsString;

use clap::CommandFactory;

mod cli;

use anyhow::Result;
use cli::Cli;
use parallel_dump::{Orchestrator, ProcessLauncher, SystemLauncher, TOOL_NAME, VERSION};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn setup_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(level.parse()?)
        .from_env_lossy();

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}

// Print our own version, then whatever the dump tool reports for itself.
fn print_version(cli: &Cli) -> Result<()> {
    println!("{TOOL_NAME} : {VERSION}");
    let dump_tool = cli.tools().dump;
    match SystemLauncher.capture(dump_tool.as_os_str(), &[OsString::from("--version")]) {
        Ok(captured) => print!("{}", captured.stdout),
        Err(e) => tracing::warn!(tool = %dump_tool.display(), "could not query dump tool version: {e}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    // Parse CLI arguments; anything we do not define is kept for the dump tool.
    let (cli, extra) = Cli::parse_with_extra(std::env::args());
    setup_tracing(cli.log_level())?;

    if cli.version() {
        return print_version(&cli);
    }

    let params = cli.into_params(extra);
    if params.accessions.is_empty() {
        Cli::command().print_help()?;
        eprintln!();
        eprintln!("error: no SRA accession given (use -s/--sra-id)");
        std::process::exit(1);
    }

    // Count, split, dump and merge each accession; stop at the first failure.
    let orchestrator = Orchestrator::new(SystemLauncher, params);
    match orchestrator.run() {
        Ok(reports) => {
            for report in &reports {
                tracing::info!(
                    accession = %report.accession,
                    spots = report.total_spots,
                    files = report.outputs.len(),
                    "done"
                );
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    }
}
