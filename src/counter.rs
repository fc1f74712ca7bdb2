use std::ffi::{OsStr, OsString};

use crate::error::{DumpError, Result};
use crate::process::{Captured, ProcessLauncher};

// Ask the stat tool for the number of spots in `accession`. The tool prints
// one pipe-delimited line per read group; the third field starts with the
// spot count of that group (`<spots>:<bases>...`) and the total is their sum.
pub fn count_spots<L: ProcessLauncher>(
    launcher: &L,
    stat_tool: &OsStr,
    accession: &str,
) -> Result<u64> {
    let args: Vec<OsString> = vec!["--meta".into(), "--quick".into(), accession.into()];
    let captured = launcher
        .capture(stat_tool, &args)
        .map_err(|source| DumpError::Spawn {
            program: stat_tool.to_string_lossy().into_owned(),
            source,
        })?;

    let total = sum_spot_counts(&captured.stdout)
        .ok_or_else(|| parse_error(accession, captured.clone()))?;
    tracing::debug!(accession, total, "counted spots");
    Ok(total)
}

fn sum_spot_counts(stdout: &str) -> Option<u64> {
    stdout
        .trim_end()
        .split('\n')
        .map(|line| {
            line.split('|')
                .nth(2)?
                .split(':')
                .next()?
                .trim()
                .parse::<u64>()
                .ok()
        })
        .sum()
}

fn parse_error(accession: &str, captured: Captured) -> DumpError {
    DumpError::Parse {
        accession: accession.to_string(),
        status: captured.status,
        stdout: captured.stdout,
        stderr: captured.stderr,
    }
}
