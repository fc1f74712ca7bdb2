use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::blocks::{split, Block};
use crate::counter::count_spots;
use crate::error::{DumpError, Result};
use crate::launcher::launch;
use crate::merger::merge;
use crate::process::ProcessLauncher;

/// External executables the orchestrator drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tools {
    pub dump: PathBuf,
    pub stat: PathBuf,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            dump: PathBuf::from("fastq-dump"),
            stat: PathBuf::from("sra-stat"),
        }
    }
}

/// Everything a front end collects before a run.
#[derive(Debug, Clone)]
pub struct DumpParams {
    pub accessions: Vec<String>,
    /// Worker processes per accession.
    pub threads: usize,
    pub outdir: PathBuf,
    /// Parent of the per-accession scratch directories; the system temp dir
    /// when unset.
    pub tmpdir: Option<PathBuf>,
    pub min_spot: u64,
    pub max_spot: Option<u64>,
    /// Forwarded verbatim to every dump worker.
    pub passthrough: Vec<String>,
    pub tools: Tools,
}

impl Default for DumpParams {
    fn default() -> Self {
        Self {
            accessions: Vec::new(),
            threads: 1,
            outdir: PathBuf::from("."),
            tmpdir: None,
            min_spot: 1,
            max_spot: None,
            passthrough: Vec::new(),
            tools: Tools::default(),
        }
    }
}

impl DumpParams {
    // The spot range to dump for an archive holding `total` spots, or `None`
    // when there is nothing to dump.
    fn spot_range(&self, accession: &str, total: u64) -> Result<Option<(u64, u64)>> {
        let start = self.min_spot;
        let end = match self.max_spot {
            Some(max) if max > total => {
                tracing::warn!(accession, max, total, "max spot id beyond archive, clamping");
                total
            }
            Some(max) => max,
            None => total,
        };
        if total == 0 {
            return Ok(None);
        }
        if start > end {
            return Err(DumpError::InvalidRange(format!(
                "{accession}: min spot {start} is past max spot {end}"
            )));
        }
        Ok(Some((start, end)))
    }
}

/// Result of dumping one accession.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessionReport {
    pub accession: String,
    pub total_spots: u64,
    pub blocks: Vec<Block>,
    /// Merged files in `outdir`, in the order they were first produced.
    pub outputs: Vec<PathBuf>,
}

pub struct Orchestrator<L> {
    launcher: L,
    params: DumpParams,
}

impl<L: ProcessLauncher> Orchestrator<L> {
    pub fn new(launcher: L, params: DumpParams) -> Self {
        Self { launcher, params }
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Dump every accession in turn. The first failure ends the run; accessions
    /// after it are not attempted.
    pub fn run(&self) -> Result<Vec<AccessionReport>> {
        self.prepare_dirs()?;
        tracing::info!(accessions = ?self.params.accessions, "accessions to dump");
        tracing::info!(args = ?self.params.passthrough, "passthrough arguments");

        let mut reports = Vec::with_capacity(self.params.accessions.len());
        for accession in &self.params.accessions {
            reports.push(self.dump(accession)?);
        }
        Ok(reports)
    }

    // count -> split -> launch -> merge -> cleanup for a single accession.
    pub fn dump(&self, accession: &str) -> Result<AccessionReport> {
        let params = &self.params;
        let total_spots = count_spots(&self.launcher, params.tools.stat.as_os_str(), accession)?;
        tracing::info!(accession, spots = total_spots, "counted spots");

        let Some((start, end)) = params.spot_range(accession, total_spots)? else {
            tracing::warn!(accession, "archive has no spots, nothing to dump");
            return Ok(AccessionReport {
                accession: accession.to_string(),
                total_spots,
                blocks: Vec::new(),
                outputs: Vec::new(),
            });
        };
        let blocks = split(start, end, params.threads)?;
        tracing::info!(
            accession,
            blocks = %blocks.iter().map(Block::to_string).collect::<Vec<_>>().join(", "),
            "split into blocks"
        );

        let scratch_parent = self.scratch_parent();
        // Removed on drop if anything below fails.
        let scratch = tempfile::Builder::new()
            .prefix("pfd_")
            .tempdir_in(&scratch_parent)
            .map_err(DumpError::fs(&scratch_parent))?;
        tracing::info!(accession, scratch = %scratch.path().display(), "scratch directory");

        let workers = launch(
            &self.launcher,
            params.tools.dump.as_os_str(),
            &blocks,
            accession,
            &params.passthrough,
            scratch.path(),
        )?;
        let outputs = merge(&self.launcher, accession, workers, &params.outdir)?;

        let scratch_path = scratch.path().to_path_buf();
        scratch.close().map_err(DumpError::fs(scratch_path))?;
        tracing::info!(accession, files = outputs.len(), "merged worker output");

        Ok(AccessionReport {
            accession: accession.to_string(),
            total_spots,
            blocks,
            outputs,
        })
    }

    fn scratch_parent(&self) -> PathBuf {
        self.params.tmpdir.clone().unwrap_or_else(env::temp_dir)
    }

    fn prepare_dirs(&self) -> Result<()> {
        create_missing(&self.params.outdir)?;
        if let Some(tmp) = &self.params.tmpdir {
            create_missing(tmp)?;
        }
        Ok(())
    }
}

fn create_missing(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        fs::create_dir_all(dir).map_err(DumpError::fs(dir))?;
    }
    Ok(())
}
