use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use crate::blocks::Block;
use crate::error::{DumpError, Result};
use crate::process::ProcessLauncher;

/// A dump process working on one block, writing into its own scratch directory.
#[derive(Debug)]
pub struct Worker<H> {
    pub index: usize,
    pub block: Block,
    pub scratch: PathBuf,
    pub handle: H,
}

// Dump tool arguments for one block. Passthrough flags are forwarded untouched
// and the accession always comes last.
pub fn dump_args(block: &Block, scratch: &Path, passthrough: &[String], accession: &str) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-N".into(),
        block.start.to_string().into(),
        "-X".into(),
        block.end.to_string().into(),
        "-O".into(),
        scratch.as_os_str().to_owned(),
    ];
    args.extend(passthrough.iter().map(OsString::from));
    args.push(accession.into());
    args
}

/// Start one dump process per block, in block order, without waiting on any.
/// Worker `i` writes into `<scratch_root>/<i>`.
///
/// If a block cannot be started, the workers already running are waited on
/// before the error is returned, so none of them outlives its scratch
/// directory.
pub fn launch<L: ProcessLauncher>(
    launcher: &L,
    dump_tool: &OsStr,
    blocks: &[Block],
    accession: &str,
    passthrough: &[String],
    scratch_root: &Path,
) -> Result<Vec<Worker<L::Handle>>> {
    let mut workers = Vec::with_capacity(blocks.len());
    for (index, block) in blocks.iter().enumerate() {
        match start_worker(launcher, dump_tool, index, block, accession, passthrough, scratch_root) {
            Ok(worker) => workers.push(worker),
            Err(e) => {
                drain(launcher, accession, workers);
                return Err(e);
            }
        }
    }
    Ok(workers)
}

fn start_worker<L: ProcessLauncher>(
    launcher: &L,
    dump_tool: &OsStr,
    index: usize,
    block: &Block,
    accession: &str,
    passthrough: &[String],
    scratch_root: &Path,
) -> Result<Worker<L::Handle>> {
    let scratch = scratch_root.join(index.to_string());
    fs::create_dir(&scratch).map_err(DumpError::fs(&scratch))?;

    let args = dump_args(block, &scratch, passthrough, accession);
    let handle = launcher
        .start(dump_tool, &args, None)
        .map_err(|source| DumpError::Spawn {
            program: dump_tool.to_string_lossy().into_owned(),
            source,
        })?;
    tracing::debug!(accession, index, %block, "started dump worker");

    Ok(Worker {
        index,
        block: *block,
        scratch,
        handle,
    })
}

// Wait out workers whose output will never be merged.
fn drain<L: ProcessLauncher>(launcher: &L, accession: &str, workers: Vec<Worker<L::Handle>>) {
    for worker in workers {
        tracing::warn!(accession, index = worker.index, "waiting on dump worker after launch failure");
        if let Err(e) = launcher.wait(worker.handle) {
            tracing::warn!(accession, index = worker.index, "could not wait on dump worker: {e}");
        }
    }
}
