use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::blocks::Block;
use crate::process::ExitReport;

/// Failures of a parallel dump run. None of them are retried.
#[derive(Debug, Error)]
pub enum DumpError {
    #[error(
        "unable to count spots in {accession} (stat tool {status})\n\
         --- stdout ---\n{stdout}\n--- stderr ---\n{stderr}"
    )]
    Parse {
        accession: String,
        status: ExitReport,
        stdout: String,
        stderr: String,
    },
    #[error("dump worker {index} for {accession} (spots {block}) {status}")]
    Worker {
        accession: String,
        index: usize,
        block: Block,
        status: ExitReport,
    },
    #[error("lost track of dump worker {index} for {accession} (spots {block}): {source}")]
    Wait {
        accession: String,
        index: usize,
        block: Block,
        #[source]
        source: io::Error,
    },
    #[error("filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid spot range: {0}")]
    InvalidRange(String),
}

impl DumpError {
    pub(crate) fn fs(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| DumpError::Filesystem { path, source }
    }
}

pub type Result<T, E = DumpError> = std::result::Result<T, E>;
