//! Parallel wrapper around an SRA dump tool.
//!
//! An archive's spot range is split into contiguous blocks, one dump process
//! runs per block in its own scratch directory, and same-named output files
//! are concatenated back together in block order.

pub mod accession;
pub mod blocks;
pub mod counter;
pub mod error;
pub mod launcher;
pub mod merger;
pub mod orchestrator;
pub mod process;

pub use blocks::{split, Block};
pub use error::{DumpError, Result};
pub use orchestrator::{AccessionReport, DumpParams, Orchestrator, Tools};
pub use process::{Captured, ExitReport, ProcessLauncher, SystemLauncher};

pub const TOOL_NAME: &str = "parallel-fastq-dump";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
