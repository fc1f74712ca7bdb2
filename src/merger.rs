use std::collections::hash_map::{Entry, HashMap};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{DumpError, Result};
use crate::launcher::Worker;
use crate::process::ProcessLauncher;

// Output files keyed by file name, opened the first time any worker produces
// that name.
struct Outputs<'a> {
    dir: &'a Path,
    files: HashMap<OsString, (PathBuf, BufWriter<File>)>,
    order: Vec<OsString>,
}

impl<'a> Outputs<'a> {
    fn new(dir: &'a Path) -> Self {
        Self {
            dir,
            files: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn writer(&mut self, name: &OsString) -> Result<&mut BufWriter<File>> {
        match self.files.entry(name.clone()) {
            Entry::Occupied(entry) => Ok(&mut entry.into_mut().1),
            Entry::Vacant(entry) => {
                let path = self.dir.join(name);
                let file = File::create(&path).map_err(DumpError::fs(&path))?;
                self.order.push(name.clone());
                Ok(&mut entry.insert((path, BufWriter::new(file))).1)
            }
        }
    }

    fn close(mut self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::with_capacity(self.order.len());
        for name in &self.order {
            if let Some((path, mut writer)) = self.files.remove(name) {
                writer.flush().map_err(DumpError::fs(&path))?;
                paths.push(path);
            }
        }
        Ok(paths)
    }
}

/// Wait on every worker in index order and append each of its output files to
/// the same-named file in `output_dir`.
///
/// The first worker, by index, that exits unsuccessfully aborts the merge.
/// Files already merged from earlier workers are left in place. Returns the
/// merged output paths in first-seen order.
pub fn merge<L: ProcessLauncher>(
    launcher: &L,
    accession: &str,
    workers: Vec<Worker<L::Handle>>,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut outputs = Outputs::new(output_dir);

    for worker in workers {
        let Worker {
            index,
            block,
            scratch,
            handle,
        } = worker;

        let status = launcher
            .wait(handle)
            .map_err(|source| DumpError::Wait {
                accession: accession.to_string(),
                index,
                block,
                source,
            })?;
        if !status.success() {
            tracing::error!(accession, index, %block, %status, "dump worker failed");
            return Err(DumpError::Worker {
                accession: accession.to_string(),
                index,
                block,
                status,
            });
        }
        tracing::debug!(accession, index, "dump worker finished");

        for piece in scratch_files(&scratch)? {
            let Some(name) = piece.file_name().map(|name| name.to_owned()) else {
                continue;
            };
            let writer = outputs.writer(&name)?;
            append(&piece, writer)?;
            fs::remove_file(&piece).map_err(DumpError::fs(&piece))?;
            tracing::trace!(accession, index, file = ?name, "merged piece");
        }
    }

    outputs.close()
}

// Regular files in a worker's scratch directory, sorted by name.
fn scratch_files(scratch: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(scratch).map_err(DumpError::fs(scratch))? {
        let entry = entry.map_err(DumpError::fs(scratch))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        } else {
            tracing::warn!(path = %path.display(), "skipping non-file scratch entry");
        }
    }
    files.sort();
    Ok(files)
}

fn append(piece: &Path, writer: &mut impl Write) -> Result<u64> {
    let mut reader = File::open(piece).map_err(DumpError::fs(piece))?;
    io::copy(&mut reader, writer).map_err(DumpError::fs(piece))
}
