use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use parallel_dump::{Captured, ExitReport, ProcessLauncher};

/// One dump worker as the fake toolkit saw it.
#[derive(Debug, Clone)]
pub struct Started {
    pub accession: String,
    pub start: u64,
    pub end: u64,
    pub outdir: PathBuf,
    pub args: Vec<OsString>,
}

/// Stands in for `sra-stat` and `fastq-dump`.
///
/// A started dump worker writes one FASTQ record per spot of its block straight
/// away; `wait` then reports the exit code configured for that worker.
#[derive(Default)]
pub struct FakeToolkit {
    spots: HashMap<String, u64>,
    stat_output: Option<String>,
    failing: Option<(String, usize)>,
    started: Mutex<Vec<Started>>,
    waited: Mutex<Vec<(String, usize)>>,
    counted: Mutex<Vec<String>>,
}

impl FakeToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_archive(mut self, accession: &str, spots: u64) -> Self {
        self.spots.insert(accession.to_string(), spots);
        self
    }

    pub fn with_stat_output(mut self, stdout: &str) -> Self {
        self.stat_output = Some(stdout.to_string());
        self
    }

    pub fn failing_worker(mut self, accession: &str, index: usize) -> Self {
        self.failing = Some((accession.to_string(), index));
        self
    }

    pub fn started(&self) -> Vec<Started> {
        self.started.lock().unwrap().clone()
    }

    pub fn counted(&self) -> Vec<String> {
        self.counted.lock().unwrap().clone()
    }

    pub fn waited(&self) -> Vec<(String, usize)> {
        self.waited.lock().unwrap().clone()
    }
}

pub fn spot_record(accession: &str, spot: u64) -> String {
    format!("@{accession}.{spot} {spot} length=4\nACGT\n+{accession}.{spot}\nIIII\n")
}

pub fn spot_records(accession: &str, start: u64, end: u64) -> String {
    (start..=end).map(|spot| spot_record(accession, spot)).collect()
}

fn flag_value<'a>(args: &'a [OsString], flag: &str) -> &'a OsStr {
    let at = args.iter().position(|a| a == flag).unwrap();
    &args[at + 1]
}

fn worker_index(outdir: &Path) -> usize {
    outdir
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.parse().ok())
        .unwrap()
}

impl ProcessLauncher for FakeToolkit {
    type Handle = (String, usize);

    fn start(
        &self,
        _program: &OsStr,
        args: &[OsString],
        _cwd: Option<&Path>,
    ) -> io::Result<Self::Handle> {
        let start: u64 = flag_value(args, "-N").to_str().unwrap().parse().unwrap();
        let end: u64 = flag_value(args, "-X").to_str().unwrap().parse().unwrap();
        let outdir = PathBuf::from(flag_value(args, "-O"));
        let accession = args.last().unwrap().to_str().unwrap().to_string();

        if args.iter().any(|a| a == "--split-files") {
            fs::write(
                outdir.join(format!("{accession}_1.fastq")),
                spot_records(&accession, start, end),
            )?;
            fs::write(
                outdir.join(format!("{accession}_2.fastq")),
                spot_records(&accession, start, end),
            )?;
        } else if start <= end {
            fs::write(
                outdir.join(format!("{accession}.fastq")),
                spot_records(&accession, start, end),
            )?;
        }

        let index = worker_index(&outdir);
        self.started.lock().unwrap().push(Started {
            accession: accession.clone(),
            start,
            end,
            outdir,
            args: args.to_vec(),
        });
        Ok((accession, index))
    }

    fn wait(&self, handle: Self::Handle) -> io::Result<ExitReport> {
        let failed = self.failing.as_ref() == Some(&handle);
        self.waited.lock().unwrap().push(handle);
        Ok(ExitReport::from_code(if failed { 1 } else { 0 }))
    }

    fn capture(&self, _program: &OsStr, args: &[OsString]) -> io::Result<Captured> {
        let accession = args.last().unwrap().to_str().unwrap().to_string();
        self.counted.lock().unwrap().push(accession.clone());

        let stdout = match (&self.stat_output, self.spots.get(&accession)) {
            (Some(output), _) => output.clone(),
            (None, Some(spots)) => {
                // two read groups, as sra-stat reports for multi-group runs
                let first = spots / 2;
                format!(
                    "{accession}|SRS1|{first}:{}:{}|:|:|:\n{accession}|SRS2|{}:{}:{}|:|:|:\n",
                    first * 4,
                    first * 4,
                    spots - first,
                    (spots - first) * 4,
                    (spots - first) * 4,
                )
            }
            (None, None) => String::new(),
        };
        let stderr = if stdout.is_empty() {
            format!("sra-stat: {accession} not found")
        } else {
            String::new()
        };
        Ok(Captured {
            status: ExitReport::from_code(if stdout.is_empty() { 3 } else { 0 }),
            stdout,
            stderr,
        })
    }
}
