use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::{Command, CommandFactory, Parser};

use parallel_dump::{accession, DumpParams, Tools};

#[derive(Parser, Debug)]
#[command(
    name = "parallel-fastq-dump",
    author,
    about = "Run several fastq-dump processes over one SRA archive and merge their output",
    long_about = None,
    disable_version_flag = true
)]
pub struct Cli {
    /// SRA accession or .sra file to dump; may be given more than once
    #[arg(short = 's', long = "sra-id", value_name = "ID")]
    sra_ids: Vec<String>,

    /// number of dump processes per accession
    #[arg(
        short,
        long,
        default_value_t = 1,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    threads: usize,

    /// directory for the merged output files
    #[arg(short = 'O', long, value_name = "DIR", default_value = ".")]
    outdir: PathBuf,

    /// parent directory for per-worker scratch space (default is the system temp dir)
    #[arg(long, value_name = "DIR")]
    tmpdir: Option<PathBuf>,

    /// first spot id to dump
    #[arg(
        short = 'N',
        long = "minSpotId",
        default_value_t = 1,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    min_spot_id: u64,

    /// last spot id to dump (default is the last spot of the archive)
    #[arg(short = 'X', long = "maxSpotId")]
    max_spot_id: Option<u64>,

    /// print the version of this wrapper and of the dump tool
    #[arg(short = 'V', long)]
    version: bool,

    /// log filter used when RUST_LOG is unset
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: String,

    /// dump executable run once per block
    #[arg(long, value_name = "PROGRAM", env = "PFD_DUMP_TOOL", default_value = "fastq-dump")]
    dump_tool: PathBuf,

    /// executable used to count spots
    #[arg(long, value_name = "PROGRAM", env = "PFD_STAT_TOOL", default_value = "sra-stat")]
    stat_tool: PathBuf,
}

impl Cli {
    // Parse the process arguments. Arguments this command does not define are
    // returned separately instead of being rejected.
    pub fn parse_with_extra(args: impl IntoIterator<Item = String>) -> (Self, Vec<String>) {
        let mut args = args.into_iter();
        let program = args.next().unwrap_or_else(|| "parallel-fastq-dump".to_string());

        let mut command = Cli::command();
        command.build();
        let (known, extra) = split_known(&command, args);

        let cli = Cli::parse_from(std::iter::once(program).chain(known));
        (cli, extra)
    }

    pub fn version(&self) -> bool {
        self.version
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn tools(&self) -> Tools {
        Tools {
            dump: self.dump_tool.clone(),
            stat: self.stat_tool.clone(),
        }
    }

    // Unknown arguments that look like archives become accessions; the rest is
    // passed through to the dump tool.
    pub fn into_params(self, extra: Vec<String>) -> DumpParams {
        let tools = self.tools();
        let (archives, passthrough) = accession::partition(extra);
        let mut accessions = self.sra_ids;
        accessions.extend(archives);

        DumpParams {
            accessions,
            threads: self.threads,
            outdir: self.outdir,
            tmpdir: self.tmpdir,
            min_spot: self.min_spot_id,
            max_spot: self.max_spot_id,
            passthrough,
            tools,
        }
    }
}

// Walk the raw arguments, keeping options `command` defines (and their values)
// apart from everything else. Handles `--long value`, `--long=value`,
// `-s value` and `-svalue`.
fn split_known(
    command: &Command,
    mut args: impl Iterator<Item = String>,
) -> (Vec<String>, Vec<String>) {
    let mut known = Vec::new();
    let mut extra = Vec::new();

    while let Some(arg) = args.next() {
        if arg == "--" {
            extra.extend(args.by_ref());
            break;
        }
        match lookup(command, &arg) {
            Some((takes_value, inline)) => {
                known.push(arg);
                if takes_value && !inline {
                    if let Some(value) = args.next() {
                        known.push(value);
                    }
                }
            }
            None => extra.push(arg),
        }
    }
    (known, extra)
}

// `Some((takes_value, value_is_inline))` when `arg` names one of our options.
fn lookup(command: &Command, arg: &str) -> Option<(bool, bool)> {
    if let Some(long) = arg.strip_prefix("--") {
        let (name, inline) = match long.split_once('=') {
            Some((name, _)) => (name, true),
            None => (long, false),
        };
        let found = command
            .get_arguments()
            .find(|a| a.get_long() == Some(name))?;
        return Some((found.get_action().takes_values(), inline));
    }

    let short = arg.strip_prefix('-')?;
    let mut chars = short.chars();
    let flag = chars.next()?;
    let found = command
        .get_arguments()
        .find(|a| a.get_short() == Some(flag))?;
    Some((found.get_action().takes_values(), chars.next().is_some()))
}
