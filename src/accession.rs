use std::path::Path;

const ARCHIVE_EXTENSION: &str = ".sra";
const RUN_PREFIXES: [&str; 3] = ["SRR", "ERR", "DRR"];

/// Whether a stray command-line argument names an archive rather than a dump
/// tool flag: its file name ends in `.sra`, or contains a run accession prefix
/// (`SRR`, `ERR`, `DRR`), both case-insensitive.
pub fn is_archive(arg: &str) -> bool {
    let name = Path::new(arg)
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    if name.to_lowercase().ends_with(ARCHIVE_EXTENSION) {
        return true;
    }
    let upper = name.to_uppercase();
    RUN_PREFIXES.iter().any(|prefix| upper.contains(prefix))
}

/// Split unrecognised arguments into extra accessions and dump tool
/// passthrough, keeping the order of each.
pub fn partition(extra: Vec<String>) -> (Vec<String>, Vec<String>) {
    extra.into_iter().partition(|arg| is_archive(arg))
}
