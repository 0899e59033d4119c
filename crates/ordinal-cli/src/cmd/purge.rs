use crate::cmd::{fail_ordering, open_project};
use crate::output::{OutputMode, render};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct PurgeArgs {
    /// Content type whose trash is emptied.
    #[arg(long = "type", default_value = "page")]
    pub record_type: String,
}

#[derive(Debug, Serialize)]
struct PurgeReport<'a> {
    record_type: &'a str,
    deleted: usize,
}

/// Execute `ord purge-trash`. Children of deleted records move up to the
/// deleted record's parent.
pub fn run_purge(args: &PurgeArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let mut service = open_project(project_root, output)?.into_service();
    let deleted = service
        .purge_trash(&args.record_type)
        .map_err(|e| fail_ordering(output, e))?;

    let report = PurgeReport {
        record_type: &args.record_type,
        deleted,
    };
    render(output, &report, |r, w| {
        writeln!(w, "✓ Permanently deleted {} trashed {} record(s)", r.deleted, r.record_type)
    })
}
