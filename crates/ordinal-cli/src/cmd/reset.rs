use crate::cmd::{fail_ordering, open_project};
use crate::output::{OutputMode, render};
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Content type whose manual order is cleared.
    #[arg(long = "type", default_value = "page")]
    pub record_type: String,
}

#[derive(Debug, Serialize)]
struct ResetReport<'a> {
    record_type: &'a str,
    reset: usize,
}

/// Execute `ord reset`: every record of the type goes back to position 0,
/// so listings fall back to title order.
pub fn run_reset(args: &ResetArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let mut service = open_project(project_root, output)?.into_service();
    let reset = service
        .reset_order(&args.record_type)
        .map_err(|e| fail_ordering(output, e))?;

    let report = ResetReport {
        record_type: &args.record_type,
        reset,
    };
    render(output, &report, |r, w| {
        writeln!(w, "✓ Reset order of {} {} record(s)", r.reset, r.record_type)
    })
}
