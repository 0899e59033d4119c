use crate::cmd::{fail_ordering, open_project};
use crate::output::{OutputMode, render};
use anyhow::Result;
use clap::Args;
use ordinal_core::error::OrderingError;
use ordinal_core::model::RecordId;
use ordinal_core::store::RecordStore;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Record id.
    pub id: RecordId,

    /// New lifecycle status (e.g. `publish`, `draft`, `trash`).
    pub status: String,
}

#[derive(Debug, Serialize)]
struct StatusChange {
    id: RecordId,
    from: String,
    to: String,
}

pub fn run_status(args: &StatusArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let mut project = open_project(project_root, output)?;
    let status = project.parse_status(&args.status, output)?;

    let record = project
        .store
        .get_record(args.id)
        .map_err(|e| fail_ordering(output, OrderingError::Store(e)))?
        .ok_or_else(|| fail_ordering(output, OrderingError::NotFound(args.id)))?;

    project
        .store
        .set_status(args.id, &status)
        .map_err(|e| fail_ordering(output, OrderingError::Store(e)))?;

    let change = StatusChange {
        id: args.id,
        from: record.status.to_string(),
        to: status.to_string(),
    };
    render(output, &change, |c, w| {
        writeln!(w, "✓ #{} {} -> {}", c.id, c.from, c.to)
    })
}
