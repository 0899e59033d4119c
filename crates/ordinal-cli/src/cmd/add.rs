use crate::cmd::{fail_ordering, open_project};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use anyhow::Result;
use clap::Args;
use ordinal_core::db::NewRecord;
use ordinal_core::error::OrderingError;
use ordinal_core::model::RecordId;
use ordinal_core::store::RecordStore;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Record title.
    #[arg(long)]
    pub title: String,

    /// Content type.
    #[arg(long = "type", default_value = "page")]
    pub record_type: String,

    /// Parent record id. Omit for a top-level record.
    #[arg(long)]
    pub parent: Option<RecordId>,

    /// Lifecycle status.
    #[arg(long, default_value = "publish")]
    pub status: String,

    /// Initial position among siblings.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub position: i64,
}

pub fn run_add(args: &AddArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let mut project = open_project(project_root, output)?;
    let status = project.parse_status(&args.status, output)?;

    if let Some(parent) = args.parent {
        let exists = project
            .store
            .get_record(parent)
            .map_err(|e| fail_ordering(output, OrderingError::Store(e)))?
            .is_some();
        if !exists {
            return Err(fail_ordering(output, OrderingError::NotFound(parent)));
        }
    }

    let record = project
        .store
        .insert_record(
            &NewRecord::new(args.record_type.trim(), args.title.clone())
                .with_status(status)
                .with_position(args.position)
                .with_parent(args.parent),
        )
        .map_err(|e| fail_ordering(output, OrderingError::Store(e)))?;

    render_mode(
        output,
        &record,
        |r, w| writeln!(w, "{}\t{}\t{}", r.id, r.position, r.title),
        |r, w| {
            pretty_section(w, &format!("Added {} #{}", r.record_type, r.id))?;
            pretty_kv(w, "Title", &r.title)?;
            pretty_kv(w, "Status", r.status.as_str())?;
            pretty_kv(w, "Position", r.position.to_string())?;
            pretty_kv(
                w,
                "Parent",
                r.parent_id.map_or_else(|| "(top level)".to_string(), |p| p.to_string()),
            )
        },
    )
}
