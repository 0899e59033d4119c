use crate::cmd::{fail_ordering, open_project};
use crate::output::{OutputMode, Renderable, render_list};
use anyhow::Result;
use clap::Args;
use ordinal_core::error::OrderingError;
use ordinal_core::hierarchy::{TreeRow, flatten_tree};
use ordinal_core::model::{RecordId, Status};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Content type to list.
    #[arg(long = "type", default_value = "page")]
    pub record_type: String,

    /// Also show trashed and auto-draft records.
    #[arg(long)]
    pub include_inactive: bool,
}

#[derive(Debug, Serialize)]
struct ListRow {
    id: RecordId,
    title: String,
    status: Status,
    position: i64,
    parent_id: Option<RecordId>,
    depth: usize,
}

impl From<TreeRow> for ListRow {
    fn from(row: TreeRow) -> Self {
        Self {
            id: row.record.id,
            title: row.record.title,
            status: row.record.status,
            position: row.record.position,
            parent_id: row.record.parent_id,
            depth: row.depth,
        }
    }
}

impl Renderable for ListRow {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let indent = "  ".repeat(self.depth);
        let marker = if self.depth == 0 { "" } else { "└ " };
        write!(w, "{indent}{marker}{} #{} [{}]", self.title, self.id, self.position)?;
        if self.status == Status::Publish {
            writeln!(w)
        } else {
            writeln!(w, " ({})", self.status)
        }
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *w, self)?;
        writeln!(w)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        let parent = self.parent_id.map_or_else(|| "-".to_string(), |p| p.to_string());
        writeln!(
            w,
            "{}  {}  {}  {}  {}  {}",
            self.id, parent, self.depth, self.position, self.status, self.title
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["id", "parent", "depth", "position", "status", "title"]
    }
}

/// Execute `ord list`: the type's records depth-first, each sibling group in
/// manual order.
pub fn run_list(args: &ListArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let project = open_project(project_root, output)?;

    let mut statuses = project.config.statuses.active();
    if args.include_inactive {
        statuses.extend([Status::Trash, Status::AutoDraft]);
    }

    let rows: Vec<ListRow> = flatten_tree(&project.store, &args.record_type, &statuses)
        .map_err(|e| fail_ordering(output, OrderingError::Store(e)))?
        .into_iter()
        .map(ListRow::from)
        .collect();

    if rows.is_empty() && !output.is_json() {
        println!("No {} records.", args.record_type);
        return Ok(());
    }

    render_list(&rows, output)?;
    Ok(())
}
