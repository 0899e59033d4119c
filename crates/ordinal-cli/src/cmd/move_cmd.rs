//! `ord move` runs the resequencer for a drag-and-drop move.
//!
//! Without `--settle` it runs a single step and prints the continuation a
//! client would send next; `--settle` follows continuations to the end.

use crate::cmd::{fail_ordering, open_project};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use anyhow::Result;
use clap::Args;
use ordinal_core::model::{MoveRequest, MoveResult, Placement, RecordId};
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::Path;

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Id of the record that was dragged.
    pub id: RecordId,

    /// Record now directly before the moved one.
    #[arg(long)]
    pub prev: Option<RecordId>,

    /// Record now directly after the moved one.
    #[arg(long)]
    pub next: Option<RecordId>,

    /// Position assigned to the first record processed (continuations).
    #[arg(long, allow_negative_numbers = true)]
    pub start: Option<i64>,

    /// Ids already handled by an earlier step (continuations).
    #[arg(long = "exclude", value_delimiter = ',')]
    pub excluded: Vec<RecordId>,

    /// Follow continuations until the move is settled.
    #[arg(long)]
    pub settle: bool,
}

impl MoveArgs {
    fn request(&self) -> MoveRequest {
        MoveRequest {
            moved_id: self.id,
            prev_id: self.prev,
            next_id: self.next,
            start: self.start,
            excluded: self.excluded.iter().copied().collect::<BTreeSet<_>>(),
        }
    }
}

pub fn run_move(args: &MoveArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let mut service = open_project(project_root, output)?.into_service();
    let request = args.request();

    let result = if args.settle {
        service.settle(&request)
    } else {
        service.move_record(&request)
    }
    .map_err(|e| fail_ordering(output, e))?;

    render_mode(output, &result, render_text, render_pretty)
}

fn continuation_args(next: &MoveRequest) -> String {
    let mut parts = vec![format!("ord move {}", next.moved_id)];
    if let Some(prev) = next.prev_id {
        parts.push(format!("--prev {prev}"));
    }
    if let Some(following) = next.next_id {
        parts.push(format!("--next {following}"));
    }
    if let Some(start) = next.start {
        parts.push(format!("--start {start}"));
    }
    if !next.excluded.is_empty() {
        let ids: Vec<String> = next.excluded.iter().map(ToString::to_string).collect();
        parts.push(format!("--exclude {}", ids.join(",")));
    }
    parts.join(" ")
}

fn render_text(result: &MoveResult, w: &mut dyn Write) -> io::Result<()> {
    for (id, placement) in &result.positions {
        match placement {
            Placement::Moved {
                position,
                parent_id,
                depth,
            } => {
                let parent = parent_id.map_or_else(|| "-".to_string(), |p| p.to_string());
                writeln!(w, "{id}\t{position}\tmoved\tparent={parent}\tdepth={depth}")?;
            }
            Placement::Sibling(position) => writeln!(w, "{id}\t{position}")?,
        }
    }
    match &result.next {
        Some(next) => writeln!(w, "next: {}", continuation_args(next))?,
        None => writeln!(w, "settled")?,
    }
    if result.children_detected {
        writeln!(w, "children_detected")?;
    }
    Ok(())
}

fn render_pretty(result: &MoveResult, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Positions")?;
    for (id, placement) in &result.positions {
        match placement {
            Placement::Moved {
                position,
                parent_id,
                depth,
            } => {
                let parent =
                    parent_id.map_or_else(|| "top level".to_string(), |p| format!("under #{p}"));
                writeln!(w, "  #{id:<8} -> {position:<5} (moved, {parent}, depth {depth})")?;
            }
            Placement::Sibling(position) => writeln!(w, "  #{id:<8} -> {position}")?,
        }
    }
    writeln!(w)?;
    match &result.next {
        Some(next) => {
            pretty_kv(w, "Status", "more siblings remain")?;
            pretty_kv(w, "Continue", continuation_args(next))?;
        }
        None => pretty_kv(w, "Status", "settled")?,
    }
    if result.children_detected {
        pretty_kv(w, "Note", "moved record has children; reload the full list")?;
    }
    Ok(())
}
