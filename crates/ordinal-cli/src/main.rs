#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use ordinal_core::config::load_user_config;
use output::{OutputMode, resolve_output_mode};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "ord: manual drag-and-drop ordering for hierarchical records",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output (shorthand for `--format json`).
    #[arg(long, global = true)]
    json: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Project",
        about = "Initialize an ordinal project",
        long_about = "Create .ordinal/ with a default config and an empty record store.",
        after_help = "EXAMPLES:\n    # Initialize in the current directory\n    ord init\n\n    # Rewrite the config of an existing project\n    ord init --force"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Records",
        about = "Add a record",
        after_help = "EXAMPLES:\n    # Add a top-level page\n    ord add --title \"Home\"\n\n    # Add a child page at position 2\n    ord add --title \"Team\" --parent 1 --position 2"
    )]
    Add(cmd::add::AddArgs),

    #[command(
        next_help_heading = "Records",
        about = "Change a record's lifecycle status",
        after_help = "EXAMPLES:\n    # Move a record to the trash\n    ord status 4 trash"
    )]
    Status(cmd::status::StatusArgs),

    #[command(
        next_help_heading = "Records",
        about = "List records in manual order",
        long_about = "List records depth-first, each sibling group in (position, title) order.",
        after_help = "EXAMPLES:\n    # Show the page tree\n    ord list\n\n    # Include trashed records\n    ord list --include-inactive --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Ordering",
        about = "Move a record between two siblings",
        long_about = "Resequence siblings after a drag-and-drop move. Large sibling groups are processed in batches; without --settle the continuation is printed.",
        after_help = "EXAMPLES:\n    # Drop record 3 between 1 and 2\n    ord move 3 --prev 1 --next 2\n\n    # Drop record 1 at the end and process every batch\n    ord move 1 --prev 9 --settle"
    )]
    Move(cmd::move_cmd::MoveArgs),

    #[command(
        next_help_heading = "Ordering",
        about = "Reset manual order of a content type",
        after_help = "EXAMPLES:\n    # Fall back to title order for pages\n    ord reset --type page"
    )]
    Reset(cmd::reset::ResetArgs),

    #[command(
        name = "purge-trash",
        next_help_heading = "Ordering",
        about = "Permanently delete trashed records",
        after_help = "EXAMPLES:\n    # Empty the page trash\n    ord purge-trash"
    )]
    PurgeTrash(cmd::purge::PurgeArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("ORDINAL_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "ordinal=debug,info"
        } else {
            "ordinal=info,warn"
        })
    });

    let format = env::var("ORDINAL_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let user_config = load_user_config().unwrap_or_else(|e| {
        warn!(error = %e, "ignoring unreadable user config");
        ordinal_core::config::UserConfig::default()
    });
    let output = resolve_output_mode(cli.format, cli.json, user_config.output.as_deref());
    let project_root = env::current_dir()?;

    match cli.command {
        Commands::Init(ref args) => cmd::init::run_init(args, output, &project_root),
        Commands::Add(ref args) => cmd::add::run_add(args, output, &project_root),
        Commands::Status(ref args) => cmd::status::run_status(args, output, &project_root),
        Commands::List(ref args) => cmd::list::run_list(args, output, &project_root),
        Commands::Move(ref args) => cmd::move_cmd::run_move(args, output, &project_root),
        Commands::Reset(ref args) => cmd::reset::run_reset(args, output, &project_root),
        Commands::PurgeTrash(ref args) => cmd::purge::run_purge(args, output, &project_root),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordinal_core::model::RecordId;

    #[test]
    fn json_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["ord", "list", "--json"]);
        assert!(cli.json);
    }

    #[test]
    fn format_flag_parses_before_subcommand() {
        let cli = Cli::parse_from(["ord", "--format", "text", "list"]);
        assert_eq!(cli.format, Some(OutputMode::Text));
    }

    #[test]
    fn move_parses_neighbours_and_continuation() {
        let cli = Cli::parse_from([
            "ord", "move", "60", "--prev", "59", "--start", "51", "--exclude", "1,2", "--exclude",
            "60",
        ]);
        let Commands::Move(args) = cli.command else {
            panic!("expected move command");
        };
        assert_eq!(args.id, RecordId::new(60));
        assert_eq!(args.prev, Some(RecordId::new(59)));
        assert_eq!(args.next, None);
        assert_eq!(args.start, Some(51));
        assert_eq!(
            args.excluded,
            vec![RecordId::new(1), RecordId::new(2), RecordId::new(60)]
        );
        assert!(!args.settle);
    }

    #[test]
    fn move_rejects_non_positive_ids() {
        assert!(Cli::try_parse_from(["ord", "move", "0"]).is_err());
        assert!(Cli::try_parse_from(["ord", "move", "abc"]).is_err());
    }

    #[test]
    fn add_defaults_to_published_page() {
        let cli = Cli::parse_from(["ord", "add", "--title", "Home"]);
        let Commands::Add(args) = cli.command else {
            panic!("expected add command");
        };
        assert_eq!(args.record_type, "page");
        assert_eq!(args.status, "publish");
        assert_eq!(args.position, 0);
        assert!(args.parent.is_none());
    }

    #[test]
    fn purge_trash_uses_kebab_case_name() {
        let cli = Cli::parse_from(["ord", "purge-trash", "--type", "faq"]);
        assert!(matches!(cli.command, Commands::PurgeTrash(ref a) if a.record_type == "faq"));
    }
}
