use crate::cmd::{DB_FILE, PROJECT_DIR, db_path};
use crate::output::{OutputMode, render};
use anyhow::{Context as _, Result};
use clap::Args;
use ordinal_core::db::open_store;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force re-initialization even if `.ordinal/` already exists.
    #[arg(long)]
    pub force: bool,
}

const CONFIG_TOML: &str = "[ordering]\n\
    batch_size = 50\n\
    \n\
    [statuses]\n\
    custom = []\n\
    \n\
    [types.page]\n\
    sortable = true\n\
    bulk_delete = true\n";

const GITIGNORE: &str = "ordinal.db\nordinal.db-wal\nordinal.db-shm\n";

#[derive(Debug, Serialize)]
struct InitReport {
    project_dir: String,
    config: String,
    database: String,
}

/// Execute `ord init`:
///
/// ```text
/// .ordinal/
///   config.toml   (default project config)
///   .gitignore    (store database files)
///   ordinal.db    (migrated SQLite store)
/// ```
///
/// With `--force` the config and `.gitignore` are rewritten; existing
/// records in the store are kept.
///
/// # Errors
///
/// Returns an error if `.ordinal/` already exists and `--force` is not set,
/// or if any filesystem or store operation fails.
pub fn run_init(args: &InitArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let dir = project_root.join(PROJECT_DIR);

    if dir.exists() && !args.force {
        anyhow::bail!("{PROJECT_DIR}/ already exists. Use `ord init --force` to reinitialize.");
    }

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let config_path = dir.join("config.toml");
    std::fs::write(&config_path, CONFIG_TOML)
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;

    let gitignore_path = dir.join(".gitignore");
    std::fs::write(&gitignore_path, GITIGNORE)
        .with_context(|| format!("Failed to write .gitignore: {}", gitignore_path.display()))?;

    let database = db_path(project_root);
    open_store(&database).context("Failed to create store database")?;
    tracing::info!(path = %database.display(), "project initialized");

    let report = InitReport {
        project_dir: format!("{PROJECT_DIR}/"),
        config: format!("{PROJECT_DIR}/config.toml"),
        database: format!("{PROJECT_DIR}/{DB_FILE}"),
    };
    render(output, &report, |r, w| {
        writeln!(w, "✓ Initialized {} project structure.", r.project_dir)?;
        writeln!(w)?;
        writeln!(w, "  Config:   {}", r.config)?;
        writeln!(w, "  Database: {}", r.database)?;
        writeln!(w)?;
        writeln!(w, "Next steps:")?;
        writeln!(w, "  ord add --title \"Home\"")?;
        writeln!(w, "  ord list")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordinal_core::config::load_project_config;

    #[test]
    fn init_writes_loadable_config() {
        let dir = tempfile::tempdir().expect("temp dir");
        run_init(&InitArgs { force: false }, OutputMode::Text, dir.path()).expect("init");

        let config = load_project_config(dir.path()).expect("config parses");
        assert_eq!(config.ordering.effective_batch_size(), 50);
        assert!(config.types["page"].sortable);
        assert!(db_path(dir.path()).exists());
    }

    #[test]
    fn reinit_requires_force() {
        let dir = tempfile::tempdir().expect("temp dir");
        run_init(&InitArgs { force: false }, OutputMode::Text, dir.path()).expect("init");
        let err = run_init(&InitArgs { force: false }, OutputMode::Text, dir.path())
            .expect_err("second init must fail");
        assert!(err.to_string().contains("--force"));
        run_init(&InitArgs { force: true }, OutputMode::Text, dir.path()).expect("forced init");
    }
}
