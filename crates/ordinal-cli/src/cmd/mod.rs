pub mod add;
pub mod init;
pub mod list;
pub mod move_cmd;
pub mod purge;
pub mod reset;
pub mod status;

use crate::output::{CliError, OutputMode, render_error};
use ordinal_core::capabilities::ConfigGate;
use ordinal_core::config::{ProjectConfig, load_project_config};
use ordinal_core::db::{SqliteStore, open_store};
use ordinal_core::error::{ErrorCode, OrderingError};
use ordinal_core::model::Status;
use ordinal_core::resequence::Resequencer;
use ordinal_core::service::OrderingService;
use std::path::{Path, PathBuf};

/// Project directory name under the working directory.
pub const PROJECT_DIR: &str = ".ordinal";

/// Store database file inside [`PROJECT_DIR`].
pub const DB_FILE: &str = "ordinal.db";

pub fn db_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_DIR).join(DB_FILE)
}

/// An initialized project: its configuration and open store.
pub struct Project {
    pub config: ProjectConfig,
    pub store: SqliteStore,
}

impl Project {
    /// Wire the store into an [`OrderingService`] gated by the project's
    /// registered content types.
    pub fn into_service(self) -> OrderingService<SqliteStore, ConfigGate> {
        OrderingService::new(
            self.store,
            ConfigGate::from_config(&self.config),
            Resequencer::from_config(&self.config),
        )
    }

    /// Parse a status argument, accepting custom statuses only when the
    /// project configures them.
    pub fn parse_status(&self, raw: &str, output: OutputMode) -> anyhow::Result<Status> {
        let status = raw
            .parse::<Status>()
            .map_err(|e| fail(output, ErrorCode::InvalidStatus, e.to_string()))?;
        if matches!(status, Status::Custom(_)) && !self.config.statuses.active().contains(&status)
        {
            return Err(fail(
                output,
                ErrorCode::InvalidStatus,
                format!("status '{status}' is not configured under [statuses] custom"),
            ));
        }
        Ok(status)
    }
}

/// Load config and open the store, rendering classified errors.
pub fn open_project(project_root: &Path, output: OutputMode) -> anyhow::Result<Project> {
    if !project_root.join(PROJECT_DIR).is_dir() {
        return Err(fail(
            output,
            ErrorCode::NotInitialized,
            format!("no {PROJECT_DIR}/ directory in {}", project_root.display()),
        ));
    }

    let config = load_project_config(project_root)
        .map_err(|e| fail(output, ErrorCode::ConfigParseError, format!("{e:#}")))?;

    let path = db_path(project_root);
    let store = open_store(&path).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "failed to open store");
        fail(output, ErrorCode::CorruptStore, format!("{e:#}"))
    })?;

    Ok(Project { config, store })
}

/// Render a classified error and return it for propagation.
pub fn fail(output: OutputMode, code: ErrorCode, message: impl Into<String>) -> anyhow::Error {
    let error = CliError::from_code(code, message);
    if let Err(render_err) = render_error(output, &error) {
        tracing::warn!(error = %render_err, "failed to render error");
    }
    anyhow::anyhow!("{}: {}", code, error.message)
}

/// Render an [`OrderingError`] and return it for propagation.
pub fn fail_ordering(output: OutputMode, err: OrderingError) -> anyhow::Error {
    if let Err(render_err) = render_error(output, &CliError::from(&err)) {
        tracing::warn!(error = %render_err, "failed to render error");
    }
    anyhow::Error::new(err)
}
