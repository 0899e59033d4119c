use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OptionalExtension, params, params_from_iter, types::Type};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use tracing::debug;

use crate::model::{Record, RecordId, Status};
use crate::store::{FieldUpdate, RecordStore, SiblingPage, SiblingQuery, surviving_ancestor};

const RECORD_COLUMNS: &str = "record_id, record_type, title, status, menu_order, parent_id";

/// Fields for a record that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub record_type: String,
    pub title: String,
    pub status: Status,
    pub position: i64,
    pub parent_id: Option<RecordId>,
}

impl NewRecord {
    /// A published, top-level record at position 0.
    #[must_use]
    pub fn new(record_type: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            title: title.into(),
            status: Status::Publish,
            position: 0,
            parent_id: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub const fn with_position(mut self, position: i64) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub const fn with_parent(mut self, parent_id: Option<RecordId>) -> Self {
        self.parent_id = parent_id;
        self
    }
}

/// [`RecordStore`] over a rusqlite connection.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Wrap an already configured and migrated connection.
    #[must_use]
    pub const fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Insert a record and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, e.g. the parent does not exist.
    pub fn insert_record(&mut self, record: &NewRecord) -> Result<Record> {
        let now = now_us();
        self.conn
            .execute(
                "INSERT INTO records (
                    record_type, title, status, menu_order, parent_id,
                    created_at_us, updated_at_us
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                params![
                    record.record_type,
                    record.title,
                    record.status.as_str(),
                    record.position,
                    record.parent_id.map(RecordId::get),
                    now,
                ],
            )
            .with_context(|| format!("insert record '{}'", record.title))?;

        let id = RecordId::new(self.conn.last_insert_rowid());
        debug!(record = %id, record_type = %record.record_type, "record inserted");
        Ok(Record {
            id,
            record_type: record.record_type.clone(),
            title: record.title.clone(),
            status: record.status.clone(),
            position: record.position,
            parent_id: record.parent_id,
        })
    }

    /// Change a record's lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns an error if the record does not exist or the write fails.
    pub fn set_status(&mut self, id: RecordId, status: &Status) -> Result<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE records SET status = ?1, updated_at_us = ?2 WHERE record_id = ?3",
                params![status.as_str(), now_us(), id.get()],
            )
            .with_context(|| format!("set status of record {id}"))?;
        if changed == 0 {
            bail!("set_status: record {id} does not exist");
        }
        Ok(())
    }
}

impl RecordStore for SqliteStore {
    fn get_record(&self, id: RecordId) -> Result<Option<Record>> {
        self.conn
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM records WHERE record_id = ?1"),
                [id.get()],
                row_to_record,
            )
            .optional()
            .with_context(|| format!("get record {id}"))
    }

    fn get_parent_id(&self, id: RecordId) -> Result<Option<RecordId>> {
        let parent: Option<Option<i64>> = self
            .conn
            .query_row(
                "SELECT parent_id FROM records WHERE record_id = ?1",
                [id.get()],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("get parent of record {id}"))?;
        Ok(parent.flatten().map(RecordId::new))
    }

    fn query_siblings(&self, query: &SiblingQuery<'_>) -> Result<SiblingPage> {
        if query.statuses.is_empty() {
            return Ok(SiblingPage::default());
        }

        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![
            Box::new(query.record_type.to_string()),
            Box::new(query.parent_id.map(RecordId::get)),
        ];
        let mut sql = format!(
            "SELECT {RECORD_COLUMNS} FROM records WHERE record_type = ?1 AND parent_id IS ?2"
        );

        sql.push_str(" AND status IN (");
        push_placeholders(
            &mut sql,
            &mut param_values,
            query.statuses.iter().map(|s| s.as_str().to_string()),
        );
        sql.push(')');

        if !query.excluded.is_empty() {
            sql.push_str(" AND record_id NOT IN (");
            push_placeholders(
                &mut sql,
                &mut param_values,
                query.excluded.iter().map(|id| id.get()),
            );
            sql.push(')');
        }

        let _ = write!(sql, " {}", query.order.sql_clause());
        // One extra row tells us whether another page exists.
        match query.limit {
            Some(limit) => {
                let _ = write!(sql, " LIMIT {} OFFSET {}", limit + 1, query.offset);
            }
            None => {
                let _ = write!(sql, " LIMIT -1 OFFSET {}", query.offset);
            }
        }

        let mut stmt = self
            .conn
            .prepare(&sql)
            .with_context(|| format!("prepare sibling query: {sql}"))?;
        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(AsRef::as_ref).collect();
        let rows = stmt
            .query_map(params_from_iter(params_ref), row_to_record)
            .context("execute sibling query")?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.context("read sibling row")?);
        }

        let has_more = query.limit.is_some_and(|limit| records.len() > limit);
        if let Some(limit) = query.limit {
            records.truncate(limit);
        }
        Ok(SiblingPage { records, has_more })
    }

    fn update_record_fields(&mut self, id: RecordId, update: &FieldUpdate) -> Result<()> {
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(now_us())];
        let mut assignments = vec!["updated_at_us = ?1".to_string()];

        if let Some(position) = update.position {
            param_values.push(Box::new(position));
            assignments.push(format!("menu_order = ?{}", param_values.len()));
        }
        if let Some(parent_id) = update.parent_id {
            param_values.push(Box::new(parent_id.map(RecordId::get)));
            assignments.push(format!("parent_id = ?{}", param_values.len()));
        }
        param_values.push(Box::new(id.get()));
        let sql = format!(
            "UPDATE records SET {} WHERE record_id = ?{}",
            assignments.join(", "),
            param_values.len()
        );

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(AsRef::as_ref).collect();
        let changed = self
            .conn
            .execute(&sql, params_from_iter(params_ref))
            .with_context(|| format!("update record {id}"))?;
        if changed == 0 {
            bail!("update_record_fields: record {id} does not exist");
        }
        Ok(())
    }

    fn has_descendants(
        &self,
        record_type: &str,
        parent_id: RecordId,
        statuses: &[Status],
    ) -> Result<bool> {
        if statuses.is_empty() {
            return Ok(false);
        }

        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> =
            vec![Box::new(record_type.to_string()), Box::new(parent_id.get())];
        let mut sql = String::from(
            "SELECT EXISTS(SELECT 1 FROM records WHERE record_type = ?1 AND parent_id = ?2 \
             AND status IN (",
        );
        push_placeholders(
            &mut sql,
            &mut param_values,
            statuses.iter().map(|s| s.as_str().to_string()),
        );
        sql.push_str("))");

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(AsRef::as_ref).collect();
        self.conn
            .query_row(&sql, params_from_iter(params_ref), |row| row.get(0))
            .with_context(|| format!("check descendants of record {parent_id}"))
    }

    fn reset_positions(&mut self, record_type: &str) -> Result<usize> {
        self.conn
            .execute(
                "UPDATE records SET menu_order = 0, updated_at_us = ?1 WHERE record_type = ?2",
                params![now_us(), record_type],
            )
            .with_context(|| format!("reset positions for type '{record_type}'"))
    }

    fn purge_trash(&mut self, record_type: &str) -> Result<usize> {
        let tx = self.conn.transaction().context("begin purge transaction")?;

        let trashed: BTreeMap<i64, Option<i64>> = {
            let mut stmt = tx
                .prepare(
                    "SELECT record_id, parent_id FROM records
                     WHERE record_type = ?1 AND status = ?2",
                )
                .context("prepare trash listing")?;
            let rows = stmt
                .query_map(params![record_type, Status::Trash.as_str()], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, Option<i64>>(1)?))
                })
                .context("list trashed records")?;
            let mut map = BTreeMap::new();
            for row in rows {
                let (id, parent) = row.context("read trashed row")?;
                map.insert(id, parent);
            }
            map
        };

        if trashed.is_empty() {
            return Ok(0);
        }

        let children: Vec<(i64, i64)> = {
            let mut stmt = tx
                .prepare("SELECT record_id, parent_id FROM records WHERE parent_id IS NOT NULL")
                .context("prepare child listing")?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))
                .context("list child records")?;
            let mut out = Vec::new();
            for row in rows {
                let (id, parent) = row.context("read child row")?;
                if trashed.contains_key(&parent) && !trashed.contains_key(&id) {
                    out.push((id, parent));
                }
            }
            out
        };

        let now = now_us();
        for (child, parent) in &children {
            let ancestor = surviving_ancestor(&trashed, *parent);
            tx.execute(
                "UPDATE records SET parent_id = ?1, updated_at_us = ?2 WHERE record_id = ?3",
                params![ancestor, now, child],
            )
            .with_context(|| format!("reattach child record {child}"))?;
        }

        let ids: BTreeSet<i64> = trashed.keys().copied().collect();
        let mut deleted = 0;
        for id in &ids {
            deleted += tx
                .execute("DELETE FROM records WHERE record_id = ?1", [id])
                .with_context(|| format!("delete trashed record {id}"))?;
        }

        tx.commit().context("commit purge transaction")?;
        debug!(record_type, deleted, reattached = children.len(), "trash purged");
        Ok(deleted)
    }
}

fn push_placeholders<T, I>(
    sql: &mut String,
    param_values: &mut Vec<Box<dyn rusqlite::types::ToSql>>,
    values: I,
) where
    T: rusqlite::types::ToSql + 'static,
    I: IntoIterator<Item = T>,
{
    for (i, value) in values.into_iter().enumerate() {
        param_values.push(Box::new(value));
        if i > 0 {
            sql.push_str(", ");
        }
        let _ = write!(sql, "?{}", param_values.len());
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<Record> {
    let status: String = row.get(3)?;
    let status = status
        .parse::<Status>()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(error)))?;
    Ok(Record {
        id: RecordId::new(row.get(0)?),
        record_type: row.get(1)?,
        title: row.get(2)?,
        status,
        position: row.get(4)?,
        parent_id: row.get::<_, Option<i64>>(5)?.map(RecordId::new),
    })
}

fn now_us() -> i64 {
    chrono::Utc::now().timestamp_micros()
}
