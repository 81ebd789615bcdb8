//! Flattening of sessions and user profiles into feature tables.

use std::sync::Arc;

use log::debug;

use crate::error::Result;
use crate::feature::table::{Column, ColumnKind, DataTable, Value};
use crate::feature::vector::PageVector;
use crate::popularity::PopularitySchema;
use crate::session::{SessionRecord, SessionizeOutput, UserProfile};

pub const DURATION: &str = "duration";
pub const REQUEST_COUNT: &str = "request_count";
pub const AVERAGE_REQUEST_DURATION: &str = "average_request_duration";

/// Aggregate columns of the sessions table, in output order.
pub const SESSION_AGGREGATES: [&str; 3] = [DURATION, REQUEST_COUNT, AVERAGE_REQUEST_DURATION];

/// Aggregate columns of the users table, in output order.
pub const USER_AGGREGATES: [&str; 1] = [REQUEST_COUNT];

/// Prefix of a page column whose url would clash with an aggregate column.
pub const PAGE_COLUMN_PREFIX: &str = "page:";

/// Table names used for export.
pub const USERS_TABLE: &str = "users";
pub const SESSIONS_TABLE: &str = "sessions";
pub const USER_PAGES_TABLE: &str = "user_pages";
pub const SESSION_PAGES_TABLE: &str = "session_pages";
pub const SESSION_NUMERIC_TABLE: &str = "session_numeric";

/// The five tables of a grouping run.
#[derive(Debug, Clone)]
pub struct FeatureTables {
    pub users: DataTable,
    pub sessions: DataTable,
    /// Users table without the request count.
    pub user_pages: DataTable,
    /// Sessions table without the numeric aggregates.
    pub session_pages: DataTable,
    /// Numeric aggregates of the sessions table only.
    pub session_numeric: DataTable,
}

impl FeatureTables {
    /// All tables in export order.
    pub fn iter(&self) -> impl Iterator<Item = &DataTable> {
        [
            &self.users,
            &self.sessions,
            &self.user_pages,
            &self.session_pages,
            &self.session_numeric,
        ]
        .into_iter()
    }
}

/// Builds rows of `[aggregates][one flag per schema page]`.
#[derive(Debug, Clone)]
pub struct FeatureVectorBuilder {
    schema: Arc<PopularitySchema>,
}

impl FeatureVectorBuilder {
    pub fn new(schema: Arc<PopularitySchema>) -> Self {
        FeatureVectorBuilder { schema }
    }

    pub fn schema(&self) -> &PopularitySchema {
        &self.schema
    }

    /// Column layout of the sessions table.
    pub fn session_columns(&self) -> Vec<Column> {
        let mut columns = vec![
            Column::new(DURATION, ColumnKind::Integer),
            Column::new(REQUEST_COUNT, ColumnKind::Integer),
            Column::new(AVERAGE_REQUEST_DURATION, ColumnKind::Real),
        ];
        columns.extend(self.page_columns());
        columns
    }

    /// Column layout of the users table.
    pub fn user_columns(&self) -> Vec<Column> {
        let mut columns = vec![Column::new(REQUEST_COUNT, ColumnKind::Integer)];
        columns.extend(self.page_columns());
        columns
    }

    /// Row for one session.
    pub fn session_row(&self, session: &SessionRecord) -> Result<Vec<Value>> {
        let mut row = vec![
            Value::Integer(session.duration()),
            Value::Integer(session.request_count as i64),
            Value::Real(session.average_request_duration()),
        ];
        self.append_flags(&mut row, &session.visited)?;
        Ok(row)
    }

    /// Row for one user.
    pub fn user_row(&self, user: &UserProfile) -> Result<Vec<Value>> {
        let mut row = vec![Value::Integer(user.request_count as i64)];
        self.append_flags(&mut row, &user.visited)?;
        Ok(row)
    }

    /// Sessions table. Fails as a whole if any vector disagrees with the schema.
    pub fn sessions_table(&self, sessions: &[SessionRecord]) -> Result<DataTable> {
        let mut table = DataTable::new(SESSIONS_TABLE, self.session_columns())?;
        for session in sessions {
            table.push_row(self.session_row(session)?)?;
        }
        Ok(table)
    }

    /// Users table. Fails as a whole if any vector disagrees with the schema.
    pub fn users_table(&self, users: &[UserProfile]) -> Result<DataTable> {
        let mut table = DataTable::new(USERS_TABLE, self.user_columns())?;
        for user in users {
            table.push_row(self.user_row(user)?)?;
        }
        Ok(table)
    }

    /// Build the users and sessions tables and their projections.
    pub fn build(&self, output: &SessionizeOutput) -> Result<FeatureTables> {
        let users = self.users_table(&output.users)?;
        let sessions = self.sessions_table(&output.sessions)?;

        let user_pages = users.drop_columns(USER_PAGES_TABLE, &USER_AGGREGATES)?;
        let session_pages = sessions.drop_columns(SESSION_PAGES_TABLE, &SESSION_AGGREGATES)?;
        let session_numeric = sessions.select(SESSION_NUMERIC_TABLE, &SESSION_AGGREGATES)?;

        debug!(
            "Built feature tables: {} users, {} sessions, {} page columns",
            users.len(),
            sessions.len(),
            self.schema.len()
        );

        Ok(FeatureTables {
            users,
            sessions,
            user_pages,
            session_pages,
            session_numeric,
        })
    }

    fn page_columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.schema
            .urls()
            .map(|url| Column::new(page_column_name(url), ColumnKind::Boolean))
    }

    fn append_flags(&self, row: &mut Vec<Value>, visited: &PageVector) -> Result<()> {
        self.schema.check_vector(visited)?;
        row.extend(visited.iter().map(Value::Boolean));
        Ok(())
    }
}

/// Column name of a page url. Urls equal to an aggregate name, or already
/// carrying the prefix, are prefixed so every column name stays unique.
pub fn page_column_name(url: &str) -> String {
    if SESSION_AGGREGATES.contains(&url) || url.starts_with(PAGE_COLUMN_PREFIX) {
        format!("{PAGE_COLUMN_PREFIX}{url}")
    } else {
        url.to_string()
    }
}
