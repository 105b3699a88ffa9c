//! User list view

use fitfuel_common::columns::TableSchema;
use fitfuel_common::types::UserRecord;
use fitfuel_common::Result;
use tracing::{debug, error, info};

use crate::client::AdminApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Cancelled,
    Deleted,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamView {
    schema: TableSchema,
    rows: Vec<UserRecord>,
}

impl TeamView {
    /// Fetch every user once and derive the table columns from the result
    pub async fn load<A: AdminApi>(api: &A) -> Result<Self> {
        let records = api.list_users().await.map_err(|e| {
            error!("Failed to fetch users: {}", e);
            e
        })?;

        let schema = TableSchema::negotiate(&records).map_err(|e| {
            error!("Unexpected user list shape: {}", e);
            e
        })?;
        debug!(
            "Loaded {} users with columns {:?}",
            records.len(),
            schema.fields().collect::<Vec<_>>()
        );

        Ok(Self {
            schema,
            rows: records.iter().map(UserRecord::with_row_id).collect(),
        })
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[UserRecord] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, id: &str) -> Option<&UserRecord> {
        self.rows.iter().find(|row| row.user_id().as_deref() == Some(id))
    }

    /// Delete one user after `confirm` agrees. The row leaves local state
    /// only once the backend has accepted the delete.
    pub async fn delete<A, F>(&mut self, api: &A, id: &str, confirm: F) -> Result<DeleteOutcome>
    where
        A: AdminApi,
        F: FnOnce(&str) -> bool,
    {
        if !confirm(id) {
            debug!("Delete of user {} cancelled", id);
            return Ok(DeleteOutcome::Cancelled);
        }

        if let Err(e) = api.delete_user(id).await {
            error!("Failed to delete user {}: {}", id, e);
            return Err(e);
        }

        self.rows.retain(|row| row.user_id().as_deref() != Some(id));
        info!("User {} deleted", id);
        Ok(DeleteOutcome::Deleted)
    }
}
