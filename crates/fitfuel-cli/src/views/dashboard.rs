//! Dashboard: a summary of the signed-in operator, read from the session store

use fitfuel_common::types::Session;
use fitfuel_common::{ConsoleError, Result};
use serde::Serialize;

use crate::session::SessionStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub session: Session,
}

impl DashboardView {
    pub fn load<S: SessionStore + ?Sized>(store: &S) -> Result<Self> {
        let session = store
            .load_session()?
            .ok_or_else(|| ConsoleError::storage("no operator is logged in"))?;
        Ok(Self { session })
    }

    pub fn summary(&self) -> Vec<(String, String)> {
        let or_unknown = |s: &str| {
            if s.is_empty() {
                "N/A".to_string()
            } else {
                s.to_string()
            }
        };

        vec![
            ("User ID".to_string(), self.session.user_id.clone()),
            ("Name".to_string(), or_unknown(&self.session.user_name)),
            ("Email".to_string(), or_unknown(&self.session.user_email)),
            ("Admin".to_string(), self.session.is_admin.to_string()),
        ]
    }
}
