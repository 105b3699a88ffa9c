//! In-process `AdminApi` double for unit tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use fitfuel_common::types::{LoginRequest, LoginResponse, UserRecord};
use fitfuel_common::{ConsoleError, Result};
use serde_json::{json, Value};
use tokio::sync::Notify;

use crate::client::AdminApi;

#[derive(Default)]
pub struct MockApi {
    login_response: Value,
    login_error: Mutex<Option<ConsoleError>>,
    hold_login: bool,
    gate: Arc<Notify>,
    login_calls: AtomicUsize,
    users: Mutex<Vec<UserRecord>>,
    failures: Mutex<Vec<(&'static str, ConsoleError)>>,
    updates: Mutex<Vec<(String, UserRecord)>>,
    deletes: Mutex<Vec<String>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            login_response: json!({}),
            ..Self::default()
        }
    }

    pub fn with_login(mut self, response: Value) -> Self {
        self.login_response = response;
        self
    }

    pub fn with_login_error(self, error: ConsoleError) -> Self {
        *self.login_error.lock().unwrap() = Some(error);
        self
    }

    /// Park every login until `login_gate()` is notified
    pub fn hold_login(mut self) -> Self {
        self.hold_login = true;
        self
    }

    pub fn login_gate(&self) -> Arc<Notify> {
        self.gate.clone()
    }

    pub fn with_users(self, users: Vec<Value>) -> Self {
        *self.users.lock().unwrap() = users
            .into_iter()
            .map(|v| UserRecord::from_value(v).unwrap())
            .collect();
        self
    }

    /// Fail the next call of `op` (`list`, `get`, `update` or `delete`)
    pub fn failing(self, op: &'static str, error: ConsoleError) -> Self {
        self.failures.lock().unwrap().push((op, error));
        self
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> Vec<(String, UserRecord)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    fn take_failure(&self, op: &str) -> Result<()> {
        let mut failures = self.failures.lock().unwrap();
        match failures.iter().position(|(name, _)| *name == op) {
            Some(index) => Err(failures.remove(index).1),
            None => Ok(()),
        }
    }
}

impl AdminApi for MockApi {
    async fn login(&self, _request: &LoginRequest) -> Result<LoginResponse> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        if self.hold_login {
            self.gate.notified().await;
        }
        if let Some(error) = self.login_error.lock().unwrap().take() {
            return Err(error);
        }
        LoginResponse::from_value(&self.login_response)
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        self.take_failure("list")?;
        Ok(self.users.lock().unwrap().clone())
    }

    async fn get_user(&self, id: &str) -> Result<UserRecord> {
        self.take_failure("get")?;
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.user_id().as_deref() == Some(id))
            .cloned()
            .ok_or_else(|| ConsoleError::status(404, "User not found"))
    }

    async fn update_user(&self, id: &str, record: &UserRecord) -> Result<()> {
        self.take_failure("update")?;
        self.updates
            .lock()
            .unwrap()
            .push((id.to_string(), record.clone()));
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        self.take_failure("delete")?;
        self.deletes.lock().unwrap().push(id.to_string());
        self.users
            .lock()
            .unwrap()
            .retain(|u| u.user_id().as_deref() != Some(id));
        Ok(())
    }
}
