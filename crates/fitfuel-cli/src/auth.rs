//! Login and logout flows
//!
//! Only an admin login is accepted. The backend answers ordinary users with
//! a success status too, so acceptance is decided on the response message.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use fitfuel_common::types::{LoginRequest, LoginResponse, Session};
use fitfuel_common::{ConsoleError, Result};
use tracing::{debug, info, warn};

use crate::client::AdminApi;
use crate::session::SessionStore;
use crate::utils::validate_email;

/// The exact message the backend sends for an admin login
pub const ADMIN_SUCCESS_MESSAGE: &str = "Admin login successful";

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() {
            return Err(ConsoleError::invalid_input("email is required"));
        }
        validate_email(self.email.trim())?;
        if self.password.is_empty() {
            return Err(ConsoleError::invalid_input("password is required"));
        }
        Ok(())
    }

    fn to_request(&self) -> LoginRequest {
        LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        }
    }
}

/// Turn a successful login response into a session, or reject it
pub fn accept(response: &LoginResponse) -> Result<Session> {
    if response.message.as_deref() != Some(ADMIN_SUCCESS_MESSAGE) {
        return Err(ConsoleError::NotAdmin);
    }

    let user_id = response
        .user_id
        .clone()
        .ok_or_else(|| ConsoleError::malformed("admin login response carries no user id"))?;

    Ok(Session {
        user_id,
        user_name: response.name.clone().unwrap_or_default(),
        user_email: response.email.clone().unwrap_or_default(),
        is_admin: true,
    })
}

/// Submits login forms, one at a time
pub struct LoginFlow<A, S> {
    api: Arc<A>,
    store: Arc<S>,
    in_flight: AtomicBool,
}

/// Releases the in-flight flag however the submit ends
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<A: AdminApi, S: SessionStore> LoginFlow<A, S> {
    pub fn new(api: Arc<A>, store: Arc<S>) -> Self {
        Self {
            api,
            store,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Validate, post the credentials and persist the session on an admin
    /// login. Nothing is written to the store on any failure.
    pub async fn submit(&self, form: &LoginForm) -> Result<Session> {
        form.validate()?;

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Login submitted while another is in flight");
            return Err(ConsoleError::LoginInProgress);
        }
        let _in_flight = InFlight(&self.in_flight);

        debug!("Submitting login for {}", form.email.trim());
        let response = self.api.login(&form.to_request()).await?;
        debug!("Login response message: {:?}", response.message);

        let session = accept(&response)?;
        self.store.save_session(&session)?;

        info!("Admin {} logged in", session.user_email);
        Ok(session)
    }
}

pub fn logout<S: SessionStore + ?Sized>(store: &S) -> Result<()> {
    store.clear()?;
    info!("Session cleared");
    Ok(())
}
