//! Route guard and navigation
//!
//! Decides which client route is reachable for the current session. The
//! logged-in state is read from the session store on every check, so a
//! session written or cleared elsewhere is picked up on the next navigation.

use std::fmt;
use std::sync::Arc;

use fitfuel_common::types::KEY_USER_ID;
use fitfuel_common::{ConsoleError, Result};
use tracing::{debug, warn};

use crate::auth;
use crate::session::SessionStore;

/// Upper bound on chained redirects for one navigation
const MAX_REDIRECTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Logout,
    Dashboard,
    Team,
    Update { id: String },
}

impl Route {
    pub fn parse(path: &str) -> Result<Self> {
        let trimmed = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };

        match trimmed {
            "/" => Ok(Route::Dashboard),
            "/login" => Ok(Route::Login),
            "/logout" => Ok(Route::Logout),
            "/team" => Ok(Route::Team),
            _ => match trimmed.strip_prefix("/update/") {
                Some(id) if !id.is_empty() && !id.contains('/') => Ok(Route::Update {
                    id: id.to_string(),
                }),
                _ => Err(ConsoleError::unknown_route(path)),
            },
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Logout => "/logout".to_string(),
            Route::Dashboard => "/".to_string(),
            Route::Team => "/team".to_string(),
            Route::Update { id } => format!("/update/{}", id),
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Dashboard | Route::Team | Route::Update { .. })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect { to: Route, replace: bool },
}

pub struct RouteGuard<S> {
    store: Arc<S>,
}

impl<S: SessionStore> RouteGuard<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Logged in means a user identifier entry exists. Storage failures
    /// count as logged out.
    pub fn is_logged_in(&self) -> bool {
        match self.store.read(KEY_USER_ID) {
            Ok(entry) => entry.is_some(),
            Err(e) => {
                warn!("Failed to read session store: {}", e);
                false
            }
        }
    }

    /// The sidebar and top bar are only drawn for a logged-in operator
    pub fn shell_visible(&self) -> bool {
        self.is_logged_in()
    }

    pub fn resolve(&self, route: &Route) -> Navigation {
        let logged_in = self.is_logged_in();
        match route {
            Route::Login if logged_in => Navigation::Redirect {
                to: Route::Dashboard,
                replace: true,
            },
            r if r.is_protected() && !logged_in => Navigation::Redirect {
                to: Route::Login,
                replace: true,
            },
            r => Navigation::Render(r.clone()),
        }
    }
}

/// Visited routes, newest last
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<Route>,
}

impl History {
    pub fn push(&mut self, route: Route) {
        self.entries.push(route);
    }

    pub fn replace(&mut self, route: Route) {
        match self.entries.last_mut() {
            Some(last) => *last = route,
            None => self.entries.push(route),
        }
    }

    /// Drop the current entry and return the one before it
    pub fn back(&mut self) -> Option<Route> {
        if self.entries.len() < 2 {
            return None;
        }
        self.entries.pop();
        self.entries.last().cloned()
    }

    pub fn current(&self) -> Option<&Route> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct Navigator<S> {
    guard: RouteGuard<S>,
    history: History,
}

impl<S: SessionStore> Navigator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            guard: RouteGuard::new(store),
            history: History::default(),
        }
    }

    pub fn guard(&self) -> &RouteGuard<S> {
        &self.guard
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn current(&self) -> Option<&Route> {
        self.history.current()
    }

    pub fn navigate_path(&mut self, path: &str) -> Result<Route> {
        let route = Route::parse(path)?;
        self.navigate(route)
    }

    /// Push `route`, follow guard redirects and return the route rendered
    pub fn navigate(&mut self, route: Route) -> Result<Route> {
        self.history.push(route.clone());
        self.settle(route)
    }

    /// Step back one entry and re-run the guard on it
    pub fn back(&mut self) -> Result<Option<Route>> {
        match self.history.back() {
            Some(route) => self.settle(route).map(Some),
            None => Ok(None),
        }
    }

    fn settle(&mut self, mut route: Route) -> Result<Route> {
        for _ in 0..MAX_REDIRECTS {
            match self.guard.resolve(&route) {
                Navigation::Render(Route::Logout) => {
                    auth::logout(self.guard.store().as_ref())?;
                    debug!("Logged out, replacing {} with /login", Route::Logout);
                    route = Route::Login;
                    self.history.replace(route.clone());
                }
                Navigation::Render(rendered) => {
                    debug!("Rendering {}", rendered);
                    return Ok(rendered);
                }
                Navigation::Redirect { to, replace } => {
                    debug!("Redirecting {} -> {}", route, to);
                    if replace {
                        self.history.replace(to.clone());
                    } else {
                        self.history.push(to.clone());
                    }
                    route = to;
                }
            }
        }

        Err(ConsoleError::unknown_route(format!(
            "too many redirects while resolving {}",
            route
        )))
    }
}
