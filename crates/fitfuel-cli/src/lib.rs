//! Admin console for the FitFuel backend
//!
//! This crate provides the `fitctl` binary and the pieces behind it:
//! - Session storage and the route guard
//! - Admin login and logout
//! - User list, edit and delete views
//! - Command handlers and the interactive console

pub mod auth;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod guard;
pub mod output;
pub mod session;
pub mod utils;
pub mod views;

#[cfg(test)]
mod test_utils;

pub use cli::Cli;
pub use client::{AdminApi, HttpAdminApi};
pub use session::{AnySessionStore, FileSessionStore, MemorySessionStore, SessionStore};
