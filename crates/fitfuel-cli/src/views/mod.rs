//! Views behind the protected routes
//!
//! Each view owns its local state and talks to the backend only through
//! `AdminApi`, so the command surface and the interactive console share them.

pub mod dashboard;
pub mod team;
pub mod update;

pub use dashboard::DashboardView;
pub use team::{DeleteOutcome, TeamView};
pub use update::EditView;
