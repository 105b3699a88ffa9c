//! Shared building blocks for the FitFuel admin console
//!
//! Domain types, the error taxonomy, the equipment codec and the table
//! schema negotiation used by the user list view.

pub mod columns;
pub mod equipment;
pub mod error;
pub mod types;

pub use error::{ConsoleError, Result};
