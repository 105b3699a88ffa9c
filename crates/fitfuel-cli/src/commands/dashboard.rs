//! Dashboard command handler

use anyhow::Result;

use crate::client::AdminApi;
use crate::commands::Console;
use crate::guard::Route;
use crate::output;
use crate::session::SessionStore;
use crate::views::DashboardView;

pub fn handle_dashboard<A: AdminApi, S: SessionStore>(console: &mut Console<A, S>) -> Result<()> {
    console.enter(Route::Dashboard)?;
    let view = DashboardView::load(console.store.as_ref())?;
    output::display(&view, &console.output)
}
