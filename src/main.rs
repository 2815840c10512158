//! Binary entry point that glues the SQLite-backed directory store to the
//! TUI. The bootstrapping pipeline is short: bring up the database (seeding a
//! sample directory on first run), hydrate the venue board, and drive the
//! Ratatui event loop until the user exits.
use gigbook::{ensure_schema, fetch_venue_groups, run_app, App};

/// Initialize persistence, load the initial board, and launch the Ratatui
/// event loop.
///
/// Returning a `Result` bubbles up fatal initialization problems (for example
/// an unwritable home directory) to the terminal instead of crashing
/// silently.
fn main() -> anyhow::Result<()> {
    let conn = ensure_schema()?;
    let groups = fetch_venue_groups(&conn)?;

    let mut app = App::new(conn, groups);
    run_app(&mut app)
}
