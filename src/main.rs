//! Binary entry point: resolve configuration, start logging, open the SQLite
//! store and hand control to the Ratatui event loop until the user exits.
use clap::Parser;

use harmony_notes::config::{Cli, Config};
use harmony_notes::logging::init_logging;
use harmony_notes::{open_database, run_app, App, LexiconPredictor, SqliteNoteRepository};

/// Returning a `Result` surfaces fatal start-up problems (an unwritable data
/// directory, a corrupt database) on the terminal instead of inside the TUI.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_cli(&cli)?;
    let _logger = init_logging(config.log_level, &config.log_dir)?;

    let conn = open_database(&config.db_path)?;
    let repo = SqliteNoteRepository::new(conn);

    let mut app = App::new(Box::new(repo), Box::new(LexiconPredictor::new()))
        .with_login_email(config.email.as_deref());
    run_app(&mut app)
}
