mod cli;
mod config;
mod data;
mod db;
mod models;
mod notify;
mod prayer_times;
mod session;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use db::migrations::run_migrations;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    // Ensure data directory exists and open the preferences DB
    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;

    // `watch` and the dashboard may run side by side
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    run_migrations(&conn)?;

    match cli.command {
        Some(Commands::Times) => handlers::handle_times(&conn, &config)?,
        Some(Commands::Next) => handlers::handle_next(&conn, &config)?,
        Some(Commands::City { name }) => handlers::handle_city(&conn, &config, name.as_deref())?,
        Some(Commands::Cities) => handlers::handle_cities(&conn, &config)?,
        Some(Commands::Notify { action }) => handlers::handle_notify(&conn, &config, &action)?,
        Some(Commands::Theme { theme }) => handlers::handle_theme(&conn, theme.as_deref())?,
        Some(Commands::Watch) => handlers::handle_watch(&conn, &config)?,

        // No subcommand → launch TUI
        None => tui::app::run(conn, config)?,
    }

    Ok(())
}
