mod cli;
mod config;
mod db;
mod models;
mod streaks;
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

    let db_path = match cli.db {
        Some(path) => path,
        None => {
            AppConfig::ensure_data_dir()?;
            AppConfig::db_path()?
        }
    };
    log::debug!("Using database {:?}", db_path);
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;

    // Enable WAL mode for better concurrent access
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    // Run migrations on every startup
    run_migrations(&conn)?;

    match cli.command {
        Some(Commands::Add { name, color, icon }) => {
            handlers::handle_add(&conn, &config, &name, color.as_deref(), icon.as_deref())?;
        }
        Some(Commands::List) => {
            handlers::handle_list(&conn, &config)?;
        }
        Some(Commands::Rename { activity, new_name }) => {
            handlers::handle_rename(&conn, &activity, &new_name)?;
        }
        Some(Commands::Recolor { activity, color }) => {
            handlers::handle_recolor(&conn, &activity, &color)?;
        }
        Some(Commands::Delete { activity, yes }) => {
            handlers::handle_delete(&conn, &activity, yes)?;
        }
        Some(Commands::Done { activity, date }) => {
            handlers::handle_mark(&conn, &activity, date.as_deref(), Some(true))?;
        }
        Some(Commands::Undo { activity, date }) => {
            handlers::handle_mark(&conn, &activity, date.as_deref(), Some(false))?;
        }
        Some(Commands::Toggle { activity, date }) => {
            handlers::handle_mark(&conn, &activity, date.as_deref(), None)?;
        }
        Some(Commands::Clear { activity, date }) => {
            handlers::handle_clear(&conn, &activity, date.as_deref())?;
        }
        Some(Commands::Show {
            activity,
            view,
            date,
        }) => {
            handlers::handle_show(&conn, &config, &activity, view.as_deref(), date.as_deref())?;
        }
        Some(Commands::Stats { activity, date }) => {
            handlers::handle_stats(&conn, &activity, date.as_deref())?;
        }
        Some(Commands::Export { activity }) => {
            handlers::handle_export(&conn, &activity)?;
        }
        Some(Commands::Config { init }) => {
            handlers::handle_config(&config, init)?;
        }

        // No subcommand → launch TUI
        None => {
            tui::app::run(conn, config)?;
        }
    }

    Ok(())
}
