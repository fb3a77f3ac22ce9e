use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "timetrail", version, author, about = "Track daily habits, streaks and calendars from the terminal")]
pub struct Cli {
    /// Use this database file instead of the default data directory
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new activity
    Add {
        /// Activity name
        name: String,
        /// Display color as #rrggbb (defaults to the configured color)
        #[arg(long)]
        color: Option<String>,
        /// Optional icon label
        #[arg(long)]
        icon: Option<String>,
    },
    /// List activities with their current streak
    List,
    /// Rename an activity
    Rename {
        /// Activity id, or name if no id matches
        activity: String,
        /// New name
        new_name: String,
    },
    /// Change an activity's color
    Recolor {
        /// Activity id, or name if no id matches
        activity: String,
        /// Color as #rrggbb
        color: String,
    },
    /// Delete an activity and its history
    Delete {
        /// Activity id, or name if no id matches
        activity: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Mark an activity complete for a day
    Done {
        /// Activity id, or name if no id matches
        activity: String,
        /// Day as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Mark an activity not done for a day
    Undo {
        /// Activity id, or name if no id matches
        activity: String,
        /// Day as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Flip an activity's completion for a day
    Toggle {
        /// Activity id, or name if no id matches
        activity: String,
        /// Day as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Remove whatever was recorded for a day
    Clear {
        /// Activity id, or name if no id matches
        activity: String,
        /// Day as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Show a week, month or year calendar
    Show {
        /// Activity id, or name if no id matches
        activity: String,
        /// week, month or year (defaults to the configured view)
        #[arg(long)]
        view: Option<String>,
        /// Reference day as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Show streak and completion statistics
    Stats {
        /// Activity id, or name if no id matches
        activity: String,
        /// Reference day as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Print an activity and its completion history as JSON
    Export {
        /// Activity id, or name if no id matches
        activity: String,
    },
    /// Print the config file location and current settings
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}
