use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "namazkar", version, author, about = "Daily prayer times for your city, with prayer notifications")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show today's prayer times for the selected city
    Times,
    /// Show the next prayer and the time left until it
    Next,
    /// Show or change the selected city
    City {
        /// City to select
        name: Option<String>,
    },
    /// List known cities and their offsets
    Cities,
    /// Prayer notification settings
    Notify {
        #[command(subcommand)]
        action: NotifyCommands,
    },
    /// Show or change the dashboard theme
    Theme {
        /// light or dark
        theme: Option<String>,
    },
    /// Run the notification scheduler in the foreground without the dashboard
    Watch,
}

#[derive(Subcommand, Debug)]
pub enum NotifyCommands {
    /// Allow notifications and turn them on for all of today's prayers
    Enable,
    /// Turn notifications on for one prayer
    On {
        /// Prayer name as it appears in `namazkar times`
        prayer: String,
    },
    /// Turn notifications off for one prayer
    Off {
        /// Prayer name as it appears in `namazkar times`
        prayer: String,
    },
    /// Show the permission state and per-prayer toggles
    Status,
    /// Forget a previous allow/deny answer
    Reset,
}
