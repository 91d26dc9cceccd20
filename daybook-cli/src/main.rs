mod app;
mod commands;
mod input;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::app::App;

#[derive(Parser)]
#[command(name = "daybook")]
#[command(about = "Manage your calendars and schedules, locally or synced to a daybook server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with the id issued by your identity provider
    Login {
        user_id: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        photo_url: Option<String>,
    },
    /// Sign out and go back to local-only storage
    Logout,
    /// Show who is signed in
    Whoami,
    /// Show config and data paths
    Config,
    #[command(flatten)]
    Store(StoreCommand),
}

/// Commands that work on the loaded calendars and schedules.
#[derive(Subcommand)]
enum StoreCommand {
    /// List calendars
    Calendars,
    /// Manage a calendar
    Calendar {
        #[command(subcommand)]
        command: CalendarCommand,
    },
    /// List schedules grouped by day
    Events {
        /// Only show this calendar (by id or name)
        #[arg(short, long)]
        calendar: Option<String>,
    },
    /// Add an event or task
    Add {
        title: String,

        /// Day of the schedule (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,

        /// Start time (HH:MM); all-day when omitted
        #[arg(long)]
        start: Option<String>,

        /// End time (HH:MM)
        #[arg(long, requires = "start")]
        end: Option<String>,

        /// Calendar to add to (by id or name)
        #[arg(short, long)]
        calendar: Option<String>,

        /// Add a task instead of an event
        #[arg(long)]
        task: bool,

        #[arg(long)]
        location: Option<String>,
    },
    /// Mark a task as completed
    Complete { id: String },
    /// Remove an event or task
    Remove { id: String },
    /// List holiday regions
    Holidays {
        /// Include regions that are not selected
        #[arg(long)]
        all: bool,

        #[command(subcommand)]
        command: Option<HolidayCommand>,
    },
}

#[derive(Subcommand)]
enum CalendarCommand {
    Add {
        name: String,

        /// Palette color name, e.g. "Sage"; random when omitted
        #[arg(long)]
        color: Option<String>,
    },
    Rename { calendar: String, name: String },
    Remove {
        calendar: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum HolidayCommand {
    /// Select or deselect a region, e.g. `en.japanese`
    Toggle { region: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Login {
            user_id,
            email,
            name,
            photo_url,
        } => commands::auth::login(&user_id, email, name, photo_url).await,
        Commands::Logout => commands::auth::logout(),
        Commands::Whoami => commands::auth::whoami().await,
        Commands::Config => commands::config::run(),
        Commands::Store(command) => {
            let mut app = App::load().await?;
            let result = run_with_store(&mut app, command).await;
            // Report background writes even when the command itself failed
            app.finish().await;
            result
        }
    }
}

async fn run_with_store(app: &mut App, command: StoreCommand) -> Result<()> {
    match command {
        StoreCommand::Calendars => commands::calendars::list(app),
        StoreCommand::Calendar { command } => match command {
            CalendarCommand::Add { name, color } => {
                commands::calendars::add(app, &name, color.as_deref())
            }
            CalendarCommand::Rename { calendar, name } => {
                commands::calendars::rename(app, &calendar, &name)
            }
            CalendarCommand::Remove { calendar, force } => {
                commands::calendars::remove(app, &calendar, force)
            }
        },
        StoreCommand::Events { calendar } => commands::events::run(app, calendar.as_deref()).await,
        StoreCommand::Add {
            title,
            date,
            start,
            end,
            calendar,
            task,
            location,
        } => commands::schedules::add(
            app,
            commands::schedules::NewSchedule {
                title,
                date,
                start,
                end,
                calendar,
                task,
                location,
            },
        ),
        StoreCommand::Complete { id } => commands::schedules::complete(app, &id),
        StoreCommand::Remove { id } => commands::schedules::remove(app, &id),
        StoreCommand::Holidays { all, command } => match command {
            None => commands::holidays::list(app, all),
            Some(HolidayCommand::Toggle { region }) => {
                commands::holidays::toggle(app, &region).await
            }
        },
    }
}
