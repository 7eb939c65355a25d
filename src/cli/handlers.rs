use anyhow::{anyhow, Result};
use chrono::Local;
use log::info;
use rusqlite::Connection;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use std::thread;

use crate::cli::args::NotifyCommands;
use crate::config::AppConfig;
use crate::data::DataSource;
use crate::db::repository::PrefsRepo;
use crate::models::{Permission, Theme};
use crate::notify::notifier::{backend_supported, from_backend};
use crate::notify::{request_permission, Scheduler, Worker};
use crate::session::Session;
use crate::utils::format::{format_duration_secs, format_toggle};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

// ─── Times ───────────────────────────────────────────────────────────────────

pub fn handle_times(conn: &Connection, config: &AppConfig) -> Result<()> {
    let session = Session::load(conn, config)?;
    let now = Local::now().naive_local();
    let prayers = session.today(now)?;
    let enabled = PrefsRepo::enabled_prayers(conn)?;

    println!();
    println_colored!(
        GOLD,
        "  Prayer Times — {} ({})",
        session.city_label(),
        now.format("%d-%m-%Y")
    );
    println!();

    if prayers.is_empty() {
        println_colored!(DIM, "  No timetable entry for today");
    }
    for prayer in &prayers {
        let toggle = format_toggle(enabled.get(&prayer.name).copied().unwrap_or(false));
        if prayer.at <= now {
            println_colored!(DIM, "  {:<10}  {}   {}", prayer.name, prayer.time, toggle);
        } else {
            println_colored!(BOLD, "  {:<10}  {}   {}", prayer.name, prayer.time, toggle);
        }
    }

    print_next(&session)?;
    println!();
    Ok(())
}

pub fn handle_next(conn: &Connection, config: &AppConfig) -> Result<()> {
    let session = Session::load(conn, config)?;
    print_next(&session)?;
    println!();
    Ok(())
}

fn print_next(session: &Session) -> Result<()> {
    let now = Local::now().naive_local();
    println!();
    match session.next(now)? {
        Some(next) => println_colored!(
            AMBER,
            "  Next: {} at {} (in {})",
            next.name,
            next.time,
            format_duration_secs(next.seconds_until(now))
        ),
        None => println_colored!(DIM, "  No upcoming prayer in the timetable"),
    }
    Ok(())
}

// ─── Cities ──────────────────────────────────────────────────────────────────

pub fn handle_city(conn: &Connection, config: &AppConfig, name: Option<&str>) -> Result<()> {
    let mut session = Session::load(conn, config)?;
    match name {
        Some(name) => {
            session.select_city(conn, name)?;
            println_colored!(GREEN, "  ✓ City set to {}", session.city_label());
        }
        None => println!("  {}", session.city_label()),
    }
    Ok(())
}

pub fn handle_cities(conn: &Connection, config: &AppConfig) -> Result<()> {
    let session = Session::load(conn, config)?;
    println!();
    for (name, city) in &session.docs.cities.cities {
        let line = format!("  {:<20} {:+} min", name, city.offset);
        if *name == session.city {
            println_colored!(GOLD, "{}  ●", line);
        } else {
            println!("{}", line);
        }
    }
    println!();
    Ok(())
}

// ─── Notifications ───────────────────────────────────────────────────────────

pub fn handle_notify(conn: &Connection, config: &AppConfig, action: &NotifyCommands) -> Result<()> {
    let supported = backend_supported(config.notifications.backend);
    match action {
        NotifyCommands::Enable => {
            let session = Session::load(conn, config)?;
            let today = session.today_names(Local::now().naive_local());
            let outcome = request_permission(conn, supported, &today, || {
                let answer = prompt("  Allow prayer notifications? [y/N] ")?;
                Ok(answer.map(|a| matches!(a.trim().to_lowercase().as_str(), "y" | "yes")))
            })?;
            let color = if outcome.should_schedule() { GREEN } else { AMBER };
            println_colored!(color, "  {}", outcome.message());
            if outcome.should_schedule() {
                println_colored!(
                    DIM,
                    "  Keep `namazkar` or `namazkar watch` running to receive them"
                );
            }
        }
        NotifyCommands::On { prayer } | NotifyCommands::Off { prayer } => {
            if !supported {
                println_colored!(AMBER, "  Notifications are not supported here.");
                return Ok(());
            }
            let on = matches!(action, NotifyCommands::On { .. });
            let session = Session::load(conn, config)?;
            let name = find_prayer(&session, prayer)?;
            PrefsRepo::set_enabled(conn, &name, on)?;
            println_colored!(GREEN, "  ✓ {} {}", name, format_toggle(on));
            if on && PrefsRepo::permission(conn)? != Permission::Granted {
                println_colored!(
                    AMBER,
                    "  Notifications are not allowed yet. Run `namazkar notify enable`"
                );
            }
        }
        NotifyCommands::Status => {
            let permission = PrefsRepo::permission(conn)?;
            println!();
            if !supported {
                println_colored!(AMBER, "  Notifications are not supported here.");
            } else {
                let color = match permission {
                    Permission::Granted => GREEN,
                    Permission::Denied => RED,
                    Permission::Default => DIM,
                };
                println_colored!(color, "  Permission: {}", permission.as_str());
            }
            for (name, enabled) in PrefsRepo::enabled_prayers(conn)? {
                println!("  {:<10}  {}", name, format_toggle(enabled));
            }
            println!();
        }
        NotifyCommands::Reset => {
            PrefsRepo::set_permission(conn, Permission::Default)?;
            println_colored!(GREEN, "  ✓ Permission reset; you will be asked again");
        }
    }
    Ok(())
}

/// Match a prayer name from today's row, ignoring case
fn find_prayer(session: &Session, input: &str) -> Result<String> {
    let names = session.today_names(Local::now().naive_local());
    names
        .iter()
        .find(|n| n.eq_ignore_ascii_case(input))
        .cloned()
        .ok_or_else(|| anyhow!("Unknown prayer '{}'. Use one of: {}", input, names.join(", ")))
}

// ─── Theme ───────────────────────────────────────────────────────────────────

pub fn handle_theme(conn: &Connection, theme: Option<&str>) -> Result<()> {
    match theme {
        Some(s) => {
            let theme = Theme::from_str(s)?;
            PrefsRepo::set_theme(conn, theme)?;
            println_colored!(GREEN, "  ✓ Theme set to {}", theme);
        }
        None => println!("  {}", PrefsRepo::theme(conn)?),
    }
    Ok(())
}

// ─── Watch ───────────────────────────────────────────────────────────────────

/// Headless notification loop. Runs until the process is killed.
pub fn handle_watch(conn: &Connection, config: &AppConfig) -> Result<()> {
    let notifier = from_backend(config.notifications.backend);
    if !notifier.is_supported() {
        println_colored!(AMBER, "  Notifications are not supported here.");
        return Ok(());
    }
    let mut session = Session::load(conn, config)?;
    if PrefsRepo::permission(conn)? != Permission::Granted {
        println_colored!(
            AMBER,
            "  Notifications are not allowed yet. Run `namazkar notify enable`"
        );
    }

    let worker = Worker::new(
        DataSource::from_config(&config.data),
        notifier,
        &config.notifications,
    );
    let scheduler = Scheduler::spawn(worker);
    let interval = config.notifications.schedule_interval();
    println_colored!(DIM, "  Watching for prayer times in {} (Ctrl-C to stop)", session.city);

    loop {
        session.refresh_city(conn)?;
        let sent = session.schedule(conn, &scheduler)?;
        info!("Schedule tick for {} (sent: {})", session.city, sent);
        thread::sleep(interval);
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// `None` when stdin is closed before a line arrives.
fn prompt(message: &str) -> Result<Option<String>> {
    read_answer(io::stdin().lock(), io::stdout().lock(), message)
}

fn read_answer<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    message: &str,
) -> Result<Option<String>> {
    write!(output, "{}", message)?;
    output.flush()?;
    let mut buf = String::new();
    if input.read_line(&mut buf)? == 0 {
        writeln!(output)?;
        return Ok(None);
    }
    Ok(Some(buf.trim_end_matches('\n').trim_end_matches('\r').to_string()))
}
