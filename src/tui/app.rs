use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use log::debug;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::data::DataSource;
use crate::db::repository::{EnabledPrayers, PrefsRepo};
use crate::models::{AdjustedPrayer, Permission, Theme};
use crate::notify::notifier::from_backend;
use crate::notify::{answer_prompt, request_permission, PermissionOutcome, Scheduler, Worker};
use crate::session::Session;
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme::Palette;
use crate::tui::widgets::{header, next_prayer, prayers, statusbar};

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Dashboard,
    CityPicker,
    Help,
}

/// Modal popups. Keys go to the dialog until it closes.
#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    /// Asking whether notifications may be shown
    PermissionPrompt,
    Message(String),
}

pub struct App {
    pub view: View,
    pub session: Session,
    pub theme: Theme,
    pub notifications_supported: bool,
    pub focus_idx: usize,
    pub city_state: ListState,
    pub dialog: Option<Dialog>,
    /// One-line error shown in place of the key hints
    pub status: Option<String>,
    pub should_quit: bool,

    // Cached state (refreshed on tick/action)
    pub now: NaiveDateTime,
    pub permission: Permission,
    pub prayers: Vec<AdjustedPrayer>,
    pub enabled: EnabledPrayers,
    pub next_prayer: Option<AdjustedPrayer>,

    scheduler: Scheduler,
}

impl App {
    pub fn new(
        session: Session,
        scheduler: Scheduler,
        notifications_supported: bool,
        now: NaiveDateTime,
    ) -> Self {
        App {
            view: View::Dashboard,
            session,
            theme: Theme::default(),
            notifications_supported,
            focus_idx: 0,
            city_state: ListState::default(),
            dialog: None,
            status: None,
            should_quit: false,
            now,
            permission: Permission::default(),
            prayers: Vec::new(),
            enabled: EnabledPrayers::new(),
            next_prayer: None,
            scheduler,
        }
    }

    pub fn load(&mut self, conn: &Connection) -> Result<()> {
        self.theme = PrefsRepo::theme(conn)?;
        self.permission = PrefsRepo::permission(conn)?;
        self.enabled = PrefsRepo::enabled_prayers(conn)?;
        self.prayers = self.session.today(self.now)?;
        self.next_prayer = self.session.next(self.now)?;
        if self.focus_idx >= self.prayers.len() {
            self.focus_idx = self.prayers.len().saturating_sub(1);
        }
        Ok(())
    }

    /// Clock tick: move time forward and refresh the countdown. Reloads the
    /// whole list when the day rolls over.
    pub fn tick(&mut self, conn: &Connection) {
        let now = Local::now().naive_local();
        let new_day = now.date() != self.now.date();
        self.now = now;
        let result = if new_day {
            self.load(conn)
        } else {
            self.session.next(now).map(|next| self.next_prayer = next)
        };
        self.report(result);
    }

    /// Schedule tick: hand the worker the current city and toggles.
    pub fn schedule(&mut self, conn: &Connection) -> Result<bool> {
        self.session.schedule(conn, &self.scheduler)
    }

    fn report(&mut self, result: Result<()>) {
        if let Err(err) = result {
            debug!("Action failed: {err:?}");
            self.status = Some(format!("✗ {err}"));
        }
    }

    fn today_names(&self) -> Vec<String> {
        self.prayers.iter().map(|p| p.name.clone()).collect()
    }

    pub fn palette(&self) -> Palette {
        Palette::for_theme(self.theme)
    }

    pub fn handle_key(&mut self, key: KeyEvent, conn: &Connection) {
        // Some terminals also report release/repeat events
        if key.kind != KeyEventKind::Press {
            return;
        }
        self.status = None;

        if let Some(dialog) = self.dialog.clone() {
            let result = self.handle_dialog_key(dialog, key, conn);
            self.report(result);
            return;
        }

        let result = match self.view {
            View::Dashboard => self.handle_dashboard_key(key, conn),
            View::CityPicker => self.handle_city_key(key, conn),
            View::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                    self.view = View::Dashboard;
                }
                Ok(())
            }
        };
        self.report(result);
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent, conn: &Connection) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.view = View::Help;
            }
            KeyCode::Up => {
                self.focus_idx = self.focus_idx.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.focus_idx + 1 < self.prayers.len() {
                    self.focus_idx += 1;
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.toggle_focused(conn)?;
            }
            KeyCode::Char('a') => {
                self.enable_notifications(conn)?;
            }
            KeyCode::Char('c') => {
                let selected = self
                    .session
                    .docs
                    .cities
                    .names()
                    .position(|c| c == self.session.city);
                self.city_state.select(selected.or(Some(0)));
                self.view = View::CityPicker;
            }
            KeyCode::Char('t') => {
                self.theme = self.theme.toggled();
                PrefsRepo::set_theme(conn, self.theme)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_city_key(&mut self, key: KeyEvent, conn: &Connection) -> Result<()> {
        let count = self.session.docs.cities.cities.len();
        match key.code {
            KeyCode::Esc => {
                self.view = View::Dashboard;
            }
            KeyCode::Up => {
                let i = self.city_state.selected().unwrap_or(0);
                self.city_state.select(Some(i.saturating_sub(1)));
            }
            KeyCode::Down => {
                let i = self.city_state.selected().unwrap_or(0);
                if i + 1 < count {
                    self.city_state.select(Some(i + 1));
                }
            }
            KeyCode::Enter => {
                let chosen = self
                    .city_state
                    .selected()
                    .and_then(|i| self.session.docs.cities.names().nth(i))
                    .map(str::to_string);
                if let Some(city) = chosen {
                    self.session.select_city(conn, &city)?;
                    self.load(conn)?;
                    self.schedule(conn)?;
                }
                self.view = View::Dashboard;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_dialog_key(&mut self, dialog: Dialog, key: KeyEvent, conn: &Connection) -> Result<()> {
        match dialog {
            Dialog::Message(_) => {
                self.dialog = None;
            }
            Dialog::PermissionPrompt => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    let outcome = answer_prompt(conn, &self.today_names(), true)?;
                    self.finish_permission(conn, outcome)?;
                }
                KeyCode::Char('n') | KeyCode::Char('N') => {
                    let outcome = answer_prompt(conn, &self.today_names(), false)?;
                    self.finish_permission(conn, outcome)?;
                }
                // Dismissed without an answer, ask again next time
                KeyCode::Esc => {
                    self.finish_permission(conn, PermissionOutcome::Dismissed)?;
                }
                _ => {}
            },
        }
        Ok(())
    }

    fn toggle_focused(&mut self, conn: &Connection) -> Result<()> {
        if !self.notifications_supported {
            self.status = Some(PermissionOutcome::Unsupported.message().to_string());
            return Ok(());
        }
        if let Some(prayer) = self.prayers.get(self.focus_idx) {
            let name = prayer.name.clone();
            PrefsRepo::toggle(conn, &name)?;
            self.enabled = PrefsRepo::enabled_prayers(conn)?;
        }
        Ok(())
    }

    fn enable_notifications(&mut self, conn: &Connection) -> Result<()> {
        if self.notifications_supported && PrefsRepo::permission(conn)? == Permission::Default {
            self.dialog = Some(Dialog::PermissionPrompt);
            return Ok(());
        }
        // Only the never-asked state prompts, and that was handled above
        let outcome = request_permission(
            conn,
            self.notifications_supported,
            &self.today_names(),
            || Ok(None),
        )?;
        self.finish_permission(conn, outcome)
    }

    fn finish_permission(&mut self, conn: &Connection, outcome: PermissionOutcome) -> Result<()> {
        self.dialog = Some(Dialog::Message(outcome.message().to_string()));
        self.load(conn)?;
        if outcome.should_schedule() {
            self.schedule(conn)?;
        }
        Ok(())
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        self.draw_dashboard(frame);

        match self.view {
            View::Dashboard => {}
            View::CityPicker => self.draw_city_picker(frame),
            View::Help => self.draw_help_overlay(frame),
        }

        if let Some(dialog) = &self.dialog {
            self.draw_dialog(frame, dialog);
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame) {
        let area = frame.area();
        let palette = self.palette();

        // Clear background
        frame.render_widget(Block::default().style(palette.base()), area);

        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        header::render(
            frame,
            outer_chunks[0],
            &palette,
            &self.session.city_label(),
            self.now,
        );
        statusbar::render(frame, outer_chunks[2], &palette, self.status.as_deref());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(outer_chunks[1]);

        let list = prayers::PrayerList {
            prayers: &self.prayers,
            enabled: &self.enabled,
            next: self.next_prayer.as_ref().map(|p| p.name.as_str()),
            focused_idx: self.focus_idx,
            notifications_supported: self.notifications_supported,
        };
        prayers::render(frame, columns[0], &palette, &list, self.now);

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(0)])
            .split(columns[1]);
        next_prayer::render(
            frame,
            right_chunks[0],
            &palette,
            self.next_prayer.as_ref(),
            self.now,
        );
        self.draw_notify_panel(frame, right_chunks[1], &palette);
    }

    fn draw_notify_panel(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let (label, style) = if !self.notifications_supported {
            ("  Notifications not supported", palette.dim())
        } else {
            match self.permission {
                Permission::Granted => ("  Notifications enabled", palette.green()),
                Permission::Denied => ("  Notifications blocked", palette.red()),
                Permission::Default => ("  Press [a] to enable notifications", palette.amber()),
            }
        };
        let on = self
            .prayers
            .iter()
            .filter(|p| self.enabled.get(&p.name).copied().unwrap_or(false))
            .count();
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(label, style)),
            Line::from(Span::styled(
                format!("  {} of {} prayers on", on, self.prayers.len()),
                palette.dim(),
            )),
        ];
        let block = Block::default()
            .title(Span::styled(" Notifications ", palette.accent()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(palette.border())
            .style(palette.surface());
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_city_picker(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let palette = self.palette();
        let rows = self.session.docs.cities.cities.len() as u16 + 2;
        let popup_area = centered(area, 40, rows);

        frame.render_widget(Clear, popup_area);

        let items: Vec<ListItem> = self
            .session
            .docs
            .cities
            .cities
            .iter()
            .map(|(name, city)| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("  {:<20}", name), palette.bold()),
                    Span::styled(format!("{:+} min", city.offset), palette.dim()),
                ]))
            })
            .collect();

        let block = Block::default()
            .title(Span::styled(" Select City ", palette.accent()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(palette.accent())
            .style(palette.surface());

        let list = List::new(items)
            .block(block)
            .highlight_style(palette.accent().add_modifier(Modifier::BOLD | Modifier::REVERSED));
        frame.render_stateful_widget(list, popup_area, &mut self.city_state);
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let palette = self.palette();
        let popup_area = centered(frame.area(), 46, 12);

        frame.render_widget(Clear, popup_area);

        let keys = [
            ("[↑ ↓]", "Navigate prayers"),
            ("[space]", "Toggle prayer notification"),
            ("[a]", "Enable notifications for all"),
            ("[c]", "Choose city"),
            ("[t]", "Light / dark theme"),
            ("[?]", "Toggle help"),
            ("[Esc]", "Quit"),
        ];
        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                palette.accent().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, label) in keys {
            help_text.push(Line::from(vec![
                Span::styled(format!("  {:<10}", key), palette.accent()),
                Span::styled(label, palette.dim()),
            ]));
        }

        let block = Block::default()
            .title(Span::styled(" Help ", palette.accent()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(palette.accent())
            .style(palette.surface());

        frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
    }

    fn draw_dialog(&self, frame: &mut Frame, dialog: &Dialog) {
        let palette = self.palette();
        let popup_area = centered(frame.area(), 50, 7);
        frame.render_widget(Clear, popup_area);

        let (title, body, hint) = match dialog {
            Dialog::PermissionPrompt => (
                " Notifications ",
                "Allow namazkar to notify you at prayer times?".to_string(),
                "[y] allow  ·  [n] block  ·  [Esc] not now",
            ),
            Dialog::Message(message) => (" namazkar ", message.clone(), "[any key] close"),
        };

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(format!("  {}", body), palette.bold())),
            Line::from(""),
            Line::from(Span::styled(format!("  {}", hint), palette.dim())),
        ];

        let block = Block::default()
            .title(Span::styled(title, palette.accent()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(palette.amber())
            .style(palette.surface());

        let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, popup_area);
    }
}

/// A `width` x `height` rect centered in `area`, clamped to fit
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Run the TUI event loop.
pub fn run(conn: Connection, config: AppConfig) -> Result<()> {
    // Fail before touching the terminal if the data can't be loaded
    let session = Session::load(&conn, &config)?;

    let notifier = from_backend(config.notifications.backend);
    let supported = notifier.is_supported();
    let worker = Worker::new(
        DataSource::from_config(&config.data),
        notifier,
        &config.notifications,
    );
    let scheduler = Scheduler::spawn(worker);

    let mut app = App::new(session, scheduler, supported, Local::now().naive_local());
    app.load(&conn)?;

    let mut terminal = ratatui::init();
    let events = EventHandler::new(
        config.display.tick_rate(),
        config.notifications.schedule_interval(),
    );

    let result = (|| -> Result<()> {
        loop {
            terminal.draw(|frame| app.draw(frame))?;

            match events.next()? {
                Event::Key(key) => {
                    app.handle_key(key, &conn);
                    if app.should_quit {
                        return Ok(());
                    }
                }
                Event::Tick => app.tick(&conn),
                Event::Schedule => {
                    let result = app.schedule(&conn).map(|_| ());
                    app.report(result);
                }
            }
        }
    })();

    ratatui::restore();
    result
}
