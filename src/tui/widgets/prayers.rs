use chrono::NaiveDateTime;
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

use crate::db::repository::EnabledPrayers;
use crate::models::AdjustedPrayer;
use crate::tui::theme::Palette;

pub struct PrayerList<'a> {
    pub prayers: &'a [AdjustedPrayer],
    pub enabled: &'a EnabledPrayers,
    /// Name of the upcoming prayer, highlighted
    pub next: Option<&'a str>,
    pub focused_idx: usize,
    /// Toggles are greyed out when notifications can't be shown
    pub notifications_supported: bool,
}

pub fn render(frame: &mut Frame, area: Rect, palette: &Palette, list: &PrayerList, now: NaiveDateTime) {
    let block = Block::default()
        .title(Span::styled(" Prayers ", palette.accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(palette.accent())
        .style(palette.surface());

    if list.prayers.is_empty() {
        let item = ListItem::new(Line::from(Span::styled(
            "  No timetable entry for today",
            palette.dim(),
        )));
        frame.render_widget(List::new(vec![item]).block(block), area);
        return;
    }

    let items: Vec<ListItem> = list
        .prayers
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let is_focused = i == list.focused_idx;
            let is_next = list.next == Some(p.name.as_str());
            let enabled = list.enabled.get(&p.name).copied().unwrap_or(false);

            let name_style = if is_focused {
                palette.accent().add_modifier(Modifier::BOLD)
            } else if p.at <= now {
                palette.dim()
            } else {
                palette.bold()
            };
            let time_style = if is_next {
                palette.amber().add_modifier(Modifier::BOLD)
            } else {
                palette.dim()
            };

            let (icon, toggle_style) = match (list.notifications_supported, enabled) {
                (false, _) => ("  -", palette.dim()),
                (true, true) => ("  ●", palette.green()),
                (true, false) => ("  ○", palette.dim()),
            };

            let marker = if is_focused { "▸ " } else { "  " };
            let line = Line::from(vec![
                Span::styled(marker, palette.accent()),
                Span::styled(format!("{:<10}", p.name), name_style),
                Span::styled(format!("{:<7}", p.time), time_style),
                Span::styled(icon, toggle_style),
                Span::styled(if is_next { "  next" } else { "" }, palette.amber()),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}
