use chrono::NaiveDateTime;
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::tui::theme::Palette;

pub fn render(frame: &mut Frame, area: Rect, palette: &Palette, city_label: &str, now: NaiveDateTime) {
    let title_line = Line::from(vec![
        Span::styled("  نمازکار  ", palette.accent().add_modifier(Modifier::BOLD)),
        Span::styled("namazkar", palette.accent()),
    ]);

    let info_line = Line::from(vec![
        Span::styled(city_label, palette.amber()),
        Span::styled("  ·  ", palette.dim()),
        Span::styled(now.format("%A, %b %d").to_string(), palette.dim()),
        Span::styled("  ·  ", palette.dim()),
        Span::styled(now.format("%H:%M:%S").to_string(), palette.bold()),
    ]);

    let text = vec![title_line, Line::from(""), info_line];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(palette.accent().add_modifier(Modifier::BOLD))
        .style(palette.base());

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
