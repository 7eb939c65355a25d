use chrono::NaiveDateTime;
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::AdjustedPrayer;
use crate::tui::theme::Palette;
use crate::utils::format::format_countdown;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    palette: &Palette,
    next_prayer: Option<&AdjustedPrayer>,
    now: NaiveDateTime,
) {
    let block = Block::default()
        .title(Span::styled(" Next Prayer ", palette.accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(palette.border())
        .style(palette.surface());

    let content: Vec<Line> = match next_prayer {
        None => vec![
            Line::from(""),
            Line::from(Span::styled("  No upcoming prayer", palette.dim())),
        ],
        Some(prayer) => vec![
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    format!("  {}", prayer.name.to_uppercase()),
                    palette.accent().add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  {}", prayer.time), palette.dim()),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("  in  ", palette.dim()),
                Span::styled(
                    format_countdown(prayer.seconds_until(now)),
                    palette.amber().add_modifier(Modifier::BOLD),
                ),
            ]),
        ],
    };

    let paragraph = Paragraph::new(content)
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}
