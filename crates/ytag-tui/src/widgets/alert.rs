//! Modal alert box for user input errors.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::theme::{C_ACCENT, C_MUTED, C_PRIMARY};

pub fn draw_alert(frame: &mut Frame, area: Rect, message: &str) {
    let width = (message.chars().count() as u16 + 6).clamp(30, area.width.saturating_sub(4).max(30));
    let popup = centered_rect(width, 7, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" {}", message),
            Style::default().fg(C_PRIMARY),
        )),
        Line::from(""),
        Line::from(Span::styled(" Enter / Esc to close", Style::default().fg(C_MUTED))),
    ];

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(C_ACCENT))
                    .title(Span::styled(
                        " alert ",
                        Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
                    ))
                    .style(Style::default().bg(Color::Rgb(24, 16, 20))),
            )
            .wrap(Wrap { trim: false }),
        popup,
    );
}

/// A `width` x `height` rect centered in `r`, clipped to it.
pub fn centered_rect(width: u16, height: u16, r: Rect) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height.min(r.height)),
            Constraint::Min(0),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(width.min(r.width)),
            Constraint::Min(0),
        ])
        .split(vert[1])[1]
}
