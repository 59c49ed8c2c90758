//! Smooth Unicode progress bar widget.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::{C_MUTED, C_PROGRESS, C_SECONDARY};

const BLOCKS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

/// Render `label`, a bar filled to `ratio` (0.0..=1.0) and `value_text`.
/// Without a ratio the bar is drawn as an empty track.
pub fn draw_progress(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    ratio: Option<f64>,
    value_text: Option<&str>,
) {
    if area.width < 4 || area.height == 0 {
        return;
    }

    let value = value_text.unwrap_or("");
    let label_w = label.chars().count() + 1;
    let value_w = if value.is_empty() { 0 } else { value.len() + 1 };
    let bar_w = (area.width as usize).saturating_sub(label_w + value_w).max(4);

    let mut spans = vec![Span::styled(
        format!("{} ", label),
        Style::default().fg(C_SECONDARY),
    )];
    match ratio {
        Some(r) => spans.push(Span::styled(bar(r, bar_w), Style::default().fg(C_PROGRESS))),
        None => spans.push(Span::styled("·".repeat(bar_w), Style::default().fg(C_MUTED))),
    }
    if !value.is_empty() {
        spans.push(Span::styled(
            format!(" {}", value),
            Style::default().fg(C_SECONDARY),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// A `width`-cell bar filled to `ratio`, with eighth-block resolution.
pub fn bar(ratio: f64, width: usize) -> String {
    let eighths = (ratio.clamp(0.0, 1.0) * width as f64 * 8.0).round() as usize;
    let full_blocks = (eighths / 8).min(width);
    let partial = eighths % 8;

    let mut out = String::with_capacity(width * 3);
    for _ in 0..full_blocks {
        out.push('█');
    }
    if full_blocks < width {
        out.push(BLOCKS[partial]);
        for _ in (full_blocks + 1)..width {
            out.push(' ');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_cells(s: &str) -> usize {
        s.chars().filter(|&c| c == '█').count()
    }

    #[test]
    fn test_bar_width_tracks_ratio() {
        let b = bar(0.37, 100);
        assert_eq!(b.chars().count(), 100);
        assert_eq!(filled_cells(&b), 37);
    }

    #[test]
    fn test_bar_extremes() {
        assert_eq!(filled_cells(&bar(0.0, 10)), 0);
        assert_eq!(filled_cells(&bar(1.0, 10)), 10);
        assert_eq!(bar(1.0, 10).chars().count(), 10);
        assert_eq!(filled_cells(&bar(3.0, 10)), 10);
    }
}
