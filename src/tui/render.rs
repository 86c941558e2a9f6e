//! Confirm panel rendering

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::config::ElementIds;
use crate::page::Page;

const BORDER: Color = Color::Rgb(241, 250, 140);
const TEXT: Color = Color::Rgb(248, 248, 242);
const YES: Color = Color::Rgb(80, 250, 123);
const NO: Color = Color::Rgb(255, 99, 99);
const HINT: Color = Color::Rgb(98, 114, 164);

/// Widest the panel gets, borders included
const MAX_WIDTH: u16 = 60;

/// Draw the dialog panel if it is visible. A hidden panel draws nothing.
pub fn render_dialog(frame: &mut Frame, page: &Page, ids: &ElementIds) {
    let visible = page.update(|doc| {
        if doc.is_hidden(&ids.panel).unwrap_or(true) {
            None
        } else {
            Some(doc.text(&ids.text).unwrap_or_default().to_string())
        }
    });
    let Some(message) = visible else {
        return;
    };

    let area = panel_area(frame.area(), &message);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Confirm ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // The hint keeps the bottom row even when the prompt wraps more than expected
    let [text_area, hint_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(inner);

    let lines: Vec<Line> = message
        .lines()
        .map(|line| Line::styled(line.to_string(), Style::default().fg(TEXT)))
        .collect();
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), text_area);

    let hint = Line::from(vec![
        Span::styled("[y]", Style::default().fg(YES).add_modifier(Modifier::BOLD)),
        Span::styled(" Yes  ", Style::default().fg(HINT)),
        Span::styled("[n]", Style::default().fg(NO).add_modifier(Modifier::BOLD)),
        Span::styled(" No", Style::default().fg(HINT)),
    ]);
    frame.render_widget(Paragraph::new(hint), hint_area);
}

/// Center a panel sized for `message` inside `screen`
fn panel_area(screen: Rect, message: &str) -> Rect {
    let width = MAX_WIDTH.min(screen.width.saturating_sub(4));
    let inner_width = width.saturating_sub(2);
    let text_rows = message
        .lines()
        .map(|line| wrapped_rows(line, inner_width))
        .fold(0u16, u16::saturating_add);
    // borders, blank line and hint line
    let height = text_rows
        .saturating_add(4)
        .min(screen.height.saturating_sub(2));

    let x = screen.x + (screen.width.saturating_sub(width)) / 2;
    let y = screen.y + (screen.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Rows `line` needs once word-wrapped to `width` columns
fn wrapped_rows(line: &str, width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let mut rows = 1usize;
    let mut used = 0usize;
    for word in line.split_whitespace() {
        let word_width = Span::raw(word).width();
        let needed = if used == 0 {
            word_width
        } else {
            used + 1 + word_width
        };
        if needed <= width {
            used = needed;
        } else {
            if used > 0 {
                rows += 1;
            }
            used = word_width;
        }
        // words wider than the panel are split across rows
        while used > width {
            rows += 1;
            used -= width;
        }
    }
    u16::try_from(rows).unwrap_or(u16::MAX)
}
