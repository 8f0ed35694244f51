use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{App, AppMode};

/// F-key definitions: (key_label, description)
const FKEYS_NORMAL: &[(&str, &str)] = &[
    ("F1", "Help  "),
    ("F5", "Refresh"),
    ("c", "Colors "),
    ("F10", "Quit "),
];

const FKEYS_HELP: &[(&str, &str)] = &[("Esc", "Close "), ("F10", "Quit ")];

/// Draw the bottom key bar, with the transient status message on the right
pub fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let cs = &app.color_scheme;

    // Full-width background first
    let bg_fill = " ".repeat(area.width as usize);
    f.render_widget(
        Paragraph::new(bg_fill).style(Style::default().bg(cs.footer_label_bg)),
        area,
    );

    let fkeys = match app.mode {
        AppMode::Help => FKEYS_HELP,
        AppMode::Normal => FKEYS_NORMAL,
    };

    let mut spans: Vec<Span> = Vec::new();
    for (key, desc) in fkeys {
        spans.push(Span::styled(key.to_string(), cs.footer_key_style()));
        spans.push(Span::styled(desc.to_string(), cs.footer_label_style()));
    }

    if let Some(msg) = &app.status_message {
        spans.push(Span::styled(format!("  {msg}"), cs.footer_label_style()));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
