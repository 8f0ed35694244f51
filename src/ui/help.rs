use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::App;

/// Draw the Help popup (F1)
pub fn draw_help(f: &mut Frame, app: &App) {
    let cs = &app.color_scheme;
    let area = centered_rect(60, 70, f.area());
    f.render_widget(Clear, area);

    let section = |title: &'static str| {
        Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD).fg(cs.popup_title),
        ))
    };

    let help_text = vec![
        Line::from(Span::styled(
            " coremon - per-core CPU monitor ",
            Style::default().fg(cs.title).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section(" Refresh "),
        Line::from(format!("  (automatic)    every {} ms", app.update_interval_ms)),
        Line::from("  F5/r/Enter     Refresh now (ignored while a sample is running)"),
        Line::from(""),
        section(" Navigation "),
        Line::from("  ↑/↓ k/j        Scroll core list"),
        Line::from("  PgUp/PgDn      Page up/down"),
        Line::from("  Home/End       Jump to top/bottom"),
        Line::from(""),
        section(" Display "),
        Line::from("  c              Cycle color scheme"),
        Line::from("  ~45.0°C        Simulated temperature (no sensor reading)"),
        Line::from("  STALE          Last sample failed, showing previous values"),
        Line::from(""),
        Line::from("  F1/h/?         Show this help"),
        Line::from("  F10/q/Ctrl+C   Quit"),
        Line::from(""),
        Line::from(Span::styled(" Press any key to close ", Style::default().fg(cs.temp_fallback))),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help ")
                .title_alignment(Alignment::Center)
                .border_style(Style::default().fg(cs.popup_border)),
        )
        .style(Style::default().fg(cs.popup_text).bg(cs.popup_bg))
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}

/// Create a centered rectangle with percentage width/height
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
