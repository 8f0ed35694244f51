use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::App;

/// Height of the info panel including its border
pub const INFO_HEIGHT: u16 = 7;

/// Draw the CPU info panel:
///
///   CPU: AMD Ryzen 7 5800X 8-Core Processor
///   Cores: 8 Physical | 16 Logical
///   Current Frequency: 3712.4 MHz
///   Base/Nominal Clock: 3800 MHz
///   Average: 12.5%   Updated 14:02:11        [ STALE since 14:02:13 ]
pub fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let cs = &app.color_scheme;
    let topology = &app.topology;
    let label = Style::default().fg(cs.info_label);
    let value = Style::default().fg(cs.info_value).add_modifier(Modifier::BOLD);

    let current_freq = app
        .snapshot
        .as_ref()
        .and_then(|s| s.current_frequency_mhz())
        .map(|mhz| format!("{mhz:.1} MHz"))
        .unwrap_or_else(|| "unknown".to_string());
    let nominal = topology
        .nominal_clock_mhz
        .map(|mhz| format!("{mhz:.0} MHz"))
        .unwrap_or_else(|| "unknown".to_string());

    let mut status = match &app.snapshot {
        Some(snap) => vec![
            Span::styled("Average: ", label),
            Span::styled(format!("{:.1}%", snap.average_utilization()), value),
            Span::styled("   Updated ", label),
            Span::styled(snap.timestamp().format("%H:%M:%S").to_string(), value),
        ],
        None => vec![Span::styled("Waiting for first sample...", label)],
    };
    if let Some(stale) = &app.stale {
        status.push(Span::raw("   "));
        status.push(Span::styled(
            format!(" STALE since {} ", stale.since.format("%H:%M:%S")),
            cs.stale_style(),
        ));
        status.push(Span::styled(format!(" {}", stale.reason), Style::default().fg(cs.stale_bg)));
    }

    let lines = vec![
        Line::from(vec![
            Span::styled("CPU: ", label),
            Span::styled(topology.display_name().to_string(), value),
        ]),
        Line::from(vec![
            Span::styled("Cores: ", label),
            Span::styled(format!("{} Physical", topology.physical_core_count), value),
            Span::styled(" | ", label),
            Span::styled(format!("{} Logical", topology.logical_core_count), value),
        ]),
        Line::from(vec![
            Span::styled("Current Frequency: ", label),
            Span::styled(current_freq, value),
        ]),
        Line::from(vec![
            Span::styled("Base/Nominal Clock: ", label),
            Span::styled(nominal, value),
        ]),
        Line::from(status),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(cs.border))
        .title(Span::styled(" CPU Monitor ", Style::default().fg(cs.title).add_modifier(Modifier::BOLD)));

    f.render_widget(Paragraph::new(lines).block(block), area);
}
