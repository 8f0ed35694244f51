use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::color_scheme::ColorScheme;
use crate::system::CoreReading;

/// Width reserved for the temperature column: "~100.0°C / 212.0°F"
const TEMP_COL_WIDTH: usize = 19;

/// Draw the scrollable core list: physical cores, then logical cores.
pub fn draw_cores(f: &mut Frame, app: &App, area: Rect) {
    let cs = &app.color_scheme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(cs.border));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = core_lines(app, inner.width as usize);
    let visible = lines
        .into_iter()
        .skip(app.scroll_offset)
        .take(inner.height as usize)
        .collect::<Vec<_>>();
    f.render_widget(Paragraph::new(visible), inner);
}

/// Every row of the core list, in display order
pub fn core_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    let cs = &app.color_scheme;
    let topology = &app.topology;
    let title = Style::default().fg(cs.title).add_modifier(Modifier::BOLD);

    let physical_labels: Vec<String> = (0..topology.physical_core_count).map(|i| format!("Core {i}")).collect();
    let logical_labels: Vec<String> = (0..topology.logical_core_count).map(|i| format!("Logical Core {i}")).collect();
    let label_width = physical_labels
        .iter()
        .chain(logical_labels.iter())
        .map(|l| l.width())
        .max()
        .unwrap_or(0);

    let mut lines = Vec::with_capacity(app.core_list_rows());
    lines.push(Line::from(Span::styled("Physical Cores", title)));
    push_section(&mut lines, &physical_labels, app.snapshot.as_ref().map(|s| s.physical_readings()), label_width, width, cs);
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Logical / Virtual Cores", title)));
    push_section(&mut lines, &logical_labels, app.snapshot.as_ref().map(|s| s.logical_readings()), label_width, width, cs);
    lines
}

fn push_section(
    lines: &mut Vec<Line<'static>>,
    labels: &[String],
    readings: Option<&[CoreReading]>,
    label_width: usize,
    width: usize,
    cs: &ColorScheme,
) {
    for (i, label) in labels.iter().enumerate() {
        let reading = readings.and_then(|r| r.get(i));
        lines.push(core_line(label, reading, label_width, width, cs));
    }
}

/// One row: `Core 3        [||||||        ] 42.0%  ~51.2°C / 124.2°F`
fn core_line(label: &str, reading: Option<&CoreReading>, label_width: usize, width: usize, cs: &ColorScheme) -> Line<'static> {
    let padded = format!("{}{} ", label, " ".repeat(label_width.saturating_sub(label.width())));

    let Some(reading) = reading else {
        return Line::from(vec![
            Span::styled(padded, Style::default().fg(cs.core_label)),
            Span::styled("--", Style::default().fg(cs.bar_bg)),
        ]);
    };

    let usage = reading.utilization_percent;
    let pct_label = format!("{:>5.1}%", usage);
    let temp_label = match reading.temperature {
        Some(t) => format!(
            "{}{:.1}°C / {:.1}°F",
            if t.is_fallback() { "~" } else { " " },
            t.celsius,
            t.fahrenheit()
        ),
        None => " --".to_string(),
    };
    let temp_style = match reading.temperature {
        Some(t) if !t.is_fallback() => Style::default().fg(cs.temp_sensor),
        _ => Style::default().fg(cs.temp_fallback),
    };

    let prefix_len = padded.width();
    let suffix_len = pct_label.len() + 2 + TEMP_COL_WIDTH;
    let bracket_len = 2;
    let available = width.saturating_sub(prefix_len + suffix_len + bracket_len);

    let filled = (((usage as f64) / 100.0) * available as f64) as usize;
    let filled = filled.min(available);
    let empty = available - filled;

    Line::from(vec![
        Span::styled(padded, Style::default().fg(cs.core_label).add_modifier(Modifier::BOLD)),
        Span::styled("[", Style::default().fg(cs.core_label)),
        Span::styled("|".repeat(filled), Style::default().fg(cs.usage_color(usage))),
        Span::styled(" ".repeat(empty), Style::default().fg(cs.bar_bg)),
        Span::styled("]", Style::default().fg(cs.core_label)),
        Span::styled(pct_label, Style::default().fg(cs.core_label)),
        Span::raw("  "),
        Span::styled(temp_label, temp_style),
    ])
}
