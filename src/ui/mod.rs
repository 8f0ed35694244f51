pub mod cores;
pub mod footer;
pub mod header;
pub mod help;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::{App, AppMode};

/// Rows of the core list that fit on a terminal of `height` rows
pub fn core_list_height(height: u16) -> usize {
    // info panel + footer + core list border
    height.saturating_sub(header::INFO_HEIGHT + 1 + 2) as usize
}

/// Render the complete UI
pub fn draw(f: &mut Frame, app: &App) {
    let size = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header::INFO_HEIGHT), // CPU info
            Constraint::Min(3),                      // core bars
            Constraint::Length(1),                   // footer
        ])
        .split(size);

    header::draw_header(f, app, chunks[0]);
    cores::draw_cores(f, app, chunks[1]);
    footer::draw_footer(f, app, chunks[2]);

    if app.mode == AppMode::Help {
        help::draw_help(f, app);
    }
}
