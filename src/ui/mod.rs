pub mod footer;
pub mod header;
pub mod help;
pub mod matrix;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::{App, AppMode};
use wanmatrix::telemetry::scroll::ScrollBuffer;

/// Header lines above the matrix
pub const HEADER_HEIGHT: u16 = 2;

/// Render the complete UI
pub fn draw(f: &mut Frame, app: &App, buffer: &ScrollBuffer) {
    let size = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT), // rates + status
            Constraint::Min(1),                // sparkline matrix
            Constraint::Length(1),             // footer (key bar)
        ])
        .split(size);

    header::draw_header(f, app, chunks[0]);
    matrix::draw_matrix(f, buffer, chunks[1]);
    footer::draw_footer(f, app, chunks[2]);

    if app.mode == AppMode::Help {
        help::draw_help(f);
    }
}
