use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use wanmatrix::telemetry::scroll::{Pixel, ScrollBuffer};

/// Each pixel is two terminal cells wide so it looks roughly square
const CELL: &str = "  ";

pub fn pixel_color(p: Pixel) -> Color {
    Color::Rgb(p.r, p.g, p.b)
}

/// One line per buffer row, newest sample on the left
pub fn matrix_lines(buffer: &ScrollBuffer) -> Vec<Line<'static>> {
    (0..buffer.height())
        .map(|y| {
            let spans: Vec<Span> = buffer
                .row(y)
                .iter()
                .map(|p| Span::styled(CELL, Style::default().bg(pixel_color(*p))))
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Draw the sparkline grid; rows or columns that do not fit are cut off
pub fn draw_matrix(f: &mut Frame, buffer: &ScrollBuffer, area: Rect) {
    f.render_widget(Paragraph::new(matrix_lines(buffer)), area);
}
