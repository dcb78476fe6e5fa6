use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::App;
use wanmatrix::telemetry::rate::{format_rate, RateSnapshot, SampleKind};

/// Draw the two header lines:
///
///   ↓ in  1.2M/s / 4.0M/s   ↑ out  80K/s / 1.1M/s   [250ms]
///   wan @ http://10.0.0.1/ubus/  updated 12:34:56  polls 120 (2 failed)  PAUSED
pub fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    f.render_widget(Paragraph::new(header_lines(app)), area);
}

pub fn header_lines(app: &App) -> Vec<Line<'static>> {
    vec![rate_line(app.snapshot.as_ref()), status_line(app)]
}

fn rate_line(snap: Option<&RateSnapshot>) -> Line<'static> {
    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);

    let Some(snap) = snap else {
        return Line::from(Span::styled(" waiting for the first sample…", dim));
    };

    let mut spans = vec![
        Span::styled(" ↓ in ", label),
        Span::styled(format_rate(snap.cur_rx), Style::default().fg(Color::Red)),
        Span::styled(format!(" / {}", format_rate(snap.peak_rx)), dim),
        Span::styled("   ↑ out ", label),
        Span::styled(format_rate(snap.cur_tx), Style::default().fg(Color::Blue)),
        Span::styled(format!(" / {}", format_rate(snap.peak_tx)), dim),
        Span::styled(format!("   [{}ms]", snap.elapsed.as_millis()), dim),
    ];
    if let SampleKind::CounterReset { .. } = snap.kind {
        spans.push(Span::styled("  counter reset", Style::default().fg(Color::Yellow)));
    }
    Line::from(spans)
}

fn status_line(app: &App) -> Line<'static> {
    let mut spans = vec![
        Span::styled(format!(" {}", app.interface), Style::default().fg(Color::Green)),
        Span::raw(format!(" @ {}", app.endpoint)),
    ];
    if let Some(at) = app.last_update {
        spans.push(Span::raw(format!("  updated {}", at.format("%H:%M:%S"))));
    }
    spans.push(Span::raw(format!("  polls {}", app.polls)));
    if app.failed_polls > 0 {
        spans.push(Span::raw(format!(" ({} failed)", app.failed_polls)));
    }
    if app.paused {
        spans.push(Span::styled(
            "  PAUSED",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
    }
    if let Some(err) = &app.last_error {
        spans.push(Span::styled(format!("  error: {err}"), Style::default().fg(Color::LightRed)));
    }
    Line::from(spans)
}
