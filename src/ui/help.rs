use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

/// Draw the Help popup (F1)
pub fn draw_help(f: &mut Frame) {
    let area = centered_rect(60, 60, f.area());
    f.render_widget(Clear, area);

    let section = Style::default().add_modifier(Modifier::BOLD).fg(Color::Yellow);
    let help_text = vec![
        Line::from(Span::styled(
            " wanmatrix - router bandwidth sparkline ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(" Reading the matrix ", section)),
        Line::from("  Newest sample is the left column; history scrolls right."),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("Red", Style::default().fg(Color::Red)),
            Span::raw(" bars hang from the top: download vs. its peak."),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("Blue", Style::default().fg(Color::Blue)),
            Span::raw(" bars rise from the bottom: upload vs. its peak."),
        ]),
        Line::from(""),
        Line::from(Span::styled(" Keys ", section)),
        Line::from("  F1/h/?      Show this help"),
        Line::from("  z/Z         Pause/resume polling"),
        Line::from("  F10/q       Quit"),
        Line::from("  Ctrl+C      Quit"),
        Line::from(""),
        Line::from(Span::styled(
            " Press Esc or F1 to close ",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help ")
                .title_alignment(Alignment::Center)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White).bg(Color::Black))
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
