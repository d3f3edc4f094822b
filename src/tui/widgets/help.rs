//! Help popup widget

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// Help popup that shows keyboard shortcuts
pub struct HelpPopup;

const SHORTCUTS: [(&str, &str); 4] = [
    ("space", "Show where the quote is from"),
    ("Enter", "Same as space"),
    ("?", "Show this help"),
    ("q/Esc", "Quit"),
];

impl HelpPopup {
    pub fn draw(frame: &mut Frame, area: Rect) {
        // Centered, 60% width, 50% height
        let popup_width = (area.width as f32 * 0.6) as u16;
        let popup_height = (area.height as f32 * 0.5) as u16;

        let popup_area = Rect {
            x: (area.width - popup_width) / 2,
            y: (area.height - popup_height) / 2,
            width: popup_width,
            height: popup_height,
        };

        frame.render_widget(Clear, popup_area);

        let mut lines = vec![
            Line::from(Span::styled(
                "Shortcuts",
                Style::default().fg(Color::Cyan).bold(),
            )),
            Line::from(""),
        ];
        for (key, action) in SHORTCUTS {
            lines.push(Line::from(vec![
                Span::styled(format!("{:<8}", key), Style::default().fg(Color::Yellow)),
                Span::raw(action),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Dimmed quotes are from an earlier minute.",
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(Span::styled(
            "Press any key to close",
            Style::default().fg(Color::DarkGray),
        )));

        let help = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .style(Style::default().bg(Color::Black)),
        );

        frame.render_widget(help, popup_area);
    }
}
