//! Clock screen - the quote for the current minute

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::clock::format_minute;
use crate::scheduler::render::emphasis_spans;
use crate::scheduler::{OriginVisibility, RenderRequest, Tone};

#[derive(Debug, Default)]
pub struct ClockScreen;

impl ClockScreen {
    pub fn new() -> Self {
        Self
    }

    pub fn draw(
        &self,
        frame: &mut Frame,
        area: Rect,
        request: Option<&RenderRequest>,
        loading: bool,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Min(5),    // Quote
                Constraint::Length(3), // Help
            ])
            .split(area);

        let title_text = match request {
            Some(request) => format!("proseclock  {}", format_minute(request.minute)),
            None => "proseclock".to_string(),
        };
        let title = Paragraph::new(title_text)
            .style(Style::default().fg(Color::Cyan).bold())
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::BOTTOM));
        frame.render_widget(title, chunks[0]);

        let body = match request {
            Some(request) => quote_lines(request),
            None if loading => vec![Line::from(Span::styled(
                "Opening quote store...",
                Style::default().fg(Color::DarkGray),
            ))],
            None => vec![Line::from(Span::styled(
                "No quote to show yet",
                Style::default().fg(Color::DarkGray),
            ))],
        };

        let quote = Paragraph::new(body)
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        frame.render_widget(quote, chunks[1]);

        let help = Paragraph::new(Line::from(vec![
            Span::styled(" [space] ", Style::default().fg(Color::Black).bg(Color::Cyan)),
            Span::raw(" Reveal  "),
            Span::styled(" [?] ", Style::default().fg(Color::Black).bg(Color::Cyan)),
            Span::raw(" Help  "),
            Span::styled(" [q] ", Style::default().fg(Color::Black).bg(Color::Cyan)),
            Span::raw(" Quit"),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(help, chunks[2]);
    }
}

/// Quote text with emphasis in bold, dimmed when stale, then the origin if shown
pub fn quote_lines(request: &RenderRequest) -> Vec<Line<'static>> {
    let base = match request.tone {
        Tone::Fresh => Style::default().fg(Color::White),
        Tone::Stale => Style::default().fg(Color::DarkGray),
    };

    let spans: Vec<Span<'static>> = emphasis_spans(&request.text)
        .into_iter()
        .map(|span| {
            let style = if span.bold { base.bold() } else { base };
            Span::styled(span.text, style)
        })
        .collect();

    let mut lines = vec![Line::from(spans)];

    if request.origin_visibility == OriginVisibility::Visible {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("-- {}", request.origin),
            base.italic(),
        )));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(tone: Tone, origin_visibility: OriginVisibility) -> RenderRequest {
        RenderRequest {
            minute: 720,
            quote_id: 1,
            text: "It was <b>noon</b> exactly.".to_string(),
            origin: "Book, by Author".to_string(),
            tone,
            origin_visibility,
        }
    }

    #[test]
    fn emphasis_is_bold() {
        let lines = quote_lines(&request(Tone::Fresh, OriginVisibility::Hidden));
        assert_eq!(lines.len(), 1);

        let spans = &lines[0].spans;
        assert_eq!(spans[1].content, "noon");
        assert!(spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert!(!spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn stale_is_dimmed_and_shows_origin() {
        let lines = quote_lines(&request(Tone::Stale, OriginVisibility::Visible));
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::DarkGray));
        assert!(lines[2].spans[0].content.contains("Book, by Author"));
    }
}
