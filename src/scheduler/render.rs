//! What the scheduler asks a display to show, and the displays it can ask

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::{Arc, RwLock};

use crate::clock::format_minute;
use crate::storage::Quote;

/// Whether the shown quote belongs to the current minute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// Exact match for the current minute, full opacity
    Fresh,
    /// Carried over or backfilled, dimmed
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginVisibility {
    Hidden,
    Visible,
}

/// A single display update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderRequest {
    /// Minute of day the quote was written for
    pub minute: i32,
    pub quote_id: i64,
    /// Quote text, may contain `<b>` emphasis
    pub text: String,
    /// Formatted book and author line
    pub origin: String,
    pub tone: Tone,
    pub origin_visibility: OriginVisibility,
}

impl RenderRequest {
    /// Fresh quotes hide their origin, stale ones show it
    pub fn for_quote(quote: &Quote, tone: Tone, origin_format: &str) -> Self {
        let origin_visibility = match tone {
            Tone::Fresh => OriginVisibility::Hidden,
            Tone::Stale => OriginVisibility::Visible,
        };

        Self {
            minute: quote.minute,
            quote_id: quote.id,
            text: quote.text.clone(),
            origin: quote.origin(origin_format),
            tone,
            origin_visibility,
        }
    }

    pub fn revealed(&self) -> Self {
        Self {
            origin_visibility: OriginVisibility::Visible,
            ..self.clone()
        }
    }
}

/// Anything that can paint a render request
pub trait RenderSink: Send {
    fn render(&mut self, request: &RenderRequest);
}

/// Latest render request, readable from other tasks
#[derive(Debug, Clone, Default)]
pub struct SharedView {
    latest: Arc<RwLock<Option<RenderRequest>>>,
}

impl SharedView {
    pub fn latest(&self) -> Option<RenderRequest> {
        self.latest
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl RenderSink for SharedView {
    fn render(&mut self, request: &RenderRequest) {
        *self.latest.write().unwrap_or_else(|e| e.into_inner()) = Some(request.clone());
    }
}

/// Writes each render request as a short text block
pub struct TextSink<W: Write + Send> {
    out: W,
    ansi: bool,
}

impl<W: Write + Send> TextSink<W> {
    pub fn new(out: W, ansi: bool) -> Self {
        Self { out, ansi }
    }
}

impl<W: Write + Send> RenderSink for TextSink<W> {
    fn render(&mut self, request: &RenderRequest) {
        let text = format_text(request, self.ansi);
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            tracing::warn!("Failed to write quote: {}", e);
        }
    }
}

/// Format a render request for a terminal; `ansi` enables bold and dim escapes
pub fn format_text(request: &RenderRequest, ansi: bool) -> String {
    let dim = ansi && request.tone == Tone::Stale;

    let mut body = String::new();
    for span in emphasis_spans(&request.text) {
        if ansi && span.bold {
            body.push_str("\x1b[1m");
            body.push_str(&span.text);
            // SGR 22 clears faint along with bold
            body.push_str(if dim { "\x1b[22m\x1b[2m" } else { "\x1b[22m" });
        } else {
            body.push_str(&span.text);
        }
    }

    let mut output = String::new();
    let stale_marker = match request.tone {
        Tone::Fresh => "",
        Tone::Stale => " (earlier)",
    };
    output.push_str(&format!("[{}]{}\n", format_minute(request.minute), stale_marker));

    if dim {
        output.push_str(&format!("\x1b[2m{}\x1b[0m\n", body));
    } else {
        output.push_str(&body);
        output.push('\n');
    }

    if request.origin_visibility == OriginVisibility::Visible {
        output.push_str(&format!("  -- {}\n", request.origin));
    }

    output
}

/// A run of quote text, bold or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
}

/// Split `<b>`-marked text into spans. Unknown tags pass through as text.
pub fn emphasis_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut rest = text;
    let mut bold = false;

    loop {
        let tag = if bold { "</b>" } else { "<b>" };
        match rest.find(tag) {
            Some(at) => {
                if at > 0 {
                    spans.push(Span {
                        text: rest[..at].to_string(),
                        bold,
                    });
                }
                rest = &rest[at + tag.len()..];
                bold = !bold;
            }
            None => {
                if !rest.is_empty() {
                    spans.push(Span {
                        text: rest.to_string(),
                        bold,
                    });
                }
                break;
            }
        }
    }

    spans
}
