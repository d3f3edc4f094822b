//! Data models for storage

use serde::{Deserialize, Serialize};

/// A quote that mentions a particular time of day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Primary key in the store
    pub id: i64,

    /// Minute of day the quote refers to (0 - 1439)
    pub minute: i32,

    /// Quote text, with the time phrase wrapped in `<b>` tags
    pub text: String,

    /// Author of the book
    pub author: String,

    /// Book the quote is taken from
    pub book: String,
}

impl Quote {
    /// Format the quote's origin using a `{book}` / `{author}` template.
    ///
    /// Only the template is scanned for placeholders, never the values.
    pub fn origin(&self, format: &str) -> String {
        let mut out = String::with_capacity(format.len() + self.book.len() + self.author.len());
        let mut rest = format;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            rest = &rest[open..];
            if let Some(tail) = rest.strip_prefix("{book}") {
                out.push_str(&self.book);
                rest = tail;
            } else if let Some(tail) = rest.strip_prefix("{author}") {
                out.push_str(&self.author);
                rest = tail;
            } else {
                out.push('{');
                rest = &rest[1..];
            }
        }
        out.push_str(rest);

        out
    }
}

/// A quote row as it is written into a seed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuote {
    pub minute: i32,
    pub text: String,
    pub author: String,
    pub book: String,
}
