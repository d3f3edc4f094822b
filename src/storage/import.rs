//! Build a seed store from the pipe-delimited quote collection
//!
//! Each line reads `HH:MM|time phrase|quote text|book|author`.

use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::clock::parse_minute;
use crate::storage::database::QuoteStore;
use crate::storage::models::NewQuote;
use crate::{ProseClockError, Result};

const FIELD_COUNT: usize = 5;

/// Parse every row of a quote collection, failing on the first bad line
pub fn parse_quotes<R: Read>(reader: R) -> Result<Vec<NewQuote>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut quotes = Vec::new();

    for record in csv_reader.records() {
        let record = record.map_err(|e| ProseClockError::Import(e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() < FIELD_COUNT {
            return Err(ProseClockError::Import(format!(
                "line {}: expected {} fields, found {}",
                line,
                FIELD_COUNT,
                record.len()
            )));
        }

        let minute = parse_minute(&record[0])
            .map_err(|e| ProseClockError::Import(format!("line {}: {}", line, e)))?;

        quotes.push(NewQuote {
            minute,
            text: normalize_quotes(&emphasize(&record[2], &record[1])),
            book: normalize_quotes(&record[3]),
            author: normalize_quotes(&record[4]),
        });
    }

    Ok(quotes)
}

/// Import `csv_path` into a new seed file at `output`
pub fn import_file(csv_path: &Path, output: &Path, force: bool) -> Result<usize> {
    let file = std::fs::File::open(csv_path)
        .map_err(|e| ProseClockError::Import(format!("{}: {}", csv_path.display(), e)))?;
    let quotes = parse_quotes(file)?;

    if output.exists() {
        if !force {
            return Err(ProseClockError::Import(format!(
                "{} already exists, pass --force to overwrite",
                output.display()
            )));
        }
        std::fs::remove_file(output)?;
    }

    let store = QuoteStore::create(output)?;
    let written = store.insert_quotes(&quotes)?;

    info!("Imported {} quotes into {}", written, output.display());
    Ok(written)
}

/// Wrap the first occurrence of the time phrase in bold tags
fn emphasize(text: &str, phrase: &str) -> String {
    if phrase.is_empty() {
        return text.to_string();
    }
    text.replacen(phrase, &format!("<b>{}</b>", phrase), 1)
}

/// Collapse the collection's assorted double-quote escapes into single quotes
fn normalize_quotes(s: &str) -> String {
    s.replace("\"\"\"", "\"\"")
        .replace("\"\"", "\"")
        .replace('"', "'")
}
