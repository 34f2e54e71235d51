//! Bulk topic import from a plain-text file.
//!
//! One topic per line, fields separated by `;`:
//!
//! ```text
//! title ; start date ; area ; tags ; description
//! ```
//!
//! Only the title is required; trailing fields may be omitted and empty
//! fields fall back to the defaults of `topic add`. Blank lines and lines
//! starting with `#` are skipped.

use anyhow::{Context as _, bail};
use chrono::NaiveDate;

use crate::format::parse_date;

/// One parsed line of an import file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
  pub line:        usize,
  pub title:       String,
  pub start:       Option<NaiveDate>,
  pub area:        Option<String>,
  pub tags:        String,
  pub description: String,
}

const MAX_FIELDS: usize = 5;

pub fn parse_import(text: &str) -> anyhow::Result<Vec<ImportRow>> {
  text
    .lines()
    .enumerate()
    .map(|(i, raw)| (i + 1, raw.trim()))
    .filter(|(_, raw)| !raw.is_empty() && !raw.starts_with('#'))
    .map(|(line, raw)| parse_line(line, raw).with_context(|| format!("line {line}")))
    .collect()
}

fn parse_line(line: usize, raw: &str) -> anyhow::Result<ImportRow> {
  let fields: Vec<&str> = raw.split(';').map(str::trim).collect();
  if fields.len() > MAX_FIELDS {
    bail!("expected at most {MAX_FIELDS} `;`-separated fields, found {}", fields.len());
  }
  let field = |i: usize| fields.get(i).copied().filter(|f| !f.is_empty());

  let title = field(0).context("missing title")?.to_owned();
  Ok(ImportRow {
    line,
    title,
    start: field(1).map(parse_date).transpose()?,
    area: field(2).map(str::to_owned),
    tags: field(3).unwrap_or_default().to_owned(),
    description: field(4).unwrap_or_default().to_owned(),
  })
}
