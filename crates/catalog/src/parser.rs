//! Parser for catalog data files.
//!
//! Format, one item per line:
//! `id::title::rating::year::duration::Genre|Genre::tag|tag`
//!
//! Blank lines and lines starting with `#` are skipped. Genre and tag lists
//! may be empty. Lines are independent, so they are parsed in parallel with
//! Rayon and the results are collected back in file order.

use crate::error::{CatalogError, Result};
use crate::types::*;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

const FIELD_SEPARATOR: &str = "::";
const LIST_SEPARATOR: char = '|';
const FIELD_COUNT: usize = 7;

/// Parse a catalog file from disk
pub fn parse_catalog(path: &Path) -> Result<Vec<CatalogItem>> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CatalogError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => CatalogError::IoError(e),
    })?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    parse_catalog_str(&content, &file_name)
}

/// Parse catalog content already in memory.
///
/// `file_name` only feeds error messages.
pub fn parse_catalog_str(content: &str, file_name: &str) -> Result<Vec<CatalogItem>> {
    let lines: Vec<(usize, &str)> = content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .collect();

    lines
        .par_iter()
        .map(|&(line_no, line)| parse_line(line, line_no, file_name))
        .collect()
}

/// Parse one non-empty, non-comment line
fn parse_line(line: &str, line_no: usize, file_name: &str) -> Result<CatalogItem> {
    let parse_error = |reason: String| CatalogError::ParseError {
        file: file_name.to_string(),
        line: line_no,
        reason,
    };

    let parts: Vec<&str> = line.split(FIELD_SEPARATOR).map(str::trim).collect();
    if parts.len() != FIELD_COUNT {
        return Err(parse_error(format!(
            "Expected {} fields but found {}",
            FIELD_COUNT,
            parts.len()
        )));
    }

    let id: ItemId = parts[0]
        .parse()
        .map_err(|e| parse_error(format!("Invalid id: {}", e)))?;

    let title = parts[1];
    if title.is_empty() {
        return Err(parse_error("Missing title".to_string()));
    }

    let rating: f64 = parts[2]
        .parse()
        .map_err(|e| parse_error(format!("Invalid rating: {}", e)))?;
    if !(0.0..=MAX_RATING).contains(&rating) {
        return Err(CatalogError::InvalidValue {
            field: "rating".to_string(),
            value: parts[2].to_string(),
        });
    }

    let year: u16 = parts[3]
        .parse()
        .map_err(|e| parse_error(format!("Invalid year: {}", e)))?;

    let duration_minutes: u32 = parts[4]
        .parse()
        .map_err(|e| parse_error(format!("Invalid duration: {}", e)))?;

    Ok(CatalogItem {
        id,
        title: title.to_string(),
        rating,
        year,
        duration_minutes,
        genres: parse_labels(parts[5]),
        tags: parse_labels(parts[6]),
    })
}

/// Parse a pipe-separated label list
///
/// Example: "Crime|Drama" -> {"Crime", "Drama"}
///          "" -> {}
fn parse_labels(s: &str) -> BTreeSet<String> {
    s.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}
