//! Dataset import from `mongoexport` output.
//!
//! Accepts JSON lines or a single JSON array, in canonical or relaxed Extended
//! JSON (`{"$oid": ..}`, `{"$numberInt": ..}`, `{"$numberDouble": ..}`). Fields
//! that cannot be interpreted are left empty rather than failing the record;
//! only documents that are not JSON objects are skipped.

#![allow(missing_docs)]
#![allow(clippy::cast_possible_truncation)]

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::catalog::movie::MovieDraft;
use crate::core::errors::{MflixError, Result};

/// One input document that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    /// 1-based line (JSON lines) or element index (JSON array).
    pub position: usize,
    pub reason: String,
}

/// Outcome of parsing an export.
#[derive(Debug, Clone, Default)]
pub struct ImportBatch {
    pub drafts: Vec<MovieDraft>,
    pub skipped: Vec<SkippedDocument>,
}

/// Read and parse an export file.
pub fn load_export(path: &Path) -> Result<ImportBatch> {
    let raw = fs::read_to_string(path).map_err(|source| MflixError::io(path, source))?;
    parse_export(&raw)
}

/// Parse export text, detecting JSON array vs. JSON lines by the first byte.
pub fn parse_export(raw: &str) -> Result<ImportBatch> {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('[') {
        let docs: Vec<Value> = serde_json::from_str(trimmed).map_err(|e| MflixError::Import {
            line: e.line(),
            details: e.to_string(),
        })?;
        return Ok(collect(docs.into_iter().enumerate().map(|(i, doc)| (i + 1, Ok(doc)))));
    }

    Ok(collect(
        raw.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| (i + 1, serde_json::from_str::<Value>(line))),
    ))
}

fn collect<I>(docs: I) -> ImportBatch
where
    I: Iterator<Item = (usize, std::result::Result<Value, serde_json::Error>)>,
{
    let mut batch = ImportBatch::default();
    for (position, parsed) in docs {
        match parsed {
            Ok(doc) => match draft_from_document(&doc) {
                Some(draft) => batch.drafts.push(draft),
                None => batch.skipped.push(SkippedDocument {
                    position,
                    reason: "document is not a JSON object".to_string(),
                }),
            },
            Err(e) => batch.skipped.push(SkippedDocument {
                position,
                reason: e.to_string(),
            }),
        }
    }
    batch
}

/// Map one exported movie document onto a draft record.
pub fn draft_from_document(doc: &Value) -> Option<MovieDraft> {
    let obj = doc.as_object()?;

    let genres = obj
        .get("genres")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let imdb_rating = obj
        .get("imdb")
        .and_then(|imdb| imdb.get("rating"))
        .and_then(number_f64)
        .filter(|r| (0.0..=10.0).contains(r));

    Some(MovieDraft {
        source_id: obj.get("_id").and_then(document_id),
        title: obj.get("title").and_then(text).unwrap_or_default(),
        year: obj
            .get("year")
            .and_then(number_i64)
            .and_then(|y| i32::try_from(y).ok()),
        genres,
        imdb_rating,
        poster: obj.get("poster").and_then(text),
        plot: obj.get("plot").and_then(text),
        runtime: obj
            .get("runtime")
            .and_then(number_i64)
            .and_then(|r| u32::try_from(r).ok()),
        rated: obj.get("rated").and_then(text),
    })
}

fn text(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn document_id(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => map.get("$oid").and_then(text),
        Value::String(_) => text(value),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Unwrap `{"$numberInt": "..."}`-style wrappers to their inner value.
fn unwrap_extended(value: &Value) -> &Value {
    if let Value::Object(map) = value {
        for key in ["$numberInt", "$numberLong", "$numberDouble", "$numberDecimal"] {
            if let Some(inner) = map.get(key) {
                return inner;
            }
        }
    }
    value
}

fn number_i64(value: &Value) -> Option<i64> {
    match unwrap_extended(value) {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        // Some sample_mflix years carry trailing junk ("2012è"); keep the leading digits.
        Value::String(s) => {
            let digits: String = s.trim().chars().take_while(char::is_ascii_digit).collect();
            digits.parse().ok()
        }
        _ => None,
    }
}

fn number_f64(value: &Value) -> Option<f64> {
    match unwrap_extended(value) {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}
