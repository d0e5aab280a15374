//! In-memory notebook document.
//!
//! Only the fields the snapshot pipeline inspects are typed. Everything else
//! (`metadata`, `outputs`, `nbformat`, cell ids, ...) is carried as raw JSON so
//! a load/store cycle passes it through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tag stored in `metadata.tags` of generated disclaimer cells.
pub const DISCLAIMER_TAG: &str = "snapshot-disclaimer";

/// A notebook: ordered cells plus any other top-level keys.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Notebook {
    pub cells: Vec<Cell>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Cell kind as declared by `cell_type`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    Code,
    Markdown,
    Raw,
    Other,
}

/// A single notebook cell, kept as its raw JSON object.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Cell(Map<String, Value>);

impl Cell {
    /// Build a markdown cell from already-split source lines.
    pub fn markdown(source: Vec<String>, metadata: Value) -> Self {
        let mut fields = Map::new();
        fields.insert("cell_type".to_string(), Value::from("markdown"));
        fields.insert("metadata".to_string(), metadata);
        fields.insert("source".to_string(), Value::from(source));
        Self(fields)
    }

    /// Build a code cell with the given source and execution count.
    pub fn code(source: &str, execution_count: Option<i64>) -> Self {
        let mut fields = Map::new();
        fields.insert("cell_type".to_string(), Value::from("code"));
        fields.insert("execution_count".to_string(), Value::from(execution_count));
        fields.insert("metadata".to_string(), Value::Object(Map::new()));
        fields.insert("outputs".to_string(), Value::Array(Vec::new()));
        fields.insert("source".to_string(), Value::from(split_source(source)));
        Self(fields)
    }

    pub fn kind(&self) -> CellKind {
        match self.0.get("cell_type").and_then(Value::as_str) {
            Some("code") => CellKind::Code,
            Some("markdown") => CellKind::Markdown,
            Some("raw") => CellKind::Raw,
            _ => CellKind::Other,
        }
    }

    /// Execution count, `None` when the key is absent or `null`.
    pub fn execution_count(&self) -> Option<i64> {
        self.0.get("execution_count").and_then(Value::as_i64)
    }

    /// Source text joined into one string. Accepts both the string and the
    /// list-of-lines encodings.
    pub fn source_text(&self) -> String {
        match self.0.get("source") {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Array(lines)) => lines.iter().filter_map(Value::as_str).collect(),
            _ => String::new(),
        }
    }

    pub fn has_content(&self) -> bool {
        !self.source_text().is_empty()
    }

    /// Whether this cell was generated by the annotator.
    pub fn is_disclaimer(&self) -> bool {
        self.0
            .get("metadata")
            .and_then(|metadata| metadata.get("tags"))
            .and_then(Value::as_array)
            .is_some_and(|tags| tags.iter().any(|tag| tag.as_str() == Some(DISCLAIMER_TAG)))
    }
}

impl Notebook {
    pub fn new(cells: Vec<Cell>) -> Self {
        let mut rest = Map::new();
        rest.insert("metadata".to_string(), Value::Object(Map::new()));
        rest.insert("nbformat".to_string(), Value::from(4));
        rest.insert("nbformat_minor".to_string(), Value::from(5));
        Self { cells, rest }
    }
}

/// Split text into notebook source lines, each keeping its trailing newline.
pub fn split_source(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_string).collect()
}
