//! Disclaimer cells marking a notebook as a generated snapshot.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use minijinja::{Environment, context};
use serde_json::json;

use crate::notebook::{Cell, DISCLAIMER_TAG, Notebook, split_source};

const DISCLAIMER_TEMPLATE: &str = include_str!("templates/disclaimer.md");

/// Inputs for one disclaimer cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disclaimer<'a> {
    /// File name of the source notebook.
    pub file_name: &'a str,
    /// Prefix joined with `file_name` to form the link back to the source.
    pub source_link_prefix: &'a str,
    /// Date the snapshot was taken.
    pub date: NaiveDate,
}

impl Disclaimer<'_> {
    pub fn source_link(&self) -> String {
        format!("{}{}", self.source_link_prefix, self.file_name)
    }

    /// Render the disclaimer as a tagged markdown cell.
    pub fn to_cell(&self) -> Result<Cell> {
        let mut env = Environment::new();
        env.add_template("disclaimer", DISCLAIMER_TEMPLATE)
            .context("load disclaimer template")?;
        let rendered = env
            .get_template("disclaimer")?
            .render(context! {
                file_name => self.file_name,
                source_link => self.source_link(),
                date => self.date.format("%Y-%m-%d").to_string(),
            })
            .context("render disclaimer")?;
        Ok(Cell::markdown(
            split_source(&rendered),
            json!({ "tags": [DISCLAIMER_TAG] }),
        ))
    }
}

/// Insert the disclaimer as both the first and the last cell.
pub fn annotate(notebook: &mut Notebook, disclaimer: &Disclaimer<'_>) -> Result<()> {
    let cell = disclaimer.to_cell()?;
    notebook.cells.insert(0, cell.clone());
    notebook.cells.push(cell);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::notebook_with_counts;

    fn disclaimer() -> Disclaimer<'static> {
        Disclaimer {
            file_name: "analysis.ipynb",
            source_link_prefix: "../",
            date: NaiveDate::from_ymd_opt(2024, 3, 9).expect("date"),
        }
    }

    #[test]
    fn renders_date_link_and_warning() {
        let cell = disclaimer().to_cell().expect("cell");
        let text = cell.source_text();
        assert!(text.contains("2024-03-09"));
        assert!(text.contains("[analysis.ipynb](../analysis.ipynb)"));
        assert!(text.contains("do not edit"));
        assert!(cell.is_disclaimer());
    }

    #[test]
    fn annotate_wraps_existing_cells() {
        let mut notebook = notebook_with_counts(&[Some(1), Some(2)]);
        let before = notebook.cells.clone();
        assert!(!before.iter().any(Cell::is_disclaimer));

        annotate(&mut notebook, &disclaimer()).expect("annotate");

        assert_eq!(notebook.cells.len(), before.len() + 2);
        assert!(notebook.cells[0].is_disclaimer());
        assert!(notebook.cells[notebook.cells.len() - 1].is_disclaimer());
        assert_eq!(&notebook.cells[1..notebook.cells.len() - 1], &before[..]);
    }

    #[test]
    fn annotate_empty_notebook_yields_two_cells() {
        let mut notebook = Notebook::new(Vec::new());
        annotate(&mut notebook, &disclaimer()).expect("annotate");
        assert_eq!(notebook.cells.len(), 2);
        assert_eq!(notebook.cells[0], notebook.cells[1]);
    }

    #[test]
    fn link_prefix_can_be_a_url() {
        let disclaimer = Disclaimer {
            source_link_prefix: "https://example.com/notebooks/",
            ..disclaimer()
        };
        assert_eq!(
            disclaimer.source_link(),
            "https://example.com/notebooks/analysis.ipynb"
        );
    }
}
