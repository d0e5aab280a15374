//! Execution-order check for notebooks.

use std::fmt;

use crate::notebook::{CellKind, Notebook};

/// First reason a notebook fails the execution-order check.
///
/// `index` is the position of the offending cell in `Notebook::cells`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderViolation {
    /// Code cell with source but no execution count.
    Unexecuted { index: usize },
    /// Execution count does not follow the previous one.
    Gap {
        index: usize,
        previous: i64,
        found: i64,
    },
}

impl fmt::Display for OrderViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unexecuted { index } => write!(f, "cell {index} was never executed"),
            Self::Gap {
                index,
                previous,
                found,
            } => match previous.checked_add(1) {
                Some(expected) => write!(
                    f,
                    "cell {index} has execution count {found}, expected {expected}"
                ),
                None => write!(
                    f,
                    "cell {index} has execution count {found} after maximal count {previous}"
                ),
            },
        }
    }
}

/// Check that every non-empty code cell was executed, in document order, with
/// contiguous execution counts.
///
/// Code cells with neither an execution count nor source are placeholders and
/// are ignored. The first counted cell may start at any value. A notebook with
/// no code cells passes.
pub fn check_order(notebook: &Notebook) -> Result<(), OrderViolation> {
    let mut previous: Option<i64> = None;
    for (index, cell) in notebook.cells.iter().enumerate() {
        if cell.kind() != CellKind::Code {
            continue;
        }
        let count = match cell.execution_count() {
            Some(count) => count,
            None if !cell.has_content() => continue,
            None => return Err(OrderViolation::Unexecuted { index }),
        };
        if let Some(previous) = previous
            && previous.checked_add(1) != Some(count)
        {
            return Err(OrderViolation::Gap {
                index,
                previous,
                found: count,
            });
        }
        previous = Some(count);
    }
    Ok(())
}

/// Boolean form of [`check_order`].
pub fn is_executed_in_order(notebook: &Notebook) -> bool {
    check_order(notebook).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notebook::Cell;
    use crate::test_support::{empty_code_cell, markdown_cell, notebook_with_counts};

    #[test]
    fn contiguous_counts_pass() {
        let notebook = notebook_with_counts(&[Some(1), Some(2), Some(3)]);
        assert_eq!(check_order(&notebook), Ok(()));
    }

    #[test]
    fn counts_may_start_anywhere() {
        let notebook = notebook_with_counts(&[Some(7), Some(8)]);
        assert!(is_executed_in_order(&notebook));
    }

    #[test]
    fn gap_fails() {
        let notebook = notebook_with_counts(&[Some(1), Some(3)]);
        assert_eq!(
            check_order(&notebook),
            Err(OrderViolation::Gap {
                index: 2,
                previous: 1,
                found: 3,
            })
        );
    }

    #[test]
    fn regression_fails() {
        let notebook = notebook_with_counts(&[Some(2), Some(1)]);
        assert!(!is_executed_in_order(&notebook));
    }

    #[test]
    fn repeated_count_fails() {
        let notebook = notebook_with_counts(&[Some(1), Some(1)]);
        assert!(!is_executed_in_order(&notebook));
    }

    #[test]
    fn unexecuted_cell_with_source_fails() {
        let notebook = notebook_with_counts(&[Some(1), None, Some(2)]);
        assert_eq!(
            check_order(&notebook),
            Err(OrderViolation::Unexecuted { index: 2 })
        );
    }

    #[test]
    fn maximal_count_is_followed_by_a_gap() {
        let notebook = Notebook::new(vec![
            Cell::code("a = 1", Some(i64::MAX)),
            Cell::code("b = 2", Some(1)),
        ]);
        let violation = check_order(&notebook).expect_err("gap");
        assert_eq!(
            violation,
            OrderViolation::Gap {
                index: 1,
                previous: i64::MAX,
                found: 1,
            }
        );
        assert_eq!(
            violation.to_string(),
            format!("cell 1 has execution count 1 after maximal count {}", i64::MAX)
        );
    }

    #[test]
    fn empty_placeholders_and_markdown_are_ignored() {
        let notebook = Notebook::new(vec![
            markdown_cell("# Intro"),
            Cell::code("a = 1", Some(1)),
            empty_code_cell(),
            markdown_cell("more"),
            Cell::code("b = 2", Some(2)),
            empty_code_cell(),
        ]);
        assert!(is_executed_in_order(&notebook));
    }

    #[test]
    fn empty_cell_with_count_still_counts() {
        let notebook = Notebook::new(vec![
            Cell::code("a = 1", Some(1)),
            Cell::code("", Some(2)),
            Cell::code("b = 2", Some(4)),
        ]);
        assert!(!is_executed_in_order(&notebook));
    }

    #[test]
    fn no_code_cells_passes() {
        let notebook = Notebook::new(vec![markdown_cell("only prose")]);
        assert!(is_executed_in_order(&notebook));
        assert!(is_executed_in_order(&Notebook::new(Vec::new())));
    }

    #[test]
    fn violation_messages_name_the_cell() {
        let gap = OrderViolation::Gap {
            index: 4,
            previous: 2,
            found: 5,
        };
        assert_eq!(gap.to_string(), "cell 4 has execution count 5, expected 3");
        assert_eq!(
            OrderViolation::Unexecuted { index: 0 }.to_string(),
            "cell 0 was never executed"
        );
    }
}
