//! Row fragments: a data row prepared for display, with the identifier
//! cell already turned into a cross-reference link.

use crate::checks::Priority;
use crate::report::{Headers, Row};

/// Identifier column labels, in lookup order. A header matches when it
/// ends with one of these, so `Event_DB_ID` is an identifier column.
pub const IDENTIFIER_HEADERS: &[&str] = &["DB_ID", "DBID"];

/// One display cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Link { text: String, href: String },
    Priority(Priority),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

/// A rendered report row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowFragment {
    pub cells: Vec<Cell>,
}

impl RowFragment {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    pub fn is_link(&self, index: usize) -> bool {
        matches!(self.cells.get(index), Some(Cell::Link { .. }))
    }
}

/// Position of the identifier column, if the report has one.
///
/// Variants are tried in order; for each, the first header ending with it
/// wins.
pub fn identifier_column(headers: &Headers) -> Option<usize> {
    IDENTIFIER_HEADERS
        .iter()
        .find_map(|variant| headers.position(|label| label.ends_with(variant)))
}

/// Turns rows into fragments, linking the identifier cell to the instance
/// browser.
#[derive(Debug, Clone)]
pub struct RowRenderer {
    id_column: Option<usize>,
    link_prefix: String,
}

impl RowRenderer {
    pub fn new(id_column: Option<usize>, link_prefix: impl Into<String>) -> Self {
        Self {
            id_column,
            link_prefix: link_prefix.into(),
        }
    }

    pub fn for_headers(headers: &Headers, link_prefix: impl Into<String>) -> Self {
        Self::new(identifier_column(headers), link_prefix)
    }

    pub fn render(&self, row: &Row) -> RowFragment {
        let cells = row
            .cells()
            .iter()
            .enumerate()
            .map(|(i, value)| {
                if self.id_column == Some(i) {
                    Cell::Link {
                        text: value.clone(),
                        href: format!("{}{}", self.link_prefix, value),
                    }
                } else {
                    Cell::Text(value.clone())
                }
            })
            .collect();
        RowFragment::new(cells)
    }
}
