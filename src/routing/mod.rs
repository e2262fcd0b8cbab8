//! Row routing: author resolution, row fragments and per-recipient tables.

pub mod author;
pub mod engine;
pub mod fragment;

pub use author::{AuthorResolver, parse_author};
pub use engine::{RecipientRows, Router, RoutingTable};
pub use fragment::{Cell, RowFragment, RowRenderer, identifier_column};
