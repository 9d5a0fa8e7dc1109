//! # lattice-views
//!
//! The table view engine: a pure, referentially transparent pipeline that
//! turns a record set plus view parameters into the visible slice.
//!
//! ```text
//! records ──filter──▶ matching ──stable sort──▶ ordered ──page──▶ visible
//! ```
//!
//! Filtering runs before sorting, sorting before paging. Nothing here is
//! async and nothing touches the cache or the store; the presentation layer
//! feeds in whatever record set it currently holds and renders the result.

pub mod sort;
pub mod table_view;

pub use sort::SortSpec;
pub use table_view::{view, PageWindow, TableQuery, TableSlice};
