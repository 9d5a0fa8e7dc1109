//! The view pipeline: filter → stable sort → page slice.

use crate::sort::{stable_sort_indexed, SortSpec};
use lattice_commons::{Entity, ListFilter, RowView};

/// Zero-based page window over the sorted, filtered record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub index: usize,
    pub size: usize,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self { index: 0, size: 5 }
    }
}

impl PageWindow {
    pub fn new(index: usize, size: usize) -> Self {
        Self {
            index,
            size: size.max(1),
        }
    }

    /// Moving to a new page size resets to the first page, mirroring the
    /// usual rows-per-page control.
    pub fn resized(self, size: usize) -> Self {
        Self::new(0, size)
    }
}

/// Everything the view pipeline needs from the presentation layer.
#[derive(Debug, Clone)]
pub struct TableQuery<F> {
    /// Case-insensitive substring match over the record's searchable
    /// fields; `None`/empty matches everything.
    pub search: Option<String>,
    /// Status label filter; `None` or `"all"` matches everything.
    pub status: Option<String>,
    /// Active sort, if any. `None` keeps input order.
    pub sort: Option<SortSpec<F>>,
    pub page: PageWindow,
}

// Manual impl: the derive would bound `F: Default`.
impl<F> Default for TableQuery<F> {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            sort: None,
            page: PageWindow::default(),
        }
    }
}

impl TableQuery<lattice_commons::CustomerField> {
    /// The customer table as it first opens: unfiltered, sorted by name
    /// ascending, first page.
    pub fn customer_table() -> Self {
        Self {
            sort: Some(SortSpec::ascending(lattice_commons::CustomerField::Name)),
            ..Self::default()
        }
    }
}

impl<F> TableQuery<F> {
    fn predicate(&self) -> ListFilter {
        ListFilter {
            search: self.search.clone(),
            status: self.status.clone(),
            ..Default::default()
        }
    }
}

/// The computed slice handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSlice<E> {
    /// Rows for the current page, in display order.
    pub visible: Vec<E>,
    /// How many records matched the filter before paging; drives the
    /// pagination control.
    pub total_matching: usize,
}

/// Computes the visible slice for a record set.
///
/// Pure on its inputs: same records and query, same slice. An out-of-range
/// page (say, after a delete shrank the set) yields an empty `visible`
/// rather than an error; the pagination control clamps on the next
/// interaction.
pub fn view<E>(records: &[E], query: &TableQuery<E::Field>) -> TableSlice<E>
where
    E: Entity + RowView,
{
    let predicate = query.predicate();
    let mut rows: Vec<(usize, &E)> = records
        .iter()
        .filter(|record| record.matches(&predicate))
        .enumerate()
        .collect();

    if let Some(spec) = query.sort {
        stable_sort_indexed(&mut rows, spec);
    }

    let total_matching = rows.len();
    let start = query.page.index.saturating_mul(query.page.size);
    let visible = rows
        .into_iter()
        .skip(start)
        .take(query.page.size)
        .map(|(_, record)| record.clone())
        .collect();

    TableSlice {
        visible,
        total_matching,
    }
}
