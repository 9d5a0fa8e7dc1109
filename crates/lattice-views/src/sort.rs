//! Single-column sort specification with stable ordering.

use lattice_commons::{RowView, SortOrder};
use std::cmp::Ordering;

/// The active sort: one column, one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec<F> {
    pub field: F,
    pub order: SortOrder,
}

impl<F: Copy + Eq> SortSpec<F> {
    pub fn ascending(field: F) -> Self {
        Self {
            field,
            order: SortOrder::Asc,
        }
    }

    /// Column-header click semantics: selecting the active column flips the
    /// direction, selecting a new column resets to ascending.
    pub fn toggle(self, field: F) -> Self {
        if self.field == field {
            Self {
                field,
                order: self.order.flipped(),
            }
        } else {
            Self::ascending(field)
        }
    }
}

/// Stable sort over decorated rows.
///
/// Decorate-sort-undecorate with the original index as the explicit
/// tie-break: rows comparing equal on the sort column keep their input
/// order in both directions. The index tie-break is never reversed, so a
/// descending sort does not reshuffle ties.
pub(crate) fn stable_sort_indexed<E: RowView>(rows: &mut Vec<(usize, &E)>, spec: SortSpec<E::Field>) {
    rows.sort_unstable_by(|(index_a, a), (index_b, b)| {
        let by_field = a.cell(spec.field).compare(&b.cell(spec.field));
        let by_field = match spec.order {
            SortOrder::Asc => by_field,
            SortOrder::Desc => by_field.reverse(),
        };
        match by_field {
            Ordering::Equal => index_a.cmp(index_b),
            decided => decided,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_commons::CustomerField;

    #[test]
    fn test_toggle_same_field_flips_direction() {
        let spec = SortSpec::ascending(CustomerField::Name);
        let flipped = spec.toggle(CustomerField::Name);
        assert_eq!(flipped.field, CustomerField::Name);
        assert_eq!(flipped.order, SortOrder::Desc);
        assert_eq!(flipped.toggle(CustomerField::Name).order, SortOrder::Asc);
    }

    #[test]
    fn test_toggle_new_field_resets_to_ascending() {
        let spec = SortSpec {
            field: CustomerField::Name,
            order: SortOrder::Desc,
        };
        let switched = spec.toggle(CustomerField::TotalValue);
        assert_eq!(switched.field, CustomerField::TotalValue);
        assert_eq!(switched.order, SortOrder::Asc);
    }
}
