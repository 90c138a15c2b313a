use std::cmp::Ordering;

use super::Row;

/// The column a tab is ordered by and in which direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: usize,
    pub descending: bool,
}

impl SortState {
    /// Clicking the active column flips direction; any other column starts
    /// ascending.
    pub fn toggled(current: Option<SortState>, column: usize) -> SortState {
        match current {
            Some(state) if state.column == column => SortState {
                column,
                descending: !state.descending,
            },
            _ => SortState {
                column,
                descending: false,
            },
        }
    }
}

/// Alternating background stripe for a displayed row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowParity {
    Even,
    Odd,
}

impl RowParity {
    pub fn of(index: usize) -> Self {
        if index % 2 == 0 {
            RowParity::Even
        } else {
            RowParity::Odd
        }
    }
}

/// Keep rows where any cell contains `filter` (trimmed, case-insensitive),
/// then order by the lowercase text of the sort column. Cells compare as
/// text, so `"10"` sorts before `"2"`. The sort is stable in both directions.
pub fn filter_and_sort(rows: Vec<Row>, filter: &str, sort: Option<SortState>) -> Vec<Row> {
    let needle = filter.trim().to_lowercase();
    let kept = rows.into_iter().filter(|row| {
        needle.is_empty()
            || row
                .cells
                .iter()
                .any(|cell| cell.to_lowercase().contains(&needle))
    });

    let Some(sort) = sort else {
        return kept.collect();
    };

    let mut keyed: Vec<(String, Row)> = kept
        .map(|row| {
            let key = row
                .cells
                .get(sort.column)
                .map(|cell| cell.to_lowercase())
                .unwrap_or_default();
            (key, row)
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        let order: Ordering = a.cmp(b);
        if sort.descending {
            order.reverse()
        } else {
            order
        }
    });

    keyed.into_iter().map(|(_, row)| row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, cells: &[&str]) -> Row {
        Row {
            id,
            cells: cells.iter().map(|cell| cell.to_string()).collect(),
        }
    }

    fn ids(rows: &[Row]) -> Vec<i64> {
        rows.iter().map(|row| row.id).collect()
    }

    #[test]
    fn filter_matches_any_cell_ignoring_case() {
        let rows = vec![row(1, &["1", "Rex", "Dog"]), row(2, &["2", "Milo", "Cat"])];
        let kept = filter_and_sort(rows.clone(), " RE ", None);
        assert_eq!(ids(&kept), vec![1]);

        let kept = filter_and_sort(rows, "", None);
        assert_eq!(ids(&kept), vec![1, 2]);
    }

    #[test]
    fn sort_compares_cell_text() {
        let rows = vec![row(1, &["10"]), row(2, &["2"]), row(3, &["33"])];
        let asc = filter_and_sort(
            rows.clone(),
            "",
            Some(SortState {
                column: 0,
                descending: false,
            }),
        );
        assert_eq!(ids(&asc), vec![1, 2, 3]);

        let desc = filter_and_sort(
            rows,
            "",
            Some(SortState {
                column: 0,
                descending: true,
            }),
        );
        assert_eq!(ids(&desc), vec![3, 2, 1]);
    }

    #[test]
    fn equal_keys_keep_fetched_order_both_ways() {
        let rows = vec![
            row(1, &["1", "dog"]),
            row(2, &["2", "Cat"]),
            row(3, &["3", "DOG"]),
            row(4, &["4", "cat"]),
        ];
        let asc = filter_and_sort(
            rows.clone(),
            "",
            Some(SortState {
                column: 1,
                descending: false,
            }),
        );
        assert_eq!(ids(&asc), vec![2, 4, 1, 3]);

        let desc = filter_and_sort(
            rows,
            "",
            Some(SortState {
                column: 1,
                descending: true,
            }),
        );
        assert_eq!(ids(&desc), vec![1, 3, 2, 4]);
    }

    #[test]
    fn toggling_flips_only_the_active_column() {
        let first = SortState::toggled(None, 2);
        assert!(!first.descending);
        let second = SortState::toggled(Some(first), 2);
        assert!(second.descending);
        let other = SortState::toggled(Some(second), 1);
        assert_eq!(
            other,
            SortState {
                column: 1,
                descending: false
            }
        );
    }

    #[test]
    fn stripes_alternate() {
        assert_eq!(RowParity::of(0), RowParity::Even);
        assert_eq!(RowParity::of(3), RowParity::Odd);
    }
}
