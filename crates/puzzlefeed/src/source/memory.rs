use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use tracing::debug;

use super::{Column, Direction, OrderBy, PuzzleQuery, PuzzleSource};
use crate::error::Result;
use crate::puzzle::RawPuzzleRow;

/// In-process `Puzzles` table.
///
/// Rows missing an ordering column sort after rows that have it, in either
/// direction. Rows without an id never match an id window.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: Vec<RawPuzzleRow>,
}

impl MemorySource {
    pub fn new(rows: Vec<RawPuzzleRow>) -> Self {
        Self { rows }
    }

    /// Load a table from a JSON array of rows
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let rows: Vec<RawPuzzleRow> = serde_json::from_str(&content)?;
        debug!(
            "Loaded {} puzzle rows from {}",
            rows.len(),
            path.as_ref().display()
        );
        Ok(Self::new(rows))
    }

    pub fn rows(&self) -> &[RawPuzzleRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl PuzzleSource for MemorySource {
    fn query(&self, query: &PuzzleQuery) -> Result<Vec<RawPuzzleRow>> {
        let mut matched: Vec<&RawPuzzleRow> = self
            .rows
            .iter()
            .filter(|row| match &query.id_range {
                Some(range) => row.id.is_some_and(|id| range.contains(&id)),
                None => true,
            })
            .filter(|row| query.rating.is_none_or(|rating| row.matches_rating(rating)))
            .collect();

        matched.sort_by(|a, b| {
            query
                .order
                .iter()
                .map(|order| compare_by(a, b, order))
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        });

        Ok(matched.into_iter().take(query.limit).cloned().collect())
    }
}

fn compare_by(a: &RawPuzzleRow, b: &RawPuzzleRow, order: &OrderBy) -> Ordering {
    let ord = match order.column {
        Column::Id => compare_present(a.id, b.id, |x, y| x.cmp(y)),
        Column::Popularity => compare_present(a.popularity, b.popularity, |x, y| x.total_cmp(y)),
    };

    match ord {
        Some(ord) if order.direction == Direction::Descending => ord.reverse(),
        Some(ord) => ord,
        None => nulls_last(a, b, order.column),
    }
}

/// Compare two present values; `None` when either side is missing.
fn compare_present<T>(
    x: Option<T>,
    y: Option<T>,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Option<Ordering> {
    match (x, y) {
        (Some(x), Some(y)) => Some(cmp(&x, &y)),
        _ => None,
    }
}

fn nulls_last(a: &RawPuzzleRow, b: &RawPuzzleRow, column: Column) -> Ordering {
    let present = |row: &RawPuzzleRow| match column {
        Column::Id => row.id.is_some(),
        Column::Popularity => row.popularity.is_some(),
    };
    // `true` sorts after `false`, so compare the "missing" flags.
    (!present(a)).cmp(&!present(b))
}
