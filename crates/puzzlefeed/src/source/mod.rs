//! Puzzle data sources.
//!
//! A source is an opaque queryable `Puzzles` table supporting:
//!
//! - **Id windows**: half-open `[start, start + size)` ranges on `id`
//! - **Rating bands**: rows whose `lowestRating <= rating <= highestRating`
//! - **Ordering**: one or more columns, each ascending or descending
//! - **Limit**: a cap on the number of returned rows
//!
//! [`MemorySource`] evaluates queries in-process. `RestSource` (feature `api`)
//! sends them to a hosted PostgREST endpoint.

mod memory;
#[cfg(feature = "api")]
mod rest;

pub use memory::*;
#[cfg(feature = "api")]
pub use rest::*;

use std::ops::Range;

use strum::{Display, IntoStaticStr};

use crate::error::Result;
use crate::puzzle::RawPuzzleRow;

/// Something that can answer [`PuzzleQuery`]s.
pub trait PuzzleSource: Send + Sync {
    fn query(&self, query: &PuzzleQuery) -> Result<Vec<RawPuzzleRow>>;
}

impl<T: PuzzleSource + ?Sized> PuzzleSource for &T {
    fn query(&self, query: &PuzzleQuery) -> Result<Vec<RawPuzzleRow>> {
        (**self).query(query)
    }
}

impl<T: PuzzleSource + ?Sized> PuzzleSource for std::sync::Arc<T> {
    fn query(&self, query: &PuzzleQuery) -> Result<Vec<RawPuzzleRow>> {
        (**self).query(query)
    }
}

/// Sortable columns of the `Puzzles` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum Column {
    #[strum(serialize = "id")]
    Id,
    #[strum(serialize = "popularity")]
    Popularity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum Direction {
    #[strum(serialize = "asc")]
    Ascending,
    #[strum(serialize = "desc")]
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: Column,
    pub direction: Direction,
}

impl OrderBy {
    pub fn asc(column: Column) -> Self {
        Self {
            column,
            direction: Direction::Ascending,
        }
    }

    pub fn desc(column: Column) -> Self {
        Self {
            column,
            direction: Direction::Descending,
        }
    }
}

/// One query against the `Puzzles` table.
#[derive(Debug, Clone, PartialEq)]
pub struct PuzzleQuery {
    /// Half-open id range; `None` queries the whole table.
    pub id_range: Option<Range<i64>>,
    /// Rating that must fall inside each row's rating band.
    pub rating: Option<i64>,
    pub order: Vec<OrderBy>,
    pub limit: usize,
}

impl PuzzleQuery {
    pub fn new(limit: usize) -> Self {
        Self {
            id_range: None,
            rating: None,
            order: Vec::new(),
            limit,
        }
    }

    /// Restrict to ids in `[start, start + size)`.
    pub fn id_window(mut self, start: i64, size: i64) -> Self {
        self.id_range = Some(start..start.saturating_add(size));
        self
    }

    pub fn rating_band(mut self, rating: i64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order.push(order);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder() {
        let query = PuzzleQuery::new(10)
            .id_window(500, 100)
            .rating_band(1500)
            .order_by(OrderBy::desc(Column::Popularity))
            .order_by(OrderBy::asc(Column::Id));

        assert_eq!(query.id_range, Some(500..600));
        assert_eq!(query.rating, Some(1500));
        assert_eq!(query.order.len(), 2);
        assert_eq!(query.order[0].direction, Direction::Descending);
        assert_eq!(query.limit, 10);
    }

    #[test]
    fn test_id_window_saturates() {
        let query = PuzzleQuery::new(1).id_window(i64::MAX - 1, 100);
        assert_eq!(query.id_range, Some(i64::MAX - 1..i64::MAX));
    }
}
