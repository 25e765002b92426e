//! Test doubles shared by the unit tests.

use std::sync::Mutex;

use crate::category::Category;
use crate::error::{Error, Result};
use crate::prefs::PreferenceStore;
use crate::puzzle::RawPuzzleRow;
use crate::source::{PuzzleQuery, PuzzleSource};

pub const WHITE_FEN: &str = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";
pub const BLACK_FEN: &str = "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2";

/// A puzzle row with the given id, popularity and rating band
pub fn puzzle(id: i64, popularity: f64, low: i64, high: i64) -> RawPuzzleRow {
    RawPuzzleRow {
        id: Some(id),
        fen: Some(if id % 2 == 0 { WHITE_FEN } else { BLACK_FEN }.to_string()),
        popularity: Some(popularity),
        lowest_rating: Some(low),
        highest_rating: Some(high),
        ..Default::default()
    }
}

/// Rows `ids` open to every rating, popularity equal to the id
pub fn open_puzzles(ids: impl IntoIterator<Item = i64>) -> Vec<RawPuzzleRow> {
    ids.into_iter()
        .map(|id| puzzle(id, id as f64, 0, 4000))
        .collect()
}

/// Wraps a source and records every query it answers
pub struct RecordingSource<S> {
    inner: S,
    queries: Mutex<Vec<PuzzleQuery>>,
}

impl<S: PuzzleSource> RecordingSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<PuzzleQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn clear(&self) {
        self.queries.lock().unwrap().clear();
    }
}

impl<S: PuzzleSource> PuzzleSource for RecordingSource<S> {
    fn query(&self, query: &PuzzleQuery) -> Result<Vec<RawPuzzleRow>> {
        self.queries.lock().unwrap().push(query.clone());
        self.inner.query(query)
    }
}

/// Source whose every query fails
pub struct FailingSource;

impl PuzzleSource for FailingSource {
    fn query(&self, _query: &PuzzleQuery) -> Result<Vec<RawPuzzleRow>> {
        Err(Error::QueryFailed("connection reset".to_string()))
    }
}

/// Wraps a source and fails the query for the window starting at `start`
pub struct FailingWindow<S> {
    inner: S,
    start: i64,
}

impl<S: PuzzleSource> FailingWindow<S> {
    pub fn new(inner: S, start: i64) -> Self {
        Self { inner, start }
    }
}

impl<S: PuzzleSource> PuzzleSource for FailingWindow<S> {
    fn query(&self, query: &PuzzleQuery) -> Result<Vec<RawPuzzleRow>> {
        match &query.id_range {
            Some(range) if range.start == self.start => {
                Err(Error::QueryFailed(format!("timeout at id {}", self.start)))
            }
            _ => self.inner.query(query),
        }
    }
}

/// Source that ignores the requested limit
pub struct UnboundedSource(pub Vec<RawPuzzleRow>);

impl PuzzleSource for UnboundedSource {
    fn query(&self, _query: &PuzzleQuery) -> Result<Vec<RawPuzzleRow>> {
        Ok(self.0.clone())
    }
}

/// Store whose reads return `stored` and whose writes always fail
pub struct ReadOnlyPreferences {
    pub stored: Option<i64>,
}

impl PreferenceStore for ReadOnlyPreferences {
    fn bucket_start(&self, _category: Category) -> Result<Option<i64>> {
        Ok(self.stored)
    }

    fn set_bucket_start(&self, _category: Category, _start: i64) -> Result<()> {
        Err(Error::Preferences("read-only".to_string()))
    }

    fn rating(&self) -> Result<Option<i64>> {
        Err(Error::Preferences("read-only".to_string()))
    }
}
