//! Bucketed fetch policy.
//!
//! Puzzles are read in fixed-width id windows ("buckets"). Each category
//! applies its own ordering and filtering inside a window:
//!
//! - **Trending**: popularity descending, then id ascending
//! - **Practice**: rating band filter, id ascending, rows accumulated across
//!   windows until the page is full
//! - **Other**: id ascending
//!
//! When a window comes back empty the policy hops to the next one, at most
//! `max_hops` times, so a request issues at most `max_hops + 1` queries.
//! A window whose query fails is logged and skipped like an empty one. Failures
//! never reach the caller: an unranged query that fails reads as an empty page.

use tracing::{debug, warn};

use crate::category::Category;
use crate::error::Result;
use crate::prefs::PreferenceStore;
use crate::puzzle::{PuzzleRow, RawPuzzleRow, map_rows};
use crate::source::{Column, OrderBy, PuzzleQuery, PuzzleSource};

/// Default width of an id window
pub const DEFAULT_BUCKET_SIZE: i64 = 1000;
/// Upper bound on window advances for a single request
pub const MAX_BUCKET_HOPS: u32 = 20;
/// Rating assumed when the user has none stored
pub const DEFAULT_RATING: i64 = 1500;

/// Configuration for the fetch policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Width of each id window
    pub bucket_size: i64,
    /// Maximum number of hops past the first window. Zero means one query per request.
    pub max_hops: u32,
    /// Rating used by the practice feed when none is stored
    pub default_rating: i64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            bucket_size: DEFAULT_BUCKET_SIZE,
            max_hops: MAX_BUCKET_HOPS,
            default_rating: DEFAULT_RATING,
        }
    }
}

impl FetchConfig {
    /// Create a new configuration builder
    pub fn builder() -> FetchConfigBuilder {
        FetchConfigBuilder::default()
    }
}

/// Builder for FetchConfig
#[derive(Debug, Clone, Default)]
pub struct FetchConfigBuilder {
    bucket_size: Option<i64>,
    max_hops: Option<u32>,
    default_rating: Option<i64>,
}

impl FetchConfigBuilder {
    /// Set the id window width; non-positive values keep the default
    pub fn bucket_size(mut self, size: i64) -> Self {
        self.bucket_size = Some(size).filter(|s| *s > 0);
        self
    }

    pub fn max_hops(mut self, hops: u32) -> Self {
        self.max_hops = Some(hops);
        self
    }

    pub fn default_rating(mut self, rating: i64) -> Self {
        self.default_rating = Some(rating);
        self
    }

    /// Build the configuration
    pub fn build(self) -> FetchConfig {
        let default = FetchConfig::default();
        FetchConfig {
            bucket_size: self.bucket_size.unwrap_or(default.bucket_size),
            max_hops: self.max_hops.unwrap_or(default.max_hops),
            default_rating: self.default_rating.unwrap_or(default.default_rating),
        }
    }
}

/// Produces pages of puzzles from a source, one category at a time.
pub struct FetchPolicy<S, P> {
    source: S,
    prefs: P,
    config: FetchConfig,
}

impl<S: PuzzleSource, P: PreferenceStore> FetchPolicy<S, P> {
    pub fn new(source: S, prefs: P) -> Self {
        Self::with_config(source, prefs, FetchConfig::default())
    }

    pub fn with_config(source: S, prefs: P, config: FetchConfig) -> Self {
        Self {
            source,
            prefs,
            config,
        }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn preferences(&self) -> &P {
        &self.prefs
    }

    /// Fetch up to `limit` puzzles using the configured window width.
    pub fn fetch_page(
        &self,
        category: Category,
        limit: usize,
        start_id: Option<i64>,
    ) -> Vec<PuzzleRow> {
        self.fetch_page_in(category, limit, start_id, self.config.bucket_size)
    }

    /// Fetch up to `limit` puzzles with an explicit window width.
    ///
    /// Without `start_id` the whole table is queried once. A non-positive
    /// `bucket_size` falls back to the configured width.
    pub fn fetch_page_in(
        &self,
        category: Category,
        limit: usize,
        start_id: Option<i64>,
        bucket_size: i64,
    ) -> Vec<PuzzleRow> {
        if limit == 0 {
            return Vec::new();
        }
        let bucket_size = if bucket_size > 0 {
            bucket_size
        } else {
            self.config.bucket_size
        };

        let result = match category {
            Category::Trending => self.first_non_empty_window(
                limit,
                start_id,
                bucket_size,
                &[OrderBy::desc(Column::Popularity), OrderBy::asc(Column::Id)],
            ),
            Category::Practice => self.rating_band_page(limit, start_id, bucket_size),
            Category::Other => self.first_non_empty_window(
                limit,
                start_id,
                bucket_size,
                &[OrderBy::asc(Column::Id)],
            ),
        };

        match result {
            Ok(mut rows) => {
                rows.truncate(limit);
                map_rows(rows)
            }
            Err(e) => {
                warn!("Fetching {} puzzles failed: {}", category, e);
                Vec::new()
            }
        }
    }

    /// Fetch a page, retrying over the whole table when the window yields nothing.
    pub fn fetch_with_fallback(
        &self,
        category: Category,
        limit: usize,
        start_id: Option<i64>,
    ) -> Vec<PuzzleRow> {
        let rows = self.fetch_page(category, limit, start_id);
        if rows.is_empty() && start_id.is_some() {
            debug!(
                "No {} puzzles from id {:?}, retrying without a window",
                category, start_id
            );
            return self.fetch_page(category, limit, None);
        }
        rows
    }

    fn first_non_empty_window(
        &self,
        limit: usize,
        start_id: Option<i64>,
        bucket_size: i64,
        order: &[OrderBy],
    ) -> Result<Vec<RawPuzzleRow>> {
        let base = order
            .iter()
            .fold(PuzzleQuery::new(limit), |q, o| q.order_by(*o));

        let Some(mut start) = start_id else {
            return self.source.query(&base);
        };

        for hop in 0..=self.config.max_hops {
            let rows = self.query_window(&base.clone().id_window(start, bucket_size));
            if !rows.is_empty() {
                debug!(
                    "Found {} rows in window [{}, {}) after {} hops",
                    rows.len(),
                    start,
                    start.saturating_add(bucket_size),
                    hop
                );
                return Ok(rows);
            }
            start = start.saturating_add(bucket_size);
        }

        debug!(
            "No rows within {} hops of id {:?}",
            self.config.max_hops, start_id
        );
        Ok(Vec::new())
    }

    fn rating_band_page(
        &self,
        limit: usize,
        start_id: Option<i64>,
        bucket_size: i64,
    ) -> Result<Vec<RawPuzzleRow>> {
        let rating = self.effective_rating();
        let by_id = OrderBy::asc(Column::Id);

        let Some(mut start) = start_id else {
            let query = PuzzleQuery::new(limit).rating_band(rating).order_by(by_id);
            return self.source.query(&query);
        };

        let mut collected = Vec::with_capacity(limit);
        for _ in 0..=self.config.max_hops {
            if collected.len() >= limit {
                break;
            }
            let query = PuzzleQuery::new(limit - collected.len())
                .id_window(start, bucket_size)
                .rating_band(rating)
                .order_by(by_id);
            collected.extend(self.query_window(&query));
            start = start.saturating_add(bucket_size);
        }

        debug!(
            "Collected {} practice rows for rating {} from id {:?}",
            collected.len(),
            rating,
            start_id
        );
        Ok(collected)
    }

    /// Run one windowed query, reading a failure as an empty window
    fn query_window(&self, query: &PuzzleQuery) -> Vec<RawPuzzleRow> {
        self.source.query(query).unwrap_or_else(|e| {
            warn!("Query for window {:?} failed, skipping: {}", query.id_range, e);
            Vec::new()
        })
    }

    /// Stored rating, or the configured default when none is stored or it can't be read
    fn effective_rating(&self) -> i64 {
        match self.prefs.rating() {
            Ok(Some(rating)) => rating,
            Ok(None) => self.config.default_rating,
            Err(e) => {
                warn!(
                    "Failed to read rating ({}), using {}",
                    e, self.config.default_rating
                );
                self.config.default_rating
            }
        }
    }
}
