//! Per-category prefetch/advance state machine.
//!
//! Each feed keeps a bucket cursor, the rows currently loaded and whether the
//! next bucket has already been appended. As the viewed index moves:
//!
//! 1. On the prefetch slot of a batch (index 7 of 10 by default), with no
//!    prefetch pending and at most one page loaded, the next bucket is fetched
//!    and appended.
//! 2. Once a prefetch has landed and the user has moved past the first page,
//!    that page is evicted and the cursor advances by one stride. The new
//!    cursor is persisted so the next session resumes from it.
//! 3. Anything else leaves the state untouched.

use std::thread;

use tracing::{debug, info, warn};

use crate::category::Category;
use crate::fetch::FetchPolicy;
use crate::lifecycle::MountSignal;
use crate::prefs::PreferenceStore;
use crate::puzzle::PuzzleRow;
use crate::source::PuzzleSource;

/// Cursor used when nothing has been persisted yet
pub const DEFAULT_BUCKET_START: i64 = 500;
/// Distance the cursor advances per consumed page
pub const BUCKET_STRIDE: i64 = 100;
pub const PAGE_SIZE: usize = 10;
/// 0-based position in a batch that triggers the prefetch (the 8th puzzle)
pub const PREFETCH_INDEX_IN_BATCH: usize = 7;

/// Configuration for the feed state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedConfig {
    pub default_bucket_start: i64,
    pub bucket_stride: i64,
    pub page_size: usize,
    /// Fixed offset within a batch, independent of `page_size`
    pub prefetch_index: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_bucket_start: DEFAULT_BUCKET_START,
            bucket_stride: BUCKET_STRIDE,
            page_size: PAGE_SIZE,
            prefetch_index: PREFETCH_INDEX_IN_BATCH,
        }
    }
}

impl FeedConfig {
    /// Create a new configuration builder
    pub fn builder() -> FeedConfigBuilder {
        FeedConfigBuilder::default()
    }
}

/// Builder for FeedConfig
#[derive(Debug, Clone, Default)]
pub struct FeedConfigBuilder {
    default_bucket_start: Option<i64>,
    bucket_stride: Option<i64>,
    page_size: Option<usize>,
    prefetch_index: Option<usize>,
}

impl FeedConfigBuilder {
    pub fn default_bucket_start(mut self, start: i64) -> Self {
        self.default_bucket_start = Some(start);
        self
    }

    pub fn bucket_stride(mut self, stride: i64) -> Self {
        self.bucket_stride = Some(stride);
        self
    }

    /// Set the page size; zero keeps the default
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size).filter(|s| *s > 0);
        self
    }

    pub fn prefetch_index(mut self, index: usize) -> Self {
        self.prefetch_index = Some(index);
        self
    }

    /// Build the configuration
    pub fn build(self) -> FeedConfig {
        let default = FeedConfig::default();
        FeedConfig {
            default_bucket_start: self
                .default_bucket_start
                .unwrap_or(default.default_bucket_start),
            bucket_stride: self.bucket_stride.unwrap_or(default.bucket_stride),
            page_size: self.page_size.unwrap_or(default.page_size),
            prefetch_index: self.prefetch_index.unwrap_or(default.prefetch_index),
        }
    }
}

/// In-memory state of one category feed
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryFeed {
    category: Category,
    bucket_start: Option<i64>,
    rows: Vec<PuzzleRow>,
    prefetched_next: bool,
}

impl CategoryFeed {
    fn new(category: Category) -> Self {
        Self {
            category,
            bucket_start: None,
            rows: Vec::new(),
            prefetched_next: false,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// `None` until the feed has been loaded
    pub fn bucket_start(&self) -> Option<i64> {
        self.bucket_start
    }

    pub fn rows(&self) -> &[PuzzleRow] {
        &self.rows
    }

    pub fn prefetched_next(&self) -> bool {
        self.prefetched_next
    }
}

/// Outcome of [`PuzzleFeed::on_index_change`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The next bucket was fetched and `appended` rows were added
    Prefetched { appended: usize },
    /// The first page was evicted and the cursor moved to `bucket_start`
    Advanced { bucket_start: i64 },
    Idle,
}

/// Trending and practice feeds over one fetch policy.
pub struct PuzzleFeed<S, P> {
    policy: FetchPolicy<S, P>,
    config: FeedConfig,
    trending: CategoryFeed,
    practice: CategoryFeed,
}

impl<S: PuzzleSource, P: PreferenceStore> PuzzleFeed<S, P> {
    pub fn new(policy: FetchPolicy<S, P>) -> Self {
        Self::with_config(policy, FeedConfig::default())
    }

    pub fn with_config(policy: FetchPolicy<S, P>, config: FeedConfig) -> Self {
        Self {
            policy,
            config,
            trending: CategoryFeed::new(Category::Trending),
            practice: CategoryFeed::new(Category::Practice),
        }
    }

    pub fn policy(&self) -> &FetchPolicy<S, P> {
        &self.policy
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// State of a feed; `None` for categories without one
    pub fn state(&self, category: Category) -> Option<&CategoryFeed> {
        match category {
            Category::Trending => Some(&self.trending),
            Category::Practice => Some(&self.practice),
            Category::Other => None,
        }
    }

    pub fn rows(&self, category: Category) -> &[PuzzleRow] {
        self.state(category).map(CategoryFeed::rows).unwrap_or(&[])
    }

    /// Puzzle at `index` of the loaded rows
    pub fn puzzle_at(&self, category: Category, index: usize) -> Option<&PuzzleRow> {
        self.rows(category).get(index)
    }

    fn state_mut(&mut self, category: Category) -> Option<&mut CategoryFeed> {
        match category {
            Category::Trending => Some(&mut self.trending),
            Category::Practice => Some(&mut self.practice),
            Category::Other => None,
        }
    }

    /// Load the first page of both feeds.
    ///
    /// Cursors come from the preference store, falling back to the default
    /// start (which is then persisted). Both feeds are fetched concurrently;
    /// an empty window is retried over the whole table. Nothing is applied if
    /// `signal` was unmounted meanwhile. Returns whether state was applied.
    pub fn load(&mut self, signal: &MountSignal) -> bool {
        let starts = Category::feeds().map(|category| (category, self.stored_bucket_start(category)));
        let page_size = self.config.page_size;
        let policy = &self.policy;

        let pages = thread::scope(|scope| {
            let handles = starts.map(|(category, start)| {
                scope.spawn(move || policy.fetch_with_fallback(category, page_size, Some(start)))
            });
            handles.map(|handle| handle.join().unwrap_or_default())
        });

        if !signal.is_mounted() {
            debug!("Feed unmounted during initial load, discarding results");
            return false;
        }

        for ((category, start), rows) in starts.into_iter().zip(pages) {
            info!(
                "Loaded {} {} puzzles from bucket {}",
                rows.len(),
                category,
                start
            );
            if let Some(state) = self.state_mut(category) {
                state.bucket_start = Some(start);
                state.rows = rows;
                state.prefetched_next = false;
            }
        }
        true
    }

    fn stored_bucket_start(&self, category: Category) -> i64 {
        let default = self.config.default_bucket_start;
        match self.policy.preferences().bucket_start(category) {
            Ok(Some(start)) => start,
            Ok(None) => {
                self.persist(category, default);
                default
            }
            Err(e) => {
                warn!("Failed to read {} cursor: {}, using {}", category, e, default);
                default
            }
        }
    }

    fn persist(&self, category: Category, start: i64) {
        if let Err(e) = self.policy.preferences().set_bucket_start(category, start) {
            warn!("Failed to persist {} cursor {}: {}", category, start, e);
        }
    }

    /// React to the user viewing `viewed_index` of a feed's loaded rows.
    pub fn on_index_change(&mut self, category: Category, viewed_index: usize) -> Transition {
        let FeedConfig {
            bucket_stride,
            page_size,
            prefetch_index,
            ..
        } = self.config;
        if page_size == 0 {
            return Transition::Idle;
        }

        let Some(state) = self.state(category) else {
            return Transition::Idle;
        };
        let Some(bucket_start) = state.bucket_start else {
            return Transition::Idle;
        };
        let loaded = state.rows.len();
        let prefetched = state.prefetched_next;
        if loaded == 0 {
            return Transition::Idle;
        }

        let batch_index = viewed_index % page_size;

        if !prefetched && loaded <= page_size && batch_index == prefetch_index {
            let next_start = bucket_start.saturating_add(bucket_stride);
            let batch = self
                .policy
                .fetch_page(category, page_size, Some(next_start));
            if batch.is_empty() {
                debug!("No {} puzzles to prefetch from {}", category, next_start);
                return Transition::Idle;
            }

            let appended = batch.len();
            if let Some(state) = self.state_mut(category) {
                state.rows.extend(batch);
                state.prefetched_next = true;
            }
            debug!(
                "Prefetched {} {} puzzles from {}",
                appended, category, next_start
            );
            return Transition::Prefetched { appended };
        }

        if prefetched && loaded > page_size && viewed_index >= page_size {
            let new_start = bucket_start.saturating_add(bucket_stride);
            if let Some(state) = self.state_mut(category) {
                state.rows.drain(..page_size);
                state.bucket_start = Some(new_start);
                state.prefetched_next = false;
            }
            self.persist(category, new_start);
            info!("Advanced {} to bucket {}", category, new_start);
            return Transition::Advanced {
                bucket_start: new_start,
            };
        }

        Transition::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchConfig;
    use crate::prefs::{MemoryPreferences, Preferences};
    use crate::puzzle::RawPuzzleRow;
    use crate::source::MemorySource;
    use crate::testing::*;

    type TestFeed = PuzzleFeed<RecordingSource<MemorySource>, MemoryPreferences>;

    fn feed_with(rows: Vec<RawPuzzleRow>, prefs: MemoryPreferences) -> TestFeed {
        let config = FetchConfig::builder().bucket_size(100).build();
        let policy =
            FetchPolicy::with_config(RecordingSource::new(MemorySource::new(rows)), prefs, config);
        PuzzleFeed::new(policy)
    }

    fn loaded_feed(rows: Vec<RawPuzzleRow>) -> TestFeed {
        let mut feed = feed_with(rows, MemoryPreferences::default());
        assert!(feed.load(&MountSignal::new()));
        feed.policy().source().clear();
        feed
    }

    fn ids(rows: &[PuzzleRow]) -> Vec<i64> {
        rows.iter().filter_map(|r| r.id).collect()
    }

    fn stored(feed: &TestFeed, category: Category) -> Option<i64> {
        feed.policy()
            .preferences()
            .bucket_start(category)
            .unwrap()
    }

    #[test]
    fn test_config_builder() {
        let config = FeedConfig::builder().page_size(0).bucket_stride(50).build();
        assert_eq!(config.page_size, PAGE_SIZE);
        assert_eq!(config.bucket_stride, 50);
        assert_eq!(config.prefetch_index, PREFETCH_INDEX_IN_BATCH);
        assert_eq!(config.default_bucket_start, DEFAULT_BUCKET_START);
    }

    #[test]
    fn test_load_uses_default_start_and_persists_it() {
        let feed = loaded_feed(open_puzzles(0..2000));

        for category in Category::feeds() {
            let state = feed.state(category).unwrap();
            assert_eq!(state.bucket_start(), Some(DEFAULT_BUCKET_START));
            assert_eq!(state.rows().len(), PAGE_SIZE);
            assert!(!state.prefetched_next());
            assert_eq!(stored(&feed, category), Some(DEFAULT_BUCKET_START));
        }
        assert_eq!(
            ids(feed.rows(Category::Trending)),
            (590..600).rev().collect::<Vec<_>>()
        );
        assert_eq!(
            ids(feed.rows(Category::Practice)),
            (500..510).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_load_resumes_stored_cursor() {
        let mut prefs = Preferences::default();
        prefs.set_bucket_start(Category::Trending, 800);
        let mut feed = feed_with(open_puzzles(0..2000), MemoryPreferences::new(prefs));

        assert!(feed.load(&MountSignal::new()));
        let trending = feed.state(Category::Trending).unwrap();
        assert_eq!(trending.bucket_start(), Some(800));
        assert_eq!(ids(trending.rows())[0], 899);
        assert_eq!(stored(&feed, Category::Trending), Some(800));
    }

    #[test]
    fn test_load_falls_back_to_whole_table() {
        let mut feed = feed_with(open_puzzles(1..=12), MemoryPreferences::default());
        assert!(feed.load(&MountSignal::new()));

        let trending = feed.state(Category::Trending).unwrap();
        assert_eq!(trending.bucket_start(), Some(DEFAULT_BUCKET_START));
        assert_eq!(ids(trending.rows()), (3..=12).rev().collect::<Vec<_>>());
        assert_eq!(
            ids(feed.rows(Category::Practice)),
            (1..=10).collect::<Vec<_>>()
        );
    }

    /// Source that unmounts the feed while answering its first query
    struct UnmountingSource {
        inner: MemorySource,
        signal: MountSignal,
    }

    impl crate::source::PuzzleSource for UnmountingSource {
        fn query(
            &self,
            query: &crate::source::PuzzleQuery,
        ) -> crate::error::Result<Vec<RawPuzzleRow>> {
            self.signal.unmount();
            self.inner.query(query)
        }
    }

    #[test]
    fn test_load_discards_pages_resolved_after_unmount() {
        let signal = MountSignal::new();
        let source = UnmountingSource {
            inner: MemorySource::new(open_puzzles(0..2000)),
            signal: signal.clone(),
        };
        let mut feed = PuzzleFeed::new(FetchPolicy::new(source, MemoryPreferences::default()));

        assert!(!feed.load(&signal));
        for category in Category::feeds() {
            let state = feed.state(category).unwrap();
            assert_eq!(state.bucket_start(), None);
            assert!(state.rows().is_empty());
            assert_eq!(
                feed.on_index_change(category, PREFETCH_INDEX_IN_BATCH),
                Transition::Idle
            );
        }
    }

    #[test]
    fn test_load_discarded_after_unmount() {
        let mut feed = feed_with(open_puzzles(0..2000), MemoryPreferences::default());
        let signal = MountSignal::new();
        signal.unmount();

        assert!(!feed.load(&signal));
        let trending = feed.state(Category::Trending).unwrap();
        assert_eq!(trending.bucket_start(), None);
        assert!(trending.rows().is_empty());
    }

    #[test]
    fn test_idle_before_load() {
        let mut feed = feed_with(open_puzzles(0..2000), MemoryPreferences::default());

        assert_eq!(feed.on_index_change(Category::Trending, 7), Transition::Idle);
        assert_eq!(feed.policy().source().count(), 0);
    }

    #[test]
    fn test_prefetch_then_advance_scenario() {
        let mut feed = loaded_feed(open_puzzles(0..2000));
        let first_page = feed.rows(Category::Trending).to_vec();

        let transition = feed.on_index_change(Category::Trending, 7);
        assert_eq!(transition, Transition::Prefetched { appended: 10 });

        let state = feed.state(Category::Trending).unwrap();
        assert_eq!(state.rows().len(), 20);
        assert!(state.prefetched_next());
        assert_eq!(state.bucket_start(), Some(500));
        assert_eq!(&state.rows()[..10], first_page.as_slice());

        let queries = feed.policy().source().queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].id_range, Some(600..700));
        let prefetched = state.rows()[10..].to_vec();

        let transition = feed.on_index_change(Category::Trending, 10);
        assert_eq!(transition, Transition::Advanced { bucket_start: 600 });

        let state = feed.state(Category::Trending).unwrap();
        assert_eq!(state.rows(), prefetched.as_slice());
        assert_eq!(state.bucket_start(), Some(600));
        assert!(!state.prefetched_next());
        assert_eq!(stored(&feed, Category::Trending), Some(600));
        assert_eq!(feed.policy().source().count(), 1);
    }

    #[test]
    fn test_prefetch_only_on_trigger_slot() {
        let mut feed = loaded_feed(open_puzzles(0..2000));

        for index in [0, 1, 6, 8, 9] {
            assert_eq!(feed.on_index_change(Category::Trending, index), Transition::Idle);
        }
        assert_eq!(feed.policy().source().count(), 0);

        assert_eq!(
            feed.on_index_change(Category::Trending, 17),
            Transition::Prefetched { appended: 10 }
        );
        // A second visit to the slot does not fetch again.
        assert_eq!(feed.on_index_change(Category::Trending, 7), Transition::Idle);
        assert_eq!(feed.policy().source().count(), 1);
    }

    #[test]
    fn test_no_advance_before_first_page_is_done() {
        let mut feed = loaded_feed(open_puzzles(0..2000));
        feed.on_index_change(Category::Practice, 7);

        for index in [7, 8, 9] {
            assert_eq!(feed.on_index_change(Category::Practice, index), Transition::Idle);
        }
        assert_eq!(feed.rows(Category::Practice).len(), 20);
        assert_eq!(
            feed.on_index_change(Category::Practice, 12),
            Transition::Advanced { bucket_start: 600 }
        );
        assert_eq!(feed.rows(Category::Practice).len(), 10);
    }

    #[test]
    fn test_empty_prefetch_leaves_state() {
        let mut feed = loaded_feed(open_puzzles(500..510));
        let before = feed.state(Category::Trending).unwrap().clone();

        assert_eq!(feed.on_index_change(Category::Trending, 7), Transition::Idle);
        assert_eq!(feed.state(Category::Trending).unwrap(), &before);
        assert_eq!(
            feed.policy().source().count(),
            FetchConfig::default().max_hops as usize + 1
        );
    }

    #[test]
    fn test_partial_prefetch_then_advance() {
        let mut rows = open_puzzles(500..510);
        rows.extend(open_puzzles(600..603));
        let mut feed = loaded_feed(rows);

        assert_eq!(
            feed.on_index_change(Category::Trending, 7),
            Transition::Prefetched { appended: 3 }
        );
        assert_eq!(feed.rows(Category::Trending).len(), 13);
        assert_eq!(feed.on_index_change(Category::Trending, 9), Transition::Idle);

        assert_eq!(
            feed.on_index_change(Category::Trending, 10),
            Transition::Advanced { bucket_start: 600 }
        );
        assert_eq!(ids(feed.rows(Category::Trending)), vec![602, 601, 600]);
    }

    #[test]
    fn test_categories_are_independent() {
        let mut feed = loaded_feed(open_puzzles(0..2000));
        feed.on_index_change(Category::Trending, 7);
        feed.on_index_change(Category::Trending, 10);

        let practice = feed.state(Category::Practice).unwrap();
        assert_eq!(practice.bucket_start(), Some(500));
        assert_eq!(practice.rows().len(), 10);
        assert_eq!(stored(&feed, Category::Practice), Some(500));
        assert_eq!(feed.on_index_change(Category::Other, 7), Transition::Idle);
        assert!(feed.rows(Category::Other).is_empty());
    }

    #[test]
    fn test_persistence_failure_is_swallowed() {
        let policy = FetchPolicy::with_config(
            MemorySource::new(open_puzzles(0..2000)),
            ReadOnlyPreferences { stored: None },
            FetchConfig::builder().bucket_size(100).build(),
        );
        let mut feed = PuzzleFeed::new(policy);

        assert!(feed.load(&MountSignal::new()));
        feed.on_index_change(Category::Trending, 7);
        assert_eq!(
            feed.on_index_change(Category::Trending, 10),
            Transition::Advanced { bucket_start: 600 }
        );
        assert_eq!(
            feed.state(Category::Trending).unwrap().bucket_start(),
            Some(600)
        );
    }

    #[test]
    fn test_puzzle_at() {
        let feed = loaded_feed(open_puzzles(0..2000));
        assert_eq!(
            feed.puzzle_at(Category::Practice, 0).and_then(|p| p.id),
            Some(500)
        );
        assert!(feed.puzzle_at(Category::Practice, 10).is_none());
    }
}
