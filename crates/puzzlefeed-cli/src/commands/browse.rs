//! Browse command: walk a feed through the prefetch/advance state machine.

use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use owo_colors::OwoColorize;
use puzzlefeed::{
    Category, Color, ColorScheme, FetchPolicy, MountSignal, PreferenceStore, PuzzleFeed,
    PuzzleSource, Theme, Transition,
};
use tracing::info;

use crate::cli::BrowseArgs;
use crate::config::Backend;
use crate::render;

/// What happened during a walk
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BrowseSummary {
    pub viewed: usize,
    pub prefetches: usize,
    pub advances: usize,
    pub final_bucket: Option<i64>,
}

pub fn run(backend: &Backend, args: &BrowseArgs) -> Result<()> {
    let category = Category::from(args.category);
    if category == Category::Other {
        bail!("browse supports the trending and practice feeds only");
    }
    let theme = theme_from_args(args)?;

    let signal = MountSignal::new();
    let handler_signal = signal.clone();
    ctrlc::set_handler(move || handler_signal.unmount())
        .context("Failed to set Ctrl-C handler")?;

    let policy = FetchPolicy::with_config(
        backend.source.clone(),
        backend.preferences(),
        backend.config.fetch_config(),
    );
    let mut feed = PuzzleFeed::with_config(policy, backend.config.feed_config());

    if !feed.load(&signal) {
        info!("Interrupted during initial load");
        return Ok(());
    }

    let colors = theme.colors();
    let header = format!(
        " {} from bucket {} ",
        category,
        feed.state(category)
            .and_then(|s| s.bucket_start())
            .unwrap_or_default()
    );
    println!(
        "{}",
        header
            .truecolor(colors.text.r, colors.text.g, colors.text.b)
            .on_truecolor(colors.background.r, colors.background.g, colors.background.b)
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = walk(
        &mut feed,
        category,
        args.steps,
        Duration::from_millis(args.delay_ms),
        &signal,
        args.board.then_some(&theme),
        &mut out,
    )?;
    signal.unmount();

    eprintln!(
        "Viewed {} puzzles ({} prefetches, {} advances), next session starts at bucket {}",
        summary.viewed,
        summary.prefetches,
        summary.advances,
        summary.final_bucket.unwrap_or_default()
    );
    Ok(())
}

fn theme_from_args(args: &BrowseArgs) -> Result<Theme> {
    let mut theme = Theme::classic();
    if args.dark {
        theme = theme.with_scheme(ColorScheme::Dark);
    }
    if let (Some(primary), Some(secondary)) = (&args.primary, &args.secondary) {
        theme = theme.with_accent(None, Color::parse(primary)?, Color::parse(secondary)?);
    }
    Ok(theme)
}

/// View `steps` puzzles in order, feeding each position to the state machine.
///
/// When the feed advances, the first page is evicted, so the position moves
/// back by one page to keep pointing at the same puzzle.
pub fn walk<S: PuzzleSource, P: PreferenceStore>(
    feed: &mut PuzzleFeed<S, P>,
    category: Category,
    steps: usize,
    delay: Duration,
    signal: &MountSignal,
    theme: Option<&Theme>,
    out: &mut dyn Write,
) -> Result<BrowseSummary> {
    let page_size = feed.config().page_size;
    let board_colors = theme.map(Theme::board_colors);
    let mut summary = BrowseSummary::default();
    let mut position = 0usize;

    for _ in 0..steps {
        let Some(puzzle) = feed.puzzle_at(category, position) else {
            writeln!(out, "End of feed")?;
            break;
        };

        writeln!(out, "{}", render::summary(summary.viewed, puzzle))?;
        if let Some(lines) = board_colors
            .as_ref()
            .and_then(|colors| render::board_lines(&puzzle.fen, colors))
        {
            for line in lines {
                writeln!(out, "    {}", line)?;
            }
        }
        summary.viewed += 1;

        match feed.on_index_change(category, position) {
            Transition::Prefetched { appended } => {
                summary.prefetches += 1;
                writeln!(out, "      prefetched {} puzzles", appended)?;
            }
            Transition::Advanced { bucket_start } => {
                summary.advances += 1;
                position -= page_size;
                writeln!(out, "      advanced to bucket {}", bucket_start)?;
            }
            Transition::Idle => {}
        }
        position += 1;

        if !pause(delay, signal) {
            break;
        }
    }

    summary.final_bucket = feed.state(category).and_then(|s| s.bucket_start());
    Ok(summary)
}

/// Sleep for `delay` in short slices. Returns whether the feed is still mounted.
fn pause(delay: Duration, signal: &MountSignal) -> bool {
    const SLICE: Duration = Duration::from_millis(50);

    let deadline = Instant::now() + delay;
    while signal.is_mounted() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        thread::sleep(remaining.min(SLICE));
    }
    signal.is_mounted()
}
