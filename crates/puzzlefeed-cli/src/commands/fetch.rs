//! Fetch command: one page through the bucketed fetch policy.

use anyhow::Result;
use puzzlefeed::{Category, FetchPolicy};

use crate::cli::FetchArgs;
use crate::config::Backend;
use crate::render;

pub fn run(backend: &Backend, args: &FetchArgs) -> Result<()> {
    let category = Category::from(args.category);

    let mut config = backend.config.fetch_config();
    if let Some(hops) = args.max_hops {
        config.max_hops = hops;
    }
    if let Some(size) = args.bucket_size.filter(|s| *s > 0) {
        config.bucket_size = size;
    }

    let policy = FetchPolicy::with_config(backend.source.clone(), backend.preferences(), config);

    let rows = if args.fallback {
        policy.fetch_with_fallback(category, args.limit, args.start)
    } else {
        policy.fetch_page(category, args.limit, args.start)
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        eprintln!("No {} puzzles found.", category);
        return Ok(());
    }

    for (index, row) in rows.iter().enumerate() {
        println!("{}", render::summary(index, row));
        println!("       {}", row.fen);
    }
    eprintln!("{} {} puzzles", rows.len(), category);
    Ok(())
}
