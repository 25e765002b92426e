//! Prefs command: view and edit the preferences file.

use anyhow::{Context, Result};
use puzzlefeed::{Category, FilePreferences, PreferenceStore, Preferences};

use crate::cli::PrefsCommand;

pub fn run(store: &FilePreferences, command: &PrefsCommand) -> Result<()> {
    match command {
        PrefsCommand::Show => {
            let prefs = store.load().context("Failed to read preferences")?;
            println!("{}", serde_json::to_string_pretty(&prefs)?);
            eprintln!("({})", store.path().display());
        }
        PrefsCommand::SetRating { rating } => {
            store
                .update(|prefs| prefs.chess_tactics_rating = Some(*rating))
                .context("Failed to save rating")?;
            println!("Rating set to {}", rating);
        }
        PrefsCommand::SetBucket { category, start } => {
            let category = Category::from(*category);
            store
                .set_bucket_start(category, *start)
                .context("Failed to save bucket start")?;
            println!("{} will resume from bucket {}", category, start);
        }
        PrefsCommand::Reset => {
            store
                .save(&Preferences::default())
                .context("Failed to reset preferences")?;
            println!("Preferences cleared");
        }
    }
    Ok(())
}
