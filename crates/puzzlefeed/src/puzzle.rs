//! Puzzle rows as stored by the backend and as shown to the user.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, IntoStaticStr};

/// Prompt shown when a row carries no text of its own.
pub const DEFAULT_PROMPT: &str = "Can you solve this puzzle?";

/// Side to move, read from the second field of a FEN string.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, IntoStaticStr,
)]
pub enum Side {
    #[default]
    #[strum(serialize = "White to play")]
    White,
    #[strum(serialize = "Black to play")]
    Black,
}

impl Side {
    /// Derive the side to move from a FEN string.
    ///
    /// Only an explicit `b` selects black; missing or malformed fields read as white.
    pub fn from_fen(fen: &str) -> Self {
        match fen.split(' ').nth(1) {
            Some("b") => Side::Black,
            _ => Side::White,
        }
    }

    pub fn label(&self) -> &'static str {
        self.into()
    }
}

/// A row of the `Puzzles` table as returned by the data source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPuzzleRow {
    pub id: Option<i64>,
    pub key: Option<String>,
    pub fen: Option<String>,
    pub popularity: Option<f64>,
    pub lowest_rating: Option<i64>,
    pub highest_rating: Option<i64>,
    pub turn_text: Option<String>,
    /// Older rows carry the turn label under `turn`
    pub turn: Option<String>,
    pub text: Option<String>,
    /// Passed through untouched; rows store moves as strings or arrays
    pub correct_move: Option<Value>,
}

impl RawPuzzleRow {
    /// Whether `rating` falls inside this row's inclusive rating band.
    ///
    /// Rows without both bounds never match.
    pub fn matches_rating(&self, rating: i64) -> bool {
        match (self.lowest_rating, self.highest_rating) {
            (Some(low), Some(high)) => low <= rating && rating <= high,
            _ => false,
        }
    }
}

/// One puzzle, normalized for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleRow {
    pub id: Option<i64>,
    /// Stable identifier; never empty.
    pub key: String,
    pub fen: String,
    pub turn_text: String,
    pub prompt_text: String,
    pub correct_move: Option<Value>,
}

impl From<RawPuzzleRow> for PuzzleRow {
    fn from(raw: RawPuzzleRow) -> Self {
        let fen = raw.fen.unwrap_or_default();

        let key = match (raw.id, non_empty(raw.key)) {
            (Some(id), _) => id.to_string(),
            (None, Some(key)) => key,
            (None, None) => uuid::Uuid::new_v4().to_string(),
        };

        let turn_text = non_empty(raw.turn_text)
            .or_else(|| non_empty(raw.turn))
            .unwrap_or_else(|| Side::from_fen(&fen).label().to_string());
        let prompt_text = non_empty(raw.text).unwrap_or_else(|| DEFAULT_PROMPT.to_string());

        Self {
            id: raw.id,
            key,
            fen,
            turn_text,
            prompt_text,
            correct_move: raw.correct_move,
        }
    }
}

/// Normalize a batch of backend rows.
pub fn map_rows(rows: Vec<RawPuzzleRow>) -> Vec<PuzzleRow> {
    rows.into_iter().map(PuzzleRow::from).collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
