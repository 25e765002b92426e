//! Puzzle feed categories.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::{Error, Result};

/// A puzzle feed with its own cursor and ordering policy.
///
/// The `Display` form is the storage key used for the persisted cursor.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Category {
    /// Ordered by popularity, then id.
    #[strum(to_string = "TrendingPuzzles", serialize = "trending")]
    Trending,
    /// Filtered to the user's rating band, ordered by id.
    #[strum(to_string = "PracticePuzzles", serialize = "practice")]
    Practice,
    /// Plain id order over the whole table.
    #[strum(to_string = "Puzzles", serialize = "other")]
    Other,
}

impl Category {
    /// Key under which the last bucket start is persisted.
    pub fn storage_key(&self) -> &'static str {
        self.into()
    }

    /// Parse a storage key or short name, ignoring case.
    pub fn parse(value: &str) -> Result<Self> {
        Self::from_str(value.trim()).map_err(|_| Error::UnknownCategory(value.to_string()))
    }

    /// Categories that keep an independent feed state.
    pub fn feeds() -> [Category; 2] {
        [Category::Trending, Category::Practice]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_storage_keys() {
        assert_eq!(Category::Trending.storage_key(), "TrendingPuzzles");
        assert_eq!(Category::Practice.storage_key(), "PracticePuzzles");
        assert_eq!(Category::Other.to_string(), "Puzzles");
    }

    #[test]
    fn test_parse_accepts_keys_and_short_names() {
        assert_eq!(Category::parse("TrendingPuzzles").unwrap(), Category::Trending);
        assert_eq!(Category::parse("practice").unwrap(), Category::Practice);
        assert_eq!(Category::parse(" PRACTICEPUZZLES ").unwrap(), Category::Practice);
        assert_eq!(Category::parse("Other").unwrap(), Category::Other);
        assert!(matches!(
            Category::parse("daily"),
            Err(Error::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_storage_key_round_trips_through_parse() {
        for category in Category::iter() {
            assert_eq!(Category::parse(category.storage_key()).unwrap(), category);
        }
    }
}
