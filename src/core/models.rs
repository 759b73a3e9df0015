use std::fmt;

use chrono::{
    Days,
    NaiveDate,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pos {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Expression,
    Pronoun,
    Preposition,
    Number,
}

impl Pos {
    pub const ALL: [Pos; 8] = [
        Pos::Noun,
        Pos::Verb,
        Pos::Adjective,
        Pos::Adverb,
        Pos::Expression,
        Pos::Pronoun,
        Pos::Preposition,
        Pos::Number,
    ];

    pub fn from_code(code: &str) -> Option<Pos> {
        match code {
            "noun" => Some(Pos::Noun),
            "verb" => Some(Pos::Verb),
            "adj" => Some(Pos::Adjective),
            "adv" => Some(Pos::Adverb),
            "expr" => Some(Pos::Expression),
            "pron" => Some(Pos::Pronoun),
            "prep" => Some(Pos::Preposition),
            "num" => Some(Pos::Number),
            _ => None,
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Pos::Noun => "noun",
            Pos::Verb => "verb",
            Pos::Adjective => "adj",
            Pos::Adverb => "adv",
            Pos::Expression => "expr",
            Pos::Pronoun => "pron",
            Pos::Preposition => "prep",
            Pos::Number => "num",
        }
    }

    // Stable position used to break count ties in sorted views.
    pub fn ordinal(&self) -> usize {
        Pos::ALL.iter().position(|p| p == self).unwrap_or(Pos::ALL.len())
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", config::pos_info(*self).label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Everyday,
    Food,
    Media,
    Travel,
    Work,
    People,
    Abstract,
    Loan,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Everyday,
        Category::Food,
        Category::Media,
        Category::Travel,
        Category::Work,
        Category::People,
        Category::Abstract,
        Category::Loan,
    ];

    pub fn from_code(code: &str) -> Option<Category> {
        match code {
            "everyday" => Some(Category::Everyday),
            "food" => Some(Category::Food),
            "media" => Some(Category::Media),
            "travel" => Some(Category::Travel),
            "work" => Some(Category::Work),
            "people" => Some(Category::People),
            "abstract" => Some(Category::Abstract),
            "loan" => Some(Category::Loan),
            _ => None,
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Category::Everyday => "everyday",
            Category::Food => "food",
            Category::Media => "media",
            Category::Travel => "travel",
            Category::Work => "work",
            Category::People => "people",
            Category::Abstract => "abstract",
            Category::Loan => "loan",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", config::category_info(*self).name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Good,
    Again,
}

impl Outcome {
    pub fn from_code(code: &str) -> Option<Outcome> {
        match code {
            "good" => Some(Outcome::Good),
            "again" => Some(Outcome::Again),
            _ => None,
        }
    }
}

/// One flashcard review event. Immutable once loaded; the optional fields
/// stay `None` when the source row carried a blank or unparseable value.
#[derive(Debug, Clone)]
pub struct ReviewRecord {
    pub word: String,
    pub translation: String,
    pub pos: Pos,
    pub category: Category,
    pub day: u32,       // days since the collection epoch
    pub tod_secs: u32,  // seconds since midnight
    pub outcome: Option<Outcome>,
    pub agreed: Option<bool>,
    pub duration_secs: Option<f32>,
}

impl ReviewRecord {
    pub fn date(&self) -> NaiveDate {
        config::collection_epoch() + Days::new(self.day as u64)
    }

    pub fn hour(&self) -> u32 {
        (self.tod_secs / 3600).min(23)
    }
}

/// Per-word rollup over some subset of the records. `first_index` is the
/// position of the word's earliest record in that subset, which is what
/// stacked and grid layouts order by.
#[derive(Debug, Clone)]
pub struct WordAggregate {
    pub word: String,
    pub translation: String,
    pub pos: Pos,
    pub category: Category,
    pub first_day: u32,
    pub first_index: usize,
    pub successes: u32,
    pub failures: u32,
}

impl WordAggregate {
    pub fn reviews(&self) -> u32 {
        self.successes + self.failures
    }

    /// Percentage in [0, 100], or `None` when the word has no graded reviews.
    /// Callers must treat `None` as non-orderable, never as zero.
    pub fn success_rate(&self) -> Option<f32> {
        let total = self.reviews();
        if total == 0 {
            return None;
        }
        Some(100.0 * self.successes as f32 / total as f32)
    }

    pub fn first_date(&self) -> NaiveDate {
        config::collection_epoch() + Days::new(self.first_day as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate(successes: u32, failures: u32) -> WordAggregate {
        WordAggregate {
            word: "probar".to_string(),
            translation: "to try".to_string(),
            pos: Pos::Verb,
            category: Category::Food,
            first_day: 3,
            first_index: 0,
            successes,
            failures,
        }
    }

    #[test]
    fn success_rate_stays_in_percent_range() {
        for (s, f) in [(1, 0), (0, 1), (1, 1), (7, 3), (120, 1)] {
            let rate = aggregate(s, f).success_rate().unwrap();
            assert!((0.0..=100.0).contains(&rate), "rate {} out of range", rate);
            assert!(!rate.is_nan());
        }
    }

    #[test]
    fn success_rate_is_undefined_without_graded_reviews() {
        assert_eq!(aggregate(0, 0).success_rate(), None);
    }

    #[test]
    fn pos_codes_round_trip() {
        for pos in Pos::ALL {
            assert_eq!(Pos::from_code(pos.as_code()), Some(pos));
        }
        assert_eq!(Pos::from_code("interjection"), None);
    }

    #[test]
    fn category_codes_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_code(category.as_code()), Some(category));
        }
        assert_eq!(Category::from_code(""), None);
    }

    #[test]
    fn record_date_offsets_from_epoch() {
        let record = ReviewRecord {
            word: "la casa".to_string(),
            translation: "house".to_string(),
            pos: Pos::Noun,
            category: Category::Everyday,
            day: 7,
            tod_secs: 7 * 3600 + 120,
            outcome: Some(Outcome::Good),
            agreed: Some(true),
            duration_secs: Some(4.5),
        };
        assert_eq!(record.date(), config::collection_epoch() + Days::new(7));
        assert_eq!(record.hour(), 7);
    }
}
