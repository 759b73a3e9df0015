//! Static lookup tables: display names, palette entries, milestone captions.
//! Pure data, swappable without touching chart logic.

use chrono::NaiveDate;
use eframe::egui::Color32;

use crate::core::models::{
    Category,
    Pos,
};

/// Day 0 of the `day` offsets in the review log.
pub fn collection_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, 3).expect("valid epoch date")
}

pub struct PosInfo {
    pub label: &'static str,
    pub plural: &'static str,
    pub abbrev: &'static str,
    pub color: Color32,
}

pub fn pos_info(pos: Pos) -> &'static PosInfo {
    match pos {
        Pos::Noun => {
            static INFO: PosInfo = PosInfo {
                label: "Noun",
                plural: "Nouns",
                abbrev: "n.",
                color: Color32::from_rgb(97, 175, 239),
            };
            &INFO
        },
        Pos::Verb => {
            static INFO: PosInfo = PosInfo {
                label: "Verb",
                plural: "Verbs",
                abbrev: "v.",
                color: Color32::from_rgb(86, 209, 123),
            };
            &INFO
        },
        Pos::Adjective => {
            static INFO: PosInfo = PosInfo {
                label: "Adjective",
                plural: "Adjectives",
                abbrev: "adj.",
                color: Color32::from_rgb(255, 161, 90),
            };
            &INFO
        },
        Pos::Adverb => {
            static INFO: PosInfo = PosInfo {
                label: "Adverb",
                plural: "Adverbs",
                abbrev: "adv.",
                color: Color32::from_rgb(241, 250, 140),
            };
            &INFO
        },
        Pos::Expression => {
            static INFO: PosInfo = PosInfo {
                label: "Expression",
                plural: "Expressions",
                abbrev: "expr.",
                color: Color32::from_rgb(255, 121, 198),
            };
            &INFO
        },
        Pos::Pronoun => {
            static INFO: PosInfo = PosInfo {
                label: "Pronoun",
                plural: "Pronouns",
                abbrev: "pron.",
                color: Color32::from_rgb(189, 147, 249),
            };
            &INFO
        },
        Pos::Preposition => {
            static INFO: PosInfo = PosInfo {
                label: "Preposition",
                plural: "Prepositions",
                abbrev: "prep.",
                color: Color32::from_rgb(78, 201, 176),
            };
            &INFO
        },
        Pos::Number => {
            static INFO: PosInfo = PosInfo {
                label: "Numeral",
                plural: "Numerals",
                abbrev: "num.",
                color: Color32::from_rgb(255, 121, 121),
            };
            &INFO
        },
    }
}

pub struct CategoryInfo {
    pub name: &'static str,
    pub blurb: &'static str,
    pub color: Color32,
    pub tooltip_width: f32,
}

pub fn category_info(category: Category) -> &'static CategoryInfo {
    match category {
        Category::Everyday => {
            static INFO: CategoryInfo = CategoryInfo {
                name: "Everyday",
                blurb: "Household objects and daily routines: keys, showers, taking out the trash.",
                color: Color32::from_rgb(139, 233, 253),
                tooltip_width: 260.0,
            };
            &INFO
        },
        Category::Food => {
            static INFO: CategoryInfo = CategoryInfo {
                name: "Food",
                blurb: "Cooking, flavors, and anything that ends up on a plate.",
                color: Color32::from_rgb(255, 184, 108),
                tooltip_width: 240.0,
            };
            &INFO
        },
        Category::Media => {
            static INFO: CategoryInfo = CategoryInfo {
                name: "Media",
                blurb: "Series, headlines, and streaming vocabulary picked up from watching Spanish TV.",
                color: Color32::from_rgb(189, 147, 249),
                tooltip_width: 280.0,
            };
            &INFO
        },
        Category::Travel => {
            static INFO: CategoryInfo = CategoryInfo {
                name: "Travel",
                blurb: "Airports, platforms, and getting lost on purpose.",
                color: Color32::from_rgb(80, 250, 123),
                tooltip_width: 240.0,
            };
            &INFO
        },
        Category::Work => {
            static INFO: CategoryInfo = CategoryInfo {
                name: "Work",
                blurb: "Meetings, reports, and deadline words from the office.",
                color: Color32::from_rgb(241, 250, 140),
                tooltip_width: 240.0,
            };
            &INFO
        },
        Category::People => {
            static INFO: CategoryInfo = CategoryInfo {
                name: "People",
                blurb: "Family, friendship, and the neighbors.",
                color: Color32::from_rgb(255, 121, 198),
                tooltip_width: 220.0,
            };
            &INFO
        },
        Category::Abstract => {
            static INFO: CategoryInfo = CategoryInfo {
                name: "Abstract",
                blurb: "Hope, doubt, effort: the words that carry a conversation past small talk.",
                color: Color32::from_rgb(98, 114, 164),
                tooltip_width: 270.0,
            };
            &INFO
        },
        Category::Loan => {
            static INFO: CategoryInfo = CategoryInfo {
                name: "Loanwords",
                blurb: "Anglicisms that Spanish absorbed whole, pronunciation and all.",
                color: Color32::from_rgb(255, 85, 85),
                tooltip_width: 260.0,
            };
            &INFO
        },
    }
}

/// One caption per reveal milestone; the milestone count is this table's length.
pub const MILESTONE_CAPTIONS: [&str; 5] = [
    "February: a burst of everyday basics to get started.",
    "March: food and media words pile up with the first series binge.",
    "April: travel vocabulary, front-loaded before the Valencia trip.",
    "May and June: a vacation pause, then a steadier working rhythm.",
    "Six months in: ninety-six words across eight themes.",
];

/// The tag singled out in the breakdown's final comparison view.
pub const HIGHLIGHT_POS: Pos = Pos::Noun;

/// De-emphasis fill for bars outside the highlighted tag.
pub const MUTED_FILL: Color32 = Color32::from_rgb(90, 96, 118);

/// Neutral color for in-chart annotation text.
pub const LABEL_TEXT: Color32 = Color32::from_rgb(188, 192, 210);

/// Calendar heat endpoints: no reviews and the busiest day.
pub const HEAT_ZERO: Color32 = Color32::from_rgb(45, 48, 66);
pub const HEAT_FULL: Color32 = Color32::from_rgb(255, 161, 90);

/// Detail-view series colors.
pub const GOOD_FILL: Color32 = Color32::from_rgb(86, 209, 123);
pub const AGAIN_FILL: Color32 = Color32::from_rgb(255, 121, 121);
pub const AGREE_FILL: Color32 = Color32::from_rgb(97, 175, 239);
pub const DISAGREE_FILL: Color32 = Color32::from_rgb(255, 184, 108);
pub const DURATION_FILL: Color32 = Color32::from_rgb(189, 147, 249);
