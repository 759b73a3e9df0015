use std::sync::Arc;

use eframe::egui::Align2;

use super::TooltipContent;
use crate::{
    config,
    core::{
        aggregate_words,
        Category,
        Dataset,
        WordAggregate,
    },
    scene::{
        Ease,
        ElementShape,
        PropPatch,
        Scene,
        SceneEvent,
        TransitionSpec,
        VisualProps,
    },
};

pub const MILESTONES: usize = 5;

const BLOCK_COLS: usize = 4;
const BLOCK_W: f32 = 185.0;
const BLOCK_H: f32 = 225.0;
const GRID_LEFT: f32 = 12.0;
const GRID_TOP: f32 = 26.0;
const TILE_COLS: usize = 5;
const TILE: f32 = 22.0;
const TILE_PITCH: f32 = 26.0;

const STAGGER: f32 = 0.03;
const SETTLE_DELAY: f32 = 0.6;
const SETTLE_TAG: &str = "milestone-settle";

/// Reveals the word collection in milestone batches, one tile per word,
/// grouped into a fixed grid per category.
pub struct WaffleChart {
    words: Vec<WordAggregate>,
    /// Week bucket per word, parallel to `words`.
    weeks: Vec<u32>,
    /// Inclusive week boundary per milestone; the last one covers max week.
    boundaries: [u32; MILESTONES],
    milestone: usize,
    settled: bool,
    scene: Scene,
}

impl WaffleChart {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let words = aggregate_words(&dataset.records, |_| true);
        let min_day = dataset.records.iter().map(|r| r.day).min().unwrap_or(0);
        let weeks: Vec<u32> = words.iter().map(|w| (w.first_day - min_day) / 7).collect();
        let max_week = weeks.iter().copied().max().unwrap_or(0);

        let mut boundaries = [0u32; MILESTONES];
        for (index, boundary) in boundaries.iter_mut().enumerate() {
            *boundary = (index as u32 + 1) * max_week / MILESTONES as u32;
        }

        let mut chart = Self {
            words,
            weeks,
            boundaries,
            milestone: 0,
            settled: false,
            scene: Scene::new(),
        };

        chart.insert_headers();
        let first: Vec<usize> =
            (0..chart.words.len()).filter(|&i| chart.weeks[i] <= chart.boundaries[0]).collect();
        chart.reveal(&first);
        chart
    }

    fn insert_headers(&mut self) {
        for (index, category) in Category::ALL.iter().enumerate() {
            let info = config::category_info(*category);
            let (x, y) = block_origin(index);
            self.scene.insert(
                &format!("cat:{}", category.as_code()),
                ElementShape::Text {
                    text: info.name.to_string(),
                    size: 13.0,
                    align: Align2::LEFT_TOP,
                },
                VisualProps::at(x, y).fill(info.color),
            );
        }
    }

    /// Words revealed so far occupy a prefix of each category grid because
    /// reveal order and first-review order coincide.
    fn reveal(&mut self, indices: &[usize]) {
        for (batch_index, &word_index) in indices.iter().enumerate() {
            let word = &self.words[word_index];
            let info = config::category_info(word.category);
            let slot = self.slot_within_category(word_index);
            let block = Category::ALL.iter().position(|c| *c == word.category).unwrap_or(0);
            let (bx, by) = block_origin(block);
            let x = bx + (slot % TILE_COLS) as f32 * TILE_PITCH;
            let y = by + 22.0 + (slot / TILE_COLS) as f32 * TILE_PITCH;

            let key = format!("tile:{}", word.word);
            self.scene.insert(
                &key,
                ElementShape::Rect { corner: 4.0 },
                VisualProps::at(x, y).sized(TILE, TILE).fill(info.color).opacity(0.0),
            );
            self.scene.transition(
                &key,
                TransitionSpec::to(PropPatch::new().opacity(1.0))
                    .duration(0.35)
                    .ease(Ease::CubicOut)
                    .delay(batch_index as f32 * STAGGER),
            );
        }
    }

    fn slot_within_category(&self, word_index: usize) -> usize {
        let category = self.words[word_index].category;
        self.words[..word_index].iter().filter(|w| w.category == category).count()
    }

    pub fn can_advance(&self) -> bool {
        self.milestone < MILESTONES - 1
    }

    /// Reveals the next milestone batch. Past the last milestone this is a
    /// no-op; the already revealed tiles never go away.
    pub fn advance(&mut self) {
        if !self.can_advance() {
            return;
        }
        let previous = self.boundaries[self.milestone];
        self.milestone += 1;
        let current = self.boundaries[self.milestone];

        let batch: Vec<usize> = (0..self.words.len())
            .filter(|&i| self.weeks[i] > previous && self.weeks[i] <= current)
            .collect();
        self.reveal(&batch);

        if self.milestone == MILESTONES - 1 {
            self.scene.after(SETTLE_DELAY, SETTLE_TAG);
        }
    }

    pub fn caption(&self) -> &'static str {
        config::MILESTONE_CAPTIONS[self.milestone]
    }

    pub fn milestone(&self) -> usize {
        self.milestone
    }

    pub fn tick(&mut self, now: f64) {
        for event in self.scene.tick(now) {
            if let SceneEvent::TimerFired { tag } = event {
                if tag == SETTLE_TAG && !self.settled {
                    self.settled = true;
                    self.insert_counts();
                }
            }
        }
    }

    fn insert_counts(&mut self) {
        for (index, category) in Category::ALL.iter().enumerate() {
            let count = self.words.iter().filter(|w| w.category == *category).count();
            let (x, y) = block_origin(index);
            let key = format!("count:{}", category.as_code());
            self.scene.insert(
                &key,
                ElementShape::Text {
                    text: count.to_string(),
                    size: 13.0,
                    align: Align2::RIGHT_TOP,
                },
                VisualProps::at(x + BLOCK_W - 30.0, y)
                    .fill(config::category_info(*category).color)
                    .opacity(0.0),
            );
            self.scene
                .transition(&key, TransitionSpec::to(PropPatch::new().opacity(1.0)).duration(0.3));
        }
    }

    pub fn tooltip_for(&self, key: &str) -> Option<TooltipContent> {
        let word = key.strip_prefix("tile:")?;
        let aggregate = self.words.iter().find(|w| w.word == word)?;
        Some(TooltipContent {
            title: aggregate.word.clone(),
            lines: vec![
                aggregate.translation.clone(),
                format!("first reviewed {}", aggregate.first_date().format("%b %-d")),
                config::category_info(aggregate.category).name.to_string(),
            ],
            breakdown: None,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn teardown(&mut self) {
        self.scene.clear();
    }
}

fn block_origin(index: usize) -> (f32, f32) {
    let col = index % BLOCK_COLS;
    let row = index / BLOCK_COLS;
    (GRID_LEFT + col as f32 * BLOCK_W, GRID_TOP + row as f32 * BLOCK_H)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn dataset(rows: &[&str]) -> Arc<Dataset> {
        let mut csv = String::from("word,translation,pos,category,day,tod,outcome,agree,secs\n");
        for row in rows {
            csv.push_str(row);
            csv.push('\n');
        }
        Arc::new(Dataset::from_csv(&csv).expect("test csv parses"))
    }

    // Weeks 0, 1, 4, 8 and 12: with a max week of 12 the milestone
    // boundaries land at 2, 4, 7, 9, 12.
    fn spread() -> Arc<Dataset> {
        dataset(&[
            "uno,one,num,everyday,0,32000,good,y,2.1",
            "gato,cat,noun,everyday,10,33000,good,y,1.4",
            "pan,bread,noun,food,30,34000,again,n,5.0",
            "tren,train,noun,travel,60,35000,good,y,2.0",
            "jefa,boss,noun,work,84,36000,good,y,3.2",
        ])
    }

    fn revealed_tiles(chart: &WaffleChart) -> HashSet<String> {
        chart
            .scene
            .live_keys()
            .into_iter()
            .filter(|key| key.starts_with("tile:"))
            .collect()
    }

    #[test]
    fn construction_reveals_only_the_first_milestone() {
        let chart = WaffleChart::new(spread());

        assert_eq!(chart.milestone(), 0);
        let tiles = revealed_tiles(&chart);
        assert!(tiles.contains("tile:uno"));
        assert!(tiles.contains("tile:gato"));
        assert_eq!(tiles.len(), 2);
    }

    #[test]
    fn reveals_are_monotonic_subsets() {
        let mut chart = WaffleChart::new(spread());
        let mut seen = revealed_tiles(&chart);

        while chart.can_advance() {
            chart.advance();
            let next = revealed_tiles(&chart);
            assert!(seen.is_subset(&next));
            seen = next;
        }

        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn batches_follow_week_boundaries() {
        let mut chart = WaffleChart::new(spread());

        chart.advance(); // weeks 3..=4
        assert!(revealed_tiles(&chart).contains("tile:pan"));
        assert!(!revealed_tiles(&chart).contains("tile:tren"));

        chart.advance(); // weeks 5..=7, empty batch is fine
        assert!(!revealed_tiles(&chart).contains("tile:tren"));

        chart.advance(); // weeks 8..=9
        assert!(revealed_tiles(&chart).contains("tile:tren"));

        chart.advance(); // weeks 10..=12
        assert!(revealed_tiles(&chart).contains("tile:jefa"));
    }

    #[test]
    fn terminal_milestone_settles_once_and_stops_advancing() {
        let mut chart = WaffleChart::new(spread());
        for _ in 0..10 {
            chart.advance();
        }
        assert_eq!(chart.milestone(), MILESTONES - 1);
        assert!(!chart.can_advance());

        chart.tick(0.0);
        chart.tick(10.0);
        let labels = chart
            .scene
            .live_keys()
            .into_iter()
            .filter(|key| key.starts_with("count:"))
            .count();
        assert_eq!(labels, Category::ALL.len());

        // Advancing at the end changes nothing.
        let before = chart.scene.len();
        chart.advance();
        chart.tick(20.0);
        assert_eq!(chart.scene.len(), before);
        assert_eq!(chart.milestone(), MILESTONES - 1);
    }

    #[test]
    fn batch_items_trail_each_other() {
        let mut chart = WaffleChart::new(spread());
        chart.tick(0.0);
        // Second tile of the opening batch is still held by its delay while
        // the first is already fading in.
        chart.tick(0.02);
        let first = chart.scene.get("tile:uno").unwrap().props().opacity;
        let second = chart.scene.get("tile:gato").unwrap().props().opacity;
        assert!(first > 0.0);
        assert_eq!(second, 0.0);
    }

    #[test]
    fn tiles_fill_category_grids_in_first_review_order() {
        let chart = WaffleChart::new(dataset(&[
            "gato,cat,noun,everyday,0,32000,good,y,1.0",
            "casa,house,noun,everyday,1,32000,good,y,1.0",
            "pan,bread,noun,food,2,32000,good,y,1.0",
        ]));

        let gato = chart.scene.get("tile:gato").unwrap().props();
        let casa = chart.scene.get("tile:casa").unwrap().props();
        let pan = chart.scene.get("tile:pan").unwrap().props();

        // Same block, consecutive slots.
        assert_eq!(gato.y, casa.y);
        assert!(casa.x > gato.x);
        // Different category lands in a different block.
        assert!(pan.x != gato.x || pan.y != gato.y);
    }

    #[test]
    fn tooltip_reports_word_details() {
        let chart = WaffleChart::new(spread());
        let tip = chart.tooltip_for("tile:gato").unwrap();
        assert_eq!(tip.title, "gato");
        assert!(tip.lines.iter().any(|line| line == "cat"));
        assert!(chart.tooltip_for("cat:food").is_none());
    }
}
