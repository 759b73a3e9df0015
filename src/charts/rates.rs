use std::{
    collections::{
        HashMap,
        HashSet,
    },
    sync::Arc,
};

use eframe::egui::{
    Align2,
    Color32,
};

use super::{
    LinearScale,
    TooltipContent,
};
use crate::{
    config,
    core::{
        aggregate_words,
        Category,
        Dataset,
    },
    scene::{
        keyed_join,
        Ease,
        ElementShape,
        PropPatch,
        Scene,
        TransitionSpec,
        VisualProps,
    },
};

const BASELINE: f32 = 440.0;
const DOT_RADIUS: f32 = 4.5;
const STACK_PITCH: f32 = 11.0;
const STAGGER: f32 = 0.01;

struct Dot {
    key: String,
    x: f32,
    y: f32,
    fill: Color32,
}

/// One dot per word, stacked into five-point success-rate buckets. Toggling
/// categories re-aggregates and lets the keyed join move, add and retire
/// dots without touching the axis.
pub struct RateStrip {
    dataset: Arc<Dataset>,
    selected: HashSet<Category>,
    scene: Scene,
}

impl RateStrip {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let mut chart = Self {
            dataset,
            selected: Category::ALL.iter().copied().collect(),
            scene: Scene::new(),
        };
        chart.insert_axis();
        chart.render();
        chart
    }

    fn insert_axis(&mut self) {
        self.scene.insert(
            "axis:base",
            ElementShape::Line { width: 1.0, dashed: false },
            VisualProps::at(36.0, BASELINE + 8.0).sized(688.0, 0.0).fill(config::LABEL_TEXT),
        );
        for value in [0u32, 25, 50, 75, 100] {
            self.scene.insert(
                &format!("axis:t{}", value),
                ElementShape::Text {
                    text: format!("{}%", value),
                    size: 11.0,
                    align: Align2::CENTER_TOP,
                },
                VisualProps::at(rate_scale().apply(value as f32), BASELINE + 14.0)
                    .fill(config::LABEL_TEXT),
            );
        }
        self.scene.insert(
            "axis:title",
            ElementShape::Text {
                text: "success rate".to_string(),
                size: 12.0,
                align: Align2::CENTER_TOP,
            },
            VisualProps::at(380.0, BASELINE + 32.0).fill(config::LABEL_TEXT),
        );
    }

    /// Re-aggregates under the current category filter and joins the result
    /// against the dots already on stage. Only `dot:` keys take part; axis
    /// elements are outside the join and never exit.
    fn render(&mut self) {
        let words =
            aggregate_words(&self.dataset.records, |r| self.selected.contains(&r.category));

        let scale = rate_scale();
        let mut stacks: HashMap<usize, usize> = HashMap::new();
        let mut dots: Vec<Dot> = Vec::new();
        for word in &words {
            // Ungraded words have no defined rate and stay out of the strip.
            if let Some(rate) = word.success_rate() {
                let bucket = (rate / 5.0).round() as usize;
                let stack = stacks.entry(bucket).or_insert(0);
                dots.push(Dot {
                    key: format!("dot:{}", word.word),
                    x: scale.apply(bucket as f32 * 5.0),
                    y: BASELINE - 8.0 - *stack as f32 * STACK_PITCH,
                    fill: config::category_info(word.category).color,
                });
                *stack += 1;
            }
        }

        let live: Vec<String> = self
            .scene
            .live_keys()
            .into_iter()
            .filter(|key| key.starts_with("dot:"))
            .collect();
        let join = keyed_join(&dots, |dot| dot.key.clone(), &live);

        for (rank, &index) in join.enter.iter().enumerate() {
            let dot = &dots[index];
            self.scene.insert(
                &dot.key,
                ElementShape::Circle { radius: DOT_RADIUS },
                VisualProps::at(dot.x, dot.y + 18.0).fill(dot.fill).opacity(0.0),
            );
            self.scene.transition(
                &dot.key,
                TransitionSpec::to(PropPatch::new().y(dot.y).opacity(1.0))
                    .duration(0.35)
                    .ease(Ease::CubicOut)
                    .delay(rank as f32 * STAGGER),
            );
        }

        for &index in &join.update {
            let dot = &dots[index];
            self.scene.transition(
                &dot.key,
                TransitionSpec::to(PropPatch::new().x(dot.x).y(dot.y)).duration(0.45),
            );
        }

        for key in &join.exit {
            self.scene.exit(
                key,
                TransitionSpec::to(PropPatch::new().opacity(0.0).y(BASELINE + 18.0))
                    .duration(0.3),
            );
        }
    }

    pub fn is_selected(&self, category: Category) -> bool {
        self.selected.contains(&category)
    }

    pub fn toggle(&mut self, category: Category) {
        if !self.selected.remove(&category) {
            self.selected.insert(category);
        }
        self.render();
    }

    pub fn tick(&mut self, now: f64) {
        self.scene.tick(now);
    }

    pub fn tooltip_for(&self, key: &str) -> Option<TooltipContent> {
        let name = key.strip_prefix("dot:")?;
        let words = aggregate_words(&self.dataset.records, |r| r.word == name);
        let word = words.first()?;
        let rate = word.success_rate()?;
        Some(TooltipContent {
            title: word.word.clone(),
            lines: vec![
                word.translation.clone(),
                format!("{} good · {} again", word.successes, word.failures),
                format!("{:.0}% success", rate),
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

fn rate_scale() -> LinearScale {
    LinearScale::new((0.0, 100.0), (40.0, 720.0))
}
