use std::sync::Arc;

use eframe::egui::Align2;

use super::{
    LinearScale,
    TooltipContent,
};
use crate::{
    config,
    core::{
        aggregate_words,
        Dataset,
        Pos,
    },
    scene::{
        ElementShape,
        PropPatch,
        Scene,
        SceneEvent,
        TransitionSpec,
        VisualProps,
    },
};

const PHASES: usize = 4;

const STACK_X: f32 = 80.0;
const STACK_Y: f32 = 216.0;
const STACK_W: f32 = 600.0;
const STACK_H: f32 = 48.0;

const ROW_TOP: f32 = 60.0;
const ROW_PITCH: f32 = 44.0;
const BAR_X: f32 = 150.0;
const BAR_H: f32 = 26.0;
const BAR_MAX_W: f32 = 560.0;

const SEGMENT_STAGGER: f32 = 0.45;
const GROW_TAG: &str = "segment-grown";

#[derive(Debug, Clone, Copy, PartialEq)]
struct PosSegment {
    pos: Pos,
    count: usize,
    /// Exact share of the total, used for layout and comparisons.
    share: f32,
    /// Rounded percentage shown in labels; all of them sum to 100.
    display_pct: u8,
}

/// Walks one part-of-speech distribution through four fixed representations:
/// total bar, stacked composition, separated bars, annotated comparison.
/// Advancement is forward-only.
pub struct MorphChart {
    /// Segments in ascending count order, the stacking order of phase 1.
    segments: Vec<PosSegment>,
    total_words: usize,
    phase: usize,
    /// Stack geometry per pos, filled in when phase 1 lays the segments out.
    stack_layout: Vec<(Pos, f32, f32)>,
    scene: Scene,
}

impl MorphChart {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let words = aggregate_words(&dataset.records, |_| true);
        let total_words = words.len();

        let mut segments: Vec<PosSegment> = Pos::ALL
            .iter()
            .map(|&pos| (pos, words.iter().filter(|w| w.pos == pos).count()))
            .filter(|&(_, count)| count > 0)
            .map(|(pos, count)| PosSegment {
                pos,
                count,
                share: count as f32 / total_words.max(1) as f32,
                display_pct: 0,
            })
            .collect();
        segments.sort_by_key(|segment| (segment.count, segment.pos.ordinal()));

        let counts: Vec<usize> = segments.iter().map(|segment| segment.count).collect();
        for (segment, pct) in segments.iter_mut().zip(largest_remainder(&counts)) {
            segment.display_pct = pct;
        }

        let mut chart = Self {
            segments,
            total_words,
            phase: 0,
            stack_layout: Vec::new(),
            scene: Scene::new(),
        };
        chart.enter_total_bar();
        chart
    }

    fn enter_total_bar(&mut self) {
        self.scene.insert(
            "bar:total",
            ElementShape::Rect { corner: 4.0 },
            VisualProps::at(STACK_X, STACK_Y).sized(0.0, STACK_H).fill(config::MUTED_FILL),
        );
        self.scene.transition(
            "bar:total",
            TransitionSpec::to(PropPatch::new().w(STACK_W)).duration(0.6),
        );

        self.scene.insert(
            "label:total",
            ElementShape::Text {
                text: format!("{} distinct words", self.total_words),
                size: 14.0,
                align: Align2::LEFT_BOTTOM,
            },
            VisualProps::at(STACK_X, STACK_Y - 12.0).fill(config::LABEL_TEXT).opacity(0.0),
        );
        self.scene.transition(
            "label:total",
            TransitionSpec::to(PropPatch::new().opacity(1.0)).duration(0.4).delay(0.3),
        );
    }

    pub fn can_advance(&self) -> bool {
        self.phase < PHASES - 1
    }

    pub fn phase(&self) -> usize {
        self.phase
    }

    pub fn advance(&mut self) {
        if !self.can_advance() {
            return;
        }
        self.phase += 1;
        match self.phase {
            1 => self.enter_composition(),
            2 => self.morph_to_rows(),
            3 => self.highlight_focus(),
            _ => {}
        }
    }

    /// Phase 1: grow the stacked segments over the total bar one at a time,
    /// in ascending count order. Each completed grow-in reports back through
    /// its tag so the percentage label appears only once the segment is in
    /// place.
    fn enter_composition(&mut self) {
        self.stack_layout.clear();
        let mut cursor = STACK_X;
        for (index, segment) in self.segments.iter().enumerate() {
            let width = segment.share * STACK_W;
            self.stack_layout.push((segment.pos, cursor, width));

            let key = format!("seg:{}", segment.pos.as_code());
            self.scene.insert(
                &key,
                ElementShape::Rect { corner: 0.0 },
                VisualProps::at(cursor, STACK_Y)
                    .sized(0.0, STACK_H)
                    .fill(config::pos_info(segment.pos).color),
            );
            self.scene.transition(
                &key,
                TransitionSpec::to(PropPatch::new().w(width))
                    .duration(0.4)
                    .delay(index as f32 * SEGMENT_STAGGER)
                    .tag(GROW_TAG),
            );
            cursor += width;
        }
    }

    /// Phase 2: the same segment keys glide into a separated bar per part of
    /// speech, descending by count. Percentage labels and the underlying
    /// total bar leave the stage.
    fn morph_to_rows(&mut self) {
        self.scene.exit("bar:total", fade_out());
        self.scene.exit("label:total", fade_out());
        for segment in &self.segments {
            self.scene.exit(&format!("pct:{}", segment.pos.as_code()), fade_out());
        }

        let scale = self.count_scale();
        for (row, segment) in self.descending().into_iter().enumerate() {
            let y = ROW_TOP + row as f32 * ROW_PITCH;
            let width = scale.apply(segment.count as f32);
            let code = segment.pos.as_code();
            let info = config::pos_info(segment.pos);

            self.scene.transition(
                &format!("seg:{}", code),
                TransitionSpec::to(
                    PropPatch::new().x(BAR_X).y(y).w(width).h(BAR_H),
                )
                .duration(0.7),
            );

            let name_key = format!("name:{}", code);
            self.scene.insert(
                &name_key,
                ElementShape::Text {
                    text: info.plural.to_string(),
                    size: 13.0,
                    align: Align2::RIGHT_CENTER,
                },
                VisualProps::at(BAR_X - 8.0, y + BAR_H / 2.0).fill(info.color).opacity(0.0),
            );
            self.scene.transition(
                &name_key,
                TransitionSpec::to(PropPatch::new().opacity(1.0)).duration(0.4).delay(0.3),
            );

            let count_key = format!("cnt:{}", code);
            self.scene.insert(
                &count_key,
                ElementShape::Text {
                    text: segment.count.to_string(),
                    size: 13.0,
                    align: Align2::LEFT_CENTER,
                },
                VisualProps::at(BAR_X + width + 8.0, y + BAR_H / 2.0)
                    .fill(config::LABEL_TEXT)
                    .opacity(0.0),
            );
            self.scene.transition(
                &count_key,
                TransitionSpec::to(PropPatch::new().opacity(1.0)).duration(0.4).delay(0.3),
            );
        }
    }

    /// Phase 3: mute everything but the focus part of speech, drop a dashed
    /// line at the mean count and recolor the count labels that match the
    /// focus count.
    fn highlight_focus(&mut self) {
        let focus = config::HIGHLIGHT_POS;
        let focus_count = self.count_of(focus);
        let focus_color = config::pos_info(focus).color;

        for segment in &self.segments {
            if segment.pos != focus {
                self.scene.transition(
                    &format!("seg:{}", segment.pos.as_code()),
                    TransitionSpec::to(PropPatch::new().fill(config::MUTED_FILL)).duration(0.5),
                );
                self.scene.transition(
                    &format!("name:{}", segment.pos.as_code()),
                    TransitionSpec::to(PropPatch::new().fill(config::MUTED_FILL)).duration(0.5),
                );
            }
            if segment.count == focus_count {
                self.scene.transition(
                    &format!("cnt:{}", segment.pos.as_code()),
                    TransitionSpec::to(PropPatch::new().fill(focus_color)).duration(0.5),
                );
            }
        }

        let mean = self.total_words as f32 / self.segments.len().max(1) as f32;
        let mean_x = BAR_X + self.count_scale().apply(mean);
        let line_bottom = ROW_TOP + self.segments.len() as f32 * ROW_PITCH;

        self.scene.insert(
            "mean",
            ElementShape::Line { width: 1.5, dashed: true },
            VisualProps::at(mean_x, ROW_TOP - 16.0)
                .sized(0.0, line_bottom - ROW_TOP + 16.0)
                .fill(config::LABEL_TEXT)
                .opacity(0.0),
        );
        self.scene
            .transition("mean", TransitionSpec::to(PropPatch::new().opacity(1.0)).duration(0.5));

        self.scene.insert(
            "label:mean",
            ElementShape::Text {
                text: format!("mean {:.0}", mean),
                size: 11.0,
                align: Align2::LEFT_TOP,
            },
            VisualProps::at(mean_x + 6.0, ROW_TOP - 16.0).fill(config::LABEL_TEXT).opacity(0.0),
        );
        self.scene.transition(
            "label:mean",
            TransitionSpec::to(PropPatch::new().opacity(1.0)).duration(0.5),
        );
    }

    pub fn tick(&mut self, now: f64) {
        for event in self.scene.tick(now) {
            if let SceneEvent::Completed { key, tag } = event {
                if tag == GROW_TAG && self.phase == 1 {
                    if let Some(code) = key.strip_prefix("seg:") {
                        if let Some(pos) = Pos::from_code(code) {
                            self.insert_pct_label(pos);
                        }
                    }
                }
            }
        }
    }

    fn insert_pct_label(&mut self, pos: Pos) {
        let layout =
            self.stack_layout.iter().find(|(layout_pos, _, _)| *layout_pos == pos).copied();
        let segment = self.segments.iter().find(|segment| segment.pos == pos).copied();

        if let (Some((_, x, width)), Some(segment)) = (layout, segment) {
            let key = format!("pct:{}", pos.as_code());
            self.scene.insert(
                &key,
                ElementShape::Text {
                    text: format!("{}%", segment.display_pct),
                    size: 12.0,
                    align: Align2::CENTER_BOTTOM,
                },
                VisualProps::at(x + width / 2.0, STACK_Y - 6.0)
                    .fill(config::pos_info(pos).color)
                    .opacity(0.0),
            );
            self.scene.transition(
                &key,
                TransitionSpec::to(PropPatch::new().opacity(1.0)).duration(0.25),
            );
        }
    }

    fn descending(&self) -> Vec<PosSegment> {
        let mut segments = self.segments.clone();
        segments.sort_by_key(|segment| (std::cmp::Reverse(segment.count), segment.pos.ordinal()));
        segments
    }

    fn count_scale(&self) -> LinearScale {
        let max = self.segments.iter().map(|segment| segment.count).max().unwrap_or(1);
        LinearScale::new((0.0, max as f32), (0.0, BAR_MAX_W))
    }

    fn count_of(&self, pos: Pos) -> usize {
        self.segments
            .iter()
            .find(|segment| segment.pos == pos)
            .map(|segment| segment.count)
            .unwrap_or(0)
    }

    pub fn tooltip_for(&self, key: &str) -> Option<TooltipContent> {
        if key == "bar:total" {
            return Some(TooltipContent {
                title: "The collection".to_string(),
                lines: vec![format!("{} distinct words", self.total_words)],
                breakdown: None,
            });
        }
        let code = key.strip_prefix("seg:")?;
        let pos = Pos::from_code(code)?;
        let segment = self.segments.iter().find(|segment| segment.pos == pos)?;
        Some(TooltipContent {
            title: config::pos_info(pos).plural.to_string(),
            lines: vec![
                format!("{} words", segment.count),
                format!("{}% of the collection", segment.display_pct),
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

fn fade_out() -> TransitionSpec {
    TransitionSpec::to(PropPatch::new().opacity(0.0)).duration(0.3)
}

/// Rounds a list of counts to whole percentages that sum to exactly 100.
/// Every entry takes the floor of its exact share; the leftover points go to
/// the largest fractional remainders, earlier entries first on ties.
pub(crate) fn largest_remainder(counts: &[usize]) -> Vec<u8> {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return vec![0; counts.len()];
    }

    let mut percents = Vec::with_capacity(counts.len());
    let mut remainders = Vec::with_capacity(counts.len());
    for (index, &count) in counts.iter().enumerate() {
        let exact = count as f64 * 100.0 / total as f64;
        let floor = exact.floor();
        percents.push(floor as u8);
        remainders.push((index, exact - floor));
    }

    let assigned: u32 = percents.iter().map(|&p| p as u32).sum();
    let leftover = 100u32.saturating_sub(assigned) as usize;

    remainders.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    for &(index, _) in remainders.iter().take(leftover) {
        percents[index] += 1;
    }

    percents
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(rows: &[&str]) -> Arc<Dataset> {
        let mut csv = String::from("word,translation,pos,category,day,tod,outcome,agree,secs\n");
        for row in rows {
            csv.push_str(row);
            csv.push('\n');
        }
        Arc::new(Dataset::from_csv(&csv).expect("test csv parses"))
    }

    // Two nouns, one verb: ascending puts the verb first, descending the
    // nouns first.
    fn two_to_one() -> Arc<Dataset> {
        dataset(&[
            "gato,cat,noun,everyday,0,32000,good,y,1.0",
            "perro,dog,noun,everyday,1,32000,again,n,2.0",
            "correr,to run,verb,everyday,2,32000,good,y,1.5",
        ])
    }

    fn snapshot(chart: &MorphChart) -> Vec<(String, VisualProps)> {
        chart.scene.elements().iter().map(|e| (e.key().to_string(), e.props())).collect()
    }

    // Arms freshly scheduled transitions at `now + 1` and then runs them all
    // the way out before returning the finish time.
    fn settle(chart: &mut MorphChart, now: f64) -> f64 {
        chart.tick(now + 1.0);
        chart.tick(now + 11.0);
        now + 11.0
    }

    #[test]
    fn construction_shows_only_the_total_bar() {
        let chart = MorphChart::new(two_to_one());
        assert_eq!(chart.phase(), 0);
        assert!(chart.scene.get("bar:total").is_some());
        assert!(chart.scene.get("seg:noun").is_none());
    }

    #[test]
    fn ascending_then_descending_sort_orders() {
        let mut chart = MorphChart::new(two_to_one());

        let ascending: Vec<Pos> = chart.segments.iter().map(|s| s.pos).collect();
        assert_eq!(ascending, vec![Pos::Verb, Pos::Noun]);

        let descending: Vec<Pos> = chart.descending().iter().map(|s| s.pos).collect();
        assert_eq!(descending, vec![Pos::Noun, Pos::Verb]);

        // Stacking follows the ascending order left to right.
        chart.advance();
        let verb_x = chart.scene.get("seg:verb").unwrap().props().x;
        let noun_x = chart.scene.get("seg:noun").unwrap().props().x;
        assert!(verb_x < noun_x);

        // Rows follow the descending order top to bottom.
        chart.advance();
        chart.tick(0.0);
        chart.tick(10.0);
        let noun_y = chart.scene.get("seg:noun").unwrap().props().y;
        let verb_y = chart.scene.get("seg:verb").unwrap().props().y;
        assert!(noun_y < verb_y);
    }

    #[test]
    fn percentage_labels_wait_for_their_segment() {
        let mut chart = MorphChart::new(two_to_one());
        chart.tick(0.0);
        chart.tick(1.0);
        chart.advance();

        // Segment grow-ins run one after another: 0.4s each, 0.45s apart.
        chart.tick(1.0);
        assert!(chart.scene.get("pct:verb").is_none());

        chart.tick(1.5);
        assert!(chart.scene.get("pct:verb").is_some());
        assert!(chart.scene.get("pct:noun").is_none());

        chart.tick(2.0);
        assert!(chart.scene.get("pct:noun").is_some());
    }

    #[test]
    fn phase_two_keeps_segment_identity_and_drops_percent_labels() {
        let mut chart = MorphChart::new(two_to_one());
        let now = settle(&mut chart, 0.0);
        chart.advance();
        let now = settle(&mut chart, now);
        assert!(chart.scene.get("pct:verb").is_some());

        chart.advance();
        // Mid-morph the segments still exist under their old keys.
        chart.tick(now + 0.1);
        assert!(chart.scene.get("seg:noun").is_some());
        assert!(chart.scene.get("seg:verb").is_some());

        settle(&mut chart, now + 0.1);
        assert!(chart.scene.get("pct:verb").is_none());
        assert!(chart.scene.get("bar:total").is_none());
        assert!(chart.scene.get("name:noun").is_some());
        assert!(chart.scene.get("cnt:verb").is_some());
    }

    #[test]
    fn terminal_phase_is_idempotent() {
        let mut chart = MorphChart::new(two_to_one());
        let mut now = settle(&mut chart, 0.0);
        for _ in 0..3 {
            chart.advance();
            now = settle(&mut chart, now);
        }
        assert_eq!(chart.phase(), PHASES - 1);
        assert!(!chart.can_advance());
        assert!(chart.scene.get("mean").is_some());

        let before = snapshot(&chart);
        chart.advance();
        settle(&mut chart, now);
        assert_eq!(chart.phase(), PHASES - 1);
        assert_eq!(snapshot(&chart), before);
    }

    #[test]
    fn highlight_mutes_others_and_recolors_matching_counts() {
        // Noun and verb tie at two words each; the adjective stands apart.
        let mut chart = MorphChart::new(dataset(&[
            "gato,cat,noun,everyday,0,32000,good,y,1.0",
            "perro,dog,noun,everyday,1,32000,good,y,1.0",
            "correr,to run,verb,everyday,2,32000,good,y,1.0",
            "saltar,to jump,verb,everyday,3,32000,good,y,1.0",
            "rojo,red,adj,everyday,4,32000,good,y,1.0",
        ]));
        let mut now = settle(&mut chart, 0.0);
        for _ in 0..3 {
            chart.advance();
            now = settle(&mut chart, now);
        }

        let focus_color = config::pos_info(config::HIGHLIGHT_POS).color;
        assert_eq!(chart.scene.get("seg:noun").unwrap().props().fill, focus_color);
        assert_eq!(chart.scene.get("seg:verb").unwrap().props().fill, config::MUTED_FILL);
        assert_eq!(chart.scene.get("seg:adj").unwrap().props().fill, config::MUTED_FILL);

        // The verb count equals the noun count, so its label recolors too.
        assert_eq!(chart.scene.get("cnt:noun").unwrap().props().fill, focus_color);
        assert_eq!(chart.scene.get("cnt:verb").unwrap().props().fill, focus_color);
        assert_eq!(chart.scene.get("cnt:adj").unwrap().props().fill, config::LABEL_TEXT);
    }

    #[test]
    fn display_percents_always_sum_to_100() {
        assert_eq!(largest_remainder(&[49, 26, 11, 4, 3, 1, 1, 1]).iter().sum::<u8>(), 100u8);
        assert_eq!(largest_remainder(&[1, 1, 1]).iter().sum::<u8>(), 100u8);
        assert_eq!(largest_remainder(&[2, 1]), vec![67, 33]);
        assert_eq!(largest_remainder(&[]), Vec::<u8>::new());
        assert_eq!(largest_remainder(&[0, 0]), vec![0, 0]);
    }

    #[test]
    fn tooltip_reports_share_of_collection() {
        let mut chart = MorphChart::new(two_to_one());
        chart.advance();

        let tip = chart.tooltip_for("seg:noun").unwrap();
        assert!(tip.lines.iter().any(|line| line == "2 words"));
        assert!(tip.lines.iter().any(|line| line == "67% of the collection"));
        assert!(chart.tooltip_for("name:noun").is_none());
    }
}
