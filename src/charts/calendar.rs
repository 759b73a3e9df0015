use std::{
    collections::HashMap,
    sync::Arc,
};

use chrono::{
    Datelike,
    NaiveDate,
};
use eframe::egui::Align2;

use super::{
    Breakdown,
    LinearScale,
    TooltipContent,
};
use crate::{
    config,
    core::{
        Dataset,
        Outcome,
        ReviewRecord,
    },
    scene::{
        blend_colors,
        Ease,
        ElementShape,
        PropPatch,
        Scene,
        TransitionSpec,
        VisualProps,
    },
};

const MONTH_COLS: usize = 4;
const MONTH_W: f32 = 185.0;
const MONTH_H: f32 = 220.0;
const GRID_LEFT: f32 = 12.0;
const GRID_TOP: f32 = 20.0;
const CELL: f32 = 18.0;
const CELL_PITCH: f32 = 20.0;

const DETAIL_BASELINE: f32 = 420.0;
const DETAIL_MAX_H: f32 = 320.0;
const BAR_W: f32 = 22.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailMode {
    Outcomes,
    Agreement,
    Durations,
}

impl DetailMode {
    pub fn next(self) -> Self {
        match self {
            DetailMode::Outcomes => DetailMode::Agreement,
            DetailMode::Agreement => DetailMode::Durations,
            DetailMode::Durations => DetailMode::Outcomes,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DetailMode::Outcomes => "outcomes by hour",
            DetailMode::Agreement => "scheduler agreement by hour",
            DetailMode::Durations => "seconds per review",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarView {
    Overview,
    Detail { date: NaiveDate, mode: DetailMode },
}

/// Month-grid heatmap with a per-day drill-down. The overview and the detail
/// level never share the stage; entering, cycling and resetting all rebuild
/// from the dataset so no stale elements survive a level switch.
pub struct CalendarChart {
    dataset: Arc<Dataset>,
    daily: HashMap<NaiveDate, usize>,
    max_daily: usize,
    view: CalendarView,
    scene: Scene,
}

impl CalendarChart {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let daily = dataset.daily_counts();
        let max_daily = daily.values().copied().max().unwrap_or(0);
        let mut chart = Self {
            dataset,
            daily,
            max_daily,
            view: CalendarView::Overview,
            scene: Scene::new(),
        };
        chart.build_overview();
        chart
    }

    pub fn view(&self) -> CalendarView {
        self.view
    }

    pub fn in_detail(&self) -> bool {
        matches!(self.view, CalendarView::Detail { .. })
    }

    pub fn mode_label(&self) -> Option<&'static str> {
        match self.view {
            CalendarView::Detail { mode, .. } => Some(mode.label()),
            CalendarView::Overview => None,
        }
    }

    fn months(&self) -> Vec<(i32, u32)> {
        let mut months = Vec::new();
        let (mut year, mut month) = (self.dataset.min_date.year(), self.dataset.min_date.month());
        let last = (self.dataset.max_date.year(), self.dataset.max_date.month());
        loop {
            months.push((year, month));
            if (year, month) == last {
                break;
            }
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
        }
        months
    }

    fn day_fill(&self, count: usize) -> eframe::egui::Color32 {
        if count == 0 {
            config::HEAT_ZERO
        } else {
            let fraction = count as f32 / self.max_daily.max(1) as f32;
            blend_colors(config::HEAT_ZERO, config::HEAT_FULL, fraction)
        }
    }

    fn build_overview(&mut self) {
        for (month_index, (year, month)) in self.months().into_iter().enumerate() {
            let mx = GRID_LEFT + (month_index % MONTH_COLS) as f32 * MONTH_W;
            let my = GRID_TOP + (month_index / MONTH_COLS) as f32 * MONTH_H;

            let first = match NaiveDate::from_ymd_opt(year, month, 1) {
                Some(date) => date,
                None => continue,
            };
            self.scene.insert(
                &format!("month:{}", first.format("%Y-%m")),
                ElementShape::Text {
                    text: first.format("%B").to_string(),
                    size: 12.0,
                    align: Align2::LEFT_TOP,
                },
                VisualProps::at(mx, my).fill(config::LABEL_TEXT).opacity(0.0),
            );
            self.scene.transition(
                &format!("month:{}", first.format("%Y-%m")),
                TransitionSpec::to(PropPatch::new().opacity(1.0)).duration(0.3),
            );

            let first_col = first.weekday().num_days_from_monday() as usize;
            for day in 1..=31u32 {
                let date = match NaiveDate::from_ymd_opt(year, month, day) {
                    Some(date) => date,
                    None => break,
                };
                let slot = first_col + day as usize - 1;
                let x = mx + (slot % 7) as f32 * CELL_PITCH;
                let y = my + 22.0 + (slot / 7) as f32 * CELL_PITCH;
                let count = self.daily.get(&date).copied().unwrap_or(0);

                let key = format!("day:{}", date.format("%Y-%m-%d"));
                self.scene.insert(
                    &key,
                    ElementShape::Rect { corner: 3.0 },
                    VisualProps::at(x, y).sized(CELL, CELL).fill(self.day_fill(count)).opacity(0.0),
                );
                self.scene.transition(
                    &key,
                    TransitionSpec::to(PropPatch::new().opacity(1.0))
                        .duration(0.3)
                        .delay(month_index as f32 * 0.05),
                );
            }
        }
    }

    /// Only day cells with at least one review react to clicks.
    pub fn is_interactive(&self, key: &str) -> bool {
        if self.view != CalendarView::Overview {
            return false;
        }
        match parse_day_key(key) {
            Some(date) => self.daily.get(&date).copied().unwrap_or(0) > 0,
            None => false,
        }
    }

    pub fn click(&mut self, key: &str) {
        if !self.is_interactive(key) {
            return;
        }
        if let Some(date) = parse_day_key(key) {
            self.view = CalendarView::Detail { date, mode: DetailMode::Outcomes };
            self.scene.clear();
            self.build_detail();
        }
    }

    /// Advances the detail sub-view in its fixed three-step cycle and
    /// re-renders. Outside the detail level this is a no-op.
    pub fn cycle_mode(&mut self) {
        if let CalendarView::Detail { date, mode } = self.view {
            self.view = CalendarView::Detail { date, mode: mode.next() };
            self.scene.clear();
            self.build_detail();
        }
    }

    /// Tears the detail level down and rebuilds the overview from the data.
    pub fn reset(&mut self) {
        if self.in_detail() {
            self.view = CalendarView::Overview;
            self.scene.clear();
            self.build_overview();
        }
    }

    fn build_detail(&mut self) {
        let (date, mode) = match self.view {
            CalendarView::Detail { date, mode } => (date, mode),
            CalendarView::Overview => return,
        };

        self.scene.insert(
            "detail:title",
            ElementShape::Text {
                text: date.format("%A, %B %-d").to_string(),
                size: 15.0,
                align: Align2::LEFT_TOP,
            },
            VisualProps::at(20.0, 14.0).fill(config::LABEL_TEXT),
        );
        self.scene.insert(
            "detail:mode",
            ElementShape::Text { text: mode.label().to_string(), size: 12.0, align: Align2::LEFT_TOP },
            VisualProps::at(20.0, 38.0).fill(config::LABEL_TEXT),
        );

        let dataset = Arc::clone(&self.dataset);
        let records = dataset.records_on(date);
        match mode {
            DetailMode::Outcomes => self.build_hour_bars(
                &records,
                ("good", config::GOOD_FILL, "again", config::AGAIN_FILL),
                |record| match record.outcome {
                    Some(Outcome::Good) => Some(true),
                    Some(Outcome::Again) => Some(false),
                    None => None,
                },
            ),
            DetailMode::Agreement => self.build_hour_bars(
                &records,
                ("agree", config::AGREE_FILL, "disagree", config::DISAGREE_FILL),
                |record| record.agreed,
            ),
            DetailMode::Durations => self.build_duration_scatter(&records),
        }
    }

    /// Stacked per-hour bars across the full day, one stack per hour even
    /// where nothing happened. `split` sorts a record into the lower or the
    /// upper series, or drops it.
    fn build_hour_bars(
        &mut self,
        records: &[&ReviewRecord],
        series: (&str, eframe::egui::Color32, &str, eframe::egui::Color32),
        split: impl Fn(&ReviewRecord) -> Option<bool>,
    ) {
        let (lower_name, lower_fill, upper_name, upper_fill) = series;

        let mut lower = [0usize; 24];
        let mut upper = [0usize; 24];
        for record in records {
            let hour = record.hour() as usize;
            match split(record) {
                Some(true) => lower[hour] += 1,
                Some(false) => upper[hour] += 1,
                None => {}
            }
        }
        let tallest = (0..24).map(|h| lower[h] + upper[h]).max().unwrap_or(0);
        let height = LinearScale::new((0.0, tallest.max(1) as f32), (0.0, DETAIL_MAX_H));
        let x_of = hour_scale(0.0, 23.0);

        for hour in 0..24usize {
            let x = x_of.apply(hour as f32) - BAR_W / 2.0;
            let lower_h = height.apply(lower[hour] as f32);
            let upper_h = height.apply(upper[hour] as f32);

            let lower_key = format!("bar:h{}:{}", hour, lower_name);
            self.scene.insert(
                &lower_key,
                ElementShape::Rect { corner: 2.0 },
                VisualProps::at(x, DETAIL_BASELINE).sized(BAR_W, 0.0).fill(lower_fill),
            );
            self.scene.transition(
                &lower_key,
                TransitionSpec::to(PropPatch::new().y(DETAIL_BASELINE - lower_h).h(lower_h))
                    .duration(0.4)
                    .ease(Ease::CubicOut)
                    .delay(hour as f32 * 0.015),
            );

            let upper_key = format!("bar:h{}:{}", hour, upper_name);
            self.scene.insert(
                &upper_key,
                ElementShape::Rect { corner: 2.0 },
                VisualProps::at(x, DETAIL_BASELINE).sized(BAR_W, 0.0).fill(upper_fill),
            );
            self.scene.transition(
                &upper_key,
                TransitionSpec::to(
                    PropPatch::new().y(DETAIL_BASELINE - lower_h - upper_h).h(upper_h),
                )
                .duration(0.4)
                .ease(Ease::CubicOut)
                .delay(hour as f32 * 0.015 + 0.1),
            );
        }

        for hour in (0..24usize).step_by(3) {
            self.scene.insert(
                &format!("hax:{}", hour),
                ElementShape::Text {
                    text: format!("{}h", hour),
                    size: 11.0,
                    align: Align2::CENTER_TOP,
                },
                VisualProps::at(x_of.apply(hour as f32), DETAIL_BASELINE + 8.0)
                    .fill(config::LABEL_TEXT),
            );
        }

        self.insert_legend(lower_name, lower_fill, upper_name, upper_fill);
    }

    /// One point per timed review. The hour axis narrows to the active hours
    /// plus one of padding instead of spanning a mostly empty day.
    fn build_duration_scatter(&mut self, records: &[&ReviewRecord]) {
        let timed: Vec<(usize, &&ReviewRecord)> =
            records.iter().enumerate().filter(|(_, r)| r.duration_secs.is_some()).collect();

        let hours: Vec<u32> = timed.iter().map(|(_, r)| r.hour()).collect();
        let lo = hours.iter().min().map(|&h| h.saturating_sub(1)).unwrap_or(0);
        let hi = hours.iter().max().map(|&h| (h + 1).min(23)).unwrap_or(23);
        let x_of = hour_scale(lo as f32, hi as f32);

        let max_secs =
            timed.iter().filter_map(|(_, r)| r.duration_secs).fold(1.0f32, f32::max);
        let y_of = LinearScale::new((0.0, max_secs), (DETAIL_BASELINE, 80.0));

        for (rank, (index, record)) in timed.iter().enumerate() {
            if let Some(secs) = record.duration_secs {
                let moment = record.tod_secs as f32 / 3600.0;
                let key = format!("pt:{}", index);
                self.scene.insert(
                    &key,
                    ElementShape::Circle { radius: 4.0 },
                    VisualProps::at(x_of.apply(moment.clamp(lo as f32, hi as f32)), y_of.apply(secs))
                        .fill(config::DURATION_FILL)
                        .opacity(0.0),
                );
                self.scene.transition(
                    &key,
                    TransitionSpec::to(PropPatch::new().opacity(0.9))
                        .duration(0.3)
                        .delay(rank as f32 * 0.02),
                );
            }
        }

        for hour in lo..=hi {
            self.scene.insert(
                &format!("hax:{}", hour),
                ElementShape::Text {
                    text: format!("{}h", hour),
                    size: 11.0,
                    align: Align2::CENTER_TOP,
                },
                VisualProps::at(x_of.apply(hour as f32), DETAIL_BASELINE + 8.0)
                    .fill(config::LABEL_TEXT),
            );
        }
    }

    fn insert_legend(
        &mut self,
        lower_name: &str,
        lower_fill: eframe::egui::Color32,
        upper_name: &str,
        upper_fill: eframe::egui::Color32,
    ) {
        self.scene.insert(
            "legend:lower",
            ElementShape::Text {
                text: lower_name.to_string(),
                size: 12.0,
                align: Align2::RIGHT_TOP,
            },
            VisualProps::at(740.0, 14.0).fill(lower_fill),
        );
        self.scene.insert(
            "legend:upper",
            ElementShape::Text {
                text: upper_name.to_string(),
                size: 12.0,
                align: Align2::RIGHT_TOP,
            },
            VisualProps::at(740.0, 32.0).fill(upper_fill),
        );
    }

    pub fn tick(&mut self, now: f64) {
        self.scene.tick(now);
    }

    /// Hover content is assembled on demand from the records behind the
    /// hovered element; nothing is precomputed or cached.
    pub fn tooltip_for(&self, key: &str) -> Option<TooltipContent> {
        if let Some(date) = parse_day_key(key) {
            let count = self.daily.get(&date).copied().unwrap_or(0);
            let line = match count {
                0 => "no reviews".to_string(),
                1 => "1 review".to_string(),
                n => format!("{} reviews", n),
            };
            return Some(TooltipContent {
                title: date.format("%B %-d").to_string(),
                lines: vec![line],
                breakdown: None,
            });
        }

        if let CalendarView::Detail { date, mode } = self.view {
            if let Some(rest) = key.strip_prefix("bar:h") {
                let (hour_text, series) = rest.split_once(':')?;
                let hour: u32 = hour_text.parse().ok()?;
                let records = self.dataset.records_on(date);
                let matched: Vec<&ReviewRecord> = records
                    .iter()
                    .filter(|r| r.hour() == hour && record_in_series(r, series))
                    .copied()
                    .collect();
                if matched.is_empty() {
                    return None;
                }
                return Some(TooltipContent {
                    title: format!("{}:00, {} {}", hour, matched.len(), series),
                    lines: Vec::new(),
                    breakdown: Some(breakdown_of(matched.iter().copied())),
                });
            }

            if let Some(index_text) = key.strip_prefix("pt:") {
                if mode == DetailMode::Durations {
                    let index: usize = index_text.parse().ok()?;
                    let records = self.dataset.records_on(date);
                    let record = records.get(index)?;
                    let secs = record.duration_secs?;
                    return Some(TooltipContent {
                        title: record.word.clone(),
                        lines: vec![record.translation.clone(), format!("{:.1} s", secs)],
                        breakdown: None,
                    });
                }
            }
        }

        None
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn teardown(&mut self) {
        self.scene.clear();
    }
}

fn hour_scale(lo: f32, hi: f32) -> LinearScale {
    LinearScale::new((lo, hi), (48.0, 712.0))
}

fn parse_day_key(key: &str) -> Option<NaiveDate> {
    let text = key.strip_prefix("day:")?;
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

fn record_in_series(record: &ReviewRecord, series: &str) -> bool {
    match series {
        "good" => record.outcome == Some(Outcome::Good),
        "again" => record.outcome == Some(Outcome::Again),
        "agree" => record.agreed == Some(true),
        "disagree" => record.agreed == Some(false),
        _ => false,
    }
}

/// Per-part-of-speech and per-category counts over a handful of records, for
/// the hover table in the detail view.
fn breakdown_of<'a>(records: impl Iterator<Item = &'a ReviewRecord>) -> Breakdown {
    let mut pos_counts: HashMap<&'static str, usize> = HashMap::new();
    let mut category_counts: HashMap<&'static str, usize> = HashMap::new();
    for record in records {
        *pos_counts.entry(config::pos_info(record.pos).plural).or_insert(0) += 1;
        *category_counts.entry(config::category_info(record.category).name).or_insert(0) += 1;
    }

    let mut breakdown = Breakdown {
        pos_counts: pos_counts.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        category_counts: category_counts.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
    };
    breakdown.pos_counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    breakdown.category_counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    breakdown
}
