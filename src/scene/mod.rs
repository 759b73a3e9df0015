use eframe::egui::{
    Align2,
    Color32,
};

mod ease;
mod join;

pub use ease::Ease;
pub use join::{
    keyed_join,
    JoinSets,
};

const DEFAULT_DURATION: f32 = 0.4;

/// Geometry and style shared by every element on stage. Interpretation of
/// x/y/w/h depends on the shape: rects use a top-left corner and a size,
/// circles and text use x/y as an anchor point, lines run from (x, y) to
/// (x + w, y + h).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualProps {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub opacity: f32,
    pub fill: Color32,
}

impl Default for VisualProps {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, w: 0.0, h: 0.0, opacity: 1.0, fill: Color32::WHITE }
    }
}

impl VisualProps {
    pub fn at(x: f32, y: f32) -> Self {
        Self { x, y, ..Self::default() }
    }

    pub fn sized(mut self, w: f32, h: f32) -> Self {
        self.w = w;
        self.h = h;
        self
    }

    pub fn fill(mut self, fill: Color32) -> Self {
        self.fill = fill;
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementShape {
    Rect { corner: f32 },
    Circle { radius: f32 },
    Text { text: String, size: f32, align: Align2 },
    Line { width: f32, dashed: bool },
}

/// Partial update applied to a `VisualProps`. Unset fields are left alone,
/// so a transition only animates the properties it names.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PropPatch {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub w: Option<f32>,
    pub h: Option<f32>,
    pub opacity: Option<f32>,
    pub fill: Option<Color32>,
}

impl PropPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn x(mut self, x: f32) -> Self {
        self.x = Some(x);
        self
    }

    pub fn y(mut self, y: f32) -> Self {
        self.y = Some(y);
        self
    }

    pub fn w(mut self, w: f32) -> Self {
        self.w = Some(w);
        self
    }

    pub fn h(mut self, h: f32) -> Self {
        self.h = Some(h);
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn fill(mut self, fill: Color32) -> Self {
        self.fill = Some(fill);
        self
    }

    fn apply_to(&self, props: &mut VisualProps) {
        if let Some(x) = self.x {
            props.x = x;
        }
        if let Some(y) = self.y {
            props.y = y;
        }
        if let Some(w) = self.w {
            props.w = w;
        }
        if let Some(h) = self.h {
            props.h = h;
        }
        if let Some(opacity) = self.opacity {
            props.opacity = opacity;
        }
        if let Some(fill) = self.fill {
            props.fill = fill;
        }
    }
}

/// A scheduled property animation. `delay` counts from the first frame after
/// scheduling; the element does not move until the delay elapses, and the
/// starting snapshot is taken at that moment, not at scheduling time.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionSpec {
    pub patch: PropPatch,
    pub delay: f32,
    pub duration: f32,
    pub ease: Ease,
    pub tag: Option<String>,
}

impl TransitionSpec {
    pub fn to(patch: PropPatch) -> Self {
        Self { patch, delay: 0.0, duration: DEFAULT_DURATION, ease: Ease::default(), tag: None }
    }

    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds;
        self
    }

    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = seconds;
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// A tagged style transition reached its target.
    Completed { key: String, tag: String },
    /// A one-shot timer registered with `after` came due.
    TimerFired { tag: String },
    /// An exit transition finished and the element left the stage.
    Exited { key: String },
}

#[derive(Debug)]
struct ActiveTransition {
    spec: TransitionSpec,
    begin: Option<f64>,
    from: Option<VisualProps>,
}

impl ActiveTransition {
    fn new(spec: TransitionSpec) -> Self {
        Self { spec, begin: None, from: None }
    }
}

#[derive(Debug)]
struct PendingEnter {
    shape: ElementShape,
    props: VisualProps,
    follow: Option<TransitionSpec>,
}

#[derive(Debug)]
pub struct Element {
    key: String,
    shape: ElementShape,
    props: VisualProps,
    style: Option<ActiveTransition>,
    exit: Option<ActiveTransition>,
    pending: Option<PendingEnter>,
    exited: bool,
}

impl Element {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn shape(&self) -> &ElementShape {
        &self.shape
    }

    pub fn props(&self) -> VisualProps {
        self.props
    }

    pub fn is_exiting(&self) -> bool {
        self.exit.is_some()
    }
}

#[derive(Debug)]
struct Timer {
    delay: f32,
    fire_at: Option<f64>,
    tag: String,
}

/// Retained stage of keyed elements, evaluated once per frame.
///
/// Charts mutate the stage through `insert`/`transition`/`exit` and read the
/// results back after `tick`. Keys are stable across re-renders of the same
/// chart, which is what lets an element glide to a new position instead of
/// being destroyed and recreated.
#[derive(Debug, Default)]
pub struct Scene {
    elements: Vec<Element>,
    timers: Vec<Timer>,
    clock: f64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts an element on stage. Re-inserting a live key resets its shape and
    /// props in place and drops any running style transition. Re-inserting a
    /// key that is mid-exit does not interrupt the exit; the new element is
    /// queued and materializes once the exit finishes.
    pub fn insert(&mut self, key: &str, shape: ElementShape, props: VisualProps) {
        if let Some(element) = self.element_mut(key) {
            if element.exit.is_some() {
                element.pending = Some(PendingEnter { shape, props, follow: None });
            } else {
                element.shape = shape;
                element.props = props;
                element.style = None;
            }
        } else {
            self.elements.push(Element {
                key: key.to_string(),
                shape,
                props,
                style: None,
                exit: None,
                pending: None,
                exited: false,
            });
        }
    }

    /// Schedules a style transition, replacing any transition already running
    /// on the key. Unknown keys are ignored. A key that is mid-exit is never
    /// restyled; if a re-enter is queued for it, the transition is attached to
    /// the queued element instead.
    pub fn transition(&mut self, key: &str, spec: TransitionSpec) {
        if let Some(element) = self.element_mut(key) {
            if element.exit.is_some() {
                if let Some(pending) = element.pending.as_mut() {
                    pending.follow = Some(spec);
                }
                return;
            }
            element.style = Some(ActiveTransition::new(spec));
        }
    }

    /// Begins removing an element. The exit animation runs to completion and
    /// cannot be replaced or restyled; only `clear` cancels it.
    pub fn exit(&mut self, key: &str, spec: TransitionSpec) {
        if let Some(element) = self.element_mut(key) {
            if element.exit.is_none() {
                element.style = None;
                element.exit = Some(ActiveTransition::new(spec));
            }
        }
    }

    /// Removes an element immediately, without an exit animation or event.
    pub fn remove(&mut self, key: &str) {
        self.elements.retain(|element| element.key != key);
    }

    /// Registers a one-shot timer. The delay counts from the next frame.
    pub fn after(&mut self, delay: f32, tag: &str) {
        self.timers.push(Timer { delay, fire_at: None, tag: tag.to_string() });
    }

    /// Cancels every pending transition and timer and empties the stage.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.timers.clear();
    }

    /// Advances every transition and timer to `now` (seconds, monotonic) and
    /// reports what finished this frame.
    pub fn tick(&mut self, now: f64) -> Vec<SceneEvent> {
        // A replayed or stale frame time must not run animations backward.
        let now = if now > self.clock { now } else { self.clock };
        self.clock = now;

        let mut events = Vec::new();

        for element in &mut self.elements {
            Self::step_style(element, now, &mut events);
            Self::step_exit(element, now, &mut events);
        }

        // Sweep elements whose exit finished, reviving any queued re-enter in
        // place so it keeps its paint order.
        let mut index = 0;
        while index < self.elements.len() {
            if self.elements[index].exited {
                if let Some(pending) = self.elements[index].pending.take() {
                    let element = &mut self.elements[index];
                    element.shape = pending.shape;
                    element.props = pending.props;
                    element.style = pending.follow.map(ActiveTransition::new);
                    element.exited = false;
                    index += 1;
                } else {
                    self.elements.remove(index);
                }
            } else {
                index += 1;
            }
        }

        for timer in &mut self.timers {
            if timer.fire_at.is_none() {
                timer.fire_at = Some(now + timer.delay as f64);
            }
        }
        self.timers.retain(|timer| match timer.fire_at {
            Some(at) if now >= at => {
                events.push(SceneEvent::TimerFired { tag: timer.tag.clone() });
                false
            }
            _ => true,
        });

        events
    }

    fn step_style(element: &mut Element, now: f64, events: &mut Vec<SceneEvent>) {
        if let Some(mut transition) = element.style.take() {
            let begin = *transition.begin.get_or_insert(now + transition.spec.delay as f64);
            if now < begin {
                element.style = Some(transition);
                return;
            }
            let from = *transition.from.get_or_insert(element.props);
            let t = progress(now, begin, transition.spec.duration);
            if t < 1.0 {
                let eased = transition.spec.ease.apply(t);
                element.props = interpolate(from, &transition.spec.patch, eased);
                element.style = Some(transition);
            } else {
                let mut target = from;
                transition.spec.patch.apply_to(&mut target);
                element.props = target;
                if let Some(tag) = transition.spec.tag {
                    events.push(SceneEvent::Completed { key: element.key.clone(), tag });
                }
            }
        }
    }

    fn step_exit(element: &mut Element, now: f64, events: &mut Vec<SceneEvent>) {
        if let Some(mut transition) = element.exit.take() {
            let begin = *transition.begin.get_or_insert(now + transition.spec.delay as f64);
            if now < begin {
                element.exit = Some(transition);
                return;
            }
            let from = *transition.from.get_or_insert(element.props);
            let t = progress(now, begin, transition.spec.duration);
            if t < 1.0 {
                let eased = transition.spec.ease.apply(t);
                element.props = interpolate(from, &transition.spec.patch, eased);
                element.exit = Some(transition);
            } else {
                element.exited = true;
                events.push(SceneEvent::Exited { key: element.key.clone() });
            }
        }
    }

    /// True while anything is animating or a timer is pending, i.e. while the
    /// stage still needs frames.
    pub fn has_active(&self) -> bool {
        !self.timers.is_empty()
            || self.elements.iter().any(|element| element.style.is_some() || element.exit.is_some())
    }

    /// Keys currently bound to data, in insertion order. Keys mid-exit are
    /// already gone from the join's point of view and are not listed.
    pub fn live_keys(&self) -> Vec<String> {
        self.elements
            .iter()
            .filter(|element| element.exit.is_none())
            .map(|element| element.key.clone())
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&Element> {
        self.elements.iter().find(|element| element.key == key)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn element_mut(&mut self, key: &str) -> Option<&mut Element> {
        self.elements.iter_mut().find(|element| element.key == key)
    }
}

fn progress(now: f64, begin: f64, duration: f32) -> f32 {
    if duration <= 0.0 {
        return 1.0;
    }
    ((now - begin) / duration as f64).clamp(0.0, 1.0) as f32
}

fn interpolate(from: VisualProps, patch: &PropPatch, k: f32) -> VisualProps {
    let mut props = from;
    if let Some(x) = patch.x {
        props.x = lerp(from.x, x, k);
    }
    if let Some(y) = patch.y {
        props.y = lerp(from.y, y, k);
    }
    if let Some(w) = patch.w {
        props.w = lerp(from.w, w, k);
    }
    if let Some(h) = patch.h {
        props.h = lerp(from.h, h, k);
    }
    if let Some(opacity) = patch.opacity {
        props.opacity = lerp(from.opacity, opacity, k);
    }
    if let Some(fill) = patch.fill {
        props.fill = blend_colors(from.fill, fill, k);
    }
    props
}

fn lerp(a: f32, b: f32, k: f32) -> f32 {
    a + (b - a) * k
}

/// Linear blend between two colors, channel by channel.
pub fn blend_colors(a: Color32, b: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let channel = |from: u8, to: u8| (from as f32 + (to as f32 - from as f32) * t).round() as u8;
    Color32::from_rgb(channel(a.r(), b.r()), channel(a.g(), b.g()), channel(a.b(), b.b()))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn rect() -> ElementShape {
        ElementShape::Rect { corner: 0.0 }
    }

    fn slide_right() -> TransitionSpec {
        TransitionSpec::to(PropPatch::new().x(100.0)).duration(1.0).ease(Ease::Linear)
    }

    #[test]
    fn delay_gates_motion_and_snapshot() {
        let mut scene = Scene::new();
        scene.insert("a", rect(), VisualProps::at(0.0, 0.0));
        scene.transition("a", slide_right().delay(0.5));

        scene.tick(0.0);
        assert_relative_eq!(scene.get("a").unwrap().props().x, 0.0);
        scene.tick(0.49);
        assert_relative_eq!(scene.get("a").unwrap().props().x, 0.0);
        scene.tick(1.0);
        assert_relative_eq!(scene.get("a").unwrap().props().x, 50.0);
        scene.tick(1.5);
        assert_relative_eq!(scene.get("a").unwrap().props().x, 100.0);
        assert!(!scene.has_active());
    }

    #[test]
    fn completion_lands_exactly_and_fires_once() {
        let mut scene = Scene::new();
        scene.insert("a", rect(), VisualProps::at(3.0, 7.0));
        scene.transition(
            "a",
            TransitionSpec::to(PropPatch::new().x(10.0).opacity(0.25)).duration(0.4).tag("done"),
        );

        scene.tick(0.0);
        let first = scene.tick(10.0);
        assert_eq!(first, vec![SceneEvent::Completed { key: "a".into(), tag: "done".into() }]);
        assert!(scene.tick(11.0).is_empty());

        let props = scene.get("a").unwrap().props();
        assert_eq!(props.x, 10.0);
        assert_eq!(props.opacity, 0.25);
        // Untouched fields keep their value.
        assert_eq!(props.y, 7.0);
    }

    #[test]
    fn untagged_completion_is_silent() {
        let mut scene = Scene::new();
        scene.insert("a", rect(), VisualProps::at(0.0, 0.0));
        scene.transition("a", slide_right());

        scene.tick(0.0);
        assert!(scene.tick(5.0).is_empty());
        assert_eq!(scene.get("a").unwrap().props().x, 100.0);
    }

    #[test]
    fn new_transition_replaces_the_running_one() {
        let mut scene = Scene::new();
        scene.insert("a", rect(), VisualProps::at(0.0, 0.0));
        scene.transition("a", slide_right());

        scene.tick(0.0);
        scene.tick(0.5);
        assert_relative_eq!(scene.get("a").unwrap().props().x, 50.0);

        scene.transition(
            "a",
            TransitionSpec::to(PropPatch::new().y(80.0)).duration(1.0).ease(Ease::Linear),
        );
        scene.tick(1.0);
        scene.tick(1.5);

        let props = scene.get("a").unwrap().props();
        // The replaced transition is gone, so x froze where it was.
        assert_relative_eq!(props.x, 50.0);
        assert_relative_eq!(props.y, 40.0);
    }

    #[test]
    fn exit_is_protected_and_queued_enter_materializes() {
        let mut scene = Scene::new();
        scene.insert("a", rect(), VisualProps::at(5.0, 5.0));
        scene.exit(
            "a",
            TransitionSpec::to(PropPatch::new().opacity(0.0)).duration(1.0).ease(Ease::Linear),
        );
        scene.tick(0.0);

        // The key is no longer live, so a join pass would re-enter it.
        assert!(scene.live_keys().is_empty());
        assert!(scene.get("a").unwrap().is_exiting());

        scene.insert("a", ElementShape::Circle { radius: 4.0 }, VisualProps::at(9.0, 9.0).opacity(0.0));
        scene.transition(
            "a",
            TransitionSpec::to(PropPatch::new().opacity(1.0)).duration(1.0).ease(Ease::Linear),
        );

        // Mid-exit the old element is still fading, untouched by the insert.
        scene.tick(0.5);
        let props = scene.get("a").unwrap().props();
        assert_relative_eq!(props.x, 5.0);
        assert_relative_eq!(props.opacity, 0.5);

        let events = scene.tick(1.0);
        assert_eq!(events, vec![SceneEvent::Exited { key: "a".into() }]);

        // The queued element took over, and its follow-up transition runs.
        assert_eq!(scene.live_keys(), vec!["a".to_string()]);
        let element = scene.get("a").unwrap();
        assert_eq!(element.shape(), &ElementShape::Circle { radius: 4.0 });
        assert_relative_eq!(element.props().x, 9.0);

        scene.tick(1.5);
        scene.tick(2.5);
        assert_relative_eq!(scene.get("a").unwrap().props().opacity, 1.0);
        assert!(!scene.has_active());
    }

    #[test]
    fn exit_without_queued_enter_removes_the_element() {
        let mut scene = Scene::new();
        scene.insert("a", rect(), VisualProps::at(0.0, 0.0));
        scene.exit("a", TransitionSpec::to(PropPatch::new().opacity(0.0)).duration(0.2));

        scene.tick(0.0);
        scene.tick(1.0);
        assert!(scene.get("a").is_none());
        assert!(scene.is_empty());
    }

    #[test]
    fn clear_cancels_transitions_and_timers() {
        let mut scene = Scene::new();
        scene.insert("a", rect(), VisualProps::at(0.0, 0.0));
        scene.transition("a", slide_right().tag("late"));
        scene.after(0.1, "timer");
        scene.tick(0.0);

        scene.clear();
        assert!(!scene.has_active());
        assert!(scene.is_empty());
        assert!(scene.tick(99.0).is_empty());
    }

    #[test]
    fn timer_fires_once_at_its_deadline() {
        let mut scene = Scene::new();
        scene.after(0.3, "settle");

        scene.tick(0.0);
        assert!(scene.tick(0.29).is_empty());
        assert_eq!(scene.tick(0.3), vec![SceneEvent::TimerFired { tag: "settle".into() }]);
        assert!(scene.tick(0.4).is_empty());
        assert!(!scene.has_active());
    }

    #[test]
    fn clock_never_runs_backward() {
        let mut scene = Scene::new();
        scene.insert("a", rect(), VisualProps::at(0.0, 0.0));
        scene.transition("a", slide_right());

        scene.tick(0.0);
        scene.tick(0.5);
        assert_relative_eq!(scene.get("a").unwrap().props().x, 50.0);
        scene.tick(0.2);
        assert_relative_eq!(scene.get("a").unwrap().props().x, 50.0);
    }

    #[test]
    fn reinsert_of_live_key_resets_in_place() {
        let mut scene = Scene::new();
        scene.insert("a", rect(), VisualProps::at(0.0, 0.0));
        scene.transition("a", slide_right());
        scene.tick(0.0);
        scene.tick(0.5);

        scene.insert("a", rect(), VisualProps::at(1.0, 2.0));
        assert!(!scene.has_active());
        assert_relative_eq!(scene.get("a").unwrap().props().x, 1.0);
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn zero_duration_lands_on_the_next_frame() {
        let mut scene = Scene::new();
        scene.insert("a", rect(), VisualProps::at(0.0, 0.0));
        scene.transition("a", TransitionSpec::to(PropPatch::new().x(42.0)).duration(0.0));

        scene.tick(7.0);
        assert_eq!(scene.get("a").unwrap().props().x, 42.0);
        assert!(!scene.has_active());
    }

    #[test]
    fn fill_blends_between_colors() {
        let black = Color32::from_rgb(0, 0, 0);
        let white = Color32::from_rgb(255, 255, 255);
        assert_eq!(blend_colors(black, white, 0.0), black);
        assert_eq!(blend_colors(black, white, 1.0), white);
        assert_eq!(blend_colors(black, white, 0.5), Color32::from_rgb(128, 128, 128));
    }
}
