use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use gtk4::glib;
use gtk4::prelude::*;
use gtk4::{DrawingArea, EventControllerMotion, GestureClick};
use tracing::trace;

use super::rendering;
use super::resources::GameResources;
use crate::game::logic::{ClickResult, GameState};
use crate::game::types::Coord;

/// How long a refilled cell keeps its highlight.
const FLASH_DURATION: Duration = Duration::from_millis(300);
/// How long the cleared pair blinks white.
const REMOVE_FLASH_DURATION: Duration = Duration::from_millis(100);
/// How long the "+N" label floats above a matched cell.
const POPUP_DURATION: Duration = Duration::from_millis(500);
const RESIZE_INTERPOLATION_MS: u64 = 500;
const RESIZE_LOW_QUALITY: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    /// A cell of the pair that was just cleared.
    Removed,
    /// A cell that received a fresh candy.
    Refilled,
}

impl FlashKind {
    fn duration(self) -> Duration {
        match self {
            FlashKind::Removed => REMOVE_FLASH_DURATION,
            FlashKind::Refilled => FLASH_DURATION,
        }
    }
}

struct Flash {
    at: Coord,
    kind: FlashKind,
    time_left: Duration,
}

impl Flash {
    fn new(at: Coord, kind: FlashKind) -> Self {
        Self {
            at,
            kind,
            time_left: kind.duration(),
        }
    }

    fn alpha(&self) -> f64 {
        self.time_left.as_secs_f64() / self.kind.duration().as_secs_f64()
    }
}

/// Floating score label shown after a match.
pub struct PointsPopup {
    pub at: Coord,
    pub points: u32,
    elapsed: Duration,
}

impl PointsPopup {
    /// Animation progress from 0.0 to 1.0.
    pub fn progress(&self) -> f64 {
        (self.elapsed.as_secs_f64() / POPUP_DURATION.as_secs_f64()).clamp(0.0, 1.0)
    }
}

/// Presentation-only state: hover position and cosmetic effects. Nothing here
/// feeds back into the game.
pub struct ViewState {
    pub hovered: Option<Coord>,
    flashes: Vec<Flash>,
    popups: Vec<PointsPopup>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            hovered: None,
            flashes: Vec::new(),
            popups: Vec::new(),
        }
    }

    /// Start the effects for a completed match.
    pub fn on_match(&mut self, at: Coord, points: u32, removed: [Coord; 2], refilled: &[Coord]) {
        self.flashes.extend(removed.iter().map(|&at| Flash::new(at, FlashKind::Removed)));
        self.flashes.extend(refilled.iter().map(|&at| Flash::new(at, FlashKind::Refilled)));
        self.popups.push(PointsPopup {
            at,
            points,
            elapsed: Duration::ZERO,
        });
    }

    pub fn clear(&mut self) {
        self.flashes.clear();
        self.popups.clear();
    }

    pub fn is_animating(&self) -> bool {
        !self.flashes.is_empty() || !self.popups.is_empty()
    }

    /// Advance all effects by `dt`. Returns `true` if a redraw is needed.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if !self.is_animating() {
            return false;
        }
        for flash in &mut self.flashes {
            flash.time_left = flash.time_left.saturating_sub(dt);
        }
        self.flashes.retain(|f| !f.time_left.is_zero());
        for popup in &mut self.popups {
            popup.elapsed += dt;
        }
        self.popups.retain(|p| p.elapsed < POPUP_DURATION);
        true
    }

    /// Active highlights on `at` with their current opacity.
    pub fn flashes_at(&self, at: Coord) -> impl Iterator<Item = (FlashKind, f64)> + '_ {
        self.flashes
            .iter()
            .filter(move |f| f.at == at)
            .map(|f| (f.kind, f.alpha()))
    }

    #[cfg(test)]
    fn flash_alpha(&self, at: Coord, kind: FlashKind) -> Option<f64> {
        self.flashes_at(at).find(|(k, _)| *k == kind).map(|(_, a)| a)
    }

    pub fn popups(&self) -> impl Iterator<Item = &PointsPopup> {
        self.popups.iter()
    }
}

struct ResizeState {
    last_size: (i32, i32),
    last_change: Instant,
    generation: u64,
}

impl ResizeState {
    fn new() -> Self {
        Self {
            last_size: (0, 0),
            last_change: Instant::now(),
            generation: 0,
        }
    }
}

/// Create the board drawing area with mouse handling. `on_click` runs after
/// every click the game did not ignore.
pub fn create_board(
    state: Rc<RefCell<GameState>>,
    resources: Rc<GameResources>,
    view: Rc<RefCell<ViewState>>,
    on_click: Rc<dyn Fn(&DrawingArea, &ClickResult)>,
) -> DrawingArea {
    let (ref_w, ref_h) = {
        let st = state.borrow();
        rendering::ref_size(st.board().rows(), st.board().cols())
    };
    let drawing_area = DrawingArea::new();
    drawing_area.set_content_width(ref_w as i32);
    drawing_area.set_content_height(ref_h as i32);
    drawing_area.set_hexpand(true);
    drawing_area.set_vexpand(true);
    let resize_state = Rc::new(RefCell::new(ResizeState::new()));

    // --- Draw handler ---
    {
        let state = state.clone();
        let view = view.clone();
        drawing_area.set_draw_func(move |area, cr, w, h| {
            let now = Instant::now();
            let mut rs = resize_state.borrow_mut();
            if rs.last_size != (w, h) {
                rs.last_size = (w, h);
                rs.last_change = now;
                rs.generation = rs.generation.wrapping_add(1);
                let gen = rs.generation;
                let da = area.clone();
                let resize_state = resize_state.clone();
                let delay = Duration::from_millis(RESIZE_INTERPOLATION_MS);
                glib::timeout_add_local_once(delay, move || {
                    if resize_state.borrow().generation == gen {
                        da.queue_draw();
                    }
                });
            }
            let raster_quality = if now.duration_since(rs.last_change)
                < Duration::from_millis(RESIZE_INTERPOLATION_MS)
            {
                RESIZE_LOW_QUALITY
            } else {
                1.0
            };
            drop(rs);

            rendering::render(
                cr,
                &state.borrow(),
                &resources,
                &view.borrow(),
                w,
                h,
                raster_quality,
            );
        });
    }

    // --- Click handler ---
    {
        let state = state.clone();
        let view = view.clone();
        let da = drawing_area.clone();
        let click = GestureClick::new();
        click.connect_released(move |_gesture, _n, x, y| {
            let (rows, cols) = {
                let st = state.borrow();
                (st.board().rows(), st.board().cols())
            };
            let Some(at) = rendering::mouse_to_cell(x, y, da.width(), da.height(), rows, cols)
            else {
                return;
            };

            let result = state.borrow_mut().click(at.row, at.col);
            if result == ClickResult::Ignored {
                return;
            }
            if let ClickResult::Matched {
                points,
                at,
                removed,
                refilled,
                ..
            } = &result
            {
                view.borrow_mut().on_match(*at, *points, *removed, refilled);
            }
            if tracing::enabled!(tracing::Level::TRACE) {
                if let Ok(json) = serde_json::to_string(&state.borrow().snapshot()) {
                    trace!(snapshot = %json, "after click");
                }
            }
            da.queue_draw();
            on_click(&da, &result);
        });
        drawing_area.add_controller(click);
    }

    // --- Mouse move handler ---
    {
        let motion = EventControllerMotion::new();
        {
            let view = view.clone();
            let da = drawing_area.clone();
            motion.connect_leave(move |_| {
                view.borrow_mut().hovered = None;
                da.queue_draw();
            });
        }
        let da = drawing_area.clone();
        motion.connect_motion(move |_ctrl, x, y| {
            let (rows, cols) = {
                let st = state.borrow();
                (st.board().rows(), st.board().cols())
            };
            let hovered = rendering::mouse_to_cell(x, y, da.width(), da.height(), rows, cols);
            let mut v = view.borrow_mut();
            if v.hovered != hovered {
                v.hovered = hovered;
                drop(v);
                da.queue_draw();
            }
        });
        drawing_area.add_controller(motion);
    }

    drawing_area
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAIR: [Coord; 2] = [Coord { row: 2, col: 1 }, Coord { row: 2, col: 2 }];

    #[test]
    fn default_view_is_idle() {
        let view = ViewState::default();
        assert!(!view.is_animating());
        assert_eq!(view.hovered, None);
    }

    #[test]
    fn match_starts_flash_and_popup() {
        let mut view = ViewState::new();
        assert!(!view.is_animating());
        view.on_match(Coord::new(2, 2), 8, PAIR, &[Coord::new(0, 2), Coord::new(1, 2)]);
        assert!(view.is_animating());
        assert_eq!(view.flash_alpha(Coord::new(0, 2), FlashKind::Refilled), Some(1.0));
        assert_eq!(view.flash_alpha(Coord::new(2, 2), FlashKind::Removed), Some(1.0));
        assert_eq!(view.flash_alpha(Coord::new(2, 1), FlashKind::Removed), Some(1.0));
        assert_eq!(view.flash_alpha(Coord::new(2, 2), FlashKind::Refilled), None);
        assert_eq!(view.flashes_at(Coord::new(5, 5)).count(), 0);
        let popup = view.popups().next().unwrap();
        assert_eq!(popup.points, 8);
        assert_eq!(popup.progress(), 0.0);
    }

    #[test]
    fn effects_fade_and_expire() {
        let mut view = ViewState::new();
        view.on_match(Coord::new(0, 0), 6, PAIR, &[Coord::new(0, 0)]);

        assert!(view.tick(Duration::from_millis(150)));
        let alpha = view.flash_alpha(Coord::new(0, 0), FlashKind::Refilled).unwrap();
        assert!((alpha - 0.5).abs() < 1e-9);
        assert!((view.popups().next().unwrap().progress() - 0.3).abs() < 1e-9);

        view.tick(Duration::from_millis(200));
        assert_eq!(view.flash_alpha(Coord::new(0, 0), FlashKind::Refilled), None);
        assert_eq!(view.popups().count(), 1);

        view.tick(Duration::from_millis(200));
        assert!(!view.is_animating());
        assert!(!view.tick(Duration::from_millis(16)));
    }

    #[test]
    fn removed_pair_blink_is_shorter_than_refill_flash() {
        let mut view = ViewState::new();
        view.on_match(Coord::new(2, 2), 6, PAIR, &[Coord::new(2, 2)]);

        view.tick(Duration::from_millis(50));
        let alpha = view.flash_alpha(Coord::new(2, 1), FlashKind::Removed).unwrap();
        assert!((alpha - 0.5).abs() < 1e-9);

        view.tick(Duration::from_millis(50));
        assert_eq!(view.flash_alpha(Coord::new(2, 1), FlashKind::Removed), None);
        assert_eq!(view.flash_alpha(Coord::new(2, 2), FlashKind::Removed), None);
        assert!(view.flash_alpha(Coord::new(2, 2), FlashKind::Refilled).is_some());
    }

    #[test]
    fn clear_drops_effects_but_keeps_hover() {
        let mut view = ViewState::new();
        view.hovered = Some(Coord::new(1, 1));
        view.on_match(Coord::new(0, 0), 6, PAIR, &[Coord::new(0, 0)]);
        view.clear();
        assert!(!view.is_animating());
        assert_eq!(view.hovered, Some(Coord::new(1, 1)));
    }
}
