//! The progress mapper.
//!
//! `SceneFrame::compute` turns a normalized scroll progress and the current
//! geometry into a complete style record for the tick: intro translation and
//! fade, backdrop scale, rail offset, per-card arc placement and the active
//! index. It is pure and idempotent - the same inputs always produce the
//! same frame, which is what makes the scene resumable from any scroll
//! position after a jump or resize. The UI applies a frame in one render
//! step and keeps no incremental state of its own beyond the active index.

use super::arc;
use super::viewport::ViewportGeometry;

/// Half the card wrapper's approximate size; placement subtracts this so the
/// arc runs through card centers.
pub const CARD_HALF_WIDTH: f64 = 100.0;
pub const CARD_HALF_HEIGHT: f64 = 75.0;

/// Progress where the reveal phase hands over to the settle phase.
const REVEAL_END: f64 = 0.2;
/// Progress where the settle phase hands over to the scrub phase.
const SETTLE_END: f64 = 0.25;
/// Scrub progress past this point fades the header and rail marks back out.
const LATE_FADE_START: f64 = 0.9;
/// Intro text travels this fraction of the viewport width each way.
const INTRO_TRAVEL: f64 = 0.6;

/// Cards stay placed a little past both arc ends so they do not pop at the
/// viewport edges.
const CARD_T_MIN: f64 = -0.2;
const CARD_T_MAX: f64 = 1.2;

/// One title's extent within the untranslated rail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TitleSlot {
    /// Top edge relative to the rail's own origin.
    pub offset: f64,
    pub height: f64,
}

impl TitleSlot {
    pub fn new(offset: f64, height: f64) -> Self {
        Self { offset, height }
    }

    /// On-screen center of this title once the rail is translated.
    pub fn center_at(&self, rail_offset: f64) -> f64 {
        rail_offset + self.offset + self.height / 2.0
    }
}

/// Total scrollable extent of the rail.
pub fn rail_scroll_height(slots: &[TitleSlot]) -> f64 {
    slots
        .iter()
        .map(|slot| slot.offset + slot.height)
        .fold(0.0, f64::max)
}

/// Index of the center closest to the midpoint; earlier index wins exact
/// ties (strict comparison over a stable scan).
pub fn closest_to_midpoint(centers: &[f64], midpoint: f64) -> Option<usize> {
    let mut closest = None;
    let mut closest_distance = f64::INFINITY;
    for (index, center) in centers.iter().enumerate() {
        let distance = (center - midpoint).abs();
        if distance < closest_distance {
            closest_distance = distance;
            closest = Some(index);
        }
    }
    closest
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardPlacement {
    /// Opacity zero, not hit-testable.
    Hidden,
    /// Top-left corner of the card wrapper.
    Placed { x: f64, y: f64 },
}

/// Full style assignment for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneFrame {
    /// Horizontal intro-text travel; the two texts move by plus/minus this.
    pub intro_shift: f64,
    pub intro_opacity: f64,
    /// Scale of the backdrop container (0 collapsed, 1 full).
    pub backdrop_scale: f64,
    /// Inverse zoom of the media inside the backdrop (1.5 down to 1.0).
    pub backdrop_media_scale: f64,
    pub header_visible: bool,
    pub rail_marks_visible: bool,
    /// Vertical translation of the title rail; None outside the scrub phase
    /// (the rail parks below the viewport).
    pub rail_offset: Option<f64>,
    /// Scrub-local progress in [0, 1]; 0 outside the scrub phase. Drives the
    /// per-item stagger windows.
    pub switch_progress: f64,
    /// One placement per catalog item, in item order.
    pub cards: Vec<CardPlacement>,
    /// Closest title during scrub; None in the reveal/settle phases.
    pub active_index: Option<usize>,
}

impl SceneFrame {
    /// Map progress to a frame. `slots` describe the titles within the
    /// untranslated rail, in item order; cards pair with slots by index.
    pub fn compute(progress: f64, geometry: &ViewportGeometry, slots: &[TitleSlot]) -> Self {
        let progress = progress.clamp(0.0, 1.0);

        if progress <= REVEAL_END {
            let a = progress / REVEAL_END;
            return Self {
                intro_shift: a * INTRO_TRAVEL * geometry.width,
                intro_opacity: a,
                backdrop_scale: a,
                backdrop_media_scale: 1.5 - a * 0.5,
                header_visible: false,
                rail_marks_visible: false,
                rail_offset: None,
                switch_progress: 0.0,
                cards: vec![CardPlacement::Hidden; slots.len()],
                active_index: None,
            };
        }

        if progress <= SETTLE_END {
            return Self {
                intro_shift: INTRO_TRAVEL * geometry.width,
                intro_opacity: 0.0,
                backdrop_scale: 1.0,
                backdrop_media_scale: 1.0,
                header_visible: true,
                rail_marks_visible: true,
                rail_offset: None,
                switch_progress: 0.0,
                cards: vec![CardPlacement::Hidden; slots.len()],
                active_index: None,
            };
        }

        // Scrub phase: translate the rail from just below the viewport to
        // fully scrolled past the top, then derive everything else from the
        // titles' resulting screen positions.
        let switch_progress = (progress - SETTLE_END) / (1.0 - SETTLE_END);
        let rail_height = rail_scroll_height(slots);
        let travel = geometry.height + rail_height;
        let rail_offset = geometry.height - switch_progress * travel;

        let centers: Vec<f64> = slots.iter().map(|slot| slot.center_at(rail_offset)).collect();

        let cards = centers
            .iter()
            .map(|&center| {
                let screen_progress = center / geometry.height;
                let t = 1.0 - screen_progress;
                if (CARD_T_MIN..=CARD_T_MAX).contains(&t) {
                    let (x, y) = arc::point_at(geometry, t);
                    CardPlacement::Placed {
                        x: x - CARD_HALF_WIDTH,
                        y: y - CARD_HALF_HEIGHT,
                    }
                } else {
                    CardPlacement::Hidden
                }
            })
            .collect();

        let late = progress > LATE_FADE_START;

        Self {
            intro_shift: INTRO_TRAVEL * geometry.width,
            intro_opacity: 0.0,
            backdrop_scale: 1.0,
            backdrop_media_scale: 1.0,
            header_visible: !late,
            rail_marks_visible: !late,
            rail_offset: Some(rail_offset),
            switch_progress,
            cards,
            active_index: closest_to_midpoint(&centers, geometry.midpoint()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::viewport::SceneTuning;

    fn geometry() -> ViewportGeometry {
        ViewportGeometry::new(1200.0, 900.0, &SceneTuning::default())
    }

    fn slots(count: usize) -> Vec<TitleSlot> {
        (0..count)
            .map(|i| TitleSlot::new(i as f64 * 120.0, 80.0))
            .collect()
    }

    #[test]
    fn test_intro_travel_is_linear_and_antisymmetric() {
        let geometry = geometry();
        let slots = slots(4);

        let at = |p: f64| SceneFrame::compute(p, &geometry, &slots);

        assert_eq!(at(0.0).intro_shift, 0.0);
        assert_eq!(at(0.0).intro_opacity, 0.0);

        let half = at(0.1);
        assert!((half.intro_shift - 0.3 * geometry.width).abs() < 1e-9);
        assert!((half.intro_opacity - 0.5).abs() < 1e-9);

        let full = at(0.2);
        assert!((full.intro_shift - 0.6 * geometry.width).abs() < 1e-9);
        assert_eq!(full.intro_opacity, 1.0);
        // The two intro texts apply +shift and -shift; antisymmetry is the
        // single shift value by construction.
    }

    #[test]
    fn test_reveal_scales_and_hides_everything_else() {
        let geometry = geometry();
        let frame = SceneFrame::compute(0.1, &geometry, &slots(4));
        assert!((frame.backdrop_scale - 0.5).abs() < 1e-9);
        assert!((frame.backdrop_media_scale - 1.25).abs() < 1e-9);
        assert!(!frame.header_visible);
        assert!(!frame.rail_marks_visible);
        assert!(frame.cards.iter().all(|c| *c == CardPlacement::Hidden));
        assert_eq!(frame.active_index, None);
    }

    #[test]
    fn test_backdrop_locked_to_one_past_reveal() {
        let geometry = geometry();
        let slots = slots(4);
        for p in [0.21, 0.25, 0.3, 0.5, 0.77, 0.9, 1.0] {
            let frame = SceneFrame::compute(p, &geometry, &slots);
            assert_eq!(frame.backdrop_scale, 1.0, "scale at p={p}");
            assert_eq!(frame.backdrop_media_scale, 1.0, "media scale at p={p}");
            assert_eq!(frame.intro_opacity, 0.0, "intro at p={p}");
        }
    }

    #[test]
    fn test_same_progress_yields_identical_frames() {
        let geometry = geometry();
        let slots = slots(4);
        for p in [0.0, 0.13, 0.22, 0.6, 0.95] {
            let a = SceneFrame::compute(p, &geometry, &slots);
            let b = SceneFrame::compute(p, &geometry, &slots);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_header_late_fade() {
        let geometry = geometry();
        let slots = slots(4);
        assert!(SceneFrame::compute(0.9, &geometry, &slots).header_visible);
        assert!(!SceneFrame::compute(0.91, &geometry, &slots).header_visible);
        assert!(!SceneFrame::compute(0.91, &geometry, &slots).rail_marks_visible);
    }

    #[test]
    fn test_rail_offset_interpolates_full_travel() {
        let geometry = geometry();
        let slots = slots(4);
        let rail_height = rail_scroll_height(&slots);
        assert_eq!(rail_height, 3.0 * 120.0 + 80.0);

        let start = SceneFrame::compute(0.25 + 1e-9, &geometry, &slots);
        assert!((start.rail_offset.unwrap() - geometry.height).abs() < 1e-3);

        let end = SceneFrame::compute(1.0, &geometry, &slots);
        assert!((end.rail_offset.unwrap() + rail_height).abs() < 1e-9);
    }

    #[test]
    fn test_cards_hidden_outside_arc_window() {
        let geometry = geometry();
        // A rail tall enough that early titles are far past the top while
        // late ones are still far below.
        let slots: Vec<TitleSlot> = (0..10)
            .map(|i| TitleSlot::new(i as f64 * 400.0, 80.0))
            .collect();
        let frame = SceneFrame::compute(0.6, &geometry, &slots);
        assert!(frame.cards.contains(&CardPlacement::Hidden));
        assert!(frame
            .cards
            .iter()
            .any(|c| matches!(c, CardPlacement::Placed { .. })));
    }

    #[test]
    fn test_placed_cards_subtract_centering_offset() {
        let geometry = geometry();
        let slots = slots(4);
        let frame = SceneFrame::compute(0.6, &geometry, &slots);
        let rail_offset = frame.rail_offset.unwrap();
        for (slot, card) in slots.iter().zip(frame.cards.iter()) {
            if let CardPlacement::Placed { x, y } = card {
                let t = 1.0 - slot.center_at(rail_offset) / geometry.height;
                let (ax, ay) = crate::scene::arc::point_at(&geometry, t);
                assert!((x - (ax - CARD_HALF_WIDTH)).abs() < 1e-9);
                assert!((y - (ay - CARD_HALF_HEIGHT)).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_closest_title_first_minimal_wins() {
        // Distances from the midpoint: [5, 3, 3, 8] -> index 1.
        let midpoint = 100.0;
        let centers = [105.0, 97.0, 103.0, 108.0];
        assert_eq!(closest_to_midpoint(&centers, midpoint), Some(1));
        assert_eq!(closest_to_midpoint(&[], midpoint), None);
    }

    #[test]
    fn test_sweep_visits_every_item_once_in_order() {
        let geometry = geometry();
        let slots = slots(4);

        let mut visited: Vec<usize> = Vec::new();
        let steps = 4000;
        for step in 0..=steps {
            let p = step as f64 / steps as f64;
            let frame = SceneFrame::compute(p, &geometry, &slots);
            if let Some(active) = frame.active_index {
                if visited.last() != Some(&active) {
                    visited.push(active);
                }
            }
        }

        assert_eq!(visited, vec![0, 1, 2, 3]);
    }
}
