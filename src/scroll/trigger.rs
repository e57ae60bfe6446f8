use crate::scene::viewport::PIN_VIEWPORTS;

/// Progress deltas below this do not count as a change.
const PROGRESS_EPSILON: f64 = 1e-5;

/// Snap threshold between the scrubbed and raw progress.
const SNAP_EPSILON: f64 = 1e-4;

/// Pinned-region progress trigger.
///
/// Maps a virtual scroll position onto the pinned region (`PIN_VIEWPORTS`
/// viewport heights long) as a progress in [0, 1], smoothed toward the raw
/// value over roughly `scrub` seconds so fast wheel flicks scrub rather
/// than jump.
#[derive(Debug, Clone)]
pub struct PinnedTrigger {
    pin_length: f64,
    scrub: f64,
    last_position: f64,
    raw: f64,
    progress: f64,
}

impl PinnedTrigger {
    pub fn new(viewport_height: f64, scrub: f64) -> Self {
        Self {
            pin_length: (viewport_height * PIN_VIEWPORTS).max(1.0),
            scrub: scrub.max(0.0),
            last_position: 0.0,
            raw: 0.0,
            progress: 0.0,
        }
    }

    pub fn pin_length(&self) -> f64 {
        self.pin_length
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Re-derive the pinned region from the viewport. With `force`, also
    /// re-clamp the stored position and snap the scrubbed progress to it,
    /// as after a layout change the old eased value is meaningless.
    pub fn refresh(&mut self, viewport_height: f64, force: bool) {
        self.pin_length = (viewport_height * PIN_VIEWPORTS).max(1.0);
        if force {
            self.raw = (self.last_position / self.pin_length).clamp(0.0, 1.0);
            self.progress = self.raw;
        }
    }

    /// Feed the current virtual position; returns the new progress when it
    /// moved by more than `PROGRESS_EPSILON`.
    pub fn update(&mut self, position: f64, dt: f64) -> Option<f64> {
        self.last_position = position;
        self.raw = (position / self.pin_length).clamp(0.0, 1.0);

        let before = self.progress;
        if self.scrub == 0.0 || dt <= 0.0 {
            self.progress = self.raw;
        } else {
            let blend = 1.0 - (-dt / self.scrub).exp();
            self.progress += (self.raw - self.progress) * blend;
            if (self.raw - self.progress).abs() < SNAP_EPSILON {
                self.progress = self.raw;
            }
        }

        if (self.progress - before).abs() > PROGRESS_EPSILON {
            Some(self.progress)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 60.0;

    #[test]
    fn test_progress_is_clamped() {
        let mut trigger = PinnedTrigger::new(900.0, 0.0);
        trigger.update(-500.0, DT);
        assert_eq!(trigger.progress(), 0.0);
        trigger.update(90_000.0, DT);
        assert_eq!(trigger.progress(), 1.0);
    }

    #[test]
    fn test_scrub_settles_on_raw_value() {
        let mut trigger = PinnedTrigger::new(900.0, 1.0);
        let position = trigger.pin_length() / 2.0;

        trigger.update(position, DT);
        assert!(trigger.progress() < 0.5);

        for _ in 0..600 {
            trigger.update(position, DT);
        }
        assert_eq!(trigger.progress(), 0.5);
    }

    #[test]
    fn test_monotone_input_gives_monotone_progress() {
        let mut trigger = PinnedTrigger::new(900.0, 1.0);
        let mut previous = 0.0;
        for step in 0..1000 {
            let position = step as f64 * 9.0;
            trigger.update(position, DT);
            assert!(trigger.progress() >= previous);
            previous = trigger.progress();
        }
    }

    #[test]
    fn test_unchanged_position_eventually_reports_no_change() {
        let mut trigger = PinnedTrigger::new(900.0, 1.0);
        trigger.update(4000.0, DT);
        for _ in 0..600 {
            trigger.update(4000.0, DT);
        }
        assert_eq!(trigger.update(4000.0, DT), None);
    }

    #[test]
    fn test_forced_refresh_requantizes_position() {
        let mut trigger = PinnedTrigger::new(900.0, 1.0);
        trigger.update(4500.0, DT);

        trigger.refresh(450.0, true);
        assert_eq!(trigger.pin_length(), 4500.0);
        assert_eq!(trigger.progress(), 1.0);

        trigger.refresh(900.0, false);
        assert_eq!(trigger.pin_length(), 9000.0);
        assert_eq!(trigger.progress(), 1.0);
    }
}
