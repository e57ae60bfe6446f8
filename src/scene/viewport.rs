/// Tuning knobs for the showcase scene.
#[derive(Debug, Clone)]
pub struct SceneTuning {
    /// Progress offset between consecutive items' animation windows.
    pub gap: f64,
    /// Width of one item's animation window in overall progress units.
    pub speed: f64,
    /// Horizontal spread of the card arc on wide viewports, in pixels.
    pub arc_radius: f64,
}

impl Default for SceneTuning {
    fn default() -> Self {
        Self {
            gap: 0.08,
            speed: 0.4,
            arc_radius: 500.0,
        }
    }
}

/// Widest viewport that still uses the narrow (centered, tight-arc) layout.
pub const NARROW_VIEWPORT_MAX: f64 = 768.0;

/// The pinned scroll region spans this many viewport heights.
pub const PIN_VIEWPORTS: f64 = 10.0;

/// Viewport size plus the derived arc constants, recomputed together.
///
/// These were ambient globals in earlier iterations of the effect; keeping
/// them as fields of one struct means the resize path and the per-tick path
/// read the same values.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportGeometry {
    pub width: f64,
    pub height: f64,
    pub arc_start_x: f64,
    pub arc_control_x: f64,
    pub arc_control_y: f64,
    pub arc_start_y: f64,
    pub arc_end_y: f64,
}

impl ViewportGeometry {
    pub fn new(width: f64, height: f64, tuning: &SceneTuning) -> Self {
        let mut geometry = Self {
            width: 0.0,
            height: 0.0,
            arc_start_x: 0.0,
            arc_control_x: 0.0,
            arc_control_y: 0.0,
            arc_start_y: 0.0,
            arc_end_y: 0.0,
        };
        geometry.recompute(width, height, tuning);
        geometry
    }

    /// Re-derive every arc constant from the current viewport size.
    ///
    /// Narrow viewports center the arc start and flare out by a fraction of
    /// the available width; wide viewports anchor at 75% across and flare by
    /// the configured radius.
    pub fn recompute(&mut self, width: f64, height: f64, tuning: &SceneTuning) {
        self.width = width;
        self.height = height;

        if width <= NARROW_VIEWPORT_MAX {
            self.arc_start_x = width / 2.0 - 100.0;
            self.arc_control_x = self.arc_start_x + width * 0.4;
        } else {
            let w75 = width * 0.75;
            self.arc_start_x = w75 - 220.0;
            self.arc_control_x = self.arc_start_x + tuning.arc_radius;
        }
        self.arc_control_y = height / 2.0;
        self.arc_start_y = -200.0;
        self.arc_end_y = height + 200.0;
    }

    /// Vertical midpoint of the viewport; the active title is the one whose
    /// center sits closest to this line.
    pub fn midpoint(&self) -> f64 {
        self.height / 2.0
    }

    /// Total length of the pinned scroll region in virtual pixels.
    pub fn pin_length(&self) -> f64 {
        self.height * PIN_VIEWPORTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_layout_constants() {
        let geometry = ViewportGeometry::new(1600.0, 900.0, &SceneTuning::default());
        assert_eq!(geometry.arc_start_x, 1600.0 * 0.75 - 220.0);
        assert_eq!(geometry.arc_control_x, geometry.arc_start_x + 500.0);
        assert_eq!(geometry.arc_control_y, 450.0);
        assert_eq!(geometry.arc_start_y, -200.0);
        assert_eq!(geometry.arc_end_y, 1100.0);
    }

    #[test]
    fn test_narrow_layout_constants() {
        let geometry = ViewportGeometry::new(600.0, 800.0, &SceneTuning::default());
        assert_eq!(geometry.arc_start_x, 200.0);
        assert_eq!(geometry.arc_control_x, 200.0 + 600.0 * 0.4);
    }

    #[test]
    fn test_recompute_switches_layout() {
        let tuning = SceneTuning::default();
        let mut geometry = ViewportGeometry::new(1600.0, 900.0, &tuning);
        geometry.recompute(640.0, 480.0, &tuning);
        assert_eq!(geometry.arc_start_x, 220.0);
        assert_eq!(geometry.pin_length(), 4800.0);
    }
}
